use crate::almacen::Almacen;
use crate::api::ClienteApi;
use crate::models::{
    BusquedaVehiculo, Configuracion, VehiculoActivo, VehiculoEncontrado, VehiculoHistorial,
};
use crate::monitor::MonitorDeteccion;
use crate::sesion::SesionState;
use crate::utils;
use serde::Deserialize;
use std::time::Duration;
use tauri::State;

/// La transcripción puede tardar bastante más que una llamada REST
const ESPERA_TRANSCRIPCION: Duration = Duration::from_secs(60);

/// Respuesta del servicio de transcripción
#[derive(Debug, Deserialize)]
struct RespuestaTranscripcion {
    text: String,
}

/// Intención reconocida en un comando de voz
#[derive(Debug, PartialEq)]
pub enum Intencion {
    ConteoVehiculos,
    EntradasDelDia,
    BuscarPlaca(Option<String>),
    Historial,
    Estadisticas,
    CuposDisponibles,
    UltimaDeteccion,
    Desconocida,
}

/// Interpreta el texto con reglas de palabras clave. Las reglas se
/// prueban en orden: el conteo manda sobre la búsqueda, y la búsqueda
/// solo captura si trae un verbo de buscar o una placa concreta.
pub fn interpretar(texto: &str) -> Intencion {
    let texto = texto.to_lowercase();
    let contiene = |palabras: &[&str]| palabras.iter().any(|p| texto.contains(p));

    if contiene(&["cuántos", "cuantos", "total", "cantidad"]) {
        if contiene(&["ingresaron", "entraron", "entrada"]) {
            return Intencion::EntradasDelDia;
        }
        return Intencion::ConteoVehiculos;
    }

    let placa = extraer_placa(&texto);
    if contiene(&["buscar", "busca", "encontrar"]) || (texto.contains("placa") && placa.is_some())
    {
        return Intencion::BuscarPlaca(placa);
    }
    if contiene(&["historial", "salidas", "cerrados"]) {
        return Intencion::Historial;
    }
    if contiene(&["estadísticas", "estadisticas", "resumen", "día", "dia"]) {
        return Intencion::Estadisticas;
    }
    if contiene(&["cupos", "espacios", "disponibles"]) {
        return Intencion::CuposDisponibles;
    }
    if contiene(&["última", "ultima", "reciente", "placa detectada"]) {
        return Intencion::UltimaDeteccion;
    }
    Intencion::Desconocida
}

/// Placa en formato ABC123, ABC-123 o ABC 123, normalizada sin separador
fn extraer_placa(texto: &str) -> Option<String> {
    let patron = regex::Regex::new(r"\b([A-Z]{3})[-\s]?(\d{3})\b").ok()?;
    let mayusculas = texto.to_uppercase();
    patron
        .captures(&mayusculas)
        .map(|c| format!("{}{}", &c[1], &c[2]))
}

/// Envía un archivo de audio al servicio de transcripción
#[tauri::command]
pub async fn transcribir_audio(almacen: State<'_, Almacen>, ruta: String) -> Result<String, String> {
    let bytes = tokio::fs::read(&ruta)
        .await
        .map_err(|e| format!("Error leyendo el audio: {}", e))?;
    let nombre = std::path::Path::new(&ruta)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("audio.wav")
        .to_string();

    let cliente = ClienteApi::con_espera(&almacen.voz_url(), None, ESPERA_TRANSCRIPCION)
        .map_err(|e| e.to_string())?;
    let respuesta: RespuestaTranscripcion = cliente
        .post_archivo("/transcribe", "file", &nombre, bytes, tipo_mime_audio(&nombre))
        .await
        .map_err(|e| e.to_string())?;
    Ok(respuesta.text)
}

/// Ejecuta un comando de voz ya transcrito y responde en lenguaje natural
#[tauri::command]
pub async fn ejecutar_comando_voz(
    estado: State<'_, SesionState>,
    almacen: State<'_, Almacen>,
    monitor: State<'_, MonitorDeteccion>,
    texto: String,
) -> Result<String, String> {
    let cliente = super::cliente(&almacen, &estado)?;
    let respuesta = match interpretar(&texto) {
        Intencion::ConteoVehiculos => {
            let activos: Vec<VehiculoActivo> = cliente
                .get("/vehiculos/activos")
                .await
                .map_err(|e| super::mapear_error(e, &estado, &almacen))?;
            conteo_en_palabras(activos.len())
        }
        Intencion::EntradasDelDia => {
            let activos: Vec<VehiculoActivo> = cliente
                .get("/vehiculos/activos")
                .await
                .map_err(|e| super::mapear_error(e, &estado, &almacen))?;
            let historial: Vec<VehiculoHistorial> = cliente
                .get("/vehiculos/historial")
                .await
                .map_err(|e| super::mapear_error(e, &estado, &almacen))?;
            let hoy = activos
                .iter()
                .map(|v| v.fecha_entrada.as_str())
                .chain(historial.iter().map(|v| v.fecha_entrada.as_str()))
                .filter(|fecha| es_de_hoy(fecha))
                .count();
            entradas_en_palabras(hoy)
        }
        Intencion::BuscarPlaca(None) => {
            "Por favor, especifica una placa para buscar. Ejemplo: 'Buscar placa ABC123'"
                .to_string()
        }
        Intencion::BuscarPlaca(Some(placa)) => {
            let busqueda: Option<BusquedaVehiculo> = cliente
                .get_opcional(&format!("/vehiculos/buscar/{}", placa))
                .await
                .map_err(|e| super::mapear_error(e, &estado, &almacen))?;
            match busqueda {
                Some(encontrado) => describir_busqueda(&placa, &encontrado),
                None => format!("No encontré ningún vehículo con la placa {}.", placa),
            }
        }
        Intencion::Historial => {
            let historial: Vec<VehiculoHistorial> = cliente
                .get("/vehiculos/historial")
                .await
                .map_err(|e| super::mapear_error(e, &estado, &almacen))?;
            describir_historial(&historial)
        }
        Intencion::Estadisticas => {
            let activos: Vec<VehiculoActivo> = cliente
                .get("/vehiculos/activos")
                .await
                .map_err(|e| super::mapear_error(e, &estado, &almacen))?;
            let historial: Vec<VehiculoHistorial> = cliente
                .get("/vehiculos/historial")
                .await
                .map_err(|e| super::mapear_error(e, &estado, &almacen))?;
            let de_hoy: Vec<&VehiculoHistorial> = historial
                .iter()
                .filter(|v| es_de_hoy(&v.fecha_salida))
                .collect();
            let recaudado = de_hoy.iter().map(|v| v.total_facturado).sum();
            describir_estadisticas(activos.len(), de_hoy.len(), recaudado)
        }
        Intencion::CuposDisponibles => {
            let configuracion: Configuracion = cliente
                .get("/configuracion/")
                .await
                .map_err(|e| super::mapear_error(e, &estado, &almacen))?;
            let activos: Vec<VehiculoActivo> = cliente
                .get("/vehiculos/activos")
                .await
                .map_err(|e| super::mapear_error(e, &estado, &almacen))?;
            let resumen = super::dashboard::resumir(configuracion.total_cupos, activos.len() as i64);
            format!(
                "Hay {} cupos disponibles de {} en total.",
                resumen.disponibles, resumen.total_cupos
            )
        }
        Intencion::UltimaDeteccion => match monitor.instantanea().ultima {
            Some(d) => format!(
                "La última placa detectada fue {} a las {}.",
                d.placa,
                utils::formatear_fecha(&d.timestamp)
            ),
            None => "No hay detecciones recientes.".to_string(),
        },
        Intencion::Desconocida => {
            "Lo siento, no entendí tu comando. Intenta preguntarme: ¿Cuántos carros hay? o Buscar placa ABC123"
                .to_string()
        }
    };
    Ok(respuesta)
}

fn es_de_hoy(fecha: &str) -> bool {
    utils::parsear_fecha(fecha)
        .map(|f| f.date_naive() == chrono::Utc::now().date_naive())
        .unwrap_or(false)
}

fn tipo_mime_audio(nombre: &str) -> &'static str {
    let extension = nombre.rsplit('.').next().unwrap_or("").to_lowercase();
    match extension.as_str() {
        "mp3" => "audio/mpeg",
        "webm" => "audio/webm",
        "ogg" => "audio/ogg",
        "m4a" | "mp4" => "audio/mp4",
        _ => "audio/wav",
    }
}

fn conteo_en_palabras(cantidad: usize) -> String {
    match cantidad {
        0 => "No hay vehículos en el parqueadero actualmente.".to_string(),
        1 => "Hay 1 vehículo en el parqueadero.".to_string(),
        n => format!("Hay {} vehículos en el parqueadero actualmente.", n),
    }
}

fn entradas_en_palabras(cantidad: usize) -> String {
    match cantidad {
        0 => "Hoy no han ingresado vehículos.".to_string(),
        1 => "Hoy ha ingresado 1 vehículo.".to_string(),
        n => format!("Hoy han ingresado {} vehículos.", n),
    }
}

fn describir_busqueda(placa: &str, busqueda: &BusquedaVehiculo) -> String {
    match &busqueda.vehiculo {
        VehiculoEncontrado::Activo(v) => format!(
            "La placa {} está activa en el parqueadero. Ingresó el {}.",
            placa,
            utils::formatear_fecha(&v.fecha_entrada)
        ),
        VehiculoEncontrado::Historial(v) => format!(
            "La placa {} ya salió. Ingresó el {}, salió el {}. Total: {}",
            placa,
            utils::formatear_fecha(&v.fecha_entrada),
            utils::formatear_fecha(&v.fecha_salida),
            utils::formatear_monto(v.total_facturado)
        ),
    }
}

fn describir_historial(historial: &[VehiculoHistorial]) -> String {
    if historial.is_empty() {
        return "No hay vehículos en el historial todavía.".to_string();
    }
    let total: f64 = historial.iter().map(|v| v.total_facturado).sum();
    format!(
        "Hay {} vehículos en el historial, con un total facturado de {}.",
        historial.len(),
        utils::formatear_monto(total)
    )
}

fn describir_estadisticas(activos: usize, salidos: usize, recaudado: f64) -> String {
    format!(
        "Estadísticas del día: {} vehículos activos, {} han salido, recaudado {}.",
        activos,
        salidos,
        utils::formatear_monto(recaudado)
    )
}

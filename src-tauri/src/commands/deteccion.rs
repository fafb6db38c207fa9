use crate::almacen::Almacen;
use crate::api::ClienteApi;
use crate::models::{Deteccion, EstadoDeteccion};
use crate::monitor::{self, MonitorDeteccion};
use crate::sesion::SesionState;
use serde::Deserialize;
use tauri::{AppHandle, State};

/// Respuesta de /events/last-detection; la placa es null si el backend
/// aún no ha visto ninguna
#[derive(Debug, Deserialize)]
struct UltimaDeteccion {
    placa: Option<String>,
    timestamp: Option<String>,
    vehicle_type: Option<String>,
}

/// Lista de cámaras del servicio de video
#[derive(Debug, Deserialize)]
struct ListaCamaras {
    cameras: Vec<String>,
}

/// Estado actual del panel de detección en vivo
#[tauri::command]
pub fn estado_deteccion(monitor: State<MonitorDeteccion>) -> Result<EstadoDeteccion, String> {
    Ok(monitor.instantanea())
}

/// Conecta el stream de detecciones del backend en segundo plano
#[tauri::command]
pub fn iniciar_monitoreo(app: AppHandle, almacen: State<Almacen>) -> Result<(), String> {
    let url = format!("{}/events/stream", almacen.api_url());
    monitor::iniciar(app, url);
    Ok(())
}

/// Corta el stream de detecciones
#[tauri::command]
pub fn detener_monitoreo(monitor: State<MonitorDeteccion>) -> Result<(), String> {
    monitor.detener();
    Ok(())
}

/// Última detección que registró el backend; siembra el panel cuando
/// el stream todavía no ha traído nada
#[tauri::command]
pub async fn ultima_deteccion(
    estado: State<'_, SesionState>,
    almacen: State<'_, Almacen>,
    monitor: State<'_, MonitorDeteccion>,
) -> Result<Option<Deteccion>, String> {
    let cliente = super::cliente(&almacen, &estado)?;
    let ultima: UltimaDeteccion = cliente
        .get("/events/last-detection")
        .await
        .map_err(|e| super::mapear_error(e, &estado, &almacen))?;

    let deteccion = ultima.placa.map(|placa| Deteccion {
        placa,
        timestamp: ultima.timestamp.unwrap_or_default(),
        vehicle_type: ultima.vehicle_type,
    });
    if let Some(d) = &deteccion {
        monitor.sembrar_ultima(d.clone());
    }
    Ok(deteccion)
}

/// Cámaras disponibles en el servicio de video
#[tauri::command]
pub async fn listar_camaras(almacen: State<'_, Almacen>) -> Result<Vec<String>, String> {
    let cliente = ClienteApi::new(&almacen.stream_url(), None).map_err(|e| e.to_string())?;
    let lista: ListaCamaras = cliente.get("/cameras").await.map_err(|e| e.to_string())?;
    Ok(lista.cameras)
}

/// URL del stream MJPEG de una cámara, para incrustarlo en el panel
#[tauri::command]
pub fn url_stream_camara(almacen: State<Almacen>, camara: String) -> Result<String, String> {
    Ok(format!("{}/cameras/{}/stream", almacen.stream_url(), camara))
}

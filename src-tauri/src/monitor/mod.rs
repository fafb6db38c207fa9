use crate::actividad::{evento_de_deteccion, FeedActividad};
use crate::models::{Deteccion, EstadoDeteccion, EventoStream};
use eventsource_stream::Eventsource;
use futures_util::StreamExt;
use std::sync::Mutex;
use std::time::Duration;
use tauri::{AppHandle, Emitter, Manager};

/// Cuántas detecciones recientes conserva el panel
pub const MAX_RECIENTES: usize = 5;

/// Pausa fija antes de reintentar la conexión del stream
const REINTENTO: Duration = Duration::from_secs(3);

/// Puente con el stream de detecciones del backend. Mantiene la última
/// placa vista, una lista corta de recientes y el estado de la conexión.
pub struct MonitorDeteccion {
    estado: Mutex<EstadoDeteccion>,
    tarea: Mutex<Option<tauri::async_runtime::JoinHandle<()>>>,
}

impl MonitorDeteccion {
    pub fn new() -> Self {
        MonitorDeteccion {
            estado: Mutex::new(EstadoDeteccion::default()),
            tarea: Mutex::new(None),
        }
    }

    pub fn instantanea(&self) -> EstadoDeteccion {
        self.estado.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Registra una detección aceptada: última vista más lista acotada
    pub fn registrar(&self, deteccion: Deteccion) {
        if let Ok(mut estado) = self.estado.lock() {
            estado.recientes.insert(0, deteccion.clone());
            estado.recientes.truncate(MAX_RECIENTES);
            estado.ultima = Some(deteccion);
        }
    }

    /// Siembra la última detección conocida (consulta al arrancar el
    /// panel) sin pisar lo que ya haya llegado por el stream
    pub fn sembrar_ultima(&self, deteccion: Deteccion) {
        if let Ok(mut estado) = self.estado.lock() {
            if estado.ultima.is_none() {
                estado.ultima = Some(deteccion);
            }
        }
    }

    fn marcar_conexion(&self, conectado: bool, error: Option<String>) {
        if let Ok(mut estado) = self.estado.lock() {
            estado.conectado = conectado;
            estado.ultimo_error = error;
        }
    }

    /// Corta la conexión del stream de inmediato
    pub fn detener(&self) {
        if let Ok(mut tarea) = self.tarea.lock() {
            if let Some(handle) = tarea.take() {
                handle.abort();
            }
        }
        self.marcar_conexion(false, None);
    }
}

/// Interpreta un mensaje del stream. Solo `vehicle_detected` produce una
/// detección; otros tipos de evento y los mensajes ilegibles se ignoran.
pub fn procesar_mensaje(datos: &str) -> Option<Deteccion> {
    let evento: EventoStream = serde_json::from_str(datos).ok()?;
    if evento.event_type != "vehicle_detected" {
        return None;
    }
    Some(Deteccion {
        placa: evento.placa?,
        timestamp: evento.timestamp.unwrap_or_default(),
        vehicle_type: evento.vehicle_type,
    })
}

/// Abre la conexión SSE en segundo plano. Si ya había una, la reemplaza.
pub fn iniciar(app: AppHandle, url: String) {
    let monitor = app.state::<MonitorDeteccion>();
    monitor.detener();

    let app_tarea = app.clone();
    let handle = tauri::async_runtime::spawn(async move {
        bucle_stream(app_tarea, url).await;
    });

    if let Ok(mut tarea) = monitor.tarea.lock() {
        *tarea = Some(handle);
    }
}

/// Conecta, consume y reintenta para siempre con una pausa fija. La tarea
/// muere solo cuando el monitor la aborta.
async fn bucle_stream(app: AppHandle, url: String) {
    loop {
        match conectar(&url).await {
            Ok(respuesta) => {
                log::info!("Conectado al stream de detecciones en {}", url);
                app.state::<MonitorDeteccion>().marcar_conexion(true, None);
                let motivo = consumir_stream(&app, respuesta).await;
                app.state::<MonitorDeteccion>().marcar_conexion(false, motivo);
            }
            Err(e) => {
                log::warn!("No se pudo conectar al stream de detecciones: {}", e);
                app.state::<MonitorDeteccion>()
                    .marcar_conexion(false, Some(e));
            }
        }
        tokio::time::sleep(REINTENTO).await;
    }
}

// El stream es un endpoint público: no se adjunta el token porque el
// transporte de eventos no admite encabezados propios.
async fn conectar(url: &str) -> Result<reqwest::Response, String> {
    let respuesta = reqwest::Client::new()
        .get(url)
        .send()
        .await
        .map_err(|e| e.to_string())?;
    let status = respuesta.status();
    if !status.is_success() {
        return Err(format!("HTTP {}", status.as_u16()));
    }
    Ok(respuesta)
}

/// Consume el stream hasta que se corte; retorna el motivo si fue un error
async fn consumir_stream(app: &AppHandle, respuesta: reqwest::Response) -> Option<String> {
    let mut stream = respuesta.bytes_stream().eventsource();
    while let Some(mensaje) = stream.next().await {
        match mensaje {
            Ok(mensaje) => {
                if let Some(deteccion) = procesar_mensaje(&mensaje.data) {
                    repartir(app, deteccion);
                }
            }
            Err(e) => {
                log::warn!("Stream de detecciones interrumpido: {}", e);
                return Some(e.to_string());
            }
        }
    }
    log::info!("El servidor cerró el stream de detecciones");
    None
}

/// Reparte una detección: actualiza el panel, alimenta el feed de
/// actividad y la reemite a la ventana
fn repartir(app: &AppHandle, deteccion: Deteccion) {
    app.state::<MonitorDeteccion>().registrar(deteccion.clone());
    app.state::<FeedActividad>()
        .registrar(evento_de_deteccion(&deteccion));
    if let Err(e) = app.emit("deteccion", &deteccion) {
        log::warn!("No se pudo emitir la detección a la ventana: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deteccion(placa: &str, timestamp: &str) -> Deteccion {
        Deteccion {
            placa: placa.to_string(),
            timestamp: timestamp.to_string(),
            vehicle_type: Some("car".to_string()),
        }
    }

    #[test]
    fn acepta_solo_eventos_de_deteccion() {
        let mensaje = r#"{"event_type":"vehicle_detected","placa":"ABC123","timestamp":"2026-03-10T08:00:00Z","vehicle_type":"car"}"#;
        let d = procesar_mensaje(mensaje).unwrap();
        assert_eq!(d.placa, "ABC123");
        assert_eq!(d.vehicle_type.as_deref(), Some("car"));

        let otro = r#"{"event_type":"heartbeat","timestamp":"2026-03-10T08:00:00Z"}"#;
        assert!(procesar_mensaje(otro).is_none());
    }

    #[test]
    fn mensajes_ilegibles_se_descartan_sin_error() {
        assert!(procesar_mensaje("").is_none());
        assert!(procesar_mensaje("esto no es json").is_none());
        assert!(procesar_mensaje(r#"{"placa":"ABC123"}"#).is_none());
        // Sin placa no hay detección que mostrar
        assert!(procesar_mensaje(r#"{"event_type":"vehicle_detected"}"#).is_none());
    }

    #[test]
    fn conserva_las_ultimas_detecciones_acotadas() {
        let monitor = MonitorDeteccion::new();
        for i in 0..8 {
            monitor.registrar(deteccion(
                &format!("PLC{:03}", i),
                &format!("2026-03-10T08:0{}:00Z", i % 10),
            ));
        }

        let estado = monitor.instantanea();
        assert_eq!(estado.recientes.len(), MAX_RECIENTES);
        assert_eq!(estado.recientes[0].placa, "PLC007");
        assert_eq!(estado.ultima.unwrap().placa, "PLC007");
    }

    #[test]
    fn sembrar_no_pisa_una_deteccion_ya_vista() {
        let monitor = MonitorDeteccion::new();
        monitor.sembrar_ultima(deteccion("AAA111", "2026-03-10T08:00:00Z"));
        assert_eq!(monitor.instantanea().ultima.unwrap().placa, "AAA111");

        monitor.registrar(deteccion("BBB222", "2026-03-10T09:00:00Z"));
        monitor.sembrar_ultima(deteccion("CCC333", "2026-03-10T07:00:00Z"));
        assert_eq!(monitor.instantanea().ultima.unwrap().placa, "BBB222");
    }

    #[test]
    fn detener_marca_la_conexion_como_cortada() {
        let monitor = MonitorDeteccion::new();
        monitor.marcar_conexion(true, None);
        assert!(monitor.instantanea().conectado);

        monitor.detener();
        let estado = monitor.instantanea();
        assert!(!estado.conectado);
        assert!(estado.ultimo_error.is_none());
    }
}

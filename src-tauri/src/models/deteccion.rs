use serde::{Deserialize, Serialize};

/// Mensaje crudo del stream de eventos del backend
#[derive(Debug, Deserialize, Clone)]
pub struct EventoStream {
    pub event_type: String,
    pub placa: Option<String>,
    pub timestamp: Option<String>,
    pub vehicle_type: Option<String>,
}

/// Una detección de placa aceptada por el monitor
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Deteccion {
    pub placa: String,
    pub timestamp: String,
    pub vehicle_type: Option<String>,
}

/// Estado del panel de detección en vivo
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct EstadoDeteccion {
    pub ultima: Option<Deteccion>,
    pub recientes: Vec<Deteccion>,
    pub conectado: bool,
    pub ultimo_error: Option<String>,
}

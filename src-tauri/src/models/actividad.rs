use serde::{Deserialize, Serialize};

/// Evento del feed de actividad, derivado de tickets o del stream
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EventoActividad {
    pub id: String,
    pub tipo: String,
    pub descripcion: String,
    pub created_at: String,
}

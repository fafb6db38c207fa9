use serde::{Deserialize, Serialize};

/// Turno de trabajo de un cajero
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Turno {
    pub id: i64,
    pub usuario_id: Option<i64>,
    pub fecha_inicio: String,
    pub fecha_fin: Option<String>,
    pub monto_inicial: Option<f64>,
    pub monto_total: Option<f64>,
    pub estado: String,
    pub observaciones: Option<String>,
    /// true cuando el turno ya quedó consolidado en un cierre de caja
    #[serde(default)]
    pub incluido_en_cierre: Option<bool>,
    /// Vehículos atendidos; el backend lo agrega al cerrar el turno
    #[serde(default)]
    pub total_vehiculos: Option<i64>,
    #[serde(default)]
    pub created_at: Option<String>,
}

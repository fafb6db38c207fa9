use serde::{Deserialize, Serialize};

/// Cierre de caja: consolida un turno cerrado en sus totales
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Cierre {
    pub id: i64,
    pub turno_id: i64,
    pub total_vehiculos: i64,
    pub total_recaudado: f64,
    pub fecha_cierre: String,
    pub observaciones: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

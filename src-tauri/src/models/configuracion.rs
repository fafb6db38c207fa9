use serde::{Deserialize, Serialize};

/// Configuración del parqueadero (capacidad total)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Configuracion {
    pub id: i64,
    pub total_cupos: i64,
}

/// Tarjetas del tablero: capacidad, ocupación y disponibilidad
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ResumenDashboard {
    pub total_cupos: i64,
    pub ocupados: i64,
    pub disponibles: i64,
    pub porcentaje_ocupacion: f64,
}

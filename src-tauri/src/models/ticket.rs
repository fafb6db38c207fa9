use serde::{Deserialize, Serialize};

/// Vehículo con ticket abierto (está dentro del parqueadero)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct VehiculoActivo {
    pub id: i64,
    pub placa: String,
    pub fecha_entrada: String,
    pub espacio: Option<String>,
    pub turno_id: Option<i64>,
}

/// Vehículo con ticket cerrado (ya salió)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct VehiculoHistorial {
    pub id: i64,
    pub placa: String,
    pub fecha_entrada: String,
    pub fecha_salida: String,
    pub total_facturado: f64,
    pub turno_id: Option<i64>,
}

/// Vehículo activo con la duración de la estancia ya formateada
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct VehiculoActivoVista {
    #[serde(flatten)]
    pub vehiculo: VehiculoActivo,
    pub duracion: String,
}

/// Vehículo encontrado al buscar por placa. El historial va primero:
/// un registro cerrado también deserializa como activo.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(untagged)]
pub enum VehiculoEncontrado {
    Historial(VehiculoHistorial),
    Activo(VehiculoActivo),
}

/// Resultado de buscar una placa: el vehículo y en qué estado se encontró
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BusquedaVehiculo {
    pub vehiculo: VehiculoEncontrado,
    pub estado: String,
}

/// Ticket de parqueo como lo muestran las pantallas: una estancia
/// desde la entrada hasta la salida, con el monto una vez cerrado
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Ticket {
    pub id: i64,
    pub placa: String,
    pub hora_entrada: String,
    pub hora_salida: Option<String>,
    pub estado: String,
    pub monto_total: Option<f64>,
}

impl Ticket {
    pub fn abierto(v: &VehiculoActivo) -> Self {
        Ticket {
            id: v.id,
            placa: v.placa.clone(),
            hora_entrada: v.fecha_entrada.clone(),
            hora_salida: None,
            estado: "abierto".to_string(),
            monto_total: None,
        }
    }

    pub fn cerrado(v: &VehiculoHistorial) -> Self {
        Ticket {
            id: v.id,
            placa: v.placa.clone(),
            hora_entrada: v.fecha_entrada.clone(),
            hora_salida: Some(v.fecha_salida.clone()),
            estado: "cerrado".to_string(),
            monto_total: Some(v.total_facturado),
        }
    }
}

/// Página del historial tras filtrar y paginar en el cliente
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PaginaHistorial {
    pub vehiculos: Vec<VehiculoHistorial>,
    pub total: usize,
    pub pagina: usize,
    pub paginas: usize,
}

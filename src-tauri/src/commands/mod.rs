pub mod cierres;
pub mod configuracion;
pub mod dashboard;
pub mod deteccion;
pub mod sesion;
pub mod turnos;
pub mod usuarios;
pub mod vehiculos;
pub mod voz;

use crate::almacen::Almacen;
use crate::api::{ClienteApi, ErrorApi};
use crate::sesion::SesionState;

/// Cliente del backend con el token de la sesión activa, si hay una
pub(crate) fn cliente(almacen: &Almacen, estado: &SesionState) -> Result<ClienteApi, String> {
    ClienteApi::new(&almacen.api_url(), crate::sesion::token_actual(estado))
        .map_err(|e| e.to_string())
}

/// Traduce un error del gateway al mensaje que ve la pantalla. Un 401
/// borra la sesión local para que la siguiente lectura caiga en el login.
pub(crate) fn mapear_error(error: ErrorApi, estado: &SesionState, almacen: &Almacen) -> String {
    if matches!(error, ErrorApi::NoAutorizado(_)) {
        crate::sesion::limpiar(estado, almacen);
    }
    error.to_string()
}

use crate::actividad::{eventos_de_vehiculos, feed_reciente, ordenar_descendente, FeedActividad};
use crate::almacen::Almacen;
use crate::models::{
    Configuracion, EventoActividad, ResumenDashboard, VehiculoActivo, VehiculoHistorial,
};
use crate::sesion::SesionState;
use tauri::State;

/// Tarjetas del tablero: capacidad, ocupación y disponibilidad
#[tauri::command]
pub async fn resumen_dashboard(
    estado: State<'_, SesionState>,
    almacen: State<'_, Almacen>,
) -> Result<ResumenDashboard, String> {
    let cliente = super::cliente(&almacen, &estado)?;
    let configuracion: Configuracion = cliente
        .get("/configuracion/")
        .await
        .map_err(|e| super::mapear_error(e, &estado, &almacen))?;
    let activos: Vec<VehiculoActivo> = cliente
        .get("/vehiculos/activos")
        .await
        .map_err(|e| super::mapear_error(e, &estado, &almacen))?;

    Ok(resumir(configuracion.total_cupos, activos.len() as i64))
}

/// Las actividades más recientes: eventos derivados de los tickets
/// consultados combinados con los empujados por el stream
#[tauri::command]
pub async fn actividad_reciente(
    estado: State<'_, SesionState>,
    almacen: State<'_, Almacen>,
    feed: State<'_, FeedActividad>,
) -> Result<Vec<EventoActividad>, String> {
    let cliente = super::cliente(&almacen, &estado)?;
    let activos: Vec<VehiculoActivo> = cliente
        .get("/vehiculos/activos")
        .await
        .map_err(|e| super::mapear_error(e, &estado, &almacen))?;
    let historial: Vec<VehiculoHistorial> = cliente
        .get("/vehiculos/historial")
        .await
        .map_err(|e| super::mapear_error(e, &estado, &almacen))?;

    Ok(feed_reciente(
        eventos_de_vehiculos(&activos, &historial),
        &feed.instantanea(),
    ))
}

/// Registro completo de actividad, del más reciente al más viejo
#[tauri::command]
pub async fn actividad_completa(
    estado: State<'_, SesionState>,
    almacen: State<'_, Almacen>,
) -> Result<Vec<EventoActividad>, String> {
    let cliente = super::cliente(&almacen, &estado)?;
    let activos: Vec<VehiculoActivo> = cliente
        .get("/vehiculos/activos")
        .await
        .map_err(|e| super::mapear_error(e, &estado, &almacen))?;
    let historial: Vec<VehiculoHistorial> = cliente
        .get("/vehiculos/historial")
        .await
        .map_err(|e| super::mapear_error(e, &estado, &almacen))?;

    let mut eventos = eventos_de_vehiculos(&activos, &historial);
    ordenar_descendente(&mut eventos);
    Ok(eventos)
}

/// Números del tablero a partir de la capacidad y los vehículos activos
pub(crate) fn resumir(total_cupos: i64, ocupados: i64) -> ResumenDashboard {
    let disponibles = (total_cupos - ocupados).max(0);
    let porcentaje_ocupacion = if total_cupos > 0 {
        (ocupados as f64 / total_cupos as f64 * 100.0).round()
    } else {
        0.0
    };
    ResumenDashboard {
        total_cupos,
        ocupados,
        disponibles,
        porcentaje_ocupacion,
    }
}

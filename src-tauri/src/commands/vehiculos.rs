use crate::actividad::{evento_de_salida, FeedActividad};
use crate::almacen::Almacen;
use crate::models::{
    BusquedaVehiculo, PaginaHistorial, Ticket, VehiculoActivo, VehiculoActivoVista,
    VehiculoHistorial,
};
use crate::sesion::SesionState;
use crate::utils;
use chrono::SecondsFormat;
use tauri::State;

/// Tamaño de página del historial cuando la pantalla no pide otro
const POR_PAGINA_DEFECTO: usize = 20;

/// Registra la entrada de un vehículo y abre su ticket
#[tauri::command]
pub async fn registrar_entrada(
    estado: State<'_, SesionState>,
    almacen: State<'_, Almacen>,
    placa: String,
) -> Result<Ticket, String> {
    let placa = utils::normalizar_placa(&placa);
    if placa.is_empty() {
        return Err("La placa es obligatoria".to_string());
    }

    let cliente = super::cliente(&almacen, &estado)?;
    let vehiculo: VehiculoActivo = cliente
        .post("/vehiculos/entrada", &serde_json::json!({ "placa": placa }))
        .await
        .map_err(|e| super::mapear_error(e, &estado, &almacen))?;
    Ok(Ticket::abierto(&vehiculo))
}

/// Registra la salida de un vehículo, cierra su ticket y refleja la
/// salida en el feed de actividad
#[tauri::command]
pub async fn registrar_salida(
    estado: State<'_, SesionState>,
    almacen: State<'_, Almacen>,
    feed: State<'_, FeedActividad>,
    placa: String,
) -> Result<Ticket, String> {
    let placa = utils::normalizar_placa(&placa);
    if placa.is_empty() {
        return Err("La placa es obligatoria".to_string());
    }

    // La fecha de salida la pone el cliente; el monto lo calcula el backend
    let cuerpo = serde_json::json!({
        "placa": placa,
        "fecha_salida": chrono::Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    });
    let cliente = super::cliente(&almacen, &estado)?;
    let vehiculo: VehiculoHistorial = cliente
        .post("/vehiculos/salida", &cuerpo)
        .await
        .map_err(|e| super::mapear_error(e, &estado, &almacen))?;

    feed.registrar(evento_de_salida(&vehiculo));
    Ok(Ticket::cerrado(&vehiculo))
}

/// Vehículos dentro del parqueadero, con la duración de la estancia
#[tauri::command]
pub async fn listar_vehiculos_activos(
    estado: State<'_, SesionState>,
    almacen: State<'_, Almacen>,
) -> Result<Vec<VehiculoActivoVista>, String> {
    let cliente = super::cliente(&almacen, &estado)?;
    let activos: Vec<VehiculoActivo> = cliente
        .get("/vehiculos/activos")
        .await
        .map_err(|e| super::mapear_error(e, &estado, &almacen))?;

    Ok(activos
        .into_iter()
        .map(|vehiculo| {
            let duracion = utils::duracion_desde(&vehiculo.fecha_entrada);
            VehiculoActivoVista { vehiculo, duracion }
        })
        .collect())
}

/// Historial de salidas, filtrado por placa y paginado en el cliente
#[tauri::command]
pub async fn listar_historial(
    estado: State<'_, SesionState>,
    almacen: State<'_, Almacen>,
    filtro: Option<String>,
    pagina: Option<usize>,
    por_pagina: Option<usize>,
) -> Result<PaginaHistorial, String> {
    let cliente = super::cliente(&almacen, &estado)?;
    let historial: Vec<VehiculoHistorial> = cliente
        .get("/vehiculos/historial")
        .await
        .map_err(|e| super::mapear_error(e, &estado, &almacen))?;

    let filtrados = filtrar_historial(historial, filtro.as_deref());
    let pagina = pagina.unwrap_or(1).max(1);
    let por_pagina = por_pagina.unwrap_or(POR_PAGINA_DEFECTO);
    let total = filtrados.len();
    Ok(PaginaHistorial {
        vehiculos: utils::paginar(&filtrados, pagina, por_pagina),
        total,
        pagina,
        paginas: utils::total_paginas(total, por_pagina),
    })
}

/// Busca una placa en activos y en el historial
#[tauri::command]
pub async fn buscar_por_placa(
    estado: State<'_, SesionState>,
    almacen: State<'_, Almacen>,
    placa: String,
) -> Result<BusquedaVehiculo, String> {
    let placa = utils::normalizar_placa(&placa);
    if placa.is_empty() {
        return Err("La placa es obligatoria".to_string());
    }

    let cliente = super::cliente(&almacen, &estado)?;
    cliente
        .get(&format!("/vehiculos/buscar/{}", placa))
        .await
        .map_err(|e| super::mapear_error(e, &estado, &almacen))
}

/// Filtro en cliente por subcadena de placa
pub(crate) fn filtrar_historial(
    historial: Vec<VehiculoHistorial>,
    filtro: Option<&str>,
) -> Vec<VehiculoHistorial> {
    match filtro {
        Some(termino) if !termino.trim().is_empty() => historial
            .into_iter()
            .filter(|v| utils::coincide_placa(&v.placa, termino))
            .collect(),
        _ => historial,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cerrado(id: i64, placa: &str) -> VehiculoHistorial {
        VehiculoHistorial {
            id,
            placa: placa.to_string(),
            fecha_entrada: "2026-03-10T08:00:00Z".to_string(),
            fecha_salida: "2026-03-10T10:00:00Z".to_string(),
            total_facturado: 10000.0,
            turno_id: Some(1),
        }
    }

    #[test]
    fn filtra_por_subcadena_de_placa() {
        let historial = vec![cerrado(1, "ABC123"), cerrado(2, "XYZ987"), cerrado(3, "JAB-C45")];

        let filtrados = filtrar_historial(historial, Some("ABC"));
        let placas: Vec<&str> = filtrados.iter().map(|v| v.placa.as_str()).collect();
        assert_eq!(placas, ["ABC123"]);
    }

    #[test]
    fn filtro_vacio_o_ausente_no_filtra() {
        let historial = vec![cerrado(1, "ABC123"), cerrado(2, "XYZ987")];
        assert_eq!(filtrar_historial(historial.clone(), None).len(), 2);
        assert_eq!(filtrar_historial(historial.clone(), Some("")).len(), 2);
        assert_eq!(filtrar_historial(historial, Some("   ")).len(), 2);
    }

    #[test]
    fn el_filtro_ignora_mayusculas() {
        let historial = vec![cerrado(1, "ABC123"), cerrado(2, "XYZ987")];
        let filtrados = filtrar_historial(historial, Some("abc1"));
        assert_eq!(filtrados.len(), 1);
        assert_eq!(filtrados[0].id, 1);
    }
}

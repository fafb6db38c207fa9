use crate::almacen::Almacen;
use crate::models::Turno;
use crate::sesion::{actualizar_token, es_admin, SesionState};
use crate::utils::texto_opcional;
use serde::Deserialize;
use tauri::State;

/// Respuesta de iniciar turno: el turno más el token reemitido con el
/// claim del turno adentro
#[derive(Debug, Deserialize)]
struct TurnoIniciado {
    #[serde(flatten)]
    turno: Turno,
    access_token: String,
}

/// Respuesta de cerrar turno; el backend puede reemitir el token ya
/// sin el claim del turno
#[derive(Debug, Deserialize)]
struct TurnoCerrado {
    #[serde(flatten)]
    turno: Turno,
    access_token: Option<String>,
}

/// Inicia el turno del usuario con el monto de base en caja. El token
/// reemitido reemplaza la sesión para que el resto de pantallas vean
/// el turno abierto.
#[tauri::command]
pub async fn iniciar_turno(
    estado: State<'_, SesionState>,
    almacen: State<'_, Almacen>,
    monto_inicial: f64,
    observaciones: Option<String>,
) -> Result<Turno, String> {
    if !monto_inicial.is_finite() || monto_inicial <= 0.0 {
        return Err("El monto inicial es obligatorio y debe ser mayor a 0".to_string());
    }

    let cliente = super::cliente(&almacen, &estado)?;
    let cuerpo = serde_json::json!({
        "monto_inicial": monto_inicial,
        "observaciones": texto_opcional(observaciones),
    });
    let iniciado: TurnoIniciado = cliente
        .post("/turnos/iniciar", &cuerpo)
        .await
        .map_err(|e| super::mapear_error(e, &estado, &almacen))?;

    actualizar_token(&estado, &almacen, &iniciado.access_token)?;
    Ok(iniciado.turno)
}

/// Cierra el turno abierto del usuario. El total recaudado y los
/// vehículos atendidos vienen en el turno que retorna el backend.
#[tauri::command]
pub async fn cerrar_turno(
    estado: State<'_, SesionState>,
    almacen: State<'_, Almacen>,
) -> Result<Turno, String> {
    let cliente = super::cliente(&almacen, &estado)?;
    let cerrado: TurnoCerrado = cliente
        .post_vacio("/turnos/cerrar")
        .await
        .map_err(|e| super::mapear_error(e, &estado, &almacen))?;

    if let Some(token) = &cerrado.access_token {
        actualizar_token(&estado, &almacen, token)?;
    }
    Ok(cerrado.turno)
}

/// Cierra un turno específico; un cajero solo puede cerrar el propio
#[tauri::command]
pub async fn cerrar_turno_por_id(
    estado: State<'_, SesionState>,
    almacen: State<'_, Almacen>,
    id: i64,
) -> Result<Turno, String> {
    let cliente = super::cliente(&almacen, &estado)?;
    cliente
        .post_vacio(&format!("/turnos/{}/cerrar", id))
        .await
        .map_err(|e| super::mapear_error(e, &estado, &almacen))
}

/// Turno abierto del usuario, o null si no tiene uno
#[tauri::command]
pub async fn turno_actual(
    estado: State<'_, SesionState>,
    almacen: State<'_, Almacen>,
) -> Result<Option<Turno>, String> {
    let cliente = super::cliente(&almacen, &estado)?;
    cliente
        .get_opcional("/turnos/actual")
        .await
        .map_err(|e| super::mapear_error(e, &estado, &almacen))
}

/// Turnos del usuario; el administrador ve los de todos
#[tauri::command]
pub async fn listar_turnos(
    estado: State<'_, SesionState>,
    almacen: State<'_, Almacen>,
) -> Result<Vec<Turno>, String> {
    let ruta = if es_admin(&estado) {
        "/turnos/todos"
    } else {
        "/turnos/"
    };
    let cliente = super::cliente(&almacen, &estado)?;
    cliente
        .get(ruta)
        .await
        .map_err(|e| super::mapear_error(e, &estado, &almacen))
}

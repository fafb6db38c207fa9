use crate::almacen::Almacen;
use crate::models::Cierre;
use crate::sesion::{actualizar_token, verificar_admin, SesionState};
use crate::utils::texto_opcional;
use serde::Deserialize;
use tauri::State;

/// Respuesta de crear un cierre; el backend reemite el token ya sin el
/// claim del turno que acaba de cerrarse
#[derive(Debug, Deserialize)]
struct CierreCreado {
    #[serde(flatten)]
    cierre: Cierre,
    access_token: Option<String>,
}

/// Hace el cierre de caja: cierra el turno abierto del usuario y
/// consolida los totales de sus tickets
#[tauri::command]
pub async fn crear_cierre(
    estado: State<'_, SesionState>,
    almacen: State<'_, Almacen>,
    observaciones: Option<String>,
    turno_id: Option<i64>,
) -> Result<Cierre, String> {
    let cliente = super::cliente(&almacen, &estado)?;
    let cuerpo = serde_json::json!({
        "observaciones": texto_opcional(observaciones),
        "turno_id": turno_id,
    });
    let creado: CierreCreado = cliente
        .post("/cierres/", &cuerpo)
        .await
        .map_err(|e| super::mapear_error(e, &estado, &almacen))?;

    if let Some(token) = &creado.access_token {
        actualizar_token(&estado, &almacen, token)?;
    }
    Ok(creado.cierre)
}

/// Historial de cierres de caja. La pantalla es de administradores:
/// se rechaza localmente antes de llamar al backend.
#[tauri::command]
pub async fn listar_cierres(
    estado: State<'_, SesionState>,
    almacen: State<'_, Almacen>,
) -> Result<Vec<Cierre>, String> {
    verificar_admin(&estado)?;
    let cliente = super::cliente(&almacen, &estado)?;
    cliente
        .get("/cierres/")
        .await
        .map_err(|e| super::mapear_error(e, &estado, &almacen))
}

/// Detalle de un cierre
#[tauri::command]
pub async fn obtener_cierre(
    estado: State<'_, SesionState>,
    almacen: State<'_, Almacen>,
    id: i64,
) -> Result<Cierre, String> {
    verificar_admin(&estado)?;
    let cliente = super::cliente(&almacen, &estado)?;
    cliente
        .get(&format!("/cierres/{}", id))
        .await
        .map_err(|e| super::mapear_error(e, &estado, &almacen))
}

/// Elimina un cierre del historial. Requiere sesión de administrador.
#[tauri::command]
pub async fn eliminar_cierre(
    estado: State<'_, SesionState>,
    almacen: State<'_, Almacen>,
    id: i64,
) -> Result<(), String> {
    verificar_admin(&estado)?;
    let cliente = super::cliente(&almacen, &estado)?;
    cliente
        .delete(&format!("/cierres/{}", id))
        .await
        .map_err(|e| super::mapear_error(e, &estado, &almacen))
}

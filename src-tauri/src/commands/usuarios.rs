use crate::almacen::Almacen;
use crate::models::{NuevoUsuario, UsuarioInfo};
use crate::sesion::{verificar_admin, SesionState};
use serde::Deserialize;
use tauri::State;

/// Roles que acepta el backend
const ROLES_VALIDOS: [&str; 3] = ["admin", "cajero", "vigilante"];

/// Respuesta de las acciones que solo confirman con un mensaje
#[derive(Debug, Deserialize)]
struct MensajeRespuesta {
    mensaje: String,
}

/// Lista todos los usuarios. Requiere sesión de administrador.
#[tauri::command]
pub async fn listar_usuarios(
    estado: State<'_, SesionState>,
    almacen: State<'_, Almacen>,
) -> Result<Vec<UsuarioInfo>, String> {
    verificar_admin(&estado)?;

    let cliente = super::cliente(&almacen, &estado)?;
    cliente
        .get("/users/")
        .await
        .map_err(|e| super::mapear_error(e, &estado, &almacen))
}

/// Crea un nuevo usuario. Requiere sesión de administrador.
#[tauri::command]
pub async fn crear_usuario(
    estado: State<'_, SesionState>,
    almacen: State<'_, Almacen>,
    usuario: NuevoUsuario,
) -> Result<UsuarioInfo, String> {
    verificar_admin(&estado)?;

    // Validar campos obligatorios
    let nombre = usuario.nombre.trim();
    let nombre_usuario = usuario.usuario.trim();
    if nombre.is_empty() || nombre_usuario.is_empty() || usuario.password.is_empty() {
        return Err("Todos los campos son obligatorios".to_string());
    }

    // Validar contraseña
    if usuario.password.chars().count() < 4 {
        return Err("La contraseña debe tener al menos 4 caracteres".to_string());
    }

    // Validar rol
    if !ROLES_VALIDOS.contains(&usuario.rol.as_str()) {
        return Err("El rol debe ser admin, cajero o vigilante".to_string());
    }

    let cliente = super::cliente(&almacen, &estado)?;
    let cuerpo = serde_json::json!({
        "nombre": nombre,
        "usuario": nombre_usuario,
        "password": usuario.password,
        "rol": usuario.rol,
    });
    cliente
        .post("/users/", &cuerpo)
        .await
        .map_err(|e| super::mapear_error(e, &estado, &almacen))
}

/// Activa o desactiva un usuario; retorna el mensaje de confirmación
/// del backend. Requiere sesión de administrador.
#[tauri::command]
pub async fn alternar_estado_usuario(
    estado: State<'_, SesionState>,
    almacen: State<'_, Almacen>,
    id: i64,
) -> Result<String, String> {
    verificar_admin(&estado)?;

    let cliente = super::cliente(&almacen, &estado)?;
    let respuesta: MensajeRespuesta = cliente
        .patch(&format!("/users/{}/toggle-status", id))
        .await
        .map_err(|e| super::mapear_error(e, &estado, &almacen))?;
    Ok(respuesta.mensaje)
}

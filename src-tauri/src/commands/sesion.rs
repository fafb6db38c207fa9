use crate::actividad::FeedActividad;
use crate::almacen::Almacen;
use crate::api::ClienteApi;
use crate::models::{SesionActiva, UsuarioInfo};
use crate::monitor::MonitorDeteccion;
use crate::sesion::{self, SesionState};
use serde::Deserialize;
use tauri::State;

/// Respuesta del backend al iniciar sesión
#[derive(Debug, Deserialize)]
struct RespuestaLogin {
    access_token: String,
}

/// Valida credenciales contra el backend y establece la sesión local.
/// El rol y el turno salen de los claims del token; el perfil se carga
/// aparte para mostrar el nombre.
#[tauri::command]
pub async fn iniciar_sesion(
    estado: State<'_, SesionState>,
    almacen: State<'_, Almacen>,
    usuario: String,
    password: String,
) -> Result<SesionActiva, String> {
    let usuario = usuario.trim().to_string();
    if usuario.is_empty() || password.is_empty() {
        return Err("Usuario y contraseña son obligatorios".to_string());
    }

    let cliente = ClienteApi::new(&almacen.api_url(), None).map_err(|e| e.to_string())?;
    let login: RespuestaLogin = cliente
        .post_formulario(
            "/users/login",
            &[("username", usuario.as_str()), ("password", password.as_str())],
        )
        .await
        .map_err(|e| e.to_string())?;

    // El perfil aporta el nombre y el respaldo del rol; si no se puede
    // cargar, la sesión sigue siendo válida con lo que diga el token
    let autenticado = ClienteApi::new(&almacen.api_url(), Some(login.access_token.clone()))
        .map_err(|e| e.to_string())?;
    let perfil: Option<UsuarioInfo> = match autenticado.get("/users/me").await {
        Ok(perfil) => Some(perfil),
        Err(e) => {
            log::warn!("No se pudo cargar el perfil tras el login: {}", e);
            None
        }
    };

    sesion::establecer(&estado, &almacen, &login.access_token, perfil.as_ref())
}

/// Cierra la sesión local, corta el stream de detecciones y vacía el
/// feed para que la próxima sesión no vea eventos ajenos
#[tauri::command]
pub fn cerrar_sesion(
    estado: State<SesionState>,
    almacen: State<Almacen>,
    monitor: State<MonitorDeteccion>,
    feed: State<FeedActividad>,
) -> Result<(), String> {
    monitor.detener();
    feed.vaciar();
    sesion::limpiar(&estado, &almacen);
    Ok(())
}

/// Sesión activa, o null si no hay ninguna
#[tauri::command]
pub fn obtener_sesion_actual(estado: State<SesionState>) -> Result<Option<SesionActiva>, String> {
    let guard = estado.sesion.lock().map_err(|e| e.to_string())?;
    Ok(guard.clone())
}

/// Pantalla a la que debe entrar el usuario: login sin sesión,
/// iniciar-turno si el token no trae turno, dashboard si lo trae
#[tauri::command]
pub fn pantalla_inicial(estado: State<SesionState>) -> Result<String, String> {
    let guard = estado.sesion.lock().map_err(|e| e.to_string())?;
    Ok(sesion::pantalla_inicial(guard.as_ref()).to_string())
}

/// Perfil del usuario autenticado
#[tauri::command]
pub async fn obtener_perfil(
    estado: State<'_, SesionState>,
    almacen: State<'_, Almacen>,
) -> Result<UsuarioInfo, String> {
    let cliente = super::cliente(&almacen, &estado)?;
    cliente
        .get("/users/me")
        .await
        .map_err(|e| super::mapear_error(e, &estado, &almacen))
}

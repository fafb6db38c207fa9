use serde::{Deserialize, Serialize};

/// Info de usuario para enviar al frontend (sin credenciales)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UsuarioInfo {
    pub id: i64,
    pub nombre: String,
    pub usuario: String,
    pub rol: String,
    pub activo: bool,
}

/// Sesión activa del cliente: el token y lo que se deriva de él
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SesionActiva {
    pub token: String,
    pub usuario_id: Option<i64>,
    pub nombre: String,
    pub rol: String,
    pub turno_id: Option<i64>,
}

/// Datos para crear un nuevo usuario
#[derive(Debug, Serialize, Deserialize)]
pub struct NuevoUsuario {
    pub nombre: String,
    pub usuario: String,
    pub password: String,
    pub rol: String,
}

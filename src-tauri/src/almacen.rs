use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Claves conocidas del almacén local
pub const CLAVE_TOKEN: &str = "token";
pub const CLAVE_PERFIL: &str = "perfil";
pub const CLAVE_API_URL: &str = "api_base_url";
pub const CLAVE_STREAM_URL: &str = "stream_base_url";
pub const CLAVE_VOZ_URL: &str = "voz_base_url";

/// URLs por defecto para una instalación en el mismo equipo
const API_URL_DEFECTO: &str = "http://localhost:8000";
const STREAM_URL_DEFECTO: &str = "http://localhost:8001";
const VOZ_URL_DEFECTO: &str = "http://localhost:8002";

/// Almacén clave/valor persistido como JSON en el directorio de datos.
/// Guarda el token de sesión, el perfil y las URLs de los servicios.
pub struct Almacen {
    ruta: PathBuf,
    datos: Mutex<HashMap<String, String>>,
}

impl Almacen {
    pub fn new() -> Self {
        let dir = directorio_datos().unwrap_or_else(|| PathBuf::from("."));
        std::fs::create_dir_all(&dir).ok();
        Self::en_ruta(dir.join("parqueo-desk.json"))
    }

    /// Abre un almacén sobre una ruta concreta
    pub fn en_ruta(ruta: PathBuf) -> Self {
        let datos = leer_datos(&ruta);
        Almacen {
            ruta,
            datos: Mutex::new(datos),
        }
    }

    pub fn obtener(&self, clave: &str) -> Option<String> {
        let datos = self.datos.lock().ok()?;
        datos.get(clave).cloned()
    }

    pub fn guardar(&self, clave: &str, valor: &str) -> Result<(), String> {
        let mut datos = self.datos.lock().map_err(|e| e.to_string())?;
        datos.insert(clave.to_string(), valor.to_string());
        escribir_datos(&self.ruta, &datos)
    }

    pub fn eliminar(&self, clave: &str) -> Result<(), String> {
        let mut datos = self.datos.lock().map_err(|e| e.to_string())?;
        datos.remove(clave);
        escribir_datos(&self.ruta, &datos)
    }

    /// URL base del backend REST
    pub fn api_url(&self) -> String {
        self.obtener(CLAVE_API_URL)
            .unwrap_or_else(|| API_URL_DEFECTO.to_string())
    }

    /// URL base del servicio de cámaras
    pub fn stream_url(&self) -> String {
        self.obtener(CLAVE_STREAM_URL)
            .unwrap_or_else(|| STREAM_URL_DEFECTO.to_string())
    }

    /// URL base del servicio de transcripción de voz
    pub fn voz_url(&self) -> String {
        self.obtener(CLAVE_VOZ_URL)
            .unwrap_or_else(|| VOZ_URL_DEFECTO.to_string())
    }
}

fn leer_datos(ruta: &Path) -> HashMap<String, String> {
    std::fs::read_to_string(ruta)
        .ok()
        .and_then(|texto| serde_json::from_str(&texto).ok())
        .unwrap_or_default()
}

fn escribir_datos(ruta: &Path, datos: &HashMap<String, String>) -> Result<(), String> {
    if let Some(padre) = ruta.parent() {
        std::fs::create_dir_all(padre).ok();
    }
    let texto = serde_json::to_string_pretty(datos).map_err(|e| e.to_string())?;
    std::fs::write(ruta, texto).map_err(|e| e.to_string())
}

/// Retorna el directorio de datos de la aplicación
fn directorio_datos() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var("LOCALAPPDATA")
            .ok()
            .map(|p| PathBuf::from(p).join("ParqueoDesk"))
    }

    #[cfg(not(target_os = "windows"))]
    {
        dirs::home_dir().map(|p| p.join(".parqueo-desk"))
    }
}

use crate::almacen::{Almacen, CLAVE_API_URL, CLAVE_STREAM_URL, CLAVE_VOZ_URL};
use crate::models::Configuracion;
use crate::sesion::{verificar_rol, SesionState};
use std::collections::HashMap;
use tauri::State;

/// Configuración del parqueadero (capacidad total)
#[tauri::command]
pub async fn obtener_configuracion(
    estado: State<'_, SesionState>,
    almacen: State<'_, Almacen>,
) -> Result<Configuracion, String> {
    let cliente = super::cliente(&almacen, &estado)?;
    cliente
        .get("/configuracion/")
        .await
        .map_err(|e| super::mapear_error(e, &estado, &almacen))
}

/// Actualiza el total de cupos del parqueadero. El backend exige al
/// menos rol de cajero; aquí se rechaza antes de llamar.
#[tauri::command]
pub async fn guardar_configuracion(
    estado: State<'_, SesionState>,
    almacen: State<'_, Almacen>,
    total_cupos: i64,
) -> Result<Configuracion, String> {
    verificar_rol(&estado, "cajero")?;
    if total_cupos < 0 {
        return Err("El total de cupos no puede ser negativo".to_string());
    }

    let cliente = super::cliente(&almacen, &estado)?;
    cliente
        .put("/configuracion/", &serde_json::json!({ "total_cupos": total_cupos }))
        .await
        .map_err(|e| super::mapear_error(e, &estado, &almacen))
}

/// Ajustes locales del cliente: las URLs de los servicios
#[tauri::command]
pub fn obtener_ajustes(almacen: State<Almacen>) -> Result<HashMap<String, String>, String> {
    let mut ajustes = HashMap::new();
    ajustes.insert(CLAVE_API_URL.to_string(), almacen.api_url());
    ajustes.insert(CLAVE_STREAM_URL.to_string(), almacen.stream_url());
    ajustes.insert(CLAVE_VOZ_URL.to_string(), almacen.voz_url());
    Ok(ajustes)
}

/// Guarda ajustes locales; solo se aceptan las claves de URLs conocidas
#[tauri::command]
pub fn guardar_ajustes(
    almacen: State<Almacen>,
    ajustes: HashMap<String, String>,
) -> Result<(), String> {
    for (clave, valor) in ajustes {
        match clave.as_str() {
            CLAVE_API_URL | CLAVE_STREAM_URL | CLAVE_VOZ_URL => {
                almacen.guardar(&clave, valor.trim())?;
            }
            _ => return Err(format!("Ajuste desconocido: {}", clave)),
        }
    }
    Ok(())
}

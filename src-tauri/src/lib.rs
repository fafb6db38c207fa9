mod actividad;
mod almacen;
mod api;
mod commands;
mod models;
mod monitor;
mod sesion;
mod utils;

use actividad::FeedActividad;
use almacen::Almacen;
use monitor::MonitorDeteccion;
use sesion::SesionState;
use std::sync::Mutex;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    let almacen = Almacen::new();
    let estado_sesion = SesionState {
        sesion: Mutex::new(sesion::restaurar(&almacen)),
    };

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .plugin(tauri_plugin_dialog::init())
        .plugin(tauri_plugin_process::init())
        .plugin(
            tauri_plugin_log::Builder::new()
                .level(log::LevelFilter::Info)
                .build(),
        )
        .setup(|app| {
            #[cfg(desktop)]
            app.handle()
                .plugin(tauri_plugin_updater::Builder::new().build())?;
            Ok(())
        })
        .manage(almacen)
        .manage(estado_sesion)
        .manage(MonitorDeteccion::new())
        .manage(FeedActividad::new())
        .invoke_handler(tauri::generate_handler![
            // Sesión
            commands::sesion::iniciar_sesion,
            commands::sesion::cerrar_sesion,
            commands::sesion::obtener_sesion_actual,
            commands::sesion::pantalla_inicial,
            commands::sesion::obtener_perfil,
            // Vehículos
            commands::vehiculos::registrar_entrada,
            commands::vehiculos::registrar_salida,
            commands::vehiculos::listar_vehiculos_activos,
            commands::vehiculos::listar_historial,
            commands::vehiculos::buscar_por_placa,
            // Turnos
            commands::turnos::iniciar_turno,
            commands::turnos::cerrar_turno,
            commands::turnos::cerrar_turno_por_id,
            commands::turnos::turno_actual,
            commands::turnos::listar_turnos,
            // Cierres
            commands::cierres::crear_cierre,
            commands::cierres::listar_cierres,
            commands::cierres::obtener_cierre,
            commands::cierres::eliminar_cierre,
            // Usuarios
            commands::usuarios::listar_usuarios,
            commands::usuarios::crear_usuario,
            commands::usuarios::alternar_estado_usuario,
            // Configuración
            commands::configuracion::obtener_configuracion,
            commands::configuracion::guardar_configuracion,
            commands::configuracion::obtener_ajustes,
            commands::configuracion::guardar_ajustes,
            // Dashboard
            commands::dashboard::resumen_dashboard,
            commands::dashboard::actividad_reciente,
            commands::dashboard::actividad_completa,
            // Detección
            commands::deteccion::estado_deteccion,
            commands::deteccion::iniciar_monitoreo,
            commands::deteccion::detener_monitoreo,
            commands::deteccion::ultima_deteccion,
            commands::deteccion::listar_camaras,
            commands::deteccion::url_stream_camara,
            // Voz
            commands::voz::transcribir_audio,
            commands::voz::ejecutar_comando_voz,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application")
}

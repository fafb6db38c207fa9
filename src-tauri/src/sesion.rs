use crate::almacen::{Almacen, CLAVE_PERFIL, CLAVE_TOKEN};
use crate::models::{SesionActiva, UsuarioInfo};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Deserialize;
use std::sync::Mutex;

/// Rol asignado cuando el token no trae uno legible: el de menos privilegios
pub const ROL_POR_DEFECTO: &str = "user";

/// Sesión activa (almacenada en RAM, respaldada en el almacén local)
pub struct SesionState {
    pub sesion: Mutex<Option<SesionActiva>>,
}

/// Claims que el backend emite dentro del JWT
#[derive(Debug, Default, Deserialize)]
pub struct Claims {
    pub sub: Option<String>,
    pub turno_id: Option<i64>,
    pub rol: Option<String>,
    pub exp: Option<i64>,
}

/// Decodifica el payload del JWT sin verificar la firma (eso lo hace el
/// backend en cada petición). Un token malformado produce claims vacíos,
/// nunca un error.
pub fn decodificar_claims(token: &str) -> Claims {
    let mut partes = token.split('.');
    let payload = match (partes.next(), partes.next(), partes.next()) {
        (Some(h), Some(p), Some(f)) if !h.is_empty() && !p.is_empty() && !f.is_empty() => p,
        _ => return Claims::default(),
    };
    let Ok(bytes) = URL_SAFE_NO_PAD.decode(payload) else {
        return Claims::default();
    };
    serde_json::from_slice(&bytes).unwrap_or_default()
}

/// Construye la sesión a partir del token y el perfil (si se pudo cargar).
/// El rol sale del claim, o del perfil, o queda en el mínimo.
pub fn construir_sesion(token: &str, perfil: Option<&UsuarioInfo>) -> SesionActiva {
    let claims = decodificar_claims(token);
    let rol = claims
        .rol
        .or_else(|| perfil.map(|p| p.rol.clone()))
        .unwrap_or_else(|| ROL_POR_DEFECTO.to_string());
    SesionActiva {
        token: token.to_string(),
        usuario_id: claims.sub.and_then(|s| s.parse().ok()),
        nombre: perfil.map(|p| p.nombre.clone()).unwrap_or_default(),
        rol,
        turno_id: claims.turno_id,
    }
}

/// Chequeo de capacidad: el administrador pasa cualquier verificación de rol
pub fn tiene_rol(sesion: &SesionActiva, rol: &str) -> bool {
    sesion.rol == rol || sesion.rol == "admin"
}

/// Verifica que haya sesión y que sea de administrador
pub fn verificar_admin(estado: &SesionState) -> Result<(), String> {
    let guard = estado.sesion.lock().map_err(|e| e.to_string())?;
    match guard.as_ref() {
        Some(s) if s.rol == "admin" => Ok(()),
        Some(_) => Err("Se requiere permisos de administrador".to_string()),
        None => Err("Debe iniciar sesión".to_string()),
    }
}

/// Verifica que haya sesión y que el rol alcance (el admin siempre pasa)
pub fn verificar_rol(estado: &SesionState, rol: &str) -> Result<(), String> {
    let guard = estado.sesion.lock().map_err(|e| e.to_string())?;
    match guard.as_ref() {
        Some(s) if tiene_rol(s, rol) => Ok(()),
        Some(_) => Err(format!("Se requiere rol de {}", rol)),
        None => Err("Debe iniciar sesión".to_string()),
    }
}

/// True si la sesión activa es de administrador
pub fn es_admin(estado: &SesionState) -> bool {
    estado
        .sesion
        .lock()
        .ok()
        .and_then(|guard| guard.as_ref().map(|s| tiene_rol(s, "admin")))
        .unwrap_or(false)
}

/// Token de la sesión activa, si hay una
pub fn token_actual(estado: &SesionState) -> Option<String> {
    estado
        .sesion
        .lock()
        .ok()?
        .as_ref()
        .map(|s| s.token.clone())
}

/// Establece la sesión a partir de un token recién emitido. Punto único
/// de actualización: decodifica los claims, guarda en RAM y persiste.
pub fn establecer(
    estado: &SesionState,
    almacen: &Almacen,
    token: &str,
    perfil: Option<&UsuarioInfo>,
) -> Result<SesionActiva, String> {
    let nueva = construir_sesion(token, perfil);
    almacen.guardar(CLAVE_TOKEN, token)?;
    if let Some(p) = perfil {
        let texto = serde_json::to_string(p).map_err(|e| e.to_string())?;
        almacen.guardar(CLAVE_PERFIL, &texto)?;
    }
    let mut guard = estado.sesion.lock().map_err(|e| e.to_string())?;
    *guard = Some(nueva.clone());
    Ok(nueva)
}

/// Reemplaza el token conservando el perfil ya conocido. Lo usan las
/// operaciones que reciben un token reemitido (iniciar turno, cierre).
pub fn actualizar_token(
    estado: &SesionState,
    almacen: &Almacen,
    token: &str,
) -> Result<SesionActiva, String> {
    let perfil = perfil_guardado(almacen);
    establecer(estado, almacen, token, perfil.as_ref())
}

/// Perfil persistido en el almacén local, si hay uno legible
pub fn perfil_guardado(almacen: &Almacen) -> Option<UsuarioInfo> {
    almacen
        .obtener(CLAVE_PERFIL)
        .and_then(|texto| serde_json::from_str(&texto).ok())
}

/// Borra la sesión de memoria y del almacén local
pub fn limpiar(estado: &SesionState, almacen: &Almacen) {
    if let Ok(mut guard) = estado.sesion.lock() {
        *guard = None;
    }
    almacen.eliminar(CLAVE_TOKEN).ok();
    almacen.eliminar(CLAVE_PERFIL).ok();
}

/// Restaura la sesión persistida al arrancar. Un token ya vencido se
/// descarta para no arrancar con una sesión muerta.
pub fn restaurar(almacen: &Almacen) -> Option<SesionActiva> {
    let token = almacen.obtener(CLAVE_TOKEN)?;
    let claims = decodificar_claims(&token);
    if let Some(exp) = claims.exp {
        if exp <= chrono::Utc::now().timestamp() {
            almacen.eliminar(CLAVE_TOKEN).ok();
            almacen.eliminar(CLAVE_PERFIL).ok();
            return None;
        }
    }
    let perfil = perfil_guardado(almacen);
    Some(construir_sesion(&token, perfil.as_ref()))
}

/// Pantalla a la que debe entrar el usuario según su sesión
pub fn pantalla_inicial(sesion: Option<&SesionActiva>) -> &'static str {
    match sesion {
        None => "login",
        Some(s) if s.turno_id.is_none() => "iniciar-turno",
        Some(_) => "dashboard",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn token_con_payload(payload: &str) -> String {
        let cabecera = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let cuerpo = URL_SAFE_NO_PAD.encode(payload.as_bytes());
        format!("{}.{}.firma", cabecera, cuerpo)
    }

    fn perfil_de_prueba() -> UsuarioInfo {
        UsuarioInfo {
            id: 7,
            nombre: "Ana Pérez".to_string(),
            usuario: "ana".to_string(),
            rol: "cajero".to_string(),
            activo: true,
        }
    }

    #[test]
    fn decodifica_claims_de_un_token_valido() {
        let token = token_con_payload(r#"{"sub":"7","turno_id":12,"exp":4102444800}"#);
        let claims = decodificar_claims(&token);
        assert_eq!(claims.sub.as_deref(), Some("7"));
        assert_eq!(claims.turno_id, Some(12));
        assert_eq!(claims.exp, Some(4102444800));
    }

    #[test]
    fn token_malformado_produce_claims_vacios() {
        for token in ["", "abc", "a.b", "x.y.z", "..."] {
            let claims = decodificar_claims(token);
            assert!(claims.sub.is_none());
            assert!(claims.turno_id.is_none());
        }
    }

    #[test]
    fn token_ilegible_cae_al_rol_minimo() {
        let sesion = construir_sesion("no-es-un-jwt", None);
        assert_eq!(sesion.rol, ROL_POR_DEFECTO);
        assert!(sesion.turno_id.is_none());
        assert!(sesion.usuario_id.is_none());
    }

    #[test]
    fn rol_sale_del_claim_antes_que_del_perfil() {
        let token = token_con_payload(r#"{"sub":"7","rol":"admin"}"#);
        let perfil = perfil_de_prueba();
        let sesion = construir_sesion(&token, Some(&perfil));
        assert_eq!(sesion.rol, "admin");
        assert_eq!(sesion.nombre, "Ana Pérez");
    }

    #[test]
    fn sin_claim_de_rol_usa_el_del_perfil() {
        let token = token_con_payload(r#"{"sub":"7","turno_id":3}"#);
        let perfil = perfil_de_prueba();
        let sesion = construir_sesion(&token, Some(&perfil));
        assert_eq!(sesion.rol, "cajero");
        assert_eq!(sesion.usuario_id, Some(7));
        assert_eq!(sesion.turno_id, Some(3));
    }

    #[test]
    fn admin_pasa_cualquier_verificacion_de_rol() {
        let token = token_con_payload(r#"{"sub":"1","rol":"admin"}"#);
        let sesion = construir_sesion(&token, None);
        assert!(tiene_rol(&sesion, "cajero"));
        assert!(tiene_rol(&sesion, "vigilante"));
        assert!(tiene_rol(&sesion, "admin"));
    }

    #[test]
    fn cajero_no_pasa_verificaciones_de_otros_roles() {
        let token = token_con_payload(r#"{"sub":"2","rol":"cajero"}"#);
        let sesion = construir_sesion(&token, None);
        assert!(tiene_rol(&sesion, "cajero"));
        assert!(!tiene_rol(&sesion, "vigilante"));
        assert!(!tiene_rol(&sesion, "admin"));
    }

    #[test]
    fn verificar_admin_rechaza_sin_sesion_y_sin_rol() {
        let estado = SesionState {
            sesion: Mutex::new(None),
        };
        assert_eq!(verificar_admin(&estado).unwrap_err(), "Debe iniciar sesión");

        let token = token_con_payload(r#"{"sub":"2","rol":"cajero"}"#);
        let estado = SesionState {
            sesion: Mutex::new(Some(construir_sesion(&token, None))),
        };
        assert_eq!(
            verificar_admin(&estado).unwrap_err(),
            "Se requiere permisos de administrador"
        );
    }

    #[test]
    fn verificar_rol_acepta_el_rol_exacto_y_al_admin() {
        let cajero = construir_sesion(&token_con_payload(r#"{"sub":"2","rol":"cajero"}"#), None);
        let estado = SesionState {
            sesion: Mutex::new(Some(cajero)),
        };
        assert!(verificar_rol(&estado, "cajero").is_ok());
        assert!(verificar_rol(&estado, "vigilante").is_err());

        let admin = construir_sesion(&token_con_payload(r#"{"sub":"1","rol":"admin"}"#), None);
        let estado = SesionState {
            sesion: Mutex::new(Some(admin)),
        };
        assert!(verificar_rol(&estado, "cajero").is_ok());
        assert!(verificar_rol(&estado, "vigilante").is_ok());
    }

    #[test]
    fn pantalla_inicial_segun_sesion_y_turno() {
        assert_eq!(pantalla_inicial(None), "login");

        let sin_turno = construir_sesion(&token_con_payload(r#"{"sub":"2"}"#), None);
        assert_eq!(pantalla_inicial(Some(&sin_turno)), "iniciar-turno");

        let con_turno = construir_sesion(&token_con_payload(r#"{"sub":"2","turno_id":9}"#), None);
        assert_eq!(pantalla_inicial(Some(&con_turno)), "dashboard");
    }

    #[test]
    fn establecer_persiste_y_limpiar_borra() {
        let dir = tempdir().unwrap();
        let almacen = Almacen::en_ruta(dir.path().join("almacen.json"));
        let estado = SesionState {
            sesion: Mutex::new(None),
        };

        let token = token_con_payload(r#"{"sub":"7","turno_id":3,"exp":4102444800}"#);
        let perfil = perfil_de_prueba();
        establecer(&estado, &almacen, &token, Some(&perfil)).unwrap();

        let restaurada = restaurar(&almacen).unwrap();
        assert_eq!(restaurada.nombre, "Ana Pérez");
        assert_eq!(restaurada.turno_id, Some(3));

        limpiar(&estado, &almacen);
        assert!(restaurar(&almacen).is_none());
        assert!(token_actual(&estado).is_none());
    }

    #[test]
    fn restaurar_descarta_tokens_vencidos() {
        let dir = tempdir().unwrap();
        let almacen = Almacen::en_ruta(dir.path().join("almacen.json"));
        let estado = SesionState {
            sesion: Mutex::new(None),
        };

        let vencido = token_con_payload(r#"{"sub":"7","exp":1000000000}"#);
        establecer(&estado, &almacen, &vencido, None).unwrap();
        assert!(restaurar(&almacen).is_none());
        // El token vencido también se borra del disco
        assert!(almacen.obtener(CLAVE_TOKEN).is_none());
    }

    #[test]
    fn actualizar_token_conserva_el_perfil() {
        let dir = tempdir().unwrap();
        let almacen = Almacen::en_ruta(dir.path().join("almacen.json"));
        let estado = SesionState {
            sesion: Mutex::new(None),
        };

        let inicial = token_con_payload(r#"{"sub":"7","exp":4102444800}"#);
        establecer(&estado, &almacen, &inicial, Some(&perfil_de_prueba())).unwrap();

        let reemitido = token_con_payload(r#"{"sub":"7","turno_id":44,"exp":4102444800}"#);
        let sesion = actualizar_token(&estado, &almacen, &reemitido).unwrap();
        assert_eq!(sesion.turno_id, Some(44));
        assert_eq!(sesion.nombre, "Ana Pérez");
        assert_eq!(sesion.rol, "cajero");
    }
}

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Tiempo máximo de espera para las llamadas REST
const TIEMPO_ESPERA: Duration = Duration::from_secs(10);

/// Errores del gateway HTTP hacia el backend
#[derive(Debug, thiserror::Error)]
pub enum ErrorApi {
    /// El backend rechazó el token (HTTP 401)
    #[error("{0}")]
    NoAutorizado(String),
    /// Error de negocio del backend (el campo `detail` de la respuesta)
    #[error("{0}")]
    Detalle(String),
    #[error("Respuesta inesperada del servidor: {0}")]
    Formato(String),
    #[error("Error de conexión con el servidor: {0}")]
    Conexion(String),
}

/// Cliente del backend REST: URL base fija y token adjunto si hay sesión.
/// Todas las rutas se resuelven contra la base, nunca absolutas.
pub struct ClienteApi {
    http: reqwest::Client,
    base: String,
    token: Option<String>,
}

impl ClienteApi {
    pub fn new(base: &str, token: Option<String>) -> Result<Self, ErrorApi> {
        Self::con_espera(base, token, TIEMPO_ESPERA)
    }

    /// Cliente con un tiempo de espera distinto (la transcripción de voz
    /// puede tardar más que una llamada REST normal)
    pub fn con_espera(base: &str, token: Option<String>, espera: Duration) -> Result<Self, ErrorApi> {
        let http = reqwest::Client::builder()
            .timeout(espera)
            .build()
            .map_err(|e| ErrorApi::Conexion(e.to_string()))?;
        Ok(ClienteApi {
            http,
            base: base.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn url(&self, ruta: &str) -> String {
        format!("{}{}", self.base, ruta)
    }

    fn con_token(&self, peticion: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => peticion.header("Authorization", format!("Bearer {}", token)),
            None => peticion,
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, ruta: &str) -> Result<T, ErrorApi> {
        let respuesta = self
            .con_token(self.http.get(self.url(ruta)))
            .send()
            .await
            .map_err(|e| ErrorApi::Conexion(e.to_string()))?;
        procesar(respuesta).await
    }

    /// GET que trata el 404 como ausencia en vez de error
    pub async fn get_opcional<T: DeserializeOwned>(&self, ruta: &str) -> Result<Option<T>, ErrorApi> {
        let respuesta = self
            .con_token(self.http.get(self.url(ruta)))
            .send()
            .await
            .map_err(|e| ErrorApi::Conexion(e.to_string()))?;
        if respuesta.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        procesar(respuesta).await.map(Some)
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        ruta: &str,
        cuerpo: &B,
    ) -> Result<T, ErrorApi> {
        let respuesta = self
            .con_token(self.http.post(self.url(ruta)).json(cuerpo))
            .send()
            .await
            .map_err(|e| ErrorApi::Conexion(e.to_string()))?;
        procesar(respuesta).await
    }

    /// POST sin cuerpo (acciones como cerrar el turno)
    pub async fn post_vacio<T: DeserializeOwned>(&self, ruta: &str) -> Result<T, ErrorApi> {
        let respuesta = self
            .con_token(self.http.post(self.url(ruta)))
            .send()
            .await
            .map_err(|e| ErrorApi::Conexion(e.to_string()))?;
        procesar(respuesta).await
    }

    /// POST con formulario URL-encoded (el login OAuth2 del backend)
    pub async fn post_formulario<T: DeserializeOwned>(
        &self,
        ruta: &str,
        campos: &[(&str, &str)],
    ) -> Result<T, ErrorApi> {
        let respuesta = self
            .con_token(self.http.post(self.url(ruta)).form(campos))
            .send()
            .await
            .map_err(|e| ErrorApi::Conexion(e.to_string()))?;
        procesar(respuesta).await
    }

    /// POST multipart para subir un archivo
    pub async fn post_archivo<T: DeserializeOwned>(
        &self,
        ruta: &str,
        campo: &str,
        nombre: &str,
        bytes: Vec<u8>,
        tipo_mime: &str,
    ) -> Result<T, ErrorApi> {
        let parte = reqwest::multipart::Part::bytes(bytes)
            .file_name(nombre.to_string())
            .mime_str(tipo_mime)
            .map_err(|e| ErrorApi::Formato(e.to_string()))?;
        let formulario = reqwest::multipart::Form::new().part(campo.to_string(), parte);
        let respuesta = self
            .con_token(self.http.post(self.url(ruta)).multipart(formulario))
            .send()
            .await
            .map_err(|e| ErrorApi::Conexion(e.to_string()))?;
        procesar(respuesta).await
    }

    pub async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        ruta: &str,
        cuerpo: &B,
    ) -> Result<T, ErrorApi> {
        let respuesta = self
            .con_token(self.http.put(self.url(ruta)).json(cuerpo))
            .send()
            .await
            .map_err(|e| ErrorApi::Conexion(e.to_string()))?;
        procesar(respuesta).await
    }

    /// PATCH sin cuerpo (acciones de alternar estado)
    pub async fn patch<T: DeserializeOwned>(&self, ruta: &str) -> Result<T, ErrorApi> {
        let respuesta = self
            .con_token(self.http.patch(self.url(ruta)))
            .send()
            .await
            .map_err(|e| ErrorApi::Conexion(e.to_string()))?;
        procesar(respuesta).await
    }

    /// DELETE que no espera cuerpo en la respuesta
    pub async fn delete(&self, ruta: &str) -> Result<(), ErrorApi> {
        let respuesta = self
            .con_token(self.http.delete(self.url(ruta)))
            .send()
            .await
            .map_err(|e| ErrorApi::Conexion(e.to_string()))?;
        let status = respuesta.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            let cuerpo = respuesta.text().await.unwrap_or_default();
            return Err(ErrorApi::NoAutorizado(extraer_detalle(status, &cuerpo)));
        }
        if !status.is_success() {
            let cuerpo = respuesta.text().await.unwrap_or_default();
            return Err(ErrorApi::Detalle(extraer_detalle(status, &cuerpo)));
        }
        Ok(())
    }
}

async fn procesar<T: DeserializeOwned>(respuesta: reqwest::Response) -> Result<T, ErrorApi> {
    let status = respuesta.status();
    if status == reqwest::StatusCode::UNAUTHORIZED {
        let cuerpo = respuesta.text().await.unwrap_or_default();
        return Err(ErrorApi::NoAutorizado(extraer_detalle(status, &cuerpo)));
    }
    if !status.is_success() {
        let cuerpo = respuesta.text().await.unwrap_or_default();
        return Err(ErrorApi::Detalle(extraer_detalle(status, &cuerpo)));
    }
    respuesta
        .json()
        .await
        .map_err(|e| ErrorApi::Formato(e.to_string()))
}

/// Extrae el campo `detail` de una respuesta de error del backend. Puede
/// ser un texto o una lista de errores de validación con `msg`; cualquier
/// otra cosa cae a un mensaje genérico con el código HTTP.
pub fn extraer_detalle(status: reqwest::StatusCode, cuerpo: &str) -> String {
    if let Ok(valor) = serde_json::from_str::<serde_json::Value>(cuerpo) {
        match valor.get("detail") {
            Some(serde_json::Value::String(texto)) => return texto.clone(),
            Some(serde_json::Value::Array(lista)) => {
                let mensajes: Vec<String> = lista
                    .iter()
                    .map(|d| {
                        d.get("msg")
                            .and_then(|m| m.as_str())
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| d.to_string())
                    })
                    .collect();
                if !mensajes.is_empty() {
                    return mensajes.join(", ");
                }
            }
            _ => {}
        }
    }
    format!("Error del servidor (HTTP {})", status.as_u16())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, serde::Deserialize)]
    struct Eco {
        ok: bool,
    }

    #[test]
    fn detalle_de_texto_se_extrae_tal_cual() {
        let detalle = extraer_detalle(
            reqwest::StatusCode::BAD_REQUEST,
            r#"{"detail":"El usuario ya tiene un turno abierto (ID: 3)"}"#,
        );
        assert_eq!(detalle, "El usuario ya tiene un turno abierto (ID: 3)");
    }

    #[test]
    fn detalle_de_validaciones_se_une_con_comas() {
        let cuerpo = r#"{"detail":[{"msg":"field required"},{"msg":"value is not a valid float"}]}"#;
        let detalle = extraer_detalle(reqwest::StatusCode::UNPROCESSABLE_ENTITY, cuerpo);
        assert_eq!(detalle, "field required, value is not a valid float");
    }

    #[test]
    fn cuerpo_sin_detalle_cae_al_mensaje_generico() {
        assert_eq!(
            extraer_detalle(reqwest::StatusCode::INTERNAL_SERVER_ERROR, "<html>boom</html>"),
            "Error del servidor (HTTP 500)"
        );
        assert_eq!(
            extraer_detalle(reqwest::StatusCode::BAD_GATEWAY, "{}"),
            "Error del servidor (HTTP 502)"
        );
    }

    #[tokio::test]
    async fn adjunta_el_token_como_bearer() {
        let servidor = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/vehiculos/activos"))
            .and(header("Authorization", "Bearer token-abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .expect(1)
            .mount(&servidor)
            .await;

        let cliente = ClienteApi::new(&servidor.uri(), Some("token-abc".to_string())).unwrap();
        let eco: Eco = cliente.get("/vehiculos/activos").await.unwrap();
        assert!(eco.ok);
    }

    #[tokio::test]
    async fn sin_sesion_no_envia_authorization() {
        let servidor = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .mount(&servidor)
            .await;

        let cliente = ClienteApi::new(&servidor.uri(), None).unwrap();
        let peticiones_antes = servidor.received_requests().await.unwrap().len();
        let _: Eco = cliente.get("/ping").await.unwrap();

        let peticiones = servidor.received_requests().await.unwrap();
        assert_eq!(peticiones.len(), peticiones_antes + 1);
        let ultima = peticiones.last().unwrap();
        assert!(!ultima.headers.contains_key("Authorization"));
    }

    #[tokio::test]
    async fn un_401_se_mapea_a_no_autorizado_con_el_detalle() {
        let servidor = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users/login"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({ "detail": "Credenciales inválidas" })),
            )
            .mount(&servidor)
            .await;

        let cliente = ClienteApi::new(&servidor.uri(), None).unwrap();
        let resultado: Result<Eco, ErrorApi> = cliente
            .post_formulario("/users/login", &[("username", "ana"), ("password", "x")])
            .await;

        match resultado {
            Err(ErrorApi::NoAutorizado(detalle)) => assert_eq!(detalle, "Credenciales inválidas"),
            otro => panic!("se esperaba NoAutorizado, llegó {:?}", otro.map(|e| e.ok)),
        }
    }

    #[tokio::test]
    async fn el_login_viaja_como_formulario() {
        let servidor = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users/login"))
            .and(header("Content-Type", "application/x-www-form-urlencoded"))
            .and(body_string_contains("username=ana"))
            .and(body_string_contains("password=secreta"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .expect(1)
            .mount(&servidor)
            .await;

        let cliente = ClienteApi::new(&servidor.uri(), None).unwrap();
        let eco: Eco = cliente
            .post_formulario("/users/login", &[("username", "ana"), ("password", "secreta")])
            .await
            .unwrap();
        assert!(eco.ok);
    }

    #[tokio::test]
    async fn errores_de_negocio_traen_el_detalle_del_backend() {
        let servidor = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/vehiculos/entrada"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "detail": "No tienes un turno abierto. Debes iniciar un turno antes de registrar entradas."
            })))
            .mount(&servidor)
            .await;

        let cliente = ClienteApi::new(&servidor.uri(), Some("t".to_string())).unwrap();
        let resultado: Result<Eco, ErrorApi> = cliente
            .post("/vehiculos/entrada", &json!({ "placa": "ABC123" }))
            .await;

        match resultado {
            Err(ErrorApi::Detalle(detalle)) => {
                assert!(detalle.starts_with("No tienes un turno abierto"))
            }
            otro => panic!("se esperaba Detalle, llegó {:?}", otro.map(|e| e.ok)),
        }
    }

    #[tokio::test]
    async fn get_opcional_trata_el_404_como_ausencia() {
        let servidor = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/turnos/actual"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "detail": "No tienes un turno abierto actualmente"
            })))
            .mount(&servidor)
            .await;

        let cliente = ClienteApi::new(&servidor.uri(), Some("t".to_string())).unwrap();
        let resultado: Option<Eco> = cliente.get_opcional("/turnos/actual").await.unwrap();
        assert!(resultado.is_none());
    }

    #[tokio::test]
    async fn delete_acepta_respuestas_sin_cuerpo() {
        let servidor = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/cierres/4"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&servidor)
            .await;

        let cliente = ClienteApi::new(&servidor.uri(), Some("t".to_string())).unwrap();
        cliente.delete("/cierres/4").await.unwrap();
    }

    #[tokio::test]
    async fn respuesta_ilegible_es_error_de_formato() {
        let servidor = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/raro"))
            .respond_with(ResponseTemplate::new(200).set_body_string("esto no es json"))
            .mount(&servidor)
            .await;

        let cliente = ClienteApi::new(&servidor.uri(), None).unwrap();
        let resultado: Result<Eco, ErrorApi> = cliente.get("/raro").await;
        assert!(matches!(resultado, Err(ErrorApi::Formato(_))));
    }
}

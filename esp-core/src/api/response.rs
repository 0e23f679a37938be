//! Antwort-Aufbau: feste, flache JSON-Bodies + einheitliche CORS-Header

use alloc::string::String;

use serde::Serialize;

/// Erlaubte Methoden für Cross-Origin-Requests
pub const CORS_ALLOW_METHODS: &str = "GET, POST, OPTIONS";

/// Erlaubte Request-Header für Cross-Origin-Requests
pub const CORS_ALLOW_HEADERS: &str = "Content-Type";

/// Origin, wenn keiner konfiguriert ist
pub const DEFAULT_CORS_ORIGIN: &str = "*";

pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Wert von `status` in allen Erfolgs-Antworten
pub const STATUS_OK: &str = "ok";

// Fallback, falls selbst der Fehler-Body nicht serialisiert werden kann
const INTERNAL_ERROR_BODY: &str = r#"{"error":"Internal error"}"#;

/// Fertige HTTP-Antwort, unabhängig vom Transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    /// JSON-Body; leer bei Preflight
    pub body: String,
    pub allow_origin: &'static str,
}

impl ApiResponse {
    /// 200 mit serialisiertem Payload
    pub fn ok<T: Serialize + ?Sized>(payload: &T, allow_origin: &'static str) -> Self {
        match serde_json::to_string(payload) {
            Ok(body) => Self {
                status: 200,
                body,
                allow_origin,
            },
            Err(_) => {
                error!("API: failed to serialize response");
                Self::error(500, "Serialization failed", allow_origin)
            }
        }
    }

    /// `{"error": message}` mit beliebigem Status-Code
    pub fn error(status: u16, message: &str, allow_origin: &'static str) -> Self {
        let body = serde_json::to_string(&ErrorBody { error: message })
            .unwrap_or_else(|_| String::from(INTERNAL_ERROR_BODY));
        Self {
            status,
            body,
            allow_origin,
        }
    }

    /// CORS-Preflight: 200 ohne Body
    pub fn preflight(allow_origin: &'static str) -> Self {
        Self {
            status: 200,
            body: String::new(),
            allow_origin,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Content-Type nur, wenn es auch einen Body gibt
    pub fn content_type(&self) -> Option<&'static str> {
        (!self.body.is_empty()).then_some(CONTENT_TYPE_JSON)
    }

    /// Die drei CORS-Header, die jede Antwort trägt
    pub fn cors_headers(&self) -> [(&'static str, &'static str); 3] {
        [
            ("Access-Control-Allow-Origin", self.allow_origin),
            ("Access-Control-Allow-Methods", CORS_ALLOW_METHODS),
            ("Access-Control-Allow-Headers", CORS_ALLOW_HEADERS),
        ]
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

/// `POST /api/led/effect`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectChanged<'a> {
    pub status: &'static str,
    pub effect: u8,
    pub effect_name: &'a str,
}

/// `POST /api/led/params`
#[derive(Debug, Serialize)]
pub struct ParamsUpdated {
    pub status: &'static str,
    pub updated: usize,
}

/// `POST /api/led/power`
#[derive(Debug, Serialize)]
pub struct PowerChanged {
    pub status: &'static str,
    pub power: bool,
}

/// `POST /api/led/brightness`
#[derive(Debug, Serialize)]
pub struct BrightnessChanged {
    pub status: &'static str,
    pub brightness: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_shape() {
        let response = ApiResponse::error(400, "Missing 'id' field", DEFAULT_CORS_ORIGIN);
        assert_eq!(response.status, 400);
        assert_eq!(response.body, r#"{"error":"Missing 'id' field"}"#);
        assert_eq!(response.content_type(), Some(CONTENT_TYPE_JSON));
    }

    #[test]
    fn test_preflight_has_cors_but_no_body() {
        let response = ApiResponse::preflight("http://panel.local");
        assert_eq!(response.status, 200);
        assert!(response.body.is_empty());
        assert_eq!(response.content_type(), None);
        assert_eq!(
            response.cors_headers()[0],
            ("Access-Control-Allow-Origin", "http://panel.local")
        );
    }
}

//! REST API für die LED-Steuerung
//!
//! Endpunkte (alle unter `/api/led`):
//! - `GET  /status`     → aktueller Zustand
//! - `GET  /effects`    → alle Effekte
//! - `GET  /params`     → Parameter des aktiven Effekts
//! - `POST /effect`     → Effekt wechseln (wird gespeichert)
//! - `POST /params`     → Parameter ändern (kompletter Satz wird gespeichert)
//! - `POST /power`      → an/aus (nie gespeichert)
//! - `POST /brightness` → Helligkeit (gespeichert nur mit `save: true`)
//! - `OPTIONS /*`       → CORS-Preflight
//!
//! Die API selbst hält keinen Zustand zwischen Requests. Engine und Speicher
//! werden injiziert (`LedController`, `SettingsStore`).

pub mod response;
pub mod routes;
pub mod validate;

use core::fmt;

use serde_json::Value;

use crate::traits::{LedController, LedError, SettingsStore, StorageError};

pub use response::{ApiResponse, DEFAULT_CORS_ORIGIN};
pub use routes::{
    API_PREFIX, HttpTransport, Method, ROUTES, Resolution, Route, RouteTable, api_path,
};
pub use validate::Rejection;

use response::{BrightnessChanged, EffectChanged, ParamsUpdated, PowerChanged, STATUS_OK};

/// Fehler beim Start der API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ApiError {
    /// Kein Transport übergeben, es wurde nichts registriert
    NoTransport,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NoTransport => f.write_str("no HTTP transport"),
        }
    }
}

/// Registriert alle Routen am Transport
///
/// Ohne Transport wird nichts registriert und `ApiError::NoTransport` zurückgegeben.
/// Gibt die Anzahl der registrierten Bindungen zurück.
pub fn begin<T: HttpTransport>(transport: Option<&mut T>) -> Result<usize, ApiError> {
    let Some(transport) = transport else {
        error!("LED API: transport is missing, no routes registered");
        return Err(ApiError::NoTransport);
    };

    info!("LED API: registering routes");
    for (method, pattern, route) in ROUTES {
        transport.on(method, pattern, route);
    }

    info!("LED API endpoints registered");
    for (method, pattern, _) in ROUTES {
        info!("  {} {}", method.as_str(), pattern);
    }
    Ok(ROUTES.len())
}

/// Warum ein Handler keine Erfolgs-Antwort liefern konnte
#[derive(Debug)]
enum Failure {
    Rejected(Rejection),
    Controller(LedError),
    Storage(StorageError),
}

impl From<Rejection> for Failure {
    fn from(rejection: Rejection) -> Self {
        Failure::Rejected(rejection)
    }
}

impl From<LedError> for Failure {
    fn from(error: LedError) -> Self {
        Failure::Controller(error)
    }
}

impl From<StorageError> for Failure {
    fn from(error: StorageError) -> Self {
        Failure::Storage(error)
    }
}

/// Request-Handler der LED-API
///
/// # Generische Parameter
/// - `C: LedController`: Effekt-Engine (Hardware oder Mock)
/// - `S: SettingsStore`: Flash-Speicher (Hardware oder Mock)
pub struct LedApi<C, S> {
    controller: C,
    store: S,
    cors_origin: &'static str,
}

impl<C: LedController, S: SettingsStore> LedApi<C, S> {
    pub fn new(controller: C, store: S) -> Self {
        Self {
            controller,
            store,
            cors_origin: DEFAULT_CORS_ORIGIN,
        }
    }

    /// Setzt den Wert für `Access-Control-Allow-Origin`
    pub fn with_cors_origin(mut self, origin: &'static str) -> Self {
        self.cors_origin = origin;
        self
    }

    pub fn controller(&self) -> &C {
        &self.controller
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_parts(self) -> (C, S) {
        (self.controller, self.store)
    }

    /// Kompletter Durchlauf: Route auflösen, Body parsen, Handler ausführen
    pub fn serve(&mut self, table: &RouteTable, method: Method, path: &str, body: &[u8]) -> ApiResponse {
        match table.resolve(method, path) {
            Resolution::Matched(route) => self.handle_raw(route, body),
            Resolution::MethodNotAllowed => {
                debug!("{} {}: method not allowed", method.as_str(), path);
                ApiResponse::error(405, "Method not allowed", self.cors_origin)
            }
            Resolution::NotFound => {
                debug!("{} {}: not found", method.as_str(), path);
                ApiResponse::error(404, "Not found", self.cors_origin)
            }
        }
    }

    /// Führt eine Route mit rohem Body aus; nur POST-Routen parsen JSON
    pub fn handle_raw(&mut self, route: Route, body: &[u8]) -> ApiResponse {
        if !route.expects_body() {
            return self.handle(route, &Value::Null);
        }
        match serde_json::from_slice::<Value>(body) {
            Ok(json) => self.handle(route, &json),
            Err(_) => {
                warn!("API: request body is not valid JSON");
                self.failure_response(Failure::Rejected(Rejection::InvalidJson))
            }
        }
    }

    /// Führt eine Route mit bereits geparstem JSON-Body aus
    pub fn handle(&mut self, route: Route, body: &Value) -> ApiResponse {
        let result = match route {
            Route::Preflight => return ApiResponse::preflight(self.cors_origin),
            Route::Status => {
                debug!("GET /api/led/status");
                Ok(self.respond(&self.controller.status()))
            }
            Route::Effects => {
                debug!("GET /api/led/effects");
                Ok(self.respond(&self.controller.effects()))
            }
            Route::GetParams => {
                debug!("GET /api/led/params");
                Ok(self.respond(&self.controller.params()))
            }
            Route::SetEffect => self.set_effect(body),
            Route::SetParams => self.set_params(body),
            Route::Power => self.set_power(body),
            Route::Brightness => self.set_brightness(body),
        };

        result.unwrap_or_else(|failure| self.failure_response(failure))
    }

    // ========================================================================
    // Mutierende Handler
    // ========================================================================

    fn set_effect(&mut self, body: &Value) -> Result<ApiResponse, Failure> {
        debug!("POST /api/led/effect");

        let id = validate::effect_id(body, self.controller.num_effects())?;
        self.controller.set_effect(id)?;

        // Effekt-Wechsel ist selten und bewusst → immer sofort speichern
        self.store.save_effect(id)?;

        let name = self.controller.effect_name();
        Ok(self.respond(&EffectChanged {
            status: STATUS_OK,
            effect: id,
            effect_name: &name,
        }))
    }

    fn set_params(&mut self, body: &Value) -> Result<ApiResponse, Failure> {
        debug!("POST /api/led/params");

        let updates = validate::param_updates(body)?;
        for (key, value) in &updates {
            self.controller.set_param(key, *value)?;
        }

        // Gespeichert wird der komplette aktuelle Satz, nicht nur die gesendeten Keys
        let current = self.controller.params();
        let blob = serde_json::to_string(&current.params).map_err(|_| StorageError::Encode)?;
        self.store.save_params(&blob)?;

        Ok(self.respond(&ParamsUpdated {
            status: STATUS_OK,
            updated: updates.len(),
        }))
    }

    fn set_power(&mut self, body: &Value) -> Result<ApiResponse, Failure> {
        debug!("POST /api/led/power");

        let on = validate::power(body)?;
        self.controller.set_power(on)?;

        Ok(self.respond(&PowerChanged {
            status: STATUS_OK,
            power: on,
        }))
    }

    fn set_brightness(&mut self, body: &Value) -> Result<ApiResponse, Failure> {
        debug!("POST /api/led/brightness");

        let request = validate::brightness(body)?;
        self.controller.set_brightness(request.value)?;

        // Slider schicken viele Zwischenwerte; gespeichert wird nur auf Anfrage
        if request.save {
            self.store.save_brightness(request.value)?;
        }

        Ok(self.respond(&BrightnessChanged {
            status: STATUS_OK,
            brightness: request.value,
        }))
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn respond<T: serde::Serialize + ?Sized>(&self, payload: &T) -> ApiResponse {
        ApiResponse::ok(payload, self.cors_origin)
    }

    fn failure_response(&self, failure: Failure) -> ApiResponse {
        match failure {
            Failure::Rejected(rejection) => {
                let message = rejection.message();
                debug!("API: rejected: {}", message.as_str());
                ApiResponse::error(400, &message, self.cors_origin)
            }
            Failure::Controller(error) => {
                error!("API: LED controller failed: {}", error);
                ApiResponse::error(500, "LED controller error", self.cors_origin)
            }
            Failure::Storage(error) => {
                error!("API: persisting settings failed: {}", error);
                ApiResponse::error(500, "Failed to persist settings", self.cors_origin)
            }
        }
    }
}

//! Routing-Tabelle der LED-API
//!
//! `begin()` registriert alle Routen über das `HttpTransport`-Trait.
//! `RouteTable` ist die eingebaute Implementierung, die Firmware und Tests nutzen.

use alloc::string::String;
use alloc::vec::Vec;

/// Gemeinsamer Pfad-Prefix aller Endpunkte
pub const API_PREFIX: &str = "/api/led";

/// HTTP-Methoden, die die API kennt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Method {
    Get,
    Post,
    Options,
    /// Jede andere Methode; passt nie auf eine Route
    Other,
}

impl Method {
    pub fn parse(method: &str) -> Self {
        match method {
            "GET" => Method::Get,
            "POST" => Method::Post,
            "OPTIONS" => Method::Options,
            _ => Method::Other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Options => "OPTIONS",
            Method::Other => "?",
        }
    }
}

/// Semantische Operation hinter einem (Methode, Pfad)-Paar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Route {
    Preflight,
    Status,
    Effects,
    GetParams,
    SetEffect,
    SetParams,
    Power,
    Brightness,
}

impl Route {
    /// Nur POST-Routen lesen einen JSON-Body
    pub fn expects_body(self) -> bool {
        matches!(
            self,
            Route::SetEffect | Route::SetParams | Route::Power | Route::Brightness
        )
    }
}

/// Alle Bindungen, die `begin()` registriert
pub const ROUTES: [(Method, &str, Route); 8] = [
    (Method::Options, "/api/led/*", Route::Preflight),
    (Method::Get, "/api/led/status", Route::Status),
    (Method::Get, "/api/led/effects", Route::Effects),
    (Method::Get, "/api/led/params", Route::GetParams),
    (Method::Post, "/api/led/effect", Route::SetEffect),
    (Method::Post, "/api/led/params", Route::SetParams),
    (Method::Post, "/api/led/power", Route::Power),
    (Method::Post, "/api/led/brightness", Route::Brightness),
];

/// Baut den vollen API-Pfad aus den Segmenten nach `API_PREFIX`
///
/// Transports, die Pfade segmentweise zerlegen, geben damit den Pfad an
/// `RouteTable::resolve` weiter.
pub fn api_path(segments: &[&str]) -> String {
    let mut path = String::from(API_PREFIX);
    for segment in segments {
        path.push('/');
        path.push_str(segment);
    }
    path
}

/// Trait für den HTTP-Transport, an dem die Routen registriert werden
///
/// Ein Pattern, das auf `*` endet, passt auf jeden Pfad mit diesem Prefix.
pub trait HttpTransport {
    fn on(&mut self, method: Method, pattern: &'static str, route: Route);
}

/// Eine registrierte Route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub method: Method,
    pub pattern: &'static str,
    pub route: Route,
}

impl Binding {
    fn is_wildcard(&self) -> bool {
        self.pattern.ends_with('*')
    }

    fn matches_path(&self, path: &str) -> bool {
        match self.pattern.strip_suffix('*') {
            Some(prefix) => path.starts_with(prefix),
            None => self.pattern == path,
        }
    }
}

/// Ergebnis von `RouteTable::resolve`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Matched(Route),
    /// Pfad bekannt, aber nicht für diese Methode
    MethodNotAllowed,
    NotFound,
}

/// Einfache Routing-Tabelle, gefüllt durch `begin()`
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    bindings: Vec<Binding>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Sucht die Route für `method` + `path` (Query-String wird ignoriert)
    pub fn resolve(&self, method: Method, path: &str) -> Resolution {
        let path = path.split('?').next().unwrap_or(path);
        let mut path_known = false;

        for binding in self.bindings.iter().filter(|b| b.matches_path(path)) {
            if binding.method == method {
                return Resolution::Matched(binding.route);
            }
            // Wildcards allein machen einen Pfad nicht "bekannt"
            if !binding.is_wildcard() {
                path_known = true;
            }
        }

        if path_known {
            Resolution::MethodNotAllowed
        } else {
            Resolution::NotFound
        }
    }
}

impl HttpTransport for RouteTable {
    fn on(&mut self, method: Method, pattern: &'static str, route: Route) {
        self.bindings.push(Binding {
            method,
            pattern,
            route,
        });
    }
}

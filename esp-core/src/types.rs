//! Core Types für die LED-Steuerung
//!
//! Datenstrukturen ohne Hardware-Dependencies. Alle Typen, die über die
//! REST-API nach außen gehen, sind serde-serialisierbar.

use alloc::string::String;
use alloc::vec::Vec;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// Ein Effekt aus dem Repertoire der Engine
///
/// Die ID ist ein kleiner Index; die API prüft sie nur gegen die Anzahl der Effekte.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Effect {
    pub id: u8,
    pub name: String,
}

/// Kompletter Gerätezustand für `GET /api/led/status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceStatus {
    pub power: bool,
    pub brightness: u8,
    pub effect: u8,
    pub effect_name: String,
    pub num_effects: usize,
}

/// Wert eines Effekt-Parameters (Zahl oder Bool)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl ParamValue {
    /// Konvertiert einen JSON-Wert. Strings, Arrays, Objekte und `null` sind keine Parameter.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .or_else(|| n.as_f64().map(Self::Float)),
            _ => None,
        }
    }

    /// Ganzzahl-Sicht: Bool wird 0/1, Float wird Richtung 0 abgeschnitten
    pub fn as_i64(self) -> i64 {
        match self {
            Self::Bool(b) => i64::from(b),
            Self::Int(i) => i,
            Self::Float(f) => f as i64,
        }
    }

    /// Bool-Sicht: jede Zahl ungleich 0 ist `true`
    pub fn as_bool(self) -> bool {
        match self {
            Self::Bool(b) => b,
            Self::Int(i) => i != 0,
            Self::Float(f) => f != 0.0,
        }
    }
}

/// Geordnete Parameter-Menge des aktiven Effekts
///
/// Wird als JSON-Objekt in Deklarations-Reihenfolge serialisiert.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParamSet(Vec<(String, ParamValue)>);

impl ParamSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Setzt einen Wert; existiert der Name schon, wird er überschrieben
    pub fn insert(&mut self, name: impl Into<String>, value: ParamValue) {
        let name = name.into();
        match self.0.iter_mut().find(|(key, _)| *key == name) {
            Some((_, slot)) => *slot = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<ParamValue> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| *value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ParamValue)> {
        self.0.iter().map(|(key, value)| (key.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for ParamSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Antwort für `GET /api/led/params`: aktiver Effekt + seine Parameter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamSnapshot {
    pub effect: u8,
    pub params: ParamSet,
}

// ============================================================================
// defmt::Format Implementations (optional feature)
// ============================================================================

#[cfg(feature = "defmt")]
impl defmt::Format for ParamValue {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            ParamValue::Bool(b) => defmt::write!(fmt, "{}", b),
            ParamValue::Int(i) => defmt::write!(fmt, "{}", i),
            ParamValue::Float(f) => defmt::write!(fmt, "{}", f),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for DeviceStatus {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "DeviceStatus {{ power: {}, brightness: {}, effect: {} ({}) }}",
            self.power,
            self.brightness,
            self.effect,
            self.effect_name.as_str()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_param_value_from_json() {
        assert_eq!(ParamValue::from_json(&json!(true)), Some(ParamValue::Bool(true)));
        assert_eq!(ParamValue::from_json(&json!(42)), Some(ParamValue::Int(42)));
        assert_eq!(ParamValue::from_json(&json!(-3)), Some(ParamValue::Int(-3)));
        assert_eq!(ParamValue::from_json(&json!(0.5)), Some(ParamValue::Float(0.5)));
        assert_eq!(ParamValue::from_json(&json!("fast")), None);
        assert_eq!(ParamValue::from_json(&json!(null)), None);
    }

    #[test]
    fn test_param_value_coercions() {
        assert_eq!(ParamValue::Bool(true).as_i64(), 1);
        assert_eq!(ParamValue::Float(7.9).as_i64(), 7);
        assert!(ParamValue::Int(3).as_bool());
        assert!(!ParamValue::Float(0.0).as_bool());
    }

    #[test]
    fn test_param_set_keeps_order_and_overwrites() {
        let mut params = ParamSet::new();
        params.insert("speed", ParamValue::Int(10));
        params.insert("reverse", ParamValue::Bool(false));
        params.insert("speed", ParamValue::Int(20));

        assert_eq!(params.len(), 2);
        assert_eq!(params.get("speed"), Some(ParamValue::Int(20)));
        assert_eq!(
            serde_json::to_string(&params).unwrap(),
            r#"{"speed":20,"reverse":false}"#
        );
    }
}

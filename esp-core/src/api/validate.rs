//! Eingabe-Validierung pro Endpunkt
//!
//! Alle Prüfungen sind zustandslos und laufen komplett, bevor die Engine
//! angefasst wird. Ein Fehler bedeutet: keine Mutation.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use serde_json::Value;

use crate::types::ParamValue;

/// Grund, warum ein Request abgelehnt wurde (immer HTTP 400)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    InvalidJson,
    MissingField(&'static str),
    InvalidField(&'static str),
    InvalidEffectId,
    EmptyParams,
    InvalidParamValue(String),
}

impl Rejection {
    /// Text für den `error`-Eintrag der Antwort
    pub fn message(&self) -> String {
        match self {
            Rejection::InvalidJson => String::from("Invalid JSON"),
            Rejection::MissingField(field) => format!("Missing '{}' field", field),
            Rejection::InvalidField(field) => format!("Invalid '{}' field", field),
            Rejection::InvalidEffectId => String::from("Invalid effect ID"),
            Rejection::EmptyParams => String::from("Empty parameters"),
            Rejection::InvalidParamValue(key) => format!("Invalid value for '{}'", key),
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Validierter Body von `POST /api/led/brightness`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrightnessRequest {
    pub value: u8,
    pub save: bool,
}

/// `{"id": n}` mit `0 <= n < num_effects`
pub fn effect_id(body: &Value, num_effects: usize) -> Result<u8, Rejection> {
    let raw = body.get("id").ok_or(Rejection::MissingField("id"))?;
    let id = raw.as_u64().ok_or(Rejection::InvalidEffectId)?;
    if id >= num_effects as u64 {
        return Err(Rejection::InvalidEffectId);
    }
    u8::try_from(id).map_err(|_| Rejection::InvalidEffectId)
}

/// Nicht-leeres Objekt aus Zahlen/Bools; die Schlüssel werden nicht geprüft
pub fn param_updates(body: &Value) -> Result<Vec<(&str, ParamValue)>, Rejection> {
    let object = match body.as_object() {
        Some(object) if !object.is_empty() => object,
        _ => return Err(Rejection::EmptyParams),
    };

    object
        .iter()
        .map(|(key, value)| {
            ParamValue::from_json(value)
                .map(|value| (key.as_str(), value))
                .ok_or_else(|| Rejection::InvalidParamValue(key.clone()))
        })
        .collect()
}

/// `{"on": bool}`
pub fn power(body: &Value) -> Result<bool, Rejection> {
    body.get("on")
        .ok_or(Rejection::MissingField("on"))?
        .as_bool()
        .ok_or(Rejection::InvalidField("on"))
}

/// `{"value": n, "save"?: bool}`
///
/// `save` fehlt oder ist kein Bool → `false`.
pub fn brightness(body: &Value) -> Result<BrightnessRequest, Rejection> {
    let raw = body.get("value").ok_or(Rejection::MissingField("value"))?;
    let value = coerce_u8(raw).ok_or(Rejection::InvalidField("value"))?;
    let save = body.get("save").and_then(Value::as_bool).unwrap_or(false);
    Ok(BrightnessRequest { value, save })
}

/// Sättigende Konvertierung einer JSON-Zahl nach u8
///
/// Nachkommastellen werden abgeschnitten, negative Werte werden 0,
/// Werte über 255 werden 255. Alles außer Zahlen ergibt `None`.
pub fn coerce_u8(value: &Value) -> Option<u8> {
    let Value::Number(number) = value else {
        return None;
    };

    if let Some(unsigned) = number.as_u64() {
        Some(unsigned.min(255) as u8)
    } else if number.as_i64().is_some() {
        Some(0)
    } else {
        number.as_f64().map(|float| float.clamp(0.0, 255.0) as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_effect_id_bounds() {
        assert_eq!(effect_id(&json!({"id": 0}), 4), Ok(0));
        assert_eq!(effect_id(&json!({"id": 3}), 4), Ok(3));
        assert_eq!(effect_id(&json!({"id": 4}), 4), Err(Rejection::InvalidEffectId));
        assert_eq!(effect_id(&json!({"id": -1}), 4), Err(Rejection::InvalidEffectId));
        assert_eq!(effect_id(&json!({"id": "2"}), 4), Err(Rejection::InvalidEffectId));
        assert_eq!(effect_id(&json!({}), 4), Err(Rejection::MissingField("id")));
    }

    #[test]
    fn test_param_updates_rejects_strings() {
        let body = json!({"speed": 10, "mode": "fast"});
        assert_eq!(
            param_updates(&body),
            Err(Rejection::InvalidParamValue(String::from("mode")))
        );
    }

    #[test]
    fn test_param_updates_non_object_is_empty() {
        assert_eq!(param_updates(&json!({})), Err(Rejection::EmptyParams));
        assert_eq!(param_updates(&json!([1, 2])), Err(Rejection::EmptyParams));
    }

    #[test]
    fn test_coerce_u8_saturates() {
        assert_eq!(coerce_u8(&json!(200)), Some(200));
        assert_eq!(coerce_u8(&json!(300)), Some(255));
        assert_eq!(coerce_u8(&json!(-20)), Some(0));
        assert_eq!(coerce_u8(&json!(99.9)), Some(99));
        assert_eq!(coerce_u8(&json!(true)), None);
    }

    #[test]
    fn test_brightness_save_flag() {
        assert_eq!(
            brightness(&json!({"value": 10, "save": true})),
            Ok(BrightnessRequest { value: 10, save: true })
        );
        assert_eq!(
            brightness(&json!({"value": 10, "save": "yes"})),
            Ok(BrightnessRequest { value: 10, save: false })
        );
        assert_eq!(
            brightness(&json!({"save": true})),
            Err(Rejection::MissingField("value"))
        );
    }

    #[test]
    fn test_power_requires_bool() {
        assert_eq!(power(&json!({"on": false})), Ok(false));
        assert_eq!(power(&json!({})), Err(Rejection::MissingField("on")));
        assert_eq!(power(&json!({"on": 1})), Err(Rejection::InvalidField("on")));
    }
}

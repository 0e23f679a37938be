//! Integration Tests für die Effekt-Engine als `LedController`

use esp_core::settings::Snapshot;
use esp_core::{EffectEngine, LedController, LedError, ParamValue};
use serde_json::{Value, json};

fn params_json(engine: &EffectEngine) -> Value {
    serde_json::to_value(engine.params()).unwrap()
}

#[test]
fn test_defaults_after_boot() {
    let engine = EffectEngine::new();
    let status = engine.status();

    assert!(status.power);
    assert_eq!(status.brightness, 128);
    assert_eq!(status.effect, 0);
    assert_eq!(status.effect_name, "Solid");
    assert_eq!(status.num_effects, 4);
}

#[test]
fn test_effect_roster() {
    let engine = EffectEngine::new();
    let names: Vec<String> = engine.effects().into_iter().map(|e| e.name).collect();

    assert_eq!(names, ["Solid", "Rainbow", "Breathe", "Chase"]);
    assert_eq!(engine.num_effects(), engine.effects().len());
}

#[test]
fn test_params_of_active_effect_in_declared_order() {
    let engine = EffectEngine::new();
    let body = serde_json::to_string(&engine.params()).unwrap();

    assert_eq!(body, r#"{"effect":0,"params":{"r":255,"g":160,"b":60}}"#);
}

#[test]
fn test_set_effect_out_of_range() {
    let mut engine = EffectEngine::new();
    assert_eq!(engine.set_effect(4), Err(LedError::InvalidEffect));
    assert_eq!(engine.status().effect, 0);
}

#[test]
fn test_param_values_are_clamped() {
    let mut engine = EffectEngine::new();
    engine.set_param("r", ParamValue::Int(300)).unwrap();
    engine.set_param("g", ParamValue::Int(-1)).unwrap();
    engine.set_param("b", ParamValue::Float(12.9)).unwrap();

    assert_eq!(params_json(&engine)["params"], json!({"r": 255, "g": 0, "b": 12}));
}

#[test]
fn test_unknown_param_is_ignored() {
    let mut engine = EffectEngine::new();
    let before = engine.params();

    engine.set_param("speed", ParamValue::Int(99)).unwrap();

    assert_eq!(engine.params(), before);
}

#[test]
fn test_params_survive_effect_switch() {
    let mut engine = EffectEngine::new();
    engine.set_param("r", ParamValue::Int(7)).unwrap();

    engine.set_effect(1).unwrap();
    engine.set_param("speed", ParamValue::Int(100)).unwrap();
    engine.set_param("reverse", ParamValue::Bool(true)).unwrap();
    assert_eq!(
        params_json(&engine),
        json!({"effect": 1, "params": {"speed": 100, "density": 4, "reverse": true}})
    );

    engine.set_effect(0).unwrap();
    assert_eq!(engine.param("r"), Some(7));

    engine.set_effect(1).unwrap();
    assert_eq!(engine.param("speed"), Some(100));
}

#[test]
fn test_restore_from_snapshot() {
    let mut engine = EffectEngine::new();
    engine.restore(&Snapshot {
        effect: 1,
        brightness: 50,
        params: Some(r#"{"speed":200,"reverse":true,"bogus":1}"#.to_string()),
        params_effect: Some(1),
    });

    let status = engine.status();
    assert_eq!(status.effect_name, "Rainbow");
    assert_eq!(status.brightness, 50);
    assert_eq!(engine.param("speed"), Some(200));
    assert_eq!(engine.param("reverse"), Some(1));
    assert_eq!(engine.param("bogus"), None);
}

#[test]
fn test_restore_ignores_garbage() {
    let mut engine = EffectEngine::new();
    engine.restore(&Snapshot {
        effect: 42,
        brightness: 10,
        params: Some("not json".to_string()),
        params_effect: Some(0),
    });

    assert_eq!(engine.status().effect, 0);
    assert_eq!(engine.status().brightness, 10);
    assert_eq!(params_json(&engine)["params"], json!({"r": 255, "g": 160, "b": 60}));
}

#[test]
fn test_restore_applies_params_to_their_own_effect() {
    let mut engine = EffectEngine::new();
    engine.restore(&Snapshot {
        effect: 3,
        brightness: 128,
        params: Some(r#"{"r":7,"g":7,"b":7,"speed":200}"#.to_string()),
        params_effect: Some(2),
    });

    // Chase bleibt aktiv und unverändert
    assert_eq!(engine.status().effect_name, "Chase");
    assert_eq!(
        params_json(&engine)["params"],
        json!({"r": 255, "g": 40, "b": 0, "speed": 64, "length": 4})
    );

    engine.set_effect(2).unwrap();
    assert_eq!(
        params_json(&engine)["params"],
        json!({"r": 7, "g": 7, "b": 7, "speed": 200})
    );
}

#[test]
fn test_restore_skips_params_without_owner() {
    let mut engine = EffectEngine::new();
    engine.restore(&Snapshot {
        effect: 0,
        brightness: 128,
        params: Some(r#"{"r":1}"#.to_string()),
        params_effect: None,
    });

    assert_eq!(engine.param("r"), Some(255));
}

#[test]
fn test_power_does_not_touch_other_state() {
    let mut engine = EffectEngine::new();
    engine.set_effect(2).unwrap();
    engine.set_power(false).unwrap();

    let status = engine.status();
    assert!(!status.power);
    assert_eq!(status.effect, 2);
    assert_eq!(status.brightness, 128);
}

//! Effekt-Engine
//!
//! Besitzt den kompletten Laufzeit-Zustand des LED-Strips und rendert daraus
//! Frames. Implementiert `LedController`, damit die REST-API sie steuern kann.
//!
//! Parameter werden pro Effekt gehalten: ein Wechsel des Effekts verliert die
//! Einstellungen der anderen Effekte nicht.

use alloc::string::String;
use alloc::vec::Vec;

use rgb::RGB8;
use serde_json::{Map, Value};

use crate::logic::{color_wheel, scale_color, triangle_wave};
use crate::settings::{DEFAULT_BRIGHTNESS, Snapshot};
use crate::traits::{LedController, LedError};
use crate::types::{DeviceStatus, Effect, ParamSet, ParamSnapshot, ParamValue};

/// Anzahl der Effekte im Repertoire
pub const EFFECT_COUNT: usize = 4;

/// Wertebereich eines Parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Int { min: i64, max: i64 },
    Bool,
}

/// Beschreibung eines Effekt-Parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub default: i64,
}

impl ParamSpec {
    const fn int(name: &'static str, min: i64, max: i64, default: i64) -> Self {
        Self {
            name,
            kind: ParamKind::Int { min, max },
            default,
        }
    }

    const fn flag(name: &'static str, default: bool) -> Self {
        Self {
            name,
            kind: ParamKind::Bool,
            default: default as i64,
        }
    }

    /// Bringt einen beliebigen Wert in den Wertebereich dieses Parameters
    pub fn coerce(&self, value: ParamValue) -> i64 {
        match self.kind {
            ParamKind::Int { min, max } => value.as_i64().clamp(min, max),
            ParamKind::Bool => i64::from(value.as_bool()),
        }
    }

    fn to_value(self, raw: i64) -> ParamValue {
        match self.kind {
            ParamKind::Int { .. } => ParamValue::Int(raw),
            ParamKind::Bool => ParamValue::Bool(raw != 0),
        }
    }
}

const SOLID_PARAMS: &[ParamSpec] = &[
    ParamSpec::int("r", 0, 255, 255),
    ParamSpec::int("g", 0, 255, 160),
    ParamSpec::int("b", 0, 255, 60),
];

const RAINBOW_PARAMS: &[ParamSpec] = &[
    ParamSpec::int("speed", 1, 255, 32),
    ParamSpec::int("density", 1, 32, 4),
    ParamSpec::flag("reverse", false),
];

const BREATHE_PARAMS: &[ParamSpec] = &[
    ParamSpec::int("r", 0, 255, 0),
    ParamSpec::int("g", 0, 255, 120),
    ParamSpec::int("b", 0, 255, 255),
    ParamSpec::int("speed", 1, 255, 24),
];

const CHASE_PARAMS: &[ParamSpec] = &[
    ParamSpec::int("r", 0, 255, 255),
    ParamSpec::int("g", 0, 255, 40),
    ParamSpec::int("b", 0, 255, 0),
    ParamSpec::int("speed", 1, 255, 64),
    ParamSpec::int("length", 1, 32, 4),
];

/// Die verfügbaren Effekte, in ID-Reihenfolge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    Solid,
    Rainbow,
    Breathe,
    Chase,
}

impl EffectKind {
    pub const ALL: [EffectKind; EFFECT_COUNT] = [
        EffectKind::Solid,
        EffectKind::Rainbow,
        EffectKind::Breathe,
        EffectKind::Chase,
    ];

    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.get(usize::from(id)).copied()
    }

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            EffectKind::Solid => "Solid",
            EffectKind::Rainbow => "Rainbow",
            EffectKind::Breathe => "Breathe",
            EffectKind::Chase => "Chase",
        }
    }

    pub fn param_specs(self) -> &'static [ParamSpec] {
        match self {
            EffectKind::Solid => SOLID_PARAMS,
            EffectKind::Rainbow => RAINBOW_PARAMS,
            EffectKind::Breathe => BREATHE_PARAMS,
            EffectKind::Chase => CHASE_PARAMS,
        }
    }
}

/// Laufzeit-Zustand + Renderer
#[derive(Debug, Clone)]
pub struct EffectEngine {
    power: bool,
    brightness: u8,
    effect: EffectKind,
    /// Parameterwerte pro Effekt, Index = Effekt-ID, Reihenfolge = `param_specs()`
    values: Vec<Vec<i64>>,
}

impl Default for EffectEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl EffectEngine {
    pub fn new() -> Self {
        let values = EffectKind::ALL
            .iter()
            .map(|kind| kind.param_specs().iter().map(|spec| spec.default).collect())
            .collect();

        Self {
            power: true,
            brightness: DEFAULT_BRIGHTNESS,
            effect: EffectKind::Solid,
            values,
        }
    }

    /// Übernimmt den gespeicherten Zustand nach dem Boot
    ///
    /// Der Parameter-Blob wird auf den Effekt angewendet, zu dem er gespeichert
    /// wurde, nicht auf den aktiven. Ungültige Effekt-IDs oder kaputte
    /// Parameter-Blobs werden ignoriert.
    pub fn restore(&mut self, snapshot: &Snapshot) {
        match EffectKind::from_id(snapshot.effect) {
            Some(kind) => self.effect = kind,
            None => warn!("Engine: stored effect {} unknown, keeping default", snapshot.effect),
        }
        self.brightness = snapshot.brightness;

        let Some(blob) = snapshot.params.as_deref() else {
            return;
        };
        let Some(owner) = snapshot.params_effect.and_then(EffectKind::from_id) else {
            warn!("Engine: stored params have no valid effect, ignoring");
            return;
        };
        let params = match serde_json::from_str::<Map<String, Value>>(blob) {
            Ok(params) => params,
            Err(_) => {
                warn!("Engine: stored params are not a JSON object, ignoring");
                return;
            }
        };

        let active = self.effect;
        self.effect = owner;
        for (key, value) in &params {
            if let Some(value) = ParamValue::from_json(value) {
                self.apply_param(key, value);
            }
        }
        self.effect = active;
    }

    pub fn effect(&self) -> EffectKind {
        self.effect
    }

    pub fn power(&self) -> bool {
        self.power
    }

    pub fn brightness(&self) -> u8 {
        self.brightness
    }

    /// Aktueller Wert eines Parameters des aktiven Effekts
    pub fn param(&self, name: &str) -> Option<i64> {
        let specs = self.effect.param_specs();
        let index = specs.iter().position(|spec| spec.name == name)?;
        Some(self.current_values()[index])
    }

    fn current_values(&self) -> &[i64] {
        &self.values[usize::from(self.effect.id())]
    }

    fn apply_param(&mut self, key: &str, value: ParamValue) {
        let specs = self.effect.param_specs();
        let Some(index) = specs.iter().position(|spec| spec.name == key) else {
            warn!("Engine: effect {} has no parameter '{}'", self.effect.name(), key);
            return;
        };
        let coerced = specs[index].coerce(value);
        self.values[usize::from(self.effect.id())][index] = coerced;
    }

    fn rgb_param(&self) -> RGB8 {
        // r, g, b stehen bei allen farbigen Effekten an Position 0..3
        let values = self.current_values();
        RGB8 {
            r: values[0] as u8,
            g: values[1] as u8,
            b: values[2] as u8,
        }
    }

    /// Rendert einen Frame für den Zeitpunkt `now_ms` in `pixels`
    pub fn render(&self, now_ms: u64, pixels: &mut [RGB8]) {
        if !self.power {
            pixels.fill(RGB8::default());
            return;
        }

        let values = self.current_values();
        match self.effect {
            EffectKind::Solid => pixels.fill(self.rgb_param()),
            EffectKind::Rainbow => {
                let (speed, density, reverse) = (values[0] as u64, values[1] as u32, values[2] != 0);
                let mut base = (now_ms.wrapping_mul(speed) / 64) as u8;
                if reverse {
                    base = base.wrapping_neg();
                }
                for (i, pixel) in pixels.iter_mut().enumerate() {
                    let hue = base.wrapping_add((i as u32).wrapping_mul(density * 8) as u8);
                    *pixel = color_wheel(hue);
                }
            }
            EffectKind::Breathe => {
                let phase = (now_ms.wrapping_mul(values[3] as u64) / 64) as u8;
                pixels.fill(scale_color(self.rgb_param(), triangle_wave(phase)));
            }
            EffectKind::Chase => {
                let len = pixels.len();
                if len == 0 {
                    return;
                }
                let color = self.rgb_param();
                let length = values[4] as usize;
                let head = (now_ms.wrapping_mul(values[3] as u64) / 1024) as usize % len;
                for (i, pixel) in pixels.iter_mut().enumerate() {
                    let distance = (head + len - i) % len;
                    *pixel = if distance < length {
                        let fade = 255 - (distance * 255 / length) as u8;
                        scale_color(color, fade)
                    } else {
                        RGB8::default()
                    };
                }
            }
        }

        if self.brightness != 255 {
            for pixel in pixels.iter_mut() {
                *pixel = scale_color(*pixel, self.brightness);
            }
        }
    }
}

impl LedController for EffectEngine {
    fn status(&self) -> DeviceStatus {
        DeviceStatus {
            power: self.power,
            brightness: self.brightness,
            effect: self.effect.id(),
            effect_name: String::from(self.effect.name()),
            num_effects: EFFECT_COUNT,
        }
    }

    fn effects(&self) -> Vec<Effect> {
        EffectKind::ALL
            .iter()
            .map(|kind| Effect {
                id: kind.id(),
                name: String::from(kind.name()),
            })
            .collect()
    }

    fn params(&self) -> ParamSnapshot {
        let mut params = ParamSet::new();
        for (spec, raw) in self.effect.param_specs().iter().zip(self.current_values()) {
            params.insert(spec.name, spec.to_value(*raw));
        }
        ParamSnapshot {
            effect: self.effect.id(),
            params,
        }
    }

    fn num_effects(&self) -> usize {
        EFFECT_COUNT
    }

    fn effect_name(&self) -> String {
        String::from(self.effect.name())
    }

    fn set_effect(&mut self, id: u8) -> Result<(), LedError> {
        let kind = EffectKind::from_id(id).ok_or(LedError::InvalidEffect)?;
        info!("Engine: effect -> {}", kind.name());
        self.effect = kind;
        Ok(())
    }

    fn set_param(&mut self, key: &str, value: ParamValue) -> Result<(), LedError> {
        self.apply_param(key, value);
        Ok(())
    }

    fn set_power(&mut self, on: bool) -> Result<(), LedError> {
        info!("Engine: power -> {}", on);
        self.power = on;
        Ok(())
    }

    fn set_brightness(&mut self, value: u8) -> Result<(), LedError> {
        self.brightness = value;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effect_ids_match_roster_order() {
        for (index, kind) in EffectKind::ALL.iter().enumerate() {
            assert_eq!(usize::from(kind.id()), index);
            assert_eq!(EffectKind::from_id(kind.id()), Some(*kind));
        }
        assert_eq!(EffectKind::from_id(EFFECT_COUNT as u8), None);
    }

    #[test]
    fn test_param_spec_coerce() {
        let speed = ParamSpec::int("speed", 1, 255, 32);
        assert_eq!(speed.coerce(ParamValue::Int(1000)), 255);
        assert_eq!(speed.coerce(ParamValue::Int(-5)), 1);
        assert_eq!(speed.coerce(ParamValue::Bool(true)), 1);

        let reverse = ParamSpec::flag("reverse", false);
        assert_eq!(reverse.coerce(ParamValue::Int(7)), 1);
        assert_eq!(reverse.coerce(ParamValue::Bool(false)), 0);
    }

    #[test]
    fn test_render_power_off_is_black() {
        let mut engine = EffectEngine::new();
        engine.set_power(false).unwrap();

        let mut pixels = [RGB8 { r: 1, g: 2, b: 3 }; 8];
        engine.render(1234, &mut pixels);
        assert!(pixels.iter().all(|p| *p == RGB8::default()));
    }
}

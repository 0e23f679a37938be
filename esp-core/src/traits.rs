//! Hardware- und Kollaborator-Traits
//!
//! Diese Traits definieren die Schnittstellen, über die die REST-API mit der
//! Effekt-Engine und dem Flash-Speicher redet, sowie den LED-Hardware-Zugriff.
//! Jede Implementierung ist austauschbar (Production vs. Mock in Tests).

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use rgb::RGB8;

use crate::types::{DeviceStatus, Effect, ParamSnapshot, ParamValue};

/// Fehler-Typ für LED-Operationen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedError {
    /// Hardware-Schreibzugriff fehlgeschlagen
    WriteFailed,
    /// Effekt-ID existiert nicht
    InvalidEffect,
    /// Engine momentan nicht erreichbar
    Unavailable,
}

impl fmt::Display for LedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedError::WriteFailed => f.write_str("LED write failed"),
            LedError::InvalidEffect => f.write_str("invalid effect id"),
            LedError::Unavailable => f.write_str("LED controller unavailable"),
        }
    }
}

/// Fehler-Typ für Flash-Persistenz
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// Flash-Lese- oder Schreibzugriff fehlgeschlagen
    Flash,
    /// Datensatz passt nicht in den reservierten Bereich
    TooLarge,
    /// Serialisierung fehlgeschlagen
    Encode,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Flash => f.write_str("flash access failed"),
            StorageError::TooLarge => f.write_str("settings record too large"),
            StorageError::Encode => f.write_str("settings encoding failed"),
        }
    }
}

/// Trait für SmartLED Hardware-Zugriff
///
/// Abstrahiert den Zugriff auf einen RGB LED-Strip (WS2812/Neopixel).
///
/// # Implementierungen
/// - **Production:** RmtLedWriter (ESP32 RMT Peripheral)
/// - **Testing:** MockLedWriter (in-memory Mock)
pub trait SmartLedWriter: Send {
    /// Schreibt einen kompletten Frame (eine Farbe pro LED) auf den Strip
    ///
    /// # Fehlerbehandlung
    /// Gibt `LedError::WriteFailed` zurück wenn Hardware-Zugriff fehlschlägt
    fn write(&mut self, pixels: &[RGB8]) -> Result<(), LedError>;
}

/// Zustands-Fassade der Effekt-Engine
///
/// Die Engine besitzt den gesamten Laufzeit-Zustand (Power, Helligkeit,
/// aktiver Effekt, Parameter). Die API hält nie eine eigene Kopie.
///
/// # Implementierungen
/// - **Production:** `EffectEngine` (hinter einem Mutex in der Firmware)
/// - **Testing:** MockLedController (zählt Aufrufe)
pub trait LedController {
    fn status(&self) -> DeviceStatus;

    fn effects(&self) -> Vec<Effect>;

    /// Parameter des aktuell aktiven Effekts
    fn params(&self) -> ParamSnapshot;

    fn num_effects(&self) -> usize;

    /// Name des aktuell aktiven Effekts
    fn effect_name(&self) -> String;

    fn set_effect(&mut self, id: u8) -> Result<(), LedError>;

    /// Setzt einen Parameter auf dem aktiven Effekt
    ///
    /// Ob der Schlüssel für den Effekt sinnvoll ist, entscheidet allein die Engine.
    fn set_param(&mut self, key: &str, value: ParamValue) -> Result<(), LedError>;

    fn set_power(&mut self, on: bool) -> Result<(), LedError>;

    fn set_brightness(&mut self, value: u8) -> Result<(), LedError>;
}

/// Persistenz-Fassade (nicht-flüchtiger Key/Value-Speicher)
///
/// # Implementierungen
/// - **Production:** `FlashSettingsStore` über `embedded_storage::Storage`
/// - **Testing:** MockSettingsStore (zeichnet Aufrufe auf)
pub trait SettingsStore {
    fn save_effect(&mut self, id: u8) -> Result<(), StorageError>;

    /// Speichert die serialisierten Parameter des aktiven Effekts (JSON-Objekt)
    fn save_params(&mut self, blob: &str) -> Result<(), StorageError>;

    fn save_brightness(&mut self, value: u8) -> Result<(), StorageError>;
}

//! ESP Core - Platform-agnostic Logic and Traits
//!
//! Diese Crate enthält KEINE Hardware-Dependencies.
//! Sie definiert die Traits für Effekt-Engine, Persistenz und Transport,
//! die REST-API-Logik sowie die Effekt-Engine selbst.
//! Alles hier ist auf dem Host (x86_64) testbar.

#![no_std]

extern crate alloc;

// Muss als erstes Modul stehen, damit die Log-Makros überall sichtbar sind
mod fmt;

pub mod api;
pub mod engine;
pub mod logic;
pub mod settings;
pub mod traits;
pub mod types;

// Re-exports für einfachen Zugriff
pub use api::{ApiError, LedApi, begin};
pub use engine::EffectEngine;
pub use logic::{color_wheel, scale_color, triangle_wave};
pub use settings::{FlashSettingsStore, Snapshot};
pub use traits::{LedController, LedError, SettingsStore, SmartLedWriter, StorageError};
pub use types::{DeviceStatus, Effect, ParamSet, ParamSnapshot, ParamValue};

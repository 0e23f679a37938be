// Library-Root: Hardware-Glue für die LED REST-API
// Keine Standard-Bibliothek (Embedded System)
#![no_std]

extern crate alloc;

// Module
pub mod config;
pub mod hal;
pub mod tasks;

use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use esp_storage::FlashStorage;

// Re-exports von esp-core
pub use esp_core::{
    DeviceStatus, Effect, EffectEngine, FlashSettingsStore, LedController, LedError,
    ParamSnapshot, ParamValue, SettingsStore, SmartLedWriter, StorageError,
};

// ============================================================================
// Type-Aliase für geteilten Zustand
// ============================================================================
//
// Engine und Settings liegen je einmal in einem statischen Mutex.
// HTTP-Tasks und Render-Task greifen über die Handles unten darauf zu.

/// Settings-Store auf dem internen Flash
pub type FlashStore = FlashSettingsStore<FlashStorage<'static>>;

/// Mutex um die Effekt-Engine
pub type EngineMutex = Mutex<CriticalSectionRawMutex, RefCell<EffectEngine>>;

/// Mutex um den Settings-Store
pub type SettingsMutex = Mutex<CriticalSectionRawMutex, RefCell<FlashStore>>;

/// Weckt den Render-Task nach einer Zustandsänderung
pub type RenderSignal = Signal<CriticalSectionRawMutex, ()>;

// ============================================================================
// Handles
// ============================================================================

/// `LedController` über die geteilte Engine
///
/// Jeder Aufruf sperrt den Mutex nur für die Dauer dieses einen Aufrufs.
/// Erfolgreiche Änderungen wecken den Render-Task.
#[derive(Clone, Copy)]
pub struct SharedEngine {
    engine: &'static EngineMutex,
    changed: &'static RenderSignal,
}

impl SharedEngine {
    pub fn new(engine: &'static EngineMutex, changed: &'static RenderSignal) -> Self {
        Self { engine, changed }
    }

    fn read<T>(&self, f: impl FnOnce(&EffectEngine) -> T) -> T {
        self.engine.lock(|engine| f(&engine.borrow()))
    }

    fn update(
        &self,
        f: impl FnOnce(&mut EffectEngine) -> Result<(), LedError>,
    ) -> Result<(), LedError> {
        let result = self.engine.lock(|engine| f(&mut engine.borrow_mut()));
        if result.is_ok() {
            self.changed.signal(());
        }
        result
    }
}

impl LedController for SharedEngine {
    fn status(&self) -> DeviceStatus {
        self.read(|engine| engine.status())
    }

    fn effects(&self) -> Vec<Effect> {
        self.read(|engine| engine.effects())
    }

    fn params(&self) -> ParamSnapshot {
        self.read(|engine| engine.params())
    }

    fn num_effects(&self) -> usize {
        self.read(|engine| engine.num_effects())
    }

    fn effect_name(&self) -> String {
        self.read(|engine| engine.effect_name())
    }

    fn set_effect(&mut self, id: u8) -> Result<(), LedError> {
        self.update(|engine| engine.set_effect(id))
    }

    fn set_param(&mut self, key: &str, value: ParamValue) -> Result<(), LedError> {
        self.update(|engine| engine.set_param(key, value))
    }

    fn set_power(&mut self, on: bool) -> Result<(), LedError> {
        self.update(|engine| engine.set_power(on))
    }

    fn set_brightness(&mut self, value: u8) -> Result<(), LedError> {
        self.update(|engine| engine.set_brightness(value))
    }
}

/// `SettingsStore` über den geteilten Flash-Store
#[derive(Clone, Copy)]
pub struct SharedSettings {
    store: &'static SettingsMutex,
}

impl SharedSettings {
    pub fn new(store: &'static SettingsMutex) -> Self {
        Self { store }
    }

    fn update(
        &self,
        f: impl FnOnce(&mut FlashStore) -> Result<(), StorageError>,
    ) -> Result<(), StorageError> {
        self.store.lock(|store| f(&mut store.borrow_mut()))
    }
}

impl SettingsStore for SharedSettings {
    fn save_effect(&mut self, id: u8) -> Result<(), StorageError> {
        self.update(|store| store.save_effect(id))
    }

    fn save_params(&mut self, blob: &str) -> Result<(), StorageError> {
        self.update(|store| store.save_params(blob))
    }

    fn save_brightness(&mut self, value: u8) -> Result<(), StorageError> {
        self.update(|store| store.save_brightness(value))
    }
}

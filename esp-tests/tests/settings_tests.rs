//! Integration Tests für den Flash-Speicher
//!
//! MockFlash bildet einen gelöschten Flash-Bereich (0xFF) im RAM nach.

use embedded_storage::{ReadStorage, Storage};
use esp_core::api::{Method, RouteTable, begin};
use esp_core::settings::{DEFAULT_BRIGHTNESS, MAX_RECORD_LEN, SETTINGS_MAGIC, Snapshot};
use esp_core::{
    EffectEngine, FlashSettingsStore, LedApi, LedController, SettingsStore, StorageError,
};
use serde_json::json;

const FLASH_SIZE: usize = 8192;

// ============================================================================
// Mock Flash
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockFlashError;

#[derive(Clone)]
pub struct MockFlash {
    pub data: Vec<u8>,
    pub write_count: usize,
    pub fail_writes: bool,
}

impl MockFlash {
    pub fn erased() -> Self {
        Self::with_size(FLASH_SIZE)
    }

    pub fn with_size(size: usize) -> Self {
        Self {
            data: vec![0xFF; size],
            write_count: 0,
            fail_writes: false,
        }
    }

    fn range(&self, offset: u32, len: usize) -> Result<core::ops::Range<usize>, MockFlashError> {
        let start = offset as usize;
        let end = start.checked_add(len).ok_or(MockFlashError)?;
        if end > self.data.len() {
            return Err(MockFlashError);
        }
        Ok(start..end)
    }
}

impl ReadStorage for MockFlash {
    type Error = MockFlashError;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        let range = self.range(offset, bytes.len())?;
        bytes.copy_from_slice(&self.data[range]);
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.data.len()
    }
}

impl Storage for MockFlash {
    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        if self.fail_writes {
            return Err(MockFlashError);
        }
        let range = self.range(offset, bytes.len())?;
        self.data[range].copy_from_slice(bytes);
        self.write_count += 1;
        Ok(())
    }
}

/// Simuliert einen Neustart: gleicher Flash-Inhalt, neuer Store
fn reboot(store: &FlashSettingsStore<MockFlash>, offset: u32) -> FlashSettingsStore<MockFlash> {
    FlashSettingsStore::load(store.flash().clone(), offset)
}

// ============================================================================
// Tests: Laden und Speichern
// ============================================================================

#[test]
fn test_erased_flash_loads_defaults() {
    let store = FlashSettingsStore::load(MockFlash::erased(), 0);

    assert_eq!(store.snapshot(), &Snapshot::default());
    assert_eq!(store.snapshot().brightness, DEFAULT_BRIGHTNESS);
    assert_eq!(store.flash().write_count, 0);
}

#[test]
fn test_save_effect_survives_reboot() {
    let mut store = FlashSettingsStore::load(MockFlash::erased(), 0);
    store.save_effect(3).unwrap();

    assert_eq!(&store.flash().data[..4], &SETTINGS_MAGIC);

    let reloaded = reboot(&store, 0);
    assert_eq!(reloaded.snapshot().effect, 3);
    assert_eq!(reloaded.snapshot().brightness, DEFAULT_BRIGHTNESS);
}

#[test]
fn test_saves_accumulate_into_one_record() {
    let mut store = FlashSettingsStore::load(MockFlash::erased(), 0);
    store.save_effect(1).unwrap();
    store.save_params(r#"{"speed":90}"#).unwrap();
    store.save_brightness(42).unwrap();

    assert_eq!(store.flash().write_count, 3);

    let reloaded = reboot(&store, 0);
    assert_eq!(
        reloaded.snapshot(),
        &Snapshot {
            effect: 1,
            brightness: 42,
            params: Some(r#"{"speed":90}"#.to_string()),
            params_effect: Some(1),
        }
    );
}

#[test]
fn test_offset_is_respected() {
    let mut store = FlashSettingsStore::load(MockFlash::erased(), 4096);
    store.save_brightness(7).unwrap();

    assert!(store.flash().data[..4096].iter().all(|b| *b == 0xFF));
    assert_eq!(&store.flash().data[4096..4100], &SETTINGS_MAGIC);

    assert_eq!(reboot(&store, 4096).snapshot().brightness, 7);
    assert_eq!(reboot(&store, 0).snapshot(), &Snapshot::default());
}

#[test]
fn test_record_stays_inside_nvs_partition() {
    // Standard-Layout: nvs bei 0x9000 (24 KB), phy_init bei 0xF000, App ab 0x10000
    const NVS_OFFSET: u32 = 0x9000;
    const PHY_INIT_OFFSET: usize = 0xF000;

    let mut store = FlashSettingsStore::load(MockFlash::with_size(0x10000), NVS_OFFSET);
    store.save_effect(2).unwrap();
    store.save_brightness(42).unwrap();
    store.save_params(r#"{"r":7,"g":7,"b":7,"speed":200}"#).unwrap();

    let flash = &store.flash().data;
    let start = NVS_OFFSET as usize;
    assert!(flash[..start].iter().all(|b| *b == 0xFF));
    assert_eq!(&flash[start..start + 4], &SETTINGS_MAGIC);
    assert!(flash[start + MAX_RECORD_LEN..].iter().all(|b| *b == 0xFF));
    assert!(start + MAX_RECORD_LEN <= PHY_INIT_OFFSET);

    let restored = reboot(&store, NVS_OFFSET);
    assert_eq!(restored.snapshot().effect, 2);
    assert_eq!(restored.snapshot().brightness, 42);
    assert_eq!(restored.snapshot().params_effect, Some(2));
}

#[test]
fn test_corrupt_payload_loads_defaults() {
    let mut flash = MockFlash::erased();
    flash.data[..4].copy_from_slice(&SETTINGS_MAGIC);
    flash.data[4..6].copy_from_slice(&5u16.to_le_bytes());
    flash.data[6..11].copy_from_slice(b"{oops");

    let store = FlashSettingsStore::load(flash, 0);
    assert_eq!(store.snapshot(), &Snapshot::default());
}

#[test]
fn test_write_failure_reported() {
    let mut flash = MockFlash::erased();
    flash.fail_writes = true;
    let mut store = FlashSettingsStore::load(flash, 0);

    assert_eq!(store.save_effect(2), Err(StorageError::Flash));
}

#[test]
fn test_oversized_params_not_written() {
    let mut store = FlashSettingsStore::load(MockFlash::erased(), 0);
    let blob = format!(r#"{{"x":"{}"}}"#, "a".repeat(2000));

    assert_eq!(store.save_params(&blob), Err(StorageError::TooLarge));
    assert_eq!(store.flash().write_count, 0);
}

// ============================================================================
// Tests: API + Engine + Flash zusammen
// ============================================================================

#[test]
fn test_api_changes_restored_after_reboot() {
    let mut table = RouteTable::new();
    begin(Some(&mut table)).unwrap();

    let store = FlashSettingsStore::load(MockFlash::erased(), 0);
    let mut api = LedApi::new(EffectEngine::new(), store);

    let requests = [
        ("/api/led/effect", json!({"id": 1})),
        ("/api/led/params", json!({"speed": 77, "reverse": true})),
        ("/api/led/brightness", json!({"value": 33, "save": true})),
        ("/api/led/power", json!({"on": false})),
    ];
    for (path, body) in requests {
        let raw = serde_json::to_vec(&body).unwrap();
        let response = api.serve(&table, Method::Post, path, &raw);
        assert_eq!(response.status, 200, "{path}");
    }

    let (engine, store) = api.into_parts();
    let reloaded = reboot(&store, 0);
    let mut restored = EffectEngine::new();
    restored.restore(reloaded.snapshot());

    assert_eq!(restored.status().effect, 1);
    assert_eq!(restored.status().brightness, 33);
    assert_eq!(restored.params(), engine.params());
    // Power wird nicht gespeichert
    assert!(restored.status().power);
    assert!(!engine.status().power);
}

#[test]
fn test_params_stay_with_their_effect_after_reboot() {
    let mut table = RouteTable::new();
    begin(Some(&mut table)).unwrap();

    let store = FlashSettingsStore::load(MockFlash::erased(), 0);
    let mut api = LedApi::new(EffectEngine::new(), store);

    let requests = [
        ("/api/led/effect", json!({"id": 2})),
        ("/api/led/params", json!({"r": 7, "g": 7, "b": 7, "speed": 200})),
        ("/api/led/effect", json!({"id": 3})),
    ];
    for (path, body) in requests {
        let raw = serde_json::to_vec(&body).unwrap();
        let response = api.serve(&table, Method::Post, path, &raw);
        assert_eq!(response.status, 200, "{path}");
    }

    let (mut engine, store) = api.into_parts();
    let reloaded = reboot(&store, 0);
    assert_eq!(reloaded.snapshot().params_effect, Some(2));

    let mut restored = EffectEngine::new();
    restored.restore(reloaded.snapshot());

    // Aktiver Effekt (Chase) behält seine eigenen Werte
    assert_eq!(restored.status().effect, 3);
    assert_eq!(restored.params(), engine.params());

    // Die gespeicherten Werte landen bei Breathe
    engine.set_effect(2).unwrap();
    restored.set_effect(2).unwrap();
    assert_eq!(restored.params(), engine.params());
    assert_eq!(restored.param("speed"), Some(200));
}

#[test]
fn test_unsaved_brightness_not_restored() {
    let mut table = RouteTable::new();
    begin(Some(&mut table)).unwrap();

    let store = FlashSettingsStore::load(MockFlash::erased(), 0);
    let mut api = LedApi::new(EffectEngine::new(), store);

    let response = api.serve(&table, Method::Post, "/api/led/brightness", br#"{"value":5}"#);
    assert_eq!(response.status, 200);
    assert_eq!(api.store().flash().write_count, 0);

    let reloaded = reboot(api.store(), 0);
    assert_eq!(reloaded.snapshot().brightness, DEFAULT_BRIGHTNESS);
}

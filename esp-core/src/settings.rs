//! Persistente Einstellungen im Flash
//!
//! Ein einzelner Datensatz an fester Flash-Adresse:
//!
//! ```text
//! [ "LEDS" (4 Byte) | Länge u16 LE (2 Byte) | JSON-Payload ]
//! ```
//!
//! Gelöschter Flash (0xFF) oder ein kaputter Datensatz ergibt die Default-Werte.

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use embedded_storage::Storage;
use serde::{Deserialize, Serialize};

use crate::traits::{SettingsStore, StorageError};

/// Magic-Bytes am Anfang des Datensatzes
pub const SETTINGS_MAGIC: [u8; 4] = *b"LEDS";

/// Header: Magic + Länge
pub const HEADER_LEN: usize = 6;

/// Maximale Datensatz-Größe inkl. Header
pub const MAX_RECORD_LEN: usize = 1024;

/// Helligkeit nach dem ersten Boot
pub const DEFAULT_BRIGHTNESS: u8 = 128;

/// Dauerhaft gespeicherter Teil des Gerätezustands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub effect: u8,
    pub brightness: u8,
    /// Parameter des zuletzt gespeicherten Effekts als JSON-Objekt
    #[serde(default)]
    pub params: Option<String>,
    /// Effekt, zu dem `params` gehört
    #[serde(default)]
    pub params_effect: Option<u8>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            effect: 0,
            brightness: DEFAULT_BRIGHTNESS,
            params: None,
            params_effect: None,
        }
    }
}

/// Serialisiert einen Snapshot inkl. Header
pub fn encode_record(snapshot: &Snapshot) -> Result<Vec<u8>, StorageError> {
    let payload = serde_json::to_vec(snapshot).map_err(|_| StorageError::Encode)?;
    if HEADER_LEN + payload.len() > MAX_RECORD_LEN {
        return Err(StorageError::TooLarge);
    }

    let mut record = Vec::with_capacity(HEADER_LEN + payload.len());
    record.extend_from_slice(&SETTINGS_MAGIC);
    record.extend_from_slice(&(payload.len() as u16).to_le_bytes());
    record.extend_from_slice(&payload);
    Ok(record)
}

/// Liest die Payload-Länge aus einem Header; `None` wenn kein gültiger Datensatz folgt
pub fn decode_header(header: &[u8; HEADER_LEN]) -> Option<usize> {
    if header[..4] != SETTINGS_MAGIC {
        return None;
    }
    let len = usize::from(u16::from_le_bytes([header[4], header[5]]));
    (len <= MAX_RECORD_LEN - HEADER_LEN).then_some(len)
}

/// Flash-basierter `SettingsStore`
///
/// Hält den zuletzt gespeicherten Snapshot im RAM und schreibt bei jedem
/// `save_*` den kompletten Datensatz neu.
pub struct FlashSettingsStore<F> {
    flash: F,
    offset: u32,
    snapshot: Snapshot,
}

impl<F: Storage> FlashSettingsStore<F> {
    /// Lädt den Datensatz ab `offset`; fehlt er, gelten die Default-Werte
    pub fn load(mut flash: F, offset: u32) -> Self {
        let snapshot = match read_snapshot(&mut flash, offset) {
            Some(snapshot) => {
                info!(
                    "Settings: loaded (effect {}, brightness {})",
                    snapshot.effect, snapshot.brightness
                );
                snapshot
            }
            None => {
                warn!("Settings: no valid record at 0x{:x}, using defaults", offset);
                Snapshot::default()
            }
        };

        Self {
            flash,
            offset,
            snapshot,
        }
    }

    /// Zuletzt gespeicherter (bzw. geladener) Zustand
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn flash(&self) -> &F {
        &self.flash
    }

    fn commit(&mut self) -> Result<(), StorageError> {
        let record = encode_record(&self.snapshot)?;
        self.flash.write(self.offset, &record).map_err(|_| {
            error!("Settings: flash write at 0x{:x} failed", self.offset);
            StorageError::Flash
        })
    }
}

fn read_snapshot<F: Storage>(flash: &mut F, offset: u32) -> Option<Snapshot> {
    let mut header = [0u8; HEADER_LEN];
    flash.read(offset, &mut header).ok()?;
    let len = decode_header(&header)?;

    let mut payload = vec![0u8; len];
    flash.read(offset + HEADER_LEN as u32, &mut payload).ok()?;
    serde_json::from_slice(&payload).ok()
}

impl<F: Storage> SettingsStore for FlashSettingsStore<F> {
    fn save_effect(&mut self, id: u8) -> Result<(), StorageError> {
        self.snapshot.effect = id;
        self.commit()
    }

    fn save_params(&mut self, blob: &str) -> Result<(), StorageError> {
        // Jeder Effekt-Wechsel läuft über save_effect, der Cache kennt also den aktiven Effekt
        self.snapshot.params = Some(String::from(blob));
        self.snapshot.params_effect = Some(self.snapshot.effect);
        self.commit()
    }

    fn save_brightness(&mut self, value: u8) -> Result<(), StorageError> {
        self.snapshot.brightness = value;
        self.commit()
    }
}

// Projekt-Konfiguration: Konstanten und Hardware-Zuordnungen

// ============================================================================
// LED Strip Konfiguration
// ============================================================================

/// GPIO-Pin für die Datenleitung des LED-Strips (WS2812/Neopixel)
/// Muss zum Peripheral in `led_render_task` passen (GPIO8)
pub const LED_GPIO_PIN: u8 = 8;

/// RMT Taktfrequenz in MHz
/// 80 MHz ist optimal für WS2812 LED-Timing
pub const RMT_CLOCK_MHZ: u32 = 80;

/// Anzahl der LEDs im Strip
pub const LED_COUNT: usize = 30;

/// Abstand zwischen zwei Frames in Millisekunden (~33 FPS)
pub const FRAME_INTERVAL_MS: u64 = 30;

// ============================================================================
// WiFi Konfiguration
// ============================================================================

/// WiFi SSID (Netzwerk-Name)
/// Wird zur Build-Zeit aus der Environment Variable WIFI_SSID geladen
/// Setze diese in .env file (siehe .env.example)
pub const WIFI_SSID: &str = env!(
    "WIFI_SSID",
    "WiFi SSID nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// WiFi Passwort
/// Wird zur Build-Zeit aus der Environment Variable WIFI_PASSWORD geladen
pub const WIFI_PASSWORD: &str = env!(
    "WIFI_PASSWORD",
    "WiFi Password nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// Wartezeit nach WiFi-Fehlern in Sekunden
pub const WIFI_RETRY_DELAY_SECS: u64 = 5;

/// Heap-Größe für WiFi (Bytes)
/// WiFi benötigt dynamischen Speicher für Pakete
pub const WIFI_HEAP_SIZE: usize = 65536; // 64 KB

/// Zusätzliche Heap-Größe (Bytes)
/// Engine-Parameter, JSON-Bodies und Settings-Datensätze liegen auf dem Heap
pub const EXTRA_HEAP_SIZE: usize = 36864; // 36 KB

// ============================================================================
// HTTP Server Konfiguration
// ============================================================================

/// TCP-Port der REST-API
pub const HTTP_PORT: u16 = 80;

/// Anzahl paralleler HTTP-Server-Tasks (eine Connection pro Task)
pub const HTTP_TASK_POOL_SIZE: usize = 4;

/// HTTP Buffer-Größe in Bytes
/// Request-Header + JSON-Body müssen komplett hineinpassen
pub const HTTP_BUFFER_SIZE: usize = 2048;

/// TCP RX Buffer-Größe in Bytes
pub const TCP_RX_BUFFER_SIZE: usize = 1024;

/// TCP TX Buffer-Größe in Bytes
pub const TCP_TX_BUFFER_SIZE: usize = 1024;

/// Wert für `Access-Control-Allow-Origin` auf jeder Antwort
pub const HTTP_CORS_ORIGIN: &str = "*";

// ============================================================================
// Persistenz
// ============================================================================

// Flash-Layout (Standard-Partitionstabelle von espflash):
//
//   0x0000_0000  Bootloader
//   0x0000_8000  Partitionstabelle
//   0x0000_9000  nvs       (data, 24 KB)   <- Settings-Datensatz
//   0x0000_F000  phy_init  (data, 4 KB)
//   0x0001_0000  factory   (app)
//
// Die App-Partition wird beim Flashen neu geschrieben, `nvs` nicht.

/// Start der `nvs` Daten-Partition
pub const NVS_PARTITION_OFFSET: u32 = 0x9000;

/// Größe der `nvs` Daten-Partition
pub const NVS_PARTITION_SIZE: u32 = 0x6000;

/// Flash-Sektor-Größe
pub const FLASH_SECTOR_SIZE: u32 = 0x1000;

/// Flash-Adresse des Settings-Datensatzes (erster Sektor der `nvs` Partition)
pub const SETTINGS_FLASH_OFFSET: u32 = NVS_PARTITION_OFFSET;

// Datensatz muss sektor-ausgerichtet komplett in `nvs` liegen
const _: () = assert!(SETTINGS_FLASH_OFFSET % FLASH_SECTOR_SIZE == 0);
const _: () = assert!(SETTINGS_FLASH_OFFSET >= NVS_PARTITION_OFFSET);
const _: () = assert!(
    SETTINGS_FLASH_OFFSET + esp_core::settings::MAX_RECORD_LEN as u32
        <= NVS_PARTITION_OFFSET + NVS_PARTITION_SIZE
);

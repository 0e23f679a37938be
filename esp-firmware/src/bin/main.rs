// Keine Standard-Bibliothek verwenden (Embedded System)
#![no_std]
// Kein normaler main() Einstiegspunkt (wird von esp_rtos bereitgestellt)
#![no_main]
// Verbiete mem::forget - gefährlich bei ESP HAL Types mit DMA-Buffern
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
// Verbiete große Stack-Frames (Stack ist auf Embedded Systemen begrenzt)
#![deny(clippy::large_stack_frames)]

// Heap Allocator (WiFi, Engine und JSON brauchen dynamischen Speicher)
extern crate alloc;

use core::cell::RefCell;

// Embassy Async Runtime
use embassy_executor::Spawner;
use embassy_net::{Config as NetConfig, Stack, StackResources};
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::{Duration, Timer};
use static_cell::StaticCell;

// ESP32-C6 HAL
use esp_hal::clock::CpuClock;
use esp_hal::rng::Rng;
use esp_hal::timer::timg::TimerGroup;
use esp_storage::FlashStorage;

// Backtrace bei Panic und println!() Support
use {esp_backtrace as _, esp_println as _};

use defmt::{error, info};
use esp_core::api::{RouteTable, begin};

// Projekt-Module und Konfiguration
use esp_led_api::config::{
    EXTRA_HEAP_SIZE, HTTP_TASK_POOL_SIZE, SETTINGS_FLASH_OFFSET, WIFI_HEAP_SIZE,
};
use esp_led_api::tasks::{
    connection_task, dhcp_task, http_server_task, led_render_task, net_task,
};
use esp_led_api::{
    EffectEngine, EngineMutex, FlashSettingsStore, RenderSignal, SettingsMutex, SharedEngine,
    SharedSettings,
};

// ESP-IDF App Descriptor - erforderlich für den Bootloader!
// Ohne diesen schlägt das Flashen mit "ESP-IDF App Descriptor missing" fehl
esp_bootloader_esp_idf::esp_app_desc!();

/// Main Entry Point
///
/// Initialisiert Hardware, lädt die Settings aus dem Flash, stellt die
/// Engine wieder her, registriert die API-Routen und spawnt alle Tasks.
/// Danach schläft main() - alle Arbeit läuft in Tasks.
#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    // ESP32-C6 Konfiguration: CPU auf maximale Taktfrequenz (160 MHz)
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    // Heap: reclaimed RAM (64 KB) + extra (36 KB)
    esp_alloc::heap_allocator!(
        #[esp_hal::ram(reclaimed)]
        size: WIFI_HEAP_SIZE
    );
    esp_alloc::heap_allocator!(size: EXTRA_HEAP_SIZE);

    // Embassy Runtime initialisieren (Timer + Software Interrupt)
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    let sw_interrupt =
        esp_hal::interrupt::software::SoftwareInterruptControl::new(peripherals.SW_INTERRUPT);
    esp_rtos::start(timg0.timer0, sw_interrupt.software_interrupt0);

    // ------------------------------------------------------------------------
    // Settings + Engine
    // ------------------------------------------------------------------------

    let store = FlashSettingsStore::load(FlashStorage::new(peripherals.FLASH), SETTINGS_FLASH_OFFSET);

    let mut engine = EffectEngine::new();
    engine.restore(store.snapshot());

    static ENGINE: StaticCell<EngineMutex> = StaticCell::new();
    let engine = &*ENGINE.init(Mutex::new(RefCell::new(engine)));

    static SETTINGS: StaticCell<SettingsMutex> = StaticCell::new();
    let settings = &*SETTINGS.init(Mutex::new(RefCell::new(store)));

    static RENDER_SIGNAL: StaticCell<RenderSignal> = StaticCell::new();
    let render_signal = &*RENDER_SIGNAL.init(RenderSignal::new());

    // ------------------------------------------------------------------------
    // REST-API Routen
    // ------------------------------------------------------------------------

    static ROUTES: StaticCell<RouteTable> = StaticCell::new();
    let routes = ROUTES.init(RouteTable::new());
    match begin(Some(&mut *routes)) {
        Ok(count) => info!("API: {} routes bound", count),
        Err(e) => error!("API: route registration failed: {}", e),
    }
    let routes: &'static RouteTable = routes;

    // Render Task startet vor WiFi, damit der Strip sofort den gespeicherten Effekt zeigt
    spawner
        .spawn(led_render_task(
            peripherals.GPIO8,
            peripherals.RMT,
            engine,
            render_signal,
        ))
        .unwrap();

    // ------------------------------------------------------------------------
    // WiFi + Netzwerk
    // ------------------------------------------------------------------------

    static RADIO_INIT: StaticCell<esp_radio::Controller> = StaticCell::new();
    let radio_init =
        RADIO_INIT.init(esp_radio::init().expect("Failed to initialize Wi-Fi/BLE controller"));

    let (wifi_controller, wifi_interface) =
        esp_radio::wifi::new(radio_init, peripherals.WIFI, Default::default())
            .expect("Failed to initialize Wi-Fi");

    // Random seed für TCP/IP Stack (von Hardware RNG)
    let rng = Rng::new();
    let seed = (rng.random() as u64) << 32 | rng.random() as u64;

    // Sockets: ein TCP-Socket pro HTTP-Task + DHCP + DNS
    static RESOURCES: StaticCell<StackResources<8>> = StaticCell::new();
    let resources = RESOURCES.init(StackResources::new());

    let (stack, runner) = embassy_net::new(
        wifi_interface.sta,
        NetConfig::dhcpv4(Default::default()),
        resources,
        seed,
    );

    static STACK: StaticCell<Stack<'static>> = StaticCell::new();
    let stack = &*STACK.init(stack);

    spawner.spawn(connection_task(wifi_controller)).unwrap();
    spawner.spawn(net_task(runner)).unwrap();
    spawner.spawn(dhcp_task(stack)).unwrap();

    // ------------------------------------------------------------------------
    // HTTP Server
    // ------------------------------------------------------------------------

    let engine = SharedEngine::new(engine, render_signal);
    let settings = SharedSettings::new(settings);
    for task_id in 0..HTTP_TASK_POOL_SIZE {
        spawner
            .spawn(http_server_task(task_id, stack, routes, engine, settings))
            .unwrap();
    }

    // Main-Loop: schläft (alle Arbeit läuft in Tasks)
    loop {
        Timer::after(Duration::from_secs(3600)).await;
    }
}

// LED Render Task - Rendert die Effekt-Engine auf den LED-Strip
use defmt::{error, info};
use embassy_futures::select::{Either, select};
use embassy_time::{Duration, Instant, Timer};
use esp_hal_smartled::smart_led_buffer;
use rgb::RGB8;

use crate::config::{FRAME_INTERVAL_MS, LED_COUNT, RMT_CLOCK_MHZ};
use crate::hal::RmtLedWriter;
use crate::{EngineMutex, RenderSignal, SmartLedWriter};

/// Render-Schleife - ohne Hardware-Abhängigkeit
///
/// Pro Durchlauf:
/// - Engine kurz sperren und einen Frame rendern
/// - Frame auf den Strip schreiben (via Trait - Hardware oder Mock)
/// - Warten bis zum nächsten Frame oder bis eine Änderung signalisiert wird
///
/// # Parameter
/// - `led`: LED Writer
/// - `engine`: geteilte Effekt-Engine
/// - `changed`: Signal, das HTTP-Handler nach jeder Änderung auslösen
pub async fn render_logic<L: SmartLedWriter>(
    mut led: L,
    engine: &'static EngineMutex,
    changed: &'static RenderSignal,
) -> ! {
    let mut pixels = [RGB8::default(); LED_COUNT];
    let mut write_failed = false;

    loop {
        let now_ms = Instant::now().as_millis();
        engine.lock(|engine| engine.borrow().render(now_ms, &mut pixels));

        match led.write(&pixels) {
            Ok(()) => write_failed = false,
            // Nur den ersten Fehler einer Serie loggen
            Err(e) if !write_failed => {
                error!("Render: failed to write strip: {}", e);
                write_failed = true;
            }
            Err(_) => {}
        }

        match select(
            Timer::after(Duration::from_millis(FRAME_INTERVAL_MS)),
            changed.wait(),
        )
        .await
        {
            Either::First(()) => {}
            Either::Second(()) => info!("Render: state changed"),
        }
    }
}

/// LED Render Task - Embassy Task für parallele Ausführung
///
/// Übernimmt die Hardware-Initialisierung und ruft dann `render_logic()` auf.
///
/// # Parameter
/// - `gpio8`: GPIO8 Peripheral für die LED-Datenleitung
/// - `rmt_peripheral`: RMT Peripheral für präzises Timing
/// - `engine`: geteilte Effekt-Engine
/// - `changed`: Änderungs-Signal der HTTP-Handler
#[embassy_executor::task]
pub async fn led_render_task(
    gpio8: esp_hal::peripherals::GPIO8<'static>,
    rmt_peripheral: esp_hal::peripherals::RMT<'static>,
    engine: &'static EngineMutex,
    changed: &'static RenderSignal,
) {
    // Buffer für SmartLED Daten (LED_COUNT * 24 + 1 Pulse)
    let mut rmt_buffer = smart_led_buffer!(LED_COUNT);

    let led = match RmtLedWriter::new(gpio8, rmt_peripheral, RMT_CLOCK_MHZ, &mut rmt_buffer) {
        Ok(led) => led,
        Err(e) => {
            error!("Render: RMT init failed: {}", e);
            return;
        }
    };

    info!("Render: driving {} LEDs", LED_COUNT);
    render_logic(led, engine, changed).await
}

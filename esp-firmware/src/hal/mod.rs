// Hardware Abstraction Layer (HAL) Module
//
// Kapselt Hardware-Zugriffe hinter den Traits aus esp-core.

pub mod led_writer;

pub use led_writer::{LED_BUFFER_SIZE, RmtLedWriter};

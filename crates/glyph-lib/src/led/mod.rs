//! LED control — brightness level, device-file writes, brightness writer.

mod brightness;
mod writer;

pub mod mock;

pub use brightness::Brightness;
pub use writer::{
    LedError, LedWriter, SysfsLed, log_led_error, write_float, write_int, write_line,
    write_single_led,
};

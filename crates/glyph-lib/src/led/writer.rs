//! Device-file writes — single text value per write, no retries.

use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::Brightness;

/// LED device-file errors.
#[derive(Debug)]
pub enum LedError {
    /// The device node does not exist.
    NotFound(String),
    /// The node exists but the write failed.
    WriteFailed { path: String, source: io::Error },
}

impl fmt::Display for LedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedError::NotFound(path) => write!(f, "No such file {path} for writing"),
            LedError::WriteFailed { path, source } => {
                write!(f, "Could not write to file {path}: {source}")
            }
        }
    }
}

impl std::error::Error for LedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LedError::WriteFailed { source, .. } => Some(source),
            LedError::NotFound(_) => None,
        }
    }
}

/// Log an LED error at the level its kind deserves. Missing nodes are common
/// on devices without the hardware and only warrant a warning.
pub fn log_led_error(e: &LedError) {
    match e {
        LedError::NotFound(_) => log::warn!("{e}"),
        LedError::WriteFailed { .. } => log::error!("{e}"),
    }
}

/// Write `value` to an existing device file, replacing its contents.
///
/// The file is never created: device nodes are owned by the kernel.
pub fn write_line(path: &Path, value: &str) -> Result<(), LedError> {
    let display = path.display().to_string();
    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .truncate(true)
        .open(path)
        .map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => LedError::NotFound(display.clone()),
            _ => LedError::WriteFailed {
                path: display.clone(),
                source: e,
            },
        })?;
    file.write_all(value.as_bytes())
        .and_then(|()| file.flush())
        .map_err(|source| LedError::WriteFailed {
            path: display,
            source,
        })
}

pub fn write_int(path: &Path, value: i64) -> Result<(), LedError> {
    write_line(path, &value.to_string())
}

/// Floats always carry a fractional part (`1.0`, not `1`).
pub fn write_float(path: &Path, value: f32) -> Result<(), LedError> {
    write_line(path, &format!("{value:?}"))
}

/// Set a single LED through the `"<led-index> <value>"` line format.
pub fn write_single_led(path: &Path, led: u32, value: u32) -> Result<(), LedError> {
    write_line(path, &format!("{led} {value}"))
}

/// Sink for the brightness level applied during reconciliation.
pub trait LedWriter {
    fn set_brightness(&self, level: Brightness) -> Result<(), LedError>;
}

/// Sysfs-style LED device: brightness levels are mapped through a table of
/// hardware values and written as an integer to the brightness node.
#[derive(Debug, Clone)]
pub struct SysfsLed {
    brightness_path: PathBuf,
    single_led_path: PathBuf,
    levels: [u32; 4],
}

impl SysfsLed {
    pub fn new(brightness_path: PathBuf, single_led_path: PathBuf, levels: [u32; 4]) -> Self {
        Self {
            brightness_path,
            single_led_path,
            levels,
        }
    }

    /// Hardware value written for `level`.
    pub fn hardware_value(&self, level: Brightness) -> u32 {
        self.levels[level.index()]
    }

    /// Light one LED at the hardware value of `level`.
    pub fn light_single(&self, led: u32, level: Brightness) -> Result<(), LedError> {
        write_single_led(&self.single_led_path, led, self.hardware_value(level))
    }
}

impl LedWriter for SysfsLed {
    fn set_brightness(&self, level: Brightness) -> Result<(), LedError> {
        log::debug!(
            "brightness {level} -> {} ({})",
            self.hardware_value(level),
            self.brightness_path.display()
        );
        write_int(&self.brightness_path, self.hardware_value(level) as i64)
    }
}

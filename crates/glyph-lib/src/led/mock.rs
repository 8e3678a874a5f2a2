//! Recording LED writer for tests.

use std::cell::{Cell, RefCell};

use super::{Brightness, LedError, LedWriter};

/// Records every brightness write. Set `fail_not_found` to simulate a
/// device without the brightness node.
#[derive(Debug, Default)]
pub struct RecordingLed {
    pub writes: RefCell<Vec<Brightness>>,
    pub fail_not_found: Cell<bool>,
}

impl RecordingLed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Levels written so far, as plain integers.
    pub fn levels(&self) -> Vec<u8> {
        self.writes.borrow().iter().map(|b| b.get()).collect()
    }
}

impl LedWriter for RecordingLed {
    fn set_brightness(&self, level: Brightness) -> Result<(), LedError> {
        if self.fail_not_found.get() {
            return Err(LedError::NotFound("mock://brightness".into()));
        }
        self.writes.borrow_mut().push(level);
        Ok(())
    }
}

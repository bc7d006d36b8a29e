pub mod console;
pub mod keyboard;

use crate::EmulatorState;

use std::collections::VecDeque;
use std::sync::Mutex;

use log::error;

/// The machine's console character device.
pub trait Tty: Send + Sync {
    /// Unbuffered; each byte is visible to the host before the next
    /// instruction runs.
    fn write_byte(&self, val: u8);

    /// Non-blocking poll. Must never block the step loop.
    fn try_read_byte(&self) -> Option<u8>;

    /// Blocks until a byte is available.
    fn read_byte(&self) -> u8;
}

/// A device with read-intercepted registers. All device registers live
/// at or above `MMIO_START`; writes are never intercepted on this
/// machine.
pub trait MMIOHandler: Send {
    fn default_addrs(&self) -> &[u16];

    fn read(&mut self, state: &mut EmulatorState, addr: u16) -> u16;
}

////////////////////////////////////////////////////////////////////////////////

/// In-memory tty for tests: input is pushed ahead of time, output is
/// collected for inspection.
#[derive(Default)]
pub struct PipeTty {
    out_buf: Mutex<VecDeque<u8>>,
    in_buf: Mutex<VecDeque<u8>>,
}

impl PipeTty {
    pub fn take_output(&self) -> Vec<u8> {
        std::mem::take(&mut *self.out_buf.lock().unwrap()).into()
    }

    pub fn push_input(&self, val: u8) {
        self.in_buf.lock().unwrap().push_back(val);
    }

    pub fn write_input(&self, vals: &[u8]) {
        for val in vals.iter() {
            self.push_input(*val);
        }
    }
}

impl Tty for PipeTty {
    fn write_byte(&self, val: u8) {
        self.out_buf.lock().unwrap().push_back(val);
    }

    fn try_read_byte(&self) -> Option<u8> {
        self.in_buf.lock().unwrap().pop_front()
    }

    fn read_byte(&self) -> u8 {
        // Blocking on an empty pipe would deadlock a test; complain and
        // return NUL instead.
        let Some(val) = self.try_read_byte() else {
            error!("PipeTty: blocking read with no input queued");
            return 0;
        };
        val
    }
}

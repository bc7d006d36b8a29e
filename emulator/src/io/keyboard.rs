use std::sync::Arc;

use common::constants::{KBDR, KBSR};

use crate::EmulatorState;
use crate::io::{MMIOHandler, Tty};

/// The keyboard peripheral: a status register and a data register.
/// Polling happens on reads of the status register only; the data
/// register is a plain memory word that the poll fills in.
pub struct Keyboard {
    device: Arc<dyn Tty>,
}

impl Keyboard {
    pub const READY: u16 = 1 << 15;

    pub fn new(device: Arc<dyn Tty>) -> Keyboard {
        Keyboard { device }
    }
}

impl MMIOHandler for Keyboard {
    fn default_addrs(&self) -> &[u16] {
        &[KBSR]
    }

    fn read(&mut self, state: &mut EmulatorState, addr: u16) -> u16 {
        debug_assert_eq!(addr, KBSR);
        if let Some(ch) = self.device.try_read_byte() {
            state.mem_write(KBSR, Self::READY);
            state.mem_write(KBDR, ch as u16);
        } else {
            state.mem_write(KBSR, 0);
        }
        state.mem_read(addr)
    }
}

use std::collections::VecDeque;
use std::io::{self, Read, Write, stdout};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;

use crate::io::Tty;

use crossterm::terminal;
use log::error;

/// Byte queue shared with the reader thread. Closing the queue wakes
/// any blocked reader, so a trap waiting on input can't hang once the
/// input source is exhausted.
struct InputQueue {
    // Queued bytes plus a closed flag set at end of input.
    state: Mutex<(VecDeque<u8>, bool)>,
    available: Condvar,
}

impl InputQueue {
    fn new() -> InputQueue {
        InputQueue { state: Mutex::new((VecDeque::new(), false)), available: Condvar::new() }
    }

    fn push(&self, val: u8) {
        self.state.lock().unwrap().0.push_back(val);
        self.available.notify_one();
    }

    fn close(&self) {
        self.state.lock().unwrap().1 = true;
        self.available.notify_all();
    }

    fn try_pop(&self) -> Option<u8> {
        self.state.lock().unwrap().0.pop_front()
    }

    /// Blocks until a byte arrives; `None` once the queue is closed and
    /// drained.
    fn pop_blocking(&self) -> Option<u8> {
        let mut state = self.state.lock().unwrap();
        loop {
            if let Some(val) = state.0.pop_front() {
                return Some(val);
            }
            if state.1 {
                return None;
            }
            state = self.available.wait(state).unwrap();
        }
    }
}

/// The real host console. Output goes straight to stdout with a flush
/// per byte. Input comes from a background thread that drains raw
/// stdin into a queue, so the poll side never blocks.
pub struct Console {
    in_buf: Arc<InputQueue>,
}

impl Console {
    /// Returned by blocking reads after stdin hits end of input, so a
    /// program fed from a pipe terminates instead of hanging in a trap.
    pub const EOF_BYTE: u8 = 0xff;

    pub fn new() -> Console {
        let in_buf = Arc::new(InputQueue::new());

        let reader = in_buf.clone();
        thread::spawn(move || {
            let mut stdin = io::stdin().lock();
            let mut byte = [0u8; 1];
            while stdin.read_exact(&mut byte).is_ok() {
                reader.push(byte[0]);
            }
            reader.close();
        });

        Console { in_buf }
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

impl Tty for Console {
    fn write_byte(&self, val: u8) {
        let mut out = stdout().lock();
        if let Err(err) = out.write_all(&[val]).and_then(|()| out.flush()) {
            error!("Console: write failed: {err}");
        }
    }

    fn try_read_byte(&self) -> Option<u8> {
        self.in_buf.try_pop()
    }

    fn read_byte(&self) -> u8 {
        self.in_buf.pop_blocking().unwrap_or(Self::EOF_BYTE)
    }
}

/// Scoped raw (non-canonical, non-echoing) terminal mode. Restored on
/// drop, which covers every exit path out of the run loop.
pub struct RawModeGuard(());

impl RawModeGuard {
    pub fn acquire() -> io::Result<RawModeGuard> {
        terminal::enable_raw_mode()?;
        Ok(RawModeGuard(()))
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(err) = terminal::disable_raw_mode() {
            error!("Failed to restore terminal mode: {err}");
        }
    }
}

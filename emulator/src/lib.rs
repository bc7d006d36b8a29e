pub mod emulator;
pub mod emulator_state;
pub mod io;
mod traps;

pub use emulator::{Emulator, ExecRet, HaltHandle};
pub use emulator_state::{EmulatorState, Flags};
pub use io::MMIOHandler;

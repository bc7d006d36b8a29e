
use common::constants::PC_START;
use emu_lib::Emulator;
use emu_lib::io::console::{Console, RawModeGuard};

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use log::warn;

/// LC-3 emulator
#[derive(Parser)]
struct Args {
    /// Images to load, in order; later images overwrite earlier ones
    /// at overlapping addresses.
    #[arg(required = true)]
    images: Vec<String>,
}

fn main() -> ExitCode {
    env_logger::init();

    let args = Args::parse();

    let mut emu = Emulator::new(Arc::new(Console::new()));
    for path in &args.images {
        let obj = match obj::Obj::open(path) {
            Ok(obj) => obj,
            Err(err) => {
                eprintln!("Error: failed to load image {path}: {err}");
                return ExitCode::FAILURE;
            }
        };
        emu.load_obj(&obj);
    }

    // Raw mode can fail when stdin isn't a terminal (e.g. a pipe);
    // that's fine, the bytes arrive unbuffered either way.
    let guard = RawModeGuard::acquire();
    if let Err(err) = &guard {
        warn!("Could not enter raw terminal mode: {err}");
    }

    emu.run_at(PC_START);

    ExitCode::SUCCESS
}

//! The software trap services, keyed by the low byte of the TRAP
//! instruction. TRAP itself has no linkage semantics; R7 is untouched.

use common::asm::{Reg, TrapCode};

use crate::emulator::{Emulator, ExecRet};

use log::error;
use num_traits::FromPrimitive;

const IN_PROMPT: &[u8] = b"Enter a character: ";
const HALT_MSG: &[u8] = b"HALT\n";

pub(crate) fn dispatch(emu: &mut Emulator, code: u8) -> ExecRet {
    let Some(code) = TrapCode::from_u8(code) else {
        error!("Unknown trap code {code:#04x} at PC {:#06x}", emu.state().pc());
        return ExecRet::Halt;
    };

    match code {
        TrapCode::Getc => getc(emu),
        TrapCode::Out => out(emu),
        TrapCode::Puts => puts(emu),
        TrapCode::In => input(emu),
        TrapCode::Putsp => putsp(emu),
        TrapCode::Halt => return halt(emu),
    }

    ExecRet::Ok
}

fn write_all(emu: &Emulator, bytes: &[u8]) {
    for byte in bytes {
        emu.tty().write_byte(*byte);
    }
}

// Read one character into R0, no echo.
fn getc(emu: &mut Emulator) {
    let ch = emu.tty().read_byte();
    emu.state_mut().reg_write(Reg::R0, ch as u16);
    emu.state_mut().update_flags(Reg::R0);
}

fn out(emu: &mut Emulator) {
    let ch = emu.state().reg_read(Reg::R0) as u8;
    emu.tty().write_byte(ch);
}

// One character per word, truncated to its low byte, up to but not
// including the first zero word.
fn puts(emu: &mut Emulator) {
    let mut addr = emu.state().reg_read(Reg::R0);
    loop {
        let word = emu.state().mem_read(addr);
        if word == 0 {
            break;
        }
        emu.tty().write_byte(word as u8);
        addr = addr.wrapping_add(1);
    }
}

// Prompt, read one character, echo it, store it in R0.
fn input(emu: &mut Emulator) {
    write_all(emu, IN_PROMPT);
    let ch = emu.tty().read_byte();
    emu.tty().write_byte(ch);
    emu.state_mut().reg_write(Reg::R0, ch as u16);
    emu.state_mut().update_flags(Reg::R0);
}

// Two packed characters per word, low byte first; the high byte is
// skipped when zero (odd-length strings end in a word with a zero high
// byte).
fn putsp(emu: &mut Emulator) {
    let mut addr = emu.state().reg_read(Reg::R0);
    loop {
        let word = emu.state().mem_read(addr);
        if word == 0 {
            break;
        }
        emu.tty().write_byte(word as u8);
        let high = (word >> u8::BITS) as u8;
        if high != 0 {
            emu.tty().write_byte(high);
        }
        addr = addr.wrapping_add(1);
    }
}

fn halt(emu: &mut Emulator) -> ExecRet {
    write_all(emu, HALT_MSG);
    ExecRet::Halt
}

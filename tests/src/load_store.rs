use crate::util::*;

use common::asm::*;
use common::constants::PC_START;
use obj::Obj;

#[test]
fn ld_and_st() {
    let m = run_words(vec![
        Ins::ld(Reg::R0, 3).encode(),  // reads PC_START+4
        Ins::st(Reg::R0, 3).encode(),  // writes PC_START+5
        Ins::trap(TrapCode::Halt).encode(),
        0,
        0xbeef, // data read by ld
        0,      // data written by st
    ]);
    assert_eq!(m.emu.state().reg_read(Reg::R0), 0xbeef);
    assert_eq!(m.emu.state().mem_read(PC_START + 5), 0xbeef);
}

#[test]
fn ld_offset_extremes() {
    let mut m = machine_with(vec![
        Ins::ld(Reg::R0, 255).encode(),  // PC_START+1+255
        Ins::ld(Reg::R1, -256).encode(), // PC_START+2-256
        Ins::trap(TrapCode::Halt).encode(),
    ]);
    m.emu.load_obj(&Obj { origin: PC_START + 1 + 255, words: vec![0x1111] });
    m.emu.load_obj(&Obj { origin: PC_START + 2 - 256, words: vec![0x2222] });
    m.emu.run();
    assert_eq!(m.emu.state().reg_read(Reg::R0), 0x1111);
    assert_eq!(m.emu.state().reg_read(Reg::R1), 0x2222);
}

#[test]
fn st_offset_extremes() {
    let mut m = machine_with(vec![
        Ins::st(Reg::R0, 255).encode(),
        Ins::st(Reg::R0, -256).encode(),
        Ins::trap(TrapCode::Halt).encode(),
    ]);
    m.emu.state_mut().reg_write(Reg::R0, 0xcafe);
    m.emu.run();
    assert_eq!(m.emu.state().mem_read(PC_START + 1 + 255), 0xcafe);
    assert_eq!(m.emu.state().mem_read(PC_START + 2 - 256), 0xcafe);
}

#[test]
fn ldi_and_sti_indirect() {
    let mut m = machine_with(vec![
        Ins::ldi(Reg::R0, 3).encode(), // pointer at PC_START+4
        Ins::sti(Reg::R0, 3).encode(), // pointer at PC_START+5
        Ins::trap(TrapCode::Halt).encode(),
        0,
        0x4000, // -> data
        0x4001, // -> destination
    ]);
    m.emu.state_mut().mem_write(0x4000, 0x5555);
    m.emu.run();
    assert_eq!(m.emu.state().reg_read(Reg::R0), 0x5555);
    assert_eq!(m.emu.state().mem_read(0x4001), 0x5555);
}

#[test]
fn ldr_and_str_base_offset() {
    let mut m = machine_with(vec![
        Ins::ldr(Reg::R0, Reg::R6, 31).encode(),
        Ins::str(Reg::R0, Reg::R6, -32).encode(),
        Ins::trap(TrapCode::Halt).encode(),
    ]);
    m.emu.state_mut().reg_write(Reg::R6, 0x4000);
    m.emu.state_mut().mem_write(0x4000 + 31, 0x7777);
    m.emu.run();
    assert_eq!(m.emu.state().reg_read(Reg::R0), 0x7777);
    assert_eq!(m.emu.state().mem_read(0x4000 - 32), 0x7777);
}

#[test]
fn lea_computes_address_without_deref() {
    let m = run_words(vec![
        Ins::lea(Reg::R0, 2).encode(),
        Ins::trap(TrapCode::Halt).encode(),
    ]);
    assert_eq!(m.emu.state().reg_read(Reg::R0), PC_START + 1 + 2);
    assert!(m.emu.state().flags().is_pos());
}

#[test]
fn stores_leave_flags_alone() {
    let mut m = machine_with(vec![
        Ins::add(Reg::R0, Reg::R0, Src2::Imm(-1i16 as u16)).encode(), // flags NEG
        Ins::st(Reg::R0, 10).encode(),
        Ins::str(Reg::R0, Reg::R6, 0).encode(),
        Ins::trap(TrapCode::Halt).encode(),
    ]);
    m.emu.state_mut().reg_write(Reg::R6, 0x4000);
    m.emu.run();
    assert!(m.emu.state().flags().is_neg());
}

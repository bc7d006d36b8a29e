use crate::util::*;

use common::asm::*;

#[test]
fn add_reg() {
    let mut m = machine_with(vec![
        Ins::add(Reg::R2, Reg::R0, Src2::Reg(Reg::R1)).encode(),
        Ins::trap(TrapCode::Halt).encode(),
    ]);
    m.emu.state_mut().reg_write(Reg::R0, 5);
    m.emu.state_mut().reg_write(Reg::R1, 7);
    m.emu.run();
    assert_eq!(m.emu.state().reg_read(Reg::R2), 12);
    assert!(m.emu.state().flags().is_pos());
}

#[test]
fn add_imm_all_ones_is_minus_one() {
    // imm5 = 0b11111 added to 0 gives 0xffff.
    let m = run_words(vec![
        Ins::add(Reg::R1, Reg::R0, Src2::Imm(0b11111)).encode(),
        Ins::trap(TrapCode::Halt).encode(),
    ]);
    assert_eq!(m.emu.state().reg_read(Reg::R1), 0xffff);
    assert!(m.emu.state().flags().is_neg());
}

#[test]
fn add_wraps() {
    let mut m = machine_with(vec![
        Ins::add(Reg::R0, Reg::R0, Src2::Imm(1)).encode(),
        Ins::trap(TrapCode::Halt).encode(),
    ]);
    m.emu.state_mut().reg_write(Reg::R0, 0x7fff);
    m.emu.run();
    assert_eq!(m.emu.state().reg_read(Reg::R0), 0x8000);
    assert!(m.emu.state().flags().is_neg());

    let mut m = machine_with(vec![
        Ins::add(Reg::R0, Reg::R0, Src2::Imm(1)).encode(),
        Ins::trap(TrapCode::Halt).encode(),
    ]);
    m.emu.state_mut().reg_write(Reg::R0, 0xffff);
    m.emu.run();
    assert_eq!(m.emu.state().reg_read(Reg::R0), 0);
    assert!(m.emu.state().flags().is_zro());
}

// Immediate mode must agree with register mode for every value an imm5
// can hold.
#[test]
fn imm_and_reg_modes_agree() {
    for imm in -16i16..=15 {
        for lhs in [0u16, 1, 0x7fff, 0x8000, 0xffff, 0x1234] {
            let mut reg_mode = machine_with(vec![
                Ins::add(Reg::R2, Reg::R0, Src2::Reg(Reg::R1)).encode(),
                Ins::and(Reg::R3, Reg::R0, Src2::Reg(Reg::R1)).encode(),
                Ins::trap(TrapCode::Halt).encode(),
            ]);
            reg_mode.emu.state_mut().reg_write(Reg::R0, lhs);
            reg_mode.emu.state_mut().reg_write(Reg::R1, imm as u16);
            reg_mode.emu.run();

            let mut imm_mode = machine_with(vec![
                Ins::add(Reg::R2, Reg::R0, Src2::Imm(imm as u16)).encode(),
                Ins::and(Reg::R3, Reg::R0, Src2::Imm(imm as u16)).encode(),
                Ins::trap(TrapCode::Halt).encode(),
            ]);
            imm_mode.emu.state_mut().reg_write(Reg::R0, lhs);
            imm_mode.emu.run();

            assert_eq!(
                reg_mode.emu.state().reg_read(Reg::R2),
                imm_mode.emu.state().reg_read(Reg::R2),
                "add {lhs:#06x} + {imm}"
            );
            assert_eq!(
                reg_mode.emu.state().reg_read(Reg::R3),
                imm_mode.emu.state().reg_read(Reg::R3),
                "and {lhs:#06x} & {imm}"
            );
        }
    }
}

#[test]
fn and_imm_zero_clears() {
    let mut m = machine_with(vec![
        Ins::and(Reg::R0, Reg::R0, Src2::Imm(0)).encode(),
        Ins::trap(TrapCode::Halt).encode(),
    ]);
    m.emu.state_mut().reg_write(Reg::R0, 0xabcd);
    m.emu.run();
    assert_eq!(m.emu.state().reg_read(Reg::R0), 0);
    assert!(m.emu.state().flags().is_zro());
}

#[test]
fn not_complements() {
    let mut m = machine_with(vec![
        Ins::not(Reg::R1, Reg::R0).encode(),
        Ins::trap(TrapCode::Halt).encode(),
    ]);
    m.emu.state_mut().reg_write(Reg::R0, 0x00ff);
    m.emu.run();
    assert_eq!(m.emu.state().reg_read(Reg::R1), 0xff00);
    assert!(m.emu.state().flags().is_neg());
}

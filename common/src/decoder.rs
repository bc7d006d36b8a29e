
use num_traits::FromPrimitive;

use crate::asm::*;
use crate::misc::sign_extend;

fn reg(word: u16, shift: u16) -> Reg {
    Reg::from_u16((word >> shift) & Reg::MASK).unwrap()
}

fn decode_alu(op: AluOpcode, word: u16) -> Ins {
    let src2 = if word & AluIns::IMM_FLAG != 0 {
        Src2::Imm(sign_extend(word & AluIns::IMM_MASK, AluIns::IMM_BITS))
    } else {
        Src2::Reg(reg(word, 0))
    };
    Ins::Alu(AluIns { op, dr: reg(word, DST_SHIFT), sr1: reg(word, SRC_SHIFT), src2 })
}

fn decode_jsr(word: u16) -> Ins {
    let target = if word & JsrIns::LONG_FLAG != 0 {
        JsrTarget::Offset(sign_extend(word & JsrIns::OFFSET_MASK, JsrIns::OFFSET_BITS))
    } else {
        JsrTarget::Reg(reg(word, SRC_SHIFT))
    };
    Ins::Jsr(JsrIns { target })
}

fn decode_load(op: LoadOpcode, word: u16) -> Ins {
    Ins::Load(LoadIns {
        op,
        dr: reg(word, DST_SHIFT),
        offset: sign_extend(word & LoadIns::OFFSET_MASK, LoadIns::OFFSET_BITS),
    })
}

fn decode_store(op: StoreOpcode, word: u16) -> Ins {
    Ins::Store(StoreIns {
        op,
        sr: reg(word, DST_SHIFT),
        offset: sign_extend(word & StoreIns::OFFSET_MASK, StoreIns::OFFSET_BITS),
    })
}

/// Decode one instruction word. `None` means the opcode has no defined
/// behavior on this machine (RTI and the reserved slot); the executor
/// treats that as a halt condition, not a crash.
pub fn decode(word: u16) -> Option<Ins> {
    let ins = match Opcode::of(word) {
        Opcode::Add => decode_alu(AluOpcode::Add, word),
        Opcode::And => decode_alu(AluOpcode::And, word),
        Opcode::Not => Ins::Not(NotIns { dr: reg(word, DST_SHIFT), sr: reg(word, SRC_SHIFT) }),
        Opcode::Br => Ins::Branch(BranchIns {
            mask: (word >> DST_SHIFT) & BranchIns::MASK_MASK,
            offset: sign_extend(word & BranchIns::OFFSET_MASK, BranchIns::OFFSET_BITS),
        }),
        Opcode::Jmp => Ins::Jmp(JmpIns { base: reg(word, SRC_SHIFT) }),
        Opcode::Jsr => decode_jsr(word),
        Opcode::Ld => decode_load(LoadOpcode::Ld, word),
        Opcode::Ldi => decode_load(LoadOpcode::Ldi, word),
        Opcode::Lea => decode_load(LoadOpcode::Lea, word),
        Opcode::St => decode_store(StoreOpcode::St, word),
        Opcode::Sti => decode_store(StoreOpcode::Sti, word),
        Opcode::Ldr => Ins::LoadReg(LdrIns {
            dr: reg(word, DST_SHIFT),
            base: reg(word, SRC_SHIFT),
            offset: sign_extend(word & LdrIns::OFFSET_MASK, LdrIns::OFFSET_BITS),
        }),
        Opcode::Str => Ins::StoreReg(StrIns {
            sr: reg(word, DST_SHIFT),
            base: reg(word, SRC_SHIFT),
            offset: sign_extend(word & StrIns::OFFSET_MASK, StrIns::OFFSET_BITS),
        }),
        Opcode::Trap => Ins::Trap(TrapIns { code: (word & TrapIns::CODE_MASK) as u8 }),
        Opcode::Rti | Opcode::Res => return None,
    };
    Some(ins)
}


use std::fmt;

use derive_more::IsVariant;
use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::{FromPrimitive, ToPrimitive};

pub const NUM_REGS: usize = 8;

// Destination/source register fields shared by most layouts.
pub const DST_SHIFT: u16 = 9;
pub const SRC_SHIFT: u16 = 6;

// Condition-flag bits; the BR mask uses the same layout.
pub const FL_POS: u16 = 1 << 0;
pub const FL_ZRO: u16 = 1 << 1;
pub const FL_NEG: u16 = 1 << 2;

#[derive(Debug, Clone, Copy, FromPrimitive, ToPrimitive, PartialEq, Eq)]
pub enum Reg {
    R0 = 0,
    R1,
    R2,
    R3,
    R4,
    R5,
    R6,
    R7,
}

impl Reg {
    pub const NUM_BITS: u16 = 3;
    pub const MASK: u16 = (1u16 << Self::NUM_BITS) - 1;
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", format!("{self:?}").to_lowercase())
    }
}

/// The 4-bit instruction class in bits 15-12. All sixteen values are
/// representable; Rti and Res have no defined behavior on this machine.
#[derive(Debug, Clone, Copy, FromPrimitive, ToPrimitive, PartialEq, Eq)]
pub enum Opcode {
    Br = 0,
    Add,
    Ld,
    St,
    Jsr,
    And,
    Ldr,
    Str,
    Rti,
    Not,
    Ldi,
    Sti,
    Jmp,
    Res,
    Lea,
    Trap,
}

impl Opcode {
    pub const NUM_BITS: u16 = 4;
    pub const SHIFT: u16 = (u16::BITS as u16) - Self::NUM_BITS;

    pub fn of(word: u16) -> Opcode {
        // The field is exactly 4 bits, so every value maps to a variant.
        Opcode::from_u16(word >> Self::SHIFT).unwrap()
    }

    fn encode_with(self, fields: u16) -> u16 {
        debug_assert_eq!(fields >> Self::SHIFT, 0);
        (self.to_u16().unwrap() << Self::SHIFT) | fields
    }
}

////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOpcode {
    Add,
    And,
}

impl AluOpcode {
    fn opcode(self) -> Opcode {
        match self {
            AluOpcode::Add => Opcode::Add,
            AluOpcode::And => Opcode::And,
        }
    }

    fn mnemonic(self) -> &'static str {
        match self {
            AluOpcode::Add => "add",
            AluOpcode::And => "and",
        }
    }
}

#[derive(Debug, Clone, Copy, IsVariant)]
pub enum Src2 {
    Reg(Reg),
    /// Already sign-extended from 5 bits.
    Imm(u16),
}

#[derive(Debug, Clone, Copy)]
pub struct AluIns {
    pub op: AluOpcode,
    pub dr: Reg,
    pub sr1: Reg,
    pub src2: Src2,
}

impl AluIns {
    pub const IMM_FLAG: u16 = 1 << 5;
    pub const IMM_BITS: u16 = 5;
    pub const IMM_MASK: u16 = (1 << Self::IMM_BITS) - 1;

    pub fn encode(&self) -> u16 {
        let fields = (self.dr.to_u16().unwrap() << DST_SHIFT)
            | (self.sr1.to_u16().unwrap() << SRC_SHIFT);
        let fields = match self.src2 {
            Src2::Reg(r) => fields | r.to_u16().unwrap(),
            Src2::Imm(imm) => fields | Self::IMM_FLAG | (imm & Self::IMM_MASK),
        };
        self.op.opcode().encode_with(fields)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NotIns {
    pub dr: Reg,
    pub sr: Reg,
}

impl NotIns {
    // Bits 5-0 are all ones in the canonical encoding.
    const ONES: u16 = 0x3f;

    pub fn encode(&self) -> u16 {
        Opcode::Not.encode_with(
            (self.dr.to_u16().unwrap() << DST_SHIFT)
                | (self.sr.to_u16().unwrap() << SRC_SHIFT)
                | Self::ONES,
        )
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BranchIns {
    /// n/z/p bits, same layout as the condition-flag register.
    pub mask: u16,
    /// Already sign-extended from 9 bits.
    pub offset: u16,
}

impl BranchIns {
    pub const MASK_BITS: u16 = 3;
    pub const MASK_MASK: u16 = (1 << Self::MASK_BITS) - 1;
    pub const OFFSET_BITS: u16 = 9;
    pub const OFFSET_MASK: u16 = (1 << Self::OFFSET_BITS) - 1;

    pub fn encode(&self) -> u16 {
        Opcode::Br.encode_with(
            ((self.mask & Self::MASK_MASK) << DST_SHIFT) | (self.offset & Self::OFFSET_MASK),
        )
    }
}

#[derive(Debug, Clone, Copy)]
pub struct JmpIns {
    pub base: Reg,
}

impl JmpIns {
    pub fn encode(&self) -> u16 {
        Opcode::Jmp.encode_with(self.base.to_u16().unwrap() << SRC_SHIFT)
    }
}

#[derive(Debug, Clone, Copy, IsVariant)]
pub enum JsrTarget {
    /// Already sign-extended from 11 bits.
    Offset(u16),
    Reg(Reg),
}

#[derive(Debug, Clone, Copy)]
pub struct JsrIns {
    pub target: JsrTarget,
}

impl JsrIns {
    pub const LONG_FLAG: u16 = 1 << 11;
    pub const OFFSET_BITS: u16 = 11;
    pub const OFFSET_MASK: u16 = (1 << Self::OFFSET_BITS) - 1;

    pub fn encode(&self) -> u16 {
        let fields = match self.target {
            JsrTarget::Offset(off) => Self::LONG_FLAG | (off & Self::OFFSET_MASK),
            JsrTarget::Reg(r) => r.to_u16().unwrap() << SRC_SHIFT,
        };
        Opcode::Jsr.encode_with(fields)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOpcode {
    Ld,
    Ldi,
    Lea,
}

impl LoadOpcode {
    fn opcode(self) -> Opcode {
        match self {
            LoadOpcode::Ld => Opcode::Ld,
            LoadOpcode::Ldi => Opcode::Ldi,
            LoadOpcode::Lea => Opcode::Lea,
        }
    }

    fn mnemonic(self) -> &'static str {
        match self {
            LoadOpcode::Ld => "ld",
            LoadOpcode::Ldi => "ldi",
            LoadOpcode::Lea => "lea",
        }
    }
}

/// PC-relative loads: LD, LDI, and LEA (which computes the address but
/// doesn't dereference it).
#[derive(Debug, Clone, Copy)]
pub struct LoadIns {
    pub op: LoadOpcode,
    pub dr: Reg,
    /// Already sign-extended from 9 bits.
    pub offset: u16,
}

impl LoadIns {
    pub const OFFSET_BITS: u16 = 9;
    pub const OFFSET_MASK: u16 = (1 << Self::OFFSET_BITS) - 1;

    pub fn encode(&self) -> u16 {
        self.op.opcode().encode_with(
            (self.dr.to_u16().unwrap() << DST_SHIFT) | (self.offset & Self::OFFSET_MASK),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOpcode {
    St,
    Sti,
}

impl StoreOpcode {
    fn opcode(self) -> Opcode {
        match self {
            StoreOpcode::St => Opcode::St,
            StoreOpcode::Sti => Opcode::Sti,
        }
    }

    fn mnemonic(self) -> &'static str {
        match self {
            StoreOpcode::St => "st",
            StoreOpcode::Sti => "sti",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StoreIns {
    pub op: StoreOpcode,
    pub sr: Reg,
    /// Already sign-extended from 9 bits.
    pub offset: u16,
}

impl StoreIns {
    pub const OFFSET_BITS: u16 = 9;
    pub const OFFSET_MASK: u16 = (1 << Self::OFFSET_BITS) - 1;

    pub fn encode(&self) -> u16 {
        self.op.opcode().encode_with(
            (self.sr.to_u16().unwrap() << DST_SHIFT) | (self.offset & Self::OFFSET_MASK),
        )
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LdrIns {
    pub dr: Reg,
    pub base: Reg,
    /// Already sign-extended from 6 bits.
    pub offset: u16,
}

impl LdrIns {
    pub const OFFSET_BITS: u16 = 6;
    pub const OFFSET_MASK: u16 = (1 << Self::OFFSET_BITS) - 1;

    pub fn encode(&self) -> u16 {
        Opcode::Ldr.encode_with(
            (self.dr.to_u16().unwrap() << DST_SHIFT)
                | (self.base.to_u16().unwrap() << SRC_SHIFT)
                | (self.offset & Self::OFFSET_MASK),
        )
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StrIns {
    pub sr: Reg,
    pub base: Reg,
    /// Already sign-extended from 6 bits.
    pub offset: u16,
}

impl StrIns {
    pub const OFFSET_BITS: u16 = 6;
    pub const OFFSET_MASK: u16 = (1 << Self::OFFSET_BITS) - 1;

    pub fn encode(&self) -> u16 {
        Opcode::Str.encode_with(
            (self.sr.to_u16().unwrap() << DST_SHIFT)
                | (self.base.to_u16().unwrap() << SRC_SHIFT)
                | (self.offset & Self::OFFSET_MASK),
        )
    }
}

/// Trap service codes. Any other low byte halts the machine, like an
/// illegal opcode.
#[derive(Debug, Clone, Copy, FromPrimitive, ToPrimitive, PartialEq, Eq)]
pub enum TrapCode {
    Getc = 0x20,
    Out,
    Puts,
    In,
    Putsp,
    Halt,
}

#[derive(Debug, Clone, Copy)]
pub struct TrapIns {
    pub code: u8,
}

impl TrapIns {
    pub const CODE_MASK: u16 = 0xff;

    pub fn encode(&self) -> u16 {
        Opcode::Trap.encode_with(self.code as u16)
    }
}

////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, Copy)]
pub enum Ins {
    Alu(AluIns),
    Not(NotIns),
    Branch(BranchIns),
    Jmp(JmpIns),
    Jsr(JsrIns),
    Load(LoadIns),
    Store(StoreIns),
    LoadReg(LdrIns),
    StoreReg(StrIns),
    Trap(TrapIns),
}

impl Ins {
    pub fn encode(&self) -> u16 {
        match self {
            Ins::Alu(ins) => ins.encode(),
            Ins::Not(ins) => ins.encode(),
            Ins::Branch(ins) => ins.encode(),
            Ins::Jmp(ins) => ins.encode(),
            Ins::Jsr(ins) => ins.encode(),
            Ins::Load(ins) => ins.encode(),
            Ins::Store(ins) => ins.encode(),
            Ins::LoadReg(ins) => ins.encode(),
            Ins::StoreReg(ins) => ins.encode(),
            Ins::Trap(ins) => ins.encode(),
        }
    }

    // Shorthand constructors, mostly for tests and generated programs.
    // Offsets are taken as signed words and truncated to their field
    // width at encode time.

    pub fn add(dr: Reg, sr1: Reg, src2: Src2) -> Ins {
        Ins::Alu(AluIns { op: AluOpcode::Add, dr, sr1, src2 })
    }

    pub fn and(dr: Reg, sr1: Reg, src2: Src2) -> Ins {
        Ins::Alu(AluIns { op: AluOpcode::And, dr, sr1, src2 })
    }

    pub fn not(dr: Reg, sr: Reg) -> Ins {
        Ins::Not(NotIns { dr, sr })
    }

    pub fn br(mask: u16, offset: i16) -> Ins {
        Ins::Branch(BranchIns { mask, offset: offset as u16 })
    }

    pub fn jmp(base: Reg) -> Ins {
        Ins::Jmp(JmpIns { base })
    }

    pub fn ret() -> Ins {
        Ins::jmp(Reg::R7)
    }

    pub fn jsr(offset: i16) -> Ins {
        Ins::Jsr(JsrIns { target: JsrTarget::Offset(offset as u16) })
    }

    pub fn jsrr(base: Reg) -> Ins {
        Ins::Jsr(JsrIns { target: JsrTarget::Reg(base) })
    }

    pub fn ld(dr: Reg, offset: i16) -> Ins {
        Ins::Load(LoadIns { op: LoadOpcode::Ld, dr, offset: offset as u16 })
    }

    pub fn ldi(dr: Reg, offset: i16) -> Ins {
        Ins::Load(LoadIns { op: LoadOpcode::Ldi, dr, offset: offset as u16 })
    }

    pub fn lea(dr: Reg, offset: i16) -> Ins {
        Ins::Load(LoadIns { op: LoadOpcode::Lea, dr, offset: offset as u16 })
    }

    pub fn st(sr: Reg, offset: i16) -> Ins {
        Ins::Store(StoreIns { op: StoreOpcode::St, sr, offset: offset as u16 })
    }

    pub fn sti(sr: Reg, offset: i16) -> Ins {
        Ins::Store(StoreIns { op: StoreOpcode::Sti, sr, offset: offset as u16 })
    }

    pub fn ldr(dr: Reg, base: Reg, offset: i16) -> Ins {
        Ins::LoadReg(LdrIns { dr, base, offset: offset as u16 })
    }

    pub fn str(sr: Reg, base: Reg, offset: i16) -> Ins {
        Ins::StoreReg(StrIns { sr, base, offset: offset as u16 })
    }

    pub fn trap(code: TrapCode) -> Ins {
        Ins::Trap(TrapIns { code: code.to_u8().unwrap() })
    }

    pub fn trap_raw(code: u8) -> Ins {
        Ins::Trap(TrapIns { code })
    }
}

impl fmt::Display for Ins {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Ins::Alu(ins) => {
                write!(f, "{} {}, {}", ins.op.mnemonic(), ins.dr, ins.sr1)?;
                match ins.src2 {
                    Src2::Reg(r) => write!(f, ", {r}"),
                    Src2::Imm(imm) => write!(f, ", #{}", imm as i16),
                }
            }
            Ins::Not(ins) => write!(f, "not {}, {}", ins.dr, ins.sr),
            Ins::Branch(ins) => {
                write!(f, "br")?;
                if ins.mask & FL_NEG != 0 {
                    write!(f, "n")?;
                }
                if ins.mask & FL_ZRO != 0 {
                    write!(f, "z")?;
                }
                if ins.mask & FL_POS != 0 {
                    write!(f, "p")?;
                }
                write!(f, " #{}", ins.offset as i16)
            }
            Ins::Jmp(ins) if ins.base == Reg::R7 => write!(f, "ret"),
            Ins::Jmp(ins) => write!(f, "jmp {}", ins.base),
            Ins::Jsr(ins) => match ins.target {
                JsrTarget::Offset(off) => write!(f, "jsr #{}", off as i16),
                JsrTarget::Reg(r) => write!(f, "jsrr {r}"),
            },
            Ins::Load(ins) => {
                write!(f, "{} {}, #{}", ins.op.mnemonic(), ins.dr, ins.offset as i16)
            }
            Ins::Store(ins) => {
                write!(f, "{} {}, #{}", ins.op.mnemonic(), ins.sr, ins.offset as i16)
            }
            Ins::LoadReg(ins) => {
                write!(f, "ldr {}, {}, #{}", ins.dr, ins.base, ins.offset as i16)
            }
            Ins::StoreReg(ins) => {
                write!(f, "str {}, {}, #{}", ins.sr, ins.base, ins.offset as i16)
            }
            Ins::Trap(ins) => match TrapCode::from_u8(ins.code) {
                Some(code) => write!(f, "{}", format!("{code:?}").to_lowercase()),
                None => write!(f, "trap {:#04x}", ins.code),
            },
        }
    }
}

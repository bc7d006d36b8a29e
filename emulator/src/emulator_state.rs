use common::asm::{FL_NEG, FL_POS, FL_ZRO, NUM_REGS, Reg};
use common::constants::{MEM_SIZE, PC_START};

use log::trace;
use num_traits::ToPrimitive;

/// Condition flags. Exactly one of POS/ZRO/NEG is set after any
/// flag-defining instruction. At reset the register holds no flag at
/// all, so a branch executed before the first flag-defining instruction
/// is never taken.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flags(u16);

impl Flags {
    pub fn from_value(val: u16) -> Flags {
        if val == 0 {
            Flags(FL_ZRO)
        } else if val >> 15 != 0 {
            Flags(FL_NEG)
        } else {
            Flags(FL_POS)
        }
    }

    pub fn to_raw(self) -> u16 {
        self.0
    }

    /// True iff the branch mask names the currently-set flag.
    pub fn matches(self, mask: u16) -> bool {
        self.0 & mask != 0
    }

    pub fn is_pos(self) -> bool {
        self.0 == FL_POS
    }

    pub fn is_zro(self) -> bool {
        self.0 == FL_ZRO
    }

    pub fn is_neg(self) -> bool {
        self.0 == FL_NEG
    }
}

// This is separate from the Emulator so a mutable borrow can be passed
// to the MMIO handlers.
pub struct EmulatorState {
    mem: Vec<u16>,
    regs: [u16; NUM_REGS],
    pc: u16,
    flags: Flags,
}

impl EmulatorState {
    pub fn new() -> Self {
        EmulatorState {
            mem: vec![0; MEM_SIZE],
            regs: [0; NUM_REGS],
            pc: PC_START,
            flags: Flags::default(),
        }
    }

    /// Plain array access; MMIO interception lives a level up, in
    /// `Emulator::mem_read`.
    pub fn mem_read(&self, addr: u16) -> u16 {
        self.mem[addr as usize]
    }

    pub fn mem_write(&mut self, addr: u16, val: u16) {
        trace!("Mem: writing {val:#06x} to {addr:#06x}");
        self.mem[addr as usize] = val;
    }

    pub fn reg_read(&self, reg: Reg) -> u16 {
        self.regs[reg.to_usize().unwrap()]
    }

    pub fn reg_write(&mut self, reg: Reg, val: u16) {
        trace!("Reg: writing {val:#06x} to {reg}");
        self.regs[reg.to_usize().unwrap()] = val;
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn set_pc(&mut self, pc: u16) {
        self.pc = pc;
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub fn update_flags(&mut self, reg: Reg) {
        self.flags = Flags::from_value(self.reg_read(reg));
        trace!("Flags: {:#05b} from {reg}", self.flags.to_raw());
    }
}

impl Default for EmulatorState {
    fn default() -> Self {
        Self::new()
    }
}

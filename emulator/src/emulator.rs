
use common::asm::*;
use common::constants::MMIO_START;
use common::decoder::decode;

use crate::EmulatorState;
use crate::io::console::Console;
use crate::io::keyboard::Keyboard;
use crate::io::{MMIOHandler, Tty};
use crate::traps;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use log::{debug, error};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecRet {
    Ok,
    Halt,
}

/// Requests a stop from outside the step loop (e.g. a host signal
/// handler). Honored at the next instruction boundary.
#[derive(Clone)]
pub struct HaltHandle(Arc<AtomicBool>);

impl HaltHandle {
    pub fn request_halt(&self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

pub struct Emulator {
    state: EmulatorState,
    mmio_handlers: HashMap<u16, Arc<Mutex<dyn MMIOHandler>>>,
    tty: Arc<dyn Tty>,
    halt_requested: Arc<AtomicBool>,
}

impl Emulator {
    pub fn new(tty: Arc<dyn Tty>) -> Emulator {
        let mut emu = Emulator {
            state: EmulatorState::new(),
            mmio_handlers: HashMap::new(),
            tty: tty.clone(),
            halt_requested: Arc::new(AtomicBool::new(false)),
        };
        emu.set_mmio_handler(Keyboard::new(tty));
        emu
    }

    // Run until a halt.
    pub fn run(&mut self) {
        loop {
            if self.halt_requested.load(Ordering::Relaxed) {
                debug!("Halt requested externally at PC {:#06x}", self.state.pc());
                break;
            }
            if self.step() == ExecRet::Halt {
                break;
            }
        }
    }

    pub fn run_at(&mut self, pc: u16) {
        self.state.set_pc(pc);
        self.run();
    }

    // Run a single fetch-decode-execute step.
    pub fn step(&mut self) -> ExecRet {
        let pc = self.state.pc();
        let word = self.mem_read(pc);
        self.state.set_pc(pc.wrapping_add(1));

        let Some(ins) = decode(word) else {
            error!("Bad opcode {} at PC {pc:#06x}", word >> Opcode::SHIFT);
            return ExecRet::Halt;
        };
        debug!("PC {pc:#06x}: {ins}");

        self.exec(&ins)
    }

    pub fn halt_handle(&self) -> HaltHandle {
        HaltHandle(self.halt_requested.clone())
    }

    /// Place an image's words into memory starting at its origin. A
    /// later image overwrites an earlier one at overlapping addresses.
    pub fn load_obj(&mut self, obj: &obj::Obj) {
        // wrapping_add so an image ending exactly at 0xffff loads; the
        // parser already rejects images that would actually wrap.
        for (i, word) in obj.words.iter().enumerate() {
            self.state.mem_write(obj.origin.wrapping_add(i as u16), *word);
        }
    }

    pub fn set_mmio_handler(&mut self, handler: impl MMIOHandler + 'static) {
        let handler = Arc::new(Mutex::new(handler));
        for addr in handler.lock().unwrap().default_addrs() {
            self.register_handler(handler.clone(), *addr);
        }
    }

    fn register_handler(&mut self, handler: Arc<Mutex<dyn MMIOHandler>>, addr: u16) {
        assert!(addr >= MMIO_START, "MMIOHandler addr {addr:#06x} below device space");
        let prev = self.mmio_handlers.insert(addr, handler);
        assert!(prev.is_none(), "Duplicate MMIOHandler for {addr:#06x}");
    }

    ///////////////////////////////////////////////////////////////////////////

    /// Device registers are intercepted on read; everything else is a
    /// plain array access.
    pub fn mem_read(&mut self, addr: u16) -> u16 {
        if addr >= MMIO_START {
            if let Some(handler) = self.mmio_handlers.get_mut(&addr) {
                return handler.lock().unwrap().read(&mut self.state, addr);
            }
        }
        self.state.mem_read(addr)
    }

    /// No device register is write-intercepted; stores always land in
    /// the backing array.
    pub fn mem_write(&mut self, addr: u16, val: u16) {
        self.state.mem_write(addr, val);
    }

    pub fn state(&self) -> &EmulatorState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut EmulatorState {
        &mut self.state
    }

    pub(crate) fn tty(&self) -> &Arc<dyn Tty> {
        &self.tty
    }

    ///////////////////////////////////////////////////////////////////////////
    // Execute
    ///////////////////////////////////////////////////////////////////////////

    fn exec_alu_ins(&mut self, ins: &AluIns) {
        let lhs = self.state.reg_read(ins.sr1);
        let rhs = match ins.src2 {
            Src2::Reg(r) => self.state.reg_read(r),
            Src2::Imm(imm) => imm,
        };
        let res = match ins.op {
            AluOpcode::Add => lhs.wrapping_add(rhs),
            AluOpcode::And => lhs & rhs,
        };
        self.state.reg_write(ins.dr, res);
        self.state.update_flags(ins.dr);
    }

    fn exec_not_ins(&mut self, ins: &NotIns) {
        let val = self.state.reg_read(ins.sr);
        self.state.reg_write(ins.dr, !val);
        self.state.update_flags(ins.dr);
    }

    fn exec_branch_ins(&mut self, ins: &BranchIns) {
        if self.state.flags().matches(ins.mask) {
            let pc = self.state.pc().wrapping_add(ins.offset);
            self.state.set_pc(pc);
        }
    }

    fn exec_jmp_ins(&mut self, ins: &JmpIns) {
        let new_pc = self.state.reg_read(ins.base);
        self.state.set_pc(new_pc);
    }

    fn exec_jsr_ins(&mut self, ins: &JsrIns) {
        // The link is written before the target register is read, so
        // `jsrr r7` jumps to the saved return address.
        self.state.reg_write(Reg::R7, self.state.pc());
        let new_pc = match ins.target {
            JsrTarget::Offset(off) => self.state.pc().wrapping_add(off),
            JsrTarget::Reg(r) => self.state.reg_read(r),
        };
        self.state.set_pc(new_pc);
    }

    fn exec_load_ins(&mut self, ins: &LoadIns) {
        let addr = self.state.pc().wrapping_add(ins.offset);
        let val = match ins.op {
            LoadOpcode::Ld => self.mem_read(addr),
            LoadOpcode::Ldi => {
                let indirect = self.mem_read(addr);
                self.mem_read(indirect)
            }
            LoadOpcode::Lea => addr,
        };
        self.state.reg_write(ins.dr, val);
        self.state.update_flags(ins.dr);
    }

    fn exec_store_ins(&mut self, ins: &StoreIns) {
        let addr = self.state.pc().wrapping_add(ins.offset);
        let addr = match ins.op {
            StoreOpcode::St => addr,
            StoreOpcode::Sti => self.mem_read(addr),
        };
        let val = self.state.reg_read(ins.sr);
        self.mem_write(addr, val);
    }

    fn exec_ldr_ins(&mut self, ins: &LdrIns) {
        let addr = self.state.reg_read(ins.base).wrapping_add(ins.offset);
        let val = self.mem_read(addr);
        self.state.reg_write(ins.dr, val);
        self.state.update_flags(ins.dr);
    }

    fn exec_str_ins(&mut self, ins: &StrIns) {
        let addr = self.state.reg_read(ins.base).wrapping_add(ins.offset);
        let val = self.state.reg_read(ins.sr);
        self.mem_write(addr, val);
    }

    fn exec(&mut self, ins: &Ins) -> ExecRet {
        match ins {
            Ins::Alu(ins) => self.exec_alu_ins(ins),
            Ins::Not(ins) => self.exec_not_ins(ins),
            Ins::Branch(ins) => self.exec_branch_ins(ins),
            Ins::Jmp(ins) => self.exec_jmp_ins(ins),
            Ins::Jsr(ins) => self.exec_jsr_ins(ins),
            Ins::Load(ins) => self.exec_load_ins(ins),
            Ins::Store(ins) => self.exec_store_ins(ins),
            Ins::LoadReg(ins) => self.exec_ldr_ins(ins),
            Ins::StoreReg(ins) => self.exec_str_ins(ins),
            Ins::Trap(ins) => return traps::dispatch(self, ins.code),
        }

        ExecRet::Ok
    }
}

impl Default for Emulator {
    fn default() -> Self {
        Self::new(Arc::new(Console::new()))
    }
}

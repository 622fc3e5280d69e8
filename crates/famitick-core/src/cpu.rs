//! 2A03 instruction engine.
//!
//! [`Cpu::clock`] performs exactly one CPU cycle: either an opcode fetch or
//! one micro-step of the current instruction or interrupt sequence. All
//! register changes made by an opcode go through [`Delta`] and are applied
//! by [`Cpu::commit`].

use tracing::{debug, warn};

use crate::{bus::Bus, memory::cpu as cpu_mem, reset_kind::ResetKind};

mod addressing;
mod delta;
mod lookup;
mod mnemonic;
mod ops;
mod registers;
mod status;
mod step;

pub use addressing::{AccessKind, Addressing};
pub use mnemonic::Mnemonic;
pub use registers::Registers;
pub use status::Status;

pub(crate) use delta::{Delta, Operand};
use lookup::{Instruction, LOOKUP_TABLE};
use step::{Index, Step};

/// Whether the engine is still fetching instructions.
#[cfg_attr(
    feature = "savestate-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CpuState {
    #[default]
    Running,
    /// A JAM opcode stopped the engine. Only a reset resumes it.
    Halted { opcode: u8, pc: u16 },
}

/// Which step list the engine is walking.
#[cfg_attr(
    feature = "savestate-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Sequence {
    /// Between instructions; the next cycle fetches an opcode or starts an
    /// interrupt.
    #[default]
    Boundary,
    Opcode,
    Interrupt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Done,
}

/// Interrupt polling latches.
///
/// NMI is edge-triggered, IRQ is level-triggered. Both are sampled at the
/// end of every cycle; the `prev_` copies are what the instruction boundary
/// acts on, which gives the one-cycle polling delay of the real part.
#[cfg_attr(
    feature = "savestate-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct InterruptLatch {
    pub(crate) need_nmi: bool,
    pub(crate) prev_need_nmi: bool,
    pub(crate) prev_nmi_line: bool,
    pub(crate) run_irq: bool,
    pub(crate) prev_run_irq: bool,
    /// The next interrupt sequence is a reset.
    pub(crate) reset: bool,
}

#[derive(Debug, Clone)]
pub struct Cpu {
    regs: Registers,
    state: CpuState,
    sequence: Sequence,
    opcode: u8,
    index: u8,
    /// Effective address.
    addr: u16,
    /// Address before indexing.
    base: u16,
    latch: u8,
    ptr: u8,
    crossed: bool,
    vector: u16,
    irq: InterruptLatch,
    cycles: u64,
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu {
    /// Power-on state: registers cleared, S at 0 so the reset sequence
    /// leaves it at `$FD`, and a reset pending.
    pub fn new() -> Self {
        Self {
            regs: Registers {
                p: Status::from_bits_retain(0x34),
                ..Registers::default()
            },
            state: CpuState::Running,
            sequence: Sequence::Boundary,
            opcode: 0,
            index: 0,
            addr: 0,
            base: 0,
            latch: 0,
            ptr: 0,
            crossed: false,
            vector: cpu_mem::RESET_VECTOR_LO,
            irq: InterruptLatch {
                reset: true,
                ..InterruptLatch::default()
            },
            cycles: 0,
        }
    }

    /// Queues a reset. The 7-cycle reset sequence runs on the next cycles.
    pub fn reset(&mut self, kind: ResetKind) {
        match kind {
            ResetKind::PowerOn => *self = Self::new(),
            ResetKind::Soft => {
                self.state = CpuState::Running;
                self.sequence = Sequence::Boundary;
                self.index = 0;
                self.irq = InterruptLatch {
                    reset: true,
                    ..InterruptLatch::default()
                };
            }
        }
        debug!(?kind, "cpu reset queued");
    }

    pub fn registers(&self) -> &Registers {
        &self.regs
    }

    pub fn state(&self) -> CpuState {
        self.state
    }

    pub fn halted(&self) -> bool {
        matches!(self.state, CpuState::Halted { .. })
    }

    /// CPU cycles executed since power-on.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Whether the next cycle starts a new instruction or interrupt.
    pub fn at_boundary(&self) -> bool {
        self.sequence == Sequence::Boundary
    }

    /// Opcode of the instruction in flight (or last executed).
    pub fn opcode(&self) -> u8 {
        self.opcode
    }

    /// Mnemonic and addressing mode of [`Cpu::opcode`].
    pub fn current_instruction(&self) -> (Mnemonic, Addressing) {
        let instr = self.instruction();
        (instr.mnemonic, instr.mode)
    }

    /// Runs one CPU cycle. Does nothing while halted.
    pub fn clock<B: Bus>(&mut self, bus: &mut B) {
        if self.halted() {
            return;
        }

        if self.sequence == Sequence::Boundary {
            self.begin(bus);
        } else {
            let step = self.steps().get(self.index as usize).copied();
            self.index += 1;
            let flow = match step {
                Some(step) => self.run(step, bus),
                None => Flow::Done,
            };
            if flow == Flow::Done || self.index as usize >= self.steps().len() || self.halted() {
                self.sequence = Sequence::Boundary;
                self.index = 0;
            }
        }

        self.poll_interrupts(bus);
        self.cycles += 1;
    }

    fn instruction(&self) -> &'static Instruction {
        &LOOKUP_TABLE[self.opcode as usize]
    }

    fn steps(&self) -> &'static [Step] {
        match self.sequence {
            Sequence::Boundary => &[],
            Sequence::Opcode => self.instruction().steps,
            Sequence::Interrupt => step::INTERRUPT,
        }
    }

    /// Opcode fetch cycle. A pending interrupt turns it into a discarded
    /// read and starts the interrupt sequence instead.
    fn begin<B: Bus>(&mut self, bus: &mut B) {
        self.index = 0;
        if self.irq.reset || self.irq.prev_need_nmi || self.irq.prev_run_irq {
            bus.read(self.regs.pc);
            self.sequence = Sequence::Interrupt;
            return;
        }
        self.opcode = bus.read(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        self.sequence = Sequence::Opcode;
    }

    fn fetch<B: Bus>(&mut self, bus: &mut B) -> u8 {
        let value = bus.read(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        value
    }

    fn index_register(&self, index: Index) -> u8 {
        match index {
            Index::X => self.regs.x,
            Index::Y => self.regs.y,
        }
    }

    fn index_from(&mut self, base: u16, index: u8) {
        self.base = base;
        self.addr = base.wrapping_add(u16::from(index));
        self.crossed = (base ^ self.addr) & 0xFF00 != 0;
    }

    /// Indexed address before the carry into the high byte.
    fn unfixed(&self) -> u16 {
        (self.base & 0xFF00) | (self.addr & 0x00FF)
    }

    fn operand(&self, value: u8) -> Operand {
        Operand {
            value,
            addr: self.addr,
            base: self.base,
        }
    }

    fn execute<B: Bus>(&mut self, operand: Operand, bus: &mut B) {
        let delta = (self.instruction().op)(&self.regs, operand);
        self.commit(delta, bus);
    }

    /// The single place where an instruction's delta takes effect.
    fn commit<B: Bus>(&mut self, delta: Delta, bus: &mut B) {
        if let Some((addr, value)) = delta.write {
            bus.write(addr, value);
        }
        delta.apply(&mut self.regs);
        if delta.halt {
            let pc = self.regs.pc.wrapping_sub(1);
            let (mnemonic, _) = self.current_instruction();
            warn!(opcode = self.opcode, pc, %mnemonic, "cpu halted");
            self.state = CpuState::Halted {
                opcode: self.opcode,
                pc,
            };
        }
    }

    fn read_execute<B: Bus>(&mut self, bus: &mut B) {
        let value = bus.read(self.addr);
        self.execute(self.operand(value), bus);
    }

    /// Stack push, turned into a read during reset.
    fn push<B: Bus>(&mut self, bus: &mut B, value: u8) {
        let addr = self.regs.stack_addr();
        if self.irq.reset {
            bus.read(addr);
        } else {
            bus.write(addr, value);
        }
        self.regs.s = self.regs.s.wrapping_sub(1);
    }

    fn pull<B: Bus>(&mut self, bus: &mut B) -> u8 {
        let value = bus.read(self.regs.stack_addr());
        self.regs.s = self.regs.s.wrapping_add(1);
        value
    }

    fn run<B: Bus>(&mut self, step: Step, bus: &mut B) -> Flow {
        match step {
            Step::Implied => {
                bus.read(self.regs.pc);
                self.execute(Operand::new(0, self.regs.pc), bus);
            }
            Step::Accumulator => {
                bus.read(self.regs.pc);
                let mut delta =
                    (self.instruction().op)(&self.regs, Operand::new(self.regs.a, self.regs.pc));
                if let Some((_, value)) = delta.write.take() {
                    delta.a = Some(value);
                }
                self.commit(delta, bus);
            }
            Step::Immediate => {
                let value = self.fetch(bus);
                let addr = self.regs.pc.wrapping_sub(1);
                self.execute(Operand::new(value, addr), bus);
            }

            Step::FetchZeroPage => {
                let zp = self.fetch(bus);
                self.ptr = zp;
                self.addr = u16::from(zp);
                self.base = self.addr;
            }
            Step::FetchLow => self.latch = self.fetch(bus),
            Step::FetchHigh => {
                let hi = self.fetch(bus);
                self.addr = u16::from_le_bytes([self.latch, hi]);
                self.base = self.addr;
            }
            Step::FetchHighIndexed(index) => {
                let hi = self.fetch(bus);
                let index = self.index_register(index);
                self.index_from(u16::from_le_bytes([self.latch, hi]), index);
            }
            Step::ZeroPageIndexed(index) => {
                bus.read(self.addr);
                let index = self.index_register(index);
                self.addr = u16::from((self.addr as u8).wrapping_add(index));
                self.base = self.addr;
            }
            Step::PointerIndexX => {
                bus.read(u16::from(self.ptr));
                self.ptr = self.ptr.wrapping_add(self.regs.x);
            }
            Step::PointerLow => self.latch = bus.read(u16::from(self.ptr)),
            Step::PointerHigh => {
                let hi = bus.read(u16::from(self.ptr.wrapping_add(1)));
                self.addr = u16::from_le_bytes([self.latch, hi]);
                self.base = self.addr;
            }
            Step::PointerHighIndexY => {
                let hi = bus.read(u16::from(self.ptr.wrapping_add(1)));
                let y = self.regs.y;
                self.index_from(u16::from_le_bytes([self.latch, hi]), y);
            }

            Step::ReadPageCross => {
                if self.crossed {
                    bus.read(self.unfixed());
                } else {
                    self.read_execute(bus);
                    return Flow::Done;
                }
            }
            Step::DummyReadUnfixed => {
                bus.read(self.unfixed());
            }
            Step::Read => self.read_execute(bus),
            Step::Write => self.execute(self.operand(0), bus),
            Step::ModifyRead => self.latch = bus.read(self.addr),
            Step::ModifyDummyWrite => bus.write(self.addr, self.latch),
            Step::ModifyWrite => self.execute(self.operand(self.latch), bus),

            Step::JumpAbsolute => {
                let hi = self.fetch(bus);
                self.addr = u16::from_le_bytes([self.latch, hi]);
                self.execute(Operand::new(0, self.addr), bus);
            }
            Step::IndirectLow => self.latch = bus.read(self.addr),
            Step::IndirectHigh => {
                let hi_addr = (self.addr & 0xFF00) | (self.addr.wrapping_add(1) & 0x00FF);
                let hi = bus.read(hi_addr);
                let target = u16::from_le_bytes([self.latch, hi]);
                self.execute(Operand::new(0, target), bus);
            }
            Step::BranchOffset => {
                let offset = self.fetch(bus);
                let delta = (self.instruction().op)(&self.regs, Operand::new(offset, self.regs.pc));
                match delta.pc {
                    Some(target) => self.addr = target,
                    None => return Flow::Done,
                }
            }
            Step::BranchTaken => {
                // An IRQ that became visible during the offset fetch waits
                // one more instruction.
                if self.irq.run_irq && !self.irq.prev_run_irq {
                    self.irq.run_irq = false;
                }
                bus.read(self.regs.pc);
                self.regs.pc = (self.regs.pc & 0xFF00) | (self.addr & 0x00FF);
                if self.regs.pc == self.addr {
                    return Flow::Done;
                }
            }
            Step::BranchFixup => {
                bus.read(self.regs.pc);
                self.regs.pc = self.addr;
            }

            Step::DummyReadPc => {
                bus.read(self.regs.pc);
            }
            Step::DummyReadPcIncrement => {
                bus.read(self.regs.pc);
                self.regs.pc = self.regs.pc.wrapping_add(1);
            }
            Step::StackDummyRead => {
                bus.read(self.regs.stack_addr());
            }
            Step::IncrementStack => {
                bus.read(self.regs.stack_addr());
                self.regs.s = self.regs.s.wrapping_add(1);
            }
            Step::Push => self.execute(Operand::new(0, self.regs.stack_addr()), bus),
            Step::Pull => {
                let addr = self.regs.stack_addr();
                let value = bus.read(addr);
                self.execute(Operand::new(value, addr), bus);
            }
            Step::PushPcHigh => self.push(bus, (self.regs.pc >> 8) as u8),
            Step::PushPcLow => self.push(bus, self.regs.pc as u8),
            Step::PushStatus => {
                let brk = self.sequence == Sequence::Opcode;
                self.push(bus, self.regs.p.to_stack(brk));
                self.vector = if self.irq.reset {
                    cpu_mem::RESET_VECTOR_LO
                } else if self.irq.need_nmi {
                    self.irq.need_nmi = false;
                    cpu_mem::NMI_VECTOR_LO
                } else {
                    cpu_mem::IRQ_VECTOR_LO
                };
            }
            Step::PullStatus => {
                let value = self.pull(bus);
                self.regs.p = Status::from_stack(value);
            }
            Step::PullPcLow => self.latch = self.pull(bus),
            Step::PullPcHigh => {
                let hi = bus.read(self.regs.stack_addr());
                self.regs.pc = u16::from_le_bytes([self.latch, hi]);
            }
            Step::IncrementPc => {
                bus.read(self.regs.pc);
                self.regs.pc = self.regs.pc.wrapping_add(1);
            }
            Step::JsrFetchHigh => {
                let hi = bus.read(self.regs.pc);
                self.regs.pc = u16::from_le_bytes([self.latch, hi]);
            }
            Step::VectorLow => {
                self.latch = bus.read(self.vector);
                self.regs.p.insert(Status::INTERRUPT);
            }
            Step::VectorHigh => {
                let hi = bus.read(self.vector.wrapping_add(1));
                self.regs.pc = u16::from_le_bytes([self.latch, hi]);
                if self.irq.reset {
                    self.irq.reset = false;
                    debug!(pc = self.regs.pc, "reset vector fetched");
                }
            }
        }
        Flow::Continue
    }

    /// End-of-cycle interrupt sampling.
    fn poll_interrupts<B: Bus>(&mut self, bus: &B) {
        self.irq.prev_need_nmi = self.irq.need_nmi;
        let nmi = bus.nmi_line();
        if nmi && !self.irq.prev_nmi_line {
            self.irq.need_nmi = true;
        }
        self.irq.prev_nmi_line = nmi;

        self.irq.prev_run_irq = self.irq.run_irq;
        self.irq.run_irq = bus.irq_line() && !self.regs.p.contains(Status::INTERRUPT);
    }
}

/// Plain-data copy of the engine for snapshots.
#[cfg_attr(
    feature = "savestate-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuSnapshot {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub s: u8,
    pub p: u8,
    pub pc: u16,
    pub state: CpuState,
    pub(crate) sequence: Sequence,
    pub opcode: u8,
    pub(crate) index: u8,
    pub(crate) addr: u16,
    pub(crate) base: u16,
    pub(crate) latch: u8,
    pub(crate) ptr: u8,
    pub(crate) crossed: bool,
    pub(crate) vector: u16,
    pub(crate) irq: InterruptLatch,
    pub cycles: u64,
}

impl Cpu {
    pub fn snapshot(&self) -> CpuSnapshot {
        CpuSnapshot {
            a: self.regs.a,
            x: self.regs.x,
            y: self.regs.y,
            s: self.regs.s,
            p: self.regs.p.bits(),
            pc: self.regs.pc,
            state: self.state,
            sequence: self.sequence,
            opcode: self.opcode,
            index: self.index,
            addr: self.addr,
            base: self.base,
            latch: self.latch,
            ptr: self.ptr,
            crossed: self.crossed,
            vector: self.vector,
            irq: self.irq,
            cycles: self.cycles,
        }
    }

    pub fn restore(&mut self, snap: &CpuSnapshot) {
        *self = Self {
            regs: Registers {
                a: snap.a,
                x: snap.x,
                y: snap.y,
                s: snap.s,
                p: Status::from_bits_retain(snap.p),
                pc: snap.pc,
            },
            state: snap.state,
            sequence: snap.sequence,
            opcode: snap.opcode,
            index: snap.index,
            addr: snap.addr,
            base: snap.base,
            latch: snap.latch,
            ptr: snap.ptr,
            crossed: snap.crossed,
            vector: snap.vector,
            irq: snap.irq,
            cycles: snap.cycles,
        };
    }
}

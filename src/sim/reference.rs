//! Sequential reference interpreter.
//!
//! Executes one instruction at a time with no pipeline, no hazards and no
//! prediction. Its final register file, flags and data memory are what the
//! pipelined CPU must reproduce for the same program.

use crate::common::SimError;
use crate::config::Config;
use crate::core::arch::flags::Flags;
use crate::core::arch::gpr::Gpr;
use crate::core::arch::memory::{DataMemory, OutOfBounds};
use crate::core::units::alu::Alu;
use crate::isa::program::INSN_BYTES;
use crate::isa::{CodeMemory, Instruction};

/// Post-increment step of LOADP and STOREP.
const POST_INCREMENT: i32 = 4;

/// One-instruction-per-step APEX interpreter.
#[derive(Clone, Debug)]
pub struct SequentialCpu {
    pub pc: u32,
    pub regs: Gpr,
    pub flags: Flags,
    pub memory: DataMemory,
    pub code: CodeMemory,
    pub instructions_retired: u64,
    pub halted: bool,
}

impl SequentialCpu {
    pub fn new(code: CodeMemory, config: &Config) -> Self {
        Self {
            pc: code.base(),
            regs: Gpr::new(),
            flags: Flags::default(),
            memory: DataMemory::new(config.memory.data_words),
            code,
            instructions_retired: 0,
            halted: false,
        }
    }

    /// Executes the instruction at the PC.
    ///
    /// # Returns
    ///
    /// `Ok(false)` once the machine has halted or the PC has left code
    /// memory, `Ok(true)` otherwise.
    pub fn step(&mut self) -> Result<bool, SimError> {
        if self.halted {
            return Ok(false);
        }
        let pc = self.pc;
        let Some(raw) = self.code.fetch(pc)? else {
            return Ok(false);
        };
        let insn = Instruction::decode(raw, pc)?;
        let fault = |e: OutOfBounds| SimError::MemoryFault {
            pc,
            address: e.address,
            access: e.access,
        };
        let mut next_pc = pc.wrapping_add(INSN_BYTES);

        match insn {
            Instruction::Arith { op, rd, rs1, rs2 } => {
                let value = Alu::execute(op, self.regs.read(rs1), self.regs.read(rs2))
                    .ok_or(SimError::DivisionByZero { pc })?;
                self.regs.write(rd, value);
                self.flags.set_from_result(value);
            }
            Instruction::ArithImm { op, rd, rs1, imm } => {
                let value = Alu::execute(op, self.regs.read(rs1), imm)
                    .ok_or(SimError::DivisionByZero { pc })?;
                self.regs.write(rd, value);
                self.flags.set_from_result(value);
            }
            Instruction::Movc { rd, imm } => {
                self.regs.write(rd, imm);
                self.flags.set_from_result(imm);
            }
            Instruction::Load {
                rd,
                rs1,
                imm,
                post_increment,
            } => {
                let base = self.regs.read(rs1);
                let value = self.memory.read(base.wrapping_add(imm)).map_err(fault)?;
                self.regs.write(rd, value);
                if post_increment {
                    self.regs.write(rs1, base.wrapping_add(POST_INCREMENT));
                }
            }
            Instruction::Store {
                rs1,
                rs2,
                imm,
                post_increment,
            } => {
                let base = self.regs.read(rs2);
                self.memory
                    .write(base.wrapping_add(imm), self.regs.read(rs1))
                    .map_err(fault)?;
                if post_increment {
                    self.regs.write(rs2, base.wrapping_add(POST_INCREMENT));
                }
            }
            Instruction::Cmp { rs1, rs2 } => self
                .flags
                .set_from_compare(self.regs.read(rs1), self.regs.read(rs2)),
            Instruction::Cml { rs1, imm } => {
                self.flags.set_from_compare(self.regs.read(rs1), imm)
            }
            Instruction::Branch { cond, offset } => {
                if cond.evaluate(&self.flags) {
                    next_pc = pc.wrapping_add_signed(offset);
                }
            }
            Instruction::Jump { rs1, imm } => {
                next_pc = self.regs.read(rs1).wrapping_add(imm) as u32;
            }
            Instruction::Jalr { rd, rs1, imm } => {
                let target = self.regs.read(rs1).wrapping_add(imm) as u32;
                self.regs.write(rd, pc.wrapping_add(INSN_BYTES) as i32);
                next_pc = target;
            }
            Instruction::Nop => {}
            Instruction::Halt => self.halted = true,
        }

        self.instructions_retired += 1;
        self.pc = next_pc;
        Ok(!self.halted)
    }

    /// Runs until HALT, the end of code memory, or `max_steps` instructions.
    pub fn run(&mut self, max_steps: u64) -> Result<(), SimError> {
        for _ in 0..max_steps {
            if !self.step()? {
                break;
            }
        }
        Ok(())
    }
}

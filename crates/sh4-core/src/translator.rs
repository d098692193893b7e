//! Guest-bytes to IR: fetch/decode/emit until a control transfer, with a
//! block cache keyed by start address and range breakpoints that preempt a
//! block before it is entered.

use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use crate::error::TranslateError;
use crate::ir::BasicBlock;
use crate::sh4dec::OpcodeTable;
use crate::sh4mem::Memory;
use crate::translate::Sh4Emitter;

/// Safety valve for runaway or invalid code.
pub const MAX_BLOCK_INSTRUCTIONS: usize = 1000;

pub struct Translator {
    table: Arc<OpcodeTable>,
    blocks: HashMap<u32, Rc<BasicBlock>>,
    breakpoints: Vec<(u32, u32)>,
}

impl Translator {
    pub fn new(table: Arc<OpcodeTable>) -> Self {
        Self {
            table,
            blocks: HashMap::new(),
            breakpoints: Vec::new(),
        }
    }

    pub fn table(&self) -> &OpcodeTable {
        &self.table
    }

    /// Registers an inclusive address range that preempts translation.
    pub fn add_breakpoint(&mut self, start: u32, end: u32) {
        debug_assert!(start <= end);
        self.breakpoints.push((start, end));
        // Cached blocks were built without the breakpoint check.
        self.blocks.clear();
    }

    pub fn remove_breakpoint(&mut self, start: u32) {
        self.breakpoints.retain(|&(s, _)| s != start);
    }

    pub fn breakpoints(&self) -> &[(u32, u32)] {
        &self.breakpoints
    }

    pub fn breakpoint_hit(&self, pc: u32) -> bool {
        self.breakpoints.iter().any(|&(s, e)| pc >= s && pc <= e)
    }

    pub fn clear_cache(&mut self) {
        self.blocks.clear();
    }

    /// Returns the block starting at `pc`, translating it on a cache miss.
    /// Single-step requests always translate exactly one instruction (or a
    /// delayed branch plus its slot) and never touch the cache.
    pub fn block_at(
        &mut self,
        mem: &mut Memory,
        pc: u32,
        single_step: bool,
    ) -> Result<Rc<BasicBlock>, TranslateError> {
        if !single_step {
            if let Some(block) = self.blocks.get(&pc) {
                return Ok(block.clone());
            }
            if self.breakpoint_hit(pc) {
                // Hand the empty block back so the driving loop can stop
                // before anything at this address runs.
                log::debug!("breakpoint hit at {pc:08X}");
                return Ok(Rc::new(BasicBlock::new()));
            }
        }

        let mut em = Sh4Emitter::new(pc);
        let mut current_pc = pc;
        let mut count = 0usize;

        loop {
            let opcode = mem.read16(current_pc);
            let entry = self.table.entry(opcode).ok_or(TranslateError::Invalid {
                opcode,
                pc: current_pc,
            })?;
            let emit = entry.emit.ok_or(TranslateError::Unimplemented {
                opcode,
                pc: current_pc,
            })?;

            if entry.is_branch() {
                if entry.is_delayed() {
                    // The slot instruction runs before the transfer becomes
                    // visible, so it is emitted first.
                    let slot_pc = current_pc.wrapping_add(2);
                    let slot_opcode = mem.read16(slot_pc);
                    let slot_entry =
                        self.table
                            .entry(slot_opcode)
                            .ok_or(TranslateError::Invalid {
                                opcode: slot_opcode,
                                pc: slot_pc,
                            })?;
                    let slot_emit = slot_entry.emit.ok_or(TranslateError::Unimplemented {
                        opcode: slot_opcode,
                        pc: slot_pc,
                    })?;
                    debug_assert!(!slot_entry.is_branch(), "branch in delay slot");
                    em.set_op(slot_opcode, slot_pc);
                    slot_emit(&mut em);
                }
                em.set_op(opcode, current_pc);
                emit(&mut em);
                break;
            }

            em.set_op(opcode, current_pc);
            emit(&mut em);
            current_pc = current_pc.wrapping_add(2);
            count += 1;

            if single_step || count >= MAX_BLOCK_INSTRUCTIONS {
                // Not terminated by a branch: leave PC at the continuation
                // address for the driving loop.
                em.set_pc_const(current_pc);
                break;
            }
        }

        let block = Rc::new(em.ctx.finish());
        log::trace!(
            "translated block at {pc:08X}: {} guest instructions, {} IR ops",
            count + 1,
            block.instrs.len()
        );
        if !single_step {
            self.blocks.insert(pc, block.clone());
        }
        Ok(block)
    }
}

//! Linear scan over the liveness intervals. Callee-saved host registers
//! only; R15 is reserved for the CPU-state pointer and RAX/RCX stay free as
//! scratch for the emitter.

use std::collections::HashMap;

use crate::liveness::{Liveness, Range};

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
#[repr(u8)]
pub enum HostReg {
    Rax = 0,
    Rcx = 1,
    Rdx = 2,
    Rbx = 3,
    Rsp = 4,
    Rbp = 5,
    Rsi = 6,
    Rdi = 7,
    R8 = 8,
    R9 = 9,
    R10 = 10,
    R11 = 11,
    R12 = 12,
    R13 = 13,
    R14 = 14,
    R15 = 15,
}

impl HostReg {
    pub fn num(self) -> u8 {
        self as u8
    }
}

/// Registers handed out by the allocator, in preference order.
pub const ALLOCATABLE: [HostReg; 4] = [HostReg::Rbx, HostReg::R12, HostReg::R13, HostReg::R14];

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Location {
    Reg(HostReg),
    /// Byte offset from the frame base (negative, below the saved
    /// registers).
    Stack(i32),
}

pub struct Allocation {
    mapping: HashMap<usize, Location>,
    /// Frame bytes consumed below RBP, including the initial offset.
    pub stack_size: i32,
    pub used_regs: Vec<HostReg>,
}

impl Allocation {
    pub fn location(&self, id: usize) -> Option<Location> {
        self.mapping.get(&id).copied()
    }
}

/// `initial_stack` reserves the bytes already occupied below the frame
/// base (the saved callee registers), so the first spill slot lands under
/// them.
pub fn allocate(liveness: &Liveness, initial_stack: i32) -> Allocation {
    let mut mapping = HashMap::new();
    let mut stack_size = initial_stack;
    let mut used_regs: Vec<HostReg> = Vec::new();

    let mut free: Vec<HostReg> = ALLOCATABLE.to_vec();
    let mut active: Vec<Range> = Vec::new();

    for interval in &liveness.ranges {
        // Expire ranges that ended before this one starts.
        for i in (0..active.len()).rev() {
            if active[i].end < interval.start {
                if let Some(Location::Reg(r)) = mapping.get(&active[i].id).copied() {
                    free.push(r);
                    free.sort();
                }
                active.remove(i);
            }
        }

        if let Some(reg) = free.first().copied() {
            free.remove(0);
            mapping.insert(interval.id, Location::Reg(reg));
            if !used_regs.contains(&reg) {
                used_regs.push(reg);
            }
            active.push(*interval);
        } else {
            // Spilled values keep their slot for the whole compilation.
            stack_size += 8;
            mapping.insert(interval.id, Location::Stack(-stack_size));
        }
    }

    Allocation {
        mapping,
        stack_size,
        used_regs,
    }
}

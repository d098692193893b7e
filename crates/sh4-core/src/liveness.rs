//! Backward liveness over a straight-line block, collapsed into one
//! contiguous interval per value. Blocks only branch within themselves, so
//! the flow-insensitive interval is a safe over-approximation.

use std::collections::{BTreeMap, HashSet};

use crate::ir::{BasicBlock, Operand};

/// Locals are numbered from here; everything below is an architectural
/// register id.
pub const LOCAL_ID_BASE: usize = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Range {
    pub id: usize,
    pub start: usize,
    pub end: usize,
}

pub struct Liveness {
    /// Sorted by start index (ties by id).
    pub ranges: Vec<Range>,
}

pub fn operand_id(op: Option<&Operand>) -> Option<usize> {
    match op {
        Some(Operand::Reg(r)) => Some(*r as usize),
        Some(Operand::Local(i)) => Some(LOCAL_ID_BASE + *i as usize),
        _ => None,
    }
}

impl Liveness {
    pub fn analyze(block: &BasicBlock) -> Self {
        let count = block.instrs.len();
        let mut live_in: Vec<HashSet<usize>> = vec![HashSet::new(); count];

        for i in (0..count).rev() {
            let ins = &block.instrs[i];
            let mut set = HashSet::new();

            if i + 1 < count {
                set.extend(live_in[i + 1].iter().copied());
            }
            if let Some(id) = operand_id(ins.dst.as_ref()) {
                set.remove(&id);
            }
            if let Some(id) = operand_id(ins.a.as_ref()) {
                set.insert(id);
            }
            if let Some(id) = operand_id(ins.b.as_ref()) {
                set.insert(id);
            }
            live_in[i] = set;
        }

        // A value written at i and read later is live-in from i+1; widen
        // the interval to cover the defining instruction too.
        let mut ranges: BTreeMap<usize, Range> = BTreeMap::new();
        for (i, ins) in block.instrs.iter().enumerate() {
            for &id in &live_in[i] {
                ranges
                    .entry(id)
                    .and_modify(|r| r.end = i)
                    .or_insert(Range {
                        id,
                        start: i,
                        end: i,
                    });
            }
            if let Some(id) = operand_id(ins.dst.as_ref()) {
                ranges
                    .entry(id)
                    .and_modify(|r| {
                        if i < r.start {
                            r.start = i;
                        }
                        if i > r.end {
                            r.end = i;
                        }
                    })
                    .or_insert(Range {
                        id,
                        start: i,
                        end: i,
                    });
            }
        }

        let mut ranges: Vec<Range> = ranges.into_values().collect();
        ranges.sort_by_key(|r| (r.start, r.id));
        Self { ranges }
    }
}

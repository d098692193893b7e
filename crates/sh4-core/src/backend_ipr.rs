//! Tree-walking IR backend. One flat instruction pointer over the block,
//! temporaries live in a scratch array sized per block, branches redirect
//! the instruction pointer through the label table.

use crate::Sh4Ctx;
use crate::ir::{BasicBlock, Instruction, Opcode, Operand, Width};
use crate::sh4mem::Memory;

fn read_operand(ctx: &Sh4Ctx, vars: &[u64], op: &Operand) -> u64 {
    match op {
        Operand::Reg(r) => ctx.reg(*r) as u64,
        Operand::Const(c) => *c as u64,
        Operand::Local(i) => vars[*i as usize],
        _ => {
            debug_assert!(false, "operand {op:?} is not a value");
            0
        }
    }
}

fn write_operand(ctx: &mut Sh4Ctx, vars: &mut [u64], op: &Operand, value: u64) {
    match op {
        Operand::Reg(r) => ctx.set_reg(*r, value as u32),
        Operand::Local(i) => vars[*i as usize] = value,
        _ => debug_assert!(false, "operand {op:?} is not writable"),
    }
}

fn branch_target(block: &BasicBlock, ins: &Instruction) -> usize {
    match ins.dst.as_ref() {
        Some(Operand::Label(id)) => block.label_target(*id),
        other => {
            debug_assert!(false, "branch destination {other:?} is not a label");
            block.instrs.len()
        }
    }
}

/// Runs a block to completion against the CPU state and memory.
pub fn execute(ctx: &mut Sh4Ctx, mem: &mut Memory, block: &BasicBlock) {
    let mut vars = vec![0u64; block.locals as usize];
    let mut ipc = 0usize;

    while ipc < block.instrs.len() {
        let ins = &block.instrs[ipc];
        ipc += 1;

        macro_rules! ab {
            () => {{
                let a = read_operand(ctx, &vars, ins.a.as_ref().unwrap()) as u32;
                let b = read_operand(ctx, &vars, ins.b.as_ref().unwrap()) as u32;
                (a, b)
            }};
        }
        macro_rules! set {
            ($v:expr) => {
                write_operand(ctx, &mut vars, ins.dst.as_ref().unwrap(), $v as u64)
            };
        }

        match ins.op {
            Opcode::Copy => {
                let v = read_operand(ctx, &vars, ins.a.as_ref().unwrap());
                write_operand(ctx, &mut vars, ins.dst.as_ref().unwrap(), v);
            }
            Opcode::Add => {
                let (a, b) = ab!();
                set!(a.wrapping_add(b));
            }
            Opcode::Sub => {
                let (a, b) = ab!();
                set!(a.wrapping_sub(b));
            }
            Opcode::Mul => {
                let (a, b) = ab!();
                set!(a.wrapping_mul(b));
            }
            Opcode::MulSigned => {
                let (a, b) = ab!();
                set!((a as i32).wrapping_mul(b as i32) as u32);
            }
            Opcode::And => {
                let (a, b) = ab!();
                set!(a & b);
            }
            Opcode::Or => {
                let (a, b) = ab!();
                set!(a | b);
            }
            Opcode::Xor => {
                let (a, b) = ab!();
                set!(a ^ b);
            }
            Opcode::Not => {
                let a = read_operand(ctx, &vars, ins.a.as_ref().unwrap()) as u32;
                set!(!a);
            }
            // Shift and rotate counts use the low five bits only.
            Opcode::Shl => {
                let (a, b) = ab!();
                set!(a << (b & 0x1F));
            }
            Opcode::Shr => {
                let (a, b) = ab!();
                set!(a >> (b & 0x1F));
            }
            Opcode::Sar => {
                let (a, b) = ab!();
                set!(((a as i32) >> (b & 0x1F)) as u32);
            }
            Opcode::Rol => {
                let (a, b) = ab!();
                set!(a.rotate_left(b & 0x1F));
            }
            Opcode::Ror => {
                let (a, b) = ab!();
                set!(a.rotate_right(b & 0x1F));
            }
            Opcode::SignExt8 => {
                let a = read_operand(ctx, &vars, ins.a.as_ref().unwrap()) as u32;
                set!(a as u8 as i8 as i32 as u32);
            }
            Opcode::SignExt16 => {
                let a = read_operand(ctx, &vars, ins.a.as_ref().unwrap()) as u32;
                set!(a as u16 as i16 as i32 as u32);
            }
            Opcode::ZeroExt8 => {
                let a = read_operand(ctx, &vars, ins.a.as_ref().unwrap()) as u32;
                set!(a as u8 as u32);
            }
            Opcode::ZeroExt16 => {
                let a = read_operand(ctx, &vars, ins.a.as_ref().unwrap()) as u32;
                set!(a as u16 as u32);
            }
            // Comparisons produce exactly 1 or 0.
            Opcode::CmpEq => {
                let (a, b) = ab!();
                set!((a == b) as u32);
            }
            Opcode::CmpNe => {
                let (a, b) = ab!();
                set!((a != b) as u32);
            }
            Opcode::CmpLt => {
                let (a, b) = ab!();
                set!((a < b) as u32);
            }
            Opcode::CmpGt => {
                let (a, b) = ab!();
                set!((a > b) as u32);
            }
            Opcode::CmpGe => {
                let (a, b) = ab!();
                set!((a >= b) as u32);
            }
            Opcode::CmpGtSigned => {
                let (a, b) = ab!();
                set!(((a as i32) > (b as i32)) as u32);
            }
            Opcode::CmpGeSigned => {
                let (a, b) = ab!();
                set!(((a as i32) >= (b as i32)) as u32);
            }
            Opcode::Load => {
                let Some(Operand::Mem { addr, width }) = ins.a.as_ref() else {
                    debug_assert!(false, "load source is not a memory operand");
                    continue;
                };
                let address = read_operand(ctx, &vars, addr) as u32;
                let value = match width {
                    Width::Byte => mem.read8(address) as u64,
                    Width::Word => mem.read16(address) as u64,
                    Width::Dword => mem.read32(address) as u64,
                    Width::Qword => mem.read64(address),
                };
                write_operand(ctx, &mut vars, ins.dst.as_ref().unwrap(), value);
            }
            Opcode::Store => {
                let value = read_operand(ctx, &vars, ins.a.as_ref().unwrap());
                match ins.dst.as_ref() {
                    Some(Operand::Mem { addr, width }) => {
                        let address = read_operand(ctx, &vars, addr) as u32;
                        match width {
                            Width::Byte => mem.write8(address, value as u8),
                            Width::Word => mem.write16(address, value as u16),
                            Width::Dword => mem.write32(address, value as u32),
                            Width::Qword => mem.write64(address, value),
                        }
                    }
                    Some(dst) => write_operand(ctx, &mut vars, dst, value),
                    None => debug_assert!(false, "store without destination"),
                }
            }
            Opcode::Branch => {
                ipc = branch_target(block, ins);
            }
            Opcode::BranchTrue => {
                let cond = read_operand(ctx, &vars, ins.a.as_ref().unwrap()) as u32;
                if cond != 0 {
                    ipc = branch_target(block, ins);
                }
            }
            Opcode::BranchFalse => {
                let cond = read_operand(ctx, &vars, ins.a.as_ref().unwrap()) as u32;
                if cond == 0 {
                    ipc = branch_target(block, ins);
                }
            }
        }
    }
}

//! Expression-builder over [`BasicBlock`]. Every arithmetic helper
//! allocates a fresh local, appends one instruction and hands back an
//! operand naming that local, so emission code reads like the dataflow it
//! describes.

use crate::ir::{BasicBlock, Instruction, Opcode, Operand, Width};

#[derive(Default)]
pub struct EmitterContext {
    pub block: BasicBlock,
}

impl EmitterContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finish(self) -> BasicBlock {
        self.block
    }

    pub fn alloc_local(&mut self) -> Operand {
        let idx = self.block.locals;
        self.block.locals += 1;
        Operand::Local(idx)
    }

    fn binary(&mut self, op: Opcode, a: Operand, b: Operand) -> Operand {
        let dst = self.alloc_local();
        self.block
            .push(Instruction::new(op, Some(a), Some(b), Some(dst.clone())));
        dst
    }

    fn unary(&mut self, op: Opcode, a: Operand) -> Operand {
        let dst = self.alloc_local();
        self.block
            .push(Instruction::new(op, Some(a), None, Some(dst.clone())));
        dst
    }

    pub fn add(&mut self, a: Operand, b: Operand) -> Operand {
        self.binary(Opcode::Add, a, b)
    }
    pub fn sub(&mut self, a: Operand, b: Operand) -> Operand {
        self.binary(Opcode::Sub, a, b)
    }
    pub fn mul(&mut self, a: Operand, b: Operand) -> Operand {
        self.binary(Opcode::Mul, a, b)
    }
    pub fn mul_signed(&mut self, a: Operand, b: Operand) -> Operand {
        self.binary(Opcode::MulSigned, a, b)
    }
    pub fn and(&mut self, a: Operand, b: Operand) -> Operand {
        self.binary(Opcode::And, a, b)
    }
    pub fn or(&mut self, a: Operand, b: Operand) -> Operand {
        self.binary(Opcode::Or, a, b)
    }
    pub fn xor(&mut self, a: Operand, b: Operand) -> Operand {
        self.binary(Opcode::Xor, a, b)
    }
    pub fn not(&mut self, a: Operand) -> Operand {
        self.unary(Opcode::Not, a)
    }
    pub fn shl(&mut self, a: Operand, b: Operand) -> Operand {
        self.binary(Opcode::Shl, a, b)
    }
    pub fn shr(&mut self, a: Operand, b: Operand) -> Operand {
        self.binary(Opcode::Shr, a, b)
    }
    pub fn sar(&mut self, a: Operand, b: Operand) -> Operand {
        self.binary(Opcode::Sar, a, b)
    }
    pub fn rol(&mut self, a: Operand, b: Operand) -> Operand {
        self.binary(Opcode::Rol, a, b)
    }
    pub fn ror(&mut self, a: Operand, b: Operand) -> Operand {
        self.binary(Opcode::Ror, a, b)
    }

    pub fn sign_ext8(&mut self, a: Operand) -> Operand {
        self.unary(Opcode::SignExt8, a)
    }
    pub fn sign_ext16(&mut self, a: Operand) -> Operand {
        self.unary(Opcode::SignExt16, a)
    }
    pub fn zero_ext8(&mut self, a: Operand) -> Operand {
        self.unary(Opcode::ZeroExt8, a)
    }
    pub fn zero_ext16(&mut self, a: Operand) -> Operand {
        self.unary(Opcode::ZeroExt16, a)
    }

    pub fn cmp_eq(&mut self, a: Operand, b: Operand) -> Operand {
        self.binary(Opcode::CmpEq, a, b)
    }
    pub fn cmp_ne(&mut self, a: Operand, b: Operand) -> Operand {
        self.binary(Opcode::CmpNe, a, b)
    }
    pub fn cmp_lt(&mut self, a: Operand, b: Operand) -> Operand {
        self.binary(Opcode::CmpLt, a, b)
    }
    pub fn cmp_gt(&mut self, a: Operand, b: Operand) -> Operand {
        self.binary(Opcode::CmpGt, a, b)
    }
    pub fn cmp_ge(&mut self, a: Operand, b: Operand) -> Operand {
        self.binary(Opcode::CmpGe, a, b)
    }
    pub fn cmp_gt_signed(&mut self, a: Operand, b: Operand) -> Operand {
        self.binary(Opcode::CmpGtSigned, a, b)
    }
    pub fn cmp_ge_signed(&mut self, a: Operand, b: Operand) -> Operand {
        self.binary(Opcode::CmpGeSigned, a, b)
    }

    pub fn is_zero(&mut self, a: Operand) -> Operand {
        let zero = self.constant(0);
        self.cmp_eq(a, zero)
    }

    pub fn copy(&mut self, src: Operand, dst: Operand) {
        self.block
            .push(Instruction::new(Opcode::Copy, Some(src), None, Some(dst)));
    }

    /// Guest memory read at the operand's declared width into a fresh local.
    pub fn load(&mut self, src: Operand) -> Operand {
        debug_assert!(matches!(src, Operand::Mem { .. }));
        let dst = self.alloc_local();
        self.block
            .push(Instruction::new(Opcode::Load, Some(src), None, Some(dst.clone())));
        dst
    }

    /// Guest memory write. `dst` must be a `Mem` operand; register and
    /// local writes are expressed as `copy`.
    pub fn store(&mut self, dst: Operand, value: Operand) {
        debug_assert!(matches!(dst, Operand::Mem { .. }));
        self.block
            .push(Instruction::new(Opcode::Store, Some(value), None, Some(dst)));
    }

    pub fn mem(&self, addr: Operand, width: Width) -> Operand {
        Operand::mem(addr, width)
    }

    pub fn constant(&self, value: u32) -> Operand {
        Operand::Const(value)
    }

    pub fn constant_i(&self, value: i32) -> Operand {
        Operand::Const(value as u32)
    }

    pub fn reg(&self, num: u8) -> Operand {
        Operand::Reg(num)
    }

    pub fn label(&mut self) -> Operand {
        Operand::Label(self.block.new_label())
    }

    pub fn mark_label(&mut self, label: &Operand) {
        match label {
            Operand::Label(id) => self.block.bind_label(*id),
            _ => debug_assert!(false, "mark_label on a non-label operand"),
        }
    }

    pub fn branch(&mut self, label: &Operand) {
        debug_assert!(matches!(label, Operand::Label(_)));
        self.block
            .push(Instruction::new(Opcode::Branch, None, None, Some(label.clone())));
    }

    pub fn branch_if_true(&mut self, cond: Operand, label: &Operand) {
        debug_assert!(matches!(label, Operand::Label(_)));
        self.block.push(Instruction::new(
            Opcode::BranchTrue,
            Some(cond),
            None,
            Some(label.clone()),
        ));
    }

    pub fn branch_if_false(&mut self, cond: Operand, label: &Operand) {
        debug_assert!(matches!(label, Operand::Label(_)));
        self.block.push(Instruction::new(
            Opcode::BranchFalse,
            Some(cond),
            None,
            Some(label.clone()),
        ));
    }

    /// Skip-over-then lowering: branch past `then` when the condition is
    /// zero.
    pub fn if_then(&mut self, cond: Operand, then: impl FnOnce(&mut Self)) {
        let skip = self.label();
        self.branch_if_false(cond, &skip);
        then(self);
        self.mark_label(&skip);
    }

    /// Skip/join lowering of a two-armed conditional.
    pub fn if_then_else(
        &mut self,
        cond: Operand,
        then: impl FnOnce(&mut Self),
        els: impl FnOnce(&mut Self),
    ) {
        let skip = self.label();
        let join = self.label();
        self.branch_if_false(cond, &skip);
        then(self);
        self.branch(&join);
        self.mark_label(&skip);
        els(self);
        self.mark_label(&join);
    }
}

//! Integer arithmetic, carry/overflow variants and the quotient-step
//! division helpers. The flag algorithms follow the architecture manual's
//! pseudocode; the comparisons they build on are unsigned unless the opcode
//! says otherwise.

use super::Sh4Emitter;
use crate::reg;

/* add Rm,Rn */
pub fn add(em: &mut Sh4Emitter) {
    let rm = em.get_reg(em.op.m());
    let rn = em.get_reg(em.op.n());
    let result = em.add(rm, rn);
    em.set_reg(em.op.n(), result);
}

/* add #imm8,Rn */
pub fn add_i(em: &mut Sh4Emitter) {
    let rn = em.get_reg(em.op.n());
    let imm = em.constant_i(em.op.simm8());
    let result = em.add(imm, rn);
    em.set_reg(em.op.n(), result);
}

/* addc Rm,Rn */
pub fn addc(em: &mut Sh4Emitter) {
    let rm = em.get_reg(em.op.m());
    let rn = em.get_reg(em.op.n());

    let tmp0 = em.alloc_local();
    em.copy(rn.clone(), tmp0.clone());

    let tmp1 = em.add(rm, rn);
    let t = em.t();
    let result = em.add(tmp1.clone(), t);
    em.set_reg(em.op.n(), result.clone());

    let carry1 = em.cmp_gt(tmp0, tmp1.clone());
    em.set_t_if(carry1);
    let carry2 = em.cmp_gt(tmp1, result);
    em.if_then(carry2, |e| e.set_t());
}

/* addv Rm,Rn */
pub fn addv(em: &mut Sh4Emitter) {
    let n = em.op.n();
    let m = em.op.m();

    let dest = em.alloc_local();
    let src = em.alloc_local();
    let ans = em.alloc_local();

    let rn = em.get_reg(n);
    let zero = em.constant(0);
    let rn_pos = em.cmp_ge_signed(rn, zero.clone());
    let d = dest.clone();
    em.if_then_else(
        rn_pos,
        move |e| {
            let c = e.constant(0);
            e.copy(c, d.clone());
        },
        {
            let d = dest.clone();
            move |e| {
                let c = e.constant(1);
                e.copy(c, d.clone());
            }
        },
    );

    let rm = em.get_reg(m);
    let rm_pos = em.cmp_ge_signed(rm, zero.clone());
    let s = src.clone();
    em.if_then_else(
        rm_pos,
        move |e| {
            let c = e.constant(0);
            e.copy(c, s.clone());
        },
        {
            let s = src.clone();
            move |e| {
                let c = e.constant(1);
                e.copy(c, s.clone());
            }
        },
    );

    let src_sum = em.add(src, dest.clone());

    let rn = em.get_reg(n);
    let rm = em.get_reg(m);
    let sum = em.add(rn, rm);
    em.set_reg(n, sum);

    let rn = em.get_reg(n);
    let sum_pos = em.cmp_ge_signed(rn, zero);
    let a = ans.clone();
    em.if_then_else(
        sum_pos,
        move |e| {
            let c = e.constant(0);
            e.copy(c, a.clone());
        },
        {
            let a = ans.clone();
            move |e| {
                let c = e.constant(1);
                e.copy(c, a.clone());
            }
        },
    );

    let ans_sum = em.add(ans, dest);

    // Overflow is only possible when both operands share a sign.
    let zero = em.constant(0);
    let same_zero = em.cmp_eq(src_sum.clone(), zero);
    let two = em.constant(2);
    let same_neg = em.cmp_eq(src_sum, two);
    let same_sign = em.or(same_zero, same_neg);
    em.if_then_else(
        same_sign,
        move |e| {
            let one = e.constant(1);
            let flipped = e.cmp_eq(ans_sum.clone(), one);
            e.set_t_if(flipped);
        },
        |e| e.clear_t(),
    );
}

/* sub Rm,Rn */
pub fn sub(em: &mut Sh4Emitter) {
    let rm = em.get_reg(em.op.m());
    let rn = em.get_reg(em.op.n());
    let result = em.sub(rn, rm);
    em.set_reg(em.op.n(), result);
}

/* subc Rm,Rn */
pub fn subc(em: &mut Sh4Emitter) {
    let rm = em.get_reg(em.op.m());
    let rn = em.get_reg(em.op.n());

    let tmp0 = em.alloc_local();
    em.copy(rn.clone(), tmp0.clone());

    let tmp1 = em.sub(rn, rm);
    let t = em.t();
    let result = em.sub(tmp1.clone(), t);
    em.set_reg(em.op.n(), result.clone());

    let borrow1 = em.cmp_lt(tmp0, tmp1.clone());
    em.set_t_if(borrow1);
    let borrow2 = em.cmp_lt(tmp1, result);
    em.if_then(borrow2, |e| e.set_t());
}

/* subv Rm,Rn */
pub fn subv(em: &mut Sh4Emitter) {
    let n = em.op.n();
    let m = em.op.m();

    let dest = em.alloc_local();
    let src = em.alloc_local();
    let ans = em.alloc_local();

    let rn = em.get_reg(n);
    let zero = em.constant(0);
    let rn_pos = em.cmp_ge_signed(rn, zero.clone());
    let d = dest.clone();
    em.if_then_else(
        rn_pos,
        move |e| {
            let c = e.constant(0);
            e.copy(c, d.clone());
        },
        {
            let d = dest.clone();
            move |e| {
                let c = e.constant(1);
                e.copy(c, d.clone());
            }
        },
    );

    let rm = em.get_reg(m);
    let rm_pos = em.cmp_ge_signed(rm, zero.clone());
    let s = src.clone();
    em.if_then_else(
        rm_pos,
        move |e| {
            let c = e.constant(0);
            e.copy(c, s.clone());
        },
        {
            let s = src.clone();
            move |e| {
                let c = e.constant(1);
                e.copy(c, s.clone());
            }
        },
    );

    let src_sum = em.add(src, dest.clone());

    let rn = em.get_reg(n);
    let rm = em.get_reg(m);
    let diff = em.sub(rn, rm);
    em.set_reg(n, diff);

    let rn = em.get_reg(n);
    let diff_pos = em.cmp_ge_signed(rn, zero);
    let a = ans.clone();
    em.if_then_else(
        diff_pos,
        move |e| {
            let c = e.constant(0);
            e.copy(c, a.clone());
        },
        {
            let a = ans.clone();
            move |e| {
                let c = e.constant(1);
                e.copy(c, a.clone());
            }
        },
    );

    let ans_sum = em.add(ans, dest);

    // Overflow requires operands of opposite sign.
    let one = em.constant(1);
    let opposite = em.cmp_eq(src_sum, one);
    em.if_then_else(
        opposite,
        move |e| {
            let one = e.constant(1);
            let flipped = e.cmp_eq(ans_sum.clone(), one);
            e.set_t_if(flipped);
        },
        |e| e.clear_t(),
    );
}

/* neg Rm,Rn */
pub fn neg(em: &mut Sh4Emitter) {
    let rm = em.get_reg(em.op.m());
    let zero = em.constant(0);
    let result = em.sub(zero, rm);
    em.set_reg(em.op.n(), result);
}

/* negc Rm,Rn */
pub fn negc(em: &mut Sh4Emitter) {
    let rm = em.get_reg(em.op.m());
    let zero = em.constant(0);
    let tmp = em.sub(zero, rm);
    let t = em.t();
    let result = em.sub(tmp.clone(), t);
    em.set_reg(em.op.n(), result.clone());

    let zero = em.constant(0);
    let borrow1 = em.cmp_gt(tmp.clone(), zero);
    em.set_t_if(borrow1);
    let borrow2 = em.cmp_lt(tmp, result);
    em.if_then(borrow2, |e| e.set_t());
}

/* dt Rn */
pub fn dt(em: &mut Sh4Emitter) {
    let n = em.op.n();
    let rn = em.get_reg(n);
    let one = em.constant(1);
    let tmp = em.sub(rn, one);
    em.set_reg(n, tmp.clone());
    let zero = em.is_zero(tmp);
    em.set_t_if(zero);
}

/* mul.l Rm,Rn */
pub fn mul_l(em: &mut Sh4Emitter) {
    let rm = em.get_reg(em.op.m());
    let rn = em.get_reg(em.op.n());
    let result = em.mul(rn, rm);
    em.set_reg(reg::MACL, result);
}

/* muls.w Rm,Rn */
pub fn muls_w(em: &mut Sh4Emitter) {
    let rn = em.get_reg(em.op.n());
    let rm = em.get_reg(em.op.m());
    let a = em.sign_ext16(rn);
    let b = em.sign_ext16(rm);
    let result = em.mul_signed(a, b);
    em.set_reg(reg::MACL, result);
}

/* mulu.w Rm,Rn */
pub fn mulu_w(em: &mut Sh4Emitter) {
    let rn = em.get_reg(em.op.n());
    let rm = em.get_reg(em.op.m());
    let a = em.zero_ext16(rn);
    let b = em.zero_ext16(rm);
    let result = em.mul(a, b);
    em.set_reg(reg::MACL, result);
}

/* clrmac */
pub fn clrmac(em: &mut Sh4Emitter) {
    let zero = em.constant(0);
    em.set_reg(reg::MACH, zero.clone());
    em.set_reg(reg::MACL, zero);
}

/* div0u */
pub fn div0u(em: &mut Sh4Emitter) {
    em.clear_t();
    em.clear_m();
    em.clear_q();
}

/* div0s Rm,Rn */
pub fn div0s(em: &mut Sh4Emitter) {
    let rn = em.get_reg(em.op.n());
    let c31 = em.constant(31);
    let q_bit = em.shr(rn, c31.clone());
    em.set_q_if(q_bit);

    let rm = em.get_reg(em.op.m());
    let m_bit = em.shr(rm, c31);
    em.set_m_if(m_bit);

    let q = em.q();
    let m = em.m_flag();
    let t = em.xor(q, m);
    em.set_t_if(t);
}

/* div1 Rm,Rn — one quotient step of the non-restoring division loop */
pub fn div1(em: &mut Sh4Emitter) {
    let n = em.op.n();
    let m = em.op.m();

    let old_q = em.q();

    let rn = em.get_reg(n);
    let c31 = em.constant(31);
    let msb = em.shr(rn, c31);
    em.set_q_if(msb);

    let tmp2 = em.alloc_local();
    let rm = em.get_reg(m);
    em.copy(rm, tmp2.clone());

    // Rn = (Rn << 1) | T
    let rn = em.get_reg(n);
    let one = em.constant(1);
    let shifted = em.shl(rn, one);
    let t = em.t();
    let rotated = em.or(shifted, t);
    em.set_reg(n, rotated);

    let tmp0 = em.alloc_local();
    let rn = em.get_reg(n);
    em.copy(rn, tmp0.clone());

    // Q is updated from the carry/borrow of the add/sub below, folded with
    // its previous value.
    let step_sub = move |e: &mut Sh4Emitter, tmp2: crate::ir::Operand, tmp0: crate::ir::Operand| {
        let rn = e.get_reg(n);
        let diff = e.sub(rn, tmp2);
        e.set_reg(n, diff);
        let rn = e.get_reg(n);
        e.cmp_gt(rn, tmp0)
    };
    let step_add = move |e: &mut Sh4Emitter, tmp2: crate::ir::Operand, tmp0: crate::ir::Operand| {
        let rn = e.get_reg(n);
        let sum = e.add(rn, tmp2);
        e.set_reg(n, sum);
        let rn = e.get_reg(n);
        e.cmp_lt(rn, tmp0)
    };

    let q_from = |e: &mut Sh4Emitter, tmp1: crate::ir::Operand, invert_when_q: bool| {
        let q = e.q();
        let q_clear = e.is_zero(q);
        let t1 = tmp1.clone();
        if invert_when_q {
            e.if_then_else(
                q_clear,
                move |e| e.set_q_if(t1.clone()),
                move |e| {
                    let inv = e.is_zero(tmp1.clone());
                    e.set_q_if(inv);
                },
            );
        } else {
            e.if_then_else(
                q_clear,
                move |e| {
                    let inv = e.is_zero(t1.clone());
                    e.set_q_if(inv);
                },
                move |e| e.set_q_if(tmp1.clone()),
            );
        }
    };

    let old_q_clear = em.is_zero(old_q);
    let (t2a, t0a) = (tmp2.clone(), tmp0.clone());
    em.if_then_else(
        old_q_clear,
        move |e| {
            let m_flag = e.m_flag();
            let m_clear = e.is_zero(m_flag);
            let (t2, t0) = (t2a.clone(), t0a.clone());
            let (t2b, t0b) = (t2a.clone(), t0a.clone());
            e.if_then_else(
                m_clear,
                move |e| {
                    let tmp1 = step_sub(e, t2.clone(), t0.clone());
                    q_from(e, tmp1, true);
                },
                move |e| {
                    let tmp1 = step_add(e, t2b.clone(), t0b.clone());
                    q_from(e, tmp1, false);
                },
            );
        },
        move |e| {
            let m_flag = e.m_flag();
            let m_clear = e.is_zero(m_flag);
            let (t2, t0) = (tmp2.clone(), tmp0.clone());
            let (t2b, t0b) = (tmp2.clone(), tmp0.clone());
            e.if_then_else(
                m_clear,
                move |e| {
                    let tmp1 = step_add(e, t2.clone(), t0.clone());
                    q_from(e, tmp1, true);
                },
                move |e| {
                    let tmp1 = step_sub(e, t2b.clone(), t0b.clone());
                    q_from(e, tmp1, false);
                },
            );
        },
    );

    // T = (Q == M)
    let q = em.q();
    let m_flag = em.m_flag();
    let equal = em.cmp_eq(q, m_flag);
    em.set_t_if(equal);
}

//! Shifts and rotates. Single-bit forms latch the shifted-out bit into T.

use super::Sh4Emitter;

/* shll Rn */
pub fn shll(em: &mut Sh4Emitter) {
    let n = em.op.n();
    let rn = em.get_reg(n);
    let c31 = em.constant(31);
    let msb = em.shr(rn.clone(), c31);
    let one = em.constant(1);
    let result = em.shl(rn, one);
    em.set_t_if(msb);
    em.set_reg(n, result);
}

/* shal Rn — same bit pattern through T as shll */
pub fn shal(em: &mut Sh4Emitter) {
    shll(em);
}

/* shlr Rn */
pub fn shlr(em: &mut Sh4Emitter) {
    let n = em.op.n();
    let rn = em.get_reg(n);
    let one = em.constant(1);
    let lsb = em.and(rn.clone(), one.clone());
    let result = em.shr(rn, one);
    em.set_t_if(lsb);
    em.set_reg(n, result);
}

/* shar Rn */
pub fn shar(em: &mut Sh4Emitter) {
    let n = em.op.n();
    let rn = em.get_reg(n);
    let one = em.constant(1);
    let lsb = em.and(rn.clone(), one.clone());
    let result = em.sar(rn, one);
    em.set_t_if(lsb);
    em.set_reg(n, result);
}

/* rotl Rn */
pub fn rotl(em: &mut Sh4Emitter) {
    let n = em.op.n();
    let rn = em.get_reg(n);
    let c31 = em.constant(31);
    let msb = em.shr(rn.clone(), c31);
    let one = em.constant(1);
    let result = em.rol(rn, one);
    em.set_t_if(msb);
    em.set_reg(n, result);
}

/* rotr Rn */
pub fn rotr(em: &mut Sh4Emitter) {
    let n = em.op.n();
    let rn = em.get_reg(n);
    let one = em.constant(1);
    let lsb = em.and(rn.clone(), one.clone());
    let result = em.ror(rn, one);
    em.set_t_if(lsb);
    em.set_reg(n, result);
}

/* rotcl Rn — rotate through T */
pub fn rotcl(em: &mut Sh4Emitter) {
    let n = em.op.n();
    let t_old = em.t();
    let rn = em.get_reg(n);
    let c31 = em.constant(31);
    let msb = em.shr(rn.clone(), c31);
    let one = em.constant(1);
    let shifted = em.shl(rn, one);
    let result = em.or(shifted, t_old);
    em.set_t_if(msb);
    em.set_reg(n, result);
}

/* rotcr Rn */
pub fn rotcr(em: &mut Sh4Emitter) {
    let n = em.op.n();
    let t_old = em.t();
    let rn = em.get_reg(n);
    let one = em.constant(1);
    let lsb = em.and(rn.clone(), one.clone());
    let shifted = em.shr(rn, one);
    let c31 = em.constant(31);
    let carry_in = em.shl(t_old, c31);
    let result = em.or(shifted, carry_in);
    em.set_t_if(lsb);
    em.set_reg(n, result);
}

/* shad Rm,Rn — arithmetic shift by signed dynamic count */
pub fn shad(em: &mut Sh4Emitter) {
    let n = em.op.n();
    let m = em.op.m();

    let rm = em.get_reg(m);
    let sign_mask = em.constant(0x8000_0000);
    let sgn = em.and(rm, sign_mask);
    let left = em.is_zero(sgn);
    em.if_then_else(
        left,
        move |e| {
            let rm = e.get_reg(m);
            let mask = e.constant(0x1F);
            let amt = e.and(rm, mask);
            let rn = e.get_reg(n);
            let result = e.shl(rn, amt);
            e.set_reg(n, result);
        },
        move |e| {
            let rm = e.get_reg(m);
            let mask = e.constant(0x1F);
            let low = e.and(rm, mask);
            let full = e.is_zero(low);
            e.if_then_else(
                full,
                move |e| {
                    // Shift by 32: the register collapses to its sign fill.
                    let rn = e.get_reg(n);
                    let c31 = e.constant(31);
                    let fill = e.sar(rn, c31);
                    e.set_reg(n, fill);
                },
                move |e| {
                    let rm = e.get_reg(m);
                    let inv = e.not(rm);
                    let mask = e.constant(0x1F);
                    let masked = e.and(inv, mask);
                    let one = e.constant(1);
                    let amt = e.add(masked, one);
                    let rn = e.get_reg(n);
                    let result = e.sar(rn, amt);
                    e.set_reg(n, result);
                },
            );
        },
    );
}

/* shld Rm,Rn — logical shift by signed dynamic count */
pub fn shld(em: &mut Sh4Emitter) {
    let n = em.op.n();
    let m = em.op.m();

    let rm = em.get_reg(m);
    let sign_mask = em.constant(0x8000_0000);
    let sgn = em.and(rm, sign_mask);
    let left = em.is_zero(sgn);
    em.if_then_else(
        left,
        move |e| {
            let rm = e.get_reg(m);
            let mask = e.constant(0x1F);
            let amt = e.and(rm, mask);
            let rn = e.get_reg(n);
            let result = e.shl(rn, amt);
            e.set_reg(n, result);
        },
        move |e| {
            let rm = e.get_reg(m);
            let mask = e.constant(0x1F);
            let low = e.and(rm, mask);
            let full = e.is_zero(low);
            e.if_then_else(
                full,
                move |e| {
                    let zero = e.constant(0);
                    e.set_reg(n, zero);
                },
                move |e| {
                    let rm = e.get_reg(m);
                    let inv = e.not(rm);
                    let mask = e.constant(0x1F);
                    let masked = e.and(inv, mask);
                    let one = e.constant(1);
                    let amt = e.add(masked, one);
                    let rn = e.get_reg(n);
                    let result = e.shr(rn, amt);
                    e.set_reg(n, result);
                },
            );
        },
    );
}

fn shift_fixed(em: &mut Sh4Emitter, amount: u32, right: bool) {
    let n = em.op.n();
    let rn = em.get_reg(n);
    let amt = em.constant(amount);
    let result = if right {
        em.shr(rn, amt)
    } else {
        em.shl(rn, amt)
    };
    em.set_reg(n, result);
}

/* shll2 Rn */
pub fn shll2(em: &mut Sh4Emitter) {
    shift_fixed(em, 2, false);
}
/* shll8 Rn */
pub fn shll8(em: &mut Sh4Emitter) {
    shift_fixed(em, 8, false);
}
/* shll16 Rn */
pub fn shll16(em: &mut Sh4Emitter) {
    shift_fixed(em, 16, false);
}
/* shlr2 Rn */
pub fn shlr2(em: &mut Sh4Emitter) {
    shift_fixed(em, 2, true);
}
/* shlr8 Rn */
pub fn shlr8(em: &mut Sh4Emitter) {
    shift_fixed(em, 8, true);
}
/* shlr16 Rn */
pub fn shlr16(em: &mut Sh4Emitter) {
    shift_fixed(em, 16, true);
}

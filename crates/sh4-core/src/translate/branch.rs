//! Control transfers. The translator has already emitted the delay-slot
//! instruction by the time a delayed branch routine runs, so the not-taken
//! continuation of the delayed conditionals is the address after the slot.

use super::{Sh4Emitter, branch_target_s8, branch_target_s12};
use crate::reg;

/* bf disp8 */
pub fn bf(em: &mut Sh4Emitter) {
    let target = branch_target_s8(em.pc, em.op.simm8());
    let next = em.pc.wrapping_add(2);
    let t = em.t();
    let taken = em.is_zero(t);
    em.if_then_else(
        taken,
        move |e| e.set_pc_const(target),
        move |e| e.set_pc_const(next),
    );
}

/* bt disp8 */
pub fn bt(em: &mut Sh4Emitter) {
    let target = branch_target_s8(em.pc, em.op.simm8());
    let next = em.pc.wrapping_add(2);
    let t = em.t();
    em.if_then_else(
        t,
        move |e| e.set_pc_const(target),
        move |e| e.set_pc_const(next),
    );
}

/* bf/s disp8 */
pub fn bfs(em: &mut Sh4Emitter) {
    let target = branch_target_s8(em.pc, em.op.simm8());
    let next = em.pc.wrapping_add(4);
    let t = em.t();
    let taken = em.is_zero(t);
    em.if_then_else(
        taken,
        move |e| e.set_pc_const(target),
        move |e| e.set_pc_const(next),
    );
}

/* bt/s disp8 */
pub fn bts(em: &mut Sh4Emitter) {
    let target = branch_target_s8(em.pc, em.op.simm8());
    let next = em.pc.wrapping_add(4);
    let t = em.t();
    em.if_then_else(
        t,
        move |e| e.set_pc_const(target),
        move |e| e.set_pc_const(next),
    );
}

/* bra disp12 */
pub fn bra(em: &mut Sh4Emitter) {
    let target = branch_target_s12(em.pc, em.op.simm12());
    em.set_pc_const(target);
}

/* bsr disp12 */
pub fn bsr(em: &mut Sh4Emitter) {
    let target = branch_target_s12(em.pc, em.op.simm12());
    let ret = em.constant(em.pc.wrapping_add(4));
    em.set_reg(reg::PR, ret);
    em.set_pc_const(target);
}

/* braf Rn */
pub fn braf(em: &mut Sh4Emitter) {
    let rn = em.get_reg(em.op.n());
    let base = em.constant(em.pc.wrapping_add(4));
    let target = em.add(rn, base);
    em.set_reg(reg::PC, target);
}

/* bsrf Rn */
pub fn bsrf(em: &mut Sh4Emitter) {
    let ret = em.constant(em.pc.wrapping_add(4));
    em.set_reg(reg::PR, ret.clone());
    let rn = em.get_reg(em.op.n());
    let target = em.add(rn, ret);
    em.set_reg(reg::PC, target);
}

/* jmp @Rn */
pub fn jmp(em: &mut Sh4Emitter) {
    let rn = em.get_reg(em.op.n());
    em.set_reg(reg::PC, rn);
}

/* jsr @Rn */
pub fn jsr(em: &mut Sh4Emitter) {
    let ret = em.constant(em.pc.wrapping_add(4));
    em.set_reg(reg::PR, ret);
    let rn = em.get_reg(em.op.n());
    em.set_reg(reg::PC, rn);
}

/* rts */
pub fn rts(em: &mut Sh4Emitter) {
    let pr = em.pr();
    em.set_reg(reg::PC, pr);
}

//! T-flag comparisons. cmp/hs and cmp/hi are the unsigned pair, cmp/ge and
//! cmp/gt the signed one; the IR keeps that split explicit.

use super::Sh4Emitter;

/* cmp/eq #imm8,R0 */
pub fn cmp_eq_i(em: &mut Sh4Emitter) {
    let r0 = em.get_reg(0);
    let imm = em.constant_i(em.op.simm8());
    let cond = em.cmp_eq(r0, imm);
    em.set_t_if(cond);
}

/* cmp/eq Rm,Rn */
pub fn cmp_eq(em: &mut Sh4Emitter) {
    let rm = em.get_reg(em.op.m());
    let rn = em.get_reg(em.op.n());
    let cond = em.cmp_eq(rn, rm);
    em.set_t_if(cond);
}

/* cmp/hs Rm,Rn */
pub fn cmp_hs(em: &mut Sh4Emitter) {
    let rm = em.get_reg(em.op.m());
    let rn = em.get_reg(em.op.n());
    let cond = em.cmp_ge(rn, rm);
    em.set_t_if(cond);
}

/* cmp/ge Rm,Rn */
pub fn cmp_ge(em: &mut Sh4Emitter) {
    let rm = em.get_reg(em.op.m());
    let rn = em.get_reg(em.op.n());
    let cond = em.cmp_ge_signed(rn, rm);
    em.set_t_if(cond);
}

/* cmp/hi Rm,Rn */
pub fn cmp_hi(em: &mut Sh4Emitter) {
    let rm = em.get_reg(em.op.m());
    let rn = em.get_reg(em.op.n());
    let cond = em.cmp_gt(rn, rm);
    em.set_t_if(cond);
}

/* cmp/gt Rm,Rn */
pub fn cmp_gt(em: &mut Sh4Emitter) {
    let rm = em.get_reg(em.op.m());
    let rn = em.get_reg(em.op.n());
    let cond = em.cmp_gt_signed(rn, rm);
    em.set_t_if(cond);
}

/* cmp/pz Rn */
pub fn cmp_pz(em: &mut Sh4Emitter) {
    let rn = em.get_reg(em.op.n());
    let zero = em.constant(0);
    let cond = em.cmp_ge_signed(rn, zero);
    em.set_t_if(cond);
}

/* cmp/pl Rn */
pub fn cmp_pl(em: &mut Sh4Emitter) {
    let rn = em.get_reg(em.op.n());
    let zero = em.constant(0);
    let cond = em.cmp_gt_signed(rn, zero);
    em.set_t_if(cond);
}

/* cmp/str Rm,Rn — T set when any byte lane matches */
pub fn cmp_str(em: &mut Sh4Emitter) {
    let rm = em.get_reg(em.op.m());
    let rn = em.get_reg(em.op.n());
    let diff = em.xor(rn, rm);

    let mut any: Option<crate::ir::Operand> = None;
    for mask in [0xFF00_0000u32, 0x00FF_0000, 0x0000_FF00, 0x0000_00FF] {
        let m = em.constant(mask);
        let lane = em.and(diff.clone(), m);
        let eq = em.is_zero(lane);
        any = Some(match any {
            Some(prev) => em.or(prev, eq),
            None => eq,
        });
    }
    em.set_t_if(any.unwrap());
}

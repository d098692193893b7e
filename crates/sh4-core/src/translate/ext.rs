use super::Sh4Emitter;

/* exts.b Rm,Rn */
pub fn exts_b(em: &mut Sh4Emitter) {
    let rm = em.get_reg(em.op.m());
    let result = em.sign_ext8(rm);
    em.set_reg(em.op.n(), result);
}

/* exts.w Rm,Rn */
pub fn exts_w(em: &mut Sh4Emitter) {
    let rm = em.get_reg(em.op.m());
    let result = em.sign_ext16(rm);
    em.set_reg(em.op.n(), result);
}

/* extu.b Rm,Rn */
pub fn extu_b(em: &mut Sh4Emitter) {
    let rm = em.get_reg(em.op.m());
    let result = em.zero_ext8(rm);
    em.set_reg(em.op.n(), result);
}

/* extu.w Rm,Rn */
pub fn extu_w(em: &mut Sh4Emitter) {
    let rm = em.get_reg(em.op.m());
    let result = em.zero_ext16(rm);
    em.set_reg(em.op.n(), result);
}

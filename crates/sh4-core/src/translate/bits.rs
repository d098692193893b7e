//! Logic ops, including the read-modify-write @(R0,GBR) byte forms and tas.

use super::Sh4Emitter;
use crate::ir::Width;

/* and Rm,Rn */
pub fn and(em: &mut Sh4Emitter) {
    let rm = em.get_reg(em.op.m());
    let rn = em.get_reg(em.op.n());
    let result = em.and(rn, rm);
    em.set_reg(em.op.n(), result);
}

/* and #imm8,R0 */
pub fn and_i(em: &mut Sh4Emitter) {
    let r0 = em.get_reg(0);
    let imm = em.constant(em.op.imm8());
    let result = em.and(r0, imm);
    em.set_reg(0, result);
}

/* or Rm,Rn */
pub fn or(em: &mut Sh4Emitter) {
    let rm = em.get_reg(em.op.m());
    let rn = em.get_reg(em.op.n());
    let result = em.or(rn, rm);
    em.set_reg(em.op.n(), result);
}

/* or #imm8,R0 */
pub fn or_i(em: &mut Sh4Emitter) {
    let r0 = em.get_reg(0);
    let imm = em.constant(em.op.imm8());
    let result = em.or(r0, imm);
    em.set_reg(0, result);
}

/* xor Rm,Rn */
pub fn xor(em: &mut Sh4Emitter) {
    let rm = em.get_reg(em.op.m());
    let rn = em.get_reg(em.op.n());
    let result = em.xor(rn, rm);
    em.set_reg(em.op.n(), result);
}

/* xor #imm8,R0 */
pub fn xor_i(em: &mut Sh4Emitter) {
    let r0 = em.get_reg(0);
    let imm = em.constant(em.op.imm8());
    let result = em.xor(r0, imm);
    em.set_reg(0, result);
}

/* not Rm,Rn */
pub fn not(em: &mut Sh4Emitter) {
    let rm = em.get_reg(em.op.m());
    let result = em.not(rm);
    em.set_reg(em.op.n(), result);
}

/* tst Rm,Rn */
pub fn tst(em: &mut Sh4Emitter) {
    let rm = em.get_reg(em.op.m());
    let rn = em.get_reg(em.op.n());
    let masked = em.and(rn, rm);
    let zero = em.is_zero(masked);
    em.set_t_if(zero);
}

/* tst #imm8,R0 */
pub fn tst_i(em: &mut Sh4Emitter) {
    let r0 = em.get_reg(0);
    let imm = em.constant(em.op.imm8());
    let masked = em.and(r0, imm);
    let zero = em.is_zero(masked);
    em.set_t_if(zero);
}

fn gbr_byte_ea(em: &mut Sh4Emitter) -> crate::ir::Operand {
    let gbr = em.gbr();
    let r0 = em.get_reg(0);
    let addr = em.add(gbr, r0);
    em.mem(addr, Width::Byte)
}

/* tst.b #imm8,@(R0,GBR) */
pub fn tst_b(em: &mut Sh4Emitter) {
    let ea = gbr_byte_ea(em);
    let data = em.load(ea);
    let imm = em.constant(em.op.imm8());
    let masked = em.and(data, imm);
    let zero = em.is_zero(masked);
    em.set_t_if(zero);
}

/* and.b #imm8,@(R0,GBR) */
pub fn and_b(em: &mut Sh4Emitter) {
    let ea = gbr_byte_ea(em);
    let data = em.load(ea.clone());
    let imm = em.constant(em.op.imm8());
    let result = em.and(data, imm);
    em.store(ea, result);
}

/* or.b #imm8,@(R0,GBR) */
pub fn or_b(em: &mut Sh4Emitter) {
    let ea = gbr_byte_ea(em);
    let data = em.load(ea.clone());
    let imm = em.constant(em.op.imm8());
    let result = em.or(data, imm);
    em.store(ea, result);
}

/* xor.b #imm8,@(R0,GBR) */
pub fn xor_b(em: &mut Sh4Emitter) {
    let ea = gbr_byte_ea(em);
    let data = em.load(ea.clone());
    let imm = em.constant(em.op.imm8());
    let result = em.xor(data, imm);
    em.store(ea, result);
}

/* tas.b @Rn */
pub fn tas(em: &mut Sh4Emitter) {
    let rn = em.get_reg(em.op.n());
    let ea = em.mem(rn, Width::Byte);
    let data = em.load(ea.clone());
    let zero = em.is_zero(data.clone());
    em.set_t_if(zero);
    let bit = em.constant(0x80);
    let result = em.or(data, bit);
    em.store(ea, result);
}

//! MOV in all its addressing modes, plus the byte/word shuffles.

use super::Sh4Emitter;
use super::data_target_s8;
use crate::ir::Width;

/* mov #imm8,Rn */
pub fn mov_i(em: &mut Sh4Emitter) {
    let imm = em.constant_i(em.op.simm8());
    em.set_reg(em.op.n(), imm);
}

/* mov.w @(disp8,PC),Rn */
pub fn mov_wi(em: &mut Sh4Emitter) {
    let ea = em.pc.wrapping_add(4).wrapping_add(em.op.imm8() * 2);
    let addr = em.constant(ea);
    let ea_op = em.mem(addr, Width::Word);
    let data = em.load(ea_op);
    let data = em.sign_ext16(data);
    em.set_reg(em.op.n(), data);
}

/* mov.l @(disp8,PC),Rn */
pub fn mov_li(em: &mut Sh4Emitter) {
    let ea = data_target_s8(em.pc, em.op.imm8());
    let addr = em.constant(ea);
    let ea_op = em.mem(addr, Width::Dword);
    let data = em.load(ea_op);
    em.set_reg(em.op.n(), data);
}

/* mov Rm,Rn */
pub fn mov(em: &mut Sh4Emitter) {
    let src = em.get_reg(em.op.m());
    em.set_reg(em.op.n(), src);
}

/* mov.b Rm,@Rn */
pub fn mov_bs(em: &mut Sh4Emitter) {
    let value = em.get_reg(em.op.m());
    let addr = em.get_reg(em.op.n());
    let ea = em.mem(addr, Width::Byte);
    em.store(ea, value);
}

/* mov.w Rm,@Rn */
pub fn mov_ws(em: &mut Sh4Emitter) {
    let value = em.get_reg(em.op.m());
    let addr = em.get_reg(em.op.n());
    let ea = em.mem(addr, Width::Word);
    em.store(ea, value);
}

/* mov.l Rm,@Rn */
pub fn mov_ls(em: &mut Sh4Emitter) {
    let value = em.get_reg(em.op.m());
    let addr = em.get_reg(em.op.n());
    let ea = em.mem(addr, Width::Dword);
    em.store(ea, value);
}

/* mov.b @Rm,Rn */
pub fn mov_bl(em: &mut Sh4Emitter) {
    let addr = em.get_reg(em.op.m());
    let ea = em.mem(addr, Width::Byte);
    let data = em.load(ea);
    let data = em.sign_ext8(data);
    em.set_reg(em.op.n(), data);
}

/* mov.w @Rm,Rn */
pub fn mov_wl(em: &mut Sh4Emitter) {
    let addr = em.get_reg(em.op.m());
    let ea = em.mem(addr, Width::Word);
    let data = em.load(ea);
    let data = em.sign_ext16(data);
    em.set_reg(em.op.n(), data);
}

/* mov.l @Rm,Rn */
pub fn mov_ll(em: &mut Sh4Emitter) {
    let addr = em.get_reg(em.op.m());
    let ea = em.mem(addr, Width::Dword);
    let data = em.load(ea);
    em.set_reg(em.op.n(), data);
}

fn store_predec(em: &mut Sh4Emitter, size: u32, width: Width) {
    let value = em.get_reg(em.op.m());
    let rn = em.get_reg(em.op.n());
    let dec = em.constant(size);
    let addr = em.sub(rn, dec);
    let ea = em.mem(addr.clone(), width);
    em.store(ea, value);
    em.set_reg(em.op.n(), addr);
}

/* mov.b Rm,@-Rn */
pub fn mov_bm(em: &mut Sh4Emitter) {
    store_predec(em, 1, Width::Byte);
}

/* mov.w Rm,@-Rn */
pub fn mov_wm(em: &mut Sh4Emitter) {
    store_predec(em, 2, Width::Word);
}

/* mov.l Rm,@-Rn */
pub fn mov_lm(em: &mut Sh4Emitter) {
    store_predec(em, 4, Width::Dword);
}

fn load_postinc(em: &mut Sh4Emitter, size: u32, width: Width, sign: bool) {
    let rm = em.get_reg(em.op.m());
    let ea = em.mem(rm.clone(), width);
    let data = em.load(ea);
    let data = if sign {
        match width {
            Width::Byte => em.sign_ext8(data),
            Width::Word => em.sign_ext16(data),
            _ => data,
        }
    } else {
        data
    };
    em.set_reg(em.op.n(), data);
    // When Rm is also the destination the loaded value wins.
    if em.op.m() != em.op.n() {
        let inc = em.constant(size);
        let next = em.add(rm, inc);
        em.set_reg(em.op.m(), next);
    }
}

/* mov.b @Rm+,Rn */
pub fn mov_bp(em: &mut Sh4Emitter) {
    load_postinc(em, 1, Width::Byte, true);
}

/* mov.w @Rm+,Rn */
pub fn mov_wp(em: &mut Sh4Emitter) {
    load_postinc(em, 2, Width::Word, true);
}

/* mov.l @Rm+,Rn */
pub fn mov_lp(em: &mut Sh4Emitter) {
    load_postinc(em, 4, Width::Dword, false);
}

/* mov.b R0,@(disp4,Rn) */
pub fn mov_bs4(em: &mut Sh4Emitter) {
    let base = em.get_reg(em.op.m());
    let disp = em.constant(em.op.imm4());
    let addr = em.add(base, disp);
    let ea = em.mem(addr, Width::Byte);
    let r0 = em.get_reg(0);
    em.store(ea, r0);
}

/* mov.w R0,@(disp4,Rn) */
pub fn mov_ws4(em: &mut Sh4Emitter) {
    let base = em.get_reg(em.op.m());
    let disp = em.constant(em.op.imm4() * 2);
    let addr = em.add(base, disp);
    let ea = em.mem(addr, Width::Word);
    let r0 = em.get_reg(0);
    em.store(ea, r0);
}

/* mov.l Rm,@(disp4,Rn) */
pub fn mov_ls4(em: &mut Sh4Emitter) {
    let base = em.get_reg(em.op.n());
    let disp = em.constant(em.op.imm4() * 4);
    let addr = em.add(base, disp);
    let ea = em.mem(addr, Width::Dword);
    let value = em.get_reg(em.op.m());
    em.store(ea, value);
}

/* mov.b @(disp4,Rm),R0 */
pub fn mov_bl4(em: &mut Sh4Emitter) {
    let base = em.get_reg(em.op.m());
    let disp = em.constant(em.op.imm4());
    let addr = em.add(base, disp);
    let ea = em.mem(addr, Width::Byte);
    let data = em.load(ea);
    let data = em.sign_ext8(data);
    em.set_reg(0, data);
}

/* mov.w @(disp4,Rm),R0 */
pub fn mov_wl4(em: &mut Sh4Emitter) {
    let base = em.get_reg(em.op.m());
    let disp = em.constant(em.op.imm4() * 2);
    let addr = em.add(base, disp);
    let ea = em.mem(addr, Width::Word);
    let data = em.load(ea);
    let data = em.sign_ext16(data);
    em.set_reg(0, data);
}

/* mov.l @(disp4,Rm),Rn */
pub fn mov_ll4(em: &mut Sh4Emitter) {
    let base = em.get_reg(em.op.m());
    let disp = em.constant(em.op.imm4() * 4);
    let addr = em.add(base, disp);
    let ea = em.mem(addr, Width::Dword);
    let data = em.load(ea);
    em.set_reg(em.op.n(), data);
}

/* mov.b Rm,@(R0,Rn) */
pub fn mov_bs0(em: &mut Sh4Emitter) {
    let base = em.get_reg(em.op.n());
    let r0 = em.get_reg(0);
    let addr = em.add(base, r0);
    let ea = em.mem(addr, Width::Byte);
    let value = em.get_reg(em.op.m());
    em.store(ea, value);
}

/* mov.w Rm,@(R0,Rn) */
pub fn mov_ws0(em: &mut Sh4Emitter) {
    let base = em.get_reg(em.op.n());
    let r0 = em.get_reg(0);
    let addr = em.add(base, r0);
    let ea = em.mem(addr, Width::Word);
    let value = em.get_reg(em.op.m());
    em.store(ea, value);
}

/* mov.l Rm,@(R0,Rn) */
pub fn mov_ls0(em: &mut Sh4Emitter) {
    let base = em.get_reg(em.op.n());
    let r0 = em.get_reg(0);
    let addr = em.add(base, r0);
    let ea = em.mem(addr, Width::Dword);
    let value = em.get_reg(em.op.m());
    em.store(ea, value);
}

/* mov.b @(R0,Rm),Rn */
pub fn mov_bl0(em: &mut Sh4Emitter) {
    let base = em.get_reg(em.op.m());
    let r0 = em.get_reg(0);
    let addr = em.add(base, r0);
    let ea = em.mem(addr, Width::Byte);
    let data = em.load(ea);
    let data = em.sign_ext8(data);
    em.set_reg(em.op.n(), data);
}

/* mov.w @(R0,Rm),Rn */
pub fn mov_wl0(em: &mut Sh4Emitter) {
    let base = em.get_reg(em.op.m());
    let r0 = em.get_reg(0);
    let addr = em.add(base, r0);
    let ea = em.mem(addr, Width::Word);
    let data = em.load(ea);
    let data = em.sign_ext16(data);
    em.set_reg(em.op.n(), data);
}

/* mov.l @(R0,Rm),Rn */
pub fn mov_ll0(em: &mut Sh4Emitter) {
    let base = em.get_reg(em.op.m());
    let r0 = em.get_reg(0);
    let addr = em.add(base, r0);
    let ea = em.mem(addr, Width::Dword);
    let data = em.load(ea);
    em.set_reg(em.op.n(), data);
}

/* mov.b R0,@(disp8,GBR) */
pub fn mov_bsg(em: &mut Sh4Emitter) {
    let gbr = em.gbr();
    let disp = em.constant(em.op.imm8());
    let addr = em.add(gbr, disp);
    let ea = em.mem(addr, Width::Byte);
    let r0 = em.get_reg(0);
    em.store(ea, r0);
}

/* mov.w R0,@(disp8,GBR) */
pub fn mov_wsg(em: &mut Sh4Emitter) {
    let gbr = em.gbr();
    let disp = em.constant(em.op.imm8() * 2);
    let addr = em.add(gbr, disp);
    let ea = em.mem(addr, Width::Word);
    let r0 = em.get_reg(0);
    em.store(ea, r0);
}

/* mov.l R0,@(disp8,GBR) */
pub fn mov_lsg(em: &mut Sh4Emitter) {
    let gbr = em.gbr();
    let disp = em.constant(em.op.imm8() * 4);
    let addr = em.add(gbr, disp);
    let ea = em.mem(addr, Width::Dword);
    let r0 = em.get_reg(0);
    em.store(ea, r0);
}

/* mov.b @(disp8,GBR),R0 */
pub fn mov_blg(em: &mut Sh4Emitter) {
    let gbr = em.gbr();
    let disp = em.constant(em.op.imm8());
    let addr = em.add(gbr, disp);
    let ea = em.mem(addr, Width::Byte);
    let data = em.load(ea);
    let data = em.sign_ext8(data);
    em.set_reg(0, data);
}

/* mov.w @(disp8,GBR),R0 */
pub fn mov_wlg(em: &mut Sh4Emitter) {
    let gbr = em.gbr();
    let disp = em.constant(em.op.imm8() * 2);
    let addr = em.add(gbr, disp);
    let ea = em.mem(addr, Width::Word);
    let data = em.load(ea);
    let data = em.sign_ext16(data);
    em.set_reg(0, data);
}

/* mov.l @(disp8,GBR),R0 */
pub fn mov_llg(em: &mut Sh4Emitter) {
    let gbr = em.gbr();
    let disp = em.constant(em.op.imm8() * 4);
    let addr = em.add(gbr, disp);
    let ea = em.mem(addr, Width::Dword);
    let data = em.load(ea);
    em.set_reg(0, data);
}

/* mova @(disp8,PC),R0 */
pub fn mova(em: &mut Sh4Emitter) {
    let ea = data_target_s8(em.pc, em.op.imm8());
    let c = em.constant(ea);
    em.set_reg(0, c);
}

/* movt Rn */
pub fn movt(em: &mut Sh4Emitter) {
    let t = em.t();
    em.set_reg(em.op.n(), t);
}

/* swap.b Rm,Rn */
pub fn swap_b(em: &mut Sh4Emitter) {
    let rm = em.get_reg(em.op.m());
    let hi_mask = em.constant(0xFFFF_0000);
    let high = em.and(rm.clone(), hi_mask);
    let lo_mask = em.constant(0xFF);
    let low = em.and(rm.clone(), lo_mask);
    let eight = em.constant(8);
    let upper = em.shl(low, eight.clone());
    let mid_mask = em.constant(0xFF00);
    let mid = em.and(rm, mid_mask);
    let lower = em.shr(mid, eight);
    let swapped = em.or(upper, lower);
    let result = em.or(high, swapped);
    em.set_reg(em.op.n(), result);
}

/* swap.w Rm,Rn */
pub fn swap_w(em: &mut Sh4Emitter) {
    let rm = em.get_reg(em.op.m());
    let sixteen = em.constant(16);
    let upper = em.shl(rm.clone(), sixteen.clone());
    let lower = em.shr(rm, sixteen);
    let result = em.or(upper, lower);
    em.set_reg(em.op.n(), result);
}

/* xtrct Rm,Rn */
pub fn xtrct(em: &mut Sh4Emitter) {
    let rn = em.get_reg(em.op.n());
    let rm = em.get_reg(em.op.m());
    let sixteen = em.constant(16);
    let low = em.shr(rn, sixteen.clone());
    let low_mask = em.constant(0xFFFF);
    let low = em.and(low, low_mask);
    let high = em.shl(rm, sixteen);
    let high_mask = em.constant(0xFFFF_0000);
    let high = em.and(high, high_mask);
    let result = em.or(low, high);
    em.set_reg(em.op.n(), result);
}

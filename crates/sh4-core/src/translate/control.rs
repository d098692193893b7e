//! Control-register transfers: ldc/stc/lds/sts and their post-increment /
//! pre-decrement memory forms.

use super::Sh4Emitter;
use crate::ir::Width;
use crate::reg;

// Writable SR bits: MD, RB, BL, FD, M, Q, IMASK, S, T.
const SR_MASK: u32 = 0x700083F3;

fn ldc(em: &mut Sh4Emitter, cr: u8) {
    let rn = em.get_reg(em.op.n());
    em.set_reg(cr, rn);
}

fn stc(em: &mut Sh4Emitter, cr: u8) {
    let src = em.get_reg(cr);
    em.set_reg(em.op.n(), src);
}

/// ldc.l @Rn+,<cr>
fn ldc_mem(em: &mut Sh4Emitter, cr: u8, mask: Option<u32>) {
    let n = em.op.n();
    let rn = em.get_reg(n);
    let ea = em.mem(rn, Width::Dword);
    let data = em.load(ea);
    let data = match mask {
        Some(mask) => {
            let m = em.constant(mask);
            em.and(data, m)
        }
        None => data,
    };
    em.set_reg(cr, data);
    let rn = em.get_reg(n);
    let four = em.constant(4);
    let next = em.add(rn, four);
    em.set_reg(n, next);
}

/// stc.l <cr>,@-Rn
fn stc_mem(em: &mut Sh4Emitter, cr: u8) {
    let n = em.op.n();
    let rn = em.get_reg(n);
    let four = em.constant(4);
    let addr = em.sub(rn, four);
    em.set_reg(n, addr.clone());
    let ea = em.mem(addr, Width::Dword);
    let src = em.get_reg(cr);
    em.store(ea, src);
}

/* ldc Rn,SR */
pub fn ldc_sr(em: &mut Sh4Emitter) {
    let rn = em.get_reg(em.op.n());
    let mask = em.constant(SR_MASK);
    let masked = em.and(rn, mask);
    em.set_reg(reg::SR, masked);
}

/* stc SR,Rn */
pub fn stc_sr(em: &mut Sh4Emitter) {
    stc(em, reg::SR);
}

/* ldc Rn,GBR */
pub fn ldc_gbr(em: &mut Sh4Emitter) {
    ldc(em, reg::GBR);
}

/* stc GBR,Rn */
pub fn stc_gbr(em: &mut Sh4Emitter) {
    stc(em, reg::GBR);
}

/* ldc Rn,VBR */
pub fn ldc_vbr(em: &mut Sh4Emitter) {
    ldc(em, reg::VBR);
}

/* stc VBR,Rn */
pub fn stc_vbr(em: &mut Sh4Emitter) {
    stc(em, reg::VBR);
}

/* ldc Rn,SSR */
pub fn ldc_ssr(em: &mut Sh4Emitter) {
    ldc(em, reg::SSR);
}

/* stc SSR,Rn */
pub fn stc_ssr(em: &mut Sh4Emitter) {
    stc(em, reg::SSR);
}

/* ldc Rn,SPC */
pub fn ldc_spc(em: &mut Sh4Emitter) {
    ldc(em, reg::SPC);
}

/* stc SPC,Rn */
pub fn stc_spc(em: &mut Sh4Emitter) {
    stc(em, reg::SPC);
}

/* stc SGR,Rn */
pub fn stc_sgr(em: &mut Sh4Emitter) {
    stc(em, reg::SGR);
}

/* ldc Rn,DBR */
pub fn ldc_dbr(em: &mut Sh4Emitter) {
    ldc(em, reg::DBR);
}

/* stc DBR,Rn */
pub fn stc_dbr(em: &mut Sh4Emitter) {
    stc(em, reg::DBR);
}

/* ldc Rn,Rm_BANK */
pub fn ldc_rbank(em: &mut Sh4Emitter) {
    let bank = em.op.m() & 7;
    let rn = em.get_reg(em.op.n());
    let dst = em.banked_reg(bank);
    em.copy(rn, dst);
}

/* stc Rm_BANK,Rn */
pub fn stc_rbank(em: &mut Sh4Emitter) {
    let bank = em.op.m() & 7;
    let src = em.banked_reg(bank);
    em.set_reg(em.op.n(), src);
}

/* ldc.l @Rn+,SR */
pub fn ldcm_sr(em: &mut Sh4Emitter) {
    ldc_mem(em, reg::SR, Some(SR_MASK));
}

/* stc.l SR,@-Rn */
pub fn stcm_sr(em: &mut Sh4Emitter) {
    stc_mem(em, reg::SR);
}

/* ldc.l @Rn+,GBR */
pub fn ldcm_gbr(em: &mut Sh4Emitter) {
    ldc_mem(em, reg::GBR, None);
}

/* stc.l GBR,@-Rn */
pub fn stcm_gbr(em: &mut Sh4Emitter) {
    stc_mem(em, reg::GBR);
}

/* ldc.l @Rn+,VBR */
pub fn ldcm_vbr(em: &mut Sh4Emitter) {
    ldc_mem(em, reg::VBR, None);
}

/* stc.l VBR,@-Rn */
pub fn stcm_vbr(em: &mut Sh4Emitter) {
    stc_mem(em, reg::VBR);
}

/* ldc.l @Rn+,SSR */
pub fn ldcm_ssr(em: &mut Sh4Emitter) {
    ldc_mem(em, reg::SSR, None);
}

/* stc.l SSR,@-Rn */
pub fn stcm_ssr(em: &mut Sh4Emitter) {
    stc_mem(em, reg::SSR);
}

/* ldc.l @Rn+,SPC */
pub fn ldcm_spc(em: &mut Sh4Emitter) {
    ldc_mem(em, reg::SPC, None);
}

/* stc.l SPC,@-Rn */
pub fn stcm_spc(em: &mut Sh4Emitter) {
    stc_mem(em, reg::SPC);
}

/* stc.l SGR,@-Rn */
pub fn stcm_sgr(em: &mut Sh4Emitter) {
    stc_mem(em, reg::SGR);
}

/* ldc.l @Rn+,DBR */
pub fn ldcm_dbr(em: &mut Sh4Emitter) {
    ldc_mem(em, reg::DBR, None);
}

/* stc.l DBR,@-Rn */
pub fn stcm_dbr(em: &mut Sh4Emitter) {
    stc_mem(em, reg::DBR);
}

/* ldc.l @Rn+,Rm_BANK */
pub fn ldcm_rbank(em: &mut Sh4Emitter) {
    let bank = em.op.m() & 7;
    ldc_mem(em, reg::BANK0 + bank, None);
}

/* stc.l Rm_BANK,@-Rn */
pub fn stcm_rbank(em: &mut Sh4Emitter) {
    let bank = em.op.m() & 7;
    stc_mem(em, reg::BANK0 + bank);
}

/* lds Rn,MACH */
pub fn lds_mach(em: &mut Sh4Emitter) {
    ldc(em, reg::MACH);
}

/* sts MACH,Rn */
pub fn sts_mach(em: &mut Sh4Emitter) {
    stc(em, reg::MACH);
}

/* lds Rn,MACL */
pub fn lds_macl(em: &mut Sh4Emitter) {
    ldc(em, reg::MACL);
}

/* sts MACL,Rn */
pub fn sts_macl(em: &mut Sh4Emitter) {
    stc(em, reg::MACL);
}

/* lds Rn,PR */
pub fn lds_pr(em: &mut Sh4Emitter) {
    ldc(em, reg::PR);
}

/* sts PR,Rn */
pub fn sts_pr(em: &mut Sh4Emitter) {
    stc(em, reg::PR);
}

/* lds.l @Rn+,MACH */
pub fn ldsm_mach(em: &mut Sh4Emitter) {
    ldc_mem(em, reg::MACH, None);
}

/* sts.l MACH,@-Rn */
pub fn stsm_mach(em: &mut Sh4Emitter) {
    stc_mem(em, reg::MACH);
}

/* lds.l @Rn+,MACL */
pub fn ldsm_macl(em: &mut Sh4Emitter) {
    ldc_mem(em, reg::MACL, None);
}

/* sts.l MACL,@-Rn */
pub fn stsm_macl(em: &mut Sh4Emitter) {
    stc_mem(em, reg::MACL);
}

/* lds.l @Rn+,PR */
pub fn ldsm_pr(em: &mut Sh4Emitter) {
    ldc_mem(em, reg::PR, None);
}

/* sts.l PR,@-Rn */
pub fn stsm_pr(em: &mut Sh4Emitter) {
    stc_mem(em, reg::PR);
}

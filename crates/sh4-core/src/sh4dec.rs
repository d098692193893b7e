//! Guest opcode decode table: bit-pattern rows expanded once into a 65536
//! entry lookup. The table is built explicitly and shared read-only, so
//! several independent cores can coexist.

use crate::translate as t;
use crate::translate::Sh4Emitter;

pub type EmitFn = fn(&mut Sh4Emitter);

const BRANCH: u8 = 1;
const DELAYED: u8 = 2;

pub struct OpEntry {
    pub pattern: &'static str,
    pub diss: &'static str,
    pub emit: Option<EmitFn>,
    flags: u8,
}

impl OpEntry {
    pub fn is_branch(&self) -> bool {
        self.flags & BRANCH != 0
    }

    pub fn is_delayed(&self) -> bool {
        self.flags & DELAYED != 0
    }

    pub fn mnemonic(&self) -> &'static str {
        self.diss.split_whitespace().next().unwrap_or(self.diss)
    }
}

const fn op(pattern: &'static str, diss: &'static str, emit: Option<EmitFn>, flags: u8) -> OpEntry {
    OpEntry {
        pattern,
        diss,
        emit,
        flags,
    }
}

/// Parses a row pattern ('0'/'1' are fixed bits, letters are operand
/// fields) into a (mask, key) pair.
fn parse_pattern(pattern: &str) -> (u16, u16) {
    debug_assert_eq!(pattern.len(), 16);
    let mut mask = 0u16;
    let mut key = 0u16;
    for c in pattern.bytes() {
        mask <<= 1;
        key <<= 1;
        match c {
            b'0' => mask |= 1,
            b'1' => {
                mask |= 1;
                key |= 1;
            }
            _ => {}
        }
    }
    (mask, key)
}

#[rustfmt::skip]
static OPCODES: &[OpEntry] = &[
    // Data transfer
    op("1110nnnniiiiiiii", "mov #<simm8>,<REG_N>",            Some(t::data::mov_i), 0),
    op("1001nnnndddddddd", "mov.w @(<disp8>,PC),<REG_N>",     Some(t::data::mov_wi), 0),
    op("1101nnnndddddddd", "mov.l @(<disp8>,PC),<REG_N>",     Some(t::data::mov_li), 0),
    op("0110nnnnmmmm0011", "mov <REG_M>,<REG_N>",             Some(t::data::mov), 0),
    op("0010nnnnmmmm0000", "mov.b <REG_M>,@<REG_N>",          Some(t::data::mov_bs), 0),
    op("0010nnnnmmmm0001", "mov.w <REG_M>,@<REG_N>",          Some(t::data::mov_ws), 0),
    op("0010nnnnmmmm0010", "mov.l <REG_M>,@<REG_N>",          Some(t::data::mov_ls), 0),
    op("0110nnnnmmmm0000", "mov.b @<REG_M>,<REG_N>",          Some(t::data::mov_bl), 0),
    op("0110nnnnmmmm0001", "mov.w @<REG_M>,<REG_N>",          Some(t::data::mov_wl), 0),
    op("0110nnnnmmmm0010", "mov.l @<REG_M>,<REG_N>",          Some(t::data::mov_ll), 0),
    op("0010nnnnmmmm0100", "mov.b <REG_M>,@-<REG_N>",         Some(t::data::mov_bm), 0),
    op("0010nnnnmmmm0101", "mov.w <REG_M>,@-<REG_N>",         Some(t::data::mov_wm), 0),
    op("0010nnnnmmmm0110", "mov.l <REG_M>,@-<REG_N>",         Some(t::data::mov_lm), 0),
    op("0110nnnnmmmm0100", "mov.b @<REG_M>+,<REG_N>",         Some(t::data::mov_bp), 0),
    op("0110nnnnmmmm0101", "mov.w @<REG_M>+,<REG_N>",         Some(t::data::mov_wp), 0),
    op("0110nnnnmmmm0110", "mov.l @<REG_M>+,<REG_N>",         Some(t::data::mov_lp), 0),
    op("10000000nnnndddd", "mov.b R0,@(<disp4>,<REG_M>)",     Some(t::data::mov_bs4), 0),
    op("10000001nnnndddd", "mov.w R0,@(<disp4>,<REG_M>)",     Some(t::data::mov_ws4), 0),
    op("0001nnnnmmmmdddd", "mov.l <REG_M>,@(<disp4>,<REG_N>)", Some(t::data::mov_ls4), 0),
    op("10000100mmmmdddd", "mov.b @(<disp4>,<REG_M>),R0",     Some(t::data::mov_bl4), 0),
    op("10000101mmmmdddd", "mov.w @(<disp4>,<REG_M>),R0",     Some(t::data::mov_wl4), 0),
    op("0101nnnnmmmmdddd", "mov.l @(<disp4>,<REG_M>),<REG_N>", Some(t::data::mov_ll4), 0),
    op("0000nnnnmmmm0100", "mov.b <REG_M>,@(R0,<REG_N>)",     Some(t::data::mov_bs0), 0),
    op("0000nnnnmmmm0101", "mov.w <REG_M>,@(R0,<REG_N>)",     Some(t::data::mov_ws0), 0),
    op("0000nnnnmmmm0110", "mov.l <REG_M>,@(R0,<REG_N>)",     Some(t::data::mov_ls0), 0),
    op("0000nnnnmmmm1100", "mov.b @(R0,<REG_M>),<REG_N>",     Some(t::data::mov_bl0), 0),
    op("0000nnnnmmmm1101", "mov.w @(R0,<REG_M>),<REG_N>",     Some(t::data::mov_wl0), 0),
    op("0000nnnnmmmm1110", "mov.l @(R0,<REG_M>),<REG_N>",     Some(t::data::mov_ll0), 0),
    op("11000000dddddddd", "mov.b R0,@(<disp8>,GBR)",         Some(t::data::mov_bsg), 0),
    op("11000001dddddddd", "mov.w R0,@(<disp8>,GBR)",         Some(t::data::mov_wsg), 0),
    op("11000010dddddddd", "mov.l R0,@(<disp8>,GBR)",         Some(t::data::mov_lsg), 0),
    op("11000100dddddddd", "mov.b @(<disp8>,GBR),R0",         Some(t::data::mov_blg), 0),
    op("11000101dddddddd", "mov.w @(<disp8>,GBR),R0",         Some(t::data::mov_wlg), 0),
    op("11000110dddddddd", "mov.l @(<disp8>,GBR),R0",         Some(t::data::mov_llg), 0),
    op("11000111dddddddd", "mova @(<disp8>,PC),R0",           Some(t::data::mova), 0),
    op("0000nnnn00101001", "movt <REG_N>",                    Some(t::data::movt), 0),
    op("0110nnnnmmmm1000", "swap.b <REG_M>,<REG_N>",          Some(t::data::swap_b), 0),
    op("0110nnnnmmmm1001", "swap.w <REG_M>,<REG_N>",          Some(t::data::swap_w), 0),
    op("0010nnnnmmmm1101", "xtrct <REG_M>,<REG_N>",           Some(t::data::xtrct), 0),
    // Arithmetic
    op("0011nnnnmmmm1100", "add <REG_M>,<REG_N>",             Some(t::arith::add), 0),
    op("0111nnnniiiiiiii", "add #<simm8>,<REG_N>",            Some(t::arith::add_i), 0),
    op("0011nnnnmmmm1110", "addc <REG_M>,<REG_N>",            Some(t::arith::addc), 0),
    op("0011nnnnmmmm1111", "addv <REG_M>,<REG_N>",            Some(t::arith::addv), 0),
    op("10001000iiiiiiii", "cmp/eq #<simm8>,R0",              Some(t::cmp::cmp_eq_i), 0),
    op("0011nnnnmmmm0000", "cmp/eq <REG_M>,<REG_N>",          Some(t::cmp::cmp_eq), 0),
    op("0011nnnnmmmm0010", "cmp/hs <REG_M>,<REG_N>",          Some(t::cmp::cmp_hs), 0),
    op("0011nnnnmmmm0011", "cmp/ge <REG_M>,<REG_N>",          Some(t::cmp::cmp_ge), 0),
    op("0011nnnnmmmm0110", "cmp/hi <REG_M>,<REG_N>",          Some(t::cmp::cmp_hi), 0),
    op("0011nnnnmmmm0111", "cmp/gt <REG_M>,<REG_N>",          Some(t::cmp::cmp_gt), 0),
    op("0100nnnn00010001", "cmp/pz <REG_N>",                  Some(t::cmp::cmp_pz), 0),
    op("0100nnnn00010101", "cmp/pl <REG_N>",                  Some(t::cmp::cmp_pl), 0),
    op("0010nnnnmmmm1100", "cmp/str <REG_M>,<REG_N>",         Some(t::cmp::cmp_str), 0),
    op("0010nnnnmmmm0111", "div0s <REG_M>,<REG_N>",           Some(t::arith::div0s), 0),
    op("0000000000011001", "div0u",                           Some(t::arith::div0u), 0),
    op("0011nnnnmmmm0100", "div1 <REG_M>,<REG_N>",            Some(t::arith::div1), 0),
    op("0011nnnnmmmm1101", "dmuls.l <REG_M>,<REG_N>",         None, 0),
    op("0011nnnnmmmm0101", "dmulu.l <REG_M>,<REG_N>",         None, 0),
    op("0100nnnn00010000", "dt <REG_N>",                      Some(t::arith::dt), 0),
    op("0110nnnnmmmm1110", "exts.b <REG_M>,<REG_N>",          Some(t::ext::exts_b), 0),
    op("0110nnnnmmmm1111", "exts.w <REG_M>,<REG_N>",          Some(t::ext::exts_w), 0),
    op("0110nnnnmmmm1100", "extu.b <REG_M>,<REG_N>",          Some(t::ext::extu_b), 0),
    op("0110nnnnmmmm1101", "extu.w <REG_M>,<REG_N>",          Some(t::ext::extu_w), 0),
    op("0000nnnnmmmm1111", "mac.l @<REG_M>+,@<REG_N>+",       None, 0),
    op("0100nnnnmmmm1111", "mac.w @<REG_M>+,@<REG_N>+",       None, 0),
    op("0000nnnnmmmm0111", "mul.l <REG_M>,<REG_N>",           Some(t::arith::mul_l), 0),
    op("0010nnnnmmmm1111", "muls.w <REG_M>,<REG_N>",          Some(t::arith::muls_w), 0),
    op("0010nnnnmmmm1110", "mulu.w <REG_M>,<REG_N>",          Some(t::arith::mulu_w), 0),
    op("0110nnnnmmmm1011", "neg <REG_M>,<REG_N>",             Some(t::arith::neg), 0),
    op("0110nnnnmmmm1010", "negc <REG_M>,<REG_N>",            Some(t::arith::negc), 0),
    op("0011nnnnmmmm1000", "sub <REG_M>,<REG_N>",             Some(t::arith::sub), 0),
    op("0011nnnnmmmm1010", "subc <REG_M>,<REG_N>",            Some(t::arith::subc), 0),
    op("0011nnnnmmmm1011", "subv <REG_M>,<REG_N>",            Some(t::arith::subv), 0),
    // Logic
    op("0010nnnnmmmm1001", "and <REG_M>,<REG_N>",             Some(t::bits::and), 0),
    op("11001001iiiiiiii", "and #<imm8>,R0",                  Some(t::bits::and_i), 0),
    op("11001101iiiiiiii", "and.b #<imm8>,@(R0,GBR)",         Some(t::bits::and_b), 0),
    op("0110nnnnmmmm0111", "not <REG_M>,<REG_N>",             Some(t::bits::not), 0),
    op("0010nnnnmmmm1011", "or <REG_M>,<REG_N>",              Some(t::bits::or), 0),
    op("11001011iiiiiiii", "or #<imm8>,R0",                   Some(t::bits::or_i), 0),
    op("11001111iiiiiiii", "or.b #<imm8>,@(R0,GBR)",          Some(t::bits::or_b), 0),
    op("0100nnnn00011011", "tas.b @<REG_N>",                  Some(t::bits::tas), 0),
    op("0010nnnnmmmm1000", "tst <REG_M>,<REG_N>",             Some(t::bits::tst), 0),
    op("11001000iiiiiiii", "tst #<imm8>,R0",                  Some(t::bits::tst_i), 0),
    op("11001100iiiiiiii", "tst.b #<imm8>,@(R0,GBR)",         Some(t::bits::tst_b), 0),
    op("0010nnnnmmmm1010", "xor <REG_M>,<REG_N>",             Some(t::bits::xor), 0),
    op("11001010iiiiiiii", "xor #<imm8>,R0",                  Some(t::bits::xor_i), 0),
    op("11001110iiiiiiii", "xor.b #<imm8>,@(R0,GBR)",         Some(t::bits::xor_b), 0),
    // Shifts
    op("0100nnnn00000100", "rotl <REG_N>",                    Some(t::shift::rotl), 0),
    op("0100nnnn00000101", "rotr <REG_N>",                    Some(t::shift::rotr), 0),
    op("0100nnnn00100100", "rotcl <REG_N>",                   Some(t::shift::rotcl), 0),
    op("0100nnnn00100101", "rotcr <REG_N>",                   Some(t::shift::rotcr), 0),
    op("0100nnnnmmmm1100", "shad <REG_M>,<REG_N>",            Some(t::shift::shad), 0),
    op("0100nnnn00100000", "shal <REG_N>",                    Some(t::shift::shal), 0),
    op("0100nnnn00100001", "shar <REG_N>",                    Some(t::shift::shar), 0),
    op("0100nnnnmmmm1101", "shld <REG_M>,<REG_N>",            Some(t::shift::shld), 0),
    op("0100nnnn00000000", "shll <REG_N>",                    Some(t::shift::shll), 0),
    op("0100nnnn00000001", "shlr <REG_N>",                    Some(t::shift::shlr), 0),
    op("0100nnnn00001000", "shll2 <REG_N>",                   Some(t::shift::shll2), 0),
    op("0100nnnn00001001", "shlr2 <REG_N>",                   Some(t::shift::shlr2), 0),
    op("0100nnnn00011000", "shll8 <REG_N>",                   Some(t::shift::shll8), 0),
    op("0100nnnn00011001", "shlr8 <REG_N>",                   Some(t::shift::shlr8), 0),
    op("0100nnnn00101000", "shll16 <REG_N>",                  Some(t::shift::shll16), 0),
    op("0100nnnn00101001", "shlr16 <REG_N>",                  Some(t::shift::shlr16), 0),
    // Branches
    op("10001011dddddddd", "bf <bdisp8>",                     Some(t::branch::bf), BRANCH),
    op("10001111dddddddd", "bf/s <bdisp8>",                   Some(t::branch::bfs), BRANCH | DELAYED),
    op("10001001dddddddd", "bt <bdisp8>",                     Some(t::branch::bt), BRANCH),
    op("10001101dddddddd", "bt/s <bdisp8>",                   Some(t::branch::bts), BRANCH | DELAYED),
    op("1010dddddddddddd", "bra <bdisp12>",                   Some(t::branch::bra), BRANCH | DELAYED),
    op("0000nnnn00100011", "braf <REG_N>",                    Some(t::branch::braf), BRANCH | DELAYED),
    op("1011dddddddddddd", "bsr <bdisp12>",                   Some(t::branch::bsr), BRANCH | DELAYED),
    op("0000nnnn00000011", "bsrf <REG_N>",                    Some(t::branch::bsrf), BRANCH | DELAYED),
    op("0100nnnn00101011", "jmp @<REG_N>",                    Some(t::branch::jmp), BRANCH | DELAYED),
    op("0100nnnn00001011", "jsr @<REG_N>",                    Some(t::branch::jsr), BRANCH | DELAYED),
    op("0000000000001011", "rts",                             Some(t::branch::rts), BRANCH | DELAYED),
    op("0000000000101011", "rte",                             None, BRANCH | DELAYED),
    // Flags and system
    op("0000000000101000", "clrmac",                          Some(t::arith::clrmac), 0),
    op("0000000001001000", "clrs",                            Some(t::flags::clrs), 0),
    op("0000000000001000", "clrt",                            Some(t::flags::clrt), 0),
    op("0000000001011000", "sets",                            Some(t::flags::sets), 0),
    op("0000000000011000", "sett",                            Some(t::flags::sett), 0),
    op("0000000000001001", "nop",                             Some(t::flags::nop), 0),
    op("0000000000111000", "ldtlb",                           None, 0),
    op("0000nnnn11000011", "movca.l R0,@<REG_N>",             None, 0),
    op("0000nnnn10010011", "ocbi @<REG_N>",                   None, 0),
    op("0000nnnn10100011", "ocbp @<REG_N>",                   None, 0),
    op("0000nnnn10110011", "ocbwb @<REG_N>",                  None, 0),
    op("0000nnnn10000011", "pref @<REG_N>",                   None, 0),
    op("0000000000011011", "sleep",                           None, 0),
    op("11000011iiiiiiii", "trapa #<imm8>",                   None, 0),
    // Control register transfers
    op("0100mmmm00001110", "ldc <REG_N>,SR",                  Some(t::control::ldc_sr), 0),
    op("0100mmmm00011110", "ldc <REG_N>,GBR",                 Some(t::control::ldc_gbr), 0),
    op("0100mmmm00101110", "ldc <REG_N>,VBR",                 Some(t::control::ldc_vbr), 0),
    op("0100mmmm00111110", "ldc <REG_N>,SSR",                 Some(t::control::ldc_ssr), 0),
    op("0100mmmm01001110", "ldc <REG_N>,SPC",                 Some(t::control::ldc_spc), 0),
    op("0100mmmm11111010", "ldc <REG_N>,DBR",                 Some(t::control::ldc_dbr), 0),
    op("0100mmmm1nnn1110", "ldc <REG_N>,<REG_M_BANK>",        Some(t::control::ldc_rbank), 0),
    op("0100mmmm00000111", "ldc.l @<REG_N>+,SR",              Some(t::control::ldcm_sr), 0),
    op("0100mmmm00010111", "ldc.l @<REG_N>+,GBR",             Some(t::control::ldcm_gbr), 0),
    op("0100mmmm00100111", "ldc.l @<REG_N>+,VBR",             Some(t::control::ldcm_vbr), 0),
    op("0100mmmm00110111", "ldc.l @<REG_N>+,SSR",             Some(t::control::ldcm_ssr), 0),
    op("0100mmmm01000111", "ldc.l @<REG_N>+,SPC",             Some(t::control::ldcm_spc), 0),
    op("0100mmmm11110110", "ldc.l @<REG_N>+,DBR",             Some(t::control::ldcm_dbr), 0),
    op("0100mmmm1nnn0111", "ldc.l @<REG_N>+,<REG_M_BANK>",    Some(t::control::ldcm_rbank), 0),
    op("0100mmmm00001010", "lds <REG_N>,MACH",                Some(t::control::lds_mach), 0),
    op("0100mmmm00011010", "lds <REG_N>,MACL",                Some(t::control::lds_macl), 0),
    op("0100mmmm00101010", "lds <REG_N>,PR",                  Some(t::control::lds_pr), 0),
    op("0100mmmm00000110", "lds.l @<REG_N>+,MACH",            Some(t::control::ldsm_mach), 0),
    op("0100mmmm00010110", "lds.l @<REG_N>+,MACL",            Some(t::control::ldsm_macl), 0),
    op("0100mmmm00100110", "lds.l @<REG_N>+,PR",              Some(t::control::ldsm_pr), 0),
    op("0000nnnn00000010", "stc SR,<REG_N>",                  Some(t::control::stc_sr), 0),
    op("0000nnnn00010010", "stc GBR,<REG_N>",                 Some(t::control::stc_gbr), 0),
    op("0000nnnn00100010", "stc VBR,<REG_N>",                 Some(t::control::stc_vbr), 0),
    op("0000nnnn00110010", "stc SSR,<REG_N>",                 Some(t::control::stc_ssr), 0),
    op("0000nnnn01000010", "stc SPC,<REG_N>",                 Some(t::control::stc_spc), 0),
    op("0000nnnn00111010", "stc SGR,<REG_N>",                 Some(t::control::stc_sgr), 0),
    op("0000nnnn11111010", "stc DBR,<REG_N>",                 Some(t::control::stc_dbr), 0),
    op("0000nnnn1mmm0010", "stc <REG_M_BANK>,<REG_N>",        Some(t::control::stc_rbank), 0),
    op("0100nnnn00000011", "stc.l SR,@-<REG_N>",              Some(t::control::stcm_sr), 0),
    op("0100nnnn00010011", "stc.l GBR,@-<REG_N>",             Some(t::control::stcm_gbr), 0),
    op("0100nnnn00100011", "stc.l VBR,@-<REG_N>",             Some(t::control::stcm_vbr), 0),
    op("0100nnnn00110011", "stc.l SSR,@-<REG_N>",             Some(t::control::stcm_ssr), 0),
    op("0100nnnn01000011", "stc.l SPC,@-<REG_N>",             Some(t::control::stcm_spc), 0),
    op("0100nnnn00110010", "stc.l SGR,@-<REG_N>",             Some(t::control::stcm_sgr), 0),
    op("0100nnnn11110010", "stc.l DBR,@-<REG_N>",             Some(t::control::stcm_dbr), 0),
    op("0100nnnn1mmm0011", "stc.l <REG_M_BANK>,@-<REG_N>",    Some(t::control::stcm_rbank), 0),
    op("0000nnnn00001010", "sts MACH,<REG_N>",                Some(t::control::sts_mach), 0),
    op("0000nnnn00011010", "sts MACL,<REG_N>",                Some(t::control::sts_macl), 0),
    op("0000nnnn00101010", "sts PR,<REG_N>",                  Some(t::control::sts_pr), 0),
    op("0100nnnn00000010", "sts.l MACH,@-<REG_N>",            Some(t::control::stsm_mach), 0),
    op("0100nnnn00010010", "sts.l MACL,@-<REG_N>",            Some(t::control::stsm_macl), 0),
    op("0100nnnn00100010", "sts.l PR,@-<REG_N>",              Some(t::control::stsm_pr), 0),
    // FPU opcodes decode but are intentionally not implemented.
    op("1111nnnn10001101", "fldi0 <FREG_N>",                  None, 0),
    op("1111nnnn10011101", "fldi1 <FREG_N>",                  None, 0),
    op("1111nnnnmmmm1100", "fmov <FREG_M>,<FREG_N>",          None, 0),
    op("1111nnnnmmmm1000", "fmov.s @<REG_M>,<FREG_N>",        None, 0),
    op("1111nnnnmmmm0110", "fmov.s @(R0,<REG_M>),<FREG_N>",   None, 0),
    op("1111nnnnmmmm1010", "fmov.s <FREG_M>,@<REG_N>",        None, 0),
    op("1111nnnnmmmm0111", "fmov.s <FREG_M>,@(R0,<REG_N>)",   None, 0),
    op("1111nnnnmmmm1011", "fmov.s <FREG_M>,@-<REG_N>",       None, 0),
    op("1111nnnnmmmm1001", "fmov.s @<REG_M>+,<FREG_N>",       None, 0),
    op("1111mmmm00011101", "flds <FREG_N>,FPUL",              None, 0),
    op("1111nnnn00001101", "fsts FPUL,<FREG_N>",              None, 0),
    op("1111nnnn01011101", "fabs <FREG_N>",                   None, 0),
    op("1111nnnn01111101", "fsrra <FREG_N>",                  None, 0),
    op("1111nnnnmmmm0000", "fadd <FREG_M>,<FREG_N>",          None, 0),
    op("1111nnnnmmmm0100", "fcmp/eq <FREG_M>,<FREG_N>",       None, 0),
    op("1111nnnnmmmm0101", "fcmp/gt <FREG_M>,<FREG_N>",       None, 0),
    op("1111nnnnmmmm0011", "fdiv <FREG_M>,<FREG_N>",          None, 0),
    op("1111nnnn00101101", "float FPUL,<FREG_N>",             None, 0),
    op("1111nnnnmmmm1110", "fmac FR0,<FREG_M>,<FREG_N>",      None, 0),
    op("1111nnnnmmmm0010", "fmul <FREG_M>,<FREG_N>",          None, 0),
    op("1111nnnn01001101", "fneg <FREG_N>",                   None, 0),
    op("1111nnnn01101101", "fsqrt <FREG_N>",                  None, 0),
    op("1111nnnnmmmm0001", "fsub <FREG_M>,<FREG_N>",          None, 0),
    op("1111mmmm00111101", "ftrc <FREG_N>,FPUL",              None, 0),
    op("1111mmmm10111101", "fcnvds <FREG_N>,FPUL",            None, 0),
    op("1111nnnn10101101", "fcnvsd FPUL,<FREG_N>",            None, 0),
    op("0100mmmm01101010", "lds <REG_N>,FPSCR",               None, 0),
    op("0100mmmm01011010", "lds <REG_N>,FPUL",                None, 0),
    op("0100mmmm01100110", "lds.l @<REG_N>+,FPSCR",           None, 0),
    op("0100mmmm01010110", "lds.l @<REG_N>+,FPUL",            None, 0),
    op("0000nnnn01101010", "sts FPSCR,<REG_N>",               None, 0),
    op("0000nnnn01011010", "sts FPUL,<REG_N>",                None, 0),
    op("0100nnnn01100010", "sts.l FPSCR,@-<REG_N>",           None, 0),
    op("0100nnnn01010010", "sts.l FPUL,@-<REG_N>",            None, 0),
    op("1111nnmm11101101", "fipr FV<M>,FV<N>",                None, 0),
    op("1111nnn011111101", "fsca FPUL,<FREG_N>",              None, 0),
    op("1111nn0111111101", "ftrv XMTRX,FV<N>",                None, 0),
    op("1111101111111101", "frchg",                           None, 0),
    op("1111001111111101", "fschg",                           None, 0),
];

/// 65536-entry decode table. Built once at startup, then shared read-only.
pub struct OpcodeTable {
    lookup: Vec<Option<&'static OpEntry>>,
}

impl Default for OpcodeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl OpcodeTable {
    pub fn new() -> Self {
        let rows: Vec<(u16, u16, &'static OpEntry)> = OPCODES
            .iter()
            .map(|entry| {
                let (mask, key) = parse_pattern(entry.pattern);
                (mask, key, entry)
            })
            .collect();

        let mut lookup: Vec<Option<&'static OpEntry>> = vec![None; 0x1_0000];
        for (opcode, slot) in lookup.iter_mut().enumerate() {
            // First matching row wins.
            for (mask, key, entry) in &rows {
                if (opcode as u16) & mask == *key {
                    *slot = Some(entry);
                    break;
                }
            }
        }
        Self { lookup }
    }

    pub fn entry(&self, opcode: u16) -> Option<&'static OpEntry> {
        self.lookup[opcode as usize]
    }
}

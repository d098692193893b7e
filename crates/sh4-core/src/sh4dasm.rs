//! Textual disassembly driven by the decode table's mnemonic templates.
//! Diagnostics only; execution never consults this.

use crate::sh4dec::OpcodeTable;
use crate::translate::{Op, branch_target_s8, branch_target_s12};

pub struct Disasm {
    pub mnemonic: String,
    pub text: String,
    pub valid: bool,
}

/// Expands one opcode at `addr` into text. PC-relative displacements are
/// resolved to absolute addresses, which is what you want when reading a
/// trace.
pub fn disassemble(table: &OpcodeTable, opcode: u16, addr: u32) -> Disasm {
    let Some(entry) = table.entry(opcode) else {
        return Disasm {
            mnemonic: String::from(".word"),
            text: format!(".word 0x{opcode:04X}"),
            valid: false,
        };
    };

    let op = Op(opcode);
    let mut text = String::from(entry.diss);

    let subst = [
        ("<REG_N>", format!("R{}", op.n())),
        ("<REG_M>", format!("R{}", op.m())),
        ("<REG_M_BANK>", format!("R{}_BANK", op.m() & 7)),
        ("<FREG_N>", format!("FR{}", op.n())),
        ("<FREG_M>", format!("FR{}", op.m())),
        ("<imm8>", format!("0x{:02X}", op.imm8())),
        ("<simm8>", format!("{}", op.simm8())),
        ("<disp4>", format!("{}", op.imm4())),
        ("<disp8>", format!("{}", op.imm8())),
        (
            "<bdisp8>",
            format!("0x{:08X}", branch_target_s8(addr, op.simm8())),
        ),
        (
            "<bdisp12>",
            format!("0x{:08X}", branch_target_s12(addr, op.simm12())),
        ),
        ("<N>", format!("{}", op.n() >> 2)),
        ("<M>", format!("{}", op.m() >> 2)),
    ];
    for (token, value) in subst {
        if text.contains(token) {
            text = text.replace(token, &value);
        }
    }

    Disasm {
        mnemonic: entry.mnemonic().to_string(),
        text,
        valid: entry.emit.is_some(),
    }
}

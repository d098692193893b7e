use thiserror::Error;

use crate::ir::Opcode;

/// Per-instruction decode failures. Both variants are fatal for the
/// instruction and unwind to whatever drives translation; the distinction
/// between a known-but-unimplemented encoding and garbage matters for the
/// error report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TranslateError {
    #[error("unimplemented opcode {opcode:04X} at {pc:08X}")]
    Unimplemented { opcode: u16, pc: u32 },
    #[error("invalid opcode {opcode:04X} at {pc:08X}")]
    Invalid { opcode: u16, pc: u32 },
}

/// Per-block native compilation failures, raised before any generated byte
/// can run.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("guest memory access at instruction {index} is not supported by the native backend")]
    MemoryAccess { index: usize },
    #[error("opcode {op:?} has no native emission")]
    Unsupported { op: Opcode },
    #[error("executable page allocation failed: {0}")]
    Alloc(std::io::Error),
}

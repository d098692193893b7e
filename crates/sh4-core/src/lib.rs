use bitfield::bitfield;
use std::fmt;

pub mod error;
pub mod ir;
pub mod sh4mem;

pub mod emit;
pub mod translate;

pub mod sh4asm;
pub mod sh4dasm;
pub mod sh4dec;
pub mod translator;

pub mod backend_ipr;

#[cfg(all(target_arch = "x86_64", unix))]
pub mod backend_x64;
#[cfg(all(target_arch = "x86_64", unix))]
pub mod liveness;
#[cfg(all(target_arch = "x86_64", unix))]
pub mod regalloc;
#[cfg(all(target_arch = "x86_64", unix))]
pub mod x64asm;

pub use error::{CompileError, TranslateError};

bitfield! {
    #[repr(C)]
    #[derive(Clone, Copy)]
    pub struct SrStatus(u32);
    impl Debug;

    pub u32, full, set_full: 31, 0;
    pub t, set_t: 0;
    pub s, set_s: 1;
    // bits 2-3 reserved
    pub imask, set_imask: 7, 4;
    pub q, set_q: 8;
    pub m, set_m: 9;
    // bits 10-14 reserved
    pub fd, set_fd: 15;
    // bits 16-27 reserved
    pub bl, set_bl: 28;
    pub rb, set_rb: 29;
    pub md, set_md: 30;
    // bit 31 reserved
}

/// IR register numbering shared by the emitter, the interpreter and the
/// native backend. 0..=15 are the general registers, 16..=23 the banked
/// R0_BANK..R7_BANK file, the rest are control registers.
pub mod reg {
    pub const BANK0: u8 = 16;
    pub const PC: u8 = 24;
    pub const SR: u8 = 25;
    pub const GBR: u8 = 26;
    pub const PR: u8 = 27;
    pub const SSR: u8 = 28;
    pub const SPC: u8 = 29;
    pub const VBR: u8 = 30;
    pub const SGR: u8 = 31;
    pub const DBR: u8 = 32;
    pub const MACH: u8 = 33;
    pub const MACL: u8 = 34;

    pub const COUNT: u8 = 35;
}

#[repr(C)]
#[derive(Clone)]
pub struct Sh4Ctx {
    pub r: [u32; 16],
    pub r_bank: [u32; 8],

    pub pc: u32,
    pub pr: u32,
    pub gbr: u32,
    pub sr: SrStatus,
    pub ssr: u32,
    pub spc: u32,
    pub vbr: u32,
    pub sgr: u32,
    pub dbr: u32,
    pub mach: u32,
    pub macl: u32,
}

impl Default for Sh4Ctx {
    fn default() -> Self {
        Self {
            r: [0; 16],
            r_bank: [0; 8],
            pc: 0,
            pr: 0,
            gbr: 0,
            sr: SrStatus(0),
            ssr: 0,
            spc: 0,
            vbr: 0,
            sgr: 0,
            dbr: 0,
            mach: 0,
            macl: 0,
        }
    }
}

impl Sh4Ctx {
    /// Clears the register file and points PC at the reset vector.
    pub fn reset(&mut self, entry: u32) {
        *self = Self::default();
        self.pc = entry;
    }

    /// The one place an IR register number is resolved to storage. Both
    /// backends go through here (the native backend via `state_offset`).
    pub fn reg(&self, id: u8) -> u32 {
        match id {
            0..=15 => self.r[id as usize],
            16..=23 => self.r_bank[(id - reg::BANK0) as usize],
            reg::PC => self.pc,
            reg::SR => self.sr.0,
            reg::GBR => self.gbr,
            reg::PR => self.pr,
            reg::SSR => self.ssr,
            reg::SPC => self.spc,
            reg::VBR => self.vbr,
            reg::SGR => self.sgr,
            reg::DBR => self.dbr,
            reg::MACH => self.mach,
            reg::MACL => self.macl,
            _ => {
                debug_assert!(false, "read of unknown register id {id}");
                0
            }
        }
    }

    pub fn set_reg(&mut self, id: u8, value: u32) {
        match id {
            0..=15 => self.r[id as usize] = value,
            16..=23 => self.r_bank[(id - reg::BANK0) as usize] = value,
            reg::PC => self.pc = value,
            reg::SR => self.sr.0 = value,
            reg::GBR => self.gbr = value,
            reg::PR => self.pr = value,
            reg::SSR => self.ssr = value,
            reg::SPC => self.spc = value,
            reg::VBR => self.vbr = value,
            reg::SGR => self.sgr = value,
            reg::DBR => self.dbr = value,
            reg::MACH => self.mach = value,
            reg::MACL => self.macl = value,
            _ => debug_assert!(false, "write of unknown register id {id}"),
        }
    }

    /// Byte offset of a register's storage inside `Sh4Ctx`, for the native
    /// backend's prologue/epilogue loads and stores.
    pub fn state_offset(id: u8) -> Option<usize> {
        let off = match id {
            0..=15 => core::mem::offset_of!(Sh4Ctx, r) + id as usize * 4,
            16..=23 => core::mem::offset_of!(Sh4Ctx, r_bank) + (id - reg::BANK0) as usize * 4,
            reg::PC => core::mem::offset_of!(Sh4Ctx, pc),
            reg::SR => core::mem::offset_of!(Sh4Ctx, sr),
            reg::GBR => core::mem::offset_of!(Sh4Ctx, gbr),
            reg::PR => core::mem::offset_of!(Sh4Ctx, pr),
            reg::SSR => core::mem::offset_of!(Sh4Ctx, ssr),
            reg::SPC => core::mem::offset_of!(Sh4Ctx, spc),
            reg::VBR => core::mem::offset_of!(Sh4Ctx, vbr),
            reg::SGR => core::mem::offset_of!(Sh4Ctx, sgr),
            reg::DBR => core::mem::offset_of!(Sh4Ctx, dbr),
            reg::MACH => core::mem::offset_of!(Sh4Ctx, mach),
            reg::MACL => core::mem::offset_of!(Sh4Ctx, macl),
            _ => return None,
        };
        Some(off)
    }
}

impl fmt::Display for Sh4Ctx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..16 {
            write!(f, "R{:02}={:08X}", i, self.r[i])?;
            if i % 4 == 3 {
                writeln!(f)?;
            } else {
                write!(f, " ")?;
            }
        }
        for i in 0..8 {
            write!(f, "RB{}={:08X}", i, self.r_bank[i])?;
            if i % 4 == 3 {
                writeln!(f)?;
            } else {
                write!(f, " ")?;
            }
        }
        writeln!(
            f,
            "PC ={:08X} PR ={:08X} GBR={:08X} SR ={:08X}",
            self.pc, self.pr, self.gbr, self.sr.0
        )?;
        writeln!(
            f,
            "SSR={:08X} SPC={:08X} VBR={:08X}",
            self.ssr, self.spc, self.vbr
        )?;
        writeln!(
            f,
            "SGR={:08X} DBR={:08X} MACH={:08X} MACL={:08X}",
            self.sgr, self.dbr, self.mach, self.macl
        )?;
        writeln!(
            f,
            "FLAGS: T={} S={} Q={} M={}",
            self.sr.t() as u32,
            self.sr.s() as u32,
            self.sr.q() as u32,
            self.sr.m() as u32
        )
    }
}

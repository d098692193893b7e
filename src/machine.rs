//! Machine assembly: backing memory blocks, the mirrored physical map, the
//! refresh-counter MMIO handler and the block execution loop.

use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

use rand::Rng;

use sh4_core::ir::BasicBlock;
use sh4_core::sh4dec::OpcodeTable;
use sh4_core::sh4mem::{MapMode, Memory};
use sh4_core::translator::Translator;
use sh4_core::{CompileError, Sh4Ctx, TranslateError, backend_ipr};

#[cfg(all(target_arch = "x86_64", unix))]
use sh4_core::backend_x64::{self, JitBlock};

/// Architectural reset vector; falls in the eighth ROM mirror.
pub const RESET_PC: u32 = 0xA000_0000;

pub const ROM_SIZE: usize = 2 * 1024 * 1024;
pub const FLASH_SIZE: usize = 256 * 1024;
pub const RAM_SIZE: usize = 16 * 1024 * 1024;

/// Refresh counter register; guest boot code polls it for entropy.
const RFCR_ADDR: u32 = 0xFF80_0028;

/// Heap-backed guest memory. The box never moves, so the pointer handed to
/// the memory map stays valid for the machine's lifetime.
pub struct MemoryBlock {
    buf: Box<[u8]>,
}

impl MemoryBlock {
    pub fn new(size: usize) -> Self {
        Self {
            buf: vec![0u8; size].into_boxed_slice(),
        }
    }

    pub fn load_from(&mut self, path: &Path) -> io::Result<()> {
        let data = std::fs::read(path)?;
        let n = data.len().min(self.buf.len());
        self.buf[..n].copy_from_slice(&data[..n]);
        Ok(())
    }

    pub fn ptr(&mut self) -> *mut u8 {
        self.buf.as_mut_ptr()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Backend {
    Interpreter,
    #[cfg(all(target_arch = "x86_64", unix))]
    Native,
}

/// Why a run loop stopped before executing all requested blocks.
#[derive(Debug)]
pub enum Stop {
    Breakpoint(u32),
    Translate(TranslateError),
    Compile(u32, CompileError),
}

pub struct Machine {
    pub ctx: Sh4Ctx,
    pub mem: Memory,
    pub translator: Translator,
    pub backend: Backend,

    rom: MemoryBlock,
    flash: MemoryBlock,
    ram: MemoryBlock,

    #[cfg(all(target_arch = "x86_64", unix))]
    native_blocks: HashMap<u32, Rc<JitBlock>>,
    #[cfg(not(all(target_arch = "x86_64", unix)))]
    native_blocks: HashMap<u32, ()>,
}

impl Machine {
    pub fn new(table: Arc<OpcodeTable>) -> Self {
        let mut rom = MemoryBlock::new(ROM_SIZE);
        let mut flash = MemoryBlock::new(FLASH_SIZE);
        let mut ram = MemoryBlock::new(RAM_SIZE);

        let mut mem = Memory::new();
        // The address decoder ignores the top three bits, so each physical
        // region shows up eight times.
        for i in 0..8u32 {
            let base = 0x2000_0000u32.wrapping_mul(i);
            mem.map_memory(
                rom.ptr(),
                base,
                base + (ROM_SIZE as u32 - 1),
                MapMode::READ_WRITE,
            );
            mem.map_memory(
                flash.ptr(),
                base + 0x0020_0000,
                base + 0x0020_0000 + (FLASH_SIZE as u32 - 1),
                MapMode::READ_WRITE,
            );
            mem.map_memory(
                ram.ptr(),
                base + 0x0C00_0000,
                base + 0x0C00_0000 + (RAM_SIZE as u32 - 1),
                MapMode::READ_WRITE,
            );
        }

        // On-chip control registers: reads of the refresh counter return a
        // moving value, everything else reads as zero.
        mem.map_read32_handler(1, 0xFC00_0000, 0xFFFF_FFFF);
        mem.set_read32_handler(
            1,
            Box::new(|addr| {
                if addr == RFCR_ADDR {
                    rand::thread_rng().gen_range(0..0x20)
                } else {
                    0
                }
            }),
        );
        mem.map_read16_handler(1, 0xFC00_0000, 0xFFFF_FFFF);
        mem.set_read16_handler(
            1,
            Box::new(|addr| {
                if addr == RFCR_ADDR {
                    rand::thread_rng().gen_range(0..0x20)
                } else {
                    0
                }
            }),
        );

        let mut ctx = Sh4Ctx::default();
        ctx.reset(RESET_PC);

        Self {
            ctx,
            mem,
            translator: Translator::new(table),
            backend: Backend::Interpreter,
            rom,
            flash,
            ram,
            native_blocks: HashMap::new(),
        }
    }

    pub fn load_rom(&mut self, path: &Path) -> io::Result<()> {
        self.rom.load_from(path)
    }

    pub fn load_flash(&mut self, path: &Path) -> io::Result<()> {
        self.flash.load_from(path)
    }

    pub fn ram_len(&self) -> usize {
        self.ram.len()
    }

    fn execute(&mut self, block: &BasicBlock) {
        backend_ipr::execute(&mut self.ctx, &mut self.mem, block);
    }

    /// Runs one translated block (a breakpoint yields an empty block and
    /// reports as a stop).
    pub fn run_block(&mut self) -> Result<(), Stop> {
        let pc = self.ctx.pc;
        if self.translator.breakpoint_hit(pc) {
            return Err(Stop::Breakpoint(pc));
        }

        match self.backend {
            Backend::Interpreter => {
                let block = self
                    .translator
                    .block_at(&mut self.mem, pc, false)
                    .map_err(Stop::Translate)?;
                self.execute(&block);
            }
            #[cfg(all(target_arch = "x86_64", unix))]
            Backend::Native => {
                let cached = self.native_blocks.get(&pc).cloned();
                let native = match cached {
                    Some(native) => native,
                    None => {
                        let block = self
                            .translator
                            .block_at(&mut self.mem, pc, false)
                            .map_err(Stop::Translate)?;
                        let native = Rc::new(
                            backend_x64::compile(&block).map_err(|e| Stop::Compile(pc, e))?,
                        );
                        self.native_blocks.insert(pc, native.clone());
                        native
                    }
                };
                native.run(&mut self.ctx);
            }
        }
        Ok(())
    }

    /// Executes `blocks` translated blocks, stopping early on breakpoints
    /// and fatal conditions.
    pub fn run(&mut self, blocks: u64) -> Result<(), Stop> {
        for _ in 0..blocks {
            self.run_block()?;
        }
        Ok(())
    }

    /// Translates and executes exactly one guest instruction (plus its
    /// delay slot for delayed branches), bypassing the block cache.
    pub fn step(&mut self) -> Result<(), Stop> {
        let pc = self.ctx.pc;
        let block = self
            .translator
            .block_at(&mut self.mem, pc, true)
            .map_err(Stop::Translate)?;
        self.execute(&block);
        Ok(())
    }

    /// Single-step variant that hands the IR back for inspection.
    pub fn step_with_ir(&mut self) -> Result<Rc<BasicBlock>, Stop> {
        let pc = self.ctx.pc;
        let block = self
            .translator
            .block_at(&mut self.mem, pc, true)
            .map_err(Stop::Translate)?;
        self.execute(&block);
        Ok(block)
    }
}

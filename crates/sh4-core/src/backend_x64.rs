//! Native backend: lowers one IR block to x86-64 and hands back a callable
//! trampoline over `Sh4Ctx`. Guest memory access is rejected up front; the
//! interpreter remains the backend for blocks that touch the bus.

use std::io;

use crate::Sh4Ctx;
use crate::error::CompileError;
use crate::ir::{BasicBlock, Instruction, Opcode, Operand};
use crate::liveness::{LOCAL_ID_BASE, Liveness, operand_id};
use crate::regalloc::{Allocation, HostReg, Location, allocate};
use crate::x64asm::{self, Asm, Label};

/// Frame bytes holding the five saved callee registers below RBP; spill
/// slots start under them.
const SAVED_REGS_BYTES: i32 = 40;

const STATE_PTR: HostReg = HostReg::R15;
const SCRATCH: HostReg = HostReg::Rax;
const SCRATCH2: HostReg = HostReg::Rcx;

#[cfg(windows)]
const ARG0: HostReg = HostReg::Rcx;
#[cfg(not(windows))]
const ARG0: HostReg = HostReg::Rdi;

type BlockFn = unsafe extern "C" fn(*mut Sh4Ctx);

/// One compiled block: an RWX page owned for the life of the value.
#[derive(Debug)]
pub struct JitBlock {
    entry: BlockFn,
    ptr: *mut u8,
    len: usize,
}

impl JitBlock {
    pub fn run(&self, ctx: &mut Sh4Ctx) {
        unsafe { (self.entry)(ctx as *mut Sh4Ctx) }
    }

    pub fn code_len(&self) -> usize {
        self.len
    }
}

impl Drop for JitBlock {
    fn drop(&mut self) {
        unsafe {
            libc::munmap(self.ptr as *mut libc::c_void, self.len);
        }
    }
}

fn alloc_executable(code: &[u8]) -> Result<(*mut u8, usize), CompileError> {
    let len = code.len().max(1);
    let ptr = unsafe {
        libc::mmap(
            std::ptr::null_mut(),
            len,
            libc::PROT_READ | libc::PROT_WRITE | libc::PROT_EXEC,
            libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
            -1,
            0,
        )
    };
    if ptr == libc::MAP_FAILED {
        return Err(CompileError::Alloc(io::Error::last_os_error()));
    }
    unsafe {
        std::ptr::copy_nonoverlapping(code.as_ptr(), ptr as *mut u8, code.len());
    }
    Ok((ptr as *mut u8, len))
}

struct Compiler<'a> {
    block: &'a BasicBlock,
    alloc: Allocation,
    asm: Asm,
    /// One native label per IR index, plus one past the end for branches
    /// that leave the block.
    ir_labels: Vec<Label>,
}

pub fn compile(block: &BasicBlock) -> Result<JitBlock, CompileError> {
    // Structural rejection happens before any code is generated.
    for (index, ins) in block.instrs.iter().enumerate() {
        match ins.op {
            Opcode::Load => return Err(CompileError::MemoryAccess { index }),
            Opcode::Store => {
                if matches!(ins.dst, Some(Operand::Mem { .. })) {
                    return Err(CompileError::MemoryAccess { index });
                }
            }
            _ => {}
        }
    }

    let liveness = Liveness::analyze(block);
    let alloc = allocate(&liveness, SAVED_REGS_BYTES);

    let mut c = Compiler {
        block,
        alloc,
        asm: Asm::new(),
        ir_labels: Vec::new(),
    };

    for _ in 0..=block.instrs.len() {
        let label = c.asm.new_label();
        c.ir_labels.push(label);
    }

    c.prologue();
    for (i, ins) in block.instrs.iter().enumerate() {
        let label = c.ir_labels[i];
        c.asm.bind(label);
        c.emit(ins)?;
    }
    let end = c.ir_labels[block.instrs.len()];
    c.asm.bind(end);
    c.epilogue();

    let code = c.asm.into_code();
    log::debug!(
        "compiled block: {} IR ops -> {} native bytes, frame {}",
        block.instrs.len(),
        code.len(),
        c.alloc.stack_size
    );
    let (ptr, len) = alloc_executable(&code)?;
    let entry = unsafe { std::mem::transmute::<*mut u8, BlockFn>(ptr) };
    Ok(JitBlock { entry, ptr, len })
}

impl Compiler<'_> {
    fn local_frame_bytes(&self) -> i32 {
        let mut bytes = self.alloc.stack_size - SAVED_REGS_BYTES;
        if bytes % 16 != 0 {
            bytes += 16 - bytes % 16;
        }
        bytes
    }

    /// Architectural register ids that the allocator gave a location.
    fn mapped_arch_regs(&self) -> impl Iterator<Item = (u8, Location)> + '_ {
        (0..crate::reg::COUNT).filter_map(|id| {
            self.alloc
                .location(id as usize)
                .map(|loc| (id, loc))
        })
    }

    fn prologue(&mut self) {
        let asm = &mut self.asm;
        asm.push(HostReg::Rbp);
        asm.mov_rr64(HostReg::Rbp, HostReg::Rsp);

        asm.push(HostReg::Rbx);
        asm.push(HostReg::R12);
        asm.push(HostReg::R13);
        asm.push(HostReg::R14);
        asm.push(HostReg::R15);

        asm.mov_rr64(STATE_PTR, ARG0);

        let frame = self.local_frame_bytes();
        if frame > 0 {
            self.asm.sub_ri64(HostReg::Rsp, frame);
        }

        // Bring every allocated architectural register in from the state.
        let regs: Vec<(u8, Location)> = self.mapped_arch_regs().collect();
        for (id, loc) in regs {
            let offset = Sh4Ctx::state_offset(id).unwrap() as i32;
            match loc {
                Location::Reg(r) => self.asm.mov_load(r, STATE_PTR, offset),
                Location::Stack(slot) => {
                    self.asm.mov_load(SCRATCH, STATE_PTR, offset);
                    self.asm.mov_store(HostReg::Rbp, slot, SCRATCH);
                }
            }
        }
    }

    fn epilogue(&mut self) {
        let regs: Vec<(u8, Location)> = self.mapped_arch_regs().collect();
        for (id, loc) in regs {
            let offset = Sh4Ctx::state_offset(id).unwrap() as i32;
            match loc {
                Location::Reg(r) => self.asm.mov_store(STATE_PTR, offset, r),
                Location::Stack(slot) => {
                    self.asm.mov_load(SCRATCH, HostReg::Rbp, slot);
                    self.asm.mov_store(STATE_PTR, offset, SCRATCH);
                }
            }
        }

        let frame = self.local_frame_bytes();
        if frame > 0 {
            self.asm.add_ri64(HostReg::Rsp, frame);
        }

        let asm = &mut self.asm;
        asm.pop(HostReg::R15);
        asm.pop(HostReg::R14);
        asm.pop(HostReg::R13);
        asm.pop(HostReg::R12);
        asm.pop(HostReg::Rbx);
        asm.pop(HostReg::Rbp);
        asm.ret();
    }

    /// Materializes an operand value into `target`.
    fn load_operand(&mut self, op: &Operand, target: HostReg) {
        if let Operand::Const(value) = op {
            self.asm.mov_ri(target, *value as i32);
            return;
        }
        let id = operand_id(Some(op)).expect("value operand");
        match self.alloc.location(id) {
            Some(Location::Reg(r)) => {
                if r != target {
                    self.asm.mov_rr(target, r);
                }
            }
            Some(Location::Stack(slot)) => self.asm.mov_load(target, HostReg::Rbp, slot),
            None => {
                // Only reachable for an architectural register the block
                // never keeps live; read it straight from the state.
                debug_assert!(id < LOCAL_ID_BASE, "read of unallocated local");
                let offset = Sh4Ctx::state_offset(id as u8).unwrap() as i32;
                self.asm.mov_load(target, STATE_PTR, offset);
            }
        }
    }

    fn store_result(&mut self, op: &Operand, source: HostReg) {
        let id = operand_id(Some(op)).expect("destination operand");
        match self.alloc.location(id) {
            Some(Location::Reg(r)) => {
                if r != source {
                    self.asm.mov_rr(r, source);
                }
            }
            Some(Location::Stack(slot)) => self.asm.mov_store(HostReg::Rbp, slot, source),
            None => {
                if id < LOCAL_ID_BASE {
                    let offset = Sh4Ctx::state_offset(id as u8).unwrap() as i32;
                    self.asm.mov_store(STATE_PTR, offset, source);
                }
                // A dead local needs no store.
            }
        }
    }

    fn target_label(&self, ins: &Instruction) -> Label {
        match ins.dst.as_ref() {
            Some(Operand::Label(id)) => self.ir_labels[self.block.label_target(*id)],
            other => panic!("branch destination {other:?} is not a label"),
        }
    }

    fn emit_alu(
        &mut self,
        ins: &Instruction,
        rr: fn(&mut Asm, HostReg, HostReg),
        ri: fn(&mut Asm, HostReg, i32),
    ) {
        self.load_operand(ins.a.as_ref().unwrap(), SCRATCH);
        match ins.b.as_ref().unwrap() {
            Operand::Const(imm) => ri(&mut self.asm, SCRATCH, *imm as i32),
            b => {
                self.load_operand(b, SCRATCH2);
                rr(&mut self.asm, SCRATCH, SCRATCH2);
            }
        }
        self.store_result(ins.dst.as_ref().unwrap(), SCRATCH);
    }

    fn emit_shift(
        &mut self,
        ins: &Instruction,
        imm_form: fn(&mut Asm, HostReg, u8),
        cl_form: fn(&mut Asm, HostReg),
    ) {
        self.load_operand(ins.a.as_ref().unwrap(), SCRATCH);
        match ins.b.as_ref().unwrap() {
            Operand::Const(imm) => imm_form(&mut self.asm, SCRATCH, (*imm & 0x1F) as u8),
            b => {
                self.load_operand(b, SCRATCH2);
                cl_form(&mut self.asm, SCRATCH);
            }
        }
        self.store_result(ins.dst.as_ref().unwrap(), SCRATCH);
    }

    /// cmp + two-way jump materializing 1/0; no reliance on setcc.
    fn emit_cmp(&mut self, ins: &Instruction, cc_true: u8) {
        self.load_operand(ins.a.as_ref().unwrap(), SCRATCH);
        match ins.b.as_ref().unwrap() {
            Operand::Const(imm) => self.asm.cmp_ri(SCRATCH, *imm as i32),
            b => {
                self.load_operand(b, SCRATCH2);
                self.asm.cmp_rr(SCRATCH, SCRATCH2);
            }
        }
        let when_true = self.asm.new_label();
        let done = self.asm.new_label();
        self.asm.jcc(cc_true, when_true);
        self.asm.mov_ri(SCRATCH, 0);
        self.asm.jmp(done);
        self.asm.bind(when_true);
        self.asm.mov_ri(SCRATCH, 1);
        self.asm.bind(done);
        self.store_result(ins.dst.as_ref().unwrap(), SCRATCH);
    }

    fn emit_unary(&mut self, ins: &Instruction, f: fn(&mut Asm, HostReg)) {
        self.load_operand(ins.a.as_ref().unwrap(), SCRATCH);
        f(&mut self.asm, SCRATCH);
        self.store_result(ins.dst.as_ref().unwrap(), SCRATCH);
    }

    fn emit(&mut self, ins: &Instruction) -> Result<(), CompileError> {
        match ins.op {
            Opcode::Copy | Opcode::Store => {
                // Store reaches here only with a register or local
                // destination, which is a copy.
                self.load_operand(ins.a.as_ref().unwrap(), SCRATCH);
                self.store_result(ins.dst.as_ref().unwrap(), SCRATCH);
            }
            Opcode::Add => self.emit_alu(ins, Asm::add_rr, Asm::add_ri),
            Opcode::Sub => self.emit_alu(ins, Asm::sub_rr, Asm::sub_ri),
            Opcode::And => self.emit_alu(ins, Asm::and_rr, Asm::and_ri),
            Opcode::Or => self.emit_alu(ins, Asm::or_rr, Asm::or_ri),
            Opcode::Xor => self.emit_alu(ins, Asm::xor_rr, Asm::xor_ri),
            Opcode::Mul | Opcode::MulSigned => {
                // Low 32 bits are sign-agnostic.
                self.load_operand(ins.a.as_ref().unwrap(), SCRATCH);
                self.load_operand(ins.b.as_ref().unwrap(), SCRATCH2);
                self.asm.imul_rr(SCRATCH, SCRATCH2);
                self.store_result(ins.dst.as_ref().unwrap(), SCRATCH);
            }
            Opcode::Not => self.emit_unary(ins, Asm::not_r),
            Opcode::Shl => self.emit_shift(ins, Asm::shl_ri, Asm::shl_cl),
            Opcode::Shr => self.emit_shift(ins, Asm::shr_ri, Asm::shr_cl),
            Opcode::Sar => self.emit_shift(ins, Asm::sar_ri, Asm::sar_cl),
            Opcode::Rol => self.emit_shift(ins, Asm::rol_ri, Asm::rol_cl),
            Opcode::Ror => self.emit_shift(ins, Asm::ror_ri, Asm::ror_cl),
            Opcode::SignExt8 => self.emit_unary(ins, |asm, r| asm.movsx8(r, r)),
            Opcode::SignExt16 => self.emit_unary(ins, |asm, r| asm.movsx16(r, r)),
            Opcode::ZeroExt8 => self.emit_unary(ins, |asm, r| asm.movzx8(r, r)),
            Opcode::ZeroExt16 => self.emit_unary(ins, |asm, r| asm.movzx16(r, r)),
            Opcode::CmpEq => self.emit_cmp(ins, x64asm::CC_E),
            Opcode::CmpNe => self.emit_cmp(ins, x64asm::CC_NE),
            Opcode::CmpLt => self.emit_cmp(ins, x64asm::CC_B),
            Opcode::CmpGt => self.emit_cmp(ins, x64asm::CC_A),
            Opcode::CmpGe => self.emit_cmp(ins, x64asm::CC_AE),
            Opcode::CmpGtSigned => self.emit_cmp(ins, x64asm::CC_G),
            Opcode::CmpGeSigned => self.emit_cmp(ins, x64asm::CC_GE),
            Opcode::Branch => {
                let label = self.target_label(ins);
                self.asm.jmp(label);
            }
            Opcode::BranchTrue => {
                self.load_operand(ins.a.as_ref().unwrap(), SCRATCH);
                self.asm.cmp_ri(SCRATCH, 0);
                let label = self.target_label(ins);
                self.asm.jcc(x64asm::CC_NE, label);
            }
            Opcode::BranchFalse => {
                self.load_operand(ins.a.as_ref().unwrap(), SCRATCH);
                self.asm.cmp_ri(SCRATCH, 0);
                let label = self.target_label(ins);
                self.asm.jcc(x64asm::CC_E, label);
            }
            Opcode::Load => return Err(CompileError::Unsupported { op: ins.op }),
        }
        Ok(())
    }
}

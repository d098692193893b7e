// Guest programs through the translator and the interpreter: caching,
// single-step, delay slots, breakpoints and decode failures.

use std::sync::Arc;

use sh4_core::backend_ipr;
use sh4_core::sh4asm as asm;
use sh4_core::sh4dec::OpcodeTable;
use sh4_core::sh4mem::{MapMode, Memory};
use sh4_core::translator::Translator;
use sh4_core::{Sh4Ctx, TranslateError};

const RAM_BASE: u32 = 0;
const RAM_SIZE: usize = 0x10000;

struct TestCpu {
    ctx: Sh4Ctx,
    mem: Memory,
    translator: Translator,
    #[allow(dead_code)]
    ram: Box<[u8]>,
}

impl TestCpu {
    fn new(program: &[u16]) -> Self {
        let mut ram = vec![0u8; RAM_SIZE].into_boxed_slice();
        let mut mem = Memory::new();
        mem.map_memory(
            ram.as_mut_ptr(),
            RAM_BASE,
            RAM_BASE + (RAM_SIZE as u32 - 1),
            MapMode::READ_WRITE,
        );
        for (i, &opcode) in program.iter().enumerate() {
            mem.write16(RAM_BASE + (i as u32) * 2, opcode);
        }

        let mut ctx = Sh4Ctx::default();
        ctx.reset(RAM_BASE);

        Self {
            ctx,
            mem,
            translator: Translator::new(Arc::new(OpcodeTable::new())),
            ram,
        }
    }

    fn run_block(&mut self) -> Result<(), TranslateError> {
        let block = self
            .translator
            .block_at(&mut self.mem, self.ctx.pc, false)?;
        backend_ipr::execute(&mut self.ctx, &mut self.mem, &block);
        Ok(())
    }

    fn step(&mut self) -> Result<(), TranslateError> {
        let block = self.translator.block_at(&mut self.mem, self.ctx.pc, true)?;
        backend_ipr::execute(&mut self.ctx, &mut self.mem, &block);
        Ok(())
    }
}

#[test]
fn straight_line_arithmetic() {
    // R0 = 3; R1 = 4; R1 += R0; R1 += 5; then return.
    let mut cpu = TestCpu::new(&[
        asm::mov_i(0, 3),
        asm::mov_i(1, 4),
        asm::add(0, 1),
        asm::add_i(5, 1),
        asm::rts(),
        asm::nop(),
    ]);
    cpu.ctx.pr = 0x8000;
    cpu.run_block().unwrap();

    assert_eq!(cpu.ctx.r[0], 3);
    assert_eq!(cpu.ctx.r[1], 12);
    assert_eq!(cpu.ctx.pc, 0x8000, "rts redirects PC to PR");
}

#[test]
fn block_is_cached_by_start_address() {
    let mut cpu = TestCpu::new(&[asm::mov_i(0, 1), asm::rts(), asm::nop()]);
    cpu.ctx.pr = 0x100;
    let first = cpu.translator.block_at(&mut cpu.mem, 0, false).unwrap();
    let second = cpu.translator.block_at(&mut cpu.mem, 0, false).unwrap();
    assert!(std::rc::Rc::ptr_eq(&first, &second));
}

#[test]
fn single_step_bypasses_cache_and_advances_pc() {
    let mut cpu = TestCpu::new(&[asm::mov_i(0, 5), asm::mov_i(1, 6), asm::rts(), asm::nop()]);
    cpu.step().unwrap();
    assert_eq!(cpu.ctx.r[0], 5);
    assert_eq!(cpu.ctx.r[1], 0, "only one instruction ran");
    assert_eq!(cpu.ctx.pc, 2);

    let a = cpu.translator.block_at(&mut cpu.mem, 0, true).unwrap();
    let b = cpu.translator.block_at(&mut cpu.mem, 0, true).unwrap();
    assert!(!std::rc::Rc::ptr_eq(&a, &b), "single-step never caches");
}

#[test]
fn delay_slot_executes_before_branch_target() {
    // bra over a trap; the delay slot mov still executes.
    let mut cpu = TestCpu::new(&[
        asm::bra(2),       // 0x0000: branch to 0x0008
        asm::mov_i(0, 7),  // 0x0002: delay slot
        asm::mov_i(1, 1),  // 0x0004: skipped
        asm::mov_i(1, 2),  // 0x0006: skipped
        asm::mov_i(2, 9),  // 0x0008: target
        asm::rts(),
        asm::nop(),
    ]);
    cpu.ctx.pr = 0x4000;
    cpu.run_block().unwrap();
    assert_eq!(cpu.ctx.r[0], 7, "delay slot executed");
    assert_eq!(cpu.ctx.pc, 0x0008);

    cpu.run_block().unwrap();
    assert_eq!(cpu.ctx.r[2], 9);
    assert_eq!(cpu.ctx.r[1], 0, "jumped-over instructions never ran");
}

#[test]
fn conditional_branch_both_ways() {
    let program = [
        asm::bt(2),       // 0x0000: if T jump to 0x0008
        asm::mov_i(0, 1), // 0x0002: fallthrough path
        asm::rts(),
        asm::nop(),
        asm::mov_i(0, 2), // 0x0008: taken path
        asm::rts(),
        asm::nop(),
    ];

    let mut cpu = TestCpu::new(&program);
    cpu.ctx.pr = 0x9000;
    cpu.ctx.sr.set_t(true);
    cpu.run_block().unwrap();
    assert_eq!(cpu.ctx.pc, 0x0008, "taken branch");
    cpu.run_block().unwrap();
    assert_eq!(cpu.ctx.r[0], 2);

    let mut cpu = TestCpu::new(&program);
    cpu.ctx.pr = 0x9000;
    cpu.run_block().unwrap();
    assert_eq!(cpu.ctx.pc, 0x0002, "fallthrough");
    cpu.run_block().unwrap();
    assert_eq!(cpu.ctx.r[0], 1);
}

#[test]
fn delayed_conditional_continues_after_slot() {
    // bf/s not taken: continuation must resume after the delay slot.
    let mut cpu = TestCpu::new(&[
        asm::sett(),
        asm::bfs(4),      // 0x0002: T set, not taken
        asm::mov_i(0, 3), // 0x0004: delay slot, still runs
        asm::mov_i(1, 4), // 0x0006: continuation
        asm::rts(),
        asm::nop(),
    ]);
    cpu.ctx.pr = 0x7000;
    cpu.run_block().unwrap();
    assert_eq!(cpu.ctx.pc, 0x0006);
    assert_eq!(cpu.ctx.r[0], 3);

    cpu.run_block().unwrap();
    assert_eq!(cpu.ctx.r[1], 4);
}

#[test]
fn dt_loop_runs_to_completion() {
    // R0 = 5; loop: dt R0; bf loop. Leaves R0 == 0 and T set.
    let mut cpu = TestCpu::new(&[
        asm::mov_i(0, 5), // 0x0000
        asm::dt(0),       // 0x0002
        asm::bf(-3),      // 0x0004: back to 0x0002
        asm::rts(),
        asm::nop(),
    ]);
    cpu.ctx.pr = 0x6000;
    for _ in 0..16 {
        cpu.run_block().unwrap();
        if cpu.ctx.pc == 0x6000 {
            break;
        }
    }
    assert_eq!(cpu.ctx.r[0], 0);
    assert!(cpu.ctx.sr.t());
    assert_eq!(cpu.ctx.pc, 0x6000);
}

#[test]
fn jsr_and_rts_roundtrip() {
    let mut cpu = TestCpu::new(&[
        asm::mov_i(1, 0x10), // 0x0000
        asm::jsr(1),         // 0x0002: call 0x0010
        asm::nop(),          // 0x0004: delay slot
        asm::mov_i(2, 1),    // 0x0006: return lands here
        asm::rts(),
        asm::nop(),
    ]);
    // Subroutine at 0x0010.
    cpu.mem.write16(0x0010, asm::mov_i(3, 9));
    cpu.mem.write16(0x0012, asm::rts());
    cpu.mem.write16(0x0014, asm::nop());

    cpu.ctx.pr = 0xDEAD;
    cpu.run_block().unwrap();
    assert_eq!(cpu.ctx.pc, 0x0010);
    assert_eq!(cpu.ctx.pr, 0x0006, "return address past the delay slot");

    cpu.run_block().unwrap();
    assert_eq!(cpu.ctx.r[3], 9);
    assert_eq!(cpu.ctx.pc, 0x0006);
}

#[test]
fn sign_sensitive_compares_set_t() {
    // cmp/hi (unsigned) vs cmp/gt (signed) on (-1, 1).
    let mut cpu = TestCpu::new(&[
        asm::mov_i(0, -1),
        asm::mov_i(1, 1),
        asm::cmp_hi(1, 0), // R0 > R1 unsigned
        asm::movt(2),
        asm::cmp_gt(1, 0), // R0 > R1 signed
        asm::movt(3),
        asm::rts(),
        asm::nop(),
    ]);
    cpu.ctx.pr = 0x5000;
    cpu.run_block().unwrap();
    assert_eq!(cpu.ctx.r[2], 1, "0xFFFFFFFF > 1 unsigned");
    assert_eq!(cpu.ctx.r[3], 0, "-1 > 1 signed is false");
}

#[test]
fn memory_instructions_through_translator() {
    let mut cpu = TestCpu::new(&[
        asm::mov_i(0, 0x44),  // address
        asm::mov_i(1, -2),    // value 0xFFFFFFFE
        asm::mov_ls(1, 0),    // mov.l R1,@R0
        asm::mov_ll(0, 2),    // mov.l @R0,R2
        asm::mov_bl(0, 3),    // mov.b @R0,R3 (sign-extends 0xFE)
        asm::rts(),
        asm::nop(),
    ]);
    cpu.ctx.pr = 0x3000;
    cpu.run_block().unwrap();
    assert_eq!(cpu.mem.read32(0x44), 0xFFFF_FFFE);
    assert_eq!(cpu.ctx.r[2], 0xFFFF_FFFE);
    assert_eq!(cpu.ctx.r[3], 0xFFFF_FFFE, "byte load sign-extends");
}

#[test]
fn unimplemented_and_invalid_opcodes_are_distinct() {
    // mac.l decodes but has no emission; 0x0000 matches nothing.
    let mut cpu = TestCpu::new(&[0x000F]);
    match cpu.run_block() {
        Err(TranslateError::Unimplemented { opcode, pc }) => {
            assert_eq!(opcode, 0x000F);
            assert_eq!(pc, 0);
        }
        other => panic!("expected Unimplemented, got {other:?}"),
    }

    let mut cpu = TestCpu::new(&[0x0000]);
    match cpu.run_block() {
        Err(TranslateError::Invalid { opcode, pc }) => {
            assert_eq!(opcode, 0x0000);
            assert_eq!(pc, 0);
        }
        other => panic!("expected Invalid, got {other:?}"),
    }
}

#[test]
fn breakpoint_preempts_block() {
    let mut cpu = TestCpu::new(&[asm::mov_i(0, 1), asm::rts(), asm::nop()]);
    cpu.translator.add_breakpoint(0, 0);
    assert!(cpu.translator.breakpoint_hit(0));

    let block = cpu.translator.block_at(&mut cpu.mem, 0, false).unwrap();
    assert!(block.instrs.is_empty(), "no instructions for a halted block");

    // Single-step still makes progress from the breakpoint address.
    cpu.step().unwrap();
    assert_eq!(cpu.ctx.r[0], 1);

    cpu.translator.remove_breakpoint(0);
    cpu.translator.clear_cache();
    assert!(!cpu.translator.breakpoint_hit(0));
}

#[test]
fn max_block_length_terminates() {
    // 2000 nops with no branch: the translator must cut the block off and
    // leave PC at the continuation.
    let program: Vec<u16> = std::iter::repeat(asm::nop()).take(2000).collect();
    let mut cpu = TestCpu::new(&program);
    cpu.run_block().unwrap();
    assert_eq!(
        cpu.ctx.pc,
        (sh4_core::translator::MAX_BLOCK_INSTRUCTIONS as u32) * 2
    );
}

#[test]
fn mulu_and_sts_macl() {
    let mut cpu = TestCpu::new(&[
        asm::mov_i(0, 100),
        asm::mov_i(1, 7),
        asm::mul_l(0, 1),
        asm::sts_macl(2),
        asm::rts(),
        asm::nop(),
    ]);
    cpu.ctx.pr = 0x2000;
    cpu.run_block().unwrap();
    assert_eq!(cpu.ctx.macl, 700);
    assert_eq!(cpu.ctx.r[2], 700);
}

#[test]
fn disassembler_matches_table() {
    use sh4_core::sh4dasm::disassemble;
    let table = OpcodeTable::new();

    let d = disassemble(&table, asm::mov_i(3, 0x12), 0x8C00_0000);
    assert_eq!(d.text, "mov #18,R3");
    assert!(d.valid);

    let d = disassemble(&table, asm::add(1, 2), 0);
    assert_eq!(d.text, "add R1,R2");

    let d = disassemble(&table, asm::bra(2), 0x0000_1000);
    assert_eq!(d.text, "bra 0x00001008");

    // FPU rows decode for display but are not executable.
    let d = disassemble(&table, 0xF008, 0);
    assert_eq!(d.mnemonic, "fmov.s");
    assert!(!d.valid);

    let d = disassemble(&table, 0x0000, 0);
    assert!(!d.valid);
    assert_eq!(d.text, ".word 0x0000");
}

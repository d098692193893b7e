// Native backend: differential execution against the interpreter, the
// allocator's interval guarantees, and structural rejection of memory ops.

#![cfg(all(target_arch = "x86_64", unix))]

use std::sync::Arc;

use sh4_core::backend_x64;
use sh4_core::emit::EmitterContext;
use sh4_core::ir::{BasicBlock, Width};
use sh4_core::liveness::Liveness;
use sh4_core::regalloc::{Location, allocate};
use sh4_core::sh4asm as asm;
use sh4_core::sh4dec::OpcodeTable;
use sh4_core::sh4mem::{MapMode, Memory};
use sh4_core::translator::Translator;
use sh4_core::{CompileError, Sh4Ctx, backend_ipr, reg};

/// Runs `block` through both backends from the same initial state and
/// asserts the full register files agree.
fn differential(block: &BasicBlock, init: &Sh4Ctx) -> Sh4Ctx {
    let mut interp_ctx = init.clone();
    let mut mem = Memory::new();
    backend_ipr::execute(&mut interp_ctx, &mut mem, block);

    let mut native_ctx = init.clone();
    let native = backend_x64::compile(block).expect("block must compile");
    native.run(&mut native_ctx);

    assert_eq!(interp_ctx.r, native_ctx.r, "general registers diverge");
    assert_eq!(interp_ctx.r_bank, native_ctx.r_bank, "banked registers diverge");
    assert_eq!(interp_ctx.sr.0, native_ctx.sr.0, "SR diverges");
    assert_eq!(interp_ctx.pc, native_ctx.pc, "PC diverges");
    assert_eq!(interp_ctx.macl, native_ctx.macl, "MACL diverges");
    assert_eq!(interp_ctx.mach, native_ctx.mach, "MACH diverges");
    native_ctx
}

fn seeded_ctx() -> Sh4Ctx {
    let mut ctx = Sh4Ctx::default();
    for i in 0..16 {
        ctx.r[i] = (i as u32).wrapping_mul(0x1111_1111) ^ 0xA5A5;
    }
    ctx
}

#[test]
fn arithmetic_matches_interpreter() {
    let mut em = EmitterContext::new();
    let r0 = em.reg(0);
    let r1 = em.reg(1);
    let sum = em.add(r0, r1);
    em.copy(sum.clone(), em.reg(2));

    let big = em.constant(0xFFFF_FFFF);
    let one = em.constant(1);
    let wrapped = em.add(big, one);
    em.copy(wrapped, em.reg(3));

    let a = em.constant(0);
    let b = em.constant(1);
    let borrow = em.sub(a, b);
    em.copy(borrow, em.reg(4));

    let imm = em.constant(0x1234);
    let masked = em.and(sum, imm);
    em.copy(masked, em.reg(5));

    let ctx = differential(&em.finish(), &seeded_ctx());
    assert_eq!(ctx.r[3], 0);
    assert_eq!(ctx.r[4], 0xFFFF_FFFF);
}

#[test]
fn logic_and_multiply_match() {
    let mut em = EmitterContext::new();
    let a = em.reg(1);
    let b = em.reg(2);
    let x = em.xor(a, b);
    em.copy(x, em.reg(3));
    let a = em.reg(4);
    let n = em.not(a);
    em.copy(n, em.reg(5));
    let a = em.reg(6);
    let b = em.reg(7);
    let o = em.or(a, b);
    em.copy(o, em.reg(8));

    let a = em.constant(0xFFFF_FFFB); // -5
    let b = em.constant(7);
    let p = em.mul_signed(a, b);
    em.copy(p, em.reg(9));
    let a = em.constant(0x1000_0001);
    let b = em.constant(0x10);
    let q = em.mul(a, b);
    em.copy(q, em.reg(10));

    let ctx = differential(&em.finish(), &seeded_ctx());
    assert_eq!(ctx.r[9], (-35i32) as u32);
    assert_eq!(ctx.r[10], 0x0000_0010);
}

#[test]
fn shifts_match() {
    let mut em = EmitterContext::new();
    let one = em.constant(1);

    let v = em.constant(0x8000_0000);
    let r = em.rol(v, one.clone());
    em.copy(r, em.reg(0));

    let v = em.constant(1);
    let r = em.ror(v, one.clone());
    em.copy(r, em.reg(1));

    let v = em.constant(0x8000_0000);
    let r = em.shr(v, one.clone());
    em.copy(r, em.reg(2));

    let v = em.constant(0x8000_0000);
    let r = em.sar(v, one);
    em.copy(r, em.reg(3));

    // Dynamic counts come from a register.
    let v = em.reg(4);
    let amt = em.reg(5);
    let r = em.shl(v, amt);
    em.copy(r, em.reg(6));

    let mut init = seeded_ctx();
    init.r[4] = 0x0000_00FF;
    init.r[5] = 8;
    let ctx = differential(&em.finish(), &init);
    assert_eq!(ctx.r[0], 1);
    assert_eq!(ctx.r[1], 0x8000_0000);
    assert_eq!(ctx.r[2], 0x4000_0000);
    assert_eq!(ctx.r[3], 0xC000_0000);
    assert_eq!(ctx.r[6], 0xFF00);
}

#[test]
fn extensions_match() {
    let mut em = EmitterContext::new();
    let v = em.constant(0xFF);
    let r = em.sign_ext8(v);
    em.copy(r, em.reg(0));
    let v = em.constant(0xFF);
    let r = em.zero_ext8(v);
    em.copy(r, em.reg(1));
    let v = em.constant(0x8000);
    let r = em.sign_ext16(v);
    em.copy(r, em.reg(2));
    let v = em.constant(0x1_8000);
    let r = em.zero_ext16(v);
    em.copy(r, em.reg(3));

    let ctx = differential(&em.finish(), &seeded_ctx());
    assert_eq!(ctx.r[0], 0xFFFF_FFFF);
    assert_eq!(ctx.r[1], 0xFF);
    assert_eq!(ctx.r[2], 0xFFFF_8000);
    assert_eq!(ctx.r[3], 0x8000);
}

#[test]
fn compare_signedness_matches() {
    let mut em = EmitterContext::new();
    let cases: [(u32, u32); 4] = [(0xFFFF_FFFF, 1), (1, 0xFFFF_FFFF), (5, 5), (0, 0x8000_0000)];
    let mut dst = 0u8;
    for (a, b) in cases {
        let (ca, cb) = (em.constant(a), em.constant(b));
        let r = em.cmp_gt(ca, cb);
        em.copy(r, em.reg(dst));
        let (ca, cb) = (em.constant(a), em.constant(b));
        let r = em.cmp_gt_signed(ca, cb);
        em.copy(r, em.reg(dst + 1));
        let (ca, cb) = (em.constant(a), em.constant(b));
        let r = em.cmp_ge(ca, cb);
        em.copy(r, em.reg(dst + 2));
        let (ca, cb) = (em.constant(a), em.constant(b));
        let r = em.cmp_ge_signed(ca, cb);
        em.copy(r, em.reg(dst + 3));
        dst += 4;
    }

    let ctx = differential(&em.finish(), &Sh4Ctx::default());
    // Spot-check the first case: unsigned max vs 1.
    assert_eq!(ctx.r[0], 1);
    assert_eq!(ctx.r[1], 0);
    assert_eq!(ctx.r[2], 1);
    assert_eq!(ctx.r[3], 0);
}

#[test]
fn branch_label_roundtrip() {
    let mut em = EmitterContext::new();
    let c1 = em.constant(1);
    em.copy(c1, em.reg(1));
    let skip = em.label();
    em.branch(&skip);
    let c2 = em.constant(2);
    em.copy(c2, em.reg(1));
    em.mark_label(&skip);
    let c3 = em.constant(3);
    em.copy(c3, em.reg(1));

    let ctx = differential(&em.finish(), &Sh4Ctx::default());
    assert_eq!(ctx.r[1], 3);
}

#[test]
fn branch_to_block_end() {
    let mut em = EmitterContext::new();
    let end = em.label();
    let r0 = em.reg(0);
    let cond = em.is_zero(r0);
    em.branch_if_true(cond, &end);
    let c = em.constant(0x77);
    em.copy(c, em.reg(1));
    em.mark_label(&end);
    let block = em.finish();

    let ctx = differential(&block, &Sh4Ctx::default());
    assert_eq!(ctx.r[1], 0, "jump over the tail leaves R1 untouched");

    let mut init = Sh4Ctx::default();
    init.r[0] = 5;
    let ctx = differential(&block, &init);
    assert_eq!(ctx.r[1], 0x77);
}

#[test]
fn backward_branch_loops() {
    // R0 counts down to zero: head: R0 -= 1; if R0 != 0 goto head.
    let mut em = EmitterContext::new();
    let head = em.label();
    em.mark_label(&head);
    let r0 = em.reg(0);
    let one = em.constant(1);
    let dec = em.sub(r0, one);
    em.copy(dec.clone(), em.reg(0));
    let zero = em.constant(0);
    let done = em.cmp_ne(dec, zero);
    em.branch_if_true(done, &head);
    let block = em.finish();

    let mut init = Sh4Ctx::default();
    init.r[0] = 10;
    init.r[1] = 0xFEED;
    let ctx = differential(&block, &init);
    assert_eq!(ctx.r[0], 0);
    assert_eq!(ctx.r[1], 0xFEED);
}

#[test]
fn spilled_locals_roundtrip() {
    // More simultaneously-live values than allocatable registers, so some
    // spill; every input must still reach the final sum intact.
    let mut em = EmitterContext::new();
    let mut temps = Vec::new();
    for i in 0..10u32 {
        let r = em.reg((i % 8) as u8);
        let c = em.constant(i * 0x101);
        let t = em.add(r, c);
        temps.push(t);
    }
    let mut acc = temps[0].clone();
    for t in &temps[1..] {
        acc = em.add(acc, t.clone());
    }
    em.copy(acc, em.reg(15));

    let ctx = differential(&em.finish(), &seeded_ctx());
    let mut expected = 0u32;
    let init = seeded_ctx();
    for i in 0..10u32 {
        expected = expected.wrapping_add(init.r[(i % 8) as usize].wrapping_add(i * 0x101));
    }
    assert_eq!(ctx.r[15], expected);
}

#[test]
fn control_registers_reach_native_code() {
    let mut em = EmitterContext::new();
    let sr = em.reg(reg::SR);
    let one = em.constant(1);
    let t = em.and(sr, one);
    em.copy(t, em.reg(0));
    let c = em.constant(0xABCD);
    em.copy(c, em.reg(reg::GBR));
    let bank = em.reg(reg::BANK0 + 2);
    let two = em.constant(2);
    let v = em.add(bank, two);
    em.copy(v, em.reg(reg::BANK0 + 2));

    let mut init = seeded_ctx();
    init.sr.0 = 0x701;
    init.r_bank[2] = 40;
    let ctx = differential(&em.finish(), &init);
    assert_eq!(ctx.r[0], 1);
    assert_eq!(ctx.gbr, 0xABCD);
    assert_eq!(ctx.r_bank[2], 42);
}

#[test]
fn memory_access_is_rejected_before_codegen() {
    let mut em = EmitterContext::new();
    let addr = em.constant(0x1000);
    let ea = em.mem(addr, Width::Dword);
    let v = em.load(ea);
    em.copy(v, em.reg(0));
    match backend_x64::compile(&em.finish()) {
        Err(CompileError::MemoryAccess { index }) => assert_eq!(index, 0),
        other => panic!("expected MemoryAccess rejection, got {other:?}"),
    }

    let mut em = EmitterContext::new();
    let addr = em.constant(0x1000);
    let ea = em.mem(addr, Width::Byte);
    let v = em.constant(1);
    em.store(ea, v);
    assert!(matches!(
        backend_x64::compile(&em.finish()),
        Err(CompileError::MemoryAccess { .. })
    ));
}

#[test]
fn allocator_never_overlaps_a_host_register() {
    // A pile of overlapping and disjoint ranges, then check the invariant
    // directly: equal registers imply disjoint intervals.
    let mut em = EmitterContext::new();
    let mut keep = Vec::new();
    for i in 0..12u32 {
        let c = em.constant(i);
        let r = em.reg((i % 4) as u8);
        keep.push(em.add(c, r));
    }
    for chunk in keep.chunks(2) {
        let sum = em.add(chunk[0].clone(), chunk[1].clone());
        em.copy(sum, em.reg(14));
    }
    let block = em.finish();

    let liveness = Liveness::analyze(&block);
    let alloc = allocate(&liveness, 40);
    let located: Vec<_> = liveness
        .ranges
        .iter()
        .map(|r| (r, alloc.location(r.id).unwrap()))
        .collect();

    for (i, (ra, la)) in located.iter().enumerate() {
        for (rb, lb) in located.iter().skip(i + 1) {
            if let (Location::Reg(a), Location::Reg(b)) = (la, lb) {
                if a == b {
                    assert!(
                        ra.end < rb.start || rb.end < ra.start,
                        "ranges {ra:?} and {rb:?} share {a:?}"
                    );
                }
            }
        }
    }

    // Locals that spilled keep a unique stack slot.
    let mut slots = Vec::new();
    for (_, l) in &located {
        if let Location::Stack(slot) = l {
            assert!(!slots.contains(slot), "slot {slot} reused");
            slots.push(*slot);
        }
    }
}

#[test]
fn translated_guest_sequence_matches_end_to_end() {
    // add R0,R1; add #5,R1; sub R0,R1 through the translator, then both
    // backends from the same register file.
    let program = [
        asm::add(0, 1),
        asm::add_i(5, 1),
        asm::sub(0, 1),
        asm::rts(),
        asm::nop(),
    ];

    let mut ram = vec![0u8; 0x1000];
    let mut mem = Memory::new();
    mem.map_memory(ram.as_mut_ptr(), 0, 0xFFF, MapMode::READ_WRITE);
    for (i, &opcode) in program.iter().enumerate() {
        mem.write16(i as u32 * 2, opcode);
    }

    let mut translator = Translator::new(Arc::new(OpcodeTable::new()));
    let block = translator.block_at(&mut mem, 0, false).unwrap();

    let mut init = Sh4Ctx::default();
    init.r[0] = 1000;
    init.r[1] = 234;
    init.pr = 0x8000;

    let mut interp_ctx = init.clone();
    backend_ipr::execute(&mut interp_ctx, &mut mem, &block);

    let native = backend_x64::compile(&block).expect("no memory ops in this block");
    let mut native_ctx = init.clone();
    native.run(&mut native_ctx);

    assert_eq!(interp_ctx.r, native_ctx.r);
    assert_eq!(interp_ctx.pc, native_ctx.pc);
    assert_eq!(native_ctx.r[1], 234 + 1000 + 5 - 1000);
    assert_eq!(native_ctx.pc, 0x8000);
}

#[test]
fn translated_flag_block_matches() {
    // cmp/gt + movt exercises SR through both backends.
    let program = [
        asm::cmp_gt(0, 1),
        asm::movt(2),
        asm::cmp_hi(0, 1),
        asm::movt(3),
        asm::rts(),
        asm::nop(),
    ];

    let mut ram = vec![0u8; 0x1000];
    let mut mem = Memory::new();
    mem.map_memory(ram.as_mut_ptr(), 0, 0xFFF, MapMode::READ_WRITE);
    for (i, &opcode) in program.iter().enumerate() {
        mem.write16(i as u32 * 2, opcode);
    }

    let mut translator = Translator::new(Arc::new(OpcodeTable::new()));
    let block = translator.block_at(&mut mem, 0, false).unwrap();

    let mut init = Sh4Ctx::default();
    init.r[0] = 0xFFFF_FFFF; // -1 signed, max unsigned
    init.r[1] = 1;
    init.pr = 0x4000;

    let mut interp_ctx = init.clone();
    backend_ipr::execute(&mut interp_ctx, &mut mem, &block);

    let native = backend_x64::compile(&block).unwrap();
    let mut native_ctx = init;
    native.run(&mut native_ctx);

    assert_eq!(interp_ctx.r, native_ctx.r);
    assert_eq!(interp_ctx.sr.0, native_ctx.sr.0);
    assert_eq!(native_ctx.r[2], 1, "cmp/gt is signed: 1 > -1");
    assert_eq!(native_ctx.r[3], 0, "cmp/hi is unsigned: 1 < 0xFFFFFFFF");
}

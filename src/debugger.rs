//! Interactive debugger REPL over a [`Machine`]: stepping, register and
//! memory inspection, breakpoints and continuous execution.

use std::io::{self, BufRead, Write};

use sh4_core::sh4dasm;

use crate::machine::{Backend, Machine, Stop};

fn parse_u32(s: &str) -> Option<u32> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).ok()
    } else {
        s.parse().ok()
    }
}

fn report(stop: &Stop) {
    match stop {
        Stop::Breakpoint(pc) => println!("breakpoint at {pc:08X}"),
        Stop::Translate(e) => println!("translation halted: {e}"),
        Stop::Compile(pc, e) => println!("native compilation of block {pc:08X} failed: {e}"),
    }
}

fn disassemble_at(machine: &mut Machine, pc: u32) -> String {
    let opcode = machine.mem.read16(pc);
    sh4dasm::disassemble(machine.translator.table(), opcode, pc).text
}

fn hex_dump(machine: &mut Machine, start: u32, lines: usize) {
    const BYTES_PER_LINE: u32 = 16;
    let mut addr = start;
    for _ in 0..lines {
        print!("{addr:08X}  ");
        for i in 0..BYTES_PER_LINE {
            print!("{:02X} ", machine.mem.read8(addr.wrapping_add(i)));
            if i == BYTES_PER_LINE / 2 - 1 {
                print!(" ");
            }
        }
        print!(" ");
        for i in 0..BYTES_PER_LINE {
            let b = machine.mem.read8(addr.wrapping_add(i));
            let c = if (32..=126).contains(&b) { b as char } else { '.' };
            print!("{c}");
        }
        println!();
        addr = addr.wrapping_add(BYTES_PER_LINE);
    }
}

pub fn repl(machine: &mut Machine) {
    println!("debug mode: s (step), x (run block), resume, r (registers), d [n] (disassemble),");
    println!("h <addr> (hex dump), r8/r16/r32 <addr>, w8/w16/w32 <addr>,<value>,");
    println!("bp <addr> [end], bd <addr>, i (toggle IR), backend <ipr|x64>, q (quit)");

    let stdin = io::stdin();
    let mut show_ir = false;
    let mut last_cmd = String::new();

    loop {
        let pc = machine.ctx.pc;
        print!("{pc:08X} ({:<24}) > ", disassemble_at(machine, pc));
        io::stdout().flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }
        let mut cmd = line.trim().to_ascii_lowercase();
        if cmd.is_empty() {
            cmd = last_cmd.clone();
        }
        last_cmd = cmd.clone();

        match cmd.as_str() {
            "q" => break,
            "i" => {
                show_ir = !show_ir;
                println!("IR dump {}", if show_ir { "enabled" } else { "disabled" });
            }
            "r" => print!("{}", machine.ctx),
            "s" => match machine.step_with_ir() {
                Ok(block) if show_ir => print!("{block}"),
                Ok(_) => {}
                Err(stop) => report(&stop),
            },
            "x" => {
                if let Err(stop) = machine.run_block() {
                    report(&stop);
                }
            }
            "resume" | "c" => {
                // Runs until something stops it; fatal conditions halt
                // rather than being guessed around.
                loop {
                    if let Err(stop) = machine.run_block() {
                        report(&stop);
                        break;
                    }
                }
            }
            "backend ipr" => {
                machine.backend = Backend::Interpreter;
                println!("backend: interpreter");
            }
            #[cfg(all(target_arch = "x86_64", unix))]
            "backend x64" => {
                machine.backend = Backend::Native;
                println!("backend: native");
            }
            _ => {
                if cmd == "d" || cmd.starts_with("d ") {
                    let count = cmd[1..].trim().parse::<u32>().unwrap_or(1);
                    for i in 0..count {
                        let addr = machine.ctx.pc.wrapping_add(i * 2);
                        let opcode = machine.mem.read16(addr);
                        println!(
                            "{addr:08X} {opcode:04X} {}",
                            sh4dasm::disassemble(machine.translator.table(), opcode, addr).text
                        );
                    }
                    continue;
                }
                if let Some(rest) = cmd.strip_prefix("h ") {
                    match parse_u32(rest) {
                        Some(addr) => hex_dump(machine, addr, 8),
                        None => println!("usage: h <addr>"),
                    }
                    continue;
                }
                if let Some(rest) = cmd.strip_prefix("bp ") {
                    let mut parts = rest.split_whitespace();
                    let start = parts.next().and_then(parse_u32);
                    let end = parts.next().and_then(parse_u32);
                    match start {
                        Some(start) => {
                            let end = end.unwrap_or(start);
                            machine.translator.add_breakpoint(start, end);
                            println!("breakpoint {start:08X}..{end:08X}");
                        }
                        None => println!("usage: bp <addr> [end]"),
                    }
                    continue;
                }
                if let Some(rest) = cmd.strip_prefix("bd ") {
                    match parse_u32(rest) {
                        Some(addr) => {
                            machine.translator.remove_breakpoint(addr);
                            machine.translator.clear_cache();
                            println!("breakpoint at {addr:08X} removed");
                        }
                        None => println!("usage: bd <addr>"),
                    }
                    continue;
                }
                if let Some(rest) = cmd
                    .strip_prefix("r8 ")
                    .map(|r| (8u8, r))
                    .or_else(|| cmd.strip_prefix("r16 ").map(|r| (16, r)))
                    .or_else(|| cmd.strip_prefix("r32 ").map(|r| (32, r)))
                {
                    let (width, arg) = rest;
                    match parse_u32(arg) {
                        Some(addr) => match width {
                            8 => println!("[{addr:08X}] -> 0x{:02X}", machine.mem.read8(addr)),
                            16 => println!("[{addr:08X}] -> 0x{:04X}", machine.mem.read16(addr)),
                            _ => println!("[{addr:08X}] -> 0x{:08X}", machine.mem.read32(addr)),
                        },
                        None => println!("usage: r8|r16|r32 <addr>"),
                    }
                    continue;
                }
                if let Some(rest) = cmd
                    .strip_prefix("w8 ")
                    .map(|r| (8u8, r))
                    .or_else(|| cmd.strip_prefix("w16 ").map(|r| (16, r)))
                    .or_else(|| cmd.strip_prefix("w32 ").map(|r| (32, r)))
                {
                    let (width, arg) = rest;
                    let mut parts = arg.splitn(2, ',');
                    let addr = parts.next().and_then(parse_u32);
                    let value = parts.next().and_then(parse_u32);
                    match (addr, value) {
                        (Some(addr), Some(value)) => match width {
                            8 => machine.mem.write8(addr, value as u8),
                            16 => machine.mem.write16(addr, value as u16),
                            _ => machine.mem.write32(addr, value),
                        },
                        _ => println!("usage: w8|w16|w32 <addr>,<value>"),
                    }
                    continue;
                }
                println!("unknown command: {cmd}");
            }
        }
    }
}

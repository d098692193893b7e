use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use katana::debugger;
use katana::machine::{Backend, Machine};
use sh4_core::sh4dec::OpcodeTable;

#[derive(Parser)]
#[command(about = "SH4 emulator with an IR interpreter and an x86-64 dynarec")]
struct Args {
    /// Boot ROM image (2 MiB).
    #[arg(long)]
    rom: Option<PathBuf>,

    /// Flash image (256 KiB).
    #[arg(long)]
    flash: Option<PathBuf>,

    /// Execution backend: "ipr" or "x64".
    #[arg(long, default_value = "ipr")]
    backend: String,

    /// Run this many translated blocks and exit instead of entering the
    /// debugger.
    #[arg(long)]
    run: Option<u64>,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let table = Arc::new(OpcodeTable::new());
    let mut machine = Machine::new(table);

    match args.backend.as_str() {
        "ipr" => machine.backend = Backend::Interpreter,
        #[cfg(all(target_arch = "x86_64", unix))]
        "x64" => machine.backend = Backend::Native,
        other => {
            eprintln!("unknown backend {other:?}");
            return ExitCode::FAILURE;
        }
    }

    if let Some(rom) = &args.rom {
        if let Err(e) = machine.load_rom(rom) {
            eprintln!("failed to load ROM {}: {e}", rom.display());
            return ExitCode::FAILURE;
        }
    }
    if let Some(flash) = &args.flash {
        if let Err(e) = machine.load_flash(flash) {
            eprintln!("failed to load flash {}: {e}", flash.display());
            return ExitCode::FAILURE;
        }
    }

    match args.run {
        Some(blocks) => {
            if let Err(stop) = machine.run(blocks) {
                eprintln!("stopped: {stop:?}");
                eprintln!("{}", machine.ctx);
                return ExitCode::FAILURE;
            }
            println!("{}", machine.ctx);
            ExitCode::SUCCESS
        }
        None => {
            debugger::repl(&mut machine);
            ExitCode::SUCCESS
        }
    }
}

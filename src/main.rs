use clap::Parser;
use std::error::Error;
use std::fs::File;
use std::path::PathBuf;
use std::time::Duration;

use chip8_vm::display::MonoTermDisplay;
use chip8_vm::input::TermInput;
use chip8_vm::memory::Chip8MemoryMap;
use chip8_vm::timing::{Halt, MAX_RATE_HZ, MIN_RATE_HZ};
use chip8_vm::{Chip8Interpreter, Config};

/// Run a CHIP-8 program in the terminal. Esc quits.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// program image, loaded at 0x200
    rom: PathBuf,

    /// instructions per second
    #[arg(
        long,
        default_value_t = 700,
        value_parser = clap::value_parser!(u32).range(MIN_RATE_HZ as i64..=MAX_RATE_HZ as i64)
    )]
    rate: u32,

    /// seed the random number generator, for repeatable runs
    #[arg(long)]
    seed: Option<u64>,

    /// stop after this many instructions
    #[arg(long)]
    cycles: Option<u64>,

    /// how long a key press counts as held, in milliseconds
    #[arg(long, default_value_t = 150)]
    key_hold_ms: u64,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();
    let config = Config {
        rate_hz: args.rate,
        seed: args.seed,
        key_hold: Duration::from_millis(args.key_hold_ms),
    };
    log::debug!("{:?}", config);

    let mut pacer = config.pacer()?;

    // load a program
    let mut f = File::open(&args.rom)?;
    let memory = Chip8MemoryMap::with_program(&mut f)?;

    // initialise
    let halt = Halt::new();
    let display = MonoTermDisplay::new()?;
    let input = TermInput::new(config.key_hold, halt.clone())?;
    let mut interpreter = Chip8Interpreter::new(memory, display, input, &config);

    let result = interpreter.main_loop(&mut pacer, &halt, args.cycles);
    // leave raw mode before anything gets printed
    drop(interpreter);

    let executed = result?;
    log::info!("ran {} instructions", executed);
    Ok(())
}

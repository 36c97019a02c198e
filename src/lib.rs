//! # chip8-vm
//!
//! A CHIP-8 virtual machine: 4K of memory, sixteen byte registers, a
//! 16-deep call stack, two 60Hz timers and a 64x32 monochrome screen.
//!
//! ## Design
//!
//! * one [`Chip8Interpreter`] owns all machine state; several can run side
//!   by side
//! * instructions are decoded into an [`instruction::Instruction`] before
//!   anything executes, so a bad word faults without touching state
//! * display and input are traits handed in at construction; the terminal
//!   versions use tui and crossterm, the dummy ones make the VM testable
//! * timing lives outside the cycle: a [`timing::Pacer`] turns wall time
//!   into instruction cycles and 60Hz timer ticks, which run independently
//! * faults are fatal and carry the pc of the instruction that caused them
//!
//! Model
//!
//! ```text
//! main
//!  |-- config, memory(program), display, input, halt
//!  |-- interpreter(memory, display, input, config)
//!  `-- main loop
//!       |-- input.poll()
//!       |-- due = pacer.advance(elapsed)
//!       |-- tick timers due.ticks times
//!       |-- cycle due.cycles times; stop early on a key wait
//!       `-- sleep(pacer.until_next())
//! ```
pub mod config;
pub mod display;
pub mod error;
pub mod font;
pub mod input;
pub mod instruction;
pub mod interpreter;
pub mod memory;
pub mod registers;
pub mod timing;

pub use config::Config;
pub use error::{Error, Fault};
pub use interpreter::{Chip8Interpreter, CycleStatus};

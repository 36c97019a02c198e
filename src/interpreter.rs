//! # interpreter
//!
//! One cycle:
//!  1. fetch the big-endian word at pc (pc must sit on an even address
//!     inside program memory)
//!  2. decode it into an [`Instruction`]
//!  3. execute it, which says where pc goes next: the following
//!     instruction, the one after that (skip), somewhere else (jump, call,
//!     return) or nowhere (waiting on a key)
//!  4. if the frame changed, hand it to the display
//!
//! Any fault stops the machine; there's no recovering from a bad program.
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io;
use std::time::Instant;

use crate::config::Config;
use crate::display::{Display, FrameBuffer};
use crate::error::{Error, Fault};
use crate::font;
use crate::input::{Input, KEY_COUNT};
use crate::instruction::Instruction;
use crate::memory::{Chip8MemoryMap, MemoryMap, PROGRAM_ADDR, RAM_SIZE_BYTES};
use crate::registers::{Registers, Stack, Timers};
use crate::timing::{Halt, Pacer};

/// size of an instruction in bytes
const OP_CODE_BYTES: u16 = 2;

/// what happened in a cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleStatus {
    /// executed, nothing to show
    Continue,
    /// executed and the display was refreshed
    Redraw,
    /// stuck on `Fx0A`; pc hasn't moved
    Waiting,
}

/// where pc goes after an instruction
enum Flow {
    Next,
    Skip,
    Jump(u16),
    Wait,
}

impl Flow {
    fn skip_if(cond: bool) -> Flow {
        if cond {
            Flow::Skip
        } else {
            Flow::Next
        }
    }
}

/// The whole machine. Owns its state outright, so any number of them can
/// exist side by side; the display and keypad are handed in at construction.
pub struct Chip8Interpreter<D: Display, I: Input> {
    memory: Chip8MemoryMap,
    registers: Registers,
    stack: Stack,
    timers: Timers,
    frame: FrameBuffer,
    redraw: bool,
    /// keys already down when `Fx0A` started waiting; only a key that goes
    /// down after that ends the wait
    key_wait: Option<[bool; KEY_COUNT as usize]>,
    display: D,
    input: I,
    rng: StdRng,
}

impl<D: Display, I: Input> Chip8Interpreter<D, I> {
    pub fn new(memory: Chip8MemoryMap, display: D, input: I, config: &Config) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Chip8Interpreter {
            memory,
            registers: Registers::new(),
            stack: Stack::new(),
            timers: Timers::default(),
            frame: FrameBuffer::new(),
            redraw: false,
            key_wait: None,
            display,
            input,
            rng,
        }
    }

    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    pub fn memory(&self) -> &Chip8MemoryMap {
        &self.memory
    }

    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    /// one 60Hz timer tick
    pub fn tick_timers(&mut self) {
        self.timers.tick();
    }

    /// fetch, decode and execute one instruction
    pub fn cycle(&mut self) -> Result<CycleStatus, Error> {
        let pc = self.registers.pc;
        let flow = self
            .fetch()
            .and_then(|ins| {
                log::trace!("{:#05x}: {}", pc, ins);
                self.execute(ins, pc)
            })
            .map_err(|fault| Error::Fatal { pc, fault })?;

        self.registers.pc = match flow {
            Flow::Next => pc.wrapping_add(OP_CODE_BYTES),
            Flow::Skip => pc.wrapping_add(2 * OP_CODE_BYTES),
            Flow::Jump(addr) => addr,
            Flow::Wait => return Ok(CycleStatus::Waiting),
        };

        if self.redraw {
            self.present()?;
            return Ok(CycleStatus::Redraw);
        }
        Ok(CycleStatus::Continue)
    }

    /// Run until halted, or until `limit` instructions have executed.
    /// Timers tick at 60Hz and instructions run at the pacer's rate; input
    /// is polled between batches of cycles. Returns how many instructions
    /// ran.
    pub fn main_loop(
        &mut self,
        pacer: &mut Pacer,
        halt: &Halt,
        limit: Option<u64>,
    ) -> Result<u64, Error> {
        let mut executed: u64 = 0;
        let mut last = Instant::now();

        while !halt.is_requested() {
            self.input.poll()?;

            let now = Instant::now();
            let due = pacer.advance(now.duration_since(last));
            last = now;

            for _ in 0..due.ticks {
                self.tick_timers();
            }
            for _ in 0..due.cycles {
                if limit.map_or(false, |limit| executed >= limit) {
                    log::info!("stopping after {} instructions", executed);
                    return Ok(executed);
                }
                match self.cycle() {
                    // no point spinning on the key wait until input is polled again
                    Ok(CycleStatus::Waiting) => break,
                    Ok(_) => executed += 1,
                    Err(e) => {
                        log::error!("{}", e);
                        return Err(e);
                    }
                }
            }

            spin_sleep::sleep(pacer.until_next());
        }
        log::debug!("halted after {} instructions", executed);
        Ok(executed)
    }

    fn fetch(&self) -> Result<Instruction, Fault> {
        let pc = self.registers.pc;
        if pc < PROGRAM_ADDR || pc % 2 != 0 || pc as usize + 1 >= RAM_SIZE_BYTES {
            return Err(Fault::BadProgramCounter);
        }
        Instruction::decode(self.memory.get_word(pc as usize)?)
    }

    fn present(&mut self) -> Result<(), io::Error> {
        if self.frame.is_blank() {
            self.display.clear()?;
        } else {
            self.display.draw(self.frame.as_bytes())?;
        }
        self.redraw = false;
        Ok(())
    }

    fn key_down(&self, key: u8) -> Result<bool, Fault> {
        if key >= KEY_COUNT {
            return Err(Fault::InvalidKey { key });
        }
        Ok(self.input.is_pressed(key))
    }

    /// The lowest key pressed since the current `Fx0A` wait began. The first
    /// call of a wait only notes which keys are already down; a key held
    /// across the start of the wait has to be released and pressed again.
    fn new_key_press(&mut self, pc: u16) -> Option<u8> {
        let mut down = [false; KEY_COUNT as usize];
        for key in 0..KEY_COUNT {
            down[key as usize] = self.input.is_pressed(key);
        }

        if self.key_wait.is_none() {
            log::debug!("waiting for a key at {:#05x}", pc);
            self.key_wait = Some(down);
            return None;
        }
        let held = self.key_wait.get_or_insert(down);

        let pressed = (0..KEY_COUNT).find(|&key| down[key as usize] && !held[key as usize]);
        match pressed {
            Some(_) => self.key_wait = None,
            // forget keys that have come up, so pressing them again counts
            None => held.iter_mut().zip(down).for_each(|(h, d)| *h &= d),
        }
        pressed
    }

    /// set Vx to a computed value, then VF to the flag; in that order, so
    /// that the flag wins when x is F
    fn set_with_flag(&mut self, x: u8, (val, flag): (u8, bool)) {
        self.registers.set(x, val);
        self.registers.set_flag(flag);
    }

    fn execute(&mut self, ins: Instruction, pc: u16) -> Result<Flow, Fault> {
        use Instruction::*;
        let regs = &mut self.registers;
        let flow = match ins {
            ClearScreen => {
                self.frame.clear();
                self.redraw = true;
                Flow::Next
            }
            Return => Flow::Jump(self.stack.pop()?),
            Jump(nnn) => Flow::Jump(nnn),
            Call(nnn) => {
                self.stack.push(pc.wrapping_add(OP_CODE_BYTES))?;
                Flow::Jump(nnn)
            }
            SkipEqByte(x, kk) => Flow::skip_if(regs.get(x) == kk),
            SkipNeByte(x, kk) => Flow::skip_if(regs.get(x) != kk),
            SkipEqReg(x, y) => Flow::skip_if(regs.get(x) == regs.get(y)),
            SkipNeReg(x, y) => Flow::skip_if(regs.get(x) != regs.get(y)),
            LoadByte(x, kk) => {
                regs.set(x, kk);
                Flow::Next
            }
            AddByte(x, kk) => {
                regs.set(x, regs.get(x).wrapping_add(kk));
                Flow::Next
            }

            // register to register; logic ops leave VF alone
            Move(x, y) => {
                regs.set(x, regs.get(y));
                Flow::Next
            }
            Or(x, y) => {
                regs.set(x, regs.get(x) | regs.get(y));
                Flow::Next
            }
            And(x, y) => {
                regs.set(x, regs.get(x) & regs.get(y));
                Flow::Next
            }
            Xor(x, y) => {
                regs.set(x, regs.get(x) ^ regs.get(y));
                Flow::Next
            }
            Add(x, y) => {
                let result = regs.get(x).overflowing_add(regs.get(y));
                self.set_with_flag(x, result);
                Flow::Next
            }
            Sub(x, y) => {
                let (vx, vy) = (regs.get(x), regs.get(y));
                self.set_with_flag(x, (vx.wrapping_sub(vy), vx >= vy));
                Flow::Next
            }
            SubReverse(x, y) => {
                let (vx, vy) = (regs.get(x), regs.get(y));
                self.set_with_flag(x, (vy.wrapping_sub(vx), vy >= vx));
                Flow::Next
            }
            ShiftRight(x) => {
                let vx = regs.get(x);
                self.set_with_flag(x, (vx >> 1, vx & 0x01 != 0));
                Flow::Next
            }
            ShiftLeft(x) => {
                let vx = regs.get(x);
                self.set_with_flag(x, (vx << 1, vx & 0x80 != 0));
                Flow::Next
            }

            LoadIndex(nnn) => {
                regs.i = nnn;
                Flow::Next
            }
            // may land past the end of memory; the next fetch catches that
            JumpOffset(nnn) => Flow::Jump(nnn + regs.get(0) as u16),
            Random(x, kk) => {
                let byte: u8 = self.rng.gen();
                self.registers.set(x, byte & kk);
                Flow::Next
            }
            Draw(x, y, n) => {
                let (col, row) = (regs.get(x) as usize, regs.get(y) as usize);
                let sprite = self.memory.get_ro_slice(regs.i as usize, n as usize)?;
                let erased = self.frame.draw_sprite(col, row, sprite);
                self.registers.set_flag(erased);
                self.redraw = true;
                Flow::Next
            }

            SkipKeyDown(x) => {
                let key = regs.get(x);
                Flow::skip_if(self.key_down(key)?)
            }
            SkipKeyUp(x) => {
                let key = regs.get(x);
                Flow::skip_if(!self.key_down(key)?)
            }

            ReadDelay(x) => {
                regs.set(x, self.timers.delay);
                Flow::Next
            }
            WaitKey(x) => match self.new_key_press(pc) {
                Some(key) => {
                    self.registers.set(x, key);
                    Flow::Next
                }
                None => Flow::Wait,
            },
            SetDelay(x) => {
                self.timers.delay = regs.get(x);
                Flow::Next
            }
            SetSound(x) => {
                self.timers.sound = regs.get(x);
                Flow::Next
            }
            AddIndex(x) => {
                regs.i = regs.i.wrapping_add(regs.get(x) as u16);
                Flow::Next
            }
            Glyph(x) => {
                regs.i = font::glyph_addr(regs.get(x));
                Flow::Next
            }
            Bcd(x) => {
                let vx = regs.get(x);
                let digits = [vx / 100, vx / 10 % 10, vx % 10];
                self.memory.write(&digits, regs.i as usize)?;
                Flow::Next
            }
            StoreRegs(x) => {
                self.memory.write(regs.up_to(x), regs.i as usize)?;
                Flow::Next
            }
            LoadRegs(x) => {
                let src = self.memory.get_ro_slice(regs.i as usize, x as usize + 1)?;
                regs.up_to_mut(x).copy_from_slice(src);
                Flow::Next
            }
        };
        Ok(flow)
    }
}

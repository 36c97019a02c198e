//! # registers
//!
//! Everything the interpreter keeps outside of addressable memory:
//!  * V0-VF, 8 bits each; VF doubles as carry/borrow/collision flag
//!  * I, the 16 bit address register
//!  * the program counter
//!  * a 16 deep return address stack
//!  * the delay and sound timers, both counting down at 60Hz

use crate::error::Fault;
use crate::memory::PROGRAM_ADDR;

pub const REG_COUNT: usize = 16;
pub const STACK_SIZE: usize = 16;

/// VF
pub const FLAG: u8 = 0xF;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registers {
    v: [u8; REG_COUNT],
    pub i: u16,
    pub pc: u16,
}

impl Registers {
    pub fn new() -> Self {
        Registers {
            v: [0; REG_COUNT],
            i: 0x0000,
            pc: PROGRAM_ADDR,
        }
    }

    /// register indices come out of a nibble, so are always < 16
    pub fn get(&self, reg: u8) -> u8 {
        self.v[reg as usize]
    }

    pub fn set(&mut self, reg: u8, val: u8) {
        self.v[reg as usize] = val;
    }

    /// VF as 0 or 1
    pub fn set_flag(&mut self, on: bool) {
        self.v[FLAG as usize] = on as u8;
    }

    /// V0 to Vx inclusive
    pub fn up_to(&self, x: u8) -> &[u8] {
        &self.v[..=x as usize]
    }

    pub fn up_to_mut(&mut self, x: u8) -> &mut [u8] {
        &mut self.v[..=x as usize]
    }
}

impl Default for Registers {
    fn default() -> Self {
        Registers::new()
    }
}

/// return addresses for CALL/RET
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stack {
    addresses: [u16; STACK_SIZE],
    sp: usize,
}

impl Stack {
    pub fn new() -> Self {
        Stack::default()
    }

    pub fn push(&mut self, addr: u16) -> Result<(), Fault> {
        let slot = self
            .addresses
            .get_mut(self.sp)
            .ok_or(Fault::StackOverflow)?;
        *slot = addr;
        self.sp += 1;
        Ok(())
    }

    pub fn pop(&mut self) -> Result<u16, Fault> {
        self.sp = self.sp.checked_sub(1).ok_or(Fault::StackUnderflow)?;
        Ok(self.addresses[self.sp])
    }

    pub fn depth(&self) -> usize {
        self.sp
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timers {
    pub delay: u8,
    pub sound: u8,
}

impl Timers {
    /// one 60Hz tick; both count down to zero and stay there
    pub fn tick(&mut self) {
        self.delay = self.delay.saturating_sub(1);
        self.sound = self.sound.saturating_sub(1);
    }

    /// the tone would be playing, if we had audio
    pub fn sounding(&self) -> bool {
        self.sound > 0
    }
}

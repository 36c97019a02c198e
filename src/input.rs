use crossterm::event::{poll, read, Event, KeyCode, KeyModifiers};
use crossterm::terminal;
use std::collections::HashMap;
use std::io;
use std::time::{Duration, Instant};

use crate::timing::Halt;

/// how many logical keys the COSMAC hex keypad has
pub const KEY_COUNT: u8 = 16;

/// map from the left-hand side of a qwerty keyboard to the hex keypad
///   1 2 3 4      1 2 3 C
///   q w e r  =>  4 5 6 D
///   a s d f      7 8 9 E
///   z x c v      A 0 B F
const CHIP8_CONVENTIONAL_KEYMAP: [(char, u8); 16] = [
    ('x', 0x00),
    ('1', 0x01),
    ('2', 0x02),
    ('3', 0x03),
    ('q', 0x04),
    ('w', 0x05),
    ('e', 0x06),
    ('a', 0x07),
    ('s', 0x08),
    ('d', 0x09),
    ('z', 0x0a),
    ('c', 0x0b),
    ('4', 0x0c),
    ('r', 0x0d),
    ('f', 0x0e),
    ('v', 0x0f),
];

/// reads the state of the hex keypad
pub trait Input {
    /// pull whatever the device has queued up into the key state; called
    /// between cycles, never during one
    fn poll(&mut self) -> Result<(), io::Error>;

    /// whether logical key 0x0-0xf is held down
    fn is_pressed(&self, key: u8) -> bool;
}

/// Terminals report key presses and auto-repeats but never releases, so a
/// key counts as held for `hold` after the last event for it.
#[derive(Debug, Clone)]
struct KeyHold {
    pressed_at: [Option<Instant>; KEY_COUNT as usize],
    hold: Duration,
}

impl KeyHold {
    fn new(hold: Duration) -> Self {
        KeyHold {
            pressed_at: [None; KEY_COUNT as usize],
            hold,
        }
    }

    fn press(&mut self, key: u8, at: Instant) {
        if let Some(slot) = self.pressed_at.get_mut(key as usize) {
            *slot = Some(at);
        }
    }

    fn is_held(&self, key: u8, now: Instant) -> bool {
        match self.pressed_at.get(key as usize) {
            Some(Some(at)) => now.saturating_duration_since(*at) < self.hold,
            _ => false,
        }
    }
}

/// Input from the terminal, using crossterm in raw mode.
pub struct TermInput {
    keymap: HashMap<char, u8>,
    keys: KeyHold,
    halt: Halt,
}

impl TermInput {
    pub fn new(hold: Duration, halt: Halt) -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        Ok(TermInput {
            keymap: HashMap::from(CHIP8_CONVENTIONAL_KEYMAP),
            keys: KeyHold::new(hold),
            halt,
        })
    }

    fn read_events(&mut self) -> Result<(), io::Error> {
        while poll(Duration::from_millis(0))? {
            if let Event::Key(evt) = read()? {
                match evt.code {
                    KeyCode::Esc => self.request_halt("escape"),
                    KeyCode::Char('c') if evt.modifiers.contains(KeyModifiers::CONTROL) => {
                        self.request_halt("ctrl-c")
                    }
                    KeyCode::Char(key) => match self.keymap.get(&key.to_ascii_lowercase()) {
                        Some(&mapped_key) => self.keys.press(mapped_key, Instant::now()),
                        None => log::warn!("can't map {:?} to a COSMAC key", key),
                    },
                    other => log::warn!("ignoring key event {:?}", other),
                }
            }
        }
        Ok(())
    }

    fn request_halt(&self, why: &str) {
        log::debug!("halt requested from keyboard ({})", why);
        self.halt.request();
    }
}

impl Drop for TermInput {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            log::error!("couldn't leave raw mode: {}", e);
        }
    }
}

impl Input for TermInput {
    fn poll(&mut self) -> Result<(), io::Error> {
        self.read_events()
    }

    fn is_pressed(&self, key: u8) -> bool {
        self.keys.is_held(key, Instant::now())
    }
}

/// dummy Input implementation for testing; keys stay down until released
#[derive(Debug, Default)]
pub struct DummyInput {
    keys: [bool; KEY_COUNT as usize],
    pub polls: usize,
}

impl DummyInput {
    pub fn new(pressed: &[u8]) -> Self {
        let mut input = DummyInput::default();
        for &key in pressed {
            input.press(key);
        }
        input
    }

    pub fn press(&mut self, key: u8) {
        self.keys[key as usize] = true;
    }

    pub fn release(&mut self, key: u8) {
        self.keys[key as usize] = false;
    }
}

impl Input for DummyInput {
    fn poll(&mut self) -> Result<(), io::Error> {
        self.polls += 1;
        Ok(())
    }

    fn is_pressed(&self, key: u8) -> bool {
        self.keys.get(key as usize).copied().unwrap_or(false)
    }
}

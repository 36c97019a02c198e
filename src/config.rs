use std::time::Duration;

use crate::error::Error;
use crate::timing::Pacer;

/// Knobs for building and running a VM. The binary fills this in from the
/// command line; tests mostly want `Config::default()` with a fixed seed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// instructions per second
    pub rate_hz: u32,
    /// seed for `Cxkk`; `None` seeds from the OS
    pub seed: Option<u64>,
    /// how long a terminal key press counts as held
    pub key_hold: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            rate_hz: 700,
            seed: None,
            key_hold: Duration::from_millis(150),
        }
    }
}

impl Config {
    /// fails if `rate_hz` is out of range
    pub fn pacer(&self) -> Result<Pacer, Error> {
        Pacer::new(self.rate_hz)
    }
}

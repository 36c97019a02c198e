use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::error::Error;

/// slowest and fastest instruction rates a [`Pacer`] will run at
pub const MIN_RATE_HZ: u32 = 1;
pub const MAX_RATE_HZ: u32 = 1_000_000;

/// the delay and sound timers always count at this rate
pub const TIMER_HZ: u32 = 60;

/// after a stall (debugger, suspended terminal) don't try to catch up on
/// more than this much wall time
const MAX_CATCH_UP: Duration = Duration::from_millis(250);

/// what a [`Pacer`] says should happen now
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Due {
    pub cycles: u32,
    pub ticks: u32,
}

/// Turns wall time into work. Instruction cycles and 60Hz timer ticks keep
/// separate accumulators, so changing the instruction rate never changes how
/// fast the timers run.
#[derive(Debug, Clone)]
pub struct Pacer {
    cycle_period: Duration,
    tick_period: Duration,
    cycle_debt: Duration,
    tick_debt: Duration,
}

impl Pacer {
    pub fn new(rate_hz: u32) -> Result<Self, Error> {
        if !(MIN_RATE_HZ..=MAX_RATE_HZ).contains(&rate_hz) {
            return Err(Error::InvalidRate {
                rate: rate_hz,
                min: MIN_RATE_HZ,
                max: MAX_RATE_HZ,
            });
        }
        Ok(Pacer {
            cycle_period: Duration::from_secs(1) / rate_hz,
            tick_period: Duration::from_secs(1) / TIMER_HZ,
            cycle_debt: Duration::ZERO,
            tick_debt: Duration::ZERO,
        })
    }

    /// account for `elapsed` and hand back the cycles and ticks now owed
    pub fn advance(&mut self, elapsed: Duration) -> Due {
        let elapsed = elapsed.min(MAX_CATCH_UP);
        self.cycle_debt += elapsed;
        self.tick_debt += elapsed;
        Due {
            cycles: drain(&mut self.cycle_debt, self.cycle_period),
            ticks: drain(&mut self.tick_debt, self.tick_period),
        }
    }

    /// how long until something else falls due
    pub fn until_next(&self) -> Duration {
        let cycle = self.cycle_period.saturating_sub(self.cycle_debt);
        let tick = self.tick_period.saturating_sub(self.tick_debt);
        cycle.min(tick)
    }
}

fn drain(debt: &mut Duration, period: Duration) -> u32 {
    let owed = (debt.as_nanos() / period.as_nanos()) as u32;
    *debt -= period * owed;
    owed
}

/// Cooperative cancellation for the run loop. Clones share the flag, so the
/// input adapter (or anything else) can stop a VM that's spinning in
/// `Fx0A` waiting for a key.
#[derive(Debug, Clone, Default)]
pub struct Halt(Arc<AtomicBool>);

impl Halt {
    pub fn new() -> Self {
        Halt::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycles_follow_rate() -> Result<(), Error> {
        let mut p = Pacer::new(600)?;
        let due = p.advance(Duration::from_millis(100));
        assert_eq!(due, Due { cycles: 60, ticks: 6 });
        Ok(())
    }

    #[test]
    fn test_ticks_ignore_rate() -> Result<(), Error> {
        for rate in [60, 500, 700, 2000] {
            let mut p = Pacer::new(rate)?;
            let ticks: u32 = (0..20)
                .map(|_| p.advance(Duration::from_millis(10)).ticks)
                .sum();
            // 200ms is 12 ticks at 60Hz
            assert_eq!(ticks, 12, "rate {}", rate);
        }
        Ok(())
    }

    #[test]
    fn test_remainder_carries_over() -> Result<(), Error> {
        let mut p = Pacer::new(100)?;
        assert_eq!(p.advance(Duration::from_millis(15)).cycles, 1);
        assert_eq!(p.advance(Duration::from_millis(4)).cycles, 0);
        // 15 + 4 + 1 = 20ms, two periods
        assert_eq!(p.advance(Duration::from_millis(1)).cycles, 1);
        Ok(())
    }

    #[test]
    fn test_catch_up_is_capped() -> Result<(), Error> {
        let mut p = Pacer::new(1000)?;
        let due = p.advance(Duration::from_secs(10));
        assert_eq!(due.cycles, 250);
        assert_eq!(due.ticks, 15);
        Ok(())
    }

    #[test]
    fn test_until_next() -> Result<(), Error> {
        let mut p = Pacer::new(100)?;
        assert_eq!(p.until_next(), Duration::from_millis(10));
        p.advance(Duration::from_millis(4));
        assert_eq!(p.until_next(), Duration::from_millis(6));
        Ok(())
    }

    #[test]
    fn test_rate_out_of_range_is_rejected() {
        for rate in [0, MAX_RATE_HZ + 1, 2_000_000_000, u32::MAX] {
            match Pacer::new(rate) {
                Err(Error::InvalidRate { rate: r, .. }) => assert_eq!(r, rate),
                other => panic!("rate {} gave {:?}", rate, other),
            }
        }
    }

    #[test]
    fn test_rate_limits_are_usable() -> Result<(), Error> {
        let mut slow = Pacer::new(MIN_RATE_HZ)?;
        let cycles: Vec<u32> = (0..4)
            .map(|_| slow.advance(Duration::from_millis(250)).cycles)
            .collect();
        assert_eq!(cycles, [0, 0, 0, 1]);

        let mut fast = Pacer::new(MAX_RATE_HZ)?;
        assert_eq!(fast.advance(Duration::from_millis(1)).cycles, 1000);
        Ok(())
    }

    #[test]
    fn test_halt_is_shared() {
        let halt = Halt::new();
        let other = halt.clone();
        assert!(!halt.is_requested());
        other.request();
        assert!(halt.is_requested());
    }
}

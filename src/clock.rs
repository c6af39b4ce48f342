//! # Clock
//!
//! Monotonic cycle counter shared by the CPU and the memory bus. Every
//! single-byte memory access advances the clock by one cycle, so the counter
//! is the authoritative cycle count of a run.
//!
//! The counter lives in a [`Cell`] so that memory and CPU can share a plain
//! `&Clock` within one thread; the clock is not meant to cross threads.

use std::cell::Cell;
use std::thread;
use std::time::{Duration, Instant};

/// Monotonic 64-bit cycle counter with optional wall-clock pacing.
///
/// An unpaced clock ([`Clock::new`]) only counts. A paced clock
/// ([`Clock::with_frequency`]) additionally sleeps on each tick until the
/// wall-clock time of that cycle, keeping emulated time close to real time.
///
/// # Examples
///
/// ```
/// use emu6502::Clock;
///
/// let clock = Clock::new();
/// assert_eq!(clock.current_cycle(), 0);
/// clock.wait_for_next_cycle();
/// clock.wait_for_next_cycle();
/// assert_eq!(clock.current_cycle(), 2);
/// ```
#[derive(Debug)]
pub struct Clock {
    cycle: Cell<u64>,
    start: Instant,
    frequency: Option<u64>,
}

impl Clock {
    /// Free-running clock: counts cycles, never sleeps.
    pub fn new() -> Self {
        Self {
            cycle: Cell::new(0),
            start: Instant::now(),
            frequency: None,
        }
    }

    /// Paced clock targeting `frequency` cycles per second.
    pub fn with_frequency(frequency: u64) -> Self {
        Self {
            cycle: Cell::new(0),
            start: Instant::now(),
            frequency: Some(frequency),
        }
    }

    /// Number of cycles elapsed since construction.
    pub fn current_cycle(&self) -> u64 {
        self.cycle.get()
    }

    /// Advance the clock by one cycle.
    ///
    /// When pacing is enabled, sleeps until `start + cycle / frequency` so
    /// the caller never runs ahead of real time. Unpaced clocks return
    /// immediately.
    pub fn wait_for_next_cycle(&self) {
        let cycle = self.cycle.get() + 1;
        self.cycle.set(cycle);

        if let Some(frequency) = self.frequency {
            let due = self.start + Duration::from_secs_f64(cycle as f64 / frequency as f64);
            let now = Instant::now();
            if due > now {
                thread::sleep(due - now);
            }
        }
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_is_monotonic() {
        let clock = Clock::new();
        for expected in 1..=100 {
            clock.wait_for_next_cycle();
            assert_eq!(clock.current_cycle(), expected);
        }
    }

    #[test]
    fn test_paced_clock_does_not_run_ahead() {
        // 10 kHz: 20 cycles should take at least 2 ms of wall time
        let clock = Clock::with_frequency(10_000);
        let begin = Instant::now();
        for _ in 0..20 {
            clock.wait_for_next_cycle();
        }
        assert!(begin.elapsed() >= Duration::from_millis(2));
        assert_eq!(clock.current_cycle(), 20);
    }
}

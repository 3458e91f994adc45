//! Monotonic tick source and the periodic wake-up primitive used by task loops.

use std::thread;
use std::time::{Duration, Instant};

/// Milliseconds since node start. Wraps at `u32::MAX` like a 32-bit tick counter.
pub type Tick = u32;

#[derive(Debug, Clone, Copy)]
pub struct TickClock {
    start: Instant,
}

impl TickClock {
    pub fn start() -> Self {
        Self { start: Instant::now() }
    }

    pub fn now(&self) -> Tick {
        // Truncation is the wrap.
        self.start.elapsed().as_millis() as u32
    }

    /// Ticks elapsed from `earlier` to now, tolerant of one wrap.
    pub fn since(&self, earlier: Tick) -> Tick {
        self.now().wrapping_sub(earlier)
    }
}

impl Default for TickClock {
    fn default() -> Self {
        Self::start()
    }
}

/// Sleep-until-next-period timer. Deadlines advance by a fixed step from the
/// first call, so a slow cycle does not shift the following ones.
pub struct Period {
    interval: Duration,
    next: Instant,
}

impl Period {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next: Instant::now() + interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Blocks until the current deadline, then arms the next one. Returns
    /// `true` if the deadline had already passed (an overrun).
    pub fn wait(&mut self) -> bool {
        let now = Instant::now();
        let overrun = now >= self.next;
        if !overrun {
            thread::sleep(self.next - now);
        }
        self.next += self.interval;
        // After a long stall, resynchronise instead of bursting to catch up.
        if self.next < Instant::now() {
            self.next = Instant::now() + self.interval;
        }
        overrun
    }
}

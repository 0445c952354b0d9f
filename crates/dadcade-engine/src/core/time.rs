/// Turns variable browser frame times into a whole number of fixed ticks.
pub struct FixedTimestep {
    /// The fixed delta time per tick.
    dt: f32,
    /// Accumulated time from variable frame deltas.
    accumulator: f32,
}

impl FixedTimestep {
    pub fn new(dt: f32) -> Self {
        Self {
            dt,
            accumulator: 0.0,
        }
    }

    /// Add frame time to the accumulator. Returns the number of fixed steps to run.
    pub fn accumulate(&mut self, frame_dt: f32) -> u32 {
        // Negative or NaN frame times (tab restore, clock skew) count as zero.
        let frame_dt = if frame_dt.is_finite() { frame_dt.max(0.0) } else { 0.0 };
        self.accumulator += frame_dt;
        // Cap to prevent spiral of death (max 10 steps per frame)
        self.accumulator = self.accumulator.min(self.dt * 10.0);
        let steps = (self.accumulator / self.dt) as u32;
        self.accumulator -= steps as f32 * self.dt;
        steps
    }

    /// Fraction of a tick left in the accumulator, in `[0, 1)`.
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.dt
    }

    /// The fixed delta time.
    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// Drop any partially accumulated frame time.
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

/// One-shot delay, advanced by the owner's ticks.
///
/// Replaces a `setTimeout`: because the timer is plain owned state, dropping
/// or resetting the owner cancels it, and it can never fire after teardown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Countdown {
    remaining: f32,
    armed: bool,
}

impl Countdown {
    /// An idle countdown that never fires until armed.
    pub fn idle() -> Self {
        Self { remaining: 0.0, armed: false }
    }

    /// A countdown armed with the given duration in seconds.
    pub fn start(seconds: f32) -> Self {
        Self { remaining: seconds.max(0.0), armed: true }
    }

    pub fn arm(&mut self, seconds: f32) {
        *self = Self::start(seconds);
    }

    pub fn cancel(&mut self) {
        self.armed = false;
        self.remaining = 0.0;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Seconds left before firing (0 when idle).
    pub fn remaining(&self) -> f32 {
        if self.armed { self.remaining } else { 0.0 }
    }

    /// Advance by `dt`. Returns true exactly once, on the tick the delay elapses.
    pub fn tick(&mut self, dt: f32) -> bool {
        if !self.armed {
            return false;
        }
        self.remaining -= dt;
        if self.remaining <= 0.0 {
            self.armed = false;
            self.remaining = 0.0;
            true
        } else {
            false
        }
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::idle()
    }
}

/// Repeating timer with an adjustable period (a `setInterval` replacement).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    period: f32,
    elapsed: f32,
}

impl Interval {
    pub fn new(period: f32) -> Self {
        Self { period: period.max(f32::EPSILON), elapsed: 0.0 }
    }

    pub fn period(&self) -> f32 {
        self.period
    }

    /// Change the period. Time already elapsed toward the next fire is kept.
    pub fn set_period(&mut self, period: f32) {
        self.period = period.max(f32::EPSILON);
    }

    /// Restart counting from zero.
    pub fn restart(&mut self) {
        self.elapsed = 0.0;
    }

    /// Advance by `dt`. Returns how many times the interval fired.
    pub fn tick(&mut self, dt: f32) -> u32 {
        self.elapsed += dt;
        let mut fired = 0;
        while self.elapsed >= self.period {
            self.elapsed -= self.period;
            fired += 1;
        }
        fired
    }
}

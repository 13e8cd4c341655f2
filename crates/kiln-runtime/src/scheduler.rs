//! Frame pacing and delta-time clamping

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Source of monotonic time for the scheduler
pub trait Clock {
    fn now(&self) -> Instant;

    fn sleep(&self, duration: Duration);
}

/// The real monotonic clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// A clock that only moves when told to.
///
/// Sleeping advances it by exactly the requested amount. Clones share the
/// same time, so a test can keep a handle while the scheduler owns another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    pub fn advance(&self, duration: Duration) {
        self.now.set(self.now.get() + duration);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}

/// Timing for one loop iteration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    /// Simulation step for this frame, clamped to the scheduler's ceiling
    pub delta: Duration,
    /// Wall-clock time since the previous tick
    pub raw: Duration,
    /// Number of ticks so far, starting at 1
    pub frame: u64,
}

impl FrameTime {
    /// Clamped delta in seconds, the value handed to update hooks
    #[inline]
    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// True if the raw elapsed time exceeded the clamp ceiling
    pub fn was_clamped(&self) -> bool {
        self.raw > self.delta
    }
}

/// Paces the frame loop to a fixed minimum interval.
///
/// [`tick`](Self::tick) polls the clock in small sleeps until the target
/// interval has passed since the previous tick, then returns the elapsed time
/// clamped to a ceiling. Frames slower than the target are never shortened or
/// skipped; only over-fast iteration is held back.
pub struct FrameScheduler {
    clock: Box<dyn Clock>,
    target_interval: Duration,
    max_delta: Duration,
    poll_interval: Duration,
    last_tick: Option<Instant>,
    frame: u64,
    stall_observer: Option<Box<dyn FnMut(Duration)>>,
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FrameScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameScheduler")
            .field("target_interval", &self.target_interval)
            .field("max_delta", &self.max_delta)
            .field("poll_interval", &self.poll_interval)
            .field("frame", &self.frame)
            .finish_non_exhaustive()
    }
}

impl FrameScheduler {
    pub const DEFAULT_TARGET_INTERVAL: Duration = Duration::from_millis(16);
    pub const DEFAULT_MAX_DELTA: Duration = Duration::from_millis(50);
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1);

    /// Scheduler on the system clock with a 16 ms target and 50 ms ceiling
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            clock: Box::new(clock),
            target_interval: Self::DEFAULT_TARGET_INTERVAL,
            max_delta: Self::DEFAULT_MAX_DELTA,
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            last_tick: None,
            frame: 0,
            stall_observer: None,
        }
    }

    pub fn with_target_interval(mut self, interval: Duration) -> Self {
        self.target_interval = interval;
        self
    }

    pub fn with_max_delta(mut self, max_delta: Duration) -> Self {
        self.max_delta = max_delta;
        self
    }

    /// Granularity of the pacing wait. Zero is raised to one microsecond.
    pub fn with_poll_interval(mut self, poll: Duration) -> Self {
        self.poll_interval = poll.max(Duration::from_micros(1));
        self
    }

    /// Called with the raw elapsed time whenever the clamp engages
    pub fn with_stall_observer(mut self, observer: impl FnMut(Duration) + 'static) -> Self {
        self.stall_observer = Some(Box::new(observer));
        self
    }

    pub fn target_interval(&self) -> Duration {
        self.target_interval
    }

    pub fn max_delta(&self) -> Duration {
        self.max_delta
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Reset the reference point to now. Call once right before the loop starts.
    pub fn prime(&mut self) {
        self.last_tick = Some(self.clock.now());
    }

    /// Wait out the rest of the target interval, then produce this frame's timing
    pub fn tick(&mut self) -> FrameTime {
        let last = match self.last_tick {
            Some(last) => last,
            None => {
                let now = self.clock.now();
                self.last_tick = Some(now);
                now
            }
        };

        let mut now = self.clock.now();
        while now.duration_since(last) < self.target_interval {
            self.clock.sleep(self.poll_interval);
            now = self.clock.now();
        }

        let raw = now.duration_since(last);
        let delta = raw.min(self.max_delta);
        self.last_tick = Some(now);
        self.frame += 1;

        if raw > delta {
            log::trace!("frame {} stalled for {:?}, clamped to {:?}", self.frame, raw, delta);
            if let Some(observer) = self.stall_observer.as_mut() {
                observer(raw);
            }
        }

        FrameTime {
            delta,
            raw,
            frame: self.frame,
        }
    }
}

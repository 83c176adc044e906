//! Loop driver and timer service
//!
//! The driver is a pure scheduler: it turns host animation frames into ticks
//! and never looks at game state. Timers cover transitions that happen outside
//! the physics loop (the reaction test's go signal).

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, REFERENCE_FRAME_SECS};

/// How a game turns a tick into movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Movement {
    /// One logical unit per tick, wall-clock time ignored
    FrameBased,
    /// Proportional to measured elapsed time
    DeltaBased,
}

/// One simulation step issued by the driver
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    /// Monotonic tick counter
    pub index: u64,
    /// Elapsed seconds covered by this tick
    pub dt: f32,
}

impl Tick {
    pub fn new(index: u64, dt: f32) -> Self {
        Self { index, dt }
    }

    /// Movement units for this tick under the given model.
    ///
    /// Delta-based games measure in 16 ms reference frames so their tuning
    /// numbers read the same as frame-based ones.
    #[inline]
    pub fn units(&self, movement: Movement) -> f32 {
        match movement {
            Movement::FrameBased => 1.0,
            Movement::DeltaBased => self.dt / REFERENCE_FRAME_SECS,
        }
    }
}

/// Tick issuing policy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Cadence {
    /// One tick per host frame, carrying the measured (clamped) delta
    #[default]
    PerFrame,
    /// Fixed-size ticks drained from an accumulator
    Fixed { step: f32 },
}

/// Schedules ticks at the host's animation cadence
#[derive(Debug, Clone)]
pub struct LoopDriver {
    cadence: Cadence,
    max_frame_dt: f32,
    max_substeps: u32,
    running: bool,
    last_time: Option<f64>,
    accumulator: f32,
    next_index: u64,
}

impl LoopDriver {
    pub fn new(cadence: Cadence) -> Self {
        Self::with_limits(cadence, MAX_FRAME_DT, MAX_SUBSTEPS)
    }

    pub fn with_limits(cadence: Cadence, max_frame_dt: f32, max_substeps: u32) -> Self {
        if let Cadence::Fixed { step } = cadence {
            debug_assert!(step > 0.0, "fixed cadence needs a positive step");
        }
        Self {
            cadence,
            max_frame_dt,
            max_substeps: max_substeps.max(1),
            running: false,
            last_time: None,
            accumulator: 0.0,
            next_index: 0,
        }
    }

    pub fn cadence(&self) -> Cadence {
        self.cadence
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Begin issuing ticks. The first frame after a start carries no elapsed
    /// time, so a resume never produces a catch-up burst.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        self.last_time = None;
        self.accumulator = 0.0;
        log::debug!("Loop driver started ({:?})", self.cadence);
    }

    /// Halt issuance. Ticks already handed out are unaffected.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.last_time = None;
        self.accumulator = 0.0;
        log::debug!("Loop driver stopped after {} ticks", self.next_index);
    }

    /// Called once per host animation frame with the host timestamp in
    /// seconds. Returns the ticks to run, in order.
    pub fn frame(&mut self, now: f64) -> Vec<Tick> {
        if !self.running {
            return Vec::new();
        }

        let frame_dt = match self.last_time {
            Some(last) => ((now - last) as f32).clamp(0.0, self.max_frame_dt),
            None => 0.0,
        };
        self.last_time = Some(now);

        match self.cadence {
            Cadence::PerFrame => vec![self.issue(frame_dt)],
            Cadence::Fixed { step } => {
                self.accumulator += frame_dt;
                let mut ticks = Vec::new();
                while self.accumulator >= step && (ticks.len() as u32) < self.max_substeps {
                    ticks.push(self.issue(step));
                    self.accumulator -= step;
                }
                ticks
            }
        }
    }

    fn issue(&mut self, dt: f32) -> Tick {
        let tick = Tick::new(self.next_index, dt);
        self.next_index += 1;
        tick
    }
}

/// Identifies a pending timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerId(pub u32);

/// Pending one-shot timers keyed by id
#[derive(Debug, Clone, Default)]
pub struct Timers {
    pending: Vec<(TimerId, f64)>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `id` to fire at host time `due`, replacing any earlier schedule
    pub fn schedule(&mut self, id: TimerId, due: f64) {
        self.cancel(id);
        self.pending.push((id, due));
        log::debug!("Timer {:?} scheduled for t={:.3}", id, due);
    }

    /// Returns true if a pending timer was removed
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|(pending, _)| *pending != id);
        before != self.pending.len()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.iter().any(|(pending, _)| *pending == id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Remove and return every timer due at `now`, earliest first
    pub fn take_due(&mut self, now: f64) -> Vec<TimerId> {
        let (mut due, later): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|(_, at)| *at <= now);
        self.pending = later;
        due.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        due.into_iter().map(|(id, _)| id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stopped_driver_issues_nothing() {
        let mut driver = LoopDriver::new(Cadence::PerFrame);
        assert!(driver.frame(0.0).is_empty());
        assert!(driver.frame(1.0).is_empty());
    }

    #[test]
    fn test_per_frame_issues_one_tick_with_measured_delta() {
        let mut driver = LoopDriver::new(Cadence::PerFrame);
        driver.start();
        let first = driver.frame(1.0);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].dt, 0.0);

        let second = driver.frame(1.03125);
        assert_eq!(second.len(), 1);
        assert!((second[0].dt - 0.03125).abs() < 1e-6);
        assert_eq!(second[0].index, 1);
    }

    #[test]
    fn test_per_frame_delta_is_clamped() {
        let mut driver = LoopDriver::new(Cadence::PerFrame);
        driver.start();
        driver.frame(0.0);
        let ticks = driver.frame(5.0);
        assert_eq!(ticks[0].dt, MAX_FRAME_DT);
    }

    #[test]
    fn test_fixed_cadence_accumulates() {
        let mut driver = LoopDriver::new(Cadence::Fixed { step: 0.0625 });
        driver.start();
        assert!(driver.frame(0.0).is_empty());
        assert!(driver.frame(0.03125).is_empty());
        let ticks = driver.frame(0.125);
        assert_eq!(ticks.len(), 2);
        assert!(ticks.iter().all(|t| t.dt == 0.0625));
    }

    #[test]
    fn test_fixed_cadence_caps_substeps() {
        let mut driver = LoopDriver::with_limits(Cadence::Fixed { step: 0.0625 }, 1.0, 4);
        driver.start();
        driver.frame(0.0);
        assert_eq!(driver.frame(1.0).len(), 4);
    }

    #[test]
    fn test_stop_then_start_has_no_catch_up() {
        let mut driver = LoopDriver::new(Cadence::Fixed { step: 0.0625 });
        driver.start();
        driver.frame(0.0);
        driver.stop();
        assert!(driver.frame(10.0).is_empty());
        driver.start();
        assert!(driver.frame(20.0).is_empty());
    }

    #[test]
    fn test_frame_based_units_ignore_dt() {
        let tick = Tick::new(0, 0.5);
        assert_eq!(tick.units(Movement::FrameBased), 1.0);
        let tick = Tick::new(0, 0.032);
        assert!((tick.units(Movement::DeltaBased) - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_timers_fire_in_due_order_and_cancel() {
        let mut timers = Timers::new();
        timers.schedule(TimerId(1), 3.0);
        timers.schedule(TimerId(2), 1.0);
        timers.schedule(TimerId(3), 9.0);
        assert!(timers.cancel(TimerId(3)));
        assert!(!timers.cancel(TimerId(3)));

        assert!(timers.take_due(0.5).is_empty());
        assert_eq!(timers.take_due(5.0), vec![TimerId(2), TimerId(1)]);
        assert!(timers.is_empty());
    }

    #[test]
    fn test_reschedule_replaces() {
        let mut timers = Timers::new();
        timers.schedule(TimerId(7), 1.0);
        timers.schedule(TimerId(7), 4.0);
        assert_eq!(timers.len(), 1);
        assert!(timers.take_due(2.0).is_empty());
        assert!(timers.is_pending(TimerId(7)));
    }
}

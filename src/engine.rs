//! Engine host
//!
//! Owns one game together with the loop driver, the input queue and the
//! timer service. The host calls `frame` once per animation frame; the
//! engine decides whether ticks run based on the game's lifecycle.

use crate::sim::{
    Game, HostRequest, InputEvent, InputQueue, Intent, Lifecycle, LoopDriver, Snapshot, Timers,
};
use crate::tuning::EngineTuning;

pub struct Engine<G: Game> {
    game: G,
    driver: LoopDriver,
    timers: Timers,
    input: InputQueue,
    attached: bool,
    /// Lifecycle seen at the end of the last frame or command
    observed: Lifecycle,
}

impl<G: Game> Engine<G> {
    /// Wrap `game`. The engine starts detached; call `attach` when the view
    /// mounts.
    pub fn new(game: G, tuning: &EngineTuning) -> Self {
        let observed = game.lifecycle();
        Self {
            game,
            driver: LoopDriver::with_limits(
                tuning.cadence,
                tuning.max_frame_dt,
                tuning.max_substeps,
            ),
            timers: Timers::new(),
            input: InputQueue::new(),
            attached: false,
            observed,
        }
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut G {
        &mut self.game
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// True while the loop driver is issuing ticks
    pub fn is_ticking(&self) -> bool {
        self.driver.is_running()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn attach(&mut self) {
        if self.attached {
            return;
        }
        self.attached = true;
        self.sync_driver();
        log::info!("Attached {}", self.game.name());
    }

    /// Stop the loop, drop timers and queued input. The game is left as is
    /// and nothing touches it until the next `attach`.
    pub fn detach(&mut self) {
        if !self.attached {
            return;
        }
        self.attached = false;
        self.driver.stop();
        self.timers.clear();
        self.input.clear();
        let dropped = self.game.drain_requests();
        if !dropped.is_empty() {
            log::debug!("Dropped {} host requests on detach", dropped.len());
        }
        log::info!("Detached {}", self.game.name());
    }

    pub fn push_input(&mut self, event: InputEvent) {
        if !self.attached {
            log::debug!("Ignoring {event:?} while detached");
            return;
        }
        self.input.push(event);
    }

    pub fn start(&mut self) {
        if self.attached {
            self.game.start();
            self.sync_driver();
        }
    }

    /// Rebuild the game and forget its timers
    pub fn reset(&mut self) {
        if self.attached {
            self.timers.clear();
            self.game.reset();
            self.game.drain_requests();
            self.sync_driver();
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.attached {
            self.game.toggle_pause();
            self.sync_driver();
        }
    }

    /// Run one host frame at host time `now` (seconds). Returns the number of
    /// ticks that ran.
    pub fn frame(&mut self, now: f64) -> usize {
        if !self.attached {
            return 0;
        }

        // Requests made by explicit commands are timed from this frame
        self.service_requests(now);

        for event in self.input.drain() {
            let Some(intent) = self.game.controls().normalize(event) else {
                continue;
            };
            match intent {
                Intent::Pause => self.game.toggle_pause(),
                intent => self.game.apply(intent, now),
            }
            self.service_requests(now);
        }

        for id in self.timers.take_due(now) {
            self.game.on_timer(id, now);
            self.service_requests(now);
        }

        self.sync_driver();

        let mut ran = 0;
        for tick in self.driver.frame(now) {
            // Leaving Running stops issuance after the in-flight tick
            if !self.game.session().is_running() {
                break;
            }
            self.game.tick(&tick);
            ran += 1;
            self.service_requests(now);
        }

        self.sync_driver();
        ran
    }

    pub fn snapshot(&self) -> Snapshot {
        self.game.snapshot()
    }

    fn service_requests(&mut self, now: f64) {
        for request in self.game.drain_requests() {
            match request {
                HostRequest::Schedule { id, delay_secs } => {
                    self.timers.schedule(id, now + delay_secs.max(0.0));
                }
                HostRequest::Cancel { id } => {
                    if self.timers.cancel(id) {
                        log::debug!("Timer {id:?} cancelled");
                    }
                }
            }
        }
    }

    /// Run the driver exactly while the game is `Running`
    fn sync_driver(&mut self) {
        let lifecycle = self.game.lifecycle();
        if lifecycle != self.observed {
            log::debug!("{}: {:?} -> {:?}", self.game.name(), self.observed, lifecycle);
            self.observed = lifecycle;
        }
        if self.attached && lifecycle.is_running() {
            self.driver.start();
        } else {
            self.driver.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::{Breakout, Reflex};
    use crate::sim::{Cadence, Key, Outcome, SequenceRng};
    use crate::tuning::{BreakoutTuning, ReflexTuning};

    fn fixed(step: f32) -> EngineTuning {
        EngineTuning {
            cadence: Cadence::Fixed { step },
            max_frame_dt: 1.0,
            max_substeps: 8,
        }
    }

    fn breakout(tuning: &EngineTuning) -> Engine<Breakout> {
        let mut engine = Engine::new(Breakout::new(BreakoutTuning::default()), tuning);
        engine.attach();
        engine
    }

    fn reflex() -> Engine<Reflex> {
        let game = Reflex::new(ReflexTuning::default(), Box::new(SequenceRng::new(vec![0.5])));
        let mut engine = Engine::new(game, &EngineTuning::default());
        engine.attach();
        engine
    }

    const CLICK: InputEvent = InputEvent::PointerDown { x: 10.0, y: 10.0 };

    #[test]
    fn test_reflex_go_signal_through_timers() {
        let mut engine = reflex();
        engine.frame(0.0);
        engine.push_input(CLICK);
        engine.frame(1.0);
        assert_eq!(engine.game().lifecycle(), Lifecycle::Ready);
        assert_eq!(engine.pending_timers(), 1);
        assert!(!engine.is_ticking());

        // Delay is 1 + 3 * 0.5 = 2.5 s from the click
        engine.frame(3.0);
        assert_eq!(engine.game().lifecycle(), Lifecycle::Ready);
        engine.frame(3.5);
        assert_eq!(engine.game().lifecycle(), Lifecycle::Running);
        assert!(engine.is_ticking());

        engine.push_input(CLICK);
        engine.frame(3.75);
        assert_eq!(engine.game().lifecycle(), Lifecycle::Ended(Outcome::Won));
        assert_eq!(engine.snapshot().hud.reaction_ms, Some(250));
        assert!(!engine.is_ticking());
    }

    #[test]
    fn test_early_click_cancels_timer() {
        let mut engine = reflex();
        engine.push_input(CLICK);
        engine.frame(0.0);
        engine.push_input(CLICK);
        engine.frame(0.5);
        assert_eq!(engine.game().lifecycle(), Lifecycle::Ended(Outcome::Early));
        assert_eq!(engine.pending_timers(), 0);
        engine.frame(5.0);
        assert_eq!(engine.game().lifecycle(), Lifecycle::Ended(Outcome::Early));
    }

    #[test]
    fn test_detach_clears_timers_and_freezes_game() {
        let mut engine = reflex();
        engine.push_input(CLICK);
        engine.frame(0.0);
        assert_eq!(engine.pending_timers(), 1);

        engine.detach();
        assert_eq!(engine.pending_timers(), 0);
        engine.push_input(CLICK);
        assert_eq!(engine.frame(10.0), 0);
        engine.start();
        assert_eq!(engine.game().lifecycle(), Lifecycle::Ready);

        // The go signal died with the detach
        engine.attach();
        engine.frame(20.0);
        assert_eq!(engine.game().lifecycle(), Lifecycle::Ready);
    }

    #[test]
    fn test_detached_breakout_does_not_advance() {
        let mut engine = breakout(&EngineTuning::default());
        engine.start();
        engine.frame(0.0);
        engine.frame(1.0 / 60.0);
        engine.detach();
        assert!(!engine.is_ticking());
        let frozen = engine.snapshot();
        for i in 2..30 {
            engine.frame(f64::from(i) / 60.0);
        }
        assert_eq!(engine.snapshot(), frozen);
    }

    #[test]
    fn test_fixed_cadence_issues_whole_steps() {
        let mut engine = breakout(&fixed(0.0625));
        engine.start();
        assert_eq!(engine.frame(0.0), 0);
        assert_eq!(engine.frame(0.03125), 0);
        assert_eq!(engine.frame(0.125), 2);
        assert_eq!(engine.snapshot().elapsed_ticks, 2);
    }

    #[test]
    fn test_per_frame_cadence_runs_one_tick_per_frame() {
        let mut engine = breakout(&EngineTuning::default());
        engine.start();
        for i in 0..10 {
            assert_eq!(engine.frame(f64::from(i) / 60.0), 1);
        }
        assert_eq!(engine.snapshot().elapsed_ticks, 10);
    }

    #[test]
    fn test_pause_stops_ticks_and_resume_has_no_burst() {
        let mut engine = breakout(&fixed(0.0625));
        engine.start();
        engine.frame(0.0);
        engine.frame(0.0625);
        assert_eq!(engine.snapshot().elapsed_ticks, 1);

        engine.push_input(InputEvent::KeyDown { key: Key::Pause });
        assert_eq!(engine.frame(0.125), 0);
        assert_eq!(engine.game().lifecycle(), Lifecycle::Paused);
        assert!(!engine.is_ticking());
        assert_eq!(engine.frame(5.0), 0);

        engine.toggle_pause();
        assert!(engine.is_ticking());
        assert_eq!(engine.frame(10.0), 0);
        assert_eq!(engine.frame(10.0625), 1);
        assert_eq!(engine.snapshot().elapsed_ticks, 2);
    }

    #[test]
    fn test_ending_stops_the_driver() {
        let mut engine = breakout(&EngineTuning::default());
        engine.start();
        engine.frame(0.0);
        engine.game_mut().state.session.end(Outcome::Lost);
        assert_eq!(engine.frame(1.0 / 60.0), 0);
        assert!(!engine.is_ticking());

        engine.reset();
        assert_eq!(engine.game().lifecycle(), Lifecycle::Idle);
        assert_eq!(engine.snapshot().score, 0);
    }
}

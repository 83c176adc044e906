//! Session lifecycle
//!
//! A `Session` holds the coarse state every game shares: where it is in the
//! lifecycle, the score and the tick count. Games embed one in their own
//! state struct and rebuild the whole struct on reset.

use serde::{Deserialize, Serialize};

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Won,
    Lost,
    /// Acted before the go signal
    Early,
}

/// Coarse game-session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "outcome", rename_all = "snake_case")]
pub enum Lifecycle {
    /// Waiting for the first input; nothing integrates
    #[default]
    Idle,
    /// Armed and waiting for an external go signal
    Ready,
    /// Ticks integrate physics and evaluate collisions
    Running,
    Paused,
    /// Terminal until a reset rebuilds the session
    Ended(Outcome),
}

impl Lifecycle {
    pub fn is_running(&self) -> bool {
        matches!(self, Lifecycle::Running)
    }

    pub fn is_ended(&self) -> bool {
        matches!(self, Lifecycle::Ended(_))
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self {
            Lifecycle::Ended(outcome) => Some(*outcome),
            _ => None,
        }
    }
}

/// Lifecycle, score and elapsed ticks for one game session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    lifecycle: Lifecycle,
    score: u64,
    elapsed_ticks: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn elapsed_ticks(&self) -> u64 {
        self.elapsed_ticks
    }

    pub fn is_running(&self) -> bool {
        self.lifecycle.is_running()
    }

    pub fn is_ended(&self) -> bool {
        self.lifecycle.is_ended()
    }

    /// Idle or Ready → Running. Returns false if nothing changed.
    pub fn start(&mut self) -> bool {
        match self.lifecycle {
            Lifecycle::Idle | Lifecycle::Ready => {
                self.lifecycle = Lifecycle::Running;
                log::info!("Session running");
                true
            }
            _ => false,
        }
    }

    /// Idle → Ready
    pub fn arm(&mut self) -> bool {
        if self.lifecycle != Lifecycle::Idle {
            return false;
        }
        self.lifecycle = Lifecycle::Ready;
        log::info!("Session armed, waiting for go signal");
        true
    }

    /// Running ↔ Paused. Other states are left alone.
    pub fn toggle_pause(&mut self) -> bool {
        self.lifecycle = match self.lifecycle {
            Lifecycle::Running => Lifecycle::Paused,
            Lifecycle::Paused => Lifecycle::Running,
            _ => return false,
        };
        log::info!("Session {:?}", self.lifecycle);
        true
    }

    /// Enter the terminal state. Only the first call in a session counts.
    pub fn end(&mut self, outcome: Outcome) -> bool {
        if self.lifecycle.is_ended() {
            return false;
        }
        self.lifecycle = Lifecycle::Ended(outcome);
        log::info!(
            "Session ended: {:?} (score {}, {} ticks)",
            outcome,
            self.score,
            self.elapsed_ticks
        );
        true
    }

    /// Add to the score. Ignored outside `Running` so a final score stays final.
    pub fn award(&mut self, points: u64) {
        if !self.is_running() {
            return;
        }
        let before = self.score;
        self.score = self.score.saturating_add(points);
        debug_assert!(self.score >= before, "score decreased");
    }

    pub fn record_tick(&mut self) {
        debug_assert!(self.is_running(), "tick recorded outside Running");
        self.elapsed_ticks += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_flow() {
        let mut session = Session::new();
        assert_eq!(session.lifecycle(), Lifecycle::Idle);
        assert!(session.start());
        assert!(!session.start());
        session.award(10);
        session.record_tick();
        assert!(session.end(Outcome::Won));
        assert_eq!(session.lifecycle().outcome(), Some(Outcome::Won));
        assert_eq!(session.score(), 10);
        assert_eq!(session.elapsed_ticks(), 1);
    }

    #[test]
    fn test_end_is_first_only() {
        let mut session = Session::new();
        session.start();
        assert!(session.end(Outcome::Lost));
        assert!(!session.end(Outcome::Won));
        assert_eq!(session.lifecycle(), Lifecycle::Ended(Outcome::Lost));
    }

    #[test]
    fn test_award_ignored_unless_running() {
        let mut session = Session::new();
        session.award(5);
        assert_eq!(session.score(), 0);
        session.start();
        session.award(5);
        session.end(Outcome::Lost);
        session.award(5);
        assert_eq!(session.score(), 5);
    }

    #[test]
    fn test_pause_toggles_only_while_active() {
        let mut session = Session::new();
        assert!(!session.toggle_pause());
        session.start();
        assert!(session.toggle_pause());
        assert_eq!(session.lifecycle(), Lifecycle::Paused);
        assert!(session.toggle_pause());
        assert!(session.is_running());
    }

    #[test]
    fn test_ready_flow() {
        let mut session = Session::new();
        assert!(session.arm());
        assert!(!session.arm());
        assert_eq!(session.lifecycle(), Lifecycle::Ready);
        assert!(session.start());
        assert!(session.is_running());
    }

    #[test]
    fn test_lifecycle_serializes_tagged() {
        let json = serde_json::to_string(&Lifecycle::Ended(Outcome::Early)).unwrap();
        assert_eq!(json, r#"{"state":"ended","outcome":"early"}"#);
    }
}

//! Round timer and win/loss bookkeeping.
//!
//! [`RoundTracker`] consumes the `(player_in_bounds, active_bot_count)` pair of
//! each [`TickReport`](crate::events::TickReport) and decides when a round
//! ends:
//!
//! - the player leaving the safe zone loses the round
//! - the player being the last ship standing wins it
//! - surviving until the timer runs out wins it
//!
//! # Example
//!
//! ```
//! use safezone_core::round::{RoundOutcome, RoundTracker};
//!
//! let mut round = RoundTracker::new(120.0);
//! assert_eq!(round.observe(1.0, true, 3), None);
//! assert_eq!(round.observe(1.0, true, 0), Some(RoundOutcome::Won));
//! assert_eq!(round.wins(), 1);
//! ```

use serde::{Deserialize, Serialize};
use tracing::info;

/// Where a round stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundPhase {
    /// The round is running.
    Playing,
    /// The player won; waiting for the next round.
    Won,
    /// The player was eliminated; waiting for the next round.
    Lost,
}

/// How a round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundOutcome {
    /// Last ship standing, or alive when time ran out.
    Won,
    /// Left the safe zone.
    Lost,
}

/// Tracks the round timer, phase and win count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundTracker {
    duration: f32,
    remaining: f32,
    phase: RoundPhase,
    wins: u32,
}

impl RoundTracker {
    /// Starts the first round.
    #[must_use]
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            remaining: duration,
            phase: RoundPhase::Playing,
            wins: 0,
        }
    }

    /// Feeds one tick of simulation output.
    ///
    /// Returns the outcome on the tick the round ends and `None` otherwise,
    /// including every call after the round is over.
    pub fn observe(
        &mut self,
        dt: f32,
        player_in_bounds: bool,
        active_bot_count: usize,
    ) -> Option<RoundOutcome> {
        if self.phase != RoundPhase::Playing {
            return None;
        }

        if !player_in_bounds {
            self.phase = RoundPhase::Lost;
            info!(wins = self.wins, "round lost");
            return Some(RoundOutcome::Lost);
        }

        self.remaining = (self.remaining - dt).max(0.0);
        if active_bot_count == 0 || self.remaining <= 0.0 {
            self.phase = RoundPhase::Won;
            self.wins += 1;
            info!(wins = self.wins, remaining = self.remaining, "round won");
            return Some(RoundOutcome::Won);
        }
        None
    }

    /// Resets the timer for a new round. The win count carries over.
    pub fn start_round(&mut self) {
        self.remaining = self.duration;
        self.phase = RoundPhase::Playing;
        info!(duration = self.duration, "round started");
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> RoundPhase {
        self.phase
    }

    /// Seconds left in the round.
    #[must_use]
    pub const fn remaining(&self) -> f32 {
        self.remaining
    }

    /// Rounds won so far.
    #[must_use]
    pub const fn wins(&self) -> u32 {
        self.wins
    }

    /// Remaining time as `M:SS`, rounding partial seconds up.
    #[must_use]
    pub fn format_remaining(&self) -> String {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let total = self.remaining.max(0.0).ceil() as u32;
        format!("{}:{:02}", total / 60, total % 60)
    }
}

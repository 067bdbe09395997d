//! Final-outcome labeling
//!
//! The winner is read off the reconstructed score at a game's
//! chronologically last event and broadcast to every row of that game.

/// Outcome derived from one game's final reconstructed score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub home_win: bool,
    /// A completed game should never end level; a tied final score is
    /// labeled as an away win and flagged here for audit.
    pub tied: bool,
}

/// Label the outcome from per-event cumulative (home, away) scores in event
/// order. Empty input labels an away win with the tie flag set.
pub fn label_outcome(totals: &[(u32, u32)]) -> Outcome {
    let (home, away) = totals.last().copied().unwrap_or((0, 0));
    Outcome {
        home_win: home > away,
        tied: home == away,
    }
}

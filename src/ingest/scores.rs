//! Score reconstruction from the running-margin signal
//!
//! The source carries no per-event point values, only an occasional running
//! margin (home minus away). Cumulative scores are rebuilt by forward-filling
//! the margin and attributing each margin change to one side.
//!
//! The attribution is one-sided: a margin delta is booked entirely to the
//! home side when positive and entirely to the away side when negative. If
//! both teams score between two margin observations this understates one
//! side by the offsetting amount. That is an accepted approximation carried
//! over from the source data, not something this module tries to repair.

use crate::RawEvent;

/// Cumulative (home, away) score per event, aligned with the input slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreSeries {
    pub totals: Vec<(u32, u32)>,
    /// Events whose margin was absent or unparseable and was carried forward
    /// (or zero-defaulted at the start of a game).
    pub filled: usize,
}

/// Parse a raw margin field: the literal tie marker maps to 0.
pub fn parse_margin(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if raw.eq_ignore_ascii_case("tie") {
        return Some(0);
    }
    raw.parse::<i64>().ok()
}

/// Reconstruct cumulative scores for one game's events, which must already
/// be sorted by event number.
pub fn reconstruct_scores(events: &[RawEvent]) -> ScoreSeries {
    let mut totals = Vec::with_capacity(events.len());
    let mut filled = 0;

    let mut prev_margin: i64 = 0;
    let mut home: u32 = 0;
    let mut away: u32 = 0;

    for event in events {
        let margin = match event.margin.as_deref().and_then(parse_margin) {
            Some(m) => m,
            None => {
                // Forward-fill; the first unknown margin of a game stays 0.
                filled += 1;
                prev_margin
            }
        };

        let delta = margin - prev_margin;
        if delta > 0 {
            home += delta as u32;
        } else if delta < 0 {
            away += (-delta) as u32;
        }

        totals.push((home, away));
        prev_margin = margin;
    }

    ScoreSeries { totals, filled }
}

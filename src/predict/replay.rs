//! Game replay
//!
//! Streams a stored game's states through the predictor, producing the
//! evolving win-probability curve the dashboard renders. Points carry the
//! quarter-clock label and elapsed minutes so any consumer can plot them on
//! a single time axis.

use burn::tensor::backend::Backend;
use serde::Serialize;

use crate::ingest::clock::{self, REGULATION_SECS};
use crate::ingest::teams;
use crate::predict::Predictor;
use crate::GameState;

/// One point on the win-probability curve.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayPoint {
    /// Minutes elapsed since tip-off (48.0 at the final whistle).
    pub elapsed_min: f32,
    /// Quarter clock label, e.g. "Q3 7:42", or "FINAL".
    pub label: String,
    pub home_score: u32,
    pub away_score: u32,
    pub probability: f32,
}

/// Walk a game's states (earliest first) and produce the probability curve.
///
/// Every `stride`-th state is sampled, then a FINAL point pins the curve to
/// 1.0 or 0.0 according to the last reconstructed margin.
pub fn replay_game<B: Backend>(
    states: &[GameState],
    predictor: &Predictor<B>,
    stride: usize,
) -> Vec<ReplayPoint>
where
    B::FloatElem: serde::Serialize + serde::de::DeserializeOwned,
    B::IntElem: serde::Serialize + serde::de::DeserializeOwned,
{
    let stride = stride.max(1);
    let mut points = Vec::with_capacity(states.len() / stride + 2);

    for state in states.iter().step_by(stride) {
        let secs = state.time_remaining_sec;
        let probability = predictor.win_probability(state.margin() as f32, secs as f32);

        points.push(ReplayPoint {
            elapsed_min: (REGULATION_SECS.saturating_sub(secs)) as f32 / 60.0,
            label: clock::format_time_label(secs),
            home_score: state.home_score,
            away_score: state.away_score,
            probability,
        });
    }

    if let Some(last) = states.last() {
        points.push(ReplayPoint {
            elapsed_min: REGULATION_SECS as f32 / 60.0,
            label: "FINAL".to_string(),
            home_score: last.home_score,
            away_score: last.away_score,
            probability: if last.margin() > 0 { 1.0 } else { 0.0 },
        });
    }

    points
}

/// Render the curve as a text table.
pub fn format_replay(points: &[ReplayPoint], home: crate::TeamId, away: crate::TeamId) -> String {
    let home_name = teams::display_name(home, "Home");
    let away_name = teams::display_name(away, "Away");

    let mut out = format!("{} (home) vs {} (away)\n\n", home_name, away_name);
    out.push_str(&format!("{:>9} {:>9} {:>9}\n", "Clock", "Score", "P(home)"));
    for point in points {
        out.push_str(&format!(
            "{:>9} {:>9} {:>8.1}%\n",
            point.label,
            format!("{}-{}", point.home_score, point.away_score),
            point.probability * 100.0
        ));
    }
    out
}

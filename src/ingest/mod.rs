//! Play-by-play reconstruction pipeline
//!
//! Turns raw play-by-play events into the canonical game-state table:
//! resolves home/away team IDs, normalizes the game clock, rebuilds
//! cumulative scores from the running margin, and labels every row with the
//! game's final outcome.

pub mod clock;
pub mod outcome;
pub mod scores;
pub mod teams;

use crate::{GameState, RawEvent};
use std::collections::BTreeMap;
use std::fmt;

/// Counters for every recovery the pipeline performed. Data defects are
/// absorbed locally but stay countable here instead of vanishing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QualityReport {
    pub events_in: usize,
    pub states_out: usize,
    pub games: usize,
    /// Rows discarded because the period was absent (unrecoverable).
    pub dropped_missing_period: usize,
    /// Clock strings that failed to parse and were defaulted to 0 seconds.
    pub malformed_clocks: usize,
    /// Margins that were absent or unparseable and were forward-filled.
    pub filled_margins: usize,
    /// Games whose home-description partition was empty (sentinel emitted).
    pub unresolved_home: usize,
    /// Games whose away-description partition was empty (sentinel emitted).
    pub unresolved_away: usize,
    /// Games whose reconstructed final score was level (labeled away win).
    pub tied_finals: usize,
}

impl fmt::Display for QualityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} events -> {} states across {} games \
             (dropped {}, defaulted clocks {}, filled margins {}, \
             unresolved home/away {}/{}, tied finals {})",
            self.events_in,
            self.states_out,
            self.games,
            self.dropped_missing_period,
            self.malformed_clocks,
            self.filled_margins,
            self.unresolved_home,
            self.unresolved_away,
            self.tied_finals
        )
    }
}

/// Reconstructed table plus the recovery counters accumulated building it.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub states: Vec<GameState>,
    pub report: QualityReport,
}

/// Build the canonical game-state table from raw events.
///
/// Events are grouped per game, ordered by event number, and run through
/// team resolution, clock normalization, score reconstruction, and outcome
/// labeling. Output rows are sorted by (game id, event number); identical
/// input always yields identical output.
pub fn build_game_states(events: Vec<RawEvent>) -> PipelineOutput {
    let mut report = QualityReport {
        events_in: events.len(),
        ..QualityReport::default()
    };

    let mut games: BTreeMap<String, Vec<RawEvent>> = BTreeMap::new();
    for event in events {
        games.entry(event.game_id.clone()).or_default().push(event);
    }
    report.games = games.len();

    let mut states = Vec::with_capacity(report.events_in);

    for (game_id, mut game_events) in games {
        game_events.sort_by_key(|e| e.event_num);

        let resolved = teams::resolve_teams(&game_events);
        if resolved.home.is_unknown() {
            report.unresolved_home += 1;
            log::warn!("game {}: no home-description events, using sentinel", game_id);
        }
        if resolved.away.is_unknown() {
            report.unresolved_away += 1;
            log::warn!("game {}: no away-description events, using sentinel", game_id);
        }

        let series = scores::reconstruct_scores(&game_events);
        report.filled_margins += series.filled;

        let outcome = outcome::label_outcome(&series.totals);
        if outcome.tied {
            report.tied_finals += 1;
            log::warn!("game {}: level final score, labeled as away win", game_id);
        }

        for (event, &(home_score, away_score)) in game_events.iter().zip(&series.totals) {
            let quarter = match event.period {
                Some(p) => p,
                None => {
                    report.dropped_missing_period += 1;
                    continue;
                }
            };

            let secs_in_period = match event.clock.as_deref().map(clock::parse_clock) {
                Some(Some(secs)) => secs,
                _ => {
                    report.malformed_clocks += 1;
                    0
                }
            };

            states.push(GameState {
                game_id: game_id.clone(),
                home_team: resolved.home,
                away_team: resolved.away,
                quarter,
                time_remaining_sec: clock::true_seconds_remaining(quarter, secs_in_period),
                home_score,
                away_score,
                home_win: outcome.home_win,
            });
        }
    }

    report.states_out = states.len();
    PipelineOutput { states, report }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TeamId;

    fn event(game: &str, num: i64, period: Option<u32>, clock: &str, margin: Option<&str>) -> RawEvent {
        RawEvent {
            game_id: game.to_string(),
            event_num: num,
            period,
            clock: Some(clock.to_string()),
            margin: margin.map(str::to_string),
            actor_team: None,
            home_description: None,
            away_description: None,
        }
    }

    fn described(mut e: RawEvent, actor: i64, home: bool) -> RawEvent {
        e.actor_team = Some(TeamId(actor));
        if home {
            e.home_description = Some("Jump Shot".to_string());
        } else {
            e.away_description = Some("Jump Shot".to_string());
        }
        e
    }

    fn sample_game() -> Vec<RawEvent> {
        vec![
            described(event("0021800001", 1, Some(1), "12:00", None), 10, true),
            described(event("0021800001", 2, Some(1), "11:40", Some("2")), 10, true),
            described(event("0021800001", 3, Some(2), "6:00", Some("TIE")), 20, false),
            described(event("0021800001", 4, Some(4), "0:30", Some("-5")), 20, false),
        ]
    }

    #[test]
    fn test_builds_rows_in_event_order() {
        let output = build_game_states(sample_game());
        assert_eq!(output.states.len(), 4);

        let first = &output.states[0];
        assert_eq!(first.home_team, TeamId(10));
        assert_eq!(first.away_team, TeamId(20));
        assert_eq!(first.time_remaining_sec, 2880);
        assert_eq!((first.home_score, first.away_score), (0, 0));

        let last = &output.states[3];
        assert_eq!(last.time_remaining_sec, 30);
        assert_eq!((last.home_score, last.away_score), (2, 7));
        assert!(!last.home_win);

        // The label is broadcast to every row of the game.
        assert!(output.states.iter().all(|s| !s.home_win));
    }

    #[test]
    fn test_final_margin_sign_matches_label() {
        let output = build_game_states(sample_game());
        let last = output.states.last().unwrap();
        assert!(last.margin() < 0);
        assert_eq!(last.home_win, last.margin() > 0);
    }

    #[test]
    fn test_missing_period_rows_dropped() {
        let mut events = sample_game();
        events.push(event("0021800001", 5, None, "0:10", Some("-5")));

        let output = build_game_states(events);
        assert_eq!(output.states.len(), 4);
        assert_eq!(output.report.dropped_missing_period, 1);
    }

    #[test]
    fn test_malformed_clock_defaults_to_zero() {
        let events = vec![
            described(event("0021800001", 1, Some(3), "garbage", Some("1")), 10, true),
            described(event("0021800001", 2, Some(3), "5:00", Some("-1")), 20, false),
        ];

        let output = build_game_states(events);
        assert_eq!(output.report.malformed_clocks, 1);
        // Defaulted clock yields the bottom of the period.
        assert_eq!(output.states[0].time_remaining_sec, 720);
    }

    #[test]
    fn test_unresolved_side_is_counted_not_fatal() {
        let events = vec![
            described(event("0021800001", 1, Some(1), "12:00", Some("-2")), 20, false),
            described(event("0021800001", 2, Some(1), "11:00", Some("-4")), 20, false),
        ];

        let output = build_game_states(events);
        assert_eq!(output.report.unresolved_home, 1);
        assert_eq!(output.states[0].home_team, TeamId::UNKNOWN);
        assert_eq!(output.states[0].away_team, TeamId(20));
    }

    #[test]
    fn test_deterministic_rebuild() {
        let mut events = sample_game();
        // Deliver events out of order and across interleaved games.
        events.push(described(event("0021800000", 2, Some(1), "10:00", Some("-1")), 7, false));
        events.push(described(event("0021800000", 1, Some(1), "11:00", Some("2")), 5, true));
        events.swap(0, 3);

        let a = build_game_states(events.clone());
        let b = build_game_states(events);
        assert_eq!(a.states, b.states);
        assert_eq!(a.report, b.report);

        // Sorted by game id, then event number.
        assert_eq!(a.states[0].game_id, "0021800000");
        assert_eq!(a.states[0].home_score, 2);
        assert_eq!(a.states[2].game_id, "0021800001");
    }

    #[test]
    fn test_overtime_period_uses_period_clock() {
        let events = vec![
            described(event("0021800001", 1, Some(5), "4:30", Some("1")), 10, true),
        ];

        let output = build_game_states(events);
        assert_eq!(output.states[0].quarter, 5);
        assert_eq!(output.states[0].time_remaining_sec, 270);
    }
}

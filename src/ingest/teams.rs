//! Home/away team resolution
//!
//! The source format never labels which team is home; it only attributes
//! each event to an actor team and populates exactly one of two
//! announcer-style description columns. The home side is recovered as the
//! most common actor ID among home-described events, and likewise for away.

use crate::{RawEvent, ResolvedTeams, TeamId};
use std::collections::HashMap;

/// Resolve home and away team IDs from all events of a single game.
///
/// An empty partition resolves to the unknown sentinel (TeamId 0) rather
/// than failing; display code substitutes "Home"/"Away" placeholders. Mode
/// ties are broken toward the lowest team ID so resolution is deterministic.
pub fn resolve_teams(events: &[RawEvent]) -> ResolvedTeams {
    let home = partition_mode(events, |e| e.home_description.as_deref());
    let away = partition_mode(events, |e| e.away_description.as_deref());
    ResolvedTeams {
        home: home.unwrap_or(TeamId::UNKNOWN),
        away: away.unwrap_or(TeamId::UNKNOWN),
    }
}

fn partition_mode<'a, F>(events: &'a [RawEvent], description: F) -> Option<TeamId>
where
    F: Fn(&'a RawEvent) -> Option<&'a str>,
{
    let mut counts: HashMap<TeamId, usize> = HashMap::new();
    for event in events {
        let described = description(event).is_some_and(|d| !d.trim().is_empty());
        if !described {
            continue;
        }
        if let Some(team) = event.actor_team {
            *counts.entry(team).or_insert(0) += 1;
        }
    }

    // Highest count wins; among equal counts, the lowest ID.
    counts
        .into_iter()
        .max_by(|(id_a, n_a), (id_b, n_b)| n_a.cmp(n_b).then(id_b.cmp(id_a)))
        .map(|(id, _)| id)
}

/// Franchise name for an NBA team ID, if known.
pub fn franchise_name(team: TeamId) -> Option<&'static str> {
    let name = match team.0 {
        1610612737 => "Hawks",
        1610612738 => "Celtics",
        1610612739 => "Cavaliers",
        1610612740 => "Pelicans",
        1610612741 => "Bulls",
        1610612742 => "Mavericks",
        1610612743 => "Nuggets",
        1610612744 => "Warriors",
        1610612745 => "Rockets",
        1610612746 => "Clippers",
        1610612747 => "Lakers",
        1610612748 => "Heat",
        1610612749 => "Bucks",
        1610612750 => "Timberwolves",
        1610612751 => "Nets",
        1610612752 => "Knicks",
        1610612753 => "Magic",
        1610612754 => "Pacers",
        1610612755 => "76ers",
        1610612756 => "Suns",
        1610612757 => "Blazers",
        1610612758 => "Kings",
        1610612759 => "Spurs",
        1610612760 => "Thunder",
        1610612761 => "Raptors",
        1610612762 => "Jazz",
        1610612763 => "Grizzlies",
        1610612764 => "Wizards",
        1610612765 => "Pistons",
        1610612766 => "Hornets",
        _ => return None,
    };
    Some(name)
}

/// Display name with a placeholder for unresolved or unrecognized IDs.
pub fn display_name(team: TeamId, placeholder: &'static str) -> &'static str {
    franchise_name(team).unwrap_or(placeholder)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(
        num: i64,
        actor: Option<i64>,
        home_desc: Option<&str>,
        away_desc: Option<&str>,
    ) -> RawEvent {
        RawEvent {
            game_id: "001".to_string(),
            event_num: num,
            period: Some(1),
            clock: Some("12:00".to_string()),
            margin: None,
            actor_team: actor.map(TeamId),
            home_description: home_desc.map(str::to_string),
            away_description: away_desc.map(str::to_string),
        }
    }

    #[test]
    fn test_resolves_majority_actor_per_side() {
        let events = vec![
            event(1, Some(10), Some("Jump Shot"), None),
            event(2, Some(10), Some("Layup"), None),
            // A defensive event credited to the wrong side's actor.
            event(3, Some(20), Some("Steal"), None),
            event(4, Some(20), None, Some("Dunk")),
            event(5, Some(20), None, Some("Free Throw")),
        ];

        let resolved = resolve_teams(&events);
        assert_eq!(resolved.home, TeamId(10));
        assert_eq!(resolved.away, TeamId(20));
    }

    #[test]
    fn test_empty_partition_yields_sentinel() {
        let events = vec![
            event(1, Some(20), None, Some("Dunk")),
            event(2, Some(20), None, Some("Layup")),
        ];

        let resolved = resolve_teams(&events);
        assert_eq!(resolved.home, TeamId::UNKNOWN);
        assert!(resolved.home.is_unknown());
        assert_eq!(resolved.away, TeamId(20));
    }

    #[test]
    fn test_mode_tie_breaks_to_lowest_id() {
        let events = vec![
            event(1, Some(30), Some("Shot"), None),
            event(2, Some(10), Some("Shot"), None),
        ];

        let resolved = resolve_teams(&events);
        assert_eq!(resolved.home, TeamId(10));
    }

    #[test]
    fn test_blank_descriptions_do_not_count() {
        let events = vec![
            event(1, Some(30), Some("   "), None),
            event(2, Some(10), Some("Shot"), None),
        ];

        let resolved = resolve_teams(&events);
        assert_eq!(resolved.home, TeamId(10));
    }

    #[test]
    fn test_display_name_placeholder() {
        assert_eq!(display_name(TeamId(1610612744), "Home"), "Warriors");
        assert_eq!(display_name(TeamId::UNKNOWN, "Home"), "Home");
        assert_eq!(display_name(TeamId(42), "Away"), "Away");
    }
}

//! Play-by-play CSV loading
//!
//! Reads raw events from an exported play-by-play CSV. The reader accepts a
//! column-subset projection: any optional column may be missing entirely,
//! and rows that cannot be deserialized at all (no game id or event number)
//! are skipped and counted rather than aborting the load.

use crate::{RawEvent, Result};
use std::path::Path;

/// Events read from a CSV file plus the number of rows skipped as
/// undeserializable.
#[derive(Debug)]
pub struct LoadedEvents {
    pub events: Vec<RawEvent>,
    pub skipped: usize,
}

/// Read raw events from a play-by-play CSV file.
pub fn read_events<P: AsRef<Path>>(path: P) -> Result<LoadedEvents> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path.as_ref())?;

    let mut events = Vec::new();
    let mut skipped = 0usize;

    for record in reader.deserialize::<RawEvent>() {
        match record {
            Ok(event) => events.push(event),
            Err(err) => {
                skipped += 1;
                log::debug!("skipping unreadable play-by-play row: {}", err);
            }
        }
    }

    if skipped > 0 {
        log::warn!("skipped {} unreadable play-by-play rows", skipped);
    }

    Ok(LoadedEvents { events, skipped })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TeamId;
    use std::io::Write;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_reads_full_rows() {
        let file = write_csv(
            "GAME_ID,EVENTNUM,PERIOD,PCTIMESTRING,SCOREMARGIN,PLAYER1_TEAM_ID,HOMEDESCRIPTION,VISITORDESCRIPTION\n\
             0021800001,2,1,11:40,2,1610612744.0,Curry 3PT Jump Shot,\n\
             0021800001,3,1,11:21,,1610612747.0,,James Driving Layup\n",
        );

        let loaded = read_events(file.path()).unwrap();
        assert_eq!(loaded.events.len(), 2);
        assert_eq!(loaded.skipped, 0);

        let first = &loaded.events[0];
        assert_eq!(first.game_id, "0021800001");
        assert_eq!(first.event_num, 2);
        assert_eq!(first.period, Some(1));
        assert_eq!(first.margin.as_deref(), Some("2"));
        assert_eq!(first.actor_team, Some(TeamId(1610612744)));
        assert!(first.home_description.is_some());
        assert!(first.away_description.is_none());

        let second = &loaded.events[1];
        assert!(second.margin.is_none());
        assert!(second.home_description.is_none());
    }

    #[test]
    fn test_tolerates_column_subset() {
        let file = write_csv(
            "GAME_ID,EVENTNUM,PERIOD\n\
             0021800001,1,1\n\
             0021800001,2,4\n",
        );

        let loaded = read_events(file.path()).unwrap();
        assert_eq!(loaded.events.len(), 2);
        assert!(loaded.events[0].clock.is_none());
        assert!(loaded.events[0].margin.is_none());
        assert!(loaded.events[0].actor_team.is_none());
    }

    #[test]
    fn test_skips_unreadable_rows() {
        let file = write_csv(
            "GAME_ID,EVENTNUM,PERIOD\n\
             0021800001,1,1\n\
             0021800001,not-a-number,1\n",
        );

        let loaded = read_events(file.path()).unwrap();
        assert_eq!(loaded.events.len(), 1);
        assert_eq!(loaded.skipped, 1);
    }
}

//! Game-clock normalization
//!
//! Collapses quarter + clock-remaining pairs onto a single countdown axis
//! and formats that axis back into quarter labels for display.

/// Seconds in one 12-minute period.
pub const SECS_PER_PERIOD: u32 = 720;

/// Seconds in a full four-quarter regulation game.
pub const REGULATION_SECS: u32 = 4 * SECS_PER_PERIOD;

/// Parse a "MM:SS" clock string into seconds.
///
/// Returns None for anything that does not parse; callers substitute 0 and
/// count the row as defaulted rather than aborting the batch.
pub fn parse_clock(raw: &str) -> Option<u32> {
    let (minutes, seconds) = raw.trim().split_once(':')?;
    let minutes: u32 = minutes.trim().parse().ok()?;
    let seconds: u32 = seconds.trim().parse().ok()?;
    if seconds >= 60 {
        return None;
    }
    Some(minutes * 60 + seconds)
}

/// True seconds remaining in regulation for a given period and seconds left
/// in that period.
///
/// Overtime periods (period > 4) are not chained onto the regulation
/// countdown: they report seconds remaining in the period only, resetting
/// each OT. Changing this would shift the time axis under every stored row
/// and the trained model, so the reset behavior is kept as-is.
pub fn true_seconds_remaining(period: u32, secs_in_period: u32) -> u32 {
    if period == 0 {
        return REGULATION_SECS;
    }
    if period > 4 {
        return secs_in_period;
    }
    (4 - period) * SECS_PER_PERIOD + secs_in_period
}

/// Format a true-seconds-remaining value as a quarter clock, e.g. 750 ->
/// "Q4 12:30".
///
/// An exact quarter boundary (remainder 0 with time still on the clock)
/// renders as the full 12:00 of the earlier quarter, not 0:00.
pub fn format_time_label(secs_remaining: u32) -> String {
    let quarter = if secs_remaining > 2160 {
        "Q1"
    } else if secs_remaining > 1440 {
        "Q2"
    } else if secs_remaining > 720 {
        "Q3"
    } else {
        "Q4"
    };

    let mut rem_in_q = secs_remaining % SECS_PER_PERIOD;
    if rem_in_q == 0 && secs_remaining > 0 {
        rem_in_q = SECS_PER_PERIOD;
    }

    format!("{} {}:{:02}", quarter, rem_in_q / 60, rem_in_q % 60)
}

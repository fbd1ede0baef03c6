//! Free-text fragment parsing — turns the trailing portion of a chat
//! command into a structured partial task update.
//!
//! Extraction runs in a fixed order; each step is independent and a step
//! that finds nothing simply leaves its field unset (malformed fragments
//! never error):
//!
//! 1. **Status** — explicit "to <phrase>" first, then loose whole-text
//!    containment over a wider synonym set
//! 2. **Difficulty** — containment over synonym sets, EASY → EPIC
//! 3. **Date** — "today" / "tomorrow" literals
//! 4. **Time** — last time-like match wins (supports "…no wait, 7pm"),
//!    applied only when a date was found
//! 5. **Tracker** — "(in|within|for) [the] <words>" up to an attribute stop
//! 6. **Title** — "(name|title|call|rename) [is/to/be] <words>"
//! 7. **Fallback rename** — a bare fragment with no extracted fields is
//!    treated as a title ("Dinner with Alex")

use chrono::{DateTime, Days, Local, Timelike};
use regex::Regex;
use std::sync::OnceLock;

use crate::types::{Difficulty, TaskStatus};
use crate::vocab;

// ---------------------------------------------------------------------------
// TaskUpdate
// ---------------------------------------------------------------------------

/// A partial update extracted from a free-text fragment. Any subset of
/// fields (including none) may be set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskUpdate {
    pub status: Option<TaskStatus>,
    pub difficulty: Option<Difficulty>,
    /// Due timestamp in epoch milliseconds, local time.
    pub due_date: Option<i64>,
    /// Target tracker/course name, free text (resolved later).
    pub tracker: Option<String>,
    /// New title, free text.
    pub title: Option<String>,
}

impl TaskUpdate {
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.difficulty.is_none()
            && self.due_date.is_none()
            && self.tracker.is_none()
            && self.title.is_none()
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Parse a fragment against the current wall clock.
pub fn parse_updates(fragment: &str) -> TaskUpdate {
    parse_updates_at(fragment, Local::now())
}

/// Parse a fragment with an injected clock. "today" resolves to `now`'s
/// date, "tomorrow" to the day after; an explicit time replaces the
/// hour/minute and zeroes seconds.
pub fn parse_updates_at(fragment: &str, now: DateTime<Local>) -> TaskUpdate {
    let lower = fragment.to_lowercase();
    let mut update = TaskUpdate {
        status: extract_status(&lower),
        difficulty: extract_difficulty(&lower),
        due_date: extract_due(&lower, now),
        tracker: extract_tracker(fragment),
        title: extract_title(fragment),
    };

    // Fallback rename: a short free-form fragment with nothing else in it
    // is a title ("Dinner with Alex").
    if update.is_empty() {
        let trimmed = fragment.trim();
        let starts_with_verb =
            lower.trim_start().starts_with("change") || lower.trim_start().starts_with("update");
        if trimmed.chars().count() > 2 && !starts_with_verb {
            update.title = Some(trimmed.to_string());
        }
    }

    update
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

fn status_marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // Longest alternatives first so "in progress" wins over "progress".
        Regex::new(r"\bto\s+(in progress|to do|todo|progress|complete|done)\b")
            .expect("status marker regex")
    })
}

fn extract_status(lower: &str) -> Option<TaskStatus> {
    let v = vocab::vocab();

    // Explicit "to <phrase>" marker.
    if let Some(caps) = status_marker_re().captures(lower) {
        let phrase = caps.get(1).map(|m| m.as_str()).unwrap_or("");
        for (status, phrases) in &v.status_phrases {
            if phrases.iter().any(|p| p == phrase) {
                return Some(*status);
            }
        }
    }

    // Loose whole-text containment over the wider synonym sets.
    for (status, phrases) in &v.status_loose {
        if phrases.iter().any(|p| lower.contains(p.as_str())) {
            return Some(*status);
        }
    }

    None
}

// ---------------------------------------------------------------------------
// Difficulty
// ---------------------------------------------------------------------------

fn extract_difficulty(lower: &str) -> Option<Difficulty> {
    for (difficulty, words) in &vocab::vocab().difficulty_words {
        if words.iter().any(|w| lower.contains(w.as_str())) {
            return Some(*difficulty);
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Date and time
// ---------------------------------------------------------------------------

fn time_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(\d{1,2})(?::([0-5]\d))?\s*(am|pm|o'?clock)?\b").expect("time regex")
    })
}

fn extract_due(lower: &str, now: DateTime<Local>) -> Option<i64> {
    // "today" checked first; "tomorrow" only if "today" did not fire.
    let date = if lower.contains("today") {
        Some(now)
    } else if lower.contains("tomorrow") {
        now.checked_add_days(Days::new(1))
    } else {
        None
    }?;

    // Scan ALL time-like matches and use the last one, so the user can
    // self-correct ("…at 5, no wait, 7pm"). A time without a date is
    // ignored entirely.
    let mut resolved = date;
    if let Some(caps) = time_re().captures_iter(lower).last() {
        if let Some((hour, minute)) = parse_clock(&caps) {
            resolved = resolved
                .with_hour(hour)
                .and_then(|d| d.with_minute(minute))
                .and_then(|d| d.with_second(0))
                .and_then(|d| d.with_nanosecond(0))
                .unwrap_or(resolved);
        }
    }

    Some(resolved.timestamp_millis())
}

/// Turn a time-regex capture into a 24h (hour, minute) pair. Out-of-range
/// hours are treated as not-a-time.
fn parse_clock(caps: &regex::Captures<'_>) -> Option<(u32, u32)> {
    let mut hour: u32 = caps.get(1)?.as_str().parse().ok()?;
    let minute: u32 = caps
        .get(2)
        .map(|m| m.as_str().parse().unwrap_or(0))
        .unwrap_or(0);

    match caps.get(3).map(|m| m.as_str()) {
        Some("pm") => {
            if hour != 12 {
                hour += 12;
            }
        }
        Some("am") => {
            if hour == 12 {
                hour = 0;
            }
        }
        _ => {}
    }

    if hour > 23 {
        return None;
    }
    Some((hour, minute))
}

// ---------------------------------------------------------------------------
// Tracker and title captures
// ---------------------------------------------------------------------------

fn tracker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(?:in|within|for)\s+(?:the\s+)?(.+)$").expect("tracker regex")
    })
}

fn title_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(?:rename|name|title|call)(?:\s+(?:is|to|be))?\s+(.+)$")
            .expect("title regex")
    })
}

fn extract_tracker(original: &str) -> Option<String> {
    let caps = tracker_re().captures(original)?;
    let tail = caps.get(1)?;
    let captured = cut_at_stop_keyword(&original[tail.start()..tail.end()]);
    let captured = captured.trim();

    // False positives from the status/date grammar ("to in progress",
    // "in time") must not become tracker names.
    let cl = captured.to_lowercase();
    if captured.is_empty() || cl == "progress" || cl == "time" {
        return None;
    }
    Some(captured.to_string())
}

fn extract_title(original: &str) -> Option<String> {
    let caps = title_re().captures(original)?;
    let tail = caps.get(1)?;
    let captured = cut_at_stop_keyword(&original[tail.start()..tail.end()]);
    let captured = captured.trim();
    if captured.is_empty() {
        return None;
    }
    Some(captured.to_string())
}

/// Truncate a capture at the first whole word that is an attribute stop
/// keyword (difficulty/status/date grammar words, "and").
fn cut_at_stop_keyword(text: &str) -> &str {
    let stops = &vocab::vocab().attribute_stops;
    let mut cut = text.len();
    let mut offset = 0;
    for word in text.split_whitespace() {
        // Locate this word's byte offset in the original slice.
        let start = text[offset..].find(word).map(|p| p + offset).unwrap_or(offset);
        offset = start + word.len();
        let w = word.to_lowercase();
        if stops.iter().any(|s| *s == w) {
            cut = start;
            break;
        }
    }
    &text[..cut]
}

/// Title portion of a task-creation fragment: everything before the first
/// attribute keyword or tracker preposition. Returns `None` if the title
/// would be empty.
pub fn leading_title(fragment: &str) -> Option<String> {
    let stops = &vocab::vocab().attribute_stops;
    let mut kept: Vec<&str> = Vec::new();
    for word in fragment.split_whitespace() {
        let w = word.to_lowercase();
        let is_stop = stops.iter().any(|s| *s == w);
        let is_preposition = matches!(w.as_str(), "in" | "within" | "for");
        if is_stop || is_preposition {
            break;
        }
        kept.push(word);
    }
    if kept.is_empty() {
        return None;
    }
    Some(kept.join(" "))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone};

    fn fixed_now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 5, 10, 30, 0).unwrap()
    }

    fn parse(fragment: &str) -> TaskUpdate {
        parse_updates_at(fragment, fixed_now())
    }

    fn local_dt(ms: i64) -> DateTime<Local> {
        Local.timestamp_millis_opt(ms).unwrap()
    }

    // -- Status --

    #[test]
    fn test_to_in_progress_sets_only_status() {
        let u = parse("to in progress");
        assert_eq!(u.status, Some(TaskStatus::InProgress));
        assert_eq!(u.difficulty, None);
        assert_eq!(u.due_date, None);
        assert_eq!(u.tracker, None);
        assert_eq!(u.title, None);
    }

    #[test]
    fn test_to_done() {
        assert_eq!(parse("to done").status, Some(TaskStatus::Completed));
        assert_eq!(parse("to complete").status, Some(TaskStatus::Completed));
    }

    #[test]
    fn test_to_todo() {
        assert_eq!(parse("to todo").status, Some(TaskStatus::NotStarted));
        assert_eq!(parse("move it to to do").status, Some(TaskStatus::NotStarted));
    }

    #[test]
    fn test_loose_status_synonyms() {
        assert_eq!(parse("i finished it").status, Some(TaskStatus::Completed));
        assert_eq!(parse("started working on it").status, Some(TaskStatus::InProgress));
        assert_eq!(parse("still doing it").status, Some(TaskStatus::InProgress));
    }

    // -- Difficulty --

    #[test]
    fn test_difficulty_synonyms() {
        assert_eq!(parse("pretty trivial stuff").difficulty, Some(Difficulty::Easy));
        assert_eq!(parse("make it legendary").difficulty, Some(Difficulty::Epic));
        assert_eq!(parse("quite difficult").difficulty, Some(Difficulty::Hard));
    }

    #[test]
    fn test_difficulty_first_set_wins() {
        // "easy" is tested before "hard".
        assert_eq!(parse("easy not hard").difficulty, Some(Difficulty::Easy));
    }

    // -- Date and time --

    #[test]
    fn test_due_tomorrow_at_5pm() {
        let u = parse("hard and due tomorrow at 5pm");
        assert_eq!(u.difficulty, Some(Difficulty::Hard));
        let dt = local_dt(u.due_date.expect("due date"));
        assert_eq!(dt.day(), 6);
        assert_eq!(dt.hour(), 17);
        assert_eq!(dt.minute(), 0);
        assert_eq!(dt.second(), 0);
    }

    #[test]
    fn test_due_today_keeps_current_time_without_clock() {
        let u = parse("due today");
        let dt = local_dt(u.due_date.unwrap());
        assert_eq!(dt.day(), 5);
        assert_eq!(dt.hour(), 10);
    }

    #[test]
    fn test_today_beats_tomorrow() {
        let u = parse("today not tomorrow");
        let dt = local_dt(u.due_date.unwrap());
        assert_eq!(dt.day(), 5);
    }

    #[test]
    fn test_last_time_match_wins() {
        let u = parse("due today at 5, no wait, 7pm");
        let dt = local_dt(u.due_date.unwrap());
        assert_eq!(dt.hour(), 19);
    }

    #[test]
    fn test_time_without_date_ignored() {
        assert_eq!(parse("at 5pm").due_date, None);
    }

    #[test]
    fn test_twelve_hour_edge_cases() {
        let noon = parse("due today at 12pm");
        assert_eq!(local_dt(noon.due_date.unwrap()).hour(), 12);
        let midnight = parse("due today at 12am");
        assert_eq!(local_dt(midnight.due_date.unwrap()).hour(), 0);
    }

    #[test]
    fn test_minutes_and_oclock() {
        let u = parse("due tomorrow at 9:45 am");
        let dt = local_dt(u.due_date.unwrap());
        assert_eq!((dt.hour(), dt.minute()), (9, 45));

        let u = parse("due tomorrow at 8 o'clock");
        assert_eq!(local_dt(u.due_date.unwrap()).hour(), 8);
    }

    // -- Tracker --

    #[test]
    fn test_tracker_capture() {
        assert_eq!(parse("in the biology course").tracker.as_deref(), Some("biology course"));
        assert_eq!(parse("for chemistry").tracker.as_deref(), Some("chemistry"));
    }

    #[test]
    fn test_tracker_stops_before_attributes() {
        let u = parse("in biology due tomorrow");
        assert_eq!(u.tracker.as_deref(), Some("biology"));
        assert!(u.due_date.is_some());
    }

    #[test]
    fn test_tracker_rejects_grammar_captures() {
        assert_eq!(parse("to in progress").tracker, None);
        assert_eq!(parse("in time").tracker, None);
    }

    // -- Title --

    #[test]
    fn test_explicit_rename() {
        let u = parse("rename to Weekly review");
        assert_eq!(u.title.as_deref(), Some("Weekly review"));
    }

    #[test]
    fn test_title_stops_at_and() {
        let u = parse("title is Grocery run and due tomorrow");
        assert_eq!(u.title.as_deref(), Some("Grocery run"));
        assert!(u.due_date.is_some());
    }

    // -- Fallback rename --

    #[test]
    fn test_bare_fragment_is_title() {
        let u = parse("Dinner with Alex");
        assert_eq!(u.title.as_deref(), Some("Dinner with Alex"));
        assert_eq!(u.status, None);
        assert_eq!(u.due_date, None);
    }

    #[test]
    fn test_fallback_skipped_for_short_or_verb_fragments() {
        assert!(parse("ok").title.is_none());
        assert!(parse("change").title.is_none());
        assert!(parse("update").title.is_none());
    }

    #[test]
    fn test_empty_fragment_empty_update() {
        assert!(parse("").is_empty());
        assert!(parse("   ").is_empty());
    }

    // -- leading_title --

    #[test]
    fn test_leading_title_cuts_attributes() {
        assert_eq!(
            leading_title("finish essay due tomorrow at 5pm hard in biology").as_deref(),
            Some("finish essay")
        );
        assert_eq!(leading_title("laundry").as_deref(), Some("laundry"));
        assert_eq!(leading_title("due tomorrow"), None);
    }
}

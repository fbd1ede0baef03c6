//! Domain snapshot types.
//!
//! These mirror the documents held by the external store. The engine never
//! owns canonical state — it receives read-only snapshots of these per turn
//! and emits mutation requests back (see `action`). Serde shapes match the
//! store's document format: SCREAMING_SNAKE enums, camelCase field keys,
//! epoch-millisecond timestamps.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Lifecycle status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    NotStarted,
    Started,
    InProgress,
    Completed,
}

impl TaskStatus {
    /// Short display label, as shown in chat responses.
    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::NotStarted => "not started",
            TaskStatus::Started => "started",
            TaskStatus::InProgress => "in progress",
            TaskStatus::Completed => "completed",
        }
    }
}

/// Difficulty tier of a task. Variant order is the urgency order used by
/// the next-task suggestion (Epic outranks Easy), so `Ord` is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Epic,
}

impl Difficulty {
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Epic => "epic",
        }
    }
}

// ---------------------------------------------------------------------------
// Store documents
// ---------------------------------------------------------------------------

/// A task document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub status: TaskStatus,
    pub difficulty: Difficulty,
    /// Free-text skill tags. Unordered; identity is case-insensitive for
    /// matching but the stored casing is preserved.
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub tracker_id: Option<String>,
    /// Due timestamp in epoch milliseconds, if any.
    #[serde(default)]
    pub due_date: Option<i64>,
}

/// A tracker (course/module) document. Name uniqueness is not enforced;
/// disambiguation happens via fuzzy matching at action time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tracker {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub kind: Option<String>,
}

/// A habit document. Read-only from the engine's perspective.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: String,
    pub title: String,
    pub goal_amount: f64,
    pub unit: String,
    pub start_date: i64,
}

/// One day's log entry for a habit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitLog {
    pub habit_id: String,
    /// Day granularity, YYYY-MM-DD.
    pub date: chrono::NaiveDate,
    pub value: f64,
}

/// Per-skill progression.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillStat {
    pub level: u32,
    /// Progress toward the next skill level, 0–100.
    pub value: f64,
}

/// The user's progression snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub level: u32,
    pub xp: u64,
    pub next_level_xp: u64,
    pub streak: u32,
    #[serde(default)]
    pub skills: HashMap<String, SkillStat>,
}

impl Default for UserStats {
    fn default() -> Self {
        Self {
            level: 1,
            xp: 0,
            next_level_xp: 100,
            streak: 0,
            skills: HashMap::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Chat transcript
// ---------------------------------------------------------------------------

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// One message in the conversation transcript. Created per turn, never
/// mutated, dropped only on session reset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: u64,
    pub text: String,
    pub sender: Sender,
    /// Epoch milliseconds.
    pub timestamp: i64,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn enum_wire_form<T: Serialize>(value: &T) -> String {
        serde_yaml::to_string(value).unwrap().trim().to_string()
    }

    #[test]
    fn test_status_wire_form_screaming_snake() {
        assert_eq!(enum_wire_form(&TaskStatus::InProgress), "IN_PROGRESS");
        assert_eq!(enum_wire_form(&TaskStatus::NotStarted), "NOT_STARTED");
        assert_eq!(enum_wire_form(&TaskStatus::Completed), "COMPLETED");
    }

    #[test]
    fn test_difficulty_ordering() {
        assert!(Difficulty::Epic > Difficulty::Hard);
        assert!(Difficulty::Hard > Difficulty::Medium);
        assert!(Difficulty::Medium > Difficulty::Easy);
    }

    #[test]
    fn test_task_roundtrip() {
        let task = Task {
            id: "t1".into(),
            title: "Finish essay".into(),
            status: TaskStatus::Started,
            difficulty: Difficulty::Hard,
            skills: vec!["Writing".into()],
            tracker_id: Some("tr1".into()),
            due_date: Some(1_700_000_000_000),
        };
        let s = serde_yaml::to_string(&task).unwrap();
        assert!(s.contains("dueDate"), "camelCase keys expected: {}", s);
        let back: Task = serde_yaml::from_str(&s).unwrap();
        assert_eq!(back.title, "Finish essay");
        assert_eq!(back.status, TaskStatus::Started);
        assert_eq!(back.due_date, Some(1_700_000_000_000));
    }

    #[test]
    fn test_habit_log_date_format() {
        let s = "habitId: h1\ndate: 2024-03-05\nvalue: 2.5\n";
        let log: HabitLog = serde_yaml::from_str(s).unwrap();
        assert_eq!(log.date.to_string(), "2024-03-05");
    }

    #[test]
    fn test_task_optional_fields_default() {
        let s = "id: t2\ntitle: Laundry\nstatus: NOT_STARTED\ndifficulty: EASY\n";
        let task: Task = serde_yaml::from_str(s).unwrap();
        assert!(task.skills.is_empty());
        assert!(task.tracker_id.is_none());
        assert!(task.due_date.is_none());
    }
}

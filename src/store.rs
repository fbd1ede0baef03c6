//! The external store seam.
//!
//! The real application keeps tasks, trackers, habits, and stats in a
//! hosted document store; the engine only sees read snapshots and emits
//! mutation requests. [`TaskStore`] is that boundary. [`InMemoryStore`] is
//! the reference implementation used by the demo binary and the
//! integration tests.

use thiserror::Error;

use crate::action::Mutation;
use crate::types::{Difficulty, Habit, HabitLog, Task, TaskStatus, Tracker, UserStats};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("no such task: {0}")]
    NoSuchTask(String),
    #[error("no such tracker: {0}")]
    NoSuchTracker(String),
}

// ---------------------------------------------------------------------------
// Write-intent payloads
// ---------------------------------------------------------------------------

/// Fields for a task to be created. The store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub status: TaskStatus,
    pub difficulty: Difficulty,
    pub due_date: Option<i64>,
    pub tracker_id: Option<String>,
}

/// A fully resolved partial update: every entity reference is an id, never
/// a free-text name. Produced by `action::resolve`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub status: Option<TaskStatus>,
    pub difficulty: Option<Difficulty>,
    pub due_date: Option<i64>,
    pub tracker_id: Option<String>,
    pub title: Option<String>,
}

// ---------------------------------------------------------------------------
// TaskStore trait
// ---------------------------------------------------------------------------

/// Mutation surface of the external store.
pub trait TaskStore {
    fn create_task(&mut self, new: NewTask) -> Result<Task, StoreError>;
    fn update_task(&mut self, task_id: &str, patch: &TaskPatch) -> Result<(), StoreError>;
    fn delete_task(&mut self, task_id: &str) -> Result<(), StoreError>;
    fn create_tracker(&mut self, name: &str) -> Result<Tracker, StoreError>;
    fn delete_tracker(&mut self, tracker_id: &str) -> Result<(), StoreError>;

    /// Execute one resolved mutation.
    fn apply(&mut self, mutation: &Mutation) -> Result<(), StoreError> {
        match mutation {
            Mutation::CreateTask(new) => self.create_task(new.clone()).map(|_| ()),
            Mutation::UpdateTask { task_id, patch } => self.update_task(task_id, patch),
            Mutation::DeleteTask { task_id } => self.delete_task(task_id),
            Mutation::CreateTracker { name } => self.create_tracker(name).map(|_| ()),
            Mutation::DeleteTracker { tracker_id } => self.delete_tracker(tracker_id),
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshot trait
// ---------------------------------------------------------------------------

/// Read surface of the external store: per-turn snapshots for the engine.
pub trait Snapshot {
    fn tasks(&self) -> &[Task];
    fn trackers(&self) -> &[Tracker];
    fn habits(&self) -> &[Habit];
    fn habit_logs(&self) -> &[HabitLog];
    fn user_stats(&self) -> &UserStats;
}

// ---------------------------------------------------------------------------
// In-memory reference store
// ---------------------------------------------------------------------------

/// A plain in-memory store, good enough for the REPL demo and for tests.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    pub tasks: Vec<Task>,
    pub trackers: Vec<Tracker>,
    pub habits: Vec<Habit>,
    pub habit_logs: Vec<HabitLog>,
    pub user_stats: UserStats,
    next_id: u64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }

    /// Seed helper used by tests and the demo binary.
    pub fn add_tracker(&mut self, name: &str) -> String {
        let id = self.next_id("tracker");
        self.trackers.push(Tracker {
            id: id.clone(),
            name: name.to_string(),
            kind: None,
        });
        id
    }

    /// Seed helper used by tests and the demo binary.
    pub fn add_task(&mut self, title: &str, status: TaskStatus, difficulty: Difficulty) -> String {
        let id = self.next_id("task");
        self.tasks.push(Task {
            id: id.clone(),
            title: title.to_string(),
            status,
            difficulty,
            skills: Vec::new(),
            tracker_id: None,
            due_date: None,
        });
        id
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn task_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }
}

impl Snapshot for InMemoryStore {
    fn tasks(&self) -> &[Task] {
        &self.tasks
    }
    fn trackers(&self) -> &[Tracker] {
        &self.trackers
    }
    fn habits(&self) -> &[Habit] {
        &self.habits
    }
    fn habit_logs(&self) -> &[HabitLog] {
        &self.habit_logs
    }
    fn user_stats(&self) -> &UserStats {
        &self.user_stats
    }
}

impl TaskStore for InMemoryStore {
    fn create_task(&mut self, new: NewTask) -> Result<Task, StoreError> {
        let task = Task {
            id: self.next_id("task"),
            title: new.title,
            status: new.status,
            difficulty: new.difficulty,
            skills: Vec::new(),
            tracker_id: new.tracker_id,
            due_date: new.due_date,
        };
        self.tasks.push(task.clone());
        Ok(task)
    }

    fn update_task(&mut self, task_id: &str, patch: &TaskPatch) -> Result<(), StoreError> {
        let task = self
            .task_mut(task_id)
            .ok_or_else(|| StoreError::NoSuchTask(task_id.to_string()))?;
        if let Some(status) = patch.status {
            task.status = status;
        }
        if let Some(difficulty) = patch.difficulty {
            task.difficulty = difficulty;
        }
        if let Some(due) = patch.due_date {
            task.due_date = Some(due);
        }
        if let Some(tracker_id) = &patch.tracker_id {
            task.tracker_id = Some(tracker_id.clone());
        }
        if let Some(title) = &patch.title {
            task.title = title.clone();
        }
        Ok(())
    }

    fn delete_task(&mut self, task_id: &str) -> Result<(), StoreError> {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != task_id);
        if self.tasks.len() == before {
            return Err(StoreError::NoSuchTask(task_id.to_string()));
        }
        Ok(())
    }

    fn create_tracker(&mut self, name: &str) -> Result<Tracker, StoreError> {
        let tracker = Tracker {
            id: self.next_id("tracker"),
            name: name.to_string(),
            kind: None,
        };
        self.trackers.push(tracker.clone());
        Ok(tracker)
    }

    fn delete_tracker(&mut self, tracker_id: &str) -> Result<(), StoreError> {
        let before = self.trackers.len();
        self.trackers.retain(|t| t.id != tracker_id);
        if self.trackers.len() == before {
            return Err(StoreError::NoSuchTracker(tracker_id.to_string()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

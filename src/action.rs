//! Actions and the two-phase dispatcher.
//!
//! A matched rule may produce an [`Action`]: a requested mutation whose
//! entity references are still free text ("delete task dinner in biology").
//! Dispatch happens in two phases:
//!
//! 1. [`resolve`] — pure. Free-text names are resolved to concrete ids
//!    against the live snapshots using the fuzzy matcher. Failure here is a
//!    [`ResolveError`] and must be surfaced to the user; no mutation is
//!    issued and nothing is guessed.
//! 2. `TaskStore::apply` — the resolved [`Mutation`] goes to the store.
//!    The reply text is already formulated by then, so a store failure is
//!    logged rather than reported (fire-and-forget).

use thiserror::Error;

use crate::fuzzy::best_match;
use crate::intent::TaskUpdate;
use crate::store::{NewTask, TaskPatch};
use crate::types::{Difficulty, Task, TaskStatus, Tracker};

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// A structured, not-yet-executed mutation request produced by a rule.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    CreateTask {
        title: String,
        updates: TaskUpdate,
    },
    EditTask {
        task_name: String,
        course_name: Option<String>,
        updates: TaskUpdate,
    },
    DeleteTask {
        task_name: String,
        course_name: Option<String>,
    },
    CreateTracker {
        name: String,
    },
    DeleteTracker {
        name: String,
    },
}

/// A mutation with every entity reference resolved to an id.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    CreateTask(NewTask),
    UpdateTask { task_id: String, patch: TaskPatch },
    DeleteTask { task_id: String },
    CreateTracker { name: String },
    DeleteTracker { tracker_id: String },
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("I couldn't find a task matching \"{0}\".")]
    UnknownTask(String),
    #[error("I couldn't find a course matching \"{0}\".")]
    UnknownTracker(String),
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Resolve an action's free-text entity references against live snapshots.
///
/// Tracker names try a case-insensitive exact match before falling back to
/// the fuzzy matcher. Task names go through the fuzzy matcher over titles,
/// optionally narrowed to tasks whose tracker name contains `course_name`.
pub fn resolve(
    action: &Action,
    tasks: &[Task],
    trackers: &[Tracker],
) -> Result<Mutation, ResolveError> {
    match action {
        Action::CreateTask { title, updates } => {
            // Unresolvable tracker text falls back to the first (general)
            // tracker rather than aborting the creation; no tracker is
            // ever invented.
            let tracker_id = match &updates.tracker {
                Some(name) => find_tracker(name, trackers)
                    .map(|t| t.id.clone())
                    .or_else(|| trackers.first().map(|t| t.id.clone())),
                None => None,
            };
            Ok(Mutation::CreateTask(NewTask {
                title: title.clone(),
                status: updates.status.unwrap_or(TaskStatus::NotStarted),
                difficulty: updates.difficulty.unwrap_or(Difficulty::Medium),
                due_date: updates.due_date,
                tracker_id,
            }))
        }
        Action::EditTask {
            task_name,
            course_name,
            updates,
        } => {
            let task = find_task(task_name, course_name.as_deref(), tasks, trackers)?;
            let tracker_id = match &updates.tracker {
                Some(name) => Some(
                    find_tracker(name, trackers)
                        .map(|t| t.id.clone())
                        .ok_or_else(|| ResolveError::UnknownTracker(name.clone()))?,
                ),
                None => None,
            };
            Ok(Mutation::UpdateTask {
                task_id: task.id.clone(),
                patch: TaskPatch {
                    status: updates.status,
                    difficulty: updates.difficulty,
                    due_date: updates.due_date,
                    tracker_id,
                    title: updates.title.clone(),
                },
            })
        }
        Action::DeleteTask {
            task_name,
            course_name,
        } => {
            let task = find_task(task_name, course_name.as_deref(), tasks, trackers)?;
            Ok(Mutation::DeleteTask {
                task_id: task.id.clone(),
            })
        }
        Action::CreateTracker { name } => Ok(Mutation::CreateTracker { name: name.clone() }),
        Action::DeleteTracker { name } => {
            let tracker = find_tracker(name, trackers)
                .ok_or_else(|| ResolveError::UnknownTracker(name.clone()))?;
            Ok(Mutation::DeleteTracker {
                tracker_id: tracker.id.clone(),
            })
        }
    }
}

/// Exact case-insensitive name match first, then the fuzzy matcher.
fn find_tracker<'a>(name: &str, trackers: &'a [Tracker]) -> Option<&'a Tracker> {
    let lower = name.trim().to_lowercase();
    trackers
        .iter()
        .find(|t| t.name.to_lowercase() == lower)
        .or_else(|| best_match(name, trackers, |t| &t.name))
}

/// Fuzzy-match a task by title, optionally narrowed by course name.
fn find_task<'a>(
    task_name: &str,
    course_name: Option<&str>,
    tasks: &'a [Task],
    trackers: &[Tracker],
) -> Result<&'a Task, ResolveError> {
    let narrowed: Vec<&Task> = match course_name {
        Some(course) => {
            let course_lower = course.to_lowercase();
            tasks
                .iter()
                .filter(|t| {
                    t.tracker_id
                        .as_deref()
                        .and_then(|id| trackers.iter().find(|tr| tr.id == id))
                        .map(|tr| tr.name.to_lowercase().contains(&course_lower))
                        .unwrap_or(false)
                })
                .collect()
        }
        None => tasks.iter().collect(),
    };

    best_match(task_name, &narrowed, |t| t.title.as_str())
        .map(|t| &**t)
        .ok_or_else(|| ResolveError::UnknownTask(task_name.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str, title: &str, tracker_id: Option<&str>) -> Task {
        Task {
            id: id.into(),
            title: title.into(),
            status: TaskStatus::NotStarted,
            difficulty: Difficulty::Medium,
            skills: Vec::new(),
            tracker_id: tracker_id.map(String::from),
            due_date: None,
        }
    }

    fn tracker(id: &str, name: &str) -> Tracker {
        Tracker {
            id: id.into(),
            name: name.into(),
            kind: None,
        }
    }

    #[test]
    fn test_edit_resolves_fuzzy_task_name() {
        let tasks = [task("t1", "Dinner with Alex", None), task("t2", "Laundry", None)];
        let action = Action::EditTask {
            task_name: "dinner".into(),
            course_name: None,
            updates: TaskUpdate {
                status: Some(TaskStatus::Completed),
                ..TaskUpdate::default()
            },
        };
        let m = resolve(&action, &tasks, &[]).unwrap();
        match m {
            Mutation::UpdateTask { task_id, patch } => {
                assert_eq!(task_id, "t1");
                assert_eq!(patch.status, Some(TaskStatus::Completed));
            }
            other => panic!("expected UpdateTask, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_task_is_an_error_not_a_guess() {
        let tasks = [task("t1", "Dinner", None)];
        let action = Action::DeleteTask {
            task_name: "xyzzy12345".into(),
            course_name: None,
        };
        let err = resolve(&action, &tasks, &[]).unwrap_err();
        assert_eq!(err, ResolveError::UnknownTask("xyzzy12345".into()));
    }

    #[test]
    fn test_course_filter_narrows_candidates() {
        let trackers = [tracker("tr1", "Biology"), tracker("tr2", "History")];
        let tasks = [
            task("t1", "Read chapter", Some("tr1")),
            task("t2", "Read chapter", Some("tr2")),
        ];
        let action = Action::DeleteTask {
            task_name: "read chapter".into(),
            course_name: Some("history".into()),
        };
        let m = resolve(&action, &tasks, &trackers).unwrap();
        assert_eq!(m, Mutation::DeleteTask { task_id: "t2".into() });
    }

    #[test]
    fn test_tracker_exact_match_beats_fuzzy() {
        let trackers = [tracker("tr1", "Math 101"), tracker("tr2", "Math")];
        assert_eq!(find_tracker("math", &trackers).unwrap().id, "tr2");
    }

    #[test]
    fn test_create_task_falls_back_to_first_tracker() {
        let trackers = [tracker("tr1", "General"), tracker("tr2", "Biology")];
        let action = Action::CreateTask {
            title: "Stretch".into(),
            updates: TaskUpdate {
                tracker: Some("qqqqqqqq".into()),
                ..TaskUpdate::default()
            },
        };
        match resolve(&action, &[], &trackers).unwrap() {
            Mutation::CreateTask(new) => assert_eq!(new.tracker_id.as_deref(), Some("tr1")),
            other => panic!("expected CreateTask, got {:?}", other),
        }
    }

    #[test]
    fn test_create_task_defaults() {
        let action = Action::CreateTask {
            title: "Laundry".into(),
            updates: TaskUpdate::default(),
        };
        match resolve(&action, &[], &[]).unwrap() {
            Mutation::CreateTask(new) => {
                assert_eq!(new.status, TaskStatus::NotStarted);
                assert_eq!(new.difficulty, Difficulty::Medium);
                assert_eq!(new.tracker_id, None);
            }
            other => panic!("expected CreateTask, got {:?}", other),
        }
    }

    #[test]
    fn test_edit_with_unknown_tracker_aborts() {
        let tasks = [task("t1", "Essay", None)];
        let action = Action::EditTask {
            task_name: "essay".into(),
            course_name: None,
            updates: TaskUpdate {
                tracker: Some("zzzzzzzzzz".into()),
                ..TaskUpdate::default()
            },
        };
        let err = resolve(&action, &tasks, &[]).unwrap_err();
        assert!(matches!(err, ResolveError::UnknownTracker(_)));
    }

    #[test]
    fn test_delete_tracker_by_fuzzy_name() {
        let trackers = [tracker("tr1", "Chemistry")];
        let action = Action::DeleteTracker {
            name: "chemistr".into(),
        };
        let m = resolve(&action, &[], &trackers).unwrap();
        assert_eq!(m, Mutation::DeleteTracker { tracker_id: "tr1".into() });
    }
}

//! The dialogue rule table.
//!
//! An ordered chain-of-responsibility: each rule pairs a match predicate
//! (whole-token keyword set or regex) with a response generator and an
//! optional action generator. The engine walks the table top to bottom and
//! the first rule whose topic gate passes and whose predicate matches wins —
//! **order is part of the contract**. Specific command regexes sit above the
//! general keyword rules that would otherwise shadow them, and topic-gated
//! follow-up rules sit above their ungated counterparts.
//!
//! Response generators are pure functions of the context snapshot and the
//! regex capture groups; they never touch the store.

use chrono::{Local, TimeZone};
use regex::Regex;
use std::sync::OnceLock;

use crate::action::Action;
use crate::engine::ChatContext;
use crate::fuzzy::names_similar;
use crate::intent::{leading_title, parse_updates, TaskUpdate};
use crate::types::{SkillStat, Task, TaskStatus};
use crate::vocab;

// ---------------------------------------------------------------------------
// Topics
// ---------------------------------------------------------------------------

/// Topic tokens published by topic-setting rules and required by gated
/// follow-up rules. Free strings by contract; constants to avoid typos.
pub mod topic {
    pub const TASKS: &str = "TASKS";
    pub const STATS: &str = "STATS";
    pub const HABITS: &str = "HABITS";
}

// ---------------------------------------------------------------------------
// Rule machinery
// ---------------------------------------------------------------------------

/// How a rule matches a query.
pub enum Matcher {
    /// Every keyword must appear as a whole token.
    AllOf(&'static [&'static str]),
    /// At least one keyword must appear as a whole token.
    AnyOf(&'static [&'static str]),
    /// Regex over the raw query text.
    Pattern(Regex),
}

impl Matcher {
    /// Try to match; returns capture groups on success (empty for keyword
    /// matchers). Tokens are the query split on non-alphanumeric
    /// boundaries, so "habit" never matches inside "habitat".
    pub fn try_match(&self, query: &str, tokens: &[String]) -> Option<Vec<Option<String>>> {
        match self {
            Matcher::AllOf(words) => {
                if words.iter().all(|w| tokens.iter().any(|t| t == w)) {
                    Some(Vec::new())
                } else {
                    None
                }
            }
            Matcher::AnyOf(words) => {
                if words.iter().any(|w| tokens.iter().any(|t| t == w)) {
                    Some(Vec::new())
                } else {
                    None
                }
            }
            Matcher::Pattern(re) => re.captures(query).map(|caps| {
                (1..caps.len())
                    .map(|i| caps.get(i).map(|m| m.as_str().to_string()))
                    .collect()
            }),
        }
    }
}

/// The matched-rule context handed to response and action generators.
pub struct RuleMatch<'a> {
    pub query: &'a str,
    pub groups: Vec<Option<String>>,
}

impl RuleMatch<'_> {
    /// Capture group `i` (1-based, as in the regex), trimmed, with any
    /// surrounding quotes stripped.
    pub fn group(&self, i: usize) -> Option<&str> {
        self.groups
            .get(i.checked_sub(1)?)?
            .as_deref()
            .map(|s| s.trim().trim_matches(|c| c == '"' || c == '\''))
            .filter(|s| !s.is_empty())
    }
}

type Responder = fn(&ChatContext, &RuleMatch) -> String;
type ActionGen = fn(&ChatContext, &RuleMatch) -> Option<Action>;

/// One entry in the dialogue table.
pub struct Rule {
    pub name: &'static str,
    pub matcher: Matcher,
    /// Skip this rule unless the conversation's current topic equals this.
    pub required_topic: Option<&'static str>,
    /// Topic to publish when this rule fires.
    pub set_topic: Option<&'static str>,
    pub respond: Responder,
    pub action: Option<ActionGen>,
}

// ---------------------------------------------------------------------------
// The table
// ---------------------------------------------------------------------------

static RULES: OnceLock<Vec<Rule>> = OnceLock::new();

/// The ordered rule table (built once).
pub fn rules() -> &'static [Rule] {
    RULES.get_or_init(build_rules)
}

fn pattern(re: &str) -> Matcher {
    Matcher::Pattern(Regex::new(re).expect("rule regex must compile"))
}

fn build_rules() -> Vec<Rule> {
    vec![
        // -- Task commands (specific regexes first) --
        Rule {
            name: "complete-task-marker",
            matcher: pattern(
                r"(?i)^(?:mark|set|move)\s+(?:the\s+)?(?:task\s+)?(.+?)\s+(?:as\s+|to\s+)(?:done|complete|completed|finished)\s*[.!]?$",
            ),
            required_topic: None,
            set_topic: Some(topic::TASKS),
            respond: respond_complete,
            action: Some(action_complete),
        },
        Rule {
            name: "complete-task-verb",
            matcher: pattern(r"(?i)^(?:finish|complete)\s+(?:the\s+)?(?:task\s+)?(.+?)\s*[.!]?$"),
            required_topic: None,
            set_topic: Some(topic::TASKS),
            respond: respond_complete,
            action: Some(action_complete),
        },
        Rule {
            name: "create-task",
            matcher: pattern(
                r"(?i)^(?:please\s+)?(?:add|create|make|new)\s+(?:a\s+|another\s+|new\s+)?task\s*[:,]?\s*(?:called\s+|named\s+)?(.*)$",
            ),
            required_topic: None,
            set_topic: Some(topic::TASKS),
            respond: respond_create_task,
            action: Some(action_create_task),
        },
        Rule {
            name: "delete-task",
            matcher: pattern(r"(?i)^(?:delete|remove|drop)\s+(?:the\s+)?task\s+(.+?)\s*[.!]?$"),
            required_topic: None,
            set_topic: Some(topic::TASKS),
            respond: respond_delete_task,
            action: Some(action_delete_task),
        },
        Rule {
            name: "create-tracker",
            matcher: pattern(
                r"(?i)^(?:please\s+)?(?:add|create|make|new)\s+(?:a\s+|another\s+|new\s+)?(?:tracker|course|module)\s*[:,]?\s*(?:called\s+|named\s+)?(.*)$",
            ),
            required_topic: None,
            set_topic: None,
            respond: respond_create_tracker,
            action: Some(action_create_tracker),
        },
        Rule {
            name: "delete-tracker",
            matcher: pattern(
                r"(?i)^(?:delete|remove|drop)\s+(?:the\s+)?(?:tracker|course|module)\s+(?:called\s+|named\s+)?(.+?)\s*[.!]?$",
            ),
            required_topic: None,
            set_topic: None,
            respond: respond_delete_tracker,
            action: Some(action_delete_tracker),
        },
        // General edit comes after the completion/delete forms it would
        // otherwise shadow.
        Rule {
            name: "edit-task",
            matcher: pattern(r"(?i)^(?:change|update|edit|set|mark|move)\s+(?:the\s+)?(?:task\s+)?(.+)$"),
            required_topic: None,
            set_topic: Some(topic::TASKS),
            respond: respond_edit_task,
            action: Some(action_edit_task),
        },
        // -- Task queries --
        Rule {
            name: "task-count",
            matcher: Matcher::AllOf(&["how", "many", "tasks"]),
            required_topic: None,
            set_topic: Some(topic::TASKS),
            respond: respond_task_count,
            action: None,
        },
        Rule {
            name: "next-suggestion",
            matcher: pattern(
                r"(?i)\bwhat\s+should\s+i\s+(?:do|work|tackle)\b|\bwhat(?:'?s|\s+is)\s+next\b|\bwhat\s+to\s+do\s+next\b",
            ),
            required_topic: None,
            set_topic: Some(topic::TASKS),
            respond: respond_next_suggestion,
            action: None,
        },
        Rule {
            name: "due-review",
            matcher: pattern(r"(?i)\bwhat(?:'?s|\s+is)\s+due\b|\boverdue\b|\bdue\s+today\b|\bdue\s+soon\b"),
            required_topic: None,
            set_topic: Some(topic::TASKS),
            respond: respond_due_review,
            action: None,
        },
        // -- Topic-gated follow-ups (must precede their generic versions) --
        Rule {
            name: "stats-habit-percentage",
            matcher: Matcher::AnyOf(&["habit", "habits"]),
            required_topic: Some(topic::STATS),
            set_topic: Some(topic::HABITS),
            respond: respond_habit_percentage,
            action: None,
        },
        Rule {
            name: "habits-progress",
            matcher: pattern(r"(?i)\bhow\s+am\s+i\s+doing\b|\bprogress\b"),
            required_topic: Some(topic::HABITS),
            set_topic: None,
            respond: respond_habit_progress,
            action: None,
        },
        Rule {
            name: "tasks-completed-followup",
            matcher: Matcher::AnyOf(&["completed", "done", "finished"]),
            required_topic: Some(topic::TASKS),
            set_topic: None,
            respond: respond_completed_tasks,
            action: None,
        },
        // -- Stats / habits / tasks overviews --
        Rule {
            name: "stats",
            matcher: pattern(r"(?i)\bstats?\b|\blevel\b|\bxp\b|\bhow\s+am\s+i\s+doing\b"),
            required_topic: None,
            set_topic: Some(topic::STATS),
            respond: respond_stats,
            action: None,
        },
        Rule {
            name: "streak",
            matcher: Matcher::AnyOf(&["streak"]),
            required_topic: None,
            set_topic: Some(topic::STATS),
            respond: respond_streak,
            action: None,
        },
        Rule {
            name: "skills",
            matcher: Matcher::AnyOf(&["skill", "skills"]),
            required_topic: None,
            set_topic: Some(topic::STATS),
            respond: respond_skills,
            action: None,
        },
        Rule {
            name: "tasks-list",
            matcher: Matcher::AnyOf(&["tasks", "todo", "todos"]),
            required_topic: None,
            set_topic: Some(topic::TASKS),
            respond: respond_tasks_list,
            action: None,
        },
        Rule {
            name: "habits-list",
            matcher: Matcher::AnyOf(&["habit", "habits"]),
            required_topic: None,
            set_topic: Some(topic::HABITS),
            respond: respond_habits_list,
            action: None,
        },
        // -- Small talk --
        Rule {
            name: "help",
            matcher: pattern(r"(?i)\bhelp\b|\bcommands\b|\bwhat\s+can\s+you\s+do\b"),
            required_topic: None,
            set_topic: None,
            respond: respond_help,
            action: None,
        },
        Rule {
            name: "who-are-you",
            matcher: pattern(r"(?i)\bwho\s+are\s+you\b|\byour\s+name\b"),
            required_topic: None,
            set_topic: None,
            respond: respond_who,
            action: None,
        },
        Rule {
            name: "greeting",
            matcher: Matcher::AnyOf(&["hi", "hello", "hey", "yo", "howdy"]),
            required_topic: None,
            set_topic: None,
            respond: respond_greeting,
            action: None,
        },
        Rule {
            name: "thanks",
            matcher: Matcher::AnyOf(&["thanks", "thank", "thx", "ty"]),
            required_topic: None,
            set_topic: None,
            respond: |_, _| "Anytime. Go earn that XP.".to_string(),
            action: None,
        },
        Rule {
            name: "bye",
            matcher: Matcher::AnyOf(&["bye", "goodbye", "cya"]),
            required_topic: None,
            set_topic: None,
            respond: |_, _| "See you! I'll keep an eye on your streak.".to_string(),
            action: None,
        },
    ]
}

// ---------------------------------------------------------------------------
// Task command generators
// ---------------------------------------------------------------------------

fn respond_complete(_ctx: &ChatContext, m: &RuleMatch) -> String {
    match m.group(1) {
        Some(name) => format!("Nice — marking \"{}\" as completed.", name),
        None => "Which task did you finish?".to_string(),
    }
}

fn action_complete(_ctx: &ChatContext, m: &RuleMatch) -> Option<Action> {
    let name = m.group(1)?;
    Some(Action::EditTask {
        task_name: name.to_string(),
        course_name: None,
        updates: TaskUpdate {
            status: Some(TaskStatus::Completed),
            ..TaskUpdate::default()
        },
    })
}

fn respond_create_task(_ctx: &ChatContext, m: &RuleMatch) -> String {
    let fragment = match m.group(1) {
        Some(f) => f,
        None => return "What should the task be called?".to_string(),
    };
    let title = match leading_title(fragment) {
        Some(t) => t,
        None => return "What should the task be called?".to_string(),
    };
    let updates = parse_updates(fragment);
    let mut parts = Vec::new();
    if let Some(d) = updates.difficulty {
        parts.push(d.label().to_string());
    }
    if let Some(due) = updates.due_date {
        parts.push(format!("due {}", fmt_due(due)));
    }
    if parts.is_empty() {
        format!("Added \"{}\" to your tasks.", title)
    } else {
        format!("Added \"{}\" ({}).", title, parts.join(", "))
    }
}

fn action_create_task(_ctx: &ChatContext, m: &RuleMatch) -> Option<Action> {
    let fragment = m.group(1)?;
    let title = leading_title(fragment)?;
    Some(Action::CreateTask {
        title,
        updates: parse_updates(fragment),
    })
}

fn respond_edit_task(_ctx: &ChatContext, m: &RuleMatch) -> String {
    let capture = match m.group(1) {
        Some(c) => c,
        None => return "Which task should I change?".to_string(),
    };
    let (name, fragment) = split_target(capture);
    if name.is_empty() {
        return "Which task should I change?".to_string();
    }
    let updates = parse_updates(&fragment);
    if updates.is_empty() {
        return format!(
            "What should I change about \"{}\"? You can say things like 'to done', 'hard', or 'due tomorrow at 5pm'.",
            name
        );
    }
    format!("Updating \"{}\": {}.", name, describe_updates(&updates))
}

fn action_edit_task(_ctx: &ChatContext, m: &RuleMatch) -> Option<Action> {
    let capture = m.group(1)?;
    let (name, fragment) = split_target(capture);
    if name.is_empty() {
        return None;
    }
    let updates = parse_updates(&fragment);
    if updates.is_empty() {
        return None;
    }
    Some(Action::EditTask {
        task_name: name,
        course_name: None,
        updates,
    })
}

fn respond_delete_task(_ctx: &ChatContext, m: &RuleMatch) -> String {
    match m.group(1) {
        Some(capture) => {
            let (name, course) = split_course(capture);
            match course {
                Some(course) => format!("Removing \"{}\" from {}.", name, course),
                None => format!("Removing \"{}\" from your tasks.", name),
            }
        }
        None => "Which task should I delete?".to_string(),
    }
}

fn action_delete_task(_ctx: &ChatContext, m: &RuleMatch) -> Option<Action> {
    let capture = m.group(1)?;
    let (name, course) = split_course(capture);
    Some(Action::DeleteTask {
        task_name: name,
        course_name: course,
    })
}

fn respond_create_tracker(_ctx: &ChatContext, m: &RuleMatch) -> String {
    match m.group(1) {
        Some(name) => format!("Created a new course called \"{}\".", name),
        None => "What should the course be called?".to_string(),
    }
}

fn action_create_tracker(_ctx: &ChatContext, m: &RuleMatch) -> Option<Action> {
    Some(Action::CreateTracker {
        name: m.group(1)?.to_string(),
    })
}

fn respond_delete_tracker(_ctx: &ChatContext, m: &RuleMatch) -> String {
    match m.group(1) {
        Some(name) => format!("Deleting the course \"{}\".", name),
        None => "Which course should I delete?".to_string(),
    }
}

fn action_delete_tracker(_ctx: &ChatContext, m: &RuleMatch) -> Option<Action> {
    Some(Action::DeleteTracker {
        name: m.group(1)?.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Query responders
// ---------------------------------------------------------------------------

fn respond_task_count(ctx: &ChatContext, _m: &RuleMatch) -> String {
    let open = ctx
        .tasks
        .iter()
        .filter(|t| t.status != TaskStatus::Completed)
        .count();
    match open {
        0 => "Zero open tasks. Enjoy it while it lasts.".to_string(),
        1 => "Just one open task.".to_string(),
        n => format!("{} open tasks.", n),
    }
}

fn respond_tasks_list(ctx: &ChatContext, _m: &RuleMatch) -> String {
    let open: Vec<&Task> = ctx
        .tasks
        .iter()
        .filter(|t| t.status != TaskStatus::Completed)
        .collect();
    if open.is_empty() {
        return "Your task list is empty — add one with 'add a task called …'.".to_string();
    }
    let mut lines = vec![format!("You have {} open task(s):", open.len())];
    for task in open {
        let due = task
            .due_date
            .map(|d| format!(", due {}", fmt_due(d)))
            .unwrap_or_default();
        lines.push(format!(
            "• {} — {}, {}{}",
            task.title,
            task.status.label(),
            task.difficulty.label(),
            due
        ));
    }
    lines.join("\n")
}

fn respond_completed_tasks(ctx: &ChatContext, _m: &RuleMatch) -> String {
    let done: Vec<&Task> = ctx
        .tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Completed)
        .collect();
    if done.is_empty() {
        return "Nothing completed yet — pick something small and knock it out.".to_string();
    }
    let mut lines = vec![format!("You've completed {} task(s):", done.len())];
    for task in &done {
        lines.push(format!("• {} ({})", task.title, task.difficulty.label()));
    }
    lines.join("\n")
}

fn respond_next_suggestion(ctx: &ChatContext, _m: &RuleMatch) -> String {
    let now_ms = Local::now().timestamp_millis();
    let mut open: Vec<&Task> = ctx
        .tasks
        .iter()
        .filter(|t| t.status != TaskStatus::Completed)
        .collect();
    if open.is_empty() {
        return "Nothing on your plate. Add a task or go log a habit.".to_string();
    }
    // Overdue before on-time, then hardest first, then earliest due.
    open.sort_by_key(|t| {
        let overdue = t.due_date.map(|d| d < now_ms).unwrap_or(false);
        (
            std::cmp::Reverse(overdue),
            std::cmp::Reverse(t.difficulty),
            t.due_date.unwrap_or(i64::MAX),
        )
    });
    let top = open[0];
    let overdue = top.due_date.map(|d| d < now_ms).unwrap_or(false);
    if overdue {
        format!(
            "\"{}\" is overdue and it's {} — I'd tackle that first.",
            top.title,
            top.difficulty.label()
        )
    } else {
        let due = top
            .due_date
            .map(|d| format!(", due {}", fmt_due(d)))
            .unwrap_or_default();
        format!("I'd start with \"{}\" ({}{}).", top.title, top.difficulty.label(), due)
    }
}

fn respond_due_review(ctx: &ChatContext, _m: &RuleMatch) -> String {
    let now = Local::now();
    let now_ms = now.timestamp_millis();
    let today = now.date_naive();

    let mut overdue = Vec::new();
    let mut today_due = Vec::new();
    for task in ctx.tasks.iter().filter(|t| t.status != TaskStatus::Completed) {
        if let Some(ms) = task.due_date {
            if ms < now_ms {
                overdue.push(task);
            } else if local_date(ms) == Some(today) {
                today_due.push(task);
            }
        }
    }

    if overdue.is_empty() && today_due.is_empty() {
        return "Nothing overdue and nothing due today. You're ahead of the game.".to_string();
    }
    let mut lines = Vec::new();
    if !overdue.is_empty() {
        lines.push(format!("Overdue ({}):", overdue.len()));
        for t in &overdue {
            lines.push(format!("• {} ({})", t.title, t.difficulty.label()));
        }
    }
    if !today_due.is_empty() {
        lines.push(format!("Due today ({}):", today_due.len()));
        for t in &today_due {
            lines.push(format!("• {}", t.title));
        }
    }
    lines.join("\n")
}

// ---------------------------------------------------------------------------
// Stats / habits responders
// ---------------------------------------------------------------------------

fn respond_stats(ctx: &ChatContext, _m: &RuleMatch) -> String {
    let s = ctx.user_stats;
    let remaining = s.next_level_xp.saturating_sub(s.xp);
    format!(
        "You're level {} with {}/{} XP — {} to the next level. Current streak: {} day(s).",
        s.level, s.xp, s.next_level_xp, remaining, s.streak
    )
}

fn respond_streak(ctx: &ChatContext, _m: &RuleMatch) -> String {
    match ctx.user_stats.streak {
        0 => "No streak right now — log something today to start one.".to_string(),
        1 => "1-day streak. Keep it alive today!".to_string(),
        n => format!("{}-day streak. Don't break the chain.", n),
    }
}

fn respond_skills(ctx: &ChatContext, _m: &RuleMatch) -> String {
    let merged = merged_skills(ctx);
    if merged.is_empty() {
        return "No skills tracked yet. Tag your tasks with skills to start leveling them.".to_string();
    }
    let mut lines = vec!["Your strongest skills:".to_string()];
    for (name, stat) in merged.iter().take(3) {
        lines.push(format!("• {} — level {} ({:.0}/100)", name, stat.level, stat.value));
    }
    lines.join("\n")
}

/// Deduplicate skill names with the symmetric similarity test, keeping the
/// strongest entry of each cluster, strongest-first.
fn merged_skills(ctx: &ChatContext) -> Vec<(String, SkillStat)> {
    let mut names: Vec<&String> = ctx.user_stats.skills.keys().collect();
    names.sort(); // deterministic cluster seeds

    let mut merged: Vec<(String, SkillStat)> = Vec::new();
    for name in names {
        let stat = ctx.user_stats.skills[name].clone();
        match merged.iter_mut().find(|(n, _)| names_similar(n, name)) {
            Some((_, existing)) => {
                if (stat.level, stat.value as u64) > (existing.level, existing.value as u64) {
                    *existing = stat;
                }
            }
            None => merged.push((name.clone(), stat)),
        }
    }
    merged.sort_by(|a, b| {
        (b.1.level, b.1.value as u64).cmp(&(a.1.level, a.1.value as u64))
    });
    merged
}

fn respond_habits_list(ctx: &ChatContext, _m: &RuleMatch) -> String {
    if ctx.habits.is_empty() {
        return "You don't have any habits set up yet.".to_string();
    }
    let mut lines = vec![format!("You're tracking {} habit(s):", ctx.habits.len())];
    for habit in ctx.habits {
        lines.push(format!("• {} — goal {} {}/day", habit.title, habit.goal_amount, habit.unit));
    }
    lines.join("\n")
}

fn respond_habit_percentage(ctx: &ChatContext, _m: &RuleMatch) -> String {
    if ctx.habits.is_empty() {
        return "You don't have any habits set up yet.".to_string();
    }
    let today = Local::now().date_naive();
    let done = ctx
        .habits
        .iter()
        .filter(|h| {
            ctx.habit_logs
                .iter()
                .any(|l| l.habit_id == h.id && l.date == today && l.value > 0.0)
        })
        .count();
    let pct = (done as f64 / ctx.habits.len() as f64 * 100.0).round();
    format!(
        "Habits today: {}/{} logged — that's {:.0}%.",
        done,
        ctx.habits.len(),
        pct
    )
}

fn respond_habit_progress(ctx: &ChatContext, _m: &RuleMatch) -> String {
    if ctx.habits.is_empty() {
        return "You don't have any habits set up yet.".to_string();
    }
    let today = Local::now().date_naive();
    let mut lines = vec!["Today's habit progress:".to_string()];
    for habit in ctx.habits {
        let logged: f64 = ctx
            .habit_logs
            .iter()
            .filter(|l| l.habit_id == habit.id && l.date == today)
            .map(|l| l.value)
            .sum();
        lines.push(format!(
            "• {}: {}/{} {}",
            habit.title, logged, habit.goal_amount, habit.unit
        ));
    }
    lines.join("\n")
}

// ---------------------------------------------------------------------------
// Small talk responders
// ---------------------------------------------------------------------------

fn respond_greeting(ctx: &ChatContext, _m: &RuleMatch) -> String {
    format!(
        "Hey! Elite65 here. You're level {} — what are we working on today?",
        ctx.user_stats.level
    )
}

fn respond_who(_ctx: &ChatContext, _m: &RuleMatch) -> String {
    "I'm Elite65, your productivity sidekick. I manage tasks and courses, and keep tabs on your habits, XP and streak.".to_string()
}

fn respond_help(_ctx: &ChatContext, _m: &RuleMatch) -> String {
    [
        "Here's what I can do:",
        "• 'what are my tasks' / 'how many tasks'",
        "• 'add a task called read chapter 4 due tomorrow at 5pm hard'",
        "• 'change essay to done' / 'finish essay'",
        "• 'delete task essay in biology'",
        "• 'add a course called Chemistry'",
        "• 'what should I do next' / 'what's due'",
        "• 'how am I doing' / 'streak' / 'skills' / 'habits'",
    ]
    .join("\n")
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Split an edit capture into (task name, trailing fragment): the name is
/// everything before the first attribute keyword. A linking "as"/"is" is a
/// cut point too but is dropped from the fragment ("essay as hard" parses
/// the same as "essay hard").
fn split_target(text: &str) -> (String, String) {
    let stops = &vocab::vocab().attribute_stops;
    let words: Vec<&str> = text.split_whitespace().collect();
    let cut = words
        .iter()
        .position(|w| {
            let lower = w.to_lowercase();
            lower == "as" || lower == "is" || stops.iter().any(|s| *s == lower)
        })
        .unwrap_or(words.len());
    let name = words[..cut].join(" ");
    let rest = match words.get(cut) {
        Some(w) if w.eq_ignore_ascii_case("as") || w.eq_ignore_ascii_case("is") => cut + 1,
        _ => cut,
    };
    (name, words[rest..].join(" "))
}

/// Split a delete capture into (task name, optional course name) on the
/// first " in ".
fn split_course(text: &str) -> (String, Option<String>) {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"(?i)^(.+?)\s+in\s+(?:the\s+)?(.+)$").expect("course split regex")
    });
    match re.captures(text) {
        Some(caps) => (
            caps.get(1).map(|m| m.as_str().trim().to_string()).unwrap_or_default(),
            caps.get(2).map(|m| m.as_str().trim().to_string()),
        ),
        None => (text.trim().to_string(), None),
    }
}

fn fmt_due(ms: i64) -> String {
    match Local.timestamp_millis_opt(ms).single() {
        Some(dt) => dt.format("%b %e, %H:%M").to_string(),
        None => "sometime".to_string(),
    }
}

fn local_date(ms: i64) -> Option<chrono::NaiveDate> {
    Local.timestamp_millis_opt(ms).single().map(|dt| dt.date_naive())
}

/// Turn a TaskUpdate into a short human summary ("status → done, due …").
fn describe_updates(updates: &TaskUpdate) -> String {
    let mut parts = Vec::new();
    if let Some(s) = updates.status {
        parts.push(format!("status → {}", s.label()));
    }
    if let Some(d) = updates.difficulty {
        parts.push(format!("difficulty → {}", d.label()));
    }
    if let Some(due) = updates.due_date {
        parts.push(format!("due → {}", fmt_due(due)));
    }
    if let Some(tracker) = &updates.tracker {
        parts.push(format!("course → {}", tracker));
    }
    if let Some(title) = &updates.title {
        parts.push(format!("title → \"{}\"", title));
    }
    parts.join(", ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_builds_and_regexes_compile() {
        assert!(rules().len() > 15);
    }

    #[test]
    fn test_gated_rules_precede_generic_counterparts() {
        let names: Vec<&str> = rules().iter().map(|r| r.name).collect();
        let gated = names.iter().position(|n| *n == "stats-habit-percentage").unwrap();
        let generic = names.iter().position(|n| *n == "habits-list").unwrap();
        assert!(gated < generic, "gated habit rule must shadow the generic one");

        let complete = names.iter().position(|n| *n == "complete-task-marker").unwrap();
        let edit = names.iter().position(|n| *n == "edit-task").unwrap();
        assert!(complete < edit, "completion form must shadow the generic edit rule");
    }

    #[test]
    fn test_split_target() {
        let (name, fragment) = split_target("essay to done");
        assert_eq!(name, "essay");
        assert_eq!(fragment, "to done");

        let (name, fragment) = split_target("weekly review due tomorrow");
        assert_eq!(name, "weekly review");
        assert_eq!(fragment, "due tomorrow");

        let (name, fragment) = split_target("essay as hard");
        assert_eq!(name, "essay");
        assert_eq!(fragment, "hard");

        let (name, fragment) = split_target("laundry");
        assert_eq!(name, "laundry");
        assert_eq!(fragment, "");
    }

    #[test]
    fn test_split_course() {
        let (name, course) = split_course("read chapter in biology");
        assert_eq!(name, "read chapter");
        assert_eq!(course.as_deref(), Some("biology"));

        let (name, course) = split_course("laundry");
        assert_eq!(name, "laundry");
        assert_eq!(course, None);
    }

    #[test]
    fn test_whole_token_keyword_matching() {
        let m = Matcher::AnyOf(&["habit"]);
        let tokens = vec!["a".to_string(), "habitat".to_string()];
        assert!(m.try_match("a habitat", &tokens).is_none(), "'habit' must not match inside 'habitat'");
        let tokens = vec!["my".to_string(), "habit".to_string()];
        assert!(m.try_match("my habit", &tokens).is_some());
    }

    #[test]
    fn test_all_of_requires_every_keyword() {
        let m = Matcher::AllOf(&["how", "many", "tasks"]);
        let yes: Vec<String> = ["how", "many", "tasks", "left"].iter().map(|s| s.to_string()).collect();
        let no: Vec<String> = ["how", "many"].iter().map(|s| s.to_string()).collect();
        assert!(m.try_match("", &yes).is_some());
        assert!(m.try_match("", &no).is_none());
    }

    #[test]
    fn test_rule_match_group_strips_quotes() {
        let m = RuleMatch {
            query: "x",
            groups: vec![Some("\"Dinner with Alex\"".to_string()), None],
        };
        assert_eq!(m.group(1), Some("Dinner with Alex"));
        assert_eq!(m.group(2), None);
        assert_eq!(m.group(3), None);
    }
}

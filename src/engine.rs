//! Query routing.
//!
//! `route` is the single entry point for one conversational turn: it walks
//! the ordered rule table, honors topic gates against the caller-supplied
//! previous topic, and returns the first match's response plus any requested
//! mutation. No rule matching at all falls through to a canned fallback,
//! picked deterministically from the query text so identical queries repeat
//! the same line.
//!
//! Routing is pure: state lives with the caller (see `session`).

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::action::Action;
use crate::rules::{rules, RuleMatch};
use crate::types::{Habit, HabitLog, Task, UserStats};
use crate::vocab;

// ---------------------------------------------------------------------------
// Context and reply
// ---------------------------------------------------------------------------

/// Read-only snapshot of the world for one turn. Borrowed from the store;
/// responders never mutate through it.
pub struct ChatContext<'a> {
    pub tasks: &'a [Task],
    pub habits: &'a [Habit],
    pub habit_logs: &'a [HabitLog],
    pub user_stats: &'a UserStats,
}

/// The outcome of routing one query.
#[derive(Debug)]
pub struct Reply {
    /// Response text for the user. Always present, even on fallback.
    pub text: String,
    /// Topic published by the matched rule, if it sets one.
    pub new_topic: Option<String>,
    /// Mutation request for the dispatcher, if the rule produced one.
    pub action: Option<Action>,
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

/// Route a query against the rule table. First match wins; `last_topic`
/// only unlocks topic-gated rules, all others fire regardless.
pub fn route(query: &str, ctx: &ChatContext, last_topic: Option<&str>) -> Reply {
    let query = query.trim();
    let tokens = tokenize(query);

    for rule in rules() {
        if let Some(required) = rule.required_topic {
            if last_topic != Some(required) {
                continue;
            }
        }
        if let Some(groups) = rule.matcher.try_match(query, &tokens) {
            log::debug!("rule '{}' matched query {:?}", rule.name, query);
            let m = RuleMatch { query, groups };
            let text = (rule.respond)(ctx, &m);
            let action = rule.action.and_then(|generate| generate(ctx, &m));
            return Reply {
                text,
                new_topic: rule.set_topic.map(str::to_string),
                action,
            };
        }
    }

    log::debug!("no rule matched query {:?}, using fallback", query);
    Reply {
        text: pick_fallback(query).to_string(),
        new_topic: None,
        action: None,
    }
}

/// Lowercased tokens split on non-alphanumeric boundaries. Keyword matchers
/// compare whole tokens only.
pub fn tokenize(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Pick a fallback line by hashing the query into the pool, so the choice
/// looks varied across queries but is stable for any one query.
fn pick_fallback(query: &str) -> &'static str {
    let pool = &vocab::vocab().fallbacks;
    let mut hasher = DefaultHasher::new();
    query.hash(&mut hasher);
    let idx = (hasher.finish() % pool.len() as u64) as usize;
    &pool[idx]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

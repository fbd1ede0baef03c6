//! Conversation state and the per-turn pipeline.
//!
//! `Conversation` owns everything a chat turn needs besides the store: the
//! current topic and the message transcript. `submit` runs the full turn:
//!
//! 1. record the user message,
//! 2. route the query against a snapshot of the store,
//! 3. resolve any requested action into a concrete mutation,
//! 4. apply the mutation to the store,
//! 5. record and return the bot reply.
//!
//! A failed resolution replaces the reply text with the failure message, so
//! the bot never claims a change it did not make. A store rejection after a
//! successful resolution is logged and otherwise ignored; the turn's text is
//! already committed by then.

use chrono::Local;

use crate::action::resolve;
use crate::engine::{route, ChatContext};
use crate::store::{Snapshot, TaskStore};
use crate::types::{ChatMessage, Sender};

/// One user's chat session. Not thread-safe; one per conversation.
#[derive(Debug, Default)]
pub struct Conversation {
    topic: Option<String>,
    messages: Vec<ChatMessage>,
    next_message_id: u64,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// The topic published by the most recent topic-setting rule, if any.
    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    /// Full transcript, oldest first.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Drop the transcript and the topic.
    pub fn reset(&mut self) {
        self.topic = None;
        self.messages.clear();
        self.next_message_id = 0;
    }

    /// Run one chat turn and return the bot's reply text.
    pub fn submit<S>(&mut self, text: &str, store: &mut S) -> String
    where
        S: Snapshot + TaskStore,
    {
        self.push_message(text, Sender::User);

        let reply = {
            let ctx = ChatContext {
                tasks: store.tasks(),
                habits: store.habits(),
                habit_logs: store.habit_logs(),
                user_stats: store.user_stats(),
            };
            route(text, &ctx, self.topic.as_deref())
        };

        let mut reply_text = reply.text;
        if let Some(action) = reply.action {
            match resolve(&action, store.tasks(), store.trackers()) {
                Ok(mutation) => {
                    if let Err(err) = store.apply(&mutation) {
                        log::warn!("store rejected mutation: {}", err);
                    }
                }
                Err(err) => {
                    // Honest failure: never keep the success phrasing.
                    reply_text = err.to_string();
                }
            }
        }

        if let Some(topic) = reply.new_topic {
            self.topic = Some(topic);
        }

        self.push_message(&reply_text, Sender::Bot);
        reply_text
    }

    fn push_message(&mut self, text: &str, sender: Sender) {
        self.next_message_id += 1;
        self.messages.push(ChatMessage {
            id: self.next_message_id,
            text: text.to_string(),
            sender,
            timestamp: Local::now().timestamp_millis(),
        });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use crate::types::{Difficulty, TaskStatus};

    #[test]
    fn test_transcript_records_both_sides() {
        let mut store = InMemoryStore::new();
        let mut convo = Conversation::new();
        convo.submit("hello", &mut store);

        let messages = convo.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].sender, Sender::User);
        assert_eq!(messages[0].text, "hello");
        assert_eq!(messages[1].sender, Sender::Bot);
        assert_eq!(messages[1].id, 2);
    }

    #[test]
    fn test_create_task_lands_in_store() {
        let mut store = InMemoryStore::new();
        let mut convo = Conversation::new();
        let reply = convo.submit("add a task called water the plants", &mut store);

        assert!(reply.contains("water the plants"), "reply: {}", reply);
        assert_eq!(store.tasks.len(), 1);
        assert_eq!(store.tasks[0].title, "water the plants");
        assert_eq!(store.tasks[0].status, TaskStatus::NotStarted);
        assert_eq!(store.tasks[0].difficulty, Difficulty::Medium);
        assert_eq!(convo.topic(), Some("TASKS"));
    }

    #[test]
    fn test_failed_resolution_replaces_reply_text() {
        let mut store = InMemoryStore::new();
        store.add_task("Essay", TaskStatus::NotStarted, Difficulty::Medium);
        let mut convo = Conversation::new();

        let reply = convo.submit("finish the quarterly report", &mut store);
        assert!(
            reply.contains("couldn't find a task"),
            "should admit failure, got: {}",
            reply
        );
        assert_eq!(store.tasks[0].status, TaskStatus::NotStarted, "nothing changed");
    }

    #[test]
    fn test_topic_persists_across_non_topic_turns() {
        let mut store = InMemoryStore::new();
        let mut convo = Conversation::new();

        convo.submit("show my stats", &mut store);
        assert_eq!(convo.topic(), Some("STATS"));

        // Fallback turn does not clear the topic.
        convo.submit("zxqy gibberish", &mut store);
        assert_eq!(convo.topic(), Some("STATS"));
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut store = InMemoryStore::new();
        let mut convo = Conversation::new();
        convo.submit("show my stats", &mut store);
        convo.reset();
        assert!(convo.messages().is_empty());
        assert!(convo.topic().is_none());
    }
}

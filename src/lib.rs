//! Elite65 — a rule-based chat interpreter for a gamified task manager.
//!
//! The pipeline per turn: `engine::route` walks the ordered `rules` table
//! (keyword and regex matchers, topic gates), the matched rule parses the
//! query with `intent` and `fuzzy`, and any resulting `action` is resolved
//! against store snapshots and applied through the `store` traits. `session`
//! ties it together and keeps the transcript.

pub mod action;
pub mod engine;
pub mod fuzzy;
pub mod intent;
pub mod line_editor;
pub mod rules;
pub mod session;
pub mod store;
pub mod types;
pub mod vocab;

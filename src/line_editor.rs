//! Readline wrapper for the chat REPL.
//!
//! Emacs-mode line editing with persistent history in `~/.elite65_history`.
//! History errors never surface; a missing or corrupt history file just
//! means starting empty.

use rustyline::error::ReadlineError;
use rustyline::{Config, DefaultEditor, EditMode};
use std::path::PathBuf;

const MAX_HISTORY: usize = 1000;
const HISTORY_FILE: &str = ".elite65_history";

/// Result of a single line read.
pub enum ReadResult {
    Line(String),
    /// Ctrl-C; caller should re-prompt.
    Interrupted,
    /// Ctrl-D or stdin closed.
    Eof,
}

pub struct LineEditor {
    editor: DefaultEditor,
    history_path: Option<PathBuf>,
}

impl LineEditor {
    pub fn new() -> Result<Self, ReadlineError> {
        let config = Config::builder()
            .edit_mode(EditMode::Emacs)
            .max_history_size(MAX_HISTORY)?
            .auto_add_history(false)
            .build();
        let mut editor = DefaultEditor::with_config(config)?;

        let history_path = home_dir().map(|home| home.join(HISTORY_FILE));
        if let Some(ref path) = history_path {
            let _ = editor.load_history(path);
        }

        Ok(LineEditor {
            editor,
            history_path,
        })
    }

    pub fn read_line(&mut self, prompt: &str) -> ReadResult {
        match self.editor.readline(prompt) {
            Ok(line) => ReadResult::Line(line),
            Err(ReadlineError::Interrupted) => ReadResult::Interrupted,
            Err(_) => ReadResult::Eof,
        }
    }

    /// Record a line and persist; write failures are ignored.
    pub fn add_history(&mut self, line: &str) {
        let _ = self.editor.add_history_entry(line);
        if let Some(ref path) = self.history_path {
            let _ = self.editor.save_history(path);
        }
    }
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

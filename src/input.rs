use std::io::BufRead;
use std::path::PathBuf;

use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;

use crate::completion::Completer;
use crate::types::{ShellError, ShellResult};

/// Line-oriented control stream. Lines come back without their newline;
/// `None` means the stream is exhausted.
pub trait LineSource {
    fn next_line(&mut self, prompt: &str) -> ShellResult<Option<String>>;

    /// Told the shell's current `PATH` before each prompt.
    fn set_search_path(&mut self, _search_path: &str) {}
}

/// Redirected input or a scripted buffer. Prompts are not shown.
pub struct ScriptSource<R> {
    reader: R,
}

impl<R: BufRead> ScriptSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> LineSource for ScriptSource<R> {
    fn next_line(&mut self, _prompt: &str) -> ShellResult<Option<String>> {
        let mut line = String::new();
        let read = self
            .reader
            .read_line(&mut line)
            .map_err(|e| ShellError::io("read", e))?;
        if read == 0 {
            return Ok(None);
        }
        if line.ends_with('\n') {
            line.pop();
        }
        Ok(Some(line))
    }
}

/// Interactive terminal with line editing, completion and history.
pub struct TerminalSource {
    editor: Editor<Completer, DefaultHistory>,
    history: Option<PathBuf>,
}

impl TerminalSource {
    pub fn new(history: Option<PathBuf>, search_path: &str) -> ShellResult<Self> {
        let mut editor = Editor::new()?;
        editor.set_helper(Some(Completer::new(search_path)));
        if let Some(path) = &history {
            if let Err(e) = editor.load_history(path) {
                log::debug!("no history loaded from {}: {}", path.display(), e);
            }
        }
        Ok(Self { editor, history })
    }
}

impl LineSource for TerminalSource {
    fn next_line(&mut self, prompt: &str) -> ShellResult<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    self.editor.add_history_entry(line.as_str())?;
                }
                Ok(Some(line))
            }
            Err(ReadlineError::Interrupted) => {
                println!("Caught interrupt. Type 'exit' to quit the shell.");
                Ok(Some(String::new()))
            }
            Err(ReadlineError::Eof) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_search_path(&mut self, search_path: &str) {
        if let Some(completer) = self.editor.helper_mut() {
            completer.set_search_path(search_path);
        }
    }
}

impl Drop for TerminalSource {
    fn drop(&mut self) {
        if let Some(path) = &self.history {
            if let Err(e) = self.editor.save_history(path) {
                log::warn!("could not save history to {}: {}", path.display(), e);
            }
        }
    }
}

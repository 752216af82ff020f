use std::collections::HashMap;
use std::ffi::CString;
use std::path::{Path, PathBuf};

use crate::types::{ShellError, ShellResult};

/// Name of the synthetic variable mirroring the last exit status.
pub const RESULT_VAR: &str = "result";

/// Mutable state threaded through every stage of a line.
///
/// The environment mapping is private to the shell; it only reaches the
/// operating system when a child is created (see [`ShellState::env_block`]).
#[derive(Debug, Clone)]
pub struct ShellState {
    vars: HashMap<String, String>,
    last_status: u8,
}

impl ShellState {
    /// Capture the process environment and start with a zero status.
    pub fn from_process() -> Self {
        Self::with_vars(std::env::vars())
    }

    pub fn with_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut state = Self {
            vars: vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            last_status: 0,
        };
        state.set_last_status(0);
        state
    }

    pub fn get_var(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn set_var(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    pub fn last_status(&self) -> u8 {
        self.last_status
    }

    pub fn set_last_status(&mut self, status: u8) {
        self.last_status = status;
        self.vars.insert(RESULT_VAR.to_string(), status.to_string());
    }

    pub fn current_dir(&self) -> ShellResult<PathBuf> {
        std::env::current_dir().map_err(|e| ShellError::io("getcwd", e))
    }

    /// Change the working directory of the shell process and keep `PWD` in sync.
    pub fn change_dir(&mut self, dir: &Path) -> std::io::Result<()> {
        std::env::set_current_dir(dir)?;
        if let Ok(cwd) = std::env::current_dir() {
            self.set_var("PWD", cwd.to_string_lossy());
        }
        Ok(())
    }

    /// `KEY=value` strings handed to `execve`. Entries that cannot be
    /// represented as C strings are dropped.
    pub fn env_block(&self) -> Vec<CString> {
        let mut block: Vec<CString> = self
            .vars
            .iter()
            .filter_map(|(k, v)| CString::new(format!("{k}={v}")).ok())
            .collect();
        block.sort();
        block
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_tracks_last_status() {
        let mut state = ShellState::with_vars([("PATH", "/bin")]);
        assert_eq!(state.get_var(RESULT_VAR), Some("0"));

        state.set_last_status(42);
        assert_eq!(state.last_status(), 42);
        assert_eq!(state.get_var(RESULT_VAR), Some("42"));
    }

    #[test]
    fn env_block_contains_assignments() {
        let mut state = ShellState::with_vars(Vec::<(String, String)>::new());
        state.set_var("GREETING", "hi there");
        let block = state.env_block();
        assert!(block.iter().any(|c| c.to_str() == Ok("GREETING=hi there")));
        assert!(block.iter().any(|c| c.to_str() == Ok("result=0")));
    }
}

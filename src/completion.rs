use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use rustyline::{
    completion::Completer as RustylineCompleter, completion::Pair, highlight::Highlighter,
    hint::Hinter, validate::Validator, Context, Helper, Result,
};

use crate::builtins::BUILTINS;
use crate::gate;

/// Tab completion for the interactive prompt: command names in first
/// position (or right after `ifok`/`ifnot`), paths everywhere else.
pub struct Completer {
    commands: Vec<String>,
    search_path: String,
}

impl Completer {
    pub fn new(search_path: &str) -> Self {
        Self {
            commands: Self::find_commands(search_path),
            search_path: search_path.to_string(),
        }
    }

    /// Rescan command names when the shell's `PATH` has changed.
    pub fn set_search_path(&mut self, search_path: &str) {
        if self.search_path != search_path {
            log::debug!("completion: rescanning PATH {search_path:?}");
            self.commands = Self::find_commands(search_path);
            self.search_path = search_path.to_string();
        }
    }

    fn find_commands(paths: &str) -> Vec<String> {
        let mut commands: Vec<String> = BUILTINS
            .iter()
            .chain(gate::KEYWORDS.iter())
            .map(|name| name.to_string())
            .collect();

        for dir in paths.split(':').filter(|dir| !dir.is_empty()) {
            let Ok(entries) = fs::read_dir(dir) else {
                continue;
            };
            for entry in entries.flatten() {
                let executable = entry
                    .metadata()
                    .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
                    .unwrap_or(false);
                if let (true, Some(name)) = (executable, entry.file_name().to_str()) {
                    commands.push(name.to_string());
                }
            }
        }

        commands.sort();
        commands.dedup();
        commands
    }

    fn candidates(&self, line: &str) -> Vec<String> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let completing_new_word = line.is_empty() || line.ends_with(char::is_whitespace);
        let prefix = if completing_new_word { "" } else { words.last().copied().unwrap_or("") };
        let preceding = if completing_new_word { &words[..] } else { &words[..words.len().saturating_sub(1)] };

        let command_position = preceding.iter().all(|w| gate::KEYWORDS.contains(w));
        if command_position && !prefix.contains('/') {
            self.complete_command(prefix)
        } else {
            complete_path(prefix)
        }
    }

    fn complete_command(&self, prefix: &str) -> Vec<String> {
        self.commands
            .iter()
            .filter(|cmd| cmd.starts_with(prefix))
            .cloned()
            .collect()
    }
}

fn complete_path(prefix: &str) -> Vec<String> {
    let (dir, stem) = match prefix.rfind('/') {
        Some(idx) => (PathBuf::from(&prefix[..=idx]), &prefix[idx + 1..]),
        None => (PathBuf::new(), prefix),
    };
    let listing: &Path = if dir.as_os_str().is_empty() { Path::new(".") } else { &dir };

    let Ok(entries) = fs::read_dir(listing) else {
        return Vec::new();
    };

    let mut completions: Vec<String> = entries
        .flatten()
        .filter_map(|entry| {
            let name = entry.file_name().to_str()?.to_string();
            if !name.starts_with(stem) || (name.starts_with('.') && !stem.starts_with('.')) {
                return None;
            }
            let mut full = dir.join(&name).to_string_lossy().into_owned();
            if entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false) {
                full.push('/');
            }
            Some(full)
        })
        .collect();
    completions.sort();
    completions
}

impl Helper for Completer {}

impl RustylineCompleter for Completer {
    type Candidate = Pair;

    fn complete(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Result<(usize, Vec<Pair>)> {
        let start = line[..pos].rfind(char::is_whitespace).map_or(0, |i| i + 1);
        let pairs = self
            .candidates(&line[..pos])
            .into_iter()
            .map(|s| Pair {
                display: s.clone(),
                replacement: s,
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Highlighter for Completer {}
impl Hinter for Completer {
    type Hint = String;
}
impl Validator for Completer {}

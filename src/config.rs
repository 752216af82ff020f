use std::io::IsTerminal;
use std::path::PathBuf;

use log::LevelFilter;

const LOG_VAR: &str = "MINISH_LOG";
const HISTORY_VAR: &str = "MINISH_HISTORY";
const INTERACTIVE_VAR: &str = "MINISH_INTERACTIVE";
const HISTORY_FILE: &str = ".minish_history";

/// Startup settings, read once from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    pub log_level: LevelFilter,
    /// `None` disables history persistence.
    pub history_file: Option<PathBuf>,
    /// Prompt, line editing and completion on the control stream.
    pub interactive: bool,
}

impl ShellConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok(), std::io::stdin().is_terminal())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>, stdin_is_tty: bool) -> Self {
        let log_level = lookup(LOG_VAR)
            .and_then(|level| level.parse().ok())
            .unwrap_or(LevelFilter::Warn);

        let history_file = match lookup(HISTORY_VAR) {
            Some(path) if path.is_empty() => None,
            Some(path) => Some(PathBuf::from(path)),
            None => lookup("HOME").map(|home| PathBuf::from(home).join(HISTORY_FILE)),
        };

        let interactive = match lookup(INTERACTIVE_VAR).as_deref() {
            Some("1") => true,
            Some("0") => false,
            _ => stdin_is_tty,
        };

        Self {
            log_level,
            history_file,
            interactive,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)], tty: bool) -> ShellConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ShellConfig::from_lookup(|key| vars.get(key).cloned(), tty)
    }

    #[test]
    fn defaults() {
        let cfg = config(&[("HOME", "/home/user")], true);
        assert_eq!(cfg.log_level, LevelFilter::Warn);
        assert_eq!(cfg.history_file, Some(PathBuf::from("/home/user/.minish_history")));
        assert!(cfg.interactive);
    }

    #[test]
    fn overrides() {
        let cfg = config(
            &[("MINISH_LOG", "debug"), ("MINISH_HISTORY", ""), ("MINISH_INTERACTIVE", "0")],
            true,
        );
        assert_eq!(cfg.log_level, LevelFilter::Debug);
        assert_eq!(cfg.history_file, None);
        assert!(!cfg.interactive);
    }

    #[test]
    fn bad_level_falls_back() {
        let cfg = config(&[("MINISH_LOG", "loud")], false);
        assert_eq!(cfg.log_level, LevelFilter::Warn);
        assert!(!cfg.interactive);
    }
}

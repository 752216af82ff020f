use glob::{glob_with, MatchOptions};

use crate::state::ShellState;
use crate::types::{ShellError, ShellResult};

const GLOB_METACHARS: [char; 3] = ['*', '?', '['];

/// Replace every `$NAME` token with the value stored for `NAME`.
///
/// An unset variable aborts the whole command. Substituted values are not
/// split or expanded again.
pub fn expand_variables(tokens: Vec<String>, state: &ShellState) -> ShellResult<Vec<String>> {
    tokens
        .into_iter()
        .map(|token| match token.strip_prefix('$') {
            Some(name) => state
                .get_var(name)
                .map(str::to_string)
                .ok_or_else(|| ShellError::UndefinedVariable(name.to_string())),
            None => Ok(token),
        })
        .collect()
}

/// Expand each token as a filesystem pattern, the command name included.
pub fn expand_patterns(tokens: Vec<String>) -> Vec<String> {
    let expanded: Vec<String> = tokens.into_iter().flat_map(expand_pattern).collect();
    log::debug!("after globbing: {:?}", expanded);
    expanded
}

/// Matches in sorted order, or the pattern itself when it has no
/// metacharacters, is malformed, or matches nothing.
fn expand_pattern(pattern: String) -> Vec<String> {
    if !pattern.contains(GLOB_METACHARS) {
        return vec![pattern];
    }

    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: true,
    };
    let paths = match glob_with(&pattern, options) {
        Ok(paths) => paths,
        Err(e) => {
            log::debug!("{pattern}: not a valid pattern ({e})");
            return vec![pattern];
        }
    };

    let mut matches: Vec<String> = paths
        .flatten()
        .map(|path| path.to_string_lossy().into_owned())
        .collect();
    if matches.is_empty() {
        return vec![pattern];
    }
    matches.sort();
    matches
}

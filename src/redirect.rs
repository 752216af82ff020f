use std::path::PathBuf;

use crate::types::{ShellError, ShellResult};

const INPUT: &str = "<";
const OUTPUT: &str = ">";
const BACKGROUND: &str = "&";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectMode {
    Input,     // <
    Overwrite, // >
}

impl RedirectMode {
    fn operator(self) -> &'static str {
        match self {
            RedirectMode::Input => INPUT,
            RedirectMode::Overwrite => OUTPUT,
        }
    }

    /// Operator alone (`<`), or operator with the path attached (`<in.txt`).
    fn split(token: &str) -> Option<(Self, Option<&str>)> {
        let (mode, rest) = if let Some(rest) = token.strip_prefix(INPUT) {
            (RedirectMode::Input, rest)
        } else if let Some(rest) = token.strip_prefix(OUTPUT) {
            (RedirectMode::Overwrite, rest)
        } else {
            return None;
        };
        Some((mode, (!rest.is_empty()).then_some(rest)))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedirectionPlan {
    pub input: Option<PathBuf>,
    /// Created if absent, truncated if present.
    pub output: Option<PathBuf>,
    pub background: bool,
}

impl RedirectionPlan {
    pub fn has_redirection(&self) -> bool {
        self.input.is_some() || self.output.is_some()
    }

    fn set(&mut self, mode: RedirectMode, path: &str) {
        let slot = match mode {
            RedirectMode::Input => &mut self.input,
            RedirectMode::Overwrite => &mut self.output,
        };
        *slot = Some(PathBuf::from(path));
    }
}

fn is_operator(token: &str) -> bool {
    token == INPUT || token == OUTPUT || token == BACKGROUND
}

/// Pull redirections and the background marker out of `tokens`.
///
/// Returns the remaining arguments, in order, and the plan. When an operator
/// appears more than once the last one wins.
pub fn resolve(tokens: Vec<String>) -> ShellResult<(Vec<String>, RedirectionPlan)> {
    let mut plan = RedirectionPlan::default();
    let mut args = Vec::with_capacity(tokens.len());
    let mut iter = tokens.into_iter();

    while let Some(token) = iter.next() {
        if token == BACKGROUND {
            plan.background = true;
            continue;
        }
        match RedirectMode::split(&token) {
            Some((mode, Some(path))) => plan.set(mode, path),
            Some((mode, None)) => match iter.next() {
                Some(path) if !is_operator(&path) => plan.set(mode, &path),
                _ => {
                    return Err(ShellError::Syntax {
                        operator: mode.operator().to_string(),
                    })
                }
            },
            None => args.push(token),
        }
    }

    log::debug!("command: {:?}, plan: {:?}", args, plan);
    Ok((args, plan))
}

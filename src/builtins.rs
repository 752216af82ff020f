use std::path::PathBuf;

use crate::jobs::JobTable;
use crate::state::{ShellState, RESULT_VAR};
use crate::types::FAILURE_STATUS;

pub const BUILTINS: [&str; 3] = ["exit", "cd", "jobs"];

/// What the loop should do after a built-in ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Exit,
    Done(u8),
}

/// `NAME=value` in command position.
pub fn is_assignment(token: &str) -> bool {
    token.contains('=')
}

/// Run a built-in and record its status. Returns `None` when `args[0]` is
/// not a built-in.
pub fn execute_builtin(args: &[String], state: &mut ShellState, jobs: &JobTable) -> Option<Builtin> {
    let name = args.first()?;
    let status = match name.as_str() {
        "exit" => return Some(Builtin::Exit),
        "cd" => change_dir(args.get(1).map(String::as_str), state),
        "jobs" => list_jobs(jobs),
        _ if is_assignment(name) => assign(name, state),
        _ => return None,
    };
    state.set_last_status(status);
    Some(Builtin::Done(status))
}

fn change_dir(target: Option<&str>, state: &mut ShellState) -> u8 {
    let dir = match target {
        Some(dir) => PathBuf::from(dir),
        None => match state.get_var("HOME") {
            Some(home) => PathBuf::from(home),
            None => {
                eprintln!("cd: HOME not set");
                return FAILURE_STATUS;
            }
        },
    };

    match state.change_dir(&dir) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("cd: {}: {}", dir.display(), e);
            FAILURE_STATUS
        }
    }
}

fn list_jobs(jobs: &JobTable) -> u8 {
    for job in jobs.iter() {
        println!("[{}] {}\t{}", job.pid, job.state, job.command);
    }
    0
}

fn assign(token: &str, state: &mut ShellState) -> u8 {
    let (key, value) = match token.split_once('=') {
        Some((key, value)) if !key.is_empty() && !value.is_empty() => (key, value),
        _ => {
            eprintln!("Invalid environment variable assignment: {}", token);
            return FAILURE_STATUS;
        }
    };

    if key == RESULT_VAR {
        // The caller records the returned status, which is what `result` mirrors.
        return match value.parse::<u8>() {
            Ok(status) => status,
            Err(_) => {
                eprintln!("Error: result out of range (0-255)");
                FAILURE_STATUS
            }
        };
    }

    state.set_var(key, value);
    0
}

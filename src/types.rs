use nix::errno::Errno;
use thiserror::Error;

/// Status recorded when a line is abandoned before any process is created.
pub const FAILURE_STATUS: u8 = 1;

/// Exit status of a child whose image could not be replaced.
pub const EXEC_FAILED: i32 = 127;

/// Exit status of a child whose executable exists but may not be run.
pub const EXEC_DENIED: i32 = 126;

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("empty line")]
    EmptyLine,
    #[error("syntax error: nothing to run")]
    MissingCommand,
    #[error("syntax error: missing path after '{operator}'")]
    Syntax { operator: String },
    #[error("error: var {0} does not exist")]
    UndefinedVariable(String),
    #[error("{0}: command not found")]
    CommandNotFound(String),
    #[error("{0:?}: argument contains a NUL byte")]
    InvalidArgument(String),
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{context}: {errno}")]
    Nix { context: String, errno: Errno },
    #[error("control input: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
}

impl ShellError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        ShellError::Io {
            context: context.into(),
            source,
        }
    }

    pub fn nix(context: impl Into<String>, errno: Errno) -> Self {
        ShellError::Nix {
            context: context.into(),
            errno,
        }
    }

    /// Errors raised while preparing a line. They abandon that line only;
    /// anything else stops the shell.
    pub fn aborts_line(&self) -> bool {
        matches!(
            self,
            ShellError::EmptyLine
                | ShellError::MissingCommand
                | ShellError::Syntax { .. }
                | ShellError::UndefinedVariable(_)
                | ShellError::CommandNotFound(_)
                | ShellError::InvalidArgument(_)
        )
    }
}

pub type ShellResult<T> = Result<T, ShellError>;

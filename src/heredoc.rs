use bytes::{Bytes, BytesMut};

use crate::input::LineSource;
use crate::redirect::RedirectionPlan;
use crate::types::ShellResult;

/// Token that opens an inline block.
pub const MARKER: &str = "HERE{";

/// Line that closes it.
pub const TERMINATOR: &str = "}";

const CONTINUATION_PROMPT: &str = "> ";

/// Literal text collected from the control stream, fed to the command's stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heredoc {
    body: Bytes,
}

impl Heredoc {
    pub fn body(&self) -> &Bytes {
        &self.body
    }
}

/// Whether the line asks for an inline block.
pub fn is_requested(tokens: &[String]) -> bool {
    tokens.iter().any(|token| token == MARKER)
}

/// Read and drop the block of a line that will not run, so its body is not
/// taken for commands.
pub fn discard<S: LineSource + ?Sized>(source: &mut S) -> ShellResult<()> {
    let dropped = collect(source)?;
    log::debug!("heredoc discarded: {} bytes", dropped.body.len());
    Ok(())
}

/// Remove the marker from `command` and, unless the plan already redirects
/// input or output, read the block that follows.
///
/// Returns `None` when no marker is present or the block was not collected.
pub fn attach<S: LineSource + ?Sized>(
    command: &mut Vec<String>,
    plan: &RedirectionPlan,
    source: &mut S,
) -> ShellResult<Option<Heredoc>> {
    let before = command.len();
    command.retain(|token| token != MARKER);
    if command.len() == before {
        return Ok(None);
    }
    if plan.has_redirection() {
        log::warn!("{MARKER} ignored: command already redirects its input or output");
        return Ok(None);
    }
    collect(source).map(Some)
}

/// Read lines up to, not including, a line that is exactly `}`. Each line
/// is kept verbatim and newline-terminated.
pub fn collect<S: LineSource + ?Sized>(source: &mut S) -> ShellResult<Heredoc> {
    let mut body = BytesMut::new();
    loop {
        match source.next_line(CONTINUATION_PROMPT)? {
            Some(line) if line == TERMINATOR => break,
            Some(line) => {
                body.extend_from_slice(line.as_bytes());
                body.extend_from_slice(b"\n");
            }
            None => {
                log::warn!("end of input before '{TERMINATOR}'; using {} bytes collected", body.len());
                break;
            }
        }
    }
    log::debug!("heredoc: {} bytes", body.len());
    Ok(Heredoc {
        body: body.freeze(),
    })
}

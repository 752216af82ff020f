use std::ffi::{CStr, CString};
use std::fs::File;
use std::io::{self, Write};
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use std::thread;

use bytes::Bytes;
use nix::errno::Errno;
use nix::fcntl::{open, OFlag};
use nix::sys::signal::{signal, SigHandler, Signal};
use nix::sys::stat::Mode;
use nix::unistd::{close, dup2, execve, fork, pipe2, ForkResult, Pid};

use crate::heredoc::Heredoc;
use crate::jobs::Job;
use crate::redirect::RedirectionPlan;
use crate::types::{ShellError, ShellResult, EXEC_DENIED, EXEC_FAILED};

const DEV_NULL: &CStr = c"/dev/null";

/// Everything needed to start one command.
#[derive(Debug)]
pub struct LaunchPlan {
    pub program: PathBuf,
    pub argv: Vec<String>,
    pub redirects: RedirectionPlan,
    pub heredoc: Option<Heredoc>,
    pub env: Vec<CString>,
}

/// The running child as seen by the rest of the shell.
#[derive(Debug)]
pub struct JobHandle {
    pub job: Job,
}

impl JobHandle {
    pub fn pid(&self) -> Pid {
        self.job.pid
    }

    pub fn is_background(&self) -> bool {
        self.job.background
    }
}

enum StdinSource {
    Inherit,
    File(CString),
    Null,
    Pipe { read: OwnedFd, write: OwnedFd, body: Bytes },
}

/// Child-side data, built before `fork` so the child never allocates.
struct ChildSetup {
    program: CString,
    argv: Vec<CString>,
    env: Vec<CString>,
    stdin: StdinSource,
    stdout: Option<CString>,
}

fn c_string(s: &str) -> ShellResult<CString> {
    CString::new(s).map_err(|_| ShellError::InvalidArgument(s.to_string()))
}

fn c_path(path: &Path) -> ShellResult<CString> {
    CString::new(path.as_os_str().as_bytes())
        .map_err(|_| ShellError::InvalidArgument(path.to_string_lossy().into_owned()))
}

/// A pipe whose ends are closed in any `exec`ed image unless duplicated.
fn cloexec_pipe() -> ShellResult<(OwnedFd, OwnedFd)> {
    let (read, write) = pipe2(OFlag::O_CLOEXEC).map_err(|errno| ShellError::nix("pipe", errno))?;
    // SAFETY: both descriptors were just returned by pipe2(2) and nothing else owns them.
    Ok(unsafe { (OwnedFd::from_raw_fd(read), OwnedFd::from_raw_fd(write)) })
}

fn feed(writer: &mut File, body: &[u8], pid: Pid) {
    match writer.write_all(body) {
        Ok(()) => log::debug!("[{pid}] heredoc delivered: {} bytes", body.len()),
        Err(e) => log::warn!("[{pid}] heredoc not fully delivered: {e}"),
    }
}

impl ChildSetup {
    fn prepare(plan: &LaunchPlan) -> ShellResult<Self> {
        let argv = plan
            .argv
            .iter()
            .map(|arg| c_string(arg))
            .collect::<ShellResult<Vec<_>>>()?;
        let stdout = plan.redirects.output.as_deref().map(c_path).transpose()?;

        let stdin = match (&plan.redirects.input, &plan.heredoc) {
            (Some(path), _) => StdinSource::File(c_path(path)?),
            (None, Some(heredoc)) => {
                let (read, write) = cloexec_pipe()?;
                StdinSource::Pipe {
                    read,
                    write,
                    body: heredoc.body().clone(),
                }
            }
            (None, None) if plan.redirects.background => StdinSource::Null,
            (None, None) => StdinSource::Inherit,
        };

        Ok(Self {
            program: c_path(&plan.program)?,
            argv,
            env: plan.env.clone(),
            stdin,
            stdout,
        })
    }

    /// Runs in the child. Only async-signal-safe calls from here on.
    fn exec(&self) -> ! {
        // SAFETY: restoring the default disposition installs no handler.
        let _ = unsafe { signal(Signal::SIGPIPE, SigHandler::SigDfl) };

        let wired = match &self.stdin {
            StdinSource::Inherit => Ok(()),
            StdinSource::File(path) => redirect_fd(path, OFlag::O_RDONLY, libc::STDIN_FILENO),
            StdinSource::Null => redirect_fd(DEV_NULL, OFlag::O_RDONLY, libc::STDIN_FILENO),
            StdinSource::Pipe { read, .. } => dup2(read.as_raw_fd(), libc::STDIN_FILENO)
                .map(drop)
                .map_err(|errno| (c"heredoc", errno)),
        }
        .and_then(|()| match &self.stdout {
            Some(path) => redirect_fd(
                path,
                OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC,
                libc::STDOUT_FILENO,
            ),
            None => Ok(()),
        });
        if let Err((subject, errno)) = wired {
            child_fail(subject.to_bytes(), errno, 1);
        }

        let errno = match execve(&self.program, &self.argv, &self.env) {
            Err(errno) => errno,
            Ok(never) => match never {},
        };
        let code = if errno == Errno::EACCES { EXEC_DENIED } else { EXEC_FAILED };
        child_fail(self.program.to_bytes(), errno, code)
    }

    /// Runs in the parent once the child exists. A foreground child gets its
    /// heredoc before this returns; a background one is fed from a writer
    /// thread so the loop keeps going while the child drains the pipe.
    fn hand_off(self, pid: Pid, background: bool) {
        let StdinSource::Pipe { read, write, body } = self.stdin else {
            return;
        };
        drop(read);
        let mut writer = File::from(write);
        if !background {
            feed(&mut writer, &body, pid);
            return;
        }
        let spawned = thread::Builder::new()
            .name(format!("heredoc-{pid}"))
            .spawn(move || feed(&mut writer, &body, pid));
        if let Err(e) = spawned {
            log::warn!("[{pid}] heredoc writer not started, child sees end of input: {e}");
        }
    }
}

fn redirect_fd<'a>(path: &'a CStr, flags: OFlag, target: RawFd) -> Result<(), (&'a CStr, Errno)> {
    let fd = open(path, flags, Mode::from_bits_truncate(0o644)).map_err(|errno| (path, errno))?;
    if fd != target {
        dup2(fd, target).map_err(|errno| (path, errno))?;
        let _ = close(fd);
    }
    Ok(())
}

fn child_fail(subject: &[u8], errno: Errno, code: i32) -> ! {
    for part in [
        b"minish: ".as_slice(),
        subject,
        b": ".as_slice(),
        errno.desc().as_bytes(),
        b"\n".as_slice(),
    ] {
        let _ = nix::unistd::write(libc::STDERR_FILENO, part);
    }
    // SAFETY: _exit(2) skips the destructors and atexit handlers inherited from the parent.
    unsafe { libc::_exit(code) }
}

/// Create a child running `plan`.
///
/// Failures while wiring descriptors or replacing the image only kill the
/// child; the caller sees them as a nonzero exit. A failing `fork` is returned
/// as an error.
pub fn spawn(plan: LaunchPlan) -> ShellResult<JobHandle> {
    let setup = ChildSetup::prepare(&plan)?;
    // Buffered prompt text would otherwise be duplicated into the child.
    if let Err(e) = io::stdout().flush() {
        log::debug!("stdout flush before fork failed: {e}");
    }

    // SAFETY: the child only performs async-signal-safe calls before exec/_exit.
    match unsafe { fork() } {
        Err(errno) => Err(ShellError::nix("fork", errno)),
        Ok(ForkResult::Child) => setup.exec(),
        Ok(ForkResult::Parent { child }) => {
            log::debug!("[{child}] started {:?} as {}", plan.argv, plan.program.display());
            setup.hand_off(child, plan.redirects.background);
            let command = plan.argv.join(" ");
            Ok(JobHandle {
                job: Job::new(child, command, plan.redirects.background),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::fcntl::{fcntl, FcntlArg, FdFlag};

    #[test]
    fn heredoc_pipe_is_close_on_exec() {
        let (read, write) = cloexec_pipe().unwrap();
        for fd in [&read, &write] {
            let flags = FdFlag::from_bits_truncate(fcntl(fd.as_raw_fd(), FcntlArg::F_GETFD).unwrap());
            assert!(flags.contains(FdFlag::FD_CLOEXEC));
        }
    }
}

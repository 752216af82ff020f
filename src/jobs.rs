use std::fmt;

use nix::errno::Errno;
use nix::sys::signal::Signal;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;

use crate::types::{ShellError, ShellResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Running,
    Exited(i32),
    Signaled(Signal),
}

impl JobState {
    fn from_wait(status: WaitStatus) -> Option<Self> {
        match status {
            WaitStatus::Exited(_, code) => Some(JobState::Exited(code)),
            WaitStatus::Signaled(_, signal, _) => Some(JobState::Signaled(signal)),
            _ => None,
        }
    }

    /// Value to record as the last exit status. Signal deaths map to
    /// `128 + signo`; a running job has none.
    pub fn status(self) -> Option<u8> {
        match self {
            JobState::Running => None,
            JobState::Exited(code) => Some((code & 0xff) as u8),
            JobState::Signaled(signal) => Some((128 + signal as i32) as u8),
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobState::Running => write!(f, "Running"),
            JobState::Exited(code) => write!(f, "exit {code}"),
            JobState::Signaled(signal) => write!(f, "killed by {}", signal.as_str()),
        }
    }
}

/// A child created by the launcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub pid: Pid,
    pub command: String,
    pub state: JobState,
    pub background: bool,
}

impl Job {
    pub fn new(pid: Pid, command: String, background: bool) -> Self {
        Self {
            pid,
            command,
            state: JobState::Running,
            background,
        }
    }
}

/// Block until `job` terminates and record how it ended.
pub fn wait_for(job: &mut Job) -> ShellResult<JobState> {
    loop {
        match waitpid(job.pid, None) {
            Ok(status) => {
                if let Some(state) = JobState::from_wait(status) {
                    job.state = state;
                    return Ok(state);
                }
            }
            Err(Errno::EINTR) => continue,
            Err(errno) => return Err(ShellError::nix(format!("waitpid {}", job.pid), errno)),
        }
    }
}

/// Background jobs that have not been reaped yet.
#[derive(Debug, Default)]
pub struct JobTable {
    jobs: Vec<Job>,
}

impl JobTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track(&mut self, job: Job) {
        log::info!("[{}] tracking {:?}", job.pid, job.command);
        self.jobs.push(job);
    }

    pub fn get(&self, pid: Pid) -> Option<&Job> {
        self.jobs.iter().find(|job| job.pid == pid)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Job> {
        self.jobs.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Poll every tracked job without blocking. Jobs that have terminated are
    /// removed from the table and returned, in launch order.
    pub fn reap(&mut self) -> Vec<Job> {
        let mut finished = Vec::new();
        let mut remaining = Vec::with_capacity(self.jobs.len());

        for mut job in self.jobs.drain(..) {
            match waitpid(job.pid, Some(WaitPidFlag::WNOHANG)) {
                Ok(status) => match JobState::from_wait(status) {
                    Some(state) => {
                        job.state = state;
                        log::info!("[{}] reaped: {}", job.pid, state);
                        finished.push(job);
                    }
                    None => remaining.push(job),
                },
                Err(Errno::EINTR) => remaining.push(job),
                Err(errno) => log::warn!("[{}] dropped, cannot be waited on: {}", job.pid, errno),
            }
        }

        self.jobs = remaining;
        finished
    }
}

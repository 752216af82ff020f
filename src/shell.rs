use std::path::PathBuf;

use nix::unistd::Pid;

use crate::builtins::{self, Builtin};
use crate::executor::{self, LaunchPlan};
use crate::expander;
use crate::gate::{self, Condition, GateDecision};
use crate::heredoc::{self, Heredoc};
use crate::input::LineSource;
use crate::jobs::{self, Job, JobState, JobTable};
use crate::redirect::{self, RedirectionPlan};
use crate::state::ShellState;
use crate::tokenizer;
use crate::types::{ShellError, ShellResult, FAILURE_STATUS};
use crate::utils::search_cmd;

/// How a single line ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// Blank line.
    Empty,
    /// `ifok`/`ifnot` condition did not hold.
    Skipped(Condition),
    /// Preprocessing failed; a diagnostic was printed and no process created.
    Aborted,
    Builtin(u8),
    /// A foreground job terminated.
    Finished(JobState),
    /// A background job was started.
    Started(Pid),
    Exit,
}

enum Prepared {
    Run(Vec<String>, RedirectionPlan),
    Skip(Condition),
}

pub struct Shell {
    state: ShellState,
    jobs: JobTable,
}

impl Shell {
    pub fn new(state: ShellState) -> Self {
        Self {
            state,
            jobs: JobTable::new(),
        }
    }

    pub fn state(&self) -> &ShellState {
        &self.state
    }

    pub fn jobs(&self) -> &JobTable {
        &self.jobs
    }

    /// Read, process and reap until `exit` or end of input.
    pub fn run<S: LineSource + ?Sized>(&mut self, source: &mut S) -> ShellResult<()> {
        loop {
            self.reap_jobs();
            source.set_search_path(self.state.get_var("PATH").unwrap_or_default());
            let prompt = self.prompt();
            let Some(line) = source.next_line(&prompt)? else {
                log::debug!("end of input");
                return Ok(());
            };
            if self.execute_line(&line, source)? == LineOutcome::Exit {
                return Ok(());
            }
        }
    }

    /// Report background jobs that have finished since the last call and take
    /// the status of the most recent one.
    pub fn reap_jobs(&mut self) -> Vec<Job> {
        let finished = self.jobs.reap();
        for job in &finished {
            println!("[{}]+ Done ({})\t{}", job.pid, job.state, job.command);
            if let Some(status) = job.state.status() {
                self.state.set_last_status(status);
            }
        }
        finished
    }

    /// Run one line. Errors that only concern this line are reported here and
    /// turn into [`LineOutcome::Aborted`]; the ones returned are fatal.
    pub fn execute_line<S: LineSource + ?Sized>(
        &mut self,
        line: &str,
        source: &mut S,
    ) -> ShellResult<LineOutcome> {
        match self.process_line(line, source) {
            Err(ShellError::EmptyLine) => Ok(LineOutcome::Empty),
            Err(e) if e.aborts_line() => {
                eprintln!("{e}");
                self.state.set_last_status(FAILURE_STATUS);
                Ok(LineOutcome::Aborted)
            }
            outcome => outcome,
        }
    }

    fn process_line<S: LineSource + ?Sized>(
        &mut self,
        line: &str,
        source: &mut S,
    ) -> ShellResult<LineOutcome> {
        let tokens = tokenizer::tokenize(line)?;
        let requests_block = heredoc::is_requested(&tokens);

        // A block belongs to its line even when the line never runs.
        let (mut command, plan) = match self.prepare(tokens) {
            Ok(Prepared::Run(command, plan)) => (command, plan),
            Ok(Prepared::Skip(condition)) => {
                if requests_block {
                    heredoc::discard(source)?;
                }
                return Ok(LineOutcome::Skipped(condition));
            }
            Err(e) => {
                if requests_block && e.aborts_line() {
                    heredoc::discard(source)?;
                }
                return Err(e);
            }
        };

        let heredoc = heredoc::attach(&mut command, &plan, source)?;
        if command.is_empty() {
            return Err(ShellError::MissingCommand);
        }

        match builtins::execute_builtin(&command, &mut self.state, &self.jobs) {
            Some(Builtin::Exit) => Ok(LineOutcome::Exit),
            Some(Builtin::Done(status)) => Ok(LineOutcome::Builtin(status)),
            None => self.launch(command, plan, heredoc),
        }
    }

    /// Expansion, gating and redirection for one tokenized line.
    fn prepare(&self, tokens: Vec<String>) -> ShellResult<Prepared> {
        let tokens = expander::expand_variables(tokens, &self.state)?;
        let tokens = expander::expand_patterns(tokens);
        match gate::evaluate(tokens, self.state.last_status()) {
            GateDecision::Proceed(tokens) => {
                let (command, plan) = redirect::resolve(tokens)?;
                Ok(Prepared::Run(command, plan))
            }
            GateDecision::Skip(condition) => Ok(Prepared::Skip(condition)),
        }
    }

    fn launch(
        &mut self,
        argv: Vec<String>,
        redirects: RedirectionPlan,
        heredoc: Option<Heredoc>,
    ) -> ShellResult<LineOutcome> {
        let cwd = self.state.current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let paths = self.state.get_var("PATH").unwrap_or_default();
        let program = search_cmd(&argv[0], paths, &cwd)
            .ok_or_else(|| ShellError::CommandNotFound(argv[0].clone()))?;

        let handle = executor::spawn(LaunchPlan {
            program,
            argv,
            redirects,
            heredoc,
            env: self.state.env_block(),
        })?;

        let pid = handle.pid();
        if handle.is_background() {
            println!("[{pid}]+ Start");
            self.jobs.track(handle.job);
            return Ok(LineOutcome::Started(pid));
        }

        let mut job = handle.job;
        let state = jobs::wait_for(&mut job)?;
        if let JobState::Signaled(signal) = state {
            eprintln!("{}: terminated by {}", job.command, signal.as_str());
        }
        if let Some(status) = state.status() {
            self.state.set_last_status(status);
        }
        Ok(LineOutcome::Finished(state))
    }

    fn prompt(&self) -> String {
        let user = self.state.get_var("USER").unwrap_or_default();
        let cwd = self
            .state
            .current_dir()
            .map(|dir| dir.display().to_string())
            .unwrap_or_default();
        format!("{user}@:{cwd}$ ")
    }
}

mod builtins;
mod completion;
mod config;
mod executor;
mod expander;
mod gate;
mod heredoc;
mod input;
mod jobs;
mod redirect;
mod shell;
mod state;
mod tokenizer;
mod types;
mod utils;

#[cfg(test)]
mod tests;

use std::io;

use anyhow::Context;
use log::LevelFilter;
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

use crate::config::ShellConfig;
use crate::input::{ScriptSource, TerminalSource};
use crate::shell::Shell;
use crate::state::ShellState;

fn init_logging(level: LevelFilter) -> anyhow::Result<()> {
    let config = ConfigBuilder::new().set_time_level(LevelFilter::Off).build();
    TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto)
        .context("failed to initialise logging")
}

fn main() -> anyhow::Result<()> {
    let config = ShellConfig::from_env();
    init_logging(config.log_level)?;
    log::debug!("{:?}", config);

    // The shell survives SIGINT; a foreground child gets it from the terminal.
    ctrlc::set_handler(|| println!("\nCaught interrupt. Type 'exit' to quit the shell."))
        .context("failed to install SIGINT handler")?;

    let mut shell = Shell::new(ShellState::from_process());
    if config.interactive {
        let search_path = shell.state().get_var("PATH").unwrap_or_default().to_string();
        let mut source = TerminalSource::new(config.history_file.clone(), &search_path)?;
        shell.run(&mut source)?;
    } else {
        let mut source = ScriptSource::new(io::stdin().lock());
        shell.run(&mut source)?;
    }
    Ok(())
}

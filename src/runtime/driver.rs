use std::io::{self, Write};

use crossterm::cursor::{Hide, Show};
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use thiserror::Error;

use crate::{ShellError, ShellRuntime, Size};

pub type DriverResult<T> = std::result::Result<T, TerminalDriverError>;

#[derive(Debug, Error)]
pub enum TerminalDriverError {
    #[error("runtime error: {0}")]
    Runtime(#[from] ShellError),
    #[error("terminal error: {0}")]
    Terminal(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Owns a `ShellRuntime` and manages raw mode, alternate screen, and mouse
/// capture transitions around the loop. The shell is pointer-driven, so mouse
/// capture is always requested.
pub struct TerminalDriver {
    runtime: ShellRuntime,
}

impl TerminalDriver {
    pub fn new(runtime: ShellRuntime) -> Self {
        Self { runtime }
    }

    pub fn run(mut self) -> DriverResult<()> {
        let mut stdout = io::stdout();
        self.enter(&mut stdout)?;
        let result = self.run_inner(&mut stdout);
        self.exit(&mut stdout);
        result
    }

    fn run_inner(&mut self, stdout: &mut impl Write) -> DriverResult<()> {
        let (width, height) = terminal::size()?;
        self.runtime.resize(Size::new(width, height))?;
        self.runtime.run(stdout)?;
        Ok(())
    }

    fn enter(&self, stdout: &mut impl Write) -> DriverResult<()> {
        terminal::enable_raw_mode()
            .map_err(|err| TerminalDriverError::Terminal(err.to_string()))?;
        execute!(
            stdout,
            EnterAlternateScreen,
            EnableMouseCapture,
            Hide,
            Clear(ClearType::All)
        )?;
        Ok(())
    }

    fn exit(&self, stdout: &mut impl Write) {
        execute!(stdout, Show, DisableMouseCapture, LeaveAlternateScreen).ok();
        terminal::disable_raw_mode().ok();
    }
}

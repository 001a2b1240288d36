//! Terminal driver for the practice loop.
//!
//! Puts the terminal in raw mode on the alternate screen, reads keys through
//! crossterm's event stream and draws with ratatui. The terminal is restored
//! on drop.

use std::io::{self, Stdout, stdout};

use crossterm::{
    ExecutableCommand,
    event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use thiserror::Error;
use ui::AdvanceToken;

use crate::input::KeyInput;
use crate::practice::{Flow, PracticeLoop};

/// Terminal driver errors.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// I/O error from terminal operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

enum LoopEvent {
    Key(KeyInput),
    Resize,
    Closed,
    DelayElapsed(AdvanceToken),
    StoreChanged,
    Ignored,
}

pub struct PracticeTerminal {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    events: EventStream,
}

impl PracticeTerminal {
    /// Switch the terminal to raw mode on the alternate screen.
    ///
    /// # Errors
    ///
    /// Returns `TerminalError::Io` if the terminal cannot be set up.
    pub fn new() -> Result<Self, TerminalError> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            events: EventStream::new(),
        })
    }

    /// Run until the user quits or the event stream ends.
    ///
    /// # Errors
    ///
    /// Returns `TerminalError::Io` if reading events or drawing fails.
    pub async fn run(&mut self, mut practice: PracticeLoop) -> Result<(), TerminalError> {
        let mut revisions = practice.revisions();
        self.draw(&practice)?;

        loop {
            let event = tokio::select! {
                maybe_event = self.events.next() => match maybe_event {
                    Some(Ok(event)) => Self::convert(event),
                    Some(Err(e)) => return Err(TerminalError::Io(e)),
                    None => LoopEvent::Closed,
                },
                Some(token) = practice.delay_elapsed() => LoopEvent::DelayElapsed(token),
                Ok(()) = revisions.changed() => LoopEvent::StoreChanged,
            };

            let flow = match event {
                LoopEvent::Key(key) => practice.on_key(key).await,
                LoopEvent::Resize => Flow::Render,
                LoopEvent::Closed => Flow::Quit,
                LoopEvent::DelayElapsed(token) => practice.on_delay(token),
                LoopEvent::StoreChanged => practice.on_store_changed().await,
                LoopEvent::Ignored => Flow::Quiet,
            };

            match flow {
                Flow::Render => self.draw(&practice)?,
                Flow::Quiet => {}
                Flow::Quit => break,
            }
        }

        practice.log_exit();
        Ok(())
    }

    fn draw(&mut self, practice: &PracticeLoop) -> Result<(), TerminalError> {
        self.terminal.draw(|frame| practice.draw(frame))?;
        Ok(())
    }

    fn convert(event: Event) -> LoopEvent {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                Self::convert_key(key).map_or(LoopEvent::Ignored, LoopEvent::Key)
            }
            Event::Resize(_, _) => LoopEvent::Resize,
            _ => LoopEvent::Ignored,
        }
    }

    /// Convert a crossterm key press to `KeyInput`.
    fn convert_key(key: KeyEvent) -> Option<KeyInput> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return matches!(key.code, KeyCode::Char('c' | 'd')).then_some(KeyInput::Interrupt);
        }
        match key.code {
            KeyCode::Char(c) => Some(KeyInput::Char(c)),
            KeyCode::Enter => Some(KeyInput::Enter),
            KeyCode::Backspace => Some(KeyInput::Backspace),
            KeyCode::Delete => Some(KeyInput::Delete),
            KeyCode::Esc => Some(KeyInput::Esc),
            KeyCode::Left => Some(KeyInput::Left),
            KeyCode::Right => Some(KeyInput::Right),
            KeyCode::Home => Some(KeyInput::Home),
            KeyCode::End => Some(KeyInput::End),
            _ => None,
        }
    }
}

impl Drop for PracticeTerminal {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
    }
}

use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use color_eyre::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use map_core::{ViewerCommand, CATEGORIES, KNOWN_DIMENSIONS};
use ratatui::backend::CrosstermBackend;
use ratatui::prelude::*;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use crate::surface::ViewSnapshot;
use crate::ui::{draw_ui, UiState};

/// What a key press asks the UI thread to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    Send(ViewerCommand),
    MoveCursor(isize),
    Ignore,
}

pub fn action_for_key(code: KeyCode, cursor: usize) -> KeyAction {
    match code {
        KeyCode::Char('q') | KeyCode::Esc => KeyAction::Quit,
        KeyCode::Char('o') => dimension(0),
        KeyCode::Char('n') => dimension(1),
        KeyCode::Char('e') => dimension(2),
        KeyCode::Char(digit @ '1'..='9') => {
            let index = digit as usize - '1' as usize;
            match CATEGORIES.get(index) {
                Some(descriptor) => KeyAction::Send(ViewerCommand::CategoryToggled(
                    descriptor.key.to_string(),
                )),
                None => KeyAction::Ignore,
            }
        }
        KeyCode::Up | KeyCode::Char('k') => KeyAction::MoveCursor(-1),
        KeyCode::Down | KeyCode::Char('j') => KeyAction::MoveCursor(1),
        KeyCode::Enter => KeyAction::Send(ViewerCommand::LocationRowClicked(cursor)),
        KeyCode::Char('=') | KeyCode::Char('+') => KeyAction::Send(ViewerCommand::ZoomBy(1)),
        KeyCode::Char('-') | KeyCode::Char('_') => KeyAction::Send(ViewerCommand::ZoomBy(-1)),
        KeyCode::Char('r') => KeyAction::Send(ViewerCommand::Refresh),
        _ => KeyAction::Ignore,
    }
}

fn dimension(index: usize) -> KeyAction {
    KeyAction::Send(ViewerCommand::DimensionChanged(
        KNOWN_DIMENSIONS[index].to_string(),
    ))
}

pub struct InspectorApp {
    terminal: Terminal<CrosstermBackend<std::io::Stdout>>,
    ui_state: UiState,
    frames: Receiver<ViewSnapshot>,
    command_sender: UnboundedSender<ViewerCommand>,
    log_receiver: Receiver<String>,
}

impl InspectorApp {
    pub fn new(
        frames: Receiver<ViewSnapshot>,
        command_sender: UnboundedSender<ViewerCommand>,
        log_receiver: Receiver<String>,
    ) -> Result<Self> {
        let stdout = std::io::stdout();
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        crossterm::terminal::enable_raw_mode()?;
        terminal.clear()?;
        terminal.hide_cursor()?;
        Ok(Self {
            terminal,
            ui_state: UiState::default(),
            frames,
            command_sender,
            log_receiver,
        })
    }

    pub fn run(mut self) -> Result<()> {
        let mut last_draw = Instant::now();
        let mut dirty = true;

        loop {
            while let Ok(snapshot) = self.frames.try_recv() {
                self.ui_state.push_snapshot(snapshot);
                dirty = true;
            }

            while let Ok(line) = self.log_receiver.try_recv() {
                self.ui_state.push_log(line);
                dirty = true;
            }

            if dirty && last_draw.elapsed() >= Duration::from_millis(100) {
                self.terminal.draw(|frame| draw_ui(frame, &self.ui_state))?;
                last_draw = Instant::now();
                dirty = false;
            }

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    match action_for_key(key.code, self.ui_state.cursor) {
                        KeyAction::Quit => break,
                        KeyAction::Send(command) => {
                            debug!(?command, "command.sent");
                            if self.command_sender.send(command).is_err() {
                                warn!("Viewer loop has stopped; exiting");
                                break;
                            }
                        }
                        KeyAction::MoveCursor(delta) => {
                            self.ui_state.move_cursor(delta);
                            dirty = true;
                        }
                        KeyAction::Ignore => {}
                    }
                }
            }
        }

        let _ = self.command_sender.send(ViewerCommand::Shutdown);
        self.terminal.show_cursor()?;
        crossterm::terminal::disable_raw_mode()?;
        Ok(())
    }
}

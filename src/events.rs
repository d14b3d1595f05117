//! Keyboard input handling.

use std::time::Duration;

use color_eyre::eyre::Result;
use ratatui::{
    backend::Backend,
    crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    Terminal,
};
use tracing::{debug, info};

use crate::{app::GameLoop, types::Direction};

/// Waits up to `timeout` for an input event and applies it to the game.
///
/// Returning early on input keeps the loop responsive: the caller recomputes how long remains
/// until the next tick.
///
/// # Errors
///
/// This function may return errors if reading from the terminal or redrawing after a move fails.
pub(crate) fn handle_events<B: Backend>(
    game: &mut GameLoop,
    terminal: &mut Terminal<B>,
    timeout: Duration,
) -> Result<()> {
    if event::poll(timeout)? {
        if let Event::Key(key) = event::read()? {
            handle_key(game, terminal, key)?;
        }
    }

    Ok(())
}

/// Applies a single key event to the game.
///
/// Only key presses are considered, so that terminals reporting releases and repeats do not move
/// the character twice.
pub(crate) fn handle_key<B: Backend>(
    game: &mut GameLoop,
    terminal: &mut Terminal<B>,
    key: KeyEvent,
) -> Result<()> {
    if key.kind != KeyEventKind::Press {
        return Ok(());
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => {
            info!("quit requested");
            game.exit = true;
        }
        code => {
            if let Some(direction) = direction_for(code) {
                let _ = game.handle_direction(direction, terminal)?;
            } else {
                debug!(?code, "ignoring unbound key");
            }
        }
    }

    Ok(())
}

/// Maps a key to the direction it moves the character in.
///
/// Both the arrow keys and the `hjkl` keys are bound.
pub(crate) const fn direction_for(code: KeyCode) -> Option<Direction> {
    match code {
        KeyCode::Up | KeyCode::Char('k') => Some(Direction::Up),
        KeyCode::Down | KeyCode::Char('j') => Some(Direction::Down),
        KeyCode::Left | KeyCode::Char('h') => Some(Direction::Left),
        KeyCode::Right | KeyCode::Char('l') => Some(Direction::Right),
        _ => None,
    }
}

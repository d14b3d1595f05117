//! Game loop: the Idle/Running state machine and its fixed-rate scheduler.

use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use ratatui::{backend::Backend, DefaultTerminal, Terminal};
use tracing::{debug, info};

use crate::{
    assets::{Manifest, ResourceSet},
    config::Config,
    events, file_loader,
    map::TileGrid,
    session::Session,
    types::Direction,
    ui,
};

/// States of the game loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum LoopState {
    /// Waiting for the sprites to resolve. Only the loading panel is drawn.
    Idle,
    /// Redrawing the world on every tick.
    Running,
}

/// Fixed-rate scheduler deciding when the next tick is due.
///
/// This structure is driven with explicit timestamps so that the cadence can be checked without
/// waiting on a real clock.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Ticker {
    /// Time between two ticks.
    interval: Duration,
    /// Instant at which the next tick is due.
    ///
    /// This field only moves forward, by whole intervals, unless the loop fell behind by more
    /// than one interval.
    next: Instant,
}

impl Ticker {
    /// Creates a ticker whose first tick is due at `now`.
    pub(crate) const fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            next: now,
        }
    }

    /// Checks whether a tick is due at `now`.
    pub(crate) fn is_due(&self, now: Instant) -> bool {
        now >= self.next
    }

    /// Schedules the tick following the one just performed at `now`.
    ///
    /// Ticks missed while the loop was busy are skipped rather than run back to back.
    pub(crate) fn advance(&mut self, now: Instant) {
        self.next += self.interval;
        if self.next <= now {
            self.next = now + self.interval;
        }
    }

    /// Returns how long to wait at `now` before the next tick is due.
    pub(crate) fn until_next(&self, now: Instant) -> Duration {
        self.next.saturating_duration_since(now)
    }
}

/// The game loop driving a session.
///
/// This structure starts [`Idle`](LoopState::Idle) while the sprites load and switches to
/// [`Running`](LoopState::Running) exactly once, when every sprite has resolved, whether it loaded
/// or not. There is no terminal state: the loop runs until the player quits.
#[derive(Debug)]
pub struct GameLoop {
    /// World state.
    ///
    /// This field holds everything the draw passes read and the movement controller writes. It is
    /// only touched from the thread running the loop.
    pub(crate) session: Session,
    /// Current state of the loop.
    ///
    /// This field starts as [`LoopState::Idle`] and is set to [`LoopState::Running`] by the tick
    /// that receives the load summary. It never goes back.
    pub(crate) state: LoopState,
    /// Redraw scheduler.
    ///
    /// This field decides when the next tick is due and how long input may be waited for in the
    /// meantime.
    pub(crate) ticker: Ticker,
    /// This field indicates whether the loop should exit. It is set to `true` when the player
    /// quits but it starts `false`.
    pub(crate) exit: bool,
}

impl GameLoop {
    /// Builds the game loop for a configuration.
    ///
    /// This loads the map, places the character on its start tile and starts loading the
    /// sprites in the background.
    ///
    /// # Errors
    ///
    /// This function may return errors if the configured map file cannot be read or is not a
    /// valid map.
    pub fn new(config: &Config) -> Result<Self> {
        info!(?config, "starting session");

        let grid = match &config.map {
            Some(path) => file_loader::load_grid(path)?,
            None => TileGrid::default(),
        };
        let resources = ResourceSet::load(&config.assets, &Manifest::default());
        let session = Session::new(grid, config.viewport(), config.minimap_percent, resources);
        info!(
            width = session.grid.width(),
            height = session.grid.height(),
            start = ?session.character.position(),
            ladder = ?session.ladder,
            "map ready"
        );

        Ok(Self::with_session(session, config.tick_interval(), Instant::now()))
    }

    /// Wraps a session into an idle loop whose first tick is due at `now`.
    pub(crate) const fn with_session(session: Session, interval: Duration, now: Instant) -> Self {
        Self {
            session,
            state: LoopState::Idle,
            ticker: Ticker::new(interval, now),
            exit: false,
        }
    }

    /// Runs the loop until the player quits.
    ///
    /// Each iteration performs a tick when one is due and then waits for input until the next
    /// one.
    ///
    /// # Errors
    ///
    /// - [`std::io::Error`]
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        while !self.exit {
            let now = Instant::now();
            if self.ticker.is_due(now) {
                self.tick(terminal)?;
                self.ticker.advance(now);
            }

            events::handle_events(self, terminal, self.ticker.until_next(Instant::now()))?;
        }

        Ok(())
    }

    /// Performs one tick.
    ///
    /// While idle this collects sprite outcomes and draws the loading panel, switching to running
    /// once every sprite resolved. While running it redraws everything, whether anything changed
    /// or not.
    pub(crate) fn tick<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        match self.state {
            LoopState::Idle => {
                if let Some(summary) = self.session.resources.poll() {
                    info!(
                        loaded = summary.loaded,
                        failed = summary.failed,
                        "sprites resolved, starting frame loop"
                    );
                    self.state = LoopState::Running;
                    self.redraw(terminal)?;
                } else {
                    let resources = &self.session.resources;
                    let _ = terminal.draw(|frame| ui::draw_loading(resources, frame))?;
                }
            }
            LoopState::Running => self.redraw(terminal)?,
        }

        Ok(())
    }

    /// Recomputes the view and draws the main view, the character, the minimap and the status.
    pub(crate) fn redraw<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        let rect = self.session.refresh_view();
        let session = &self.session;
        let _ = terminal.draw(|frame| ui::draw_session(session, rect, frame))?;

        Ok(())
    }

    /// Handles a movement request from the player.
    ///
    /// Input is ignored while idle. An accepted move is drawn immediately instead of waiting for
    /// the next tick. Returns whether the character moved.
    pub(crate) fn handle_direction<B: Backend>(
        &mut self,
        direction: Direction,
        terminal: &mut Terminal<B>,
    ) -> Result<bool> {
        if self.state == LoopState::Idle {
            debug!(?direction, "ignoring movement while loading");
            return Ok(false);
        }

        let moved = self.session.move_character(direction);
        if moved {
            self.redraw(terminal)?;
        }

        Ok(moved)
    }
}

//! This crate contains the source code for the binary for the game tilewalk.

#![expect(
    clippy::cargo_common_metadata,
    reason = "Temporary allow during development."
)]
#![expect(
    unused_crate_dependencies,
    reason = "The dependencies are used in the library crate."
)]

use color_eyre::{eyre::Result, install};
use tilewalk::{init_logging, Config, GameLoop};

fn main() -> Result<()> {
    install()?;

    let config = Config::from_args();
    let _log_guard = init_logging(&config.log_file)?;
    let mut game = GameLoop::new(&config)?;

    let mut terminal = ratatui::init();
    let result = game.run(&mut terminal);
    ratatui::restore();

    result
}

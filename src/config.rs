//! Command-line configuration.

use std::{path::PathBuf, time::Duration};

use clap::Parser;

use crate::types::ViewportSpec;

/// Settings of a game session, read from the command line.
#[derive(Clone, Debug, Parser)]
#[command(version, about)]
pub struct Config {
    /// Map file to explore, one digit per tile (0 ladder, 1 floor, 2 wall). Uses the built-in map
    /// when omitted.
    #[arg(long)]
    pub map: Option<PathBuf>,
    /// Directory holding the sprite files.
    #[arg(long, default_value = "assets")]
    pub assets: PathBuf,
    /// Number of tile columns shown by the main view.
    #[arg(long, default_value_t = 16, value_parser = clap::value_parser!(u16).range(1..=256))]
    pub viewport_width: u16,
    /// Number of tile rows shown by the main view.
    #[arg(long, default_value_t = 12, value_parser = clap::value_parser!(u16).range(1..=256))]
    pub viewport_height: u16,
    /// Edge length of a tile in terminal cells.
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u16).range(1..=8))]
    pub tile_size: u16,
    /// Maximum minimap size, as a percentage of the main view size.
    #[arg(long, default_value_t = 150, value_parser = clap::value_parser!(u16).range(1..=1000))]
    pub minimap_percent: u16,
    /// Interval between two redraws, in milliseconds.
    #[arg(long, default_value_t = 33, value_parser = clap::value_parser!(u64).range(1..))]
    pub tick_ms: u64,
    /// File the log is written to.
    #[arg(long, default_value = "tilewalk.log")]
    pub log_file: PathBuf,
}

impl Config {
    /// Parses the configuration from the process arguments, exiting with a usage message on
    /// invalid input.
    #[must_use]
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Returns the viewport described by the configuration.
    pub(crate) fn viewport(&self) -> ViewportSpec {
        ViewportSpec::new(self.viewport_width, self.viewport_height, self.tile_size)
    }

    /// Returns the interval of the redraw scheduler.
    pub(crate) const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["tilewalk"]).expect("failed to parse arguments");

        assert_eq!(config.map, None);
        assert_eq!(config.assets, PathBuf::from("assets"));
        assert_eq!(config.viewport(), ViewportSpec::new(16, 12, 2));
        assert_eq!(config.minimap_percent, 150);
        assert_eq!(config.tick_interval(), Duration::from_millis(33));
        assert_eq!(config.log_file, PathBuf::from("tilewalk.log"));
    }

    #[test]
    fn test_overrides() {
        let config = Config::try_parse_from([
            "tilewalk",
            "--map",
            "cave.map",
            "--viewport-width",
            "20",
            "--viewport-height",
            "10",
            "--tile-size",
            "1",
            "--tick-ms",
            "100",
        ])
        .expect("failed to parse arguments");

        assert_eq!(config.map, Some(PathBuf::from("cave.map")));
        assert_eq!(config.viewport(), ViewportSpec::new(20, 10, 1));
        assert_eq!(config.tick_interval(), Duration::from_millis(100));
    }

    #[test]
    fn test_rejects_zero_sizes() {
        assert!(Config::try_parse_from(["tilewalk", "--viewport-width", "0"]).is_err());
        assert!(Config::try_parse_from(["tilewalk", "--tile-size", "0"]).is_err());
        assert!(Config::try_parse_from(["tilewalk", "--tick-ms", "0"]).is_err());
    }
}

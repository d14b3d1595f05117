//! Loading and validation utilities for map files.

use std::{fs, path::Path};

use color_eyre::eyre::{eyre, Result, WrapErr as _};

use crate::map::TileGrid;

/// Reads a map file from disk and builds a grid from its contents.
///
/// # Errors
///
/// This function may return errors if the file cannot be read or if its contents are not a valid
/// map according to [`parse_grid`].
pub(crate) fn load_grid(path: &Path) -> Result<TileGrid> {
    let contents = fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read map file {}", path.display()))?;

    parse_grid(&contents).wrap_err_with(|| format!("invalid map file {}", path.display()))
}

/// Parses the textual map format into a grid.
///
/// The format is one row per line with one decimal digit per cell, the digit being the tile-type
/// code of the cell. Leading and trailing whitespace around the whole input is ignored. The
/// resulting rows must all have the same, non-zero length.
///
/// # Errors
///
/// This function may return errors if:
/// - The input holds no rows
/// - A cell is not a decimal digit
/// - The rows have different lengths
pub(crate) fn parse_grid(input: &str) -> Result<TileGrid> {
    let rows = input
        .trim()
        .lines()
        .enumerate()
        .map(|(row_idx, line)| {
            line.trim()
                .chars()
                .enumerate()
                .map(|(col_idx, char)| {
                    char.to_digit(10)
                        .and_then(|digit| u8::try_from(digit).ok())
                        .ok_or_else(|| {
                            eyre!("invalid tile code {char:?} at column {col_idx}, row {row_idx}")
                        })
                })
                .collect::<Result<Vec<u8>>>()
        })
        .collect::<Result<Vec<Vec<u8>>>>()?;

    TileGrid::new(rows)
}

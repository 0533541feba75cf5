//! Loader for RON level files.

use ron::Options;
use ron::extensions::Extensions;
use std::fs;
use std::path::Path;
use thiserror::Error;

use super::data::LevelDef;

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("failed to read {file}: {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {file}: {message}")]
    Parse { file: String, message: String },
    #[error("level has no rows")]
    Empty,
    #[error("row {row} is {found} tiles wide, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown tile {symbol:?} at row {row}, column {column}")]
    UnknownTile {
        row: usize,
        column: usize,
        symbol: char,
    },
}

/// Parser settings shared by every data file: optional fields may be
/// written bare, without `Some(..)`.
pub(crate) fn ron_options() -> Options {
    Options::default().with_default_extension(Extensions::IMPLICIT_SOME)
}

pub fn parse_level(source: &str, file: &str) -> Result<LevelDef, LevelError> {
    ron_options()
        .from_str(source)
        .map_err(|e| LevelError::Parse {
            file: file.to_string(),
            message: e.to_string(),
        })
}

/// Load a level definition. The grid itself is checked by
/// [`TileMap::from_def`](super::TileMap::from_def).
pub fn load_level(path: &Path) -> Result<LevelDef, LevelError> {
    let file = path.display().to_string();
    let contents = fs::read_to_string(path).map_err(|source| LevelError::Io {
        file: file.clone(),
        source,
    })?;
    parse_level(&contents, &file)
}

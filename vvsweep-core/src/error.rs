//! Error types.

use std::io;
use std::path::PathBuf;

pub type Result<T> = core::result::Result<T, Error>;

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::IoError(e.to_string())
    }
}

impl<E> From<plotters::drawing::DrawingAreaErrorKind<E>> for Error
where
    E: std::error::Error + Send + Sync,
{
    fn from(e: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        Self::PlotError(e.to_string())
    }
}

/// Crate-wide error type.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("io error: {0}")]
    IoError(String),

    #[error("csv error: {0}")]
    CsvError(#[from] csv::Error),
    #[error(
        "file {} is missing required column: {}",
        .0.to_string_lossy(),
        .1
    )]
    MissingColumn(PathBuf, &'static str),
    #[error(
        "file {} line {}: invalid volume value: {:?}",
        .0.to_string_lossy(),
        .1,
        .2
    )]
    InvalidVolume(PathBuf, u64, String),

    #[cfg(feature = "yaml")]
    #[error("yaml error: {0}")]
    YamlError(#[from] serde_yaml::Error),
    #[error("toml deserialization error: {0}")]
    TomlDeserError(#[from] toml::de::Error),
    #[error("toml serialization error: {0}")]
    TomlSerError(#[from] toml::ser::Error),
    #[error("unsupported config file format: {0}")]
    UnsupportedConfigFormat(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("failed building worker pool: {0}")]
    ThreadPoolError(#[from] rayon::ThreadPoolBuildError),
    #[error("{failed} out of {total} jobs failed")]
    BatchFailed { failed: usize, total: usize },

    #[error("plotting error: {0}")]
    PlotError(String),

    #[error("other error: {0}")]
    Other(String),
}

//! On-disk formats: the per-epoch CSV log and the weight export file.

use std::{
    io,
    path::{Path, PathBuf},
};

use flapevo_controller::ArchitectureError;

use self::generation_log::LogParseError;

pub mod generation_log;
pub mod weights_file;

/// Failure to load a log or weight file.
///
/// [`ModelFileError::NotFound`] is kept apart from other I/O failures so that
/// callers can fall back to a default instead of aborting.
#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::IsVariant)]
pub enum ModelFileError {
    #[display("file not found: {}", path.display())]
    NotFound { path: PathBuf },
    #[display("failed to read {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[display("failed to parse {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[display("malformed log {}: {source}", path.display())]
    Log {
        path: PathBuf,
        source: LogParseError,
    },
    #[display("incompatible model {}: {source}", path.display())]
    Architecture {
        path: PathBuf,
        source: ArchitectureError,
    },
}

impl ModelFileError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        let path = PathBuf::from(path);
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound { path }
        } else {
            Self::Io { path, source }
        }
    }

    pub(crate) fn json(path: &Path, source: serde_json::Error) -> Self {
        let path = PathBuf::from(path);
        Self::Json { path, source }
    }

    pub(crate) fn log(path: &Path, source: LogParseError) -> Self {
        let path = PathBuf::from(path);
        Self::Log { path, source }
    }

    pub(crate) fn architecture(path: &Path, source: ArchitectureError) -> Self {
        let path = PathBuf::from(path);
        Self::Architecture { path, source }
    }
}

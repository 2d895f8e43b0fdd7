//! Error types for the publishing engine.

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Result alias used across the library.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised while resolving, altering or publishing assets.
#[derive(Debug, Error)]
pub enum Error {
    #[error("asset `{0}` does not exist")]
    AssetNotFound(String),

    #[error("asset input `{}` is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("`{}` is not a prefix of `{}`", input.display(), path.display())]
    NotUnderInput { input: PathBuf, path: PathBuf },

    #[error("no server for file `{}`", .0.display())]
    NoServer(PathBuf),

    #[error("IO error on `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to walk `{}`", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: jwalk::Error,
    },

    #[error("command `{program}` failed with {status}\n{stderr}")]
    Command {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("invalid command arguments: {0}")]
    CommandArgs(String),

    #[error("{name} failed: {message}")]
    Alteration { name: &'static str, message: String },

    #[error("invalid url")]
    Url(#[from] url::ParseError),
}

impl Error {
    /// Wrap an IO error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Attach a path to IO results, mirroring `anyhow::Context` for our typed errors.
pub(crate) trait IoContext<T> {
    fn at(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn at(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|err| Error::io(path, err))
    }
}

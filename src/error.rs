use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Error reading directory {}: {source}", path.display())]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Error opening {}: {source}", path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Error reading {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Error renaming {} to {}: {source}", from.display(), to.display())]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Token {token} not found in '{name}'")]
    TokenNotFound { name: String, token: String },

    #[error("Malformed checksum token '{token}': {source}")]
    Parse {
        token: String,
        #[source]
        source: hex::FromHexError,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Run aborted after error on '{name}' ({not_dispatched} files not checked): {source}")]
    Aborted {
        name: String,
        /// Files listed but never handed to a worker.
        not_dispatched: usize,
        #[source]
        source: Box<Error>,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// The underlying I/O error kind, if this error came from the filesystem.
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            Error::DirectoryRead { source, .. }
            | Error::FileOpen { source, .. }
            | Error::FileRead { source, .. }
            | Error::Rename { source, .. } => Some(source.kind()),
            Error::Aborted { source, .. } => source.io_kind(),
            _ => None,
        }
    }
}

use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type BridgeResult<T> = Result<T, BridgeError>;

/// Bridge-level error.
///
/// The hot paths (enqueue / drain) have no error cases; this covers setup only.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("config error: {0}")]
    Config(String),

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to spawn engine thread: {0}")]
    Spawn(#[source] io::Error),

    #[error("engine thread panicked: {0}")]
    EngineThreadPanicked(String),
}

/// Fatal errors: anything that stops the game loop or prevents startup.
/// Collisions are not errors; they are `MoveOutcome::Blocked` values.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("terminal I/O failed: {0}")]
    Terminal(#[from] io::Error),

    #[error("could not create log file {}: {source}", path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("logger init failed: {0}")]
    Logger(#[from] log::SetLoggerError),
}

use std::{path::PathBuf, process::ExitStatus};

/// Error type for symbol conversion.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The output file could not be created.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The converter could not be started.
    #[error("Failed to run {program:?}: {source}")]
    Spawn {
        /// The executable that failed to start.
        program: PathBuf,

        /// The underlying error.
        source: std::io::Error,
    },

    /// The converter exited unsuccessfully.
    #[error("Converter failed with {0}")]
    Failed(ExitStatus),
}

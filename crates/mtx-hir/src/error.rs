use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Infrastructure failures while building the resolved representation.
#[derive(Debug, Error)]
pub enum HirError {
    #[error("failed to read search path file {path}")]
    SearchPathFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read search path directory {path}")]
    SearchPathDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

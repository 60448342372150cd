use std::{io, path::PathBuf};

use thiserror::Error;

/// A ROM couldn't be loaded. Memory is left exactly as it was.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read ROM {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("ROM of {len} bytes doesn't fit in memory at origin 0x{origin:04x}")]
    TooLarge { origin: u16, len: usize },
}

//! Error types shared across the crate.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Errors produced while configuring, filling, or finalizing a document.
#[derive(Debug)]
pub enum Error {
    /// The document was already finalized by `output` and cannot be used anymore.
    DocumentClosed,
    /// The requested default font size was zero.
    InvalidFontSize,
    /// An existing configuration resource could not be parsed.
    Config {
        /// Path of the configuration resource that failed to parse.
        path: PathBuf,
        /// The underlying deserialization error.
        source: serde_json::Error,
    },
    /// An I/O failure while reading the header logo or writing the output file.
    Io(io::Error),
    /// A failure reported by the rendering engine, passed through unmodified.
    Engine(String),
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DocumentClosed => {
                write!(f, "Document has already been output and is closed")
            }
            Self::InvalidFontSize => write!(f, "Default font size must be greater than zero"),
            Self::Config { path, .. } => {
                write!(f, "Failed to parse configuration resource {}", path.display())
            }
            Self::Io(err) => write!(f, "I/O failure: {err}"),
            Self::Engine(message) => write!(f, "Rendering engine failure: {message}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config { source, .. } => Some(source),
            Self::Io(err) => Some(err),
            Self::DocumentClosed | Self::InvalidFontSize | Self::Engine(_) => None,
        }
    }
}

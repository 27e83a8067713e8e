use std::io;
use std::path::PathBuf;

/// Everything that can go wrong while turning configuration into pixels.
///
/// None of these escape the cycler's public operations: they are logged
/// where they happen and the background degrades to a static image or to
/// no surface at all.
#[derive(Debug, thiserror::Error)]
pub enum BackgroundError {
    /// A directory of the image set could not be opened.
    #[error("failed to read directory {}: {source}", path.display())]
    Scan {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A single image could not be decoded.
    #[error("failed to load {}: {reason}", path.display())]
    Decode { path: PathBuf, reason: String },

    /// The configured path is neither a directory nor a decodable file.
    #[error("invalid background path {0}")]
    ConfigInvalid(String),

    /// A decoded image could not be turned into a paintable frame.
    #[error("failed to create frame: {0}")]
    Frame(String),

    /// The configuration file could not be read or parsed.
    #[error("failed to load config {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },
}

impl BackgroundError {
    pub fn decode(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Decode {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T, E = BackgroundError> = std::result::Result<T, E>;

use std::path::PathBuf;

use thiserror::Error;

/// Result alias for pipeline operations.
pub type Result<T> = std::result::Result<T, ProcessError>;

/// Everything that can go wrong while amplifying a video.
///
/// The UI only ever sees the `Display` text of these, carried inside the
/// terminal status snapshot.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The input container has no audio stream to amplify.
    #[error("No audio found in input video")]
    NoAudioStream,

    /// An external tool could not be started at all.
    #[error("Failed to execute {tool}: {source}")]
    ToolSpawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// An external tool ran but exited unsuccessfully.
    #[error("{tool} failed ({status}): {stderr}")]
    ToolFailed {
        tool: String,
        status: String,
        stderr: String,
    },

    /// ffprobe produced output we could not understand.
    #[error("Could not read media info for '{path}': {message}")]
    Probe { path: PathBuf, message: String },

    /// The decoded audio uses a layout the gain stage does not handle.
    #[error("Unsupported audio format: {0}")]
    UnsupportedAudio(String),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

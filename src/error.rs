//! Error types for decoding, audio output, rendering, and configuration.

use thiserror::Error;

/// Failure to turn a byte buffer into PCM samples.
///
/// A failed decode never touches the currently loaded session.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("failed to read input: {0}")]
    Read(#[from] std::io::Error),

    #[error("unrecognized audio encoding: {0}")]
    Unsupported(String),

    #[error("no decodable audio track found")]
    NoAudioTrack,

    #[error("audio track has no sample rate")]
    UnknownSampleRate,

    #[error("audio stream decoded to zero frames")]
    Empty,

    #[error("codec error: {0}")]
    Codec(String),
}

/// Output device and stream failures.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no audio output device found")]
    NoOutputDevice,

    #[error("failed to query output config: {0}")]
    Config(String),

    #[error("failed to build output stream: {0}")]
    BuildStream(String),

    #[error("failed to start output stream: {0}")]
    PlayStream(String),

    #[error("invalid analyser config: {0}")]
    Analyser(String),
}

/// GPU setup failures.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to create surface: {0}")]
    Surface(String),

    #[error("no suitable GPU adapter")]
    NoAdapter,

    #[error("failed to request device: {0}")]
    Device(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

//! Audio decoding, playback transport, and spectrum analysis.
//!
//! Decoded buffers play through a single-voice cpal mixer with an analyser
//! tap in-line before the gain stage, so the visuals see exactly what is audible.

pub mod analyser;
pub mod context;
pub mod decode;
pub mod loader;
pub mod output;
pub mod transport;

// Re-export public types
pub use analyser::AnalyserTap;
pub use context::{AudioContext, SourceId};
pub use decode::{decode_bytes, PcmBuffer};
pub use loader::{DecodeWorker, LoadedFile};
pub use output::CpalContext;
pub use transport::{PlaybackSession, PositionUpdate, Transport, TransportState};

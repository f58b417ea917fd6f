//! Byte buffer to PCM decoding via symphonia.

use std::io::Cursor;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::DecodeError;

/// Decoded, interleaved PCM samples. Immutable once built.
#[derive(Debug, Clone)]
pub struct PcmBuffer {
    samples: Vec<f32>,
    channels: usize,
    sample_rate: u32,
}

impl PcmBuffer {
    /// Build from interleaved samples. Trailing partial frames are dropped.
    pub fn new(mut samples: Vec<f32>, channels: usize, sample_rate: u32) -> Self {
        let channels = channels.max(1);
        samples.truncate(samples.len() / channels * channels);
        Self {
            samples,
            channels,
            sample_rate,
        }
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of sample frames (one sample per channel each)
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels
    }

    /// Length in seconds
    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Sample at `frame` for `channel`, or silence past the end
    pub fn sample(&self, frame: usize, channel: usize) -> f32 {
        let channel = channel.min(self.channels - 1);
        self.samples
            .get(frame * self.channels + channel)
            .copied()
            .unwrap_or(0.0)
    }

    /// Average of all channels at `frame`
    pub fn mono(&self, frame: usize) -> f32 {
        let start = frame * self.channels;
        match self.samples.get(start..start + self.channels) {
            Some(frame) => frame.iter().sum::<f32>() / self.channels as f32,
            None => 0.0,
        }
    }
}

/// Decode an opaque audio byte buffer.
///
/// `extension` is an optional container hint (e.g. `"mp3"`); probing falls
/// back to content sniffing without it. The bytes are consumed in place.
pub fn decode_bytes(bytes: Vec<u8>, extension: Option<&str>) -> Result<PcmBuffer, DecodeError> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = extension {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| DecodeError::Unsupported(e.to_string()))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(DecodeError::NoAudioTrack)?;

    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or(DecodeError::UnknownSampleRate)?;
    let mut channels = track.codec_params.channels.map_or(0, |c| c.count());

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| DecodeError::Unsupported(e.to_string()))?;

    let mut samples: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(ref e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(DecodeError::Codec(e.to_string())),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            // Corrupt packets are skipped
            Err(SymphoniaError::DecodeError(msg)) => {
                log::debug!("Skipping undecodable packet: {}", msg);
                continue;
            }
            Err(e) => return Err(DecodeError::Codec(e.to_string())),
        };

        let spec = *decoded.spec();
        if channels == 0 {
            channels = spec.channels.count();
        }

        let mut sample_buf = SampleBuffer::<f32>::new(decoded.frames() as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);
        samples.extend_from_slice(sample_buf.samples());
    }

    let buffer = PcmBuffer::new(samples, channels, sample_rate);
    if buffer.frames() == 0 {
        return Err(DecodeError::Empty);
    }

    log::info!(
        "Decoded audio: {} frames, {} ch, {}Hz, {:.1}s",
        buffer.frames(),
        buffer.channels(),
        buffer.sample_rate(),
        buffer.duration_secs()
    );

    Ok(buffer)
}

//! cpal-backed audio context: one-voice mixer, analyser tap, and gain stage.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use super::analyser::AnalyserTap;
use super::context::{AudioContext, SourceId};
use super::decode::PcmBuffer;
use crate::error::AudioError;
use crate::params::{AnalyserConfig, OutputConfig};

/// The single playing source
struct Voice {
    id: SourceId,
    buffer: Arc<PcmBuffer>,
    /// Read position in buffer frames (fractional for resampling)
    position: f64,
    /// Buffer frames advanced per device frame
    step: f64,
}

/// State shared with the audio callback
struct Mixer {
    voice: Option<Voice>,
    last_finished: Option<SourceId>,
    gain: f32,
    /// Pre-gain mono block handed to the analyser
    mono_block: Vec<f32>,
}

impl Mixer {
    /// Render interleaved device frames, pushing the pre-gain mono mix into the analyser
    fn fill(&mut self, data: &mut [f32], channels: usize, analyser: &AnalyserTap) {
        let frames = data.len() / channels;
        self.mono_block.clear();

        for frame in data.chunks_mut(channels) {
            let Some(voice) = self.voice.as_mut() else {
                frame.fill(0.0);
                self.mono_block.push(0.0);
                continue;
            };

            let index = voice.position.floor() as usize;
            let frac = (voice.position - index as f64) as f32;
            let buffer = &voice.buffer;

            for (ch, out) in frame.iter_mut().enumerate() {
                let a = buffer.sample(index, ch);
                let b = buffer.sample(index + 1, ch);
                *out = (a + (b - a) * frac) * self.gain;
            }
            let a = buffer.mono(index);
            let b = buffer.mono(index + 1);
            self.mono_block.push(a + (b - a) * frac);

            voice.position += voice.step;
            if voice.position >= buffer.frames() as f64 {
                self.last_finished = Some(voice.id);
                self.voice = None;
            }
        }

        debug_assert_eq!(self.mono_block.len(), frames);
        analyser.push_samples(&self.mono_block);
    }
}

/// Audio context driving the default output device
pub struct CpalContext {
    mixer: Arc<Mutex<Mixer>>,
    analyser: Arc<AnalyserTap>,
    clock: Instant,
    next_id: SourceId,
    device_rate: u32,

    /// Audio output stream (kept alive)
    _stream: cpal::Stream,
}

impl CpalContext {
    /// Open the default output device and start the (initially silent) stream
    pub fn new(analyser_config: AnalyserConfig, output: OutputConfig) -> Result<Self, AudioError> {
        let analyser = Arc::new(AnalyserTap::new(analyser_config)?);
        let analyser_cb = Arc::clone(&analyser);

        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioError::NoOutputDevice)?;

        let config = device
            .default_output_config()
            .map_err(|e| AudioError::Config(e.to_string()))?;

        let device_rate = config.sample_rate().0;
        let channels = config.channels() as usize;

        log::info!(
            "Audio: {} @ {}Hz, {} ch",
            device.name().unwrap_or_else(|_| "Unknown".to_string()),
            device_rate,
            channels
        );

        let mixer = Arc::new(Mutex::new(Mixer {
            voice: None,
            last_finished: None,
            gain: output.gain,
            mono_block: Vec::new(),
        }));
        let mixer_cb = Arc::clone(&mixer);

        let stream = device
            .build_output_stream(
                &config.into(),
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let mut mixer = mixer_cb.lock().unwrap_or_else(|e| e.into_inner());
                    mixer.fill(data, channels, &analyser_cb);
                },
                |err| log::error!("Audio stream error: {}", err),
                None,
            )
            .map_err(|e| AudioError::BuildStream(e.to_string()))?;

        stream
            .play()
            .map_err(|e| AudioError::PlayStream(e.to_string()))?;

        Ok(Self {
            mixer,
            analyser,
            clock: Instant::now(),
            next_id: 1,
            device_rate,
            _stream: stream,
        })
    }

    fn mixer(&self) -> std::sync::MutexGuard<'_, Mixer> {
        self.mixer.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl AudioContext for CpalContext {
    fn current_time(&self) -> f64 {
        self.clock.elapsed().as_secs_f64()
    }

    fn start_source(&mut self, buffer: Arc<PcmBuffer>, offset_s: f64) -> SourceId {
        let id = self.next_id;
        self.next_id += 1;

        let step = buffer.sample_rate() as f64 / self.device_rate as f64;
        let position = (offset_s.max(0.0) * buffer.sample_rate() as f64).floor();

        let mut mixer = self.mixer();
        if let Some(previous) = mixer.voice.take() {
            log::warn!("Source {} still live when starting {}", previous.id, id);
        }
        mixer.voice = Some(Voice {
            id,
            buffer,
            position,
            step,
        });
        log::debug!("Started source {} at {:.3}s", id, offset_s);
        id
    }

    fn stop_source(&mut self, id: SourceId) {
        let mut mixer = self.mixer();
        if mixer.voice.as_ref().is_some_and(|v| v.id == id) {
            mixer.voice = None;
            drop(mixer);
            self.analyser.clear();
            log::debug!("Stopped source {}", id);
        }
    }

    fn source_ended(&self, id: SourceId) -> bool {
        self.mixer().last_finished == Some(id)
    }

    fn analyser(&self) -> Option<&AnalyserTap> {
        Some(&self.analyser)
    }
}

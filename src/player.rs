//! Frame driver: owns the audio context, transport, decode worker, and blob.
//!
//! The windowing layer calls [`Player::frame`] once per redraw. Each frame
//! first installs any finished decode, then polls the playback position,
//! then rebuilds the deformed surface. After [`Player::shutdown`] frames
//! do nothing.

use std::path::Path;

use crate::audio::{AudioContext, DecodeWorker, LoadedFile, PcmBuffer, Transport, TransportState};
use crate::blob::{BlobSystem, DeformationState};
use crate::ui::{self, Command};

/// What one frame produced, for the renderer and the title readout
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameState {
    pub position: f64,
    pub duration: f64,
    pub deformation: DeformationState,
}

pub struct Player<C: AudioContext> {
    audio: Option<C>,
    transport: Transport,
    blob: BlobSystem,
    decoder: DecodeWorker,
    file_name: Option<String>,
    notice: Option<String>,
    autoplay: bool,
    position: f64,
    duration: f64,
    running: bool,
}

impl<C: AudioContext> Player<C> {
    /// `audio` is `None` when no output device could be opened; visuals still run
    pub fn new(audio: Option<C>, blob: BlobSystem, autoplay: bool) -> Self {
        let notice = audio.is_none().then(|| "no audio output".to_string());
        Self {
            audio,
            transport: Transport::new(),
            blob,
            decoder: DecodeWorker::new(),
            file_name: None,
            notice,
            autoplay,
            position: 0.0,
            duration: 0.0,
            running: true,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn blob(&self) -> &BlobSystem {
        &self.blob
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn audio(&self) -> Option<&C> {
        self.audio.as_ref()
    }

    /// Start decoding `path` off the frame thread
    pub fn request_load(&mut self, path: &Path) {
        if !self.running {
            return;
        }
        if self.audio.is_none() {
            log::warn!("Ignoring {}: no audio output available", path.display());
            return;
        }
        let name = self.decoder.load_path(path);
        self.notice = Some(format!("loading {}", name));
    }

    /// Replace the session with a decoded buffer
    pub fn load_buffer(&mut self, name: String, buffer: PcmBuffer) {
        let Some(ctx) = self.audio.as_mut() else {
            return;
        };
        let duration = self.transport.load_buffer(ctx, buffer).duration();
        log::info!("Loaded {} ({:.1}s)", name, duration);
        self.file_name = Some(name);
        self.notice = None;
        self.position = 0.0;
        self.duration = duration;
        if self.autoplay {
            self.transport.play(ctx);
        }
    }

    fn install(&mut self, file: LoadedFile) {
        match file.result {
            Ok(buffer) => self.load_buffer(file.name, buffer),
            Err(e) => {
                // Current session keeps going
                log::warn!("Failed to load {}: {}", file.name, e);
                self.notice = Some(format!("cannot decode {}", file.name));
            }
        }
    }

    /// Apply a user command. Returns false once the player has shut down.
    pub fn handle_command(&mut self, command: Command) -> bool {
        if !self.running {
            return false;
        }
        if command == Command::Quit {
            self.shutdown();
            return false;
        }

        let Some(ctx) = self.audio.as_mut() else {
            return true;
        };
        match command {
            Command::TogglePlay => self.transport.toggle(ctx),
            Command::SeekTo(value) => self.transport.seek(ctx, ui::slider_to_fraction(value)),
            Command::SeekBy(delta) => {
                let current = ui::slider_value(self.transport.position(ctx), self.duration);
                self.transport
                    .seek(ctx, ui::slider_to_fraction(current + delta));
            }
            Command::Quit => {}
        }
        true
    }

    /// One frame at clock reading `now` (seconds); `None` after shutdown
    pub fn frame(&mut self, now: f64) -> Option<FrameState> {
        if !self.running {
            return None;
        }

        if let Some(file) = self.decoder.poll() {
            self.install(file);
        }

        // Position poll (auto-stops at end of buffer)
        if let Some(ctx) = self.audio.as_mut() {
            let update = self.transport.tick(ctx);
            self.position = update.position;
            self.duration = update.duration;
        }

        // Read spectrum and deform the surface
        let analyser = self.audio.as_ref().and_then(|ctx| ctx.analyser());
        let deformation = self.blob.update(now, analyser);
        log::trace!("frame: t={:.3} intensity={:.3}", deformation.elapsed_s, deformation.intensity);

        Some(FrameState {
            position: self.position,
            duration: self.duration,
            deformation,
        })
    }

    pub fn state(&self) -> TransportState {
        self.transport.state()
    }

    /// Window title with file, play state, readout, and any notice
    pub fn title(&self) -> String {
        ui::window_title(
            self.file_name.as_deref(),
            self.transport.state(),
            self.position,
            self.duration,
            self.notice.as_deref(),
        )
    }

    /// Stop the active source and release the audio context.
    ///
    /// Returns the context so the caller decides when the device closes.
    /// Later frames and commands are ignored.
    pub fn shutdown(&mut self) -> Option<C> {
        if !self.running {
            return None;
        }
        self.running = false;

        let mut audio = self.audio.take();
        if let Some(ctx) = audio.as_mut() {
            self.transport.shutdown(ctx);
        }
        log::info!("Player shut down");
        audio
    }
}

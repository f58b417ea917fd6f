//! Playback session and play/pause/seek state machine.
//!
//! All timing comes from the context's reference clock. The transport owns
//! the handle of the one active source and always stops it before starting
//! a replacement, so at most one source is audible at any instant.

use std::sync::Arc;

use super::context::{AudioContext, SourceId};
use super::decode::{decode_bytes, PcmBuffer};
use crate::error::DecodeError;

/// Observable transport state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    Empty,
    Paused,
    Playing,
}

/// A decoded buffer plus its playback bookkeeping
#[derive(Debug, Clone)]
pub struct PlaybackSession {
    buffer: Arc<PcmBuffer>,
    duration: f64,
    /// Seconds already consumed before the current run
    offset: f64,
    /// Clock reading when the current run began
    run_started_at: f64,
    is_playing: bool,
}

impl PlaybackSession {
    pub fn new(buffer: PcmBuffer) -> Self {
        let duration = buffer.duration_secs();
        Self {
            buffer: Arc::new(buffer),
            duration,
            offset: 0.0,
            run_started_at: 0.0,
            is_playing: false,
        }
    }

    pub fn buffer(&self) -> &PcmBuffer {
        &self.buffer
    }

    /// Buffer length in seconds, fixed at decode time
    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// Clock reading at which position zero would have started
    pub fn start_reference(&self) -> f64 {
        self.run_started_at - self.offset
    }

    /// Position at clock reading `now`, clamped to the duration
    pub fn position_at(&self, now: f64) -> f64 {
        if self.is_playing {
            (self.offset + (now - self.run_started_at).max(0.0)).min(self.duration)
        } else {
            self.offset
        }
    }
}

/// Result of one position poll
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionUpdate {
    pub position: f64,
    pub duration: f64,
    pub is_playing: bool,
    /// Set on the single poll that observed the natural end of playback
    pub ended: bool,
}

/// Play/pause/seek controller over at most one loaded session
#[derive(Default)]
pub struct Transport {
    session: Option<PlaybackSession>,
    active_source: Option<SourceId>,
}

impl Transport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> TransportState {
        match &self.session {
            None => TransportState::Empty,
            Some(s) if s.is_playing => TransportState::Playing,
            Some(_) => TransportState::Paused,
        }
    }

    pub fn session(&self) -> Option<&PlaybackSession> {
        self.session.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.state() == TransportState::Playing
    }

    /// Decode `bytes` and replace the current session.
    ///
    /// On failure nothing changes: the previous session keeps playing or stays paused.
    pub fn load_file<C: AudioContext>(
        &mut self,
        ctx: &mut C,
        bytes: Vec<u8>,
        extension: Option<&str>,
    ) -> Result<&PlaybackSession, DecodeError> {
        let buffer = decode_bytes(bytes, extension)?;
        Ok(self.load_buffer(ctx, buffer))
    }

    /// Replace the current session with an already decoded buffer (paused, offset 0)
    pub fn load_buffer<C: AudioContext>(
        &mut self,
        ctx: &mut C,
        buffer: PcmBuffer,
    ) -> &PlaybackSession {
        self.stop_active(ctx);
        let session = PlaybackSession::new(buffer);
        log::info!("Loaded session: {:.2}s", session.duration);
        self.session.insert(session)
    }

    /// Resume from the current offset. No-op without a loaded buffer.
    pub fn play<C: AudioContext>(&mut self, ctx: &mut C) -> bool {
        match &self.session {
            Some(session) => {
                let offset = session.offset;
                self.play_from(ctx, offset)
            }
            None => {
                log::debug!("play() ignored: nothing loaded");
                false
            }
        }
    }

    /// (Re)start sound production `from_offset` seconds into the buffer.
    ///
    /// An offset at or past the end restarts from the beginning.
    pub fn play_from<C: AudioContext>(&mut self, ctx: &mut C, from_offset: f64) -> bool {
        if self.session.is_none() {
            log::debug!("play_from() ignored: nothing loaded");
            return false;
        }

        // Old source must be silent before the new one exists
        self.stop_active(ctx);

        let Some(session) = self.session.as_mut() else {
            return false;
        };
        let mut offset = if from_offset.is_finite() {
            from_offset.clamp(0.0, session.duration)
        } else {
            0.0
        };
        if offset >= session.duration {
            offset = 0.0;
        }

        let id = ctx.start_source(Arc::clone(&session.buffer), offset);
        session.offset = offset;
        session.run_started_at = ctx.current_time();
        session.is_playing = true;
        self.active_source = Some(id);

        log::info!("Play from {:.2}s", offset);
        true
    }

    /// Stop the active source and freeze the offset at the current position
    pub fn pause<C: AudioContext>(&mut self, ctx: &mut C) {
        let now = ctx.current_time();
        if let Some(session) = self.session.as_mut() {
            session.offset = session.position_at(now);
            if session.is_playing {
                log::info!("Paused at {:.2}s", session.offset);
            }
            session.is_playing = false;
        }
        self.stop_active(ctx);
    }

    /// Play when paused, pause when playing
    pub fn toggle<C: AudioContext>(&mut self, ctx: &mut C) {
        if self.is_playing() {
            self.pause(ctx);
        } else {
            self.play(ctx);
        }
    }

    /// Jump to `fraction` of the duration (clamped to [0, 1]).
    ///
    /// While playing this restarts the source at the new offset, which is an
    /// audible discontinuity.
    pub fn seek<C: AudioContext>(&mut self, ctx: &mut C, fraction: f64) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        let target = fraction * session.duration;
        log::debug!("Seek to {:.2}s", target);

        session.offset = target;
        if session.is_playing {
            self.restart_at(ctx, target);
        }
    }

    /// Restart a playing session at `target` without the end-wraps-to-start rule
    fn restart_at<C: AudioContext>(&mut self, ctx: &mut C, target: f64) {
        self.stop_active(ctx);
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let id = ctx.start_source(Arc::clone(&session.buffer), target);
        session.run_started_at = ctx.current_time();
        self.active_source = Some(id);
    }

    /// Current position without side effects
    pub fn position<C: AudioContext>(&self, ctx: &C) -> f64 {
        self.session
            .as_ref()
            .map_or(0.0, |s| s.position_at(ctx.current_time()))
    }

    /// Per-frame position poll; detects the natural end of playback exactly once
    pub fn tick<C: AudioContext>(&mut self, ctx: &mut C) -> PositionUpdate {
        let now = ctx.current_time();
        let source_done = self.active_source.is_some_and(|id| ctx.source_ended(id));

        let Some(session) = self.session.as_mut() else {
            return PositionUpdate {
                position: 0.0,
                duration: 0.0,
                is_playing: false,
                ended: false,
            };
        };

        let position = session.position_at(now);
        let ended = session.is_playing && (position >= session.duration || source_done);

        if ended {
            session.is_playing = false;
            session.offset = session.duration;
            log::info!("Playback reached end ({:.2}s)", session.duration);
        }

        let update = PositionUpdate {
            position: if ended { session.duration } else { position },
            duration: session.duration,
            is_playing: session.is_playing,
            ended,
        };

        if ended {
            self.stop_active(ctx);
        }
        update
    }

    /// Stop any audible source; used on teardown
    pub fn shutdown<C: AudioContext>(&mut self, ctx: &mut C) {
        self.pause(ctx);
    }

    fn stop_active<C: AudioContext>(&mut self, ctx: &mut C) {
        if let Some(id) = self.active_source.take() {
            ctx.stop_source(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::context::manual::ManualContext;
    use crate::audio::decode::tests::wav_bytes;

    fn ten_second_clip() -> PcmBuffer {
        PcmBuffer::new(vec![0.0; 1000], 1, 100)
    }

    fn loaded() -> (Transport, ManualContext) {
        let mut ctx = ManualContext::new();
        let mut transport = Transport::new();
        transport.load_buffer(&mut ctx, ten_second_clip());
        (transport, ctx)
    }

    #[test]
    fn test_state_machine_transitions() {
        let mut ctx = ManualContext::new();
        let mut transport = Transport::new();
        assert_eq!(transport.state(), TransportState::Empty);

        transport.load_buffer(&mut ctx, ten_second_clip());
        assert_eq!(transport.state(), TransportState::Paused);

        transport.play(&mut ctx);
        assert_eq!(transport.state(), TransportState::Playing);

        transport.pause(&mut ctx);
        assert_eq!(transport.state(), TransportState::Paused);
    }

    #[test]
    fn test_play_without_buffer_is_noop() {
        let mut ctx = ManualContext::new();
        let mut transport = Transport::new();

        assert!(!transport.play(&mut ctx));
        assert!(!transport.play_from(&mut ctx, 3.0));
        transport.seek(&mut ctx, 0.5);
        transport.pause(&mut ctx);

        assert!(ctx.started.is_empty());
        assert_eq!(transport.state(), TransportState::Empty);
    }

    #[test]
    fn test_load_file_decodes_and_resets() {
        let mut ctx = ManualContext::new();
        let mut transport = Transport::new();

        let bytes = wav_bytes(2.0, 8000, 1);
        let session = transport.load_file(&mut ctx, bytes, Some("wav")).unwrap();
        assert!((session.duration() - 2.0).abs() < 1e-9);
        assert_eq!(session.offset(), 0.0);
        assert!(!session.is_playing());
    }

    #[test]
    fn test_failed_decode_leaves_session_untouched() {
        let (mut transport, mut ctx) = loaded();
        transport.play(&mut ctx);
        ctx.advance(2.0);

        let result = transport.load_file(&mut ctx, b"definitely not audio".to_vec(), None);
        assert!(result.is_err());

        assert_eq!(transport.state(), TransportState::Playing);
        assert_eq!(transport.session().unwrap().duration(), 10.0);
        assert!(ctx.stopped.is_empty());
        assert_eq!(transport.position(&ctx), 2.0);
    }

    #[test]
    fn test_new_load_stops_playback_and_resets_offset() {
        let (mut transport, mut ctx) = loaded();
        transport.play(&mut ctx);
        ctx.advance(4.0);

        transport.load_buffer(&mut ctx, PcmBuffer::new(vec![0.0; 300], 1, 100));

        assert_eq!(transport.state(), TransportState::Paused);
        assert_eq!(ctx.active, None);
        assert_eq!(transport.position(&ctx), 0.0);
        assert_eq!(transport.session().unwrap().duration(), 3.0);
    }

    #[test]
    fn test_double_play_never_overlaps() {
        let (mut transport, mut ctx) = loaded();

        transport.play(&mut ctx);
        transport.play(&mut ctx);
        transport.play_from(&mut ctx, 1.0);

        assert_eq!(ctx.started.len(), 3);
        assert_eq!(ctx.overlaps, 0);
        // Each earlier source was stopped before the next began
        assert_eq!(ctx.stopped, vec![1, 2]);
    }

    #[test]
    fn test_seek_sets_position_exactly() {
        let (mut transport, mut ctx) = loaded();

        for &f in &[0.0, 0.25, 0.5, 0.8, 1.0] {
            transport.seek(&mut ctx, f);
            assert_eq!(transport.position(&ctx), f * 10.0);
        }

        transport.play(&mut ctx);
        ctx.advance(1.5);
        transport.seek(&mut ctx, 0.3);
        assert_eq!(transport.position(&ctx), 0.3 * 10.0);
        assert!(transport.is_playing());
        assert_eq!(ctx.overlaps, 0);
    }

    #[test]
    fn test_seek_clamps_out_of_range() {
        let (mut transport, mut ctx) = loaded();

        transport.seek(&mut ctx, 1.7);
        assert_eq!(transport.position(&ctx), 10.0);

        transport.seek(&mut ctx, -0.2);
        assert_eq!(transport.position(&ctx), 0.0);

        transport.seek(&mut ctx, f64::NAN);
        assert_eq!(transport.position(&ctx), 0.0);
    }

    #[test]
    fn test_duration_invariant_under_transport() {
        let (mut transport, mut ctx) = loaded();

        transport.play(&mut ctx);
        ctx.advance(1.0);
        transport.seek(&mut ctx, 0.9);
        transport.pause(&mut ctx);
        transport.play_from(&mut ctx, 2.0);
        transport.tick(&mut ctx);

        assert_eq!(transport.session().unwrap().duration(), 10.0);
    }

    #[test]
    fn test_position_monotonic_and_end_triggers_once() {
        let (mut transport, mut ctx) = loaded();
        transport.play(&mut ctx);

        let mut last = 0.0;
        let mut end_count = 0;
        for _ in 0..700 {
            ctx.advance(1.0 / 60.0);
            let update = transport.tick(&mut ctx);
            assert!(update.position >= last);
            assert!(update.position <= 10.0);
            last = update.position;
            if update.ended {
                end_count += 1;
            }
        }

        assert_eq!(end_count, 1);
        assert_eq!(last, 10.0);
        assert!(!transport.is_playing());
        assert_eq!(ctx.active, None);
    }

    #[test]
    fn test_backend_end_signal_stops_playback() {
        let (mut transport, mut ctx) = loaded();
        transport.play_from(&mut ctx, 9.0);
        ctx.advance(0.5);
        ctx.finish_active();

        let update = transport.tick(&mut ctx);
        assert!(update.ended);
        assert_eq!(update.position, 10.0);
        assert!(!update.is_playing);

        let again = transport.tick(&mut ctx);
        assert!(!again.ended);
        assert_eq!(again.position, 10.0);
    }

    #[test]
    fn test_play_after_end_restarts_from_zero() {
        let (mut transport, mut ctx) = loaded();
        transport.play(&mut ctx);
        ctx.advance(11.0);
        assert!(transport.tick(&mut ctx).ended);

        transport.play(&mut ctx);
        assert_eq!(ctx.started.last().map(|&(_, offset)| offset), Some(0.0));
        assert_eq!(transport.position(&ctx), 0.0);
    }

    #[test]
    fn test_full_listening_scenario() {
        let (mut transport, mut ctx) = loaded();

        transport.play_from(&mut ctx, 0.0);
        ctx.advance(3.0);
        let update = transport.tick(&mut ctx);
        assert!((update.position - 3.0).abs() < 1e-9);
        assert!(update.is_playing);

        transport.pause(&mut ctx);
        ctx.advance(2.0);
        assert!((transport.tick(&mut ctx).position - 3.0).abs() < 1e-9);

        transport.seek(&mut ctx, 0.5);
        assert_eq!(transport.tick(&mut ctx).position, 5.0);

        transport.play(&mut ctx);
        assert_eq!(ctx.started.last().map(|&(_, offset)| offset), Some(5.0));
        ctx.advance(5.0);
        let update = transport.tick(&mut ctx);

        assert!(update.ended);
        assert!(!update.is_playing);
        assert_eq!(update.position, 10.0);
        assert_eq!(transport.state(), TransportState::Paused);
    }

    #[test]
    fn test_start_reference_tracks_clock() {
        let (mut transport, mut ctx) = loaded();
        ctx.advance(7.0);
        transport.play_from(&mut ctx, 2.0);

        let session = transport.session().unwrap();
        assert_eq!(session.start_reference(), 5.0);
    }

    #[test]
    fn test_shutdown_stops_source_and_freezes_position() {
        let (mut transport, mut ctx) = loaded();
        transport.play(&mut ctx);
        ctx.advance(4.0);

        transport.shutdown(&mut ctx);

        assert_eq!(ctx.active, None);
        assert_eq!(ctx.stopped, vec![1]);
        assert_eq!(transport.state(), TransportState::Paused);
        assert_eq!(transport.position(&ctx), 4.0);

        ctx.advance(3.0);
        let update = transport.tick(&mut ctx);
        assert_eq!(update.position, 4.0);
        assert!(!update.is_playing);
        assert!(!update.ended);
        assert_eq!(ctx.started.len(), 1);
    }
}

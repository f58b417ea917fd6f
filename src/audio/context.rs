//! Host audio contract consumed by the transport and the signal extractor.
//!
//! The real backend lives in [`super::output`]; tests drive a manual clock.

use std::sync::Arc;

use super::analyser::AnalyserTap;
use super::decode::PcmBuffer;

/// Handle to a one-shot sound-producing unit
pub type SourceId = u64;

/// Audio graph: reference clock, one-shot buffer sources, and the analyser tap.
///
/// Every source started here is routed source → analyser → gain → output.
/// A source can be started once; playing again means starting a new one.
pub trait AudioContext {
    /// Monotonic reference clock (seconds)
    fn current_time(&self) -> f64;

    /// Create a fresh source over `buffer` and start it `offset_s` seconds in
    fn start_source(&mut self, buffer: Arc<PcmBuffer>, offset_s: f64) -> SourceId;

    /// Stop and disconnect a source. Unknown or finished ids are ignored.
    fn stop_source(&mut self, id: SourceId);

    /// True once the source has played through the end of its buffer
    fn source_ended(&self, id: SourceId) -> bool;

    /// Analyser tap wired into the graph, if any
    fn analyser(&self) -> Option<&AnalyserTap>;
}

#[cfg(test)]
pub(crate) mod manual {
    use super::*;

    /// Test context with a hand-advanced clock that records every source call
    pub(crate) struct ManualContext {
        pub now: f64,
        pub next_id: SourceId,
        pub active: Option<SourceId>,
        pub started: Vec<(SourceId, f64)>,
        pub stopped: Vec<SourceId>,
        pub ended: Option<SourceId>,
        /// Number of times a source started while another was still live
        pub overlaps: usize,
        pub analyser: Option<AnalyserTap>,
    }

    impl ManualContext {
        pub fn new() -> Self {
            Self {
                now: 0.0,
                next_id: 1,
                active: None,
                started: Vec::new(),
                stopped: Vec::new(),
                ended: None,
                overlaps: 0,
                analyser: None,
            }
        }

        pub fn advance(&mut self, seconds: f64) {
            self.now += seconds;
        }

        /// Simulate the backend reaching the end of the active buffer
        pub fn finish_active(&mut self) {
            self.ended = self.active.take();
        }
    }

    impl AudioContext for ManualContext {
        fn current_time(&self) -> f64 {
            self.now
        }

        fn start_source(&mut self, _buffer: Arc<PcmBuffer>, offset_s: f64) -> SourceId {
            if self.active.is_some() {
                self.overlaps += 1;
            }
            let id = self.next_id;
            self.next_id += 1;
            self.started.push((id, offset_s));
            self.active = Some(id);
            id
        }

        fn stop_source(&mut self, id: SourceId) {
            self.stopped.push(id);
            if self.active == Some(id) {
                self.active = None;
            }
        }

        fn source_ended(&self, id: SourceId) -> bool {
            self.ended == Some(id)
        }

        fn analyser(&self) -> Option<&AnalyserTap> {
            self.analyser.as_ref()
        }
    }
}

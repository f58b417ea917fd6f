//! Background decoding so a long file never stalls the frame loop.
//!
//! Each request runs on its own thread and reports back over a channel.
//! Only the newest request is delivered; results of superseded requests
//! are dropped when they arrive.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;

use super::decode::{decode_bytes, PcmBuffer};
use crate::error::DecodeError;

/// Outcome of one decode request
#[derive(Debug)]
pub struct LoadedFile {
    pub name: String,
    pub result: Result<PcmBuffer, DecodeError>,
}

struct Job {
    generation: u64,
    file: LoadedFile,
}

/// Spawns decode threads and hands finished buffers back to the frame loop
pub struct DecodeWorker {
    tx: Sender<Job>,
    rx: Receiver<Job>,
    generation: u64,
    pending: Option<String>,
}

/// File name shown to the user for `path`
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl DecodeWorker {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tx,
            rx,
            generation: 0,
            pending: None,
        }
    }

    /// Name of the newest request still in flight
    pub fn pending(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    /// Read and decode `path` in the background; supersedes earlier requests
    pub fn load_path(&mut self, path: &Path) -> String {
        let name = display_name(path);
        let path: PathBuf = path.to_path_buf();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_owned);

        self.spawn(name.clone(), move || {
            let bytes = std::fs::read(&path)?;
            decode_bytes(bytes, extension.as_deref())
        });
        name
    }

    /// Decode an in-memory buffer in the background
    pub fn load_bytes(&mut self, name: String, bytes: Vec<u8>, extension: Option<String>) {
        self.spawn(name, move || decode_bytes(bytes, extension.as_deref()));
    }

    fn spawn<F>(&mut self, name: String, decode: F)
    where
        F: FnOnce() -> Result<PcmBuffer, DecodeError> + Send + 'static,
    {
        self.generation += 1;
        let generation = self.generation;
        let tx = self.tx.clone();
        self.pending = Some(name.clone());

        log::debug!("Decoding {} (request {})", name, generation);
        thread::spawn(move || {
            let result = decode();
            // Receiver is gone once the app has shut down
            let _ = tx.send(Job {
                generation,
                file: LoadedFile { name, result },
            });
        });
    }

    /// Non-blocking check for the newest finished request
    pub fn poll(&mut self) -> Option<LoadedFile> {
        loop {
            match self.rx.try_recv() {
                Ok(job) if job.generation == self.generation => {
                    self.pending = None;
                    return Some(job.file);
                }
                Ok(job) => log::debug!("Dropping superseded decode of {}", job.file.name),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => return None,
            }
        }
    }
}

impl Default for DecodeWorker {
    fn default() -> Self {
        Self::new()
    }
}

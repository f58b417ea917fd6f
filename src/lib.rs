//! Blobwave library - audio player with an audio-reactive blob

pub mod audio;
pub mod blob;
pub mod camera;
pub mod cli;
pub mod config;
pub mod error;
pub mod params;
pub mod player;
pub mod rendering;
pub mod ui;

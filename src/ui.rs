//! Transport surface: time readout, seek-slider mapping, and key bindings.

use winit::keyboard::KeyCode;

use crate::audio::TransportState;

/// Seek slider range (0 to this value maps onto 0 to duration)
pub const SLIDER_MAX: f64 = 100.0;

/// Seek step for arrow keys, in slider units
pub const SLIDER_STEP: f64 = 5.0;

/// User intent decoded from a key press
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    TogglePlay,
    /// Absolute slider value in [0, SLIDER_MAX]
    SeekTo(f64),
    /// Relative slider movement
    SeekBy(f64),
    Quit,
}

pub fn command_for_key(key: KeyCode) -> Option<Command> {
    let digit = match key {
        KeyCode::Space => return Some(Command::TogglePlay),
        KeyCode::Escape => return Some(Command::Quit),
        KeyCode::ArrowLeft => return Some(Command::SeekBy(-SLIDER_STEP)),
        KeyCode::ArrowRight => return Some(Command::SeekBy(SLIDER_STEP)),
        KeyCode::Digit0 => 0,
        KeyCode::Digit1 => 1,
        KeyCode::Digit2 => 2,
        KeyCode::Digit3 => 3,
        KeyCode::Digit4 => 4,
        KeyCode::Digit5 => 5,
        KeyCode::Digit6 => 6,
        KeyCode::Digit7 => 7,
        KeyCode::Digit8 => 8,
        KeyCode::Digit9 => 9,
        _ => return None,
    };
    Some(Command::SeekTo(digit as f64 * 10.0))
}

/// `m:ss` with floored minutes and seconds
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}

/// `position / duration` readout
pub fn readout(position: f64, duration: f64) -> String {
    format!("{} / {}", format_time(position), format_time(duration))
}

/// Slider value for the current position, 0 when nothing sensible is loaded
pub fn slider_value(position: f64, duration: f64) -> f64 {
    let value = position / duration * SLIDER_MAX;
    if value.is_finite() {
        value.clamp(0.0, SLIDER_MAX)
    } else {
        0.0
    }
}

/// Map a slider value onto a seek fraction in [0, 1]
pub fn slider_to_fraction(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        (value / SLIDER_MAX).clamp(0.0, 1.0)
    }
}

/// Window title showing file, play state, and time readout
pub fn window_title(
    file_name: Option<&str>,
    state: TransportState,
    position: f64,
    duration: f64,
    notice: Option<&str>,
) -> String {
    let mut title = String::from("blobwave");

    match file_name {
        Some(name) => {
            let symbol = match state {
                TransportState::Playing => "▶",
                _ => "⏸",
            };
            title.push_str(&format!(
                " - {} {} {}",
                name,
                symbol,
                readout(position, duration)
            ));
        }
        None => title.push_str(" - drop an audio file"),
    }

    if let Some(notice) = notice {
        title.push_str(&format!(" [{}]", notice));
    }
    title
}

//! Color palette shared by all UI components.

use ratatui::style::Color;

pub const COLOR_BORDER: Color = Color::DarkGray;
pub const COLOR_HEADER: Color = Color::Cyan;
pub const COLOR_ACCENT: Color = Color::Magenta;
pub const COLOR_DIM: Color = Color::Gray;
pub const COLOR_USER: Color = Color::Yellow;
pub const COLOR_ACTIVE: Color = Color::Green;
pub const COLOR_ERROR: Color = Color::Red;

/// Frames for the in-progress spinner, advanced once per app tick.
pub const SPINNER_FRAMES: [&str; 4] = ["|", "/", "-", "\\"];

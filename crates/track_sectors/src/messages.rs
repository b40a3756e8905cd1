//! Explanatory text shown in place of the timing window when timing is disabled

use contracts::{Color, OverlaySurface, Widget};
use lap_engine::UnsupportedEnvironment;

/// Lines per message
pub const MESSAGE_LINES: usize = 4;

pub fn disabled_message(reason: UnsupportedEnvironment) -> [&'static str; MESSAGE_LINES] {
    match reason {
        UnsupportedEnvironment::ExtensionTooOld { .. } => [
            "Sector timing needs the custom shaders patch.",
            "Install or upgrade it to version 1.78 or newer",
            "and restart the session.",
            "",
        ],
        UnsupportedEnvironment::MissingAiLine => [
            "This track has no AI line. Free-roam maps and some mods",
            "ship without one, and sector timing cannot follow",
            "lap progress without it. Add an AI line to the track",
            "to enable sector timing here.",
        ],
        UnsupportedEnvironment::NotLive => [
            "Sector timing only runs during live driving.",
            "Replays can jump around the track at any moment,",
            "so lap progress cannot be followed reliably",
            "while one is playing.",
        ],
    }
}

/// Replace the timing rows with the message for `reason`
pub fn show_disabled(surface: &dyn OverlaySurface, reason: UnsupportedEnvironment) {
    for (line, text) in disabled_message(reason).iter().enumerate() {
        let widget = Widget::ErrorLine(line);
        surface.set_text(widget, text);
        surface.set_color(widget, Color::RED);
        surface.set_visible(widget, true);
    }
}

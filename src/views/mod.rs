pub mod common;
pub mod debug;
pub mod help_overlay;
pub mod html;
pub mod media;
pub mod spinner;
pub mod status_bar;
pub mod timeline;


use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};

use crate::app::App;

/// Draws the whole screen: timeline, optional debug pane, then overlays.
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let (main_area, debug_area) = if app.debug.visible {
        let chunks = Layout::vertical([
            Constraint::Min(0),     // Main content
            Constraint::Length(10), // Debug pane
        ])
        .split(area);
        (chunks[0], Some(chunks[1]))
    } else {
        (area, None)
    };

    timeline::render(frame, app, main_area);

    if let Some(debug_area) = debug_area {
        debug::render(frame, app, debug_area);
    }

    media::render(frame, app, main_area);
    help_overlay::render(frame, app, area);
}

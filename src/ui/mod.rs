mod detail;
mod help;
mod image;
mod list;

use crate::api::PhotoSource;
use crate::app::App;
use crate::nav::Screen;
use ratatui::Frame;

/// Top-level render dispatch.
pub fn render<S: PhotoSource>(app: &App<S>, frame: &mut Frame) {
    match app.nav.screen() {
        Screen::List => list::render(app, frame),
        Screen::Detail => detail::render(app, frame),
    }

    // Render help overlay on top if active
    if app.show_help {
        help::render(frame);
    }
}

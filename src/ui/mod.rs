//! UI rendering module

mod dashboard;
mod overlays;
mod widgets;

use crate::app::{App, InputMode};
use crate::backend::Backend;
use ratatui::Frame;

/// Main render function - dispatches to appropriate view
pub fn render<B: Backend + 'static>(frame: &mut Frame, app: &mut App<B>) {
    // Base view
    dashboard::render(frame, app);

    match &app.input_mode {
        InputMode::Normal => {}
        InputMode::Help => overlays::help::render(frame),
        InputMode::Import { path } => overlays::import::render(frame, path),
        InputMode::ConfirmDelete { name, .. } => overlays::confirm::render(
            frame,
            &format!(" Delete {name} "),
            crate::constants::PROMPT_DELETE_PROFILE,
        ),
        InputMode::ConfirmDisconnectOthers { .. } => overlays::confirm::render(
            frame,
            " Active sessions ",
            crate::constants::PROMPT_DISCONNECT_OTHERS,
        ),
        InputMode::Credentials(form) => overlays::credentials::render(frame, form),
    }

    if app.connection.is_connecting() {
        overlays::progress::render(frame, app);
    }

    // Render toast notification if present
    if app.toast.is_some() {
        overlays::toast::render(frame, app);
    }
}

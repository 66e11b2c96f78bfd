//! Footer widget with context-aware keybinding hints

use crate::app::{App, InputMode};
use crate::backend::Backend;
use crate::theme;
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Render dashboard footer with shortcuts for the current mode
pub fn render_dashboard<B: Backend + 'static>(frame: &mut Frame, app: &App<B>, area: Rect) {
    if app.connection.is_connecting() {
        render_hints(frame, area, &[("Esc", "Cancel"), ("q", "Cancel & Quit")]);
        return;
    }

    let hints: Vec<(&str, &str)> = match app.input_mode {
        InputMode::Normal => {
            let mut hints = Vec::new();
            if let Some(record) = app.selected_record() {
                let toggle = if record.has_session() {
                    "Disconnect"
                } else {
                    "Connect"
                };
                hints.push(("Enter", toggle));
                hints.push(("x", "Delete"));
            }
            hints.extend_from_slice(&[("i", "Import"), ("r", "Refresh"), ("?", "Help")]);
            hints.push(("q", "Quit"));
            hints
        }
        InputMode::Credentials(_) => vec![("Tab", "Next"), ("Enter", "Connect"), ("Esc", "Back")],
        InputMode::Import { .. } => vec![("Enter", "Import"), ("Esc", "Back")],
        InputMode::ConfirmDelete { .. } | InputMode::ConfirmDisconnectOthers { .. } => {
            vec![("y", "Yes"), ("n", "No")]
        }
        InputMode::Help => vec![("any key", "Close")],
    };
    render_hints(frame, area, &hints);
}

fn render_hints(frame: &mut Frame, area: Rect, hints: &[(&str, &str)]) {
    let [hints_area, branding_area] =
        Layout::horizontal([Constraint::Min(0), Constraint::Length(18)]).areas(area);

    let mut hint_spans = vec![Span::raw(" ")];
    let mut current_width = 1;
    let max_width = usize::from(hints_area.width);

    for (i, (key, action)) in hints.iter().enumerate() {
        // "key action", plus " │ " before every item but the first
        let sep_width = if i > 0 { 3 } else { 0 };
        let item_width = key.chars().count() + 1 + action.chars().count() + sep_width;
        if current_width + item_width > max_width {
            break;
        }

        if i > 0 {
            hint_spans.push(Span::styled(
                " │ ",
                Style::default().fg(Color::Rgb(50, 50, 50)),
            ));
        }
        hint_spans.push(Span::styled(
            *key,
            Style::default()
                .fg(theme::ACCENT_PRIMARY)
                .add_modifier(Modifier::BOLD),
        ));
        hint_spans.push(Span::raw(" "));
        hint_spans.push(Span::styled(*action, Style::default().fg(Color::DarkGray)));

        current_width += item_width;
    }
    frame.render_widget(Paragraph::new(Line::from(hint_spans)), hints_area);

    let branding = Line::from(Span::styled(
        format!(
            "{} v{} ",
            crate::constants::APP_NAME,
            crate::constants::APP_VERSION
        ),
        Style::default().fg(theme::NORD_POLAR_NIGHT_4),
    ));
    frame.render_widget(
        Paragraph::new(branding).alignment(Alignment::Right),
        branding_area,
    );
}

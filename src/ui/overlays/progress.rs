//! Connect progress popup

use super::centered_rect;
use crate::app::App;
use crate::backend::Backend;
use crate::constants;
use crate::state::ConnectionState;
use crate::theme;
use ratatui::{
    layout::Alignment,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub fn render<B: Backend + 'static>(frame: &mut Frame, app: &App<B>) {
    let ConnectionState::Connecting {
        started,
        profile,
        phase,
        session,
        cancel,
    } = &app.connection
    else {
        return;
    };

    let area = centered_rect(60, 8, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::WARNING))
        .title(format!(" {profile} "))
        .title_bottom(Line::from(constants::TITLE_PROGRESS_FOOTER).centered());

    #[allow(clippy::cast_possible_truncation)]
    let spinner = SPINNER[(app.frame_count % SPINNER.len() as u64) as usize];
    let state = if cancel.is_cancelled() {
        "Cancelling".to_string()
    } else {
        phase.to_string()
    };

    let text = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(format!("{spinner} "), Style::default().fg(theme::WARNING)),
            Span::styled(
                state,
                Style::default()
                    .fg(theme::TEXT_PRIMARY)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {}s", started.elapsed().as_secs()),
                Style::default().fg(theme::TEXT_SECONDARY),
            ),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            session
                .as_ref()
                .map_or_else(String::new, ToString::to_string),
            Style::default().fg(theme::TEXT_SECONDARY),
        )),
    ];
    frame.render_widget(
        Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center),
        area,
    );
}

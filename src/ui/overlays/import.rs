//! Profile import prompt

use super::centered_rect;
use crate::constants;
use crate::theme;
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

pub fn render(frame: &mut Frame, path: &str) {
    let area = centered_rect(70, 6, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::BORDER_FOCUSED))
        .title(constants::TITLE_IMPORT_PROFILE)
        .title_bottom(Line::from(constants::TITLE_IMPORT_FOOTER).centered());

    let text = vec![
        Line::from(Span::styled(
            constants::PROMPT_IMPORT_PATH,
            Style::default().fg(theme::TEXT_SECONDARY),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("> ", Style::default().fg(theme::ACCENT_PRIMARY)),
            Span::styled(
                path.to_string(),
                Style::default()
                    .fg(theme::TEXT_PRIMARY)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("█", Style::default().fg(theme::ACCENT_PRIMARY)),
        ]),
    ];
    frame.render_widget(Paragraph::new(text).block(block), area);
}

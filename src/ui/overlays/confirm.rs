//! Yes/no confirmation dialog

use super::centered_rect;
use crate::theme;
use ratatui::{
    layout::Alignment,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

pub fn render(frame: &mut Frame, title: &str, prompt: &str) {
    let area = centered_rect(52, 7, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::WARNING))
        .title(Span::styled(
            title.to_string(),
            Style::default()
                .fg(theme::WARNING)
                .add_modifier(Modifier::BOLD),
        ))
        .title_bottom(Line::from(" [y] Yes  [n] No ").centered());

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            prompt.to_string(),
            Style::default().fg(theme::TEXT_PRIMARY),
        )),
    ];
    frame.render_widget(
        Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        area,
    );
}

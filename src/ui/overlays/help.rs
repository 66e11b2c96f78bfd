//! Key binding reference

use super::centered_rect;
use crate::theme;
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

const BINDINGS: &[(&str, &str)] = &[
    ("↑/k ↓/j", "Move selection"),
    ("Enter/c", "Connect or disconnect"),
    ("x/Del", "Delete profile"),
    ("i", "Import profile"),
    ("r", "Refresh"),
    ("PgUp/PgDn", "Scroll activity"),
    ("End", "Follow activity"),
    ("Esc", "Cancel connect / close dialog"),
    ("q/Ctrl-C", "Quit"),
];

pub fn render(frame: &mut Frame) {
    #[allow(clippy::cast_possible_truncation)]
    let height = BINDINGS.len() as u16 + 2;
    let area = centered_rect(50, height, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::BORDER_FOCUSED))
        .title(" Help ")
        .title_bottom(Line::from(" any key to close ").centered());

    let lines: Vec<Line> = BINDINGS
        .iter()
        .map(|(key, action)| {
            Line::from(vec![
                Span::styled(
                    format!(" {key:<11}"),
                    Style::default()
                        .fg(theme::ACCENT_PRIMARY)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(*action, Style::default().fg(theme::TEXT_PRIMARY)),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

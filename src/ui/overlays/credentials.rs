//! Credentials dialog shown before a connect attempt

use super::centered_rect;
use crate::constants;
use crate::state::CredentialsForm;
use crate::theme;
use ratatui::{
    layout::{Constraint, Layout},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

pub fn render(frame: &mut Frame, form: &CredentialsForm) {
    let area = centered_rect(56, 11, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::BORDER_FOCUSED))
        .title(format!("{}{} ", constants::TITLE_CREDENTIALS, form.profile.name))
        .title_bottom(Line::from(constants::TITLE_CREDENTIALS_FOOTER).centered());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(2),
        Constraint::Length(2),
        Constraint::Length(2),
        Constraint::Min(0),
    ])
    .split(inner);

    for (field, row) in CredentialsForm::fields().iter().zip(rows.iter().skip(1)) {
        let focused = form.focus == *field;
        let label_style = if focused {
            Style::default()
                .fg(theme::ACCENT_PRIMARY)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme::TEXT_SECONDARY)
        };
        let mut spans = vec![
            Span::styled(format!(" {:<15}", field.label()), label_style),
            Span::styled(
                form.display_value(*field),
                Style::default().fg(theme::TEXT_PRIMARY),
            ),
        ];
        if focused {
            spans.push(Span::styled("█", Style::default().fg(theme::ACCENT_PRIMARY)));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), *row);
    }
}

//! Toast notification overlay

use crate::app::App;
use crate::backend::Backend;
use crate::state::ToastType;
use crate::theme;
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Render toast notification
pub fn render<B: Backend + 'static>(frame: &mut Frame, app: &App<B>) {
    let Some(toast) = &app.toast else {
        return;
    };
    let area = frame.area();
    let width = (area.width / 3).clamp(30, 60).min(area.width);

    // Each message line wraps on its own
    let inner_width = usize::from(width.saturating_sub(4)).max(1);
    let text_lines: usize = toast
        .message
        .lines()
        .map(|line| line.chars().count().div_ceil(inner_width).max(1))
        .sum();
    let text_lines = u16::try_from(text_lines).unwrap_or(u16::MAX);
    let height = text_lines.saturating_add(4).max(7).min(area.height);

    let toast_area = Rect {
        x: area.x + (area.width / 2).saturating_sub(width / 2),
        y: area.y + (area.height / 2).saturating_sub(height / 2),
        width,
        height,
    };

    frame.render_widget(Clear, toast_area);

    let (title, color) = match toast.toast_type {
        ToastType::Info => (" INFO ", theme::ACCENT_PRIMARY),
        ToastType::Success => (" SUCCESS ", theme::SUCCESS),
        ToastType::Warning => (" WARNING ", theme::WARNING),
        ToastType::Error => (" ERROR ", theme::ERROR),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(Span::styled(
            title,
            Style::default()
                .fg(Color::Black)
                .bg(color)
                .add_modifier(Modifier::BOLD),
        ));

    let inner_area = block.inner(toast_area);
    frame.render_widget(block, toast_area);

    let [_, text_area, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(text_lines),
        Constraint::Fill(1),
    ])
    .areas(inner_area);

    let paragraph = Paragraph::new(toast.message.as_str())
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, text_area);
}

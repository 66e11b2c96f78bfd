//! Main view: status bar, profile table and activity log

use crate::app::App;
use crate::backend::Backend;
use crate::constants;
use crate::state::ConnectionRecord;
use crate::theme;
use crate::ui::widgets::footer;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

pub fn render<B: Backend + 'static>(frame: &mut Frame, app: &mut App<B>) {
    let [header, body, activity, footer_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(6),
        Constraint::Length(10),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    render_status(frame, app, header);
    render_records(frame, app, body);
    render_activity(frame, app, activity);
    footer::render_dashboard(frame, app, footer_area);
}

fn render_status<B: Backend + 'static>(frame: &mut Frame, app: &App<B>, area: Rect) {
    let color = if app.connection.is_connecting() {
        theme::WARNING
    } else if app.status_line.starts_with("Connected") {
        theme::SUCCESS
    } else {
        theme::TEXT_SECONDARY
    };
    let text = match app.connection.connecting_profile() {
        Some(profile) => format!("Connecting to {profile}..."),
        None => app.status_line.clone(),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::BORDER_DEFAULT))
        .title(Span::styled(
            format!(" {} ", constants::APP_NAME),
            Style::default()
                .fg(theme::ACCENT_PRIMARY)
                .add_modifier(Modifier::BOLD),
        ));
    let line = Line::from(vec![
        Span::styled(" ● ", Style::default().fg(color)),
        Span::styled(text, Style::default().fg(theme::TEXT_PRIMARY)),
    ]);
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn session_cell(record: &ConnectionRecord, connecting: Option<&str>) -> Cell<'static> {
    if connecting == Some(record.name.as_str()) {
        return Cell::from(Span::styled(
            "Connecting",
            Style::default().fg(theme::WARNING),
        ));
    }
    match (&record.session, record.is_synthetic()) {
        (Some(_), true) => Cell::from(Span::styled(
            constants::MSG_STALE_SESSION,
            Style::default().fg(theme::STALE),
        )),
        (Some(session), false) => Cell::from(Span::styled(
            session.to_string(),
            Style::default().fg(theme::SUCCESS),
        )),
        (None, _) => Cell::from(Span::styled("-", Style::default().fg(theme::TEXT_SECONDARY))),
    }
}

fn render_records<B: Backend + 'static>(frame: &mut Frame, app: &mut App<B>, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::BORDER_FOCUSED))
        .title(" Profiles ");

    if app.records.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                constants::MSG_NO_RECORDS,
                Style::default().fg(theme::TEXT_SECONDARY),
            ))
            .block(block),
            area,
        );
        return;
    }

    let connecting = app.connection.connecting_profile();
    let rows: Vec<Row> = app
        .records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            Row::new(vec![
                Cell::from(format!("{}", i + 1)),
                Cell::from(record.name.clone()),
                session_cell(record, connecting),
            ])
        })
        .collect();

    let header = Row::new(vec!["#", constants::LABEL_PROFILE, constants::LABEL_SESSION]).style(
        Style::default()
            .fg(theme::ACCENT_SECONDARY)
            .add_modifier(Modifier::BOLD),
    );
    let table = Table::new(
        rows,
        [
            Constraint::Length(3),
            Constraint::Percentage(40),
            Constraint::Fill(1),
        ],
    )
    .header(header)
    .block(block)
    .row_highlight_style(
        Style::default()
            .bg(theme::ROW_SELECTED_BG)
            .fg(theme::ROW_SELECTED_FG)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("▶ ");

    frame.render_stateful_widget(table, area, &mut app.table_state);
}

fn render_activity<B: Backend + 'static>(frame: &mut Frame, app: &mut App<B>, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::BORDER_DEFAULT))
        .title(" Activity ");

    let visible = area.height.saturating_sub(2);
    let total = u16::try_from(app.logs.len()).unwrap_or(u16::MAX);
    let max_scroll = total.saturating_sub(visible);
    if app.logs_auto_scroll || app.logs_scroll > max_scroll {
        app.logs_scroll = max_scroll;
    }

    let lines: Vec<Line> = app
        .logs
        .iter()
        .map(|entry| Line::from(Span::styled(entry.as_str(), Style::default().fg(theme::TEXT_PRIMARY))))
        .collect();
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .scroll((app.logs_scroll, 0)),
        area,
    );
}

//! UI rendering for the council client.
//!
//! Layout: a sidebar with the conversation list, the transcript pane, the
//! input box, and a one-line status bar. Rendering is pure over [`App`];
//! the main loop redraws whenever the app is dirty.

mod conversation;
mod theme;

pub use theme::SPINNER_FRAMES;

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use crate::app::App;
use conversation::render_transcript;
use theme::{COLOR_ACTIVE, COLOR_BORDER, COLOR_DIM, COLOR_ERROR, COLOR_HEADER};

pub fn render(frame: &mut Frame, app: &App) {
    let [main_area, input_area, status_area] = Layout::vertical([
        Constraint::Min(3),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    let [sidebar_area, transcript_area] =
        Layout::horizontal([Constraint::Length(32), Constraint::Min(20)]).areas(main_area);

    render_sidebar(frame, app, sidebar_area);
    render_transcript(frame, app, transcript_area);
    render_input(frame, app, input_area);
    render_status(frame, app, status_area);
}

fn render_sidebar(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .conversations
        .iter()
        .enumerate()
        .map(|(i, meta)| {
            let title = if meta.title.is_empty() {
                "(untitled)"
            } else {
                meta.title.as_str()
            };
            let style = if i == app.selected {
                Style::default().fg(COLOR_ACTIVE).bold()
            } else {
                Style::default()
            };
            ListItem::new(Line::from(vec![
                Span::styled(title.to_string(), style),
                Span::styled(
                    format!(" ({})", meta.message_count),
                    Style::default().fg(COLOR_DIM),
                ),
            ]))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(COLOR_BORDER))
            .title(" conversations "),
    );
    frame.render_widget(list, area);
}

fn render_input(frame: &mut Frame, app: &App, area: Rect) {
    let title = if app.busy { " streaming… " } else { " message " };
    let input = Paragraph::new(app.input.as_str()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(if app.busy { COLOR_DIM } else { COLOR_HEADER }))
            .title(title),
    );
    frame.render_widget(input, area);
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let line = match &app.status {
        Some(status) => Line::from(Span::styled(
            status.as_str(),
            Style::default().fg(COLOR_ERROR),
        )),
        None => Line::from(Span::styled(
            "Enter: send/open  Ctrl+N: new  Ctrl+R: refresh  PgUp/PgDn: scroll  Ctrl+Q: quit",
            Style::default().fg(COLOR_DIM),
        )),
    };
    frame.render_widget(Paragraph::new(line), area);
}

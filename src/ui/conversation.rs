//! Transcript rendering: turns and their three phases.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::app::App;
use crate::transcript::{AssistantTurn, Turn};

use super::theme::{
    COLOR_ACCENT, COLOR_ACTIVE, COLOR_BORDER, COLOR_DIM, COLOR_ERROR, COLOR_HEADER, COLOR_USER,
    SPINNER_FRAMES,
};

pub fn render_transcript(frame: &mut Frame, app: &App, area: Rect) {
    let title = match &app.active_id {
        Some(_) => " conversation ",
        None => " council ",
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(COLOR_BORDER))
        .title(title);

    let mut lines: Vec<Line> = Vec::new();
    if app.active_id.is_none() {
        lines.push(Line::from(Span::styled(
            "Open a conversation (Enter) or create one (Ctrl+N).",
            Style::default().fg(COLOR_DIM),
        )));
    }
    for turn in &app.transcript.turns {
        match turn {
            Turn::User { content } => {
                lines.push(Line::default());
                lines.push(Line::from(Span::styled(
                    format!("❯ {}", content),
                    Style::default().fg(COLOR_USER).bold(),
                )));
            }
            Turn::Assistant(assistant) => {
                push_assistant_lines(&mut lines, assistant, app.tick);
            }
        }
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.scroll, 0));
    frame.render_widget(paragraph, area);
}

fn spinner(tick: usize) -> &'static str {
    SPINNER_FRAMES[tick % SPINNER_FRAMES.len()]
}

fn phase_header<'a>(label: &'a str, active: bool, tick: usize) -> Line<'a> {
    let mut spans = vec![Span::styled(
        format!("── {} ", label),
        Style::default().fg(COLOR_HEADER),
    )];
    if active {
        spans.push(Span::styled(
            format!("{} ", spinner(tick)),
            Style::default().fg(COLOR_ACTIVE),
        ));
    }
    Line::from(spans)
}

fn push_assistant_lines(lines: &mut Vec<Line<'_>>, turn: &AssistantTurn, tick: usize) {
    // Phase 1: individual answers
    if turn.answers.is_some() || turn.progress.answers {
        lines.push(phase_header("council answers", turn.progress.answers, tick));
        if let Some(answers) = &turn.answers {
            for answer in answers {
                lines.push(Line::from(Span::styled(
                    format!("  {}", answer.model),
                    Style::default().fg(COLOR_ACCENT),
                )));
                for text_line in answer.content.lines() {
                    lines.push(Line::from(format!("    {}", text_line)));
                }
            }
        }
    }

    // Phase 2: peer rankings (empty list = explicitly skipped)
    if turn.rankings.is_some() || turn.progress.rankings {
        lines.push(phase_header("peer rankings", turn.progress.rankings, tick));
        match &turn.rankings {
            Some(rankings) if rankings.is_empty() => {
                lines.push(Line::from(Span::styled(
                    "  skipped",
                    Style::default().fg(COLOR_DIM),
                )));
            }
            Some(rankings) => {
                for ranking in rankings {
                    let order = if ranking.parsed_ranking.is_empty() {
                        "(unparsed)".to_string()
                    } else {
                        ranking.parsed_ranking.join(" > ")
                    };
                    lines.push(Line::from(vec![
                        Span::styled(
                            format!("  {}: ", ranking.model),
                            Style::default().fg(COLOR_ACCENT),
                        ),
                        Span::raw(order),
                    ]));
                }
            }
            None => {}
        }
    }

    // Phase 3: the chairman's synthesis
    if turn.synthesis.is_some() || turn.progress.synthesis {
        lines.push(phase_header("final synthesis", turn.progress.synthesis, tick));
        if let Some(synthesis) = &turn.synthesis {
            for text_line in synthesis.content.lines() {
                lines.push(Line::from(format!("  {}", text_line)));
            }
        }
    }

    for failure in &turn.failures {
        lines.push(Line::from(Span::styled(
            format!("  ✗ {}: {}", failure.source, failure.detail),
            Style::default().fg(COLOR_ERROR),
        )));
    }
}

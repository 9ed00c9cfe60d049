use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::model::Difficulty;
use crate::state::QuizApp;
use crate::store::KeyValueStore;

pub fn draw_home<S: KeyValueStore>(f: &mut Frame, area: Rect, app: &QuizApp<S>) {
    let mut lines = vec![
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled(
            "Welcome to the Trivia Quiz!",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(format!(
            "Each question gives you {} seconds. Good luck!",
            app.seconds_per_question()
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Select difficulty",
            Style::default().fg(Color::Gray),
        )),
        Line::from(""),
    ];

    for difficulty in Difficulty::ALL {
        let selected = difficulty == app.difficulty();
        let label = format!(
            "{} {}",
            if selected { "▶" } else { " " },
            capitalize(difficulty.as_str())
        );
        let style = if selected {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        lines.push(Line::from(Span::styled(format!(" {:<10}", label), style)));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("High score: {}", app.high_score()),
        Style::default().fg(Color::Yellow),
    )));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "[Enter] Start Quiz",
        Style::default().fg(Color::Green),
    )));

    let block = Block::default().borders(Borders::ALL);
    let widget = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center);
    f.render_widget(widget, area);
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

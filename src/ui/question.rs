use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph, Wrap};
use ratatui::Frame;

use crate::model::Answer;
use crate::state::QuizApp;
use crate::store::KeyValueStore;
use crate::tui::View;

const FALLBACK_ERROR: &str = "Failed to fetch questions. Please try again.";

pub fn draw_question<S: KeyValueStore>(f: &mut Frame, area: Rect, app: &QuizApp<S>, view: &View) {
    let Some(question) = app.current_question() else {
        draw_loading(f, area, app);
        return;
    };

    let block = Block::default().borders(Borders::ALL);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // position
            Constraint::Length(1), // progress
            Constraint::Length(1),
            Constraint::Min(3), // question + options
            Constraint::Length(1), // buttons
        ])
        .split(inner);

    let number = app.current_question_index() + 1;
    let total = app.questions().len();

    let position = Paragraph::new(Line::from(Span::styled(
        format!(" Question {} of {}", number, total),
        Style::default().fg(Color::Gray),
    )));
    f.render_widget(position, rows[0]);

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::LightBlue).bg(Color::Rgb(40, 40, 40)))
        .ratio(number as f64 / total.max(1) as f64)
        .label("");
    f.render_widget(gauge, rows[1]);

    let answer = app.current_answer();
    let mut lines: Vec<Line> = vec![
        Line::from(Span::styled(
            question.question.clone(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    for (i, option) in question.options.iter().enumerate() {
        let marker = if answer.is_none() && i == view.cursor {
            "▶"
        } else {
            " "
        };
        let style = option_style(option, &question.correct_answer, answer, i == view.cursor);
        lines.push(Line::from(vec![
            Span::raw(format!(" {} ", marker)),
            Span::styled(format!("{}. {}", i + 1, option), style),
        ]));
    }

    if matches!(answer, Some(Answer::TimedOut)) {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" ⏰ {}", Answer::TimedOut.as_str()),
            Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD),
        )));
    }

    let body = Paragraph::new(lines).wrap(Wrap { trim: false });
    f.render_widget(body, rows[3]);

    let enabled = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let disabled = Style::default().fg(Color::DarkGray);
    let next_label = if app.is_last_question() {
        "Finish [→]"
    } else {
        "Next [→]"
    };
    let buttons = Line::from(vec![
        Span::styled(
            " [←] Previous",
            if app.can_go_previous() { enabled } else { disabled },
        ),
        Span::raw("    "),
        Span::styled(
            next_label,
            if app.can_go_next() { enabled } else { disabled },
        ),
    ]);
    f.render_widget(Paragraph::new(buttons), rows[4]);
}

/// Before answering only the cursor stands out; afterwards the correct
/// option is green and a wrong pick is red.
fn option_style(option: &str, correct: &str, answer: Option<&Answer>, under_cursor: bool) -> Style {
    match answer {
        None if under_cursor => Style::default()
            .fg(Color::Black)
            .bg(Color::LightBlue),
        None => Style::default().fg(Color::White),
        Some(_) if option == correct => Style::default()
            .fg(Color::Black)
            .bg(Color::Green),
        Some(Answer::Selected(picked)) if picked == option => Style::default()
            .fg(Color::White)
            .bg(Color::Red),
        Some(_) => Style::default().fg(Color::DarkGray),
    }
}

pub fn draw_loading<S: KeyValueStore>(f: &mut Frame, area: Rect, app: &QuizApp<S>) {
    let lines = vec![
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled(
            "Loading questions...",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(format!("Difficulty: {}", app.difficulty())),
        Line::from(""),
    ];

    let block = Block::default().borders(Borders::ALL);
    let widget = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center);
    f.render_widget(widget, area);
}

pub fn draw_error<S: KeyValueStore>(f: &mut Frame, area: Rect, app: &QuizApp<S>) {
    let message = app.error().unwrap_or(FALLBACK_ERROR);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "✗  Something went wrong",
            Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(message.to_string()),
        Line::from(""),
        Line::from(Span::styled(
            "[r] Try Again",
            Style::default().fg(Color::Green),
        )),
        Line::from(""),
    ];

    let block = Block::default().borders(Borders::ALL);
    let widget = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false });
    f.render_widget(widget, area);
}

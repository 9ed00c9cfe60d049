use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::state::QuizApp;
use crate::store::KeyValueStore;
use crate::tui::View;

pub fn draw_results<S: KeyValueStore>(f: &mut Frame, area: Rect, app: &QuizApp<S>, view: &View) {
    let block = Block::default().borders(Borders::ALL);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let banner_height = if app.is_new_high_score() { 6 } else { 5 };
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(banner_height),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(inner);

    let mut header = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Quiz Completed!",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::raw("You scored "),
            Span::styled(
                app.score().to_string(),
                Style::default()
                    .fg(Color::LightBlue)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(" out of {}", app.questions().len())),
        ]),
        Line::from(Span::styled(
            format!("High score: {}", app.high_score()),
            Style::default().fg(Color::Gray),
        )),
    ];
    if app.is_new_high_score() {
        header.push(Line::from(Span::styled(
            "★ New High Score! ★",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )));
    }
    f.render_widget(
        Paragraph::new(header).alignment(Alignment::Center),
        rows[0],
    );

    let mut review: Vec<Line> = vec![Line::from(Span::styled(
        " Review Your Answers",
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    for (i, question) in app.questions().iter().enumerate() {
        let answer = app.user_answers().get(&i);
        let correct = answer.is_some_and(|a| a.is_correct_for(question));

        review.push(Line::from(""));
        review.push(Line::from(Span::styled(
            format!(" {}. {}", i + 1, question.question),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        review.push(Line::from(Span::styled(
            format!(
                "    Your answer: {}",
                answer.map(|a| a.as_str()).unwrap_or("Not answered")
            ),
            Style::default().fg(if correct { Color::Green } else { Color::Red }),
        )));
        if !correct {
            review.push(Line::from(Span::styled(
                format!("    Correct answer: {}", question.correct_answer),
                Style::default().fg(Color::Gray),
            )));
        }
    }

    let max_scroll = (review.len() as u16).saturating_sub(rows[1].height);
    let list = Paragraph::new(review)
        .wrap(Wrap { trim: false })
        .scroll((view.results_scroll.min(max_scroll), 0));
    f.render_widget(list, rows[1]);

    let footer = Paragraph::new(Line::from(Span::styled(
        "[Enter] Restart Quiz",
        Style::default().fg(Color::Green),
    )))
    .alignment(Alignment::Center);
    f.render_widget(footer, rows[2]);
}

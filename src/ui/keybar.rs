use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::model::QuizState;
use crate::state::QuizApp;
use crate::store::KeyValueStore;

pub fn draw_keybar<S: KeyValueStore>(f: &mut Frame, area: Rect, app: &QuizApp<S>) {
    let bindings: Vec<(&str, &str)> = match app.quiz_state() {
        QuizState::Start => vec![("↑/↓", "difficulty"), ("Enter", "start"), ("q", "quit")],
        QuizState::Loading => vec![("q", "quit")],
        QuizState::Ongoing if app.current_answer().is_some() => vec![
            ("Enter/→", if app.is_last_question() { "finish" } else { "next" }),
            ("←", "previous"),
            ("q", "quit"),
        ],
        QuizState::Ongoing => vec![
            ("↑/↓", "choose"),
            ("1-4/Enter", "answer"),
            ("←", "previous"),
            ("q", "quit"),
        ],
        QuizState::Error => vec![("r", "retry"), ("q", "quit")],
        QuizState::Results => vec![("↑/↓", "scroll"), ("Enter", "restart"), ("q", "quit")],
    };

    let mut spans: Vec<Span> = vec![Span::raw(" ")];
    for (i, (key, action)) in bindings.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("   "));
        }
        spans.push(Span::styled(
            key.to_string(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw(format!(" {}", action)));
    }

    let line = Line::from(spans);
    let widget = Paragraph::new(line).style(Style::default().bg(Color::Rgb(20, 20, 20)));
    f.render_widget(widget, area);
}

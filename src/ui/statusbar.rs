use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::state::QuizApp;
use crate::store::KeyValueStore;
use crate::tui::View;

pub fn draw_statusbar<S: KeyValueStore>(f: &mut Frame, area: Rect, app: &QuizApp<S>, view: &View) {
    let answered = app.user_answers().len();
    let total = app.questions().len();

    let mut spans = vec![
        Span::raw(" "),
        Span::styled(
            format!("◆ {}", app.difficulty()),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw("   "),
        Span::styled(
            format!("✓ {}/{} answered", answered, total),
            Style::default().fg(Color::Green),
        ),
        Span::raw("   "),
        Span::styled(
            format!("★ best {}", app.high_score()),
            Style::default().fg(Color::Yellow),
        ),
    ];

    if let Some(saved) = view.last_saved {
        spans.push(Span::raw("   "));
        spans.push(Span::styled(
            format!("saved {}", saved.format("%H:%M:%S")),
            Style::default().fg(Color::DarkGray),
        ));
    }

    if let Some(notice) = &view.notice {
        spans.push(Span::raw("   "));
        spans.push(Span::styled(
            notice.clone(),
            Style::default().fg(Color::Red),
        ));
    }

    let widget = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Rgb(30, 30, 30)));
    f.render_widget(widget, area);
}

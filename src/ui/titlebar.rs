use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::state::QuizApp;
use crate::store::KeyValueStore;
use crate::timer::format_seconds;

const TITLE: &str = "[ Trivia Quiz ]";

pub fn draw_titlebar<S: KeyValueStore>(f: &mut Frame, area: Rect, app: &QuizApp<S>) {
    let timer_text = match app.remaining_seconds() {
        Some(secs) => {
            let formatted = format!(" Time {} ", format_seconds(secs));
            if secs <= 5 {
                Span::styled(
                    formatted,
                    Style::default()
                        .fg(Color::White)
                        .bg(Color::Red)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                Span::styled(formatted, Style::default().fg(Color::Rgb(200, 200, 120)))
            }
        }
        None => Span::raw(""),
    };

    let title_span = Span::styled(
        TITLE,
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    );

    // Title centered on the full width, timer pushed to the right edge
    let available = area.width as usize;
    let timer_len = timer_text.content.chars().count();
    let title_len = TITLE.len();
    let center_pad = available.saturating_sub(title_len) / 2;
    let right_pad = available.saturating_sub(center_pad + title_len + timer_len);

    let line = Line::from(vec![
        Span::raw(" ".repeat(center_pad)),
        title_span,
        Span::raw(" ".repeat(right_pad)),
        timer_text,
    ]);

    let widget = Paragraph::new(line)
        .style(Style::default().bg(Color::DarkGray))
        .alignment(Alignment::Left);
    f.render_widget(widget, area);
}

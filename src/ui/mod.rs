pub mod home;
pub mod keybar;
pub mod layout;
pub mod question;
pub mod result;
pub mod statusbar;
pub mod titlebar;

use ratatui::Frame;

use crate::model::QuizState;
use crate::state::{QuizApp, Route};
use crate::store::KeyValueStore;
use crate::tui::View;

pub fn draw<S: KeyValueStore>(f: &mut Frame, app: &QuizApp<S>, view: &View) {
    let layout = layout::compute_layout(f.area());

    titlebar::draw_titlebar(f, layout.titlebar, app);

    match app.route() {
        Route::Home => home::draw_home(f, layout.main, app),
        Route::Quiz => match app.quiz_state() {
            QuizState::Ongoing => question::draw_question(f, layout.main, app, view),
            QuizState::Error => question::draw_error(f, layout.main, app),
            _ => question::draw_loading(f, layout.main, app),
        },
        Route::Results => result::draw_results(f, layout.main, app, view),
    }

    statusbar::draw_statusbar(f, layout.statusbar, app, view);
    keybar::draw_keybar(f, layout.keybar, app);
}

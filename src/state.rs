use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::error::{FetchError, QuizError};
use crate::model::*;
use crate::persist::SessionStore;
use crate::score;
use crate::store::KeyValueStore;
use crate::timer::{Countdown, TickOutcome, DEFAULT_SECONDS};

/// Screen a transition leaves the user on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Quiz,
    Results,
}

/// Owns the quiz session. Every transition writes its own persistence and
/// returns the route to show next.
#[derive(Debug)]
pub struct QuizApp<S: KeyValueStore> {
    store: SessionStore<S>,
    quiz_state: QuizState,
    questions: Vec<Question>,
    current_question_index: usize,
    user_answers: BTreeMap<usize, Answer>,
    score: u32,
    difficulty: Difficulty,
    error: Option<String>,
    new_high_score: bool,
    countdown: Option<Countdown>,
    seconds_per_question: u32,
    fetch_generation: u64,
}

impl<S: KeyValueStore> QuizApp<S> {
    pub fn new(store: SessionStore<S>, difficulty: Difficulty) -> Self {
        Self {
            store,
            quiz_state: QuizState::Start,
            questions: Vec::new(),
            current_question_index: 0,
            user_answers: BTreeMap::new(),
            score: 0,
            difficulty,
            error: None,
            new_high_score: false,
            countdown: None,
            seconds_per_question: DEFAULT_SECONDS,
            fetch_generation: 0,
        }
    }

    pub fn with_seconds_per_question(mut self, secs: u32) -> Self {
        self.seconds_per_question = secs.max(1);
        self.arm_countdown();
        self
    }

    /// Builds a session from whatever snapshot the store holds.
    pub fn restore(store: SessionStore<S>, difficulty: Difficulty) -> Self {
        let snapshot = store.load_snapshot();
        let mut app = Self::new(store, difficulty);
        if let Some(snapshot) = snapshot {
            info!(
                "resuming {} session at question {} of {}",
                snapshot.quiz_state,
                snapshot.current_question_index + 1,
                snapshot.questions.len()
            );
            app.quiz_state = snapshot.quiz_state;
            app.questions = snapshot.questions;
            app.current_question_index = snapshot.current_question_index;
            app.user_answers = snapshot.user_answers;
            app.arm_countdown();
        }
        app
    }

    pub fn quiz_state(&self) -> QuizState {
        self.quiz_state
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn current_question_index(&self) -> usize {
        self.current_question_index
    }

    pub fn current_question(&self) -> Option<&Question> {
        if self.quiz_state != QuizState::Ongoing {
            return None;
        }
        self.questions.get(self.current_question_index)
    }

    pub fn user_answers(&self) -> &BTreeMap<usize, Answer> {
        &self.user_answers
    }

    pub fn current_answer(&self) -> Option<&Answer> {
        self.user_answers.get(&self.current_question_index)
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_new_high_score(&self) -> bool {
        self.new_high_score
    }

    pub fn high_score(&self) -> u32 {
        self.store.high_score()
    }

    pub fn fetch_generation(&self) -> u64 {
        self.fetch_generation
    }

    pub fn is_last_question(&self) -> bool {
        self.current_question_index + 1 >= self.questions.len()
    }

    pub fn can_go_next(&self) -> bool {
        self.quiz_state == QuizState::Ongoing && self.current_answer().is_some()
    }

    pub fn can_go_previous(&self) -> bool {
        self.quiz_state == QuizState::Ongoing && self.current_question_index > 0
    }

    /// Seconds left on the current question, while its countdown runs.
    pub fn remaining_seconds(&self) -> Option<u32> {
        self.countdown.map(|c| c.remaining())
    }

    /// Question index that needs a running ticker, if any.
    pub fn active_timer_index(&self) -> Option<usize> {
        self.countdown.map(|c| c.index())
    }

    pub fn seconds_per_question(&self) -> u32 {
        self.seconds_per_question
    }

    pub fn store(&self) -> &SessionStore<S> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut SessionStore<S> {
        &mut self.store
    }

    pub fn into_store(self) -> SessionStore<S> {
        self.store
    }

    pub fn route(&self) -> Route {
        match self.quiz_state {
            QuizState::Start => Route::Home,
            QuizState::Loading | QuizState::Ongoing | QuizState::Error => Route::Quiz,
            QuizState::Results => Route::Results,
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            quiz_state: self.quiz_state,
            questions: self.questions.clone(),
            current_question_index: self.current_question_index,
            user_answers: self.user_answers.clone(),
        }
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) -> Result<(), QuizError> {
        match self.quiz_state {
            QuizState::Start | QuizState::Error => {
                self.difficulty = difficulty;
                Ok(())
            }
            state => Err(QuizError::IllegalTransition {
                state,
                action: "change difficulty",
            }),
        }
    }

    /// `start → loading` or `error → loading`. Returns the generation the
    /// outcome must carry to be accepted.
    pub fn begin_fetch(&mut self) -> Result<u64, QuizError> {
        match self.quiz_state {
            QuizState::Start | QuizState::Error => {}
            state => {
                return Err(QuizError::IllegalTransition {
                    state,
                    action: "start a quiz",
                })
            }
        }

        self.quiz_state = QuizState::Loading;
        self.error = None;
        self.questions.clear();
        self.user_answers.clear();
        self.current_question_index = 0;
        self.score = 0;
        self.new_high_score = false;
        self.countdown = None;
        self.fetch_generation += 1;
        info!(
            "loading {} questions (fetch #{})",
            self.difficulty, self.fetch_generation
        );
        self.persist_snapshot();
        Ok(self.fetch_generation)
    }

    /// A session restored in `loading` has no live request; this issues a
    /// new generation for it.
    pub fn resume_fetch(&mut self) -> Option<u64> {
        if self.quiz_state != QuizState::Loading {
            return None;
        }
        self.fetch_generation += 1;
        info!("re-issuing interrupted fetch as #{}", self.fetch_generation);
        Some(self.fetch_generation)
    }

    /// `loading → ongoing` on success, `loading → error` on failure.
    pub fn complete_fetch(
        &mut self,
        generation: u64,
        result: Result<Vec<Question>, FetchError>,
    ) -> Result<Route, QuizError> {
        if self.quiz_state != QuizState::Loading || generation != self.fetch_generation {
            debug!("ignoring outcome of fetch #{}", generation);
            return Err(QuizError::StaleFetch(generation));
        }

        match result {
            Ok(questions) if !questions.is_empty() => {
                info!("quiz ready with {} questions", questions.len());
                self.questions = questions;
                self.current_question_index = 0;
                self.quiz_state = QuizState::Ongoing;
                self.arm_countdown();
            }
            Ok(_) => self.fail_fetch(FetchError::EmptyResult),
            Err(e) => self.fail_fetch(e),
        }
        self.persist_snapshot();
        Ok(Route::Quiz)
    }

    fn fail_fetch(&mut self, e: FetchError) {
        warn!("fetch failed: {:?}", e);
        self.error = Some(e.to_string());
        self.quiz_state = QuizState::Error;
    }

    /// Records `option` for the current question. Each question takes
    /// exactly one answer.
    pub fn select_answer(&mut self, option: &str) -> Result<Route, QuizError> {
        let index = self.current_question_index;
        let question = self
            .current_question()
            .ok_or(QuizError::IllegalTransition {
                state: self.quiz_state,
                action: "answer",
            })?;
        if self.user_answers.contains_key(&index) {
            return Err(QuizError::AlreadyAnswered(index));
        }
        if !question.options.iter().any(|o| o == option) {
            return Err(QuizError::UnknownOption(option.to_string()));
        }

        debug!("question {} answered", index + 1);
        self.record_answer(index, Answer::Selected(option.to_string()));
        Ok(Route::Quiz)
    }

    pub fn select_option(&mut self, option_index: usize) -> Result<Route, QuizError> {
        if self.quiz_state != QuizState::Ongoing {
            return Err(QuizError::IllegalTransition {
                state: self.quiz_state,
                action: "answer",
            });
        }
        let option = self
            .current_question()
            .and_then(|q| q.options.get(option_index))
            .cloned()
            .ok_or_else(|| QuizError::UnknownOption(format!("#{}", option_index + 1)))?;
        self.select_answer(&option)
    }

    /// One elapsed second for question `index`. Ticks for any question other
    /// than the current unanswered one are ignored.
    pub fn tick(&mut self, index: usize) -> Option<TickOutcome> {
        if self.quiz_state != QuizState::Ongoing {
            return None;
        }
        let countdown = self.countdown.as_mut().filter(|c| c.index() == index)?;

        let outcome = countdown.tick();
        match outcome {
            TickOutcome::Running(secs) => {
                if let Err(e) = self.store.save_timer(index, secs) {
                    warn!("cannot persist timer for question {}: {}", index + 1, e);
                }
            }
            TickOutcome::Expired => {
                info!("time is up on question {}", index + 1);
                self.record_answer(index, Answer::TimedOut);
            }
        }
        Some(outcome)
    }

    /// Moves forward; past the last question this scores the quiz.
    pub fn next(&mut self) -> Result<Route, QuizError> {
        if self.quiz_state != QuizState::Ongoing {
            return Err(QuizError::IllegalTransition {
                state: self.quiz_state,
                action: "advance",
            });
        }
        if self.current_answer().is_none() {
            return Err(QuizError::NotAnswered(self.current_question_index));
        }

        if self.current_question_index + 1 < self.questions.len() {
            self.current_question_index += 1;
            self.arm_countdown();
            self.persist_snapshot();
            Ok(Route::Quiz)
        } else {
            self.finish();
            Ok(Route::Results)
        }
    }

    pub fn previous(&mut self) -> Result<Route, QuizError> {
        if self.quiz_state != QuizState::Ongoing {
            return Err(QuizError::IllegalTransition {
                state: self.quiz_state,
                action: "go back",
            });
        }
        if self.current_question_index > 0 {
            self.current_question_index -= 1;
            self.arm_countdown();
            self.persist_snapshot();
        }
        Ok(Route::Quiz)
    }

    /// `results → start`, wiping the snapshot and every timer entry.
    pub fn restart(&mut self) -> Result<Route, QuizError> {
        if self.quiz_state != QuizState::Results {
            return Err(QuizError::IllegalTransition {
                state: self.quiz_state,
                action: "restart",
            });
        }

        self.quiz_state = QuizState::Start;
        self.questions.clear();
        self.user_answers.clear();
        self.current_question_index = 0;
        self.score = 0;
        self.error = None;
        self.new_high_score = false;
        self.countdown = None;
        if let Err(e) = self.store.clear_session() {
            warn!("cannot clear saved session: {}", e);
        }
        info!("quiz restarted");
        Ok(Route::Home)
    }

    fn finish(&mut self) {
        self.countdown = None;
        self.score = score::reconcile(&self.questions, &self.user_answers);
        let update = score::record_high_score(&mut self.store, self.score);
        self.new_high_score = update.is_new;
        self.quiz_state = QuizState::Results;
        info!(
            "quiz finished: {}/{} (high score {})",
            self.score,
            self.questions.len(),
            update.current
        );
        if let Err(e) = self.store.clear_session() {
            warn!("cannot clear finished session: {}", e);
        }
    }

    fn record_answer(&mut self, index: usize, answer: Answer) {
        self.user_answers.insert(index, answer);
        if self.countdown.is_some_and(|c| c.index() == index) {
            self.countdown = None;
        }
        if let Err(e) = self.store.clear_timer(index) {
            warn!("cannot clear timer for question {}: {}", index + 1, e);
        }
        self.persist_snapshot();
    }

    /// Points the countdown at the current question, resuming its persisted
    /// time. An answered question gets none.
    fn arm_countdown(&mut self) {
        self.countdown = None;
        if self.quiz_state != QuizState::Ongoing {
            return;
        }
        let index = self.current_question_index;
        if index >= self.questions.len() || self.user_answers.contains_key(&index) {
            return;
        }

        let countdown = Countdown::resume(
            index,
            self.store.timer(index),
            self.seconds_per_question,
        );
        if countdown.is_expired() {
            info!("question {} ran out of time while away", index + 1);
            self.record_answer(index, Answer::TimedOut);
        } else {
            self.countdown = Some(countdown);
        }
    }

    fn persist_snapshot(&mut self) {
        if matches!(self.quiz_state, QuizState::Start | QuizState::Results) {
            return;
        }
        let snapshot = self.snapshot();
        if let Err(e) = self.store.save_snapshot(&snapshot) {
            warn!("cannot save progress: {}", e);
        }
    }
}

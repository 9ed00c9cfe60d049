#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use trivia::error::FetchError;
use trivia::model::{Difficulty, RawQuestion};
use trivia::persist::SessionStore;
use trivia::source::{load_questions, FetchOutcome, Fetcher, QuestionSource};
use trivia::state::QuizApp;
use trivia::store::MemoryStore;

pub fn raw_question(i: usize) -> RawQuestion {
    RawQuestion {
        question: format!("Which caf&eacute; is number {}? It&#039;s &quot;easy&quot;", i),
        correct_answer: format!("Caf&eacute; {}", i),
        incorrect_answers: vec![
            format!("Bar &amp; Grill {}", i),
            format!("Bistro {}", i),
            format!("Diner &hellip; {}", i),
        ],
    }
}

pub fn raw_questions(n: usize) -> Vec<RawQuestion> {
    (0..n).map(raw_question).collect()
}

pub enum Behavior {
    Questions(Vec<RawQuestion>),
    Network,
    Empty,
}

pub struct MockSource {
    pub behavior: Behavior,
    pub calls: AtomicUsize,
    /// Only the first call sleeps this long.
    pub first_call_delay: Option<Duration>,
}

impl MockSource {
    pub fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
            first_call_delay: None,
        }
    }

    pub fn well_formed() -> Self {
        Self::new(Behavior::Questions(raw_questions(10)))
    }
}

impl QuestionSource for MockSource {
    fn fetch(&self, _difficulty: Difficulty, amount: u32) -> Result<Vec<RawQuestion>, FetchError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call == 0 {
            if let Some(delay) = self.first_call_delay {
                thread::sleep(delay);
            }
        }
        match &self.behavior {
            Behavior::Questions(q) => Ok(q.iter().take(amount as usize).cloned().collect()),
            Behavior::Network => Err(FetchError::network("connection refused")),
            Behavior::Empty => Ok(Vec::new()),
        }
    }
}

pub fn new_app() -> QuizApp<MemoryStore> {
    QuizApp::new(SessionStore::new(MemoryStore::new()), Difficulty::Easy)
}

/// Drives `start → loading → ongoing|error` synchronously against `source`.
pub fn start_with(app: &mut QuizApp<MemoryStore>, source: &MockSource) {
    let generation = app.begin_fetch().unwrap();
    let result = load_questions(source, app.difficulty(), 10);
    app.complete_fetch(generation, result).unwrap();
}

pub fn answer_correctly(app: &mut QuizApp<MemoryStore>) {
    let correct = app.current_question().unwrap().correct_answer.clone();
    app.select_answer(&correct).unwrap();
}

pub fn answer_wrongly(app: &mut QuizApp<MemoryStore>) {
    let q = app.current_question().unwrap();
    let wrong = q
        .options
        .iter()
        .find(|o| **o != q.correct_answer)
        .unwrap()
        .clone();
    app.select_answer(&wrong).unwrap();
}

/// Polls `fetcher` until an outcome arrives or `timeout` passes.
pub fn wait_for_outcome(fetcher: &mut Fetcher, timeout: Duration) -> Option<FetchOutcome> {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if let Some(outcome) = fetcher.try_recv() {
            return Some(outcome);
        }
        thread::sleep(Duration::from_millis(5));
    }
    None
}

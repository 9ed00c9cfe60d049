use std::fs;
use std::path::Path;
use std::sync::mpsc;

use anyhow::Context;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::model::{QuizState, Snapshot};
use crate::score;
use crate::store::{KeyValueStore, StoreEvent};

pub const PROGRESS_KEY: &str = "quizProgress";
pub const TIMER_PREFIX: &str = "quizTimer_";
pub const HIGH_SCORE_KEY: &str = "quizHighScore";

pub fn timer_key(index: usize) -> String {
    format!("{}{}", TIMER_PREFIX, index)
}

/// Typed view of the quiz keys inside a [`KeyValueStore`].
///
/// Reads never fail: anything unparseable is logged and treated as absent.
#[derive(Debug)]
pub struct SessionStore<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> SessionStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn inner(&self) -> &S {
        &self.store
    }

    pub fn subscribe(&mut self) -> mpsc::Receiver<StoreEvent> {
        self.store.subscribe()
    }

    pub fn load_snapshot(&self) -> Option<Snapshot> {
        let raw = self.store.get(PROGRESS_KEY)?;
        let mut snapshot: Snapshot = match serde_json::from_str(&raw) {
            Ok(s) => s,
            Err(e) => {
                warn!("discarding unreadable {}: {}", PROGRESS_KEY, e);
                return None;
            }
        };

        match snapshot.quiz_state {
            QuizState::Results => {
                warn!("discarding {}: a finished quiz is not resumable", PROGRESS_KEY);
                return None;
            }
            QuizState::Ongoing => {
                if snapshot.current_question_index >= snapshot.questions.len() {
                    warn!(
                        "discarding {}: question {} of {} out of range",
                        PROGRESS_KEY,
                        snapshot.current_question_index,
                        snapshot.questions.len()
                    );
                    return None;
                }
            }
            _ => {}
        }

        let total = snapshot.questions.len();
        snapshot.user_answers.retain(|&i, _| i < total);
        Some(snapshot)
    }

    pub fn save_snapshot(&mut self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let json = serde_json::to_string(snapshot)?;
        self.store.set(PROGRESS_KEY, &json)?;
        debug!(
            "snapshot saved: state={} index={} answers={}",
            snapshot.quiz_state,
            snapshot.current_question_index,
            snapshot.user_answers.len()
        );
        Ok(())
    }

    pub fn clear_snapshot(&mut self) -> Result<(), StoreError> {
        self.store.remove(PROGRESS_KEY)
    }

    pub fn timer(&self, index: usize) -> Option<u32> {
        let key = timer_key(index);
        let raw = self.store.get(&key)?;
        match raw.trim().parse::<u32>() {
            Ok(secs) => Some(secs),
            Err(_) => {
                warn!("ignoring unreadable {}: {:?}", key, raw);
                None
            }
        }
    }

    pub fn save_timer(&mut self, index: usize, secs: u32) -> Result<(), StoreError> {
        self.store.set(&timer_key(index), &secs.to_string())
    }

    pub fn clear_timer(&mut self, index: usize) -> Result<(), StoreError> {
        self.store.remove(&timer_key(index))
    }

    pub fn clear_all_timers(&mut self) -> Result<(), StoreError> {
        let mut first_err = None;
        for key in self.timer_keys() {
            if let Err(e) = self.store.remove(&key) {
                warn!("cannot remove {}: {}", key, e);
                if first_err.is_none() {
                    first_err = Some(e);
                }
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    pub fn timer_keys(&self) -> Vec<String> {
        self.store
            .keys()
            .into_iter()
            .filter(|k| k.starts_with(TIMER_PREFIX))
            .collect()
    }

    pub fn high_score(&self) -> u32 {
        let Some(raw) = self.store.get(HIGH_SCORE_KEY) else {
            return 0;
        };
        raw.trim().parse().unwrap_or_else(|_| {
            warn!("ignoring unreadable {}: {:?}", HIGH_SCORE_KEY, raw);
            0
        })
    }

    pub fn set_high_score(&mut self, score: u32) -> Result<(), StoreError> {
        self.store.set(HIGH_SCORE_KEY, &score.to_string())
    }

    /// Drops the snapshot and every timer entry. The high score survives.
    pub fn clear_session(&mut self) -> Result<(), StoreError> {
        let snapshot = self.clear_snapshot();
        let timers = self.clear_all_timers();
        snapshot.and(timers)
    }
}

pub fn print_status(snapshot: &Snapshot, high_score: u32) {
    let total = snapshot.questions.len();
    println!("State: {}", snapshot.quiz_state);
    if snapshot.quiz_state == QuizState::Ongoing && total > 0 {
        println!(
            "Question: {} of {}",
            snapshot.current_question_index + 1,
            total
        );
        println!("Answered: {} of {}", snapshot.user_answers.len(), total);
    }
    println!("High score: {}", high_score);
}

#[derive(Debug, Serialize)]
struct ExportDoc<'a> {
    exported_at: String,
    quiz_state: QuizState,
    answered: usize,
    correct: u32,
    total: usize,
    questions: Vec<ExportQuestion<'a>>,
}

#[derive(Debug, Serialize)]
struct ExportQuestion<'a> {
    number: usize,
    question: &'a str,
    correct_answer: &'a str,
    answer: Option<&'a str>,
    correct: bool,
}

pub fn build_export_yaml(snapshot: &Snapshot) -> anyhow::Result<String> {
    let questions = snapshot
        .questions
        .iter()
        .enumerate()
        .map(|(i, q)| {
            let answer = snapshot.user_answers.get(&i);
            ExportQuestion {
                number: i + 1,
                question: &q.question,
                correct_answer: &q.correct_answer,
                answer: answer.map(|a| a.as_str()),
                correct: answer.map(|a| a.is_correct_for(q)).unwrap_or(false),
            }
        })
        .collect();

    let doc = ExportDoc {
        exported_at: chrono::Local::now().to_rfc3339(),
        quiz_state: snapshot.quiz_state,
        answered: snapshot.user_answers.len(),
        correct: score::reconcile(&snapshot.questions, &snapshot.user_answers),
        total: snapshot.questions.len(),
        questions,
    };

    serde_yaml::to_string(&doc).context("cannot serialize export")
}

pub fn export_answers(snapshot: &Snapshot, path: &Path) -> anyhow::Result<()> {
    let yaml = build_export_yaml(snapshot)?;
    fs::write(path, yaml).with_context(|| format!("cannot write {}", path.display()))?;
    Ok(())
}

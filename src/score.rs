use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::model::{Answer, Question};
use crate::persist::SessionStore;
use crate::store::KeyValueStore;

/// One point per question whose recorded answer matches exactly.
pub fn reconcile(questions: &[Question], answers: &BTreeMap<usize, Answer>) -> u32 {
    questions
        .iter()
        .enumerate()
        .filter(|(i, q)| answers.get(i).is_some_and(|a| a.is_correct_for(q)))
        .count() as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighScoreUpdate {
    pub current: u32,
    pub is_new: bool,
}

/// Overwrites the stored high score only when `score` is strictly greater.
pub fn record_high_score<S: KeyValueStore>(
    store: &mut SessionStore<S>,
    score: u32,
) -> HighScoreUpdate {
    let previous = store.high_score();
    let is_new = score > previous;
    if is_new {
        if let Err(e) = store.set_high_score(score) {
            warn!("cannot persist high score {}: {}", score, e);
        } else {
            info!("new high score {} (was {})", score, previous);
        }
    }
    HighScoreUpdate {
        current: previous.max(score),
        is_new,
    }
}

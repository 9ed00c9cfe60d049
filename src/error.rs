use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::model::QuizState;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network response was not ok. Please check your connection.")]
    Network { detail: String },
    #[error("No questions found for the selected difficulty. Please try another level.")]
    EmptyResult,
}

impl FetchError {
    pub fn network(detail: impl ToString) -> Self {
        FetchError::Network {
            detail: detail.to_string(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuizError {
    #[error("cannot {action} while the quiz is {state}")]
    IllegalTransition {
        state: QuizState,
        action: &'static str,
    },
    #[error("question {} is already answered", .0 + 1)]
    AlreadyAnswered(usize),
    #[error("question {} has not been answered", .0 + 1)]
    NotAnswered(usize),
    #[error("'{0}' is not an option for the current question")]
    UnknownOption(String),
    #[error("fetch #{0} was superseded")]
    StaleFetch(u64),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot serialize storage: {0}")]
    Serialize(#[from] serde_json::Error),
}

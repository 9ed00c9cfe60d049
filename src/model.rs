use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Answer recorded when a question's countdown runs out.
pub const TIMEOUT_SENTINEL: &str = "Time's Up";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Medium,
            Difficulty::Medium => Difficulty::Hard,
            Difficulty::Hard => Difficulty::Easy,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Hard,
            Difficulty::Medium => Difficulty::Easy,
            Difficulty::Hard => Difficulty::Medium,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizState {
    #[default]
    Start,
    Loading,
    Ongoing,
    Error,
    Results,
}

impl fmt::Display for QuizState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            QuizState::Start => "start",
            QuizState::Loading => "loading",
            QuizState::Ongoing => "ongoing",
            QuizState::Error => "error",
            QuizState::Results => "results",
        };
        f.write_str(s)
    }
}

/// A normalized question. Options are shuffled once at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub question: String,
    pub correct_answer: String,
    pub options: Vec<String>,
}

/// A record as returned by the trivia API, still entity-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawQuestion {
    pub question: String,
    pub correct_answer: String,
    pub incorrect_answers: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub response_code: u8,
    pub results: Vec<RawQuestion>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Selected(String),
    TimedOut,
}

impl Answer {
    pub fn as_str(&self) -> &str {
        match self {
            Answer::Selected(s) => s,
            Answer::TimedOut => TIMEOUT_SENTINEL,
        }
    }

    /// A timeout never counts, whatever the option texts are.
    pub fn is_correct_for(&self, question: &Question) -> bool {
        matches!(self, Answer::Selected(s) if *s == question.correct_answer)
    }
}

impl Serialize for Answer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Answer {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        if s == TIMEOUT_SENTINEL {
            Ok(Answer::TimedOut)
        } else {
            Ok(Answer::Selected(s))
        }
    }
}

/// The persisted `quizProgress` value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snapshot {
    pub quiz_state: QuizState,
    pub questions: Vec<Question>,
    pub current_question_index: usize,
    pub user_answers: BTreeMap<usize, Answer>,
}

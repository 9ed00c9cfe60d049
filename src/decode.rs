use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::FetchError;
use crate::model::{Question, RawQuestion, TIMEOUT_SENTINEL};

/// Wrong answers each multiple-choice record carries.
pub const INCORRECT_PER_QUESTION: usize = 3;

/// Resolves every named and numeric HTML entity in `s`.
pub fn decode_html(s: &str) -> String {
    html_escape::decode_html_entities(s).into_owned()
}

/// Uniform in-place permutation (Fisher–Yates).
pub fn shuffle_options<R: Rng + ?Sized>(options: &mut [String], rng: &mut R) {
    options.shuffle(rng);
}

pub fn normalize_question<R: Rng + ?Sized>(
    raw: &RawQuestion,
    rng: &mut R,
) -> Result<Question, FetchError> {
    if raw.incorrect_answers.len() != INCORRECT_PER_QUESTION {
        return Err(FetchError::network(format!(
            "record has {} incorrect answers, expected {}",
            raw.incorrect_answers.len(),
            INCORRECT_PER_QUESTION
        )));
    }

    let correct_answer = decode_html(&raw.correct_answer);

    let mut options: Vec<String> = raw
        .incorrect_answers
        .iter()
        .map(|a| decode_html(a))
        .collect();
    options.push(correct_answer.clone());

    // The timeout answer must stay distinguishable from every real option.
    if options.iter().any(|o| o == TIMEOUT_SENTINEL) {
        return Err(FetchError::network(format!(
            "record uses reserved answer {:?}",
            TIMEOUT_SENTINEL
        )));
    }
    for (i, option) in options.iter().enumerate() {
        if options[..i].contains(option) {
            return Err(FetchError::network(format!(
                "record repeats option {:?}",
                option
            )));
        }
    }

    shuffle_options(&mut options, rng);

    Ok(Question {
        question: decode_html(&raw.question),
        correct_answer,
        options,
    })
}

/// Normalizes a whole result set. An empty set or any malformed record fails
/// the batch, so callers never see a partial quiz.
pub fn normalize_all<R: Rng + ?Sized>(
    raw: &[RawQuestion],
    rng: &mut R,
) -> Result<Vec<Question>, FetchError> {
    if raw.is_empty() {
        return Err(FetchError::EmptyResult);
    }
    raw.iter().map(|q| normalize_question(q, rng)).collect()
}

mod common;

use std::collections::BTreeMap;

use trivia::error::{FetchError, QuizError};
use trivia::model::{Answer, QuizState};
use trivia::persist::PROGRESS_KEY;
use trivia::score;
use trivia::state::Route;
use trivia::store::KeyValueStore;
use trivia::timer::TickOutcome;

use common::{answer_correctly, answer_wrongly, new_app, start_with, Behavior, MockSource};

#[test]
fn test_easy_quiz_all_correct_reaches_results() {
    let mut app = new_app();
    app.store_mut().set_high_score(4).unwrap();
    assert_eq!(app.quiz_state(), QuizState::Start);
    assert_eq!(app.route(), Route::Home);

    let generation = app.begin_fetch().unwrap();
    assert_eq!(app.quiz_state(), QuizState::Loading);
    assert_eq!(app.route(), Route::Quiz);

    let source = MockSource::well_formed();
    let result = trivia::source::load_questions(&source, app.difficulty(), 10);
    assert_eq!(app.complete_fetch(generation, result), Ok(Route::Quiz));
    assert_eq!(app.quiz_state(), QuizState::Ongoing);
    assert_eq!(app.questions().len(), 10);

    for i in 0..10 {
        assert_eq!(app.current_question_index(), i);
        answer_correctly(&mut app);
        let route = app.next().unwrap();
        if i < 9 {
            assert_eq!(route, Route::Quiz);
        } else {
            assert_eq!(route, Route::Results);
        }
    }

    assert_eq!(app.quiz_state(), QuizState::Results);
    assert_eq!(app.score(), 10);
    assert_eq!(app.high_score(), 10);
    assert!(app.is_new_high_score());
    assert!(app.store().inner().get(PROGRESS_KEY).is_none());
    assert!(app.store().timer_keys().is_empty());
}

#[test]
fn test_transport_failure_then_retry() {
    let mut app = new_app();
    start_with(&mut app, &MockSource::new(Behavior::Network));

    assert_eq!(app.quiz_state(), QuizState::Error);
    assert!(app.error().unwrap().contains("connection"));

    app.begin_fetch().unwrap();
    assert_eq!(app.quiz_state(), QuizState::Loading);
    assert!(app.error().is_none());
}

#[test]
fn test_empty_result_goes_to_error() {
    let mut app = new_app();
    start_with(&mut app, &MockSource::new(Behavior::Empty));

    assert_eq!(app.quiz_state(), QuizState::Error);
    assert!(app.error().unwrap().contains("another"));

    let generation = app.begin_fetch().unwrap();
    app.complete_fetch(generation, Ok(Vec::new())).unwrap();
    assert_eq!(app.quiz_state(), QuizState::Error);
}

#[test]
fn test_question_three_times_out() {
    let mut app = new_app();
    start_with(&mut app, &MockSource::well_formed());

    answer_correctly(&mut app);
    app.next().unwrap();
    answer_correctly(&mut app);
    app.next().unwrap();
    assert_eq!(app.current_question_index(), 2);
    assert!(!app.can_go_next());

    let mut expired = 0;
    for _ in 0..30 {
        match app.tick(2) {
            Some(TickOutcome::Expired) => expired += 1,
            Some(TickOutcome::Running(_)) => {}
            None => panic!("tick ignored while counting down"),
        }
    }
    assert_eq!(expired, 1);
    assert_eq!(app.user_answers().get(&2), Some(&Answer::TimedOut));
    assert_eq!(app.remaining_seconds(), None);
    assert!(app.can_go_next());

    // the countdown is gone, so further ticks do nothing
    assert_eq!(app.tick(2), None);
    assert_eq!(
        app.select_option(0),
        Err(QuizError::AlreadyAnswered(2))
    );

    app.next().unwrap();
    while app.quiz_state() == QuizState::Ongoing {
        answer_correctly(&mut app);
        app.next().unwrap();
    }
    assert_eq!(app.score(), 9);
}

#[test]
fn test_timeout_never_matches_even_if_option_text_collides() {
    let mut app = new_app();
    start_with(&mut app, &MockSource::well_formed());

    let mut questions = app.questions().to_vec();
    questions[0].correct_answer = "Time's Up".to_string();
    let mut answers = BTreeMap::new();
    answers.insert(0, Answer::TimedOut);

    assert_eq!(score::reconcile(&questions, &answers), 0);
}

#[test]
fn test_answer_is_recorded_once() {
    let mut app = new_app();
    start_with(&mut app, &MockSource::well_formed());

    answer_wrongly(&mut app);
    let correct = app.current_question().unwrap().correct_answer.clone();
    assert_eq!(
        app.select_answer(&correct),
        Err(QuizError::AlreadyAnswered(0))
    );
    assert!(!app.user_answers()[&0].is_correct_for(&app.questions()[0]));
}

#[test]
fn test_illegal_transitions_are_rejected() {
    let mut app = new_app();

    assert!(matches!(
        app.next(),
        Err(QuizError::IllegalTransition { state: QuizState::Start, .. })
    ));
    assert!(matches!(app.restart(), Err(QuizError::IllegalTransition { .. })));
    assert!(matches!(app.select_option(0), Err(QuizError::IllegalTransition { .. })));

    start_with(&mut app, &MockSource::well_formed());
    assert!(matches!(app.begin_fetch(), Err(QuizError::IllegalTransition { .. })));
    assert!(matches!(app.restart(), Err(QuizError::IllegalTransition { .. })));
    assert_eq!(app.next(), Err(QuizError::NotAnswered(0)));
    assert_eq!(
        app.select_answer("not an option"),
        Err(QuizError::UnknownOption("not an option".to_string()))
    );
}

#[test]
fn test_previous_moves_back_without_touching_answers() {
    let mut app = new_app();
    start_with(&mut app, &MockSource::well_formed());

    assert_eq!(app.previous(), Ok(Route::Quiz));
    assert_eq!(app.current_question_index(), 0);

    answer_correctly(&mut app);
    app.next().unwrap();
    answer_wrongly(&mut app);
    let before = app.user_answers().clone();

    app.previous().unwrap();
    assert_eq!(app.current_question_index(), 0);
    assert_eq!(app.user_answers(), &before);
    assert!(app.can_go_next());
    assert_eq!(app.remaining_seconds(), None);
}

#[test]
fn test_stale_fetch_outcome_is_ignored() {
    let mut app = new_app();
    let generation = app.begin_fetch().unwrap();

    let stale = app.complete_fetch(generation - 1, Err(FetchError::EmptyResult));
    assert_eq!(stale, Err(QuizError::StaleFetch(generation - 1)));
    assert_eq!(app.quiz_state(), QuizState::Loading);

    // a second start while loading is refused rather than racing
    assert!(app.begin_fetch().is_err());
    assert_eq!(app.fetch_generation(), generation);
}

#[test]
fn test_restart_returns_home_and_clears_session() {
    let mut app = new_app();
    start_with(&mut app, &MockSource::well_formed());
    while app.quiz_state() == QuizState::Ongoing {
        answer_wrongly(&mut app);
        app.next().unwrap();
    }
    assert_eq!(app.score(), 0);
    assert!(!app.is_new_high_score());

    assert_eq!(app.restart(), Ok(Route::Home));
    assert_eq!(app.quiz_state(), QuizState::Start);
    assert!(app.questions().is_empty());
    assert!(app.user_answers().is_empty());
    assert!(app.store().inner().get(PROGRESS_KEY).is_none());
}

#[test]
fn test_high_score_never_decreases() {
    let mut app = new_app();
    let source = MockSource::well_formed();
    let mut highs = Vec::new();
    let mut news = Vec::new();

    for correct_count in [5usize, 3, 5, 7, 0] {
        start_with(&mut app, &source);
        let mut i = 0;
        while app.quiz_state() == QuizState::Ongoing {
            if i < correct_count {
                answer_correctly(&mut app);
            } else {
                answer_wrongly(&mut app);
            }
            app.next().unwrap();
            i += 1;
        }
        assert_eq!(app.score() as usize, correct_count);
        highs.push(app.high_score());
        news.push(app.is_new_high_score());
        app.restart().unwrap();
    }

    assert_eq!(highs, vec![5, 5, 5, 7, 7]);
    assert_eq!(news, vec![true, false, false, true, false]);
}

#[test]
fn test_score_counts_exact_matches_only() {
    let mut app = new_app();
    start_with(&mut app, &MockSource::well_formed());
    let questions = app.questions().to_vec();

    let mut answers = BTreeMap::new();
    answers.insert(0, Answer::Selected(questions[0].correct_answer.clone()));
    answers.insert(1, Answer::Selected(questions[1].correct_answer.to_uppercase()));
    answers.insert(2, Answer::TimedOut);
    answers.insert(4, Answer::Selected(questions[4].correct_answer.clone()));

    let s = score::reconcile(&questions, &answers);
    assert_eq!(s, 2);
    assert!(s as usize <= questions.len());
}

mod common;

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::mpsc;

use trivia::error::StoreError;
use trivia::model::{Answer, Difficulty, QuizState, Snapshot};
use trivia::persist::{
    build_export_yaml, timer_key, SessionStore, HIGH_SCORE_KEY, PROGRESS_KEY,
};
use trivia::state::QuizApp;
use trivia::store::{FileStore, KeyValueStore, MemoryStore, StoreEvent};

use common::{
    answer_correctly, answer_wrongly, new_app, raw_questions, start_with, Behavior, MockSource,
};

#[test]
fn test_reload_mid_quiz_restores_session_exactly() {
    let mut app = new_app();
    start_with(&mut app, &MockSource::well_formed());
    answer_correctly(&mut app);
    app.next().unwrap();
    answer_wrongly(&mut app);
    app.next().unwrap();
    let before = app.snapshot();

    let restored = QuizApp::restore(app.into_store(), Difficulty::Easy);
    assert_eq!(restored.snapshot(), before);
    assert_eq!(restored.quiz_state(), QuizState::Ongoing);
    assert_eq!(restored.current_question_index(), 2);
    assert_eq!(restored.remaining_seconds(), Some(30));
}

#[test]
fn test_reload_resumes_remaining_time() {
    let mut app = new_app();
    start_with(&mut app, &MockSource::well_formed());
    for _ in 0..5 {
        app.tick(0);
    }
    assert_eq!(app.store().timer(0), Some(25));

    let restored = QuizApp::restore(app.into_store(), Difficulty::Easy);
    assert_eq!(restored.remaining_seconds(), Some(25));
    assert_eq!(restored.active_timer_index(), Some(0));
}

#[test]
fn test_each_question_keeps_its_own_timer() {
    let mut app = new_app();
    start_with(&mut app, &MockSource::well_formed());
    for _ in 0..4 {
        app.tick(0);
    }
    answer_correctly(&mut app);
    assert_eq!(app.store().timer(0), None);

    app.next().unwrap();
    assert_eq!(app.remaining_seconds(), Some(30));
    app.tick(1);
    app.tick(0);
    assert_eq!(app.store().timer(1), Some(29));
    assert_eq!(app.store().timer(0), None);
}

#[test]
fn test_expired_timer_on_reload_times_out_question() {
    let mut store = SessionStore::new(MemoryStore::new());
    let mut app = QuizApp::new(SessionStore::new(MemoryStore::new()), Difficulty::Easy);
    start_with(&mut app, &MockSource::well_formed());
    store.save_snapshot(&app.snapshot()).unwrap();
    store.save_timer(0, 0).unwrap();

    let restored = QuizApp::restore(store, Difficulty::Easy);
    assert_eq!(restored.user_answers().get(&0), Some(&Answer::TimedOut));
    assert_eq!(restored.remaining_seconds(), None);
    assert!(restored.can_go_next());
}

#[test]
fn test_snapshot_wire_format() {
    let mut app = new_app();
    start_with(&mut app, &MockSource::well_formed());
    for _ in 0..30 {
        app.tick(0);
    }

    let raw = app.store().inner().get(PROGRESS_KEY).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json["quizState"], "ongoing");
    assert_eq!(json["currentQuestionIndex"], 0);
    assert_eq!(json["userAnswers"]["0"], "Time's Up");
    assert_eq!(json["questions"].as_array().unwrap().len(), 10);
    assert!(json["questions"][0]["correctAnswer"].is_string());
}

#[test]
fn test_results_clear_snapshot_and_timers() {
    let mut app = new_app();
    start_with(&mut app, &MockSource::well_formed());
    app.store_mut().save_timer(7, 12).unwrap();
    app.tick(0);
    assert!(app.store().inner().get(PROGRESS_KEY).is_some());

    while app.quiz_state() == QuizState::Ongoing {
        answer_correctly(&mut app);
        app.next().unwrap();
    }

    assert!(app.store().inner().get(PROGRESS_KEY).is_none());
    assert!(app.store().timer_keys().is_empty());
    assert_eq!(app.store().inner().get(HIGH_SCORE_KEY).as_deref(), Some("10"));

    let restored = QuizApp::restore(app.into_store(), Difficulty::Easy);
    assert_eq!(restored.quiz_state(), QuizState::Start);
    assert!(restored.questions().is_empty());
}

#[test]
fn test_loading_state_survives_reload_and_refetches() {
    let mut app = new_app();
    app.begin_fetch().unwrap();

    let mut restored = QuizApp::restore(app.into_store(), Difficulty::Easy);
    assert_eq!(restored.quiz_state(), QuizState::Loading);
    let generation = restored.resume_fetch().unwrap();

    let source = MockSource::well_formed();
    let result = trivia::source::load_questions(&source, Difficulty::Easy, 10);
    restored.complete_fetch(generation, result).unwrap();
    assert_eq!(restored.quiz_state(), QuizState::Ongoing);
}

#[test]
fn test_malformed_storage_falls_back_to_defaults() {
    let mut store = MemoryStore::new();
    store.set(PROGRESS_KEY, "{not json").unwrap();
    store.set(HIGH_SCORE_KEY, "lots").unwrap();
    store.set(&timer_key(0), "soon").unwrap();
    let session = SessionStore::new(store);

    assert!(session.load_snapshot().is_none());
    assert_eq!(session.high_score(), 0);
    assert_eq!(session.timer(0), None);

    let app = QuizApp::restore(session, Difficulty::Medium);
    assert_eq!(app.quiz_state(), QuizState::Start);
    assert_eq!(app.snapshot(), Snapshot::default());
}

#[test]
fn test_out_of_range_snapshot_is_discarded() {
    let mut app = new_app();
    start_with(&mut app, &MockSource::well_formed());
    let mut snapshot = app.snapshot();
    snapshot.current_question_index = 42;

    let mut session = SessionStore::new(MemoryStore::new());
    session.save_snapshot(&snapshot).unwrap();
    assert!(session.load_snapshot().is_none());

    snapshot.current_question_index = 0;
    snapshot.quiz_state = QuizState::Results;
    session.save_snapshot(&snapshot).unwrap();
    assert!(session.load_snapshot().is_none());
}

#[test]
fn test_file_store_round_trips_and_notifies() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("storage.json");

    {
        let mut store = FileStore::open(&path).unwrap();
        let events = store.subscribe();
        store.set(HIGH_SCORE_KEY, "6").unwrap();
        store.set(&timer_key(3), "17").unwrap();
        store.remove(&timer_key(3)).unwrap();
        store.remove("never-set").unwrap();

        let received: Vec<StoreEvent> = events.try_iter().collect();
        assert_eq!(
            received,
            vec![
                StoreEvent::Set(HIGH_SCORE_KEY.to_string()),
                StoreEvent::Set(timer_key(3)),
                StoreEvent::Removed(timer_key(3)),
            ]
        );
    }

    let reopened = SessionStore::new(FileStore::open(&path).unwrap());
    assert_eq!(reopened.high_score(), 6);
    assert_eq!(reopened.timer(3), None);
}

#[test]
fn test_corrupt_file_store_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");
    fs::write(&path, "][").unwrap();

    let store = FileStore::open(&path).unwrap();
    assert!(store.keys().is_empty());
}

#[test]
fn test_export_lists_answers() {
    let mut app = new_app();
    start_with(&mut app, &MockSource::well_formed());
    answer_correctly(&mut app);
    app.next().unwrap();
    answer_wrongly(&mut app);

    let yaml = build_export_yaml(&app.snapshot()).unwrap();
    assert!(yaml.contains("exported_at:"));
    assert!(yaml.contains("quiz_state: ongoing"));
    assert!(yaml.contains("answered: 2"));
    assert!(yaml.contains("correct: 1"));
    assert!(yaml.contains("total: 10"));
    assert!(yaml.contains("answer: null"));
}

#[test]
fn test_timeout_text_never_reaches_storage_as_a_real_answer() {
    let mut raw = raw_questions(10);
    raw[0].correct_answer = "Time&#039;s Up".to_string();

    let mut app = new_app();
    start_with(&mut app, &MockSource::new(Behavior::Questions(raw)));
    assert_eq!(app.quiz_state(), QuizState::Error);
    assert!(app.store().inner().get(PROGRESS_KEY).is_some());

    let restored = QuizApp::restore(app.into_store(), Difficulty::Easy);
    assert_eq!(restored.quiz_state(), QuizState::Error);
    assert!(restored.questions().is_empty());
    assert!(restored.user_answers().is_empty());
}

#[test]
fn test_clear_session_removes_snapshot_and_timers() {
    let mut app = new_app();
    start_with(&mut app, &MockSource::well_formed());
    app.tick(0);
    app.store_mut().save_timer(4, 11).unwrap();
    app.store_mut().set_high_score(3).unwrap();

    let mut session = app.into_store();
    session.clear_session().unwrap();

    assert!(session.load_snapshot().is_none());
    assert!(session.timer_keys().is_empty());
    assert_eq!(session.high_score(), 3);
}

/// Refuses to delete the snapshot key, succeeds at everything else.
#[derive(Default)]
struct SnapshotPinnedStore {
    inner: MemoryStore,
}

impl KeyValueStore for SnapshotPinnedStore {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.inner.set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if key == PROGRESS_KEY {
            return Err(StoreError::Io {
                path: PathBuf::from("storage.json"),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only"),
            });
        }
        self.inner.remove(key)
    }

    fn keys(&self) -> Vec<String> {
        self.inner.keys()
    }

    fn subscribe(&mut self) -> mpsc::Receiver<StoreEvent> {
        self.inner.subscribe()
    }
}

#[test]
fn test_clear_session_still_drops_timers_when_snapshot_delete_fails() {
    let mut session = SessionStore::new(SnapshotPinnedStore::default());
    session.save_snapshot(&Snapshot::default()).unwrap();
    session.save_timer(0, 20).unwrap();
    session.save_timer(5, 9).unwrap();

    let result = session.clear_session();
    assert!(matches!(result, Err(StoreError::Io { .. })));
    assert!(session.timer_keys().is_empty());
}

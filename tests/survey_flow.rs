//! End-to-end survey sessions against file-backed content and fallback storage.

use std::path::Path;
use std::sync::Arc;

use serde_json::json;

use spatial_survey::adapters::booklets::FileBookletSource;
use spatial_survey::adapters::memory::{InMemoryConsentStore, InMemoryResponseStore};
use spatial_survey::adapters::storage::FileLocalRecordStore;
use spatial_survey::application::handlers::{
    BookletAssigner, ConsentRecorder, FlowStep, PersistencePipeline, SurveyFlow, SurveyServices,
    PRIMARY_SAVE_FAILED,
};
use spatial_survey::domain::consent::{ConsentAck, SaveMethod};
use spatial_survey::domain::foundation::{BookletPool, Timestamp};
use spatial_survey::domain::survey::SurveyPhase;
use spatial_survey::ports::LocalRecordStore;

const POOL_SIZE: u32 = 19;

/// Writes `<id>.json` for every booklet; answers are always "C".
fn write_booklets(dir: &Path) {
    std::fs::create_dir_all(dir).unwrap();
    for id in 0..POOL_SIZE {
        let content = json!({
            "questions": [
                {"position": 3, "question": "Rotate the cube", "options": "{A, B, C, D}", "answer": "C", "category": "rotation"},
                {"position": 1, "question": "Fold the net", "options": ["A", "B", "C", "D"], "answer": "C", "category": "folding"},
                {"position": 2, "question": "Find the section", "options": "A. one\nB. two\nC. three", "answer": "C", "difficulty": 2}
            ]
        });
        std::fs::write(dir.join(format!("{}.json", id)), content.to_string()).unwrap();
    }
}

struct Setup {
    flow: SurveyFlow,
    local: Arc<FileLocalRecordStore>,
    results: Arc<InMemoryResponseStore>,
    _dir: tempfile::TempDir,
}

fn setup(consent_store: InMemoryConsentStore, results: InMemoryResponseStore) -> Setup {
    let dir = tempfile::tempdir().unwrap();
    write_booklets(&dir.path().join("booklets"));

    let local = Arc::new(FileLocalRecordStore::new(dir.path().join("fallback")));
    let results = Arc::new(results);

    let services = SurveyServices {
        consent: Arc::new(ConsentRecorder::new(Arc::new(consent_store), local.clone())),
        assigner: Arc::new(BookletAssigner::new(BookletPool::new(POOL_SIZE).unwrap())),
        booklets: Arc::new(FileBookletSource::new(dir.path().join("booklets"))),
        persistence: Arc::new(PersistencePipeline::new(results.clone(), local.clone())),
    };

    Setup {
        flow: SurveyFlow::new(services),
        local,
        results,
        _dir: dir,
    }
}

#[tokio::test]
async fn participant_completes_with_healthy_storage() {
    let mut s = setup(InMemoryConsentStore::new(), InMemoryResponseStore::new());

    let consent = s
        .flow
        .give_consent(ConsentAck::new(true, Timestamp::now()))
        .await
        .unwrap()
        .clone();
    assert_eq!(consent.save_method, SaveMethod::Primary);

    let booklet_id = s
        .flow
        .start_survey(Some("26-35"), Some("female"))
        .await
        .unwrap();
    assert!(booklet_id.value() < POOL_SIZE);

    // Questions are shown in position order regardless of file order.
    assert_eq!(s.flow.current_question().unwrap().position, 1);

    s.flow.select_answer(1, "C").unwrap();
    assert_eq!(s.flow.advance().unwrap(), FlowStep::Moved { index: 1 });
    s.flow.select_answer(2, "A").unwrap();
    s.flow.advance().unwrap();
    s.flow.select_answer(3, "C").unwrap();
    assert_eq!(s.flow.advance().unwrap(), FlowStep::Completed);

    assert_eq!(s.flow.phase(), SurveyPhase::Completed);
    let outcome = s.flow.await_persistence().await.unwrap().clone();
    assert_eq!(outcome.save_method, SaveMethod::Primary);
    assert_eq!(outcome.summary.total_questions, 3);
    assert_eq!(outcome.summary.correct_answers, 2);
    assert_eq!(outcome.summary.accuracy_rounded(), 66.7);

    let stored = s.results.results().await;
    assert_eq!(stored[0].bundle.booklet_id(), booklet_id);
    assert_eq!(stored[0].bundle.responses().get(&2).map(String::as_str), Some("A"));
    assert!(s.local.keys().await.unwrap().is_empty());
}

#[tokio::test]
async fn participant_completes_when_primary_storage_is_down() {
    let mut s = setup(
        InMemoryConsentStore::failing("connection refused"),
        InMemoryResponseStore::failing("connection refused"),
    );

    let consent = s
        .flow
        .give_consent(ConsentAck::new(true, Timestamp::now()).with_client_context("Mozilla/5.0"))
        .await
        .unwrap()
        .clone();
    assert_eq!(consent.save_method, SaveMethod::FallbackLocal);
    assert_eq!(s.flow.phase(), SurveyPhase::Intake);

    s.flow
        .start_survey(Some("26-35"), Some("female"))
        .await
        .unwrap();

    // Finishing on an unanswered last question is allowed.
    s.flow.jump_to(2).unwrap();
    s.flow.advance().unwrap();
    assert_eq!(s.flow.phase(), SurveyPhase::Completed);

    let outcome = s.flow.await_persistence().await.unwrap().clone();
    assert_eq!(outcome.save_method, SaveMethod::FallbackLocal);
    assert_eq!(outcome.summary.answered_count, 0);
    assert_eq!(outcome.summary.average_time_per_question_ms, 0.0);

    let session_id = consent.session_id;
    let keys = s.local.keys().await.unwrap();
    assert_eq!(
        keys,
        vec![format!("consent_{}", session_id), format!("survey_{}", session_id)]
    );

    let saved = s
        .local
        .get(&format!("survey_{}", session_id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(saved["error"], PRIMARY_SAVE_FAILED);
    assert_eq!(saved["intake"]["age"], "26-35");
    assert_eq!(saved["intake"]["gender"], "female");

    let consent_copy = s
        .local
        .get(&format!("consent_{}", session_id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(consent_copy["client_context"], "Mozilla/5.0");
}

#[tokio::test]
async fn reset_discards_progress() {
    let mut s = setup(InMemoryConsentStore::new(), InMemoryResponseStore::new());
    s.flow
        .give_consent(ConsentAck::new(true, Timestamp::now()))
        .await
        .unwrap();
    s.flow
        .start_survey(Some("46-55"), Some("prefer not to say"))
        .await
        .unwrap();
    s.flow.select_answer(1, "B").unwrap();

    s.flow.reset();

    assert_eq!(s.flow.phase(), SurveyPhase::Consent);
    assert!(s.flow.progress().is_none());
    assert!(s.flow.assigned_booklet().is_none());
    assert!(s.flow.await_persistence().await.is_none());
}

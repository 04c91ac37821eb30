/*!
 * Full app lifecycle tests
 */

use polyfaq::app_config::{CacheBackendKind, Config};
use polyfaq::cache::record_key;
use polyfaq::faq::{FaqSnapshot, FaqUpdate};
use polyfaq::providers::MockProvider;
use polyfaq::Controller;

use crate::common::test_config;

fn file_config(dir: &tempfile::TempDir, backend: CacheBackendKind) -> Config {
    let mut config = test_config();
    config.database.path = Some(dir.path().join("polyfaq.db"));
    config.cache.backend = backend;
    config
}

#[tokio::test]
async fn test_controller_crudLifecycle_shouldKeepReadsConsistent() {
    let dir = tempfile::tempdir().unwrap();
    let controller = Controller::from_config(file_config(&dir, CacheBackendKind::Memory)).unwrap();

    let record = controller
        .store()
        .create("How do I reset my password?", "Use the reset link.")
        .await
        .unwrap();
    let hindi = controller.query().get_one(record.id, "hi").await.unwrap();
    assert_eq!(
        hindi.question,
        MockProvider::expected_translation("hi", "How do I reset my password?")
    );

    controller
        .store()
        .update(record.id, FaqUpdate::answer("Use the link in the login page."))
        .await
        .unwrap();
    let english = controller.query().get_one(record.id, "en").await.unwrap();
    assert_eq!(english.answer, "Use the link in the login page.");

    controller.store().delete(record.id).await.unwrap();
    let page = controller.query().get_page("en", 1, 10).await.unwrap();
    assert_eq!(page.count, 0);

    let stats = controller.stats().await.unwrap();
    assert_eq!(stats.records, 0);
    assert_eq!(stats.cache_backend, "memory");
}

#[tokio::test]
async fn test_controller_withSqliteCache_shouldKeepSnapshotsAcrossRestarts() {
    let dir = tempfile::tempdir().unwrap();
    let record_id = {
        let controller =
            Controller::from_config(file_config(&dir, CacheBackendKind::Sqlite)).unwrap();
        controller.store().create("Question?", "Answer.").await.unwrap().id
    };

    let controller = Controller::from_config(file_config(&dir, CacheBackendKind::Sqlite)).unwrap();
    let snapshot: Option<FaqSnapshot> = controller.cache().get(&record_key(record_id)).await;

    let snapshot = snapshot.expect("Snapshot did not survive the restart");
    assert_eq!(snapshot.question, "Question?");
    assert!(snapshot.question_translated.contains_key("bn"));
}

#[tokio::test]
async fn test_controller_withSeparateCacheFile_shouldCreateIt() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = file_config(&dir, CacheBackendKind::Sqlite);
    let cache_path = dir.path().join("cache").join("snapshots.db");
    config.cache.path = Some(cache_path.clone());

    let controller = Controller::from_config(config).unwrap();
    controller.store().create("Question?", "Answer.").await.unwrap();

    assert!(cache_path.exists());
    assert_eq!(controller.cache().len().await, Some(1));
}

#[tokio::test]
async fn test_controller_records_shouldSurviveRestart() {
    let dir = tempfile::tempdir().unwrap();
    {
        let controller =
            Controller::from_config(file_config(&dir, CacheBackendKind::Memory)).unwrap();
        controller.store().create("First?", "One.").await.unwrap();
        controller.store().create("Second?", "Two.").await.unwrap();
    }

    let controller = Controller::from_config(file_config(&dir, CacheBackendKind::Memory)).unwrap();
    let all = controller.query().get_all("bn").await.unwrap();

    assert_eq!(all.len(), 2);
    assert_eq!(all[0].question, MockProvider::expected_translation("bn", "Second?"));
}

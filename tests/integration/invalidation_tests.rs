/*!
 * Tests for cache invalidation on writes
 */

use polyfaq::cache::{record_key, CacheBackend};
use polyfaq::errors::FaqError;
use polyfaq::faq::FaqUpdate;

use crate::common::{gated_services, Harness};

#[tokio::test]
async fn test_update_thenGetOne_shouldReflectNewFields() {
    let harness = Harness::new();
    let record = harness.store.create("Old question?", "Old answer.").await.unwrap();

    // Warm the snapshot
    harness.query.get_one(record.id, "en").await.unwrap();

    harness
        .store
        .update(
            record.id,
            FaqUpdate {
                question: Some("New question?".to_string()),
                answer: Some("New answer.".to_string()),
            },
        )
        .await
        .unwrap();

    let resolved = harness.query.get_one(record.id, "en").await.unwrap();
    assert_eq!(resolved.question, "New question?");
    assert_eq!(resolved.answer, "New answer.");
}

#[tokio::test]
async fn test_update_shouldDropListingsOfEveryLanguage() {
    let harness = Harness::new();
    let record = harness.store.create("Question?", "Answer.").await.unwrap();
    for language in ["en", "hi", "bn"] {
        harness.query.get_page(language, 1, 10).await.unwrap();
        harness.query.get_all(language).await.unwrap();
    }

    harness
        .store
        .update(record.id, FaqUpdate::answer("Better answer."))
        .await
        .unwrap();

    for key in ["list:en:1", "list:hi:1", "list:bn:1", "list:en", "list:hi", "list:bn"] {
        assert_eq!(harness.backend.get(key).await.unwrap(), None, "{} survived", key);
    }
    let page = harness.query.get_page("en", 1, 10).await.unwrap();
    assert_eq!(page.results[0].answer, "Better answer.");
}

#[tokio::test]
async fn test_update_shouldKeepTranslationsFromCreation() {
    let harness = Harness::new();
    let record = harness.store.create("Question?", "Answer.").await.unwrap();
    let hindi_before = harness.query.get_one(record.id, "hi").await.unwrap();

    harness
        .store
        .update(record.id, FaqUpdate::question("Reworded question?"))
        .await
        .unwrap();

    let hindi_after = harness.query.get_one(record.id, "hi").await.unwrap();
    let english_after = harness.query.get_one(record.id, "en").await.unwrap();
    assert_eq!(hindi_after.question, hindi_before.question);
    assert_eq!(english_after.question, "Reworded question?");
}

#[tokio::test]
async fn test_create_shouldDropExistingListings() {
    let harness = Harness::new();
    harness.store.create("First?", "One.").await.unwrap();
    let before = harness.query.get_page("hi", 1, 10).await.unwrap();
    assert_eq!(before.count, 1);

    let newest = harness.store.create("Second?", "Two.").await.unwrap();

    let after = harness.query.get_page("hi", 1, 10).await.unwrap();
    assert_eq!(after.count, 2);
    assert_eq!(after.results[0].id, newest.id);
    assert_eq!(harness.persistence.list_calls(), 2);
}

#[tokio::test]
async fn test_delete_shouldRemoveSnapshotAndListings() {
    let harness = Harness::new();
    let record = harness.store.create("Question?", "Answer.").await.unwrap();
    harness.query.get_one(record.id, "bn").await.unwrap();
    harness.query.get_page("bn", 1, 10).await.unwrap();

    harness.store.delete(record.id).await.unwrap();

    assert_eq!(harness.backend.get(&record_key(record.id)).await.unwrap(), None);
    assert!(matches!(
        harness.query.get_one(record.id, "bn").await,
        Err(FaqError::NotFound { .. })
    ));
    assert_eq!(harness.query.get_page("bn", 1, 10).await.unwrap().count, 0);
}

#[tokio::test]
async fn test_failedWrites_shouldLeaveCacheUntouched() {
    let harness = Harness::new();
    let record = harness.store.create("Question?", "Answer.").await.unwrap();
    harness.query.get_page("en", 1, 10).await.unwrap();
    let entries_before = harness.cache.len().await;

    let blank = harness.store.update(record.id, FaqUpdate::question("   ")).await;
    let missing = harness.store.delete(record.id + 100).await;

    assert!(matches!(blank, Err(FaqError::Validation(_))));
    assert!(matches!(missing, Err(FaqError::NotFound { .. })));
    assert_eq!(harness.cache.len().await, entries_before);
}

#[tokio::test]
async fn test_update_duringGetOneRefill_shouldNotLeaveStaleSnapshot() {
    let (persistence, store, query) = gated_services();
    let record = store.create("Old?", "Answer.").await.unwrap();
    store.cache().clear().await;

    persistence.hold_next_read();
    let reader = tokio::spawn({
        let query = query.clone();
        async move { query.get_one(record.id, "en").await }
    });
    persistence.read_done.notified().await;

    store.update(record.id, FaqUpdate::question("New?")).await.unwrap();
    persistence.release();

    // The in-flight read may return what it loaded, but must not cache it
    assert_eq!(reader.await.unwrap().unwrap().question, "Old?");
    assert!(store.cache().get::<serde_json::Value>(&record_key(record.id)).await.is_none());
    assert_eq!(query.get_one(record.id, "en").await.unwrap().question, "New?");
}

#[tokio::test]
async fn test_create_duringGetPageRefill_shouldNotLeaveStaleListing() {
    let (persistence, store, query) = gated_services();
    store.create("First?", "One.").await.unwrap();

    persistence.hold_next_read();
    let reader = tokio::spawn({
        let query = query.clone();
        async move { query.get_page("en", 1, 10).await }
    });
    persistence.read_done.notified().await;

    store.create("Second?", "Two.").await.unwrap();
    persistence.release();

    assert_eq!(reader.await.unwrap().unwrap().count, 1);
    let page = query.get_page("en", 1, 10).await.unwrap();
    assert_eq!(page.count, 2);
    assert_eq!(page.results[0].question, "Second?");
}

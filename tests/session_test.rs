mod common;

use std::{sync::Arc, time::Duration};

use common::{FakeCatalog, FakeSettings, make_track};
use tokio::sync::Notify;

use swipecli::management::{
    BATCH_SIZE, LOW_WATER_MARK, RecommendationEngine, SwipeSession,
};
use swipecli::types::MusicFilter;

fn jazz_filter() -> MusicFilter {
    MusicFilter {
        selected_genres: vec!["jazz".to_string()],
        ..MusicFilter::default()
    }
}

/// A session over a fake that answers every search with `count` distinct
/// canned tracks.
fn session_with_canned(count: usize) -> SwipeSession<FakeCatalog> {
    let canned: Vec<_> = (0..count)
        .map(|i| make_track(&format!("c{}", i), &format!("Canned {}", i), "Artist"))
        .collect();

    let catalog = FakeCatalog::new(FakeSettings {
        canned_search: Some(canned),
        ..FakeSettings::default()
    });

    SwipeSession::new(RecommendationEngine::new(catalog), jazz_filter())
}

#[tokio::test]
async fn test_refill_populates_buffer() {
    let session = session_with_canned(BATCH_SIZE);

    assert_eq!(session.remaining(), 0);
    assert!(session.current().is_none());

    let appended = session.refill().await.unwrap();

    assert_eq!(appended, BATCH_SIZE);
    assert_eq!(session.remaining(), BATCH_SIZE);
    assert!(session.current().is_some());
}

#[tokio::test]
async fn test_swipe_records_verdicts_and_advances() {
    let session = session_with_canned(BATCH_SIZE);
    session.refill().await.unwrap();

    let first = session.current().unwrap();
    session.record_swipe(true);

    let second = session.current().unwrap();
    assert_ne!(first.id, second.id);
    session.record_swipe(false);

    assert_eq!(session.liked().len(), 1);
    assert_eq!(session.liked()[0].id, first.id);
    assert_eq!(session.disliked().len(), 1);
    assert_eq!(session.disliked()[0].id, second.id);
    assert_eq!(session.remaining(), BATCH_SIZE - 2);
}

#[tokio::test]
async fn test_swipe_on_empty_buffer_is_a_noop() {
    let session = session_with_canned(BATCH_SIZE);
    assert_eq!(session.record_swipe(true), None);
    assert!(session.liked().is_empty());
}

#[tokio::test]
async fn test_low_water_mark_signals_refill() {
    let session = session_with_canned(BATCH_SIZE);
    session.refill().await.unwrap();

    // Draining down to exactly the low-water mark does not signal yet
    for _ in 0..(BATCH_SIZE - LOW_WATER_MARK) {
        assert_eq!(session.record_swipe(true), Some(false));
    }
    assert!(!session.needs_refill());

    // One more swipe crosses the threshold
    assert_eq!(session.record_swipe(true), Some(true));
    assert!(session.needs_refill());
}

#[tokio::test]
async fn test_reset_clears_deck_but_preserves_seen_history() {
    let session = session_with_canned(BATCH_SIZE);
    session.refill().await.unwrap();
    session.record_swipe(true);
    session.record_swipe(false);

    let seen_before = session.seen_count();
    session.reset();

    assert_eq!(session.remaining(), 0);
    assert!(session.current().is_none());
    assert!(session.liked().is_empty());
    assert!(session.disliked().is_empty());
    // Delivered tracks stay excluded across a reset
    assert_eq!(session.seen_count(), seen_before);
}

#[tokio::test]
async fn test_clear_history_allows_tracks_to_reappear() {
    let session = session_with_canned(BATCH_SIZE);
    session.refill().await.unwrap();
    session.reset();

    // The catalog only ever answers with the same already-seen tracks, so
    // a refill finds nothing until the history is cleared.
    assert!(session.refill().await.is_err());

    session.clear_history();
    assert_eq!(session.seen_count(), 0);

    let appended = session.refill().await.unwrap();
    assert_eq!(appended, BATCH_SIZE);
}

#[tokio::test]
async fn test_update_filter_resets_verdicts() {
    let session = session_with_canned(BATCH_SIZE);
    session.refill().await.unwrap();
    session.record_swipe(true);

    let seen_before = session.seen_count();
    session.update_filter(MusicFilter {
        selected_genres: vec!["soul".to_string()],
        ..MusicFilter::default()
    });

    assert_eq!(session.remaining(), 0);
    assert!(session.liked().is_empty());
    assert!(session.disliked().is_empty());
    assert_eq!(session.filter().selected_genres, vec!["soul".to_string()]);
    // Replacing the filter resets the deck, not the seen history
    assert_eq!(session.seen_count(), seen_before);
}

#[tokio::test]
async fn test_stale_refill_is_discarded() {
    let gate = Arc::new(Notify::new());
    let canned: Vec<_> = (0..BATCH_SIZE)
        .map(|i| make_track(&format!("c{}", i), &format!("Canned {}", i), "Artist"))
        .collect();
    let catalog = FakeCatalog::new(FakeSettings {
        canned_search: Some(canned),
        gate: Some(Arc::clone(&gate)),
        ..FakeSettings::default()
    });

    let session = Arc::new(SwipeSession::new(
        RecommendationEngine::new(catalog.clone()),
        jazz_filter(),
    ));

    let refill_session = Arc::clone(&session);
    let refill = tokio::spawn(async move { refill_session.refill().await });

    // Wait for the refill to reach the catalog, then invalidate it
    while catalog.queries().is_empty() {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    session.reset();
    gate.notify_one();

    let appended = refill.await.unwrap().unwrap();
    assert_eq!(appended, 0);
    assert_eq!(session.remaining(), 0);
    assert!(session.current().is_none());
}

mod common;

use std::collections::HashSet;

use common::{FakeCatalog, FakeSettings, make_track};
use swipecli::error::ApiError;
use swipecli::management::RecommendationEngine;
use swipecli::types::MusicFilter;

#[tokio::test]
async fn test_batch_respects_limit() {
    let engine = RecommendationEngine::new(FakeCatalog::seeded());

    let batch = engine.recommend(10, &MusicFilter::default()).await.unwrap();

    assert!(!batch.is_empty());
    assert!(batch.len() <= 10);
}

#[tokio::test]
async fn test_batch_has_no_duplicate_ids() {
    // Every search returns the same three tracks
    let canned = vec![
        make_track("x1", "One", "Artist"),
        make_track("x2", "Two", "Artist"),
        make_track("x3", "Three", "Artist"),
    ];
    let engine = RecommendationEngine::new(FakeCatalog::new(FakeSettings {
        canned_search: Some(canned),
        ..FakeSettings::default()
    }));

    let filter = MusicFilter {
        selected_genres: vec!["jazz".to_string(), "soul".to_string()],
        ..MusicFilter::default()
    };
    let batch = engine.recommend(20, &filter).await.unwrap();

    let ids: HashSet<&str> = batch.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids.len(), batch.len());
    assert_eq!(batch.len(), 3);
}

#[tokio::test]
async fn test_batch_excludes_previously_seen_tracks() {
    let engine = RecommendationEngine::new(FakeCatalog::seeded());
    let filter = MusicFilter::default();

    let first = engine.recommend(10, &filter).await.unwrap();
    let first_ids: HashSet<String> = first.iter().map(|t| t.id.clone()).collect();

    // The fake answers repeated queries with identical tracks, so anything
    // in the second batch must come from a path the first batch never took.
    let second = engine.recommend(10, &filter).await.unwrap();
    for track in &second {
        assert!(
            !first_ids.contains(&track.id),
            "track {} was delivered twice",
            track.id
        );
    }
}

#[tokio::test]
async fn test_marked_seen_tracks_never_reappear() {
    let engine = RecommendationEngine::new(FakeCatalog::seeded());
    let filter = MusicFilter::default();

    let first = engine.recommend(10, &filter).await.unwrap();
    let swiped = first[0].id.clone();
    engine.mark_seen(&swiped);

    assert!(engine.seen_count() >= first.len());

    engine.clear_seen();
    assert_eq!(engine.seen_count(), 0);
}

#[tokio::test]
async fn test_active_filter_skips_personalization() {
    let catalog = FakeCatalog::seeded();
    let engine = RecommendationEngine::new(catalog.clone());

    let filter = MusicFilter {
        selected_genres: vec!["jazz".to_string()],
        year_range: (1960, 1969),
        include_classics: true,
        ..MusicFilter::default()
    };

    let batch = engine.recommend(20, &filter).await.unwrap();
    assert!(!batch.is_empty());

    let queries = catalog.queries();
    assert!(!queries.is_empty());
    for query in &queries {
        assert!(query.contains("jazz"), "unexpected query: {}", query);
        assert!(!query.contains("artist:"), "personalized query issued: {}", query);
    }
    // The nine-year range clamps the classics decade to the range itself
    assert!(queries.contains(&"genre:\"jazz\" year:1960-1969".to_string()));
}

#[tokio::test]
async fn test_personalization_failure_falls_back_to_generic() {
    let catalog = FakeCatalog::new(FakeSettings {
        fail_user: true,
        ..FakeSettings::default()
    });
    let engine = RecommendationEngine::new(catalog.clone());

    let batch = engine.recommend(10, &MusicFilter::default()).await.unwrap();

    assert!(!batch.is_empty());
    // Only plain genre queries over the default genre list were issued
    let queries = catalog.queries();
    assert!(queries.iter().all(|q| q.starts_with("genre:")));
    assert!(queries.iter().any(|q| q.contains("genre:pop")));
    assert!(queries.iter().any(|q| q.contains("genre:electronic")));
}

#[tokio::test]
async fn test_total_failure_yields_no_recommendations() {
    let engine = RecommendationEngine::new(FakeCatalog::new(FakeSettings {
        fail_user: true,
        fail_search: true,
        ..FakeSettings::default()
    }));

    let result = engine.recommend(10, &MusicFilter::default()).await;
    assert!(matches!(result, Err(ApiError::NoRecommendations)));
}

#[tokio::test]
async fn test_top_artist_strategy_issues_field_qualified_queries() {
    let catalog = FakeCatalog::seeded();
    let engine = RecommendationEngine::new(catalog.clone());

    engine.recommend(20, &MusicFilter::default()).await.unwrap();

    let queries = catalog.queries();
    assert!(queries.contains(&"artist:Artist One".to_string()));
    assert!(queries.contains(&"artist:Artist Two".to_string()));
    // Similar-artist heuristics around the top tracks' artists
    assert!(queries.contains(&"Artist One similar".to_string()));
    assert!(queries.contains(&"like Artist One".to_string()));
    assert!(queries.contains(&"Artist One style".to_string()));
}

#[tokio::test]
async fn test_trending_keywords_gated_by_toggles() {
    let catalog = FakeCatalog::seeded();
    let engine = RecommendationEngine::new(catalog.clone());

    // No toggles: the keyword strategy must not run
    engine.recommend(20, &MusicFilter::default()).await.unwrap();
    assert!(
        !catalog
            .queries()
            .iter()
            .any(|q| q.starts_with("midnight"))
    );

    // The New toggle alone keeps the filter inactive but enables keywords
    let catalog = FakeCatalog::seeded();
    let engine = RecommendationEngine::new(catalog.clone());
    let filter = MusicFilter {
        include_new: true,
        ..MusicFilter::default()
    };
    engine.recommend(20, &filter).await.unwrap();

    let queries = catalog.queries();
    assert!(
        queries.contains(&"midnight year:2023-2024".to_string()),
        "queries: {:?}",
        queries
    );
}

#[tokio::test]
async fn test_genre_strategy_derives_genres_from_top_artists() {
    let catalog = FakeCatalog::seeded();
    let engine = RecommendationEngine::new(catalog.clone());

    engine.recommend(20, &MusicFilter::default()).await.unwrap();

    let queries = catalog.queries();
    assert!(queries.iter().any(|q| q.contains("indie rock")));
    assert!(queries.iter().any(|q| q.contains("dream pop")));
}

mod common;

use common::make_track;
use swipecli::types::{MusicFilter, TrackTableRow};
use swipecli::utils::*;

#[test]
fn test_generate_code_verifier() {
    let verifier = generate_code_verifier();

    // 32 random bytes base64url-encode to exactly 43 characters without padding
    assert_eq!(verifier.len(), 43);

    // base64url alphabet only
    assert!(
        verifier
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    );
    assert!(!verifier.contains('='));

    // Two generated verifiers should be different
    let verifier2 = generate_code_verifier();
    assert_ne!(verifier, verifier2);
}

#[test]
fn test_generate_code_challenge_is_deterministic() {
    let challenge = generate_code_challenge("test_verifier_123");
    assert_eq!(challenge, generate_code_challenge("test_verifier_123"));
    assert_ne!(challenge, generate_code_challenge("different_verifier"));
}

#[test]
fn test_generate_code_challenge_rfc7636_vector() {
    // Known-answer vector from RFC 7636 appendix B
    let challenge = generate_code_challenge("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk");
    assert_eq!(challenge, "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM");
}

#[test]
fn test_year_qualifier_absent_for_default_range() {
    assert_eq!(year_qualifier(&MusicFilter::default()), None);
}

#[test]
fn test_year_qualifier_for_custom_range() {
    let filter = MusicFilter {
        year_range: (1990, 1999),
        ..MusicFilter::default()
    };
    assert_eq!(year_qualifier(&filter), Some("year:1990-1999".to_string()));
}

#[test]
fn test_toggle_queries_plain() {
    let filter = MusicFilter {
        year_range: (1960, 1969),
        ..MusicFilter::default()
    };

    let queries = toggle_queries("jazz", &filter);
    assert_eq!(queries, vec!["genre:\"jazz\" year:1960-1969".to_string()]);
}

#[test]
fn test_toggle_queries_new() {
    let filter = MusicFilter {
        include_new: true,
        ..MusicFilter::default()
    };

    let queries = toggle_queries("pop", &filter);
    assert_eq!(queries, vec!["genre:\"pop\" year:2023-2024".to_string()]);
}

#[test]
fn test_toggle_queries_classics_clamped_to_range() {
    // A 9-year range is shorter than the 10-year classics window
    let filter = MusicFilter {
        year_range: (1960, 1969),
        include_classics: true,
        ..MusicFilter::default()
    };

    let queries = toggle_queries("jazz", &filter);
    assert_eq!(queries, vec!["genre:\"jazz\" year:1960-1969".to_string()]);

    let wide = MusicFilter {
        year_range: (1960, 1999),
        include_classics: true,
        ..MusicFilter::default()
    };
    assert_eq!(
        toggle_queries("jazz", &wide),
        vec!["genre:\"jazz\" year:1960-1970".to_string()]
    );
}

#[test]
fn test_toggle_queries_all_toggles() {
    let filter = MusicFilter {
        year_range: (2000, 2010),
        include_new: true,
        include_classics: true,
        include_popular: true,
        ..MusicFilter::default()
    };

    let queries = toggle_queries("rock", &filter);
    assert_eq!(
        queries,
        vec![
            "genre:\"rock\" year:2009-2010".to_string(),
            "genre:\"rock\" year:2000-2010".to_string(),
            "rock popular year:2000-2010".to_string(),
        ]
    );
}

#[test]
fn test_toggle_queries_new_clamped_to_single_year_range() {
    let filter = MusicFilter {
        year_range: (2024, 2024),
        include_new: true,
        ..MusicFilter::default()
    };

    assert_eq!(
        toggle_queries("pop", &filter),
        vec!["genre:\"pop\" year:2024-2024".to_string()]
    );
}

#[test]
fn test_generic_query() {
    let filter = MusicFilter::default();
    assert_eq!(generic_query("indie", &filter), "genre:indie year:2020-2024");
}

#[test]
fn test_extract_keywords_ranks_by_frequency() {
    let titles = vec![
        "Midnight Dreams".to_string(),
        "Midnight Rain (feat. Someone)".to_string(),
        "Golden Hour".to_string(),
    ];

    let keywords = extract_keywords(&titles, 3);

    // "midnight" appears twice; the singles tie-break alphabetically
    assert_eq!(keywords[0], "midnight");
    assert_eq!(keywords.len(), 3);
    assert_eq!(keywords[1], "dreams");
}

#[test]
fn test_extract_keywords_drops_short_words_and_stop_words() {
    let titles = vec!["The End of the Road".to_string()];

    // "the"/"of" are stop words or too short; "road" survives
    let keywords = extract_keywords(&titles, 5);
    assert_eq!(keywords, vec!["road".to_string()]);
}

#[test]
fn test_extract_keywords_empty_titles() {
    let keywords = extract_keywords(&[], 3);
    assert!(keywords.is_empty());
}

#[test]
fn test_remove_duplicate_tracks_keeps_first_occurrence() {
    let mut tracks = vec![
        make_track("id1", "First", "Artist A"),
        make_track("id2", "Second", "Artist B"),
        make_track("id1", "First Again", "Artist A"),
    ];

    remove_duplicate_tracks(&mut tracks);

    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[0].name, "First");
    assert_eq!(tracks[1].name, "Second");
}

#[test]
fn test_sort_track_table_rows() {
    let mut rows = vec![
        TrackTableRow {
            track: "Zeta".to_string(),
            artist: "Beta Artist".to_string(),
            album: "Album".to_string(),
        },
        TrackTableRow {
            track: "Alpha".to_string(),
            artist: "Beta Artist".to_string(),
            album: "Album".to_string(),
        },
        TrackTableRow {
            track: "Mid".to_string(),
            artist: "Alpha Artist".to_string(),
            album: "Album".to_string(),
        },
    ];

    sort_track_table_rows(&mut rows);

    assert_eq!(rows[0].artist, "Alpha Artist");
    assert_eq!(rows[1].track, "Alpha");
    assert_eq!(rows[2].track, "Zeta");
}

use std::collections::{HashMap, HashSet};

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::Rng;
use sha2::{Digest, Sha256};

use crate::types::{MusicFilter, Track, TrackTableRow};

/// Words ignored when mining track titles for trending keywords.
pub const STOP_WORDS: [&str; 11] = [
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for",
];

/// Generates a PKCE code verifier: 32 bytes from the thread-local CSPRNG,
/// base64url-encoded without padding (RFC 7636 section 4.1).
pub fn generate_code_verifier() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Derives the S256 code challenge: base64url(SHA-256(verifier)), no padding.
pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Returns a `year:lo-hi` search qualifier when the filter's year range was
/// moved off the default, and nothing otherwise.
pub fn year_qualifier(filter: &MusicFilter) -> Option<String> {
    if filter.year_range == crate::types::DEFAULT_YEAR_RANGE {
        None
    } else {
        let (lo, hi) = filter.year_range;
        Some(format!("year:{}-{}", lo, hi))
    }
}

/// Builds the New/Classics/Popular-gated query set for one genre.
///
/// - New: the last slice of the year range (`hi-1 .. hi`, clamped to `lo`)
/// - Classics: the first 10 years of the range (clamped to `hi`)
/// - Popular: the full range with a "popular" keyword
///
/// Falls back to a single plain genre+year query when no toggle is set, so
/// every genre always yields at least one query.
pub fn toggle_queries(genre: &str, filter: &MusicFilter) -> Vec<String> {
    let (lo, hi) = filter.year_range;
    let mut queries = Vec::new();

    if filter.include_new {
        let new_start = hi.saturating_sub(1).max(lo);
        queries.push(format!("genre:\"{}\" year:{}-{}", genre, new_start, hi));
    }

    if filter.include_classics {
        let classic_end = lo.saturating_add(10).min(hi);
        queries.push(format!("genre:\"{}\" year:{}-{}", genre, lo, classic_end));
    }

    if filter.include_popular {
        queries.push(format!("{} popular year:{}-{}", genre, lo, hi));
    }

    if queries.is_empty() {
        queries.push(format!("genre:\"{}\" year:{}-{}", genre, lo, hi));
    }

    queries
}

/// Plain genre+year query used by the generic fallback path.
pub fn generic_query(genre: &str, filter: &MusicFilter) -> String {
    let (lo, hi) = filter.year_range;
    format!("genre:{} year:{}-{}", genre, lo, hi)
}

/// Mines track titles for the most frequent meaningful words.
///
/// Titles are lowercased and split on non-alphanumeric characters; tokens of
/// three characters or fewer and stop-words are dropped. The survivors are
/// ranked by frequency (ties broken alphabetically for determinism) and the
/// `top` most common are returned.
pub fn extract_keywords(titles: &[String], top: usize) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();

    for title in titles {
        let lowered = title.to_lowercase();
        for word in lowered.split(|c: char| !c.is_alphanumeric()) {
            if word.len() > 3 && !STOP_WORDS.contains(&word) {
                *counts.entry(word.to_string()).or_insert(0) += 1;
            }
        }
    }

    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.into_iter().take(top).map(|(word, _)| word).collect()
}

/// Drops tracks whose id was already seen earlier in the list, keeping the
/// first occurrence.
pub fn remove_duplicate_tracks(tracks: &mut Vec<Track>) {
    let mut seen_ids = HashSet::new();
    tracks.retain(|track| seen_ids.insert(track.id.clone()));
}

/// Sorts table rows by artist, then by track title.
pub fn sort_track_table_rows(rows: &mut Vec<TrackTableRow>) {
    rows.sort_by(|a, b| a.artist.cmp(&b.artist).then_with(|| a.track.cmp(&b.track)));
}

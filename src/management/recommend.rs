use std::{
    collections::HashSet,
    sync::Mutex,
};

use rand::seq::SliceRandom;

use crate::{
    error::ApiError,
    spotify::{Catalog, TimeRange},
    types::{MusicFilter, Track},
    utils, warning,
};

/// Genres used when nothing better is known about the user.
pub const DEFAULT_GENRES: [&str; 5] = ["pop", "rock", "indie", "hip-hop", "electronic"];

/// Multi-strategy candidate aggregator.
///
/// Gathers candidate tracks through several independent search heuristics
/// (the provider offers no native "similar track" endpoint), deduplicates
/// them against everything already delivered this session, shuffles to avoid
/// strategy-ordering bias, and truncates to the requested batch size.
///
/// A single failing strategy never aborts a batch: its error is logged and
/// the batch simply contains fewer tracks. Only when every path, including
/// the generic genre fallback, comes back empty does an error surface.
pub struct RecommendationEngine<C: Catalog> {
    catalog: C,
    /// Track ids already delivered or swiped this session. Grows
    /// monotonically; cleared only by an explicit history reset.
    seen: Mutex<HashSet<String>>,
}

impl<C: Catalog> RecommendationEngine<C> {
    pub fn new(catalog: C) -> Self {
        RecommendationEngine {
            catalog,
            seen: Mutex::new(HashSet::new()),
        }
    }

    /// Produces one aggregation batch of at most `limit` tracks.
    ///
    /// With an active filter (non-default genres or year range) the
    /// personalization strategies are skipped entirely in favor of direct
    /// filtered search. Otherwise four strategies run concurrently:
    /// top-artist tracks, similar-artist tracks, genre tracks, and (when the
    /// New or Popular toggle is on) trending-keyword tracks.
    pub async fn recommend(
        &self,
        limit: usize,
        filter: &MusicFilter,
    ) -> Result<Vec<Track>, ApiError> {
        let gathered = if filter.is_active() {
            match self.filtered_search(limit, filter).await {
                Ok(tracks) => tracks,
                Err(e) => {
                    warning!("Filtered search failed: {}", e);
                    Vec::new()
                }
            }
        } else {
            self.personalized(limit, filter).await
        };

        let batch = self.finish(gathered, limit);
        if !batch.is_empty() {
            return Ok(batch);
        }

        // Nothing personalized survived (perhaps not logged in, perhaps the
        // backend is unhappy): fall back to plain genre searches.
        self.generic(limit, filter).await
    }

    async fn personalized(&self, limit: usize, filter: &MusicFilter) -> Vec<Track> {
        let trending_gated = filter.include_new || filter.include_popular;

        let (top_artists, similar, genres, trending) = tokio::join!(
            self.from_top_artists(limit / 2, filter),
            self.from_similar_artists(limit / 3, filter),
            self.from_genres(limit / 3, filter),
            async {
                if trending_gated {
                    self.from_trending_keywords(limit / 4, filter).await
                } else {
                    Ok(Vec::new())
                }
            },
        );

        let mut all = Vec::new();
        let mut failures = 0usize;
        for (name, result) in [
            ("top artists", top_artists),
            ("similar artists", similar),
            ("genres", genres),
            ("trending keywords", trending),
        ] {
            match result {
                Ok(mut tracks) => all.append(&mut tracks),
                Err(e) => {
                    failures += 1;
                    warning!("Strategy '{}' failed: {}", name, e);
                }
            }
        }

        if failures > 0 {
            warning!("{} of 4 strategies failed for this batch", failures);
        }

        all
    }

    /// Strategy 1: field-qualified searches for the user's top artists.
    async fn from_top_artists(
        &self,
        limit: usize,
        filter: &MusicFilter,
    ) -> Result<Vec<Track>, ApiError> {
        let artist_ids = self.catalog.top_artists(5, TimeRange::Medium).await?;
        let per_artist = (limit / 3).max(1) as u32;
        let year = utils::year_qualifier(filter);

        let mut tracks = Vec::new();
        for artist_id in artist_ids.iter().take(3) {
            let name = match self.catalog.artist_name(artist_id).await {
                Ok(name) => name,
                Err(e) => {
                    warning!("Artist lookup failed for {}: {}", artist_id, e);
                    continue;
                }
            };

            let mut query = format!("artist:{}", name);
            if let Some(year) = &year {
                query.push(' ');
                query.push_str(year);
            }

            match self.catalog.search_tracks(&query, per_artist).await {
                Ok(mut found) => tracks.append(&mut found),
                Err(e) => warning!("Search '{}' failed: {}", query, e),
            }
        }

        Ok(tracks)
    }

    /// Strategy 2: heuristic free-text queries around the artists behind the
    /// user's top tracks.
    async fn from_similar_artists(
        &self,
        limit: usize,
        filter: &MusicFilter,
    ) -> Result<Vec<Track>, ApiError> {
        let top_tracks = self.catalog.top_tracks(10, TimeRange::Medium).await?;

        // Distinct primary artists, preserving first-seen order.
        let mut artist_names: Vec<String> = Vec::new();
        for track in &top_tracks {
            if let Some(artist) = track.artists.first() {
                if !artist_names.contains(&artist.name) {
                    artist_names.push(artist.name.clone());
                }
            }
        }

        let year = utils::year_qualifier(filter);
        let mut tracks = Vec::new();

        for name in artist_names.iter().take(3) {
            let templates = [
                format!("{} similar", name),
                format!("like {}", name),
                format!("{} style", name),
            ];

            for template in templates {
                let query = match &year {
                    Some(year) => format!("{} {}", template, year),
                    None => template,
                };

                match self.catalog.search_tracks(&query, 3).await {
                    Ok(mut found) => tracks.append(&mut found),
                    Err(e) => warning!("Search '{}' failed: {}", query, e),
                }
            }
        }

        tracks.truncate(limit.max(1));
        Ok(tracks)
    }

    /// Strategy 3: genre searches, seeded either by the filter's selection
    /// or by the union of the top artists' genre tags.
    async fn from_genres(
        &self,
        limit: usize,
        filter: &MusicFilter,
    ) -> Result<Vec<Track>, ApiError> {
        let mut genres: Vec<String> = if !filter.selected_genres.is_empty() {
            filter.selected_genres.clone()
        } else {
            let artist_ids = self.catalog.top_artists(5, TimeRange::Medium).await?;
            let mut derived = Vec::new();
            for artist_id in &artist_ids {
                match self.catalog.artist_genres(artist_id).await {
                    Ok(artist_genres) => {
                        for genre in artist_genres {
                            if !derived.contains(&genre) {
                                derived.push(genre);
                            }
                        }
                    }
                    Err(e) => warning!("Genre lookup failed for {}: {}", artist_id, e),
                }
            }
            derived
        };
        genres.truncate(5);

        let mut tracks = Vec::new();
        for genre in &genres {
            let queries = utils::toggle_queries(genre, filter);
            let per_query = (limit / (genres.len() * queries.len()).max(1)).max(1) as u32;

            for query in queries {
                match self.catalog.search_tracks(&query, per_query).await {
                    Ok(mut found) => tracks.append(&mut found),
                    Err(e) => warning!("Search '{}' failed: {}", query, e),
                }
            }
        }

        Ok(tracks)
    }

    /// Strategy 4: frequent meaningful words from recent top-track titles,
    /// searched as free text. Only runs when New or Popular is toggled on.
    async fn from_trending_keywords(
        &self,
        limit: usize,
        filter: &MusicFilter,
    ) -> Result<Vec<Track>, ApiError> {
        let top_tracks = self.catalog.top_tracks(5, TimeRange::Medium).await?;
        let titles: Vec<String> = top_tracks.iter().map(|t| t.name.clone()).collect();
        let keywords = utils::extract_keywords(&titles, 3);

        let (lo, hi) = filter.year_range;
        let per_keyword = (limit / 3).max(1) as u32;
        let mut tracks = Vec::new();

        for keyword in keywords {
            let query = if filter.include_new {
                format!("{} year:{}-{}", keyword, hi.saturating_sub(1).max(lo), hi)
            } else {
                format!("{} year:{}-{}", keyword, lo, hi)
            };

            match self.catalog.search_tracks(&query, per_keyword).await {
                Ok(mut found) => tracks.append(&mut found),
                Err(e) => warning!("Search '{}' failed: {}", query, e),
            }
        }

        Ok(tracks)
    }

    /// Strategy 5: direct filtered search, replacing the personalization
    /// strategies entirely while a filter is active.
    async fn filtered_search(
        &self,
        limit: usize,
        filter: &MusicFilter,
    ) -> Result<Vec<Track>, ApiError> {
        let genres: Vec<String> = if filter.selected_genres.is_empty() {
            DEFAULT_GENRES.iter().map(|g| g.to_string()).collect()
        } else {
            filter.selected_genres.clone()
        };

        let per_genre = (limit / genres.len().max(1)).max(5);
        let mut tracks = Vec::new();

        for genre in &genres {
            let queries = utils::toggle_queries(genre, filter);
            let per_query = (per_genre / queries.len().max(1)).max(3) as u32;

            for query in queries {
                match self.catalog.search_tracks(&query, per_query).await {
                    Ok(mut found) => tracks.append(&mut found),
                    Err(e) => warning!("Search '{}' failed: {}", query, e),
                }
            }
        }

        Ok(tracks)
    }

    /// Last resort: plain genre+year searches over the selected or default
    /// genre list, no personalization required.
    async fn generic(&self, limit: usize, filter: &MusicFilter) -> Result<Vec<Track>, ApiError> {
        let genres: Vec<String> = if filter.selected_genres.is_empty() {
            DEFAULT_GENRES.iter().map(|g| g.to_string()).collect()
        } else {
            filter.selected_genres.clone()
        };

        let per_genre = (limit / genres.len().max(1)).max(1) as u32;
        let mut tracks = Vec::new();

        for genre in &genres {
            let query = utils::generic_query(genre, filter);
            match self.catalog.search_tracks(&query, per_genre).await {
                Ok(mut found) => tracks.append(&mut found),
                Err(e) => warning!("Fallback search '{}' failed: {}", query, e),
            }
        }

        let batch = self.finish(tracks, limit);
        if batch.is_empty() {
            return Err(ApiError::NoRecommendations);
        }
        Ok(batch)
    }

    /// Merge finishing: drop tracks already seen this session or duplicated
    /// within the merge, record the survivors as seen, shuffle uniformly,
    /// truncate to the batch limit.
    fn finish(&self, tracks: Vec<Track>, limit: usize) -> Vec<Track> {
        let mut unique = Vec::new();
        {
            let mut seen = self.seen.lock().unwrap();
            let mut batch_ids: HashSet<String> = HashSet::new();

            for track in tracks {
                if seen.contains(&track.id) || batch_ids.contains(&track.id) {
                    continue;
                }
                batch_ids.insert(track.id.clone());
                unique.push(track);
            }

            // Survivors are seen even if the truncation below cuts them:
            // they were consumed from the candidate pool either way.
            seen.extend(batch_ids);
        }

        unique.shuffle(&mut rand::rng());
        unique.truncate(limit);
        unique
    }

    /// Records a swipe-decision id so the track never reappears.
    pub fn mark_seen(&self, track_id: &str) {
        self.seen.lock().unwrap().insert(track_id.to_string());
    }

    /// Explicit "clear history": the only way the seen-set shrinks.
    pub fn clear_seen(&self) {
        self.seen.lock().unwrap().clear();
    }

    pub fn seen_count(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

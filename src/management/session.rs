use std::sync::Mutex;

use crate::{
    error::ApiError,
    management::RecommendationEngine,
    spotify::Catalog,
    types::{MusicFilter, Track},
};

/// Tracks fetched per refill round.
pub const BATCH_SIZE: usize = 20;

/// Remaining-track threshold below which a refill should be started.
pub const LOW_WATER_MARK: usize = 5;

struct SessionInner {
    /// Tracks delivered but not yet swiped, in presentation order.
    buffer: Vec<Track>,
    cursor: usize,
    liked: Vec<Track>,
    disliked: Vec<Track>,
    filter: MusicFilter,
    /// Bumped on every reset or filter change. A refill started against an
    /// older generation discards its result instead of appending stale
    /// tracks to the new deck.
    generation: u64,
}

/// One swipe session: the presentation buffer, the swipe verdicts, and the
/// active filter.
///
/// State sits behind a plain mutex so the session can be shared between the
/// interactive loop and a background refill task. The lock is never held
/// across an await; [`refill`](Self::refill) snapshots what it needs, runs
/// the aggregation unlocked, and re-validates the generation before
/// appending.
pub struct SwipeSession<C: Catalog> {
    engine: RecommendationEngine<C>,
    inner: Mutex<SessionInner>,
}

impl<C: Catalog> SwipeSession<C> {
    pub fn new(engine: RecommendationEngine<C>, filter: MusicFilter) -> Self {
        SwipeSession {
            engine,
            inner: Mutex::new(SessionInner {
                buffer: Vec::new(),
                cursor: 0,
                liked: Vec::new(),
                disliked: Vec::new(),
                filter,
                generation: 0,
            }),
        }
    }

    /// The track currently up for a verdict.
    pub fn current(&self) -> Option<Track> {
        let inner = self.inner.lock().unwrap();
        inner.buffer.get(inner.cursor).cloned()
    }

    /// Unswiped tracks left in the buffer, including the current one.
    pub fn remaining(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.buffer.len().saturating_sub(inner.cursor)
    }

    /// Records a verdict on the current track and advances the cursor.
    ///
    /// Returns `None` when the buffer is exhausted, otherwise whether the
    /// remaining count has dropped below the low-water mark and a refill
    /// should be started.
    pub fn record_swipe(&self, liked: bool) -> Option<bool> {
        let mut inner = self.inner.lock().unwrap();
        let track = inner.buffer.get(inner.cursor)?.clone();
        inner.cursor += 1;

        self.engine.mark_seen(&track.id);
        if liked {
            inner.liked.push(track);
        } else {
            inner.disliked.push(track);
        }

        let remaining = inner.buffer.len() - inner.cursor;
        Some(remaining < LOW_WATER_MARK)
    }

    /// Whether the buffer has drained below the low-water mark.
    pub fn needs_refill(&self) -> bool {
        self.remaining() < LOW_WATER_MARK
    }

    /// Fetches one aggregation batch and appends it to the buffer.
    ///
    /// Returns the number of tracks appended. A reset or filter change while
    /// the fetch was in flight makes the result stale; it is dropped and the
    /// call reports zero.
    pub async fn refill(&self) -> Result<usize, ApiError> {
        let (generation, filter) = {
            let inner = self.inner.lock().unwrap();
            (inner.generation, inner.filter.clone())
        };

        let batch = self.engine.recommend(BATCH_SIZE, &filter).await?;

        let mut inner = self.inner.lock().unwrap();
        if inner.generation != generation {
            return Ok(0);
        }

        let appended = batch.len();
        inner.buffer.extend(batch);
        Ok(appended)
    }

    /// Discards the buffer and both verdict lists and invalidates any
    /// in-flight refill. The seen history survives: already-delivered
    /// tracks stay excluded until [`clear_history`](Self::clear_history).
    pub fn reset(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.buffer.clear();
        inner.cursor = 0;
        inner.liked.clear();
        inner.disliked.clear();
        inner.generation += 1;
    }

    /// Forgets which tracks have been delivered this session, allowing them
    /// to be recommended again. Separate from [`reset`](Self::reset); this
    /// is the only way the seen-set shrinks.
    pub fn clear_history(&self) {
        self.engine.clear_seen();
    }

    /// Swaps the active filter and resets the session: buffer and verdict
    /// lists are discarded, the seen-set survives.
    pub fn update_filter(&self, filter: MusicFilter) {
        let mut inner = self.inner.lock().unwrap();
        inner.filter = filter;
        inner.buffer.clear();
        inner.cursor = 0;
        inner.liked.clear();
        inner.disliked.clear();
        inner.generation += 1;
    }

    pub fn filter(&self) -> MusicFilter {
        self.inner.lock().unwrap().filter.clone()
    }

    pub fn liked(&self) -> Vec<Track> {
        self.inner.lock().unwrap().liked.clone()
    }

    pub fn disliked(&self) -> Vec<Track> {
        self.inner.lock().unwrap().disliked.clone()
    }

    /// Size of the engine's seen-set, for status output.
    pub fn seen_count(&self) -> usize {
        self.engine.seen_count()
    }
}

use std::{sync::Arc, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};
use tabled::Table;

use crate::{
    config, error,
    management::{FileTokenStore, RecommendationEngine},
    spotify::{auth::AuthManager, catalog::SpotifyCatalog},
    success,
    types::{MusicFilter, TrackTableRow},
    utils,
};

/// Fetches one recommendation batch and prints it as a table.
///
/// Works with or without a logged-in user: without one the engine's
/// personalization strategies fail quietly and the generic genre fallback
/// fills the batch (provided an app-level credential is configured).
pub async fn discover(limit: usize, filter: MusicFilter) {
    let config = config::AuthConfig::from_env();
    let api_url = config.api_url.clone();
    let auth = Arc::new(AuthManager::new(config, FileTokenStore::new()));
    auth.restore().await;

    let catalog = SpotifyCatalog::new(Arc::clone(&auth), api_url);
    let engine = RecommendationEngine::new(catalog);

    let pb = ProgressBar::new_spinner();
    pb.set_message("Aggregating recommendations...");
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );

    let tracks = match engine.recommend(limit, &filter).await {
        Ok(tracks) => tracks,
        Err(e) => {
            pb.finish_and_clear();
            error!("No recommendations available: {}", e);
        }
    };
    pb.finish_and_clear();

    let mut rows: Vec<TrackTableRow> = tracks.iter().map(TrackTableRow::from).collect();
    utils::sort_track_table_rows(&mut rows);

    let table = Table::new(rows);
    println!("{}", table);
    success!("Found {} tracks.", tracks.len());
}

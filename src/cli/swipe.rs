use std::{sync::Arc, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::{
    config, error, info,
    management::{FileTokenStore, RecommendationEngine, SwipeSession},
    spotify::{auth::AuthManager, catalog::SpotifyCatalog},
    success,
    types::{MusicFilter, Track},
    warning,
};

/// Runs the interactive swipe loop.
///
/// Presents one track at a time and reads verdicts from stdin. When the
/// buffer drains below the low-water mark a background refill task is
/// spawned so the loop rarely has to wait for the network. On quit, the
/// liked tracks can be exported to a new private playlist.
pub async fn swipe(playlist: Option<String>, filter: MusicFilter) {
    let config = config::AuthConfig::from_env();
    let api_url = config.api_url.clone();
    let auth = Arc::new(AuthManager::new(config, FileTokenStore::new()));
    auth.restore().await;

    let catalog = SpotifyCatalog::new(Arc::clone(&auth), api_url.clone());
    let engine = RecommendationEngine::new(catalog);
    let session = Arc::new(SwipeSession::new(engine, filter));

    let pb = spinner("Fetching first batch...");
    match session.refill().await {
        Ok(0) => {
            pb.finish_and_clear();
            error!("No recommendations available.");
        }
        Ok(_) => pb.finish_and_clear(),
        Err(e) => {
            pb.finish_and_clear();
            error!("Cannot fetch recommendations: {}", e);
        }
    }

    info!("Commands: [l]ike, [d]islike, [r]eset, [q]uit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let Some(track) = session.current() else {
            let pb = spinner("Fetching more tracks...");
            let refilled = session.refill().await;
            pb.finish_and_clear();

            match refilled {
                Ok(n) if n > 0 => continue,
                Ok(_) => {
                    info!("No more recommendations.");
                    break;
                }
                Err(e) => {
                    warning!("Refill failed: {}", e);
                    break;
                }
            }
        };

        present(&track, session.remaining());

        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            _ => break,
        };

        match line.trim() {
            "l" | "like" => swipe_current(&session, true),
            "d" | "dislike" => swipe_current(&session, false),
            "r" | "reset" => {
                session.reset();
                session.clear_history();
                info!("History cleared, fetching a fresh deck...");
            }
            "q" | "quit" => break,
            "" => {}
            other => warning!("Unknown command: {}", other),
        }
    }

    let liked = session.liked();
    success!(
        "Session done: {} liked, {} disliked.",
        liked.len(),
        session.disliked().len()
    );

    if let Some(name) = playlist {
        if liked.is_empty() {
            warning!("No liked tracks to export.");
            return;
        }
        export_playlist(&auth, &api_url, &name, &liked).await;
    }
}

fn present(track: &Track, remaining: usize) {
    info!(
        "{} - {} ({}) [{} left]",
        track.name,
        track.primary_artist(),
        track.album.name,
        remaining
    );
}

fn swipe_current(session: &Arc<SwipeSession<SpotifyCatalog<FileTokenStore>>>, liked: bool) {
    let Some(needs_refill) = session.record_swipe(liked) else {
        return;
    };

    if needs_refill {
        let background = Arc::clone(session);
        tokio::spawn(async move {
            if let Err(e) = background.refill().await {
                warning!("Background refill failed: {}", e);
            }
        });
    }
}

/// Exports the liked tracks into a new private playlist.
async fn export_playlist(
    auth: &Arc<AuthManager<FileTokenStore>>,
    api_url: &str,
    name: &str,
    liked: &[Track],
) {
    let catalog = SpotifyCatalog::new(Arc::clone(auth), api_url.to_string());

    let pb = spinner("Creating playlist...");
    let created = match catalog.create_playlist(name, "Liked in a swipecli session").await {
        Ok(created) => created,
        Err(e) => {
            pb.finish_and_clear();
            error!("Failed to create playlist: {}", e);
        }
    };

    if let Err(e) = catalog.add_tracks(&created.id, liked).await {
        pb.finish_and_clear();
        error!("Failed to add tracks to playlist: {}", e);
    }

    pb.finish_and_clear();
    success!("Exported {} tracks to playlist '{}'.", liked.len(), created.name);
}

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb
}

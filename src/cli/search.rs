use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tabled::Table;

use crate::{
    cli::auth::{load_credentials, new_authorizer},
    error,
    management::TokenManager,
    spotify::search::{SearchFilters, Searcher},
    success,
    types::TrackTableRow,
    utils, warning,
};

pub async fn search(artist: String, title: String, filters: SearchFilters) {
    let credentials = load_credentials();
    let token_mgr = TokenManager::new();

    let token = match token_mgr.load().await {
        Ok(t) => t,
        Err(e) => {
            error!(
                "Failed to load token. Please run tracksformer auth\n Error: {}",
                e
            );
        }
    };

    let mut authorizer = new_authorizer().with_token(token);
    if let Err(e) = token_mgr.ensure_fresh(&mut authorizer, &credentials).await {
        error!(
            "Failed to refresh token. Please run tracksformer auth\n Error: {}",
            e
        );
    }

    let searcher = match Searcher::from_config() {
        Ok(s) => s,
        Err(e) => error!("Invalid API configuration. Err: {}", e),
    };

    let pb = ProgressBar::new_spinner();
    pb.set_message(format!("Searching for {title} by {artist}..."));
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }

    let result = searcher
        .track_search(&authorizer, &artist, &title, &filters)
        .await;
    pb.finish_and_clear();

    match result {
        Ok(tracks) if tracks.is_empty() => {
            warning!("No tracks found for {} by {}.", title, artist)
        }
        Ok(tracks) => {
            let count = tracks.len();
            let rows: Vec<TrackTableRow> = tracks.into_iter().map(utils::track_to_table_row).collect();
            println!("{}", Table::new(rows));
            success!("Found {} tracks.", count);
        }
        Err(e) => error!("Search failed. Err: {}", e),
    }
}

use base64::{
    Engine,
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
};
use rand::RngCore;

use crate::types::{AuthorizationState, Track, TrackTableRow};

/// Number of random bytes behind every authorization state.
pub const STATE_BYTES: usize = 32;

pub fn generate_state() -> AuthorizationState {
    let mut bytes = [0u8; STATE_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    AuthorizationState::new(URL_SAFE_NO_PAD.encode(bytes))
}

/// Builds the `Authorization` header value for HTTP Basic client authentication.
pub fn basic_auth_header(client_id: &str, client_secret: &str) -> String {
    let encoded = STANDARD.encode(format!("{client_id}:{client_secret}"));
    format!("Basic {encoded}")
}

pub fn format_duration_ms(duration_ms: u64) -> String {
    let total_secs = duration_ms / 1000;
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

pub fn track_to_table_row(track: Track) -> TrackTableRow {
    let (album, released) = match track.album {
        Some(album) => (album.name, album.release_date.unwrap_or_default()),
        None => (String::new(), String::new()),
    };

    TrackTableRow {
        name: track.name,
        artists: track
            .artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        album,
        released,
        length: track.duration_ms.map(format_duration_ms).unwrap_or_default(),
        uri: track.uri,
    }
}

//! URL recognition helpers.
//!
//! YouTube links get their video ID pulled out for logging. Other URLs are
//! still handed to the downloader, which understands many sites.

use thiserror::Error;
use url::Url;

/// Errors that can occur during YouTube ID extraction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum YoutubeIdError {
    #[error("URL could not be parsed")]
    InvalidUrl,
    #[error("URL is not a valid YouTube URL")]
    InvalidYoutubeUrl,
    #[error("Video ID has invalid format")]
    InvalidVideoId,
    #[error("Video ID not found in URL")]
    VideoIdNotFound,
}

/// Result type for YouTube ID extraction.
pub type YoutubeIdResult<T> = Result<T, YoutubeIdError>;

/// Check whether a URL points at YouTube.
pub fn is_youtube_url(url: &str) -> bool {
    Url::parse(url.trim())
        .ok()
        .and_then(|parsed| parsed.host_str().map(is_youtube_host))
        .unwrap_or(false)
}

fn is_youtube_host(host: &str) -> bool {
    let host = host.to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    let host = host.strip_prefix("m.").unwrap_or(host);
    host == "youtube.com" || host == "youtu.be" || host == "music.youtube.com"
}

/// Extract the 11-character video ID from a YouTube URL.
///
/// Handles `watch?v=`, `youtu.be/`, `/embed/`, `/v/` and `/shorts/` forms.
pub fn extract_youtube_id(url: &str) -> YoutubeIdResult<String> {
    let parsed = Url::parse(url.trim()).map_err(|_| YoutubeIdError::InvalidUrl)?;
    let host = parsed.host_str().ok_or(YoutubeIdError::InvalidYoutubeUrl)?;

    if !is_youtube_host(host) {
        return Err(YoutubeIdError::InvalidYoutubeUrl);
    }

    if let Some((_, id)) = parsed.query_pairs().find(|(key, _)| key == "v") {
        return validate_youtube_id(&id);
    }

    let segments = parsed
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect::<Vec<_>>())
        .unwrap_or_default();

    let id = if host.ends_with("youtu.be") {
        segments.first().copied()
    } else {
        match segments.as_slice() {
            ["embed", id, ..] | ["v", id, ..] | ["shorts", id, ..] => Some(*id),
            _ => None,
        }
    };

    match id {
        Some(id) => validate_youtube_id(id),
        None => Err(YoutubeIdError::VideoIdNotFound),
    }
}

fn validate_youtube_id(id: &str) -> YoutubeIdResult<String> {
    let id = id.trim();
    if id.len() != 11 {
        return Err(YoutubeIdError::InvalidVideoId);
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(YoutubeIdError::InvalidVideoId);
    }
    Ok(id.to_string())
}

use std::time::Duration;

/// Display and playback data for one resolved track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackMetadata {
    pub title: String,
    /// Direct audio stream. These expire after a few hours.
    pub stream_url: String,
    pub thumbnail: Option<String>,
    pub page_url: Option<String>,
    pub duration: Option<Duration>,
}

impl TrackMetadata {
    pub fn new(title: impl Into<String>, stream_url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            stream_url: stream_url.into(),
            thumbnail: None,
            page_url: None,
            duration: None,
        }
    }
}

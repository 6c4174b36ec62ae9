use super::{MusicError, TrackMetadata};
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

lazy_static! {
    static ref VIDEO_URL: Regex =
        Regex::new(r"^https://www\.youtube\.com/watch\?v=[\w-]+$").expect("valid video pattern");
    static ref CATALOG_URL: Regex = Regex::new(
        r"^https://open\.spotify\.com/(track|album|playlist)/([\w-]+)(\?.*)?$"
    )
    .expect("valid catalog pattern");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    Track,
    Album,
    Playlist,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogLink {
    pub kind: CatalogKind,
    pub id: String,
}

/// What a `play` argument turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackRequest {
    Video(String),
    Catalog(CatalogLink),
    Search(String),
}

impl TrackRequest {
    pub fn classify(input: &str) -> Self {
        let input = input.trim();
        if VIDEO_URL.is_match(input) {
            return Self::Video(input.to_string());
        }
        if let Some(captures) = CATALOG_URL.captures(input) {
            let kind = match &captures[1] {
                "track" => CatalogKind::Track,
                "album" => CatalogKind::Album,
                _ => CatalogKind::Playlist,
            };
            return Self::Catalog(CatalogLink {
                kind,
                id: captures[2].to_string(),
            });
        }
        Self::Search(input.to_string())
    }
}

/// A recommended track, as returned by the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendation {
    pub artist: String,
    pub song: String,
}

/// Turns video links and free text into playable tracks.
#[async_trait]
pub trait VideoSource: Send + Sync {
    async fn extract(&self, url: &str) -> anyhow::Result<Option<TrackMetadata>>;
    /// First search result for `query`.
    async fn search(&self, query: &str) -> anyhow::Result<Option<TrackMetadata>>;
}

/// Music catalog lookups (tracks, albums, playlists, recommendations).
#[async_trait]
pub trait Catalog: Send + Sync {
    /// One `"{name} {primary artist}"` search query per track behind the link, in catalog order.
    async fn track_queries(&self, link: &CatalogLink) -> anyhow::Result<Vec<String>>;
    async fn recommend(&self, song: &str, artist: &str) -> anyhow::Result<Option<Recommendation>>;
}

pub struct TrackResolver {
    video: Arc<dyn VideoSource>,
    catalog: Option<Arc<dyn Catalog>>,
    timeout: Duration,
}

impl TrackResolver {
    pub fn new(
        video: Arc<dyn VideoSource>,
        catalog: Option<Arc<dyn Catalog>>,
        timeout: Duration,
    ) -> Self {
        Self {
            video,
            catalog,
            timeout,
        }
    }

    pub fn has_catalog(&self) -> bool {
        self.catalog.is_some()
    }

    /// Resolves user input into zero or more tracks. An empty result means nothing was found.
    pub async fn resolve(&self, input: &str) -> Result<Vec<TrackMetadata>, MusicError> {
        match TrackRequest::classify(input) {
            TrackRequest::Video(url) => Ok(self.extract(&url).await?.into_iter().collect()),
            TrackRequest::Search(query) => Ok(self.search(&query).await?.into_iter().collect()),
            TrackRequest::Catalog(link) => self.resolve_catalog(&link).await,
        }
    }

    pub async fn extract(&self, url: &str) -> Result<Option<TrackMetadata>, MusicError> {
        self.timed("extracting a video", self.video.extract(url))
            .await?
            .map_err(MusicError::Resolve)
    }

    pub async fn search(&self, query: &str) -> Result<Option<TrackMetadata>, MusicError> {
        self.timed("searching for a video", self.video.search(query))
            .await?
            .map_err(MusicError::Resolve)
    }

    pub async fn recommend(
        &self,
        song: &str,
        artist: &str,
    ) -> Result<Option<Recommendation>, MusicError> {
        let catalog = self.catalog.as_ref().ok_or(MusicError::CatalogUnavailable)?;
        self.timed("asking for a recommendation", catalog.recommend(song, artist))
            .await?
            .map_err(MusicError::Resolve)
    }

    async fn resolve_catalog(&self, link: &CatalogLink) -> Result<Vec<TrackMetadata>, MusicError> {
        let catalog = self.catalog.as_ref().ok_or(MusicError::CatalogUnavailable)?;
        let queries = self
            .timed("reading the Spotify link", catalog.track_queries(link))
            .await?
            .map_err(MusicError::Resolve)?;
        debug!("Catalog link {:?} expanded into {} queries", link, queries.len());

        let mut tracks = Vec::with_capacity(queries.len());
        for query in &queries {
            match self.search(query).await {
                Ok(Some(track)) => tracks.push(track),
                Ok(None) => warn!("No video found for catalog track '{}'", query),
                Err(e) => warn!("Skipping catalog track '{}': {}", query, e),
            }
        }
        Ok(tracks)
    }

    async fn timed<T>(
        &self,
        what: &'static str,
        fut: impl Future<Output = T>,
    ) -> Result<T, MusicError> {
        tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| MusicError::Timeout(self.timeout, what))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Resolves any query listed in `known`; everything else is "not found",
    /// queries in `failing` return an error.
    #[derive(Default)]
    pub(crate) struct FakeVideos {
        pub known: HashMap<String, TrackMetadata>,
        pub failing: Vec<String>,
        pub slow: bool,
    }

    impl FakeVideos {
        pub fn with(titles: &[&str]) -> Self {
            let known = titles
                .iter()
                .map(|t| {
                    let track = TrackMetadata::new(*t, format!("https://audio.example/{t}"));
                    (t.to_string(), track)
                })
                .collect();
            Self {
                known,
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl VideoSource for FakeVideos {
        async fn extract(&self, url: &str) -> anyhow::Result<Option<TrackMetadata>> {
            self.search(url).await
        }

        async fn search(&self, query: &str) -> anyhow::Result<Option<TrackMetadata>> {
            if self.slow {
                tokio::time::sleep(Duration::from_secs(60)).await;
            }
            if self.failing.iter().any(|q| q == query) {
                anyhow::bail!("extractor crashed on {query}");
            }
            Ok(self.known.get(query).cloned())
        }
    }

    /// `failing` makes recommendations error out, `slow` makes them hang.
    #[derive(Default)]
    pub(crate) struct FakeCatalog {
        pub queries: Vec<String>,
        pub recommendation: Option<Recommendation>,
        pub failing: bool,
        pub slow: bool,
    }

    #[async_trait]
    impl Catalog for FakeCatalog {
        async fn track_queries(&self, _link: &CatalogLink) -> anyhow::Result<Vec<String>> {
            Ok(self.queries.clone())
        }

        async fn recommend(
            &self,
            _song: &str,
            _artist: &str,
        ) -> anyhow::Result<Option<Recommendation>> {
            if self.slow {
                tokio::time::sleep(Duration::from_secs(60)).await;
            }
            if self.failing {
                anyhow::bail!("catalog unavailable");
            }
            Ok(self.recommendation.clone())
        }
    }

    fn resolver(videos: FakeVideos, catalog: Option<FakeCatalog>) -> TrackResolver {
        TrackResolver::new(
            Arc::new(videos),
            catalog.map(|c| Arc::new(c) as Arc<dyn Catalog>),
            Duration::from_secs(5),
        )
    }

    #[test]
    fn classifies_video_links() {
        let url = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";
        assert_eq!(TrackRequest::classify(url), TrackRequest::Video(url.to_string()));
        // Extra query parameters are not an exact video link
        assert!(matches!(
            TrackRequest::classify("https://www.youtube.com/watch?v=abc&t=10"),
            TrackRequest::Search(_)
        ));
    }

    #[test]
    fn classifies_catalog_links() {
        assert_eq!(
            TrackRequest::classify(
                "https://open.spotify.com/playlist/37i9dQZF1DXcBWIGoYBM5M?si=abc"
            ),
            TrackRequest::Catalog(CatalogLink {
                kind: CatalogKind::Playlist,
                id: "37i9dQZF1DXcBWIGoYBM5M".to_string(),
            })
        );
        assert_eq!(
            TrackRequest::classify("https://open.spotify.com/album/1ATL5GLyefJaxhQzSPVrLX"),
            TrackRequest::Catalog(CatalogLink {
                kind: CatalogKind::Album,
                id: "1ATL5GLyefJaxhQzSPVrLX".to_string(),
            })
        );
        assert!(matches!(
            TrackRequest::classify("https://open.spotify.com/artist/xyz"),
            TrackRequest::Search(_)
        ));
    }

    #[test]
    fn everything_else_is_a_search() {
        assert_eq!(
            TrackRequest::classify("  never gonna give you up "),
            TrackRequest::Search("never gonna give you up".to_string())
        );
    }

    #[tokio::test]
    async fn playlist_skips_failed_tracks_and_keeps_order() {
        let mut videos = FakeVideos::with(&["one a", "three c", "five e"]);
        videos.failing.push("four d".to_string());
        let catalog = FakeCatalog {
            queries: ["one a", "two b", "three c", "four d", "five e"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            ..Default::default()
        };
        let resolver = resolver(videos, Some(catalog));

        let tracks = resolver
            .resolve("https://open.spotify.com/playlist/abc123")
            .await
            .unwrap();
        let titles: Vec<_> = tracks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["one a", "three c", "five e"]);
    }

    #[tokio::test]
    async fn search_miss_is_empty_not_error() {
        let resolver = resolver(FakeVideos::default(), None);
        assert!(resolver.resolve("nothing here").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn catalog_links_need_credentials() {
        let resolver = resolver(FakeVideos::default(), None);
        let err = resolver
            .resolve("https://open.spotify.com/track/abc")
            .await
            .unwrap_err();
        assert!(matches!(err, MusicError::CatalogUnavailable));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_extractor_times_out() {
        let videos = FakeVideos {
            slow: true,
            ..Default::default()
        };
        let resolver = resolver(videos, None);
        let err = resolver.resolve("anything").await.unwrap_err();
        assert!(matches!(err, MusicError::Timeout(_, _)));
    }
}

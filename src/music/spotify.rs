use super::{Catalog, CatalogKind, CatalogLink, Recommendation};
use anyhow::Context as _;
use async_trait::async_trait;
use rspotify::model::{
    AlbumId, ArtistId, PlayableItem, PlaylistId, RecommendationsAttribute, SearchResult,
    SearchType, SimplifiedArtist, TrackId,
};
use rspotify::prelude::*;
use rspotify::{ClientCredsSpotify, Config, Credentials};
use tracing::{debug, info};

/// Spotify Web API through the client-credentials flow.
pub struct SpotifyCatalog {
    client: ClientCredsSpotify,
}

impl SpotifyCatalog {
    pub async fn connect(client_id: &str, client_secret: &str) -> anyhow::Result<Self> {
        let creds = Credentials::new(client_id, client_secret);
        let config = Config {
            token_refreshing: true,
            ..Default::default()
        };
        let client = ClientCredsSpotify::with_config(creds, config);
        client
            .request_token()
            .await
            .context("Spotify rejected the client credentials")?;
        info!("Spotify catalog connected");
        Ok(Self { client })
    }
}

fn search_query(name: &str, artists: &[SimplifiedArtist]) -> String {
    query_for(name, artists.first().map(|artist| artist.name.as_str()))
}

fn query_for(name: &str, primary_artist: Option<&str>) -> String {
    match primary_artist {
        Some(artist) => format!("{name} {artist}"),
        None => name.to_string(),
    }
}

#[async_trait]
impl Catalog for SpotifyCatalog {
    async fn track_queries(&self, link: &CatalogLink) -> anyhow::Result<Vec<String>> {
        let queries = match link.kind {
            CatalogKind::Track => {
                let id = TrackId::from_id(link.id.as_str())?;
                let track = self.client.track(id, None).await?;
                vec![search_query(&track.name, &track.artists)]
            }
            CatalogKind::Album => {
                let id = AlbumId::from_id(link.id.as_str())?;
                let album = self.client.album(id, None).await?;
                album
                    .tracks
                    .items
                    .iter()
                    .map(|track| search_query(&track.name, &track.artists))
                    .collect()
            }
            CatalogKind::Playlist => {
                let id = PlaylistId::from_id(link.id.as_str())?;
                let playlist = self.client.playlist(id, None, None).await?;
                playlist
                    .tracks
                    .items
                    .iter()
                    .filter_map(|item| match &item.track {
                        Some(PlayableItem::Track(track)) => {
                            Some(search_query(&track.name, &track.artists))
                        }
                        _ => None,
                    })
                    .collect()
            }
        };
        debug!("Spotify {:?} {} has {} tracks", link.kind, link.id, queries.len());
        Ok(queries)
    }

    async fn recommend(&self, song: &str, artist: &str) -> anyhow::Result<Option<Recommendation>> {
        let query = format!("track:{song} artist:{artist}");
        let result = self
            .client
            .search(&query, SearchType::Track, None, None, Some(1), None)
            .await?;
        let SearchResult::Tracks(page) = result else {
            return Ok(None);
        };
        let Some(seed) = page.items.into_iter().next().and_then(|track| track.id) else {
            return Ok(None);
        };

        let recommendations = self
            .client
            .recommendations(
                std::iter::empty::<RecommendationsAttribute>(),
                None::<Vec<ArtistId>>,
                None::<Vec<&str>>,
                Some([seed]),
                None,
                Some(1),
            )
            .await?;

        Ok(recommendations.tracks.into_iter().next().and_then(|track| {
            let artist = track.artists.first()?.name.clone();
            Some(Recommendation {
                artist,
                song: track.name,
            })
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::query_for;

    #[test]
    fn query_is_name_then_primary_artist() {
        assert_eq!(query_for("One More Time", Some("Daft Punk")), "One More Time Daft Punk");
    }

    #[test]
    fn query_without_artist_is_just_the_name() {
        assert_eq!(query_for("Untitled", None), "Untitled");
    }
}

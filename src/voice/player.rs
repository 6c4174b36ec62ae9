use super::events::{PlaybackEvent, TrackEndNotifier};
use crate::music::{MusicError, Player, TrackMetadata};
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use songbird::input::HttpRequest;
use songbird::{Event, Songbird, TrackEvent};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

/// Plays resolved stream URLs into a guild's songbird call.
pub struct SongbirdPlayer {
    manager: Arc<Songbird>,
    guild_id: serenity::GuildId,
    http_client: reqwest::Client,
    events: mpsc::UnboundedSender<PlaybackEvent>,
}

impl SongbirdPlayer {
    pub fn new(
        manager: Arc<Songbird>,
        guild_id: serenity::GuildId,
        http_client: reqwest::Client,
        events: mpsc::UnboundedSender<PlaybackEvent>,
    ) -> Self {
        Self {
            manager,
            guild_id,
            http_client,
            events,
        }
    }
}

#[async_trait]
impl Player for SongbirdPlayer {
    async fn play(&self, track: &TrackMetadata, generation: u64) -> Result<(), MusicError> {
        let call_lock = self.manager.get(self.guild_id).ok_or(MusicError::NotConnected)?;
        let source = HttpRequest::new(self.http_client.clone(), track.stream_url.clone());

        let handle = {
            let mut call = call_lock.lock().await;
            call.play_only_input(source.into())
        };
        // A track that errors out never reports End
        let notifier = TrackEndNotifier {
            guild_id: self.guild_id,
            generation,
            events: self.events.clone(),
        };
        for event in [TrackEvent::End, TrackEvent::Error] {
            handle
                .add_event(Event::Track(event), notifier.clone())
                .map_err(|e| MusicError::Voice(e.to_string()))?;
        }

        debug!("Started track {} in guild {}", handle.uuid(), self.guild_id);
        Ok(())
    }

    async fn stop(&self) {
        if let Some(call_lock) = self.manager.get(self.guild_id) {
            call_lock.lock().await.stop();
        }
    }

    async fn disconnect(&self) -> Result<(), MusicError> {
        if self.manager.get(self.guild_id).is_none() {
            return Ok(());
        }
        self.manager
            .remove(self.guild_id)
            .await
            .map_err(|e| MusicError::Voice(e.to_string()))
    }
}

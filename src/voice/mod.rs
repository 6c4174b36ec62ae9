//! songbird glue: per-guild sessions, joining calls, and the playback loop.

pub mod events;
pub mod player;

use crate::music::{MusicError, MusicSession, TrackResolver};
use events::{DisconnectNotifier, PlaybackEvent};
use player::SongbirdPlayer;
use poise::serenity_prelude as serenity;
use songbird::{Call, CoreEvent, Event, Songbird};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::info;

pub struct MusicService {
    manager: Arc<Songbird>,
    sessions: Mutex<HashMap<serenity::GuildId, Arc<Mutex<MusicSession>>>>,
    resolver: TrackResolver,
    http_client: reqwest::Client,
    events: mpsc::UnboundedSender<PlaybackEvent>,
}

impl MusicService {
    /// The receiver must be driven by [`events::run_playback_loop`].
    pub fn new(
        manager: Arc<Songbird>,
        resolver: TrackResolver,
        http_client: reqwest::Client,
    ) -> (Self, mpsc::UnboundedReceiver<PlaybackEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let service = Self {
            manager,
            sessions: Mutex::new(HashMap::new()),
            resolver,
            http_client,
            events,
        };
        (service, rx)
    }

    pub fn resolver(&self) -> &TrackResolver {
        &self.resolver
    }

    pub fn manager(&self) -> &Arc<Songbird> {
        &self.manager
    }

    pub async fn session(&self, guild_id: serenity::GuildId) -> Arc<Mutex<MusicSession>> {
        let mut sessions = self.sessions.lock().await;
        sessions.entry(guild_id).or_default().clone()
    }

    pub fn is_connected(&self, guild_id: serenity::GuildId) -> bool {
        self.manager.get(guild_id).is_some()
    }

    pub fn player(&self, guild_id: serenity::GuildId) -> SongbirdPlayer {
        SongbirdPlayer::new(
            self.manager.clone(),
            guild_id,
            self.http_client.clone(),
            self.events.clone(),
        )
    }

    /// Joins `channel_id`, reusing the current call when already there.
    pub async fn join(
        &self,
        guild_id: serenity::GuildId,
        channel_id: serenity::ChannelId,
    ) -> Result<Arc<Mutex<Call>>, MusicError> {
        if let Some(call) = self.manager.get(guild_id) {
            let current = call.lock().await.current_channel();
            if current == Some(songbird::id::ChannelId::from(channel_id)) {
                return Ok(call);
            }
        }

        let call_lock = self
            .manager
            .join(guild_id, channel_id)
            .await
            .map_err(|e| MusicError::Voice(e.to_string()))?;

        {
            let mut call = call_lock.lock().await;
            call.deafen(true)
                .await
                .map_err(|e| MusicError::Voice(e.to_string()))?;
            call.remove_all_global_events();
            call.add_global_event(
                Event::Core(CoreEvent::DriverDisconnect),
                DisconnectNotifier {
                    guild_id,
                    events: self.events.clone(),
                },
            );
        }

        info!("Joined voice channel {} in guild {}", channel_id, guild_id);
        Ok(call_lock)
    }

    /// Leaves the call and forgets the session's queue.
    pub async fn leave(&self, guild_id: serenity::GuildId) -> Result<(), MusicError> {
        if !self.is_connected(guild_id) {
            return Err(MusicError::NotConnected);
        }
        self.session(guild_id).await.lock().await.reset();
        self.manager
            .remove(guild_id)
            .await
            .map_err(|e| MusicError::Voice(e.to_string()))?;
        info!("Left voice channel in guild {}", guild_id);
        Ok(())
    }
}

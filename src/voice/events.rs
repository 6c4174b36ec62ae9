use super::MusicService;
use crate::embeds;
use crate::music::{on_track_end, Notice};
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use songbird::{Event, EventContext, EventHandler as VoiceEventHandler};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Messages from songbird's event tasks to the playback loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    TrackEnded {
        guild_id: serenity::GuildId,
        generation: u64,
    },
    Disconnected {
        guild_id: serenity::GuildId,
    },
}

/// Reports the end of one started track. Never touches session state itself.
#[derive(Clone)]
pub struct TrackEndNotifier {
    pub guild_id: serenity::GuildId,
    pub generation: u64,
    pub events: mpsc::UnboundedSender<PlaybackEvent>,
}

#[async_trait]
impl VoiceEventHandler for TrackEndNotifier {
    async fn act(&self, _ctx: &EventContext<'_>) -> Option<Event> {
        let event = PlaybackEvent::TrackEnded {
            guild_id: self.guild_id,
            generation: self.generation,
        };
        if self.events.send(event).is_err() {
            warn!("Playback loop is gone, dropping track end for guild {}", self.guild_id);
        }
        None
    }
}

pub struct DisconnectNotifier {
    pub guild_id: serenity::GuildId,
    pub events: mpsc::UnboundedSender<PlaybackEvent>,
}

#[async_trait]
impl VoiceEventHandler for DisconnectNotifier {
    async fn act(&self, _ctx: &EventContext<'_>) -> Option<Event> {
        let _ = self.events.send(PlaybackEvent::Disconnected {
            guild_id: self.guild_id,
        });
        None
    }
}

/// Receives every playback event. Each one is handled on its own task so a slow
/// autoqueue lookup in one guild never holds up another.
pub async fn run_playback_loop(
    http: Arc<serenity::Http>,
    music: Arc<MusicService>,
    mut events: mpsc::UnboundedReceiver<PlaybackEvent>,
) {
    info!("Playback loop started");
    while let Some(event) = events.recv().await {
        match event {
            PlaybackEvent::TrackEnded {
                guild_id,
                generation,
            } => {
                tokio::spawn(handle_track_end(
                    http.clone(),
                    music.clone(),
                    guild_id,
                    generation,
                ));
            }
            PlaybackEvent::Disconnected { guild_id } => {
                tokio::spawn(handle_disconnect(music.clone(), guild_id));
            }
        }
    }
    info!("Playback loop stopped");
}

async fn handle_track_end(
    http: Arc<serenity::Http>,
    music: Arc<MusicService>,
    guild_id: serenity::GuildId,
    generation: u64,
) {
    let player = music.player(guild_id);
    let session = music.session(guild_id).await;

    let result = on_track_end(&session, generation, &player, music.resolver()).await;
    let notices = match result {
        Ok(notices) => notices,
        Err(e) => {
            error!("Failed to advance queue in guild {}: {}", guild_id, e);
            return;
        }
    };
    if notices.is_empty() {
        return;
    }

    let channel = session.lock().await.announce_channel();
    if let Some(channel) = channel {
        announce(&http, serenity::ChannelId::new(channel), &notices).await;
    }
}

async fn handle_disconnect(music: Arc<MusicService>, guild_id: serenity::GuildId) {
    // Rejoins from `play` happen under the session lock
    let session = music.session(guild_id).await;
    let mut session = session.lock().await;

    // A rejoin may have happened after the disconnect was reported
    if let Some(call) = music.manager().get(guild_id) {
        if call.lock().await.current_channel().is_some() {
            return;
        }
        if let Err(e) = music.manager().remove(guild_id).await {
            warn!("Failed to drop dead call in guild {}: {}", guild_id, e);
        }
    }
    info!("Voice connection lost in guild {}, resetting session", guild_id);
    session.reset();
}

/// Posts each notice to `channel`. Delivery failures are logged only.
pub async fn announce(http: &serenity::Http, channel: serenity::ChannelId, notices: &[Notice]) {
    for notice in notices {
        let message = serenity::CreateMessage::new().embed(embeds::notice_embed(notice));
        if let Err(e) = channel.send_message(http, message).await {
            warn!("Failed to announce in channel {}: {}", channel, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn track_end_is_handed_off_not_applied() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let notifier = TrackEndNotifier {
            guild_id: serenity::GuildId::new(7),
            generation: 3,
            events: tx,
        };

        assert!(notifier.act(&EventContext::Track(&[])).await.is_none());
        assert_eq!(
            rx.recv().await,
            Some(PlaybackEvent::TrackEnded {
                guild_id: serenity::GuildId::new(7),
                generation: 3,
            })
        );
    }

    #[tokio::test]
    async fn closed_loop_does_not_panic_the_notifier() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let notifier = DisconnectNotifier {
            guild_id: serenity::GuildId::new(1),
            events: tx,
        };
        assert!(notifier.act(&EventContext::Track(&[])).await.is_none());
    }
}

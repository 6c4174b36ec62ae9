use super::{title, MusicError, MusicQueue, TrackMetadata, TrackResolver};
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// The voice connection a session plays into.
#[async_trait]
pub trait Player: Send + Sync {
    /// Starts `track`, replacing whatever is playing. The end of this track must be
    /// reported back with the same `generation`.
    async fn play(&self, track: &TrackMetadata, generation: u64) -> Result<(), MusicError>;
    async fn stop(&self);
    async fn disconnect(&self) -> Result<(), MusicError>;
}

/// User-visible outcome of a session operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    NowPlaying(TrackMetadata),
    Queued(TrackMetadata),
    QueueEmpty,
    Cleared(usize),
    NotFound(String),
    AutoqueueUnparseable,
    AutoqueueNoRecommendation,
    AutoqueueNotFound { song: String, artist: String },
}

/// What the end of a track asks for next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackEnd {
    /// The event belongs to a track that is no longer current.
    Stale,
    Advance,
    /// The queue ran dry with autoqueue on; look up a follow-up seeded by this track.
    Refill(TrackMetadata),
}

/// Per-guild playback state. At most one track is playing at a time.
#[derive(Debug, Default)]
pub struct MusicSession {
    queue: MusicQueue,
    now_playing: Option<TrackMetadata>,
    last_played: Option<TrackMetadata>,
    generation: u64,
    announce_channel: Option<u64>,
}

impl MusicSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue(&self) -> &MusicQueue {
        &self.queue
    }

    pub fn now_playing(&self) -> Option<&TrackMetadata> {
        self.now_playing.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.now_playing.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn announce_channel(&self) -> Option<u64> {
        self.announce_channel
    }

    pub fn set_announce_channel(&mut self, channel_id: u64) {
        self.announce_channel = Some(channel_id);
    }

    pub fn enqueue(&mut self, tracks: Vec<TrackMetadata>) -> Vec<Notice> {
        tracks
            .into_iter()
            .map(|track| {
                self.queue.enqueue(track.clone());
                Notice::Queued(track)
            })
            .collect()
    }

    /// Starts the next queued track if nothing is playing. An empty queue leaves
    /// playback idle and disconnects the voice client.
    pub async fn advance(&mut self, player: &dyn Player) -> Result<Vec<Notice>, MusicError> {
        if self.now_playing.is_some() {
            return Ok(Vec::new());
        }

        let Some(track) = self.queue.front().cloned() else {
            info!("Queue drained, disconnecting");
            player.disconnect().await?;
            return Ok(vec![Notice::QueueEmpty]);
        };

        self.generation += 1;
        // The head stays queued if playback cannot start
        player.play(&track, self.generation).await?;
        self.queue.advance();
        info!("Now playing '{}' (generation {})", track.title, self.generation);
        self.last_played = Some(track.clone());
        self.now_playing = Some(track.clone());
        Ok(vec![Notice::NowPlaying(track)])
    }

    /// Marks the track started under `generation` as finished.
    pub fn end_track(&mut self, generation: u64) -> TrackEnd {
        if generation != self.generation || self.now_playing.is_none() {
            return TrackEnd::Stale;
        }
        self.now_playing = None;

        if self.queue.is_empty() && self.queue.autoqueue() {
            if let Some(seed) = self.last_played.clone() {
                return TrackEnd::Refill(seed);
            }
        }
        TrackEnd::Advance
    }

    /// Second half of a track end: queues the autoqueue result, if any, then advances.
    /// Does nothing when another track was started, or the session was stopped or reset,
    /// since [`MusicSession::end_track`] ran.
    pub async fn resume_after_end(
        &mut self,
        generation: u64,
        refill: Option<Result<TrackMetadata, Notice>>,
        player: &dyn Player,
    ) -> Result<Vec<Notice>, MusicError> {
        if generation != self.generation || self.now_playing.is_some() {
            debug!(
                "Track end of generation {} overtaken (current {})",
                generation, self.generation
            );
            return Ok(Vec::new());
        }

        let mut notices = Vec::new();
        match refill {
            Some(Ok(track)) if self.queue.is_empty() && self.queue.autoqueue() => {
                notices.extend(self.enqueue(vec![track]));
            }
            Some(Err(notice)) => notices.push(notice),
            _ => {}
        }
        notices.extend(self.advance(player).await?);
        Ok(notices)
    }

    /// Empties the queue. The current track keeps playing.
    pub fn clear(&mut self) -> Notice {
        Notice::Cleared(self.queue.clear())
    }

    pub fn toggle_autoqueue(&mut self) -> bool {
        self.queue.toggle_autoqueue()
    }

    /// Stops the current track; its end event advances the queue.
    pub async fn skip(&mut self, player: &dyn Player) -> bool {
        if self.now_playing.is_none() {
            return false;
        }
        player.stop().await;
        true
    }

    /// Discards the current stream without advancing.
    pub async fn stop(&mut self, player: &dyn Player) {
        self.generation += 1;
        self.now_playing = None;
        player.stop().await;
    }

    /// Forgets queued and playing tracks after the voice connection went away.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.now_playing = None;
        self.queue.clear();
    }
}

/// Handles the end of the track started under `generation`. Autoqueue is evaluated
/// before the empty-queue disconnect, and its lookups run without holding the session lock.
pub async fn on_track_end(
    session: &Mutex<MusicSession>,
    generation: u64,
    player: &dyn Player,
    resolver: &TrackResolver,
) -> Result<Vec<Notice>, MusicError> {
    let end = session.lock().await.end_track(generation);
    let refill = match end {
        TrackEnd::Stale => {
            debug!("Ignoring end of stale generation {}", generation);
            return Ok(Vec::new());
        }
        TrackEnd::Advance => None,
        TrackEnd::Refill(seed) => Some(find_autoqueue_track(&seed, resolver).await),
    };

    session
        .lock()
        .await
        .resume_after_end(generation, refill, player)
        .await
}

/// Picks one recommended track seeded by the title of `seed`.
async fn find_autoqueue_track(
    seed: &TrackMetadata,
    resolver: &TrackResolver,
) -> Result<TrackMetadata, Notice> {
    let (artist, song) = title::parse_title(&seed.title).ok_or(Notice::AutoqueueUnparseable)?;

    let recommendation = match resolver.recommend(&song, &artist).await {
        Ok(Some(recommendation)) => recommendation,
        Ok(None) => return Err(Notice::AutoqueueNoRecommendation),
        Err(e) => {
            warn!("Autoqueue recommendation failed for '{}': {}", seed.title, e);
            return Err(Notice::AutoqueueNoRecommendation);
        }
    };

    let query = format!("{} {}", recommendation.artist, recommendation.song);
    match resolver.search(&query).await {
        Ok(Some(track)) => Ok(track),
        Ok(None) => Err(Notice::AutoqueueNotFound {
            song: recommendation.song,
            artist: recommendation.artist,
        }),
        Err(e) => {
            warn!("Autoqueue search for '{}' failed: {}", query, e);
            Err(Notice::AutoqueueNotFound {
                song: recommendation.song,
                artist: recommendation.artist,
            })
        }
    }
}

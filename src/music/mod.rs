//! Queueing, resolution and playback sequencing, independent of the Discord gateway.

pub mod queue;
pub mod resolver;
pub mod session;
pub mod spotify;
pub mod title;
pub mod track;
pub mod ytdlp;

pub use queue::MusicQueue;
pub use resolver::{
    Catalog, CatalogKind, CatalogLink, Recommendation, TrackRequest, TrackResolver, VideoSource,
};
pub use session::{on_track_end, MusicSession, Notice, Player, TrackEnd};
pub use track::TrackMetadata;

#[derive(Debug, thiserror::Error)]
pub enum MusicError {
    #[error("This command must be used in a server")]
    NotInGuild,
    #[error("You must be in a voice channel to use this command")]
    NotInVoiceChannel,
    #[error("I'm not in a voice channel")]
    NotConnected,
    #[error("Songbird Voice client not initialized")]
    VoiceClientMissing,
    #[error("Spotify links are not supported because no Spotify credentials are configured")]
    CatalogUnavailable,
    #[error("Timed out after {0:?} while {1}")]
    Timeout(std::time::Duration, &'static str),
    #[error("Failed to resolve track: {0}")]
    Resolve(#[source] anyhow::Error),
    #[error("Voice error: {0}")]
    Voice(String),
}

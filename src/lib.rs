pub mod commands;
pub mod config;
pub mod embeds;
pub mod music;
pub mod prayer;
pub mod voice;

/// Custom data passed to all commands
pub struct Data {
    pub music: std::sync::Arc<voice::MusicService>,
    pub prayer: prayer::PrayerClient,
}

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

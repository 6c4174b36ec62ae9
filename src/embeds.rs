//! Display payloads for command replies and playback announcements.

use crate::config::{DISCORD_EMBED_FIELDS, DISCORD_EMBED_LIMIT};
use crate::music::{MusicSession, Notice, TrackMetadata};
use crate::prayer::PrayerTimes;
use poise::serenity_prelude::{CreateEmbed, CreateEmbedFooter};

pub const COLOR_MUSIC: u32 = 0xE74C3C;
pub const COLOR_INFO: u32 = 0x5865F2;

fn track_embed(title: &str, track: &TrackMetadata) -> CreateEmbed {
    let mut description = match &track.page_url {
        Some(url) => format!("[{}]({})", track.title, url),
        None => track.title.clone(),
    };
    if let Some(duration) = track.duration {
        description.push_str(&format!("\n`{}`", humantime::format_duration(duration)));
    }

    let mut embed = CreateEmbed::new()
        .title(title)
        .description(truncate(&description, DISCORD_EMBED_LIMIT))
        .color(COLOR_MUSIC);
    if let Some(thumbnail) = &track.thumbnail {
        embed = embed.thumbnail(thumbnail);
    }
    embed
}

fn text_embed(title: &str, description: impl Into<String>) -> CreateEmbed {
    CreateEmbed::new()
        .title(title)
        .description(description)
        .color(COLOR_MUSIC)
}

pub fn notice_embed(notice: &Notice) -> CreateEmbed {
    match notice {
        Notice::NowPlaying(track) => track_embed("Now Playing", track),
        Notice::Queued(track) => track_embed("Added to queue", track),
        Notice::QueueEmpty => text_embed("Queue", "The queue is empty!"),
        Notice::Cleared(count) => text_embed(
            "Queue",
            format!("The queue was cleared ({count} removed)."),
        ),
        Notice::NotFound(query) => text_embed(
            "Not found",
            format!("Could not find a video matching `{}`.", truncate(query, 200)),
        ),
        Notice::AutoqueueUnparseable => {
            text_embed("Autoqueue", "Could not parse title for autoqueue.")
        }
        Notice::AutoqueueNoRecommendation => text_embed(
            "Autoqueue",
            "Could not find a recommendation to autoqueue based on the last played song.",
        ),
        Notice::AutoqueueNotFound { song, artist } => text_embed(
            "Autoqueue",
            format!("Could not find a YouTube video for {song} by {artist}."),
        ),
    }
}

/// One embed for a multi-track enqueue (albums and playlists).
pub fn batch_embed(titles: &[&str]) -> CreateEmbed {
    let lines: Vec<String> = titles
        .iter()
        .take(DISCORD_EMBED_FIELDS)
        .map(|title| format!("• {}", truncate(title, 100)))
        .collect();
    let mut description = lines.join("\n");
    if titles.len() > DISCORD_EMBED_FIELDS {
        description.push_str(&format!("\n…and {} more", titles.len() - DISCORD_EMBED_FIELDS));
    }
    CreateEmbed::new()
        .title(format!("Added {} tracks to queue", titles.len()))
        .description(truncate(&description, DISCORD_EMBED_LIMIT))
        .color(COLOR_MUSIC)
}

pub fn queue_embed(session: &MusicSession) -> CreateEmbed {
    let queue = session.queue();
    let mut embed = CreateEmbed::new().title("Queue").color(COLOR_MUSIC);

    if let Some(current) = session.now_playing() {
        embed = embed.description(format!("Now playing: **{}**", truncate(&current.title, 200)));
    }
    for (i, track) in queue.iter().take(DISCORD_EMBED_FIELDS).enumerate() {
        let line = format!("**{}.** {}", i + 1, truncate(&track.title, 200));
        embed = embed.field("\u{200b}", line, false);
    }

    let mut footer = format!(
        "{} track(s) queued | autoqueue {}",
        queue.len(),
        if queue.autoqueue() { "on" } else { "off" }
    );
    if queue.len() > DISCORD_EMBED_FIELDS {
        footer.push_str(&format!(" | {} more not shown", queue.len() - DISCORD_EMBED_FIELDS));
    }
    embed.footer(CreateEmbedFooter::new(footer))
}

pub fn poll_embed(question: &str, options: &[String], emojis: &[&str]) -> CreateEmbed {
    let lines: Vec<String> = options
        .iter()
        .zip(emojis)
        .map(|(option, emoji)| format!("{emoji} {option}"))
        .collect();
    CreateEmbed::new()
        .title(truncate(question, 256))
        .description(truncate(&lines.join("\n"), DISCORD_EMBED_LIMIT))
        .color(COLOR_INFO)
}

pub fn prayer_embed(city: &str, country: &str, times: &PrayerTimes) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title(format!("Prayer times for {city}, {country}"))
        .color(COLOR_INFO);
    for (name, time) in times.entries() {
        embed = embed.field(name, time, true);
    }
    if let Some(date) = &times.date {
        embed = embed.footer(CreateEmbedFooter::new(date));
    }
    embed
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let mut cut: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        cut.push_str("...");
        cut
    } else {
        s.to_string()
    }
}

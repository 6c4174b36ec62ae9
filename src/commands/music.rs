use crate::embeds;
use crate::music::{MusicError, Notice};
use crate::{Context, Error};
use poise::serenity_prelude as serenity;
use tracing::info;

fn guild_id(ctx: &Context<'_>) -> Result<serenity::GuildId, MusicError> {
    ctx.guild_id().ok_or(MusicError::NotInGuild)
}

fn author_voice_channel(ctx: &Context<'_>) -> Result<serenity::ChannelId, MusicError> {
    let guild = ctx.guild().ok_or(MusicError::NotInGuild)?;
    guild
        .voice_states
        .get(&ctx.author().id)
        .and_then(|vs| vs.channel_id)
        .ok_or(MusicError::NotInVoiceChannel)
}

fn require_connection(ctx: &Context<'_>) -> Result<serenity::GuildId, MusicError> {
    let guild_id = guild_id(ctx)?;
    if !ctx.data().music.is_connected(guild_id) {
        return Err(MusicError::NotConnected);
    }
    Ok(guild_id)
}

/// Joins the author's channel unless the bot already has a call in this guild.
async fn ensure_connected(
    ctx: &Context<'_>,
    guild_id: serenity::GuildId,
) -> Result<(), MusicError> {
    let music = &ctx.data().music;
    if !music.is_connected(guild_id) {
        let channel_id = author_voice_channel(ctx)?;
        music.join(guild_id, channel_id).await?;
    }
    Ok(())
}

async fn send_notices(ctx: &Context<'_>, notices: &[Notice]) -> Result<(), Error> {
    for notice in notices {
        ctx.send(poise::CreateReply::default().embed(embeds::notice_embed(notice)))
            .await?;
    }
    Ok(())
}

/// Join your voice channel
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    required_bot_permissions = "CONNECT | SPEAK"
)]
pub async fn join(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    let channel_id = author_voice_channel(&ctx)?;

    let music = &ctx.data().music;
    music.join(guild_id, channel_id).await?;
    music
        .session(guild_id)
        .await
        .lock()
        .await
        .set_announce_channel(ctx.channel_id().get());

    ctx.say(format!("🔊 Joined <#{}>", channel_id)).await?;
    Ok(())
}

/// Leave the voice channel and drop the queue
#[poise::command(prefix_command, slash_command, guild_only)]
pub async fn leave(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    ctx.data().music.leave(guild_id).await?;
    ctx.say("👋 Left voice channel").await?;
    Ok(())
}

/// Play a YouTube link, a Spotify track/album/playlist, or the first search result
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    required_bot_permissions = "CONNECT | SPEAK"
)]
pub async fn play(
    ctx: Context<'_>,
    #[description = "YouTube URL, Spotify URL or search query"]
    #[rest]
    query: String,
) -> Result<(), Error> {
    ctx.defer().await?;

    let guild_id = guild_id(&ctx)?;
    let music = ctx.data().music.clone();
    ensure_connected(&ctx, guild_id).await?;

    let tracks = music.resolver().resolve(&query).await?;
    if tracks.is_empty() {
        send_notices(&ctx, &[Notice::NotFound(query)]).await?;
        return Ok(());
    }
    info!("Queueing {} track(s) in guild {} for '{}'", tracks.len(), guild_id, query);

    let (queued, started) = {
        let session = music.session(guild_id).await;
        let mut session = session.lock().await;
        // The last track may have ended and drained the queue while resolving
        ensure_connected(&ctx, guild_id).await?;
        session.set_announce_channel(ctx.channel_id().get());
        let queued = session.enqueue(tracks);
        let started = session.advance(&music.player(guild_id)).await?;
        (queued, started)
    };

    if queued.len() > 1 {
        let titles: Vec<_> = queued
            .iter()
            .filter_map(|notice| match notice {
                Notice::Queued(track) => Some(track.title.as_str()),
                _ => None,
            })
            .collect();
        ctx.send(poise::CreateReply::default().embed(embeds::batch_embed(&titles)))
            .await?;
    } else {
        send_notices(&ctx, &queued).await?;
    }
    send_notices(&ctx, &started).await?;
    Ok(())
}

/// Show the queue
#[poise::command(prefix_command, slash_command, guild_only)]
pub async fn queue(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    let embed = {
        let session = ctx.data().music.session(guild_id).await;
        let session = session.lock().await;
        if session.queue().is_empty() && !session.is_playing() {
            None
        } else {
            Some(embeds::queue_embed(&session))
        }
    };

    match embed {
        Some(embed) => {
            ctx.send(poise::CreateReply::default().embed(embed)).await?;
        }
        None => {
            ctx.say("📭 The queue is empty.").await?;
        }
    }
    Ok(())
}

/// Clear the queue without stopping the current song
#[poise::command(prefix_command, slash_command, guild_only)]
pub async fn clear(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    let notice = ctx.data().music.session(guild_id).await.lock().await.clear();
    send_notices(&ctx, &[notice]).await
}

/// Skip the current song
#[poise::command(prefix_command, slash_command, guild_only)]
pub async fn skip(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = require_connection(&ctx)?;
    let music = &ctx.data().music;
    let skipped = music
        .session(guild_id)
        .await
        .lock()
        .await
        .skip(&music.player(guild_id))
        .await;

    if skipped {
        ctx.say("⏭️ Skipped current song").await?;
    } else {
        ctx.say("Nothing is playing.").await?;
    }
    Ok(())
}

/// Stop the current song; the queue is kept
#[poise::command(prefix_command, slash_command, guild_only)]
pub async fn stop(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = require_connection(&ctx)?;
    let music = &ctx.data().music;
    music
        .session(guild_id)
        .await
        .lock()
        .await
        .stop(&music.player(guild_id))
        .await;
    ctx.say("⏹️ Stopped playback").await?;
    Ok(())
}

/// Show the song that is playing
#[poise::command(prefix_command, slash_command, guild_only, aliases("np"))]
pub async fn nowplaying(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    let current = ctx
        .data()
        .music
        .session(guild_id)
        .await
        .lock()
        .await
        .now_playing()
        .cloned();

    match current {
        Some(track) => send_notices(&ctx, &[Notice::NowPlaying(track)]).await?,
        None => {
            ctx.say("Nothing is playing.").await?;
        }
    }
    Ok(())
}

/// Toggle queueing a recommended song when the queue runs out
#[poise::command(prefix_command, slash_command, guild_only)]
pub async fn autoqueue(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = require_connection(&ctx)?;
    let music = &ctx.data().music;
    if !music.resolver().has_catalog() {
        return Err(MusicError::CatalogUnavailable.into());
    }

    let enabled = music.session(guild_id).await.lock().await.toggle_autoqueue();
    if enabled {
        ctx.say(
            "Autoqueue enabled. I will automatically queue a song based on the last played song.",
        )
        .await?;
    } else {
        ctx.say("Autoqueue disabled.").await?;
    }
    Ok(())
}

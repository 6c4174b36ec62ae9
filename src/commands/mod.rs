use crate::{Context, Data, Error};

pub mod fun;
pub mod music;
pub mod prayer;

/// Every command the bot registers, prefix and slash alike.
pub fn all() -> Vec<poise::Command<Data, Error>> {
    vec![
        help(),
        fun::test(),
        fun::flip(),
        fun::random(),
        fun::poll(),
        prayer::prayer(),
        music::join(),
        music::leave(),
        music::play(),
        music::queue(),
        music::clear(),
        music::skip(),
        music::stop(),
        music::nowplaying(),
        music::autoqueue(),
    ]
}

/// Show help for all commands, or one command
#[poise::command(prefix_command, slash_command, track_edits)]
pub async fn help(
    ctx: Context<'_>,
    #[description = "Command to show help for"]
    #[autocomplete = poise::builtins::autocomplete_command]
    command: Option<String>,
) -> Result<(), Error> {
    poise::builtins::help(
        ctx,
        command.as_deref(),
        poise::builtins::HelpConfiguration {
            extra_text_at_bottom:
                "Music: play a YouTube link, a Spotify track/album/playlist, or search text.",
            ..Default::default()
        },
    )
    .await?;
    Ok(())
}

/// Framework-level error hook: log everything, tell the user what went wrong.
pub async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            tracing::warn!("Command '{}' failed: {}", ctx.command().qualified_name, error);
            if let Err(e) = ctx.say(format!("❌ {}", error)).await {
                tracing::error!("Failed to report command error: {}", e);
            }
        }
        other => {
            if let Err(e) = poise::builtins::on_error(other).await {
                tracing::error!("Error while handling error: {}", e);
            }
        }
    }
}

use melody::music::spotify::SpotifyCatalog;
use melody::music::ytdlp::YtDlp;
use melody::music::{Catalog, TrackResolver};
use melody::prayer::PrayerClient;
use melody::voice::{events, MusicService};
use melody::{commands, config::Config, Data};
use poise::serenity_prelude as serenity;
use songbird::serenity::SerenityInit;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!("Loaded configuration: {:?}", config);
    let discord_token = config.discord_token.clone();
    let prefix = config.command_prefix.clone();

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all(),
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(prefix),
                ..Default::default()
            },
            on_error: |error| Box::pin(commands::on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, _ready, framework| {
            Box::pin(async move {
                info!("Bot is ready!");
                if config.register_commands {
                    match config.dev_guild_id {
                        Some(guild_id) => {
                            poise::builtins::register_in_guild(
                                ctx,
                                &framework.options().commands,
                                serenity::GuildId::new(guild_id),
                            )
                            .await?
                        }
                        None => {
                            poise::builtins::register_globally(ctx, &framework.options().commands)
                                .await?
                        }
                    }
                }

                // Set bot status
                ctx.set_activity(Some(serenity::ActivityData::listening(&config.status_message)));

                let http_client = reqwest::Client::new();
                let catalog: Option<Arc<dyn Catalog>> = match config.spotify_credentials() {
                    Some((id, secret)) => match SpotifyCatalog::connect(id, secret).await {
                        Ok(catalog) => Some(Arc::new(catalog) as Arc<dyn Catalog>),
                        Err(e) => {
                            warn!("Spotify disabled: {:#}", e);
                            None
                        }
                    },
                    None => {
                        warn!("No Spotify credentials, Spotify links and autoqueue are disabled");
                        None
                    }
                };
                let resolver = TrackResolver::new(
                    Arc::new(YtDlp::new(config.ytdlp_path.clone())),
                    catalog,
                    config.resolve_timeout(),
                );

                let manager = songbird::get(ctx)
                    .await
                    .ok_or("Songbird Voice client not initialized")?;
                let (music, playback_events) =
                    MusicService::new(manager, resolver, http_client.clone());
                let music = Arc::new(music);
                tokio::spawn(events::run_playback_loop(
                    ctx.http.clone(),
                    music.clone(),
                    playback_events,
                ));

                let prayer = PrayerClient::new(http_client, config.prayer_api_url.clone());

                Ok(Data { music, prayer })
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::MESSAGE_CONTENT
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::GUILD_VOICE_STATES;

    let mut client = serenity::ClientBuilder::new(&discord_token, intents)
        .framework(framework)
        .register_songbird()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create client: {}", e))?;

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutting down...");
            shard_manager.shutdown_all().await;
        }
    });

    info!("Starting bot...");
    if let Err(why) = client.start().await {
        error!("Client error: {:?}", why);
    }

    Ok(())
}

use crate::embeds;
use crate::{Context, Error};
use tracing::warn;

/// Show today's prayer times for a city
#[poise::command(prefix_command, slash_command)]
pub async fn prayer(
    ctx: Context<'_>,
    #[description = "City name"] city: String,
    #[description = "Country name"] country: String,
) -> Result<(), Error> {
    ctx.defer().await?;

    match ctx.data().prayer.timings(&city, &country).await {
        Ok(times) => {
            let embed = embeds::prayer_embed(&city, &country, &times);
            ctx.send(poise::CreateReply::default().embed(embed)).await?;
        }
        Err(e) => {
            warn!("Prayer times lookup for {}, {} failed: {:#}", city, country, e);
            ctx.say(format!("❌ Could not get prayer times for {city}, {country}."))
                .await?;
        }
    }
    Ok(())
}

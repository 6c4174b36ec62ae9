use crate::embeds;
use crate::{Context, Error};
use poise::serenity_prelude as serenity;
use rand::Rng;

const POLL_EMOJIS: [&str; 10] = ["1️⃣", "2️⃣", "3️⃣", "4️⃣", "5️⃣", "6️⃣", "7️⃣", "8️⃣", "9️⃣", "🔟"];
const MIN_POLL_OPTIONS: usize = 2;

/// Check that the bot is alive
#[poise::command(prefix_command, slash_command)]
pub async fn test(ctx: Context<'_>) -> Result<(), Error> {
    ctx.say("test response").await?;
    Ok(())
}

/// Flip a coin
#[poise::command(prefix_command, slash_command)]
pub async fn flip(ctx: Context<'_>) -> Result<(), Error> {
    let heads = rand::thread_rng().gen_bool(0.5);
    ctx.say(if heads { "Heads" } else { "Tails" }).await?;
    Ok(())
}

/// Roll a random number (default 1-100)
#[poise::command(prefix_command, slash_command)]
pub async fn random(
    ctx: Context<'_>,
    #[description = "Lowest possible value"] min: Option<i64>,
    #[description = "Highest possible value"] max: Option<i64>,
) -> Result<(), Error> {
    let (min, max) = (min.unwrap_or(1), max.unwrap_or(100));
    let value = roll(&mut rand::thread_rng(), min, max);
    match value {
        Some(value) => ctx.say(format!("🎲 {value}")).await?,
        None => ctx.say(format!("❌ `{min}` is larger than `{max}`.")).await?,
    };
    Ok(())
}

fn roll(rng: &mut impl Rng, min: i64, max: i64) -> Option<i64> {
    (min <= max).then(|| rng.gen_range(min..=max))
}

/// Start a poll: options are separated by `|`
#[poise::command(prefix_command, slash_command, guild_only)]
pub async fn poll(
    ctx: Context<'_>,
    #[description = "The question to ask"] question: String,
    #[description = "Options separated by |"]
    #[rest]
    options: String,
) -> Result<(), Error> {
    let options = match parse_poll_options(&options) {
        Ok(options) => options,
        Err(message) => {
            ctx.say(format!("❌ {message}")).await?;
            return Ok(());
        }
    };

    let embed = embeds::poll_embed(&question, &options, &POLL_EMOJIS);
    let reply = ctx.send(poise::CreateReply::default().embed(embed)).await?;
    let message = reply.message().await?;
    for emoji in POLL_EMOJIS.iter().take(options.len()) {
        message
            .react(
                ctx.serenity_context(),
                serenity::ReactionType::Unicode(emoji.to_string()),
            )
            .await?;
    }
    Ok(())
}

fn parse_poll_options(raw: &str) -> Result<Vec<String>, String> {
    let options: Vec<String> = raw
        .split('|')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect();

    if options.len() < MIN_POLL_OPTIONS {
        return Err(format!("A poll needs at least {MIN_POLL_OPTIONS} options, separated by `|`."));
    }
    if options.len() > POLL_EMOJIS.len() {
        return Err(format!("A poll can have at most {} options.", POLL_EMOJIS.len()));
    }
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn roll_stays_in_bounds() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..1000 {
            let value = roll(&mut rng, -3, 3).unwrap();
            assert!((-3..=3).contains(&value));
        }
        assert_eq!(roll(&mut rng, 5, 5), Some(5));
    }

    #[test]
    fn roll_rejects_inverted_range() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(roll(&mut rng, 10, 1), None);
    }

    #[test]
    fn poll_options_are_trimmed_and_blank_ones_dropped() {
        assert_eq!(
            parse_poll_options(" pizza | tacos || sushi rolls "),
            Ok(vec!["pizza".to_string(), "tacos".to_string(), "sushi rolls".to_string()])
        );
    }

    #[test]
    fn poll_option_count_is_bounded() {
        assert!(parse_poll_options("only one").is_err());
        let eleven = (0..11).map(|i| i.to_string()).collect::<Vec<_>>().join("|");
        assert!(parse_poll_options(&eleven).is_err());
        let ten = (0..10).map(|i| i.to_string()).collect::<Vec<_>>().join("|");
        assert_eq!(parse_poll_options(&ten).unwrap().len(), 10);
    }
}

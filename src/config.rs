use dotenvy::dotenv;
use std::env;
use std::time::Duration;

#[derive(Clone)]
pub struct Config {
    pub discord_token: String,
    pub command_prefix: String,
    pub status_message: String,
    pub spotify_client_id: Option<String>,
    pub spotify_client_secret: Option<String>,
    pub ytdlp_path: String,
    pub resolve_timeout_secs: u64,
    pub prayer_api_url: String,
    pub dev_guild_id: Option<u64>,
    pub register_commands: bool,
}

const DEFAULT_PRAYER_API_URL: &str = "https://api.aladhan.com/v1/timingsByCity";

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();
        Self::build()
    }

    fn build() -> anyhow::Result<Self> {
        let spotify_client_id = env::var("SPOTIFY_CLIENT_ID").ok().filter(|v| !v.is_empty());
        let spotify_client_secret = env::var("SPOTIFY_CLIENT_SECRET")
            .ok()
            .filter(|v| !v.is_empty());
        if spotify_client_id.is_some() != spotify_client_secret.is_some() {
            anyhow::bail!("SPOTIFY_CLIENT_ID and SPOTIFY_CLIENT_SECRET must be set together");
        }

        Ok(Config {
            discord_token: env::var("DISCORD_TOKEN")
                .map_err(|_| anyhow::anyhow!("DISCORD_TOKEN must be set"))?,
            command_prefix: env::var("COMMAND_PREFIX").unwrap_or_else(|_| "$".to_string()),
            status_message: env::var("STATUS_MESSAGE")
                .unwrap_or_else(|_| "music | $help".to_string()),
            spotify_client_id,
            spotify_client_secret,
            ytdlp_path: env::var("YTDLP_PATH").unwrap_or_else(|_| "yt-dlp".to_string()),
            resolve_timeout_secs: env::var("RESOLVE_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),
            prayer_api_url: env::var("PRAYER_API_URL")
                .unwrap_or_else(|_| DEFAULT_PRAYER_API_URL.to_string()),
            dev_guild_id: env::var("DEV_GUILD_ID").ok().and_then(|id| id.parse().ok()),
            register_commands: env::var("REGISTER_COMMANDS")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap_or(true),
        })
    }

    /// Both halves of the Spotify credentials, when configured.
    pub fn spotify_credentials(&self) -> Option<(&str, &str)> {
        match (&self.spotify_client_id, &self.spotify_client_secret) {
            (Some(id), Some(secret)) => Some((id.as_str(), secret.as_str())),
            _ => None,
        }
    }

    pub fn resolve_timeout(&self) -> Duration {
        Duration::from_secs(self.resolve_timeout_secs.max(1))
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("discord_token", &"[REDACTED]")
            .field("command_prefix", &self.command_prefix)
            .field("status_message", &self.status_message)
            .field("spotify_client_id", &self.spotify_client_id)
            .field(
                "spotify_client_secret",
                &self.spotify_client_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("ytdlp_path", &self.ytdlp_path)
            .field("resolve_timeout_secs", &self.resolve_timeout_secs)
            .field("prayer_api_url", &self.prayer_api_url)
            .field("dev_guild_id", &self.dev_guild_id)
            .field("register_commands", &self.register_commands)
            .finish()
    }
}

/// Discord embed description limit
pub const DISCORD_EMBED_LIMIT: usize = 4096;
/// Discord caps an embed at 25 fields
pub const DISCORD_EMBED_FIELDS: usize = 25;

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_config_logic() {
        // 1. Test missing vars
        env::remove_var("DISCORD_TOKEN");
        env::remove_var("SPOTIFY_CLIENT_ID");
        env::remove_var("SPOTIFY_CLIENT_SECRET");
        let result = Config::build();
        assert!(
            result.is_err(),
            "Should fail when required vars are missing"
        );

        // 2. Test defaults
        env::set_var("DISCORD_TOKEN", "test_token");
        let config = Config::build().unwrap();
        assert_eq!(config.discord_token, "test_token");
        assert_eq!(config.command_prefix, "$");
        assert_eq!(config.resolve_timeout_secs, 30);
        assert!(config.spotify_credentials().is_none());

        // 3. Half a credential pair is rejected
        env::set_var("SPOTIFY_CLIENT_ID", "client_id");
        assert!(Config::build().is_err());

        // 4. Test debug redaction
        env::set_var("SPOTIFY_CLIENT_SECRET", "secret_value");
        let config_redacted = Config::build().unwrap();
        assert_eq!(
            config_redacted.spotify_credentials(),
            Some(("client_id", "secret_value"))
        );
        let debug_output = format!("{:?}", config_redacted);
        assert!(!debug_output.contains("test_token"));
        assert!(!debug_output.contains("secret_value"));
        assert!(debug_output.contains("[REDACTED]"));

        // Cleanup
        env::remove_var("DISCORD_TOKEN");
        env::remove_var("SPOTIFY_CLIENT_ID");
        env::remove_var("SPOTIFY_CLIENT_SECRET");
    }
}

use super::{TrackMetadata, VideoSource};
use anyhow::Context as _;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Runs the `yt-dlp` binary in JSON mode.
pub struct YtDlp {
    program: String,
}

#[derive(Debug, Deserialize)]
struct VideoInfo {
    title: Option<String>,
    url: Option<String>,
    thumbnail: Option<String>,
    webpage_url: Option<String>,
    duration: Option<f64>,
}

impl YtDlp {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    async fn run(&self, target: &str) -> anyhow::Result<Option<TrackMetadata>> {
        debug!("yt-dlp: resolving {}", target);
        let output = Command::new(&self.program)
            .args([
                "-j",
                "--no-playlist",
                "--no-warnings",
                "-f",
                "bestaudio/best",
                target,
            ])
            .kill_on_drop(true)
            .output()
            .await
            .with_context(|| format!("failed to run {}", self.program))?;

        if !output.status.success() {
            anyhow::bail!(
                "yt-dlp exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        parse_info(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Reads the first JSON document printed by `yt-dlp -j`.
fn parse_info(stdout: &str) -> anyhow::Result<Option<TrackMetadata>> {
    let Some(line) = stdout.lines().map(str::trim).find(|l| !l.is_empty()) else {
        return Ok(None);
    };
    let info: VideoInfo = serde_json::from_str(line).context("malformed yt-dlp output")?;

    let Some(stream_url) = info.url else {
        return Ok(None);
    };
    Ok(Some(TrackMetadata {
        title: info.title.unwrap_or_else(|| "Unknown title".to_string()),
        stream_url,
        thumbnail: info.thumbnail,
        page_url: info.webpage_url,
        duration: info
            .duration
            .filter(|d| *d > 0.0)
            .and_then(|d| Duration::try_from_secs_f64(d).ok()),
    }))
}

#[async_trait]
impl VideoSource for YtDlp {
    async fn extract(&self, url: &str) -> anyhow::Result<Option<TrackMetadata>> {
        self.run(url).await
    }

    async fn search(&self, query: &str) -> anyhow::Result<Option<TrackMetadata>> {
        self.run(&format!("ytsearch1:{query}")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_first_document() {
        let stdout = r#"
{"title": "Daft Punk - One More Time", "url": "https://rr1.googlevideo.com/videoplayback?x=1", "thumbnail": "https://i.ytimg.com/vi/abc/hq.jpg", "webpage_url": "https://www.youtube.com/watch?v=abc", "duration": 321.0}
{"title": "second", "url": "https://ignored"}
"#;
        let track = parse_info(stdout).unwrap().unwrap();
        assert_eq!(track.title, "Daft Punk - One More Time");
        assert_eq!(track.stream_url, "https://rr1.googlevideo.com/videoplayback?x=1");
        assert_eq!(track.thumbnail.as_deref(), Some("https://i.ytimg.com/vi/abc/hq.jpg"));
        assert_eq!(track.page_url.as_deref(), Some("https://www.youtube.com/watch?v=abc"));
        assert_eq!(track.duration, Some(Duration::from_secs(321)));
    }

    #[test]
    fn empty_output_means_no_result() {
        assert!(parse_info("").unwrap().is_none());
        assert!(parse_info("\n  \n").unwrap().is_none());
    }

    #[test]
    fn missing_stream_url_means_no_result() {
        assert!(parse_info(r#"{"title": "live soon"}"#).unwrap().is_none());
    }

    #[test]
    fn unrepresentable_duration_is_dropped() {
        let track = parse_info(r#"{"title": "t", "url": "https://a", "duration": 1e300}"#)
            .unwrap()
            .unwrap();
        assert_eq!(track.duration, None);
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(parse_info("ERROR: nope").is_err());
    }
}

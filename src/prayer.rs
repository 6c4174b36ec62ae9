use anyhow::Context as _;
use serde::Deserialize;
use tracing::debug;

/// Client for the Aladhan `timingsByCity` endpoint.
#[derive(Clone)]
pub struct PrayerClient {
    http_client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PrayerTimes {
    #[serde(rename = "Fajr")]
    pub fajr: String,
    #[serde(rename = "Sunrise")]
    pub sunrise: String,
    #[serde(rename = "Dhuhr")]
    pub dhuhr: String,
    #[serde(rename = "Asr")]
    pub asr: String,
    #[serde(rename = "Maghrib")]
    pub maghrib: String,
    #[serde(rename = "Isha")]
    pub isha: String,
    #[serde(skip)]
    pub date: Option<String>,
}

impl PrayerTimes {
    pub fn entries(&self) -> [(&'static str, &str); 6] {
        [
            ("Fajr", self.fajr.as_str()),
            ("Sunrise", self.sunrise.as_str()),
            ("Dhuhr", self.dhuhr.as_str()),
            ("Asr", self.asr.as_str()),
            ("Maghrib", self.maghrib.as_str()),
            ("Isha", self.isha.as_str()),
        ]
    }
}

#[derive(Deserialize)]
struct TimingsResponse {
    data: TimingsData,
}

#[derive(Deserialize)]
struct TimingsData {
    timings: PrayerTimes,
    date: Option<DateInfo>,
}

#[derive(Deserialize)]
struct DateInfo {
    readable: Option<String>,
}

impl PrayerClient {
    pub fn new(http_client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
        }
    }

    pub async fn timings(&self, city: &str, country: &str) -> anyhow::Result<PrayerTimes> {
        let today = chrono::Local::now().format("%d-%m-%Y").to_string();
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), today);
        debug!("Prayer times: GET {} city={} country={}", url, city, country);

        let body = self
            .http_client
            .get(&url)
            .query(&[("city", city), ("country", country)])
            .send()
            .await?
            .error_for_status()
            .context("prayer times request failed")?
            .text()
            .await?;
        parse_timings(&body)
    }
}

fn parse_timings(body: &str) -> anyhow::Result<PrayerTimes> {
    let response: TimingsResponse =
        serde_json::from_str(body).context("unexpected prayer times response")?;
    let mut times = response.data.timings;
    times.date = response.data.date.and_then(|d| d.readable);
    Ok(times)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "code": 200,
        "status": "OK",
        "data": {
            "timings": {
                "Fajr": "04:12", "Sunrise": "05:48", "Dhuhr": "12:31", "Asr": "16:02",
                "Sunset": "19:13", "Maghrib": "19:13", "Isha": "20:43",
                "Imsak": "04:02", "Midnight": "00:31"
            },
            "date": { "readable": "18 Oct 2026", "timestamp": "1792281600" }
        }
    }"#;

    #[test]
    fn extracts_named_prayers() {
        let times = parse_timings(SAMPLE).unwrap();
        assert_eq!(times.fajr, "04:12");
        assert_eq!(times.isha, "20:43");
        assert_eq!(times.date.as_deref(), Some("18 Oct 2026"));
        let names: Vec<_> = times.entries().iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["Fajr", "Sunrise", "Dhuhr", "Asr", "Maghrib", "Isha"]);
    }

    #[test]
    fn error_payload_is_rejected() {
        let body = r#"{"code": 400, "status": "Bad Request", "data": "Invalid city"}"#;
        assert!(parse_timings(body).is_err());
    }
}

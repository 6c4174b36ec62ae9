use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref TITLE_PATTERNS: [Regex; 3] = [
        // Artist - Song Title
        Regex::new(r"^(.+?)\s*-\s*([^\(]+)").expect("valid title pattern"),
        // Artist feat. Someone
        Regex::new(r"^(.+?)\s*feat\.\s*([^ ]+)").expect("valid title pattern"),
        // Artist - Song (Extra Info)
        Regex::new(r"^(.+?)\s*-\s*([^ ]+)\s*\(.*\)").expect("valid title pattern"),
    ];
}

/// Splits a video title into `(artist, song)`. The first matching pattern wins.
pub fn parse_title(title: &str) -> Option<(String, String)> {
    TITLE_PATTERNS.iter().find_map(|pattern| {
        let captures = pattern.captures(title)?;
        let artist = captures.get(1)?.as_str().trim();
        let song = captures.get(2)?.as_str().trim();
        if artist.is_empty() || song.is_empty() {
            return None;
        }
        Some((artist.to_string(), song.to_string()))
    })
}

#[cfg(test)]
mod tests {
    use super::parse_title;

    #[test]
    fn splits_artist_and_song() {
        assert_eq!(
            parse_title("Daft Punk - One More Time"),
            Some(("Daft Punk".to_string(), "One More Time".to_string()))
        );
    }

    #[test]
    fn drops_parenthesised_suffix() {
        assert_eq!(
            parse_title("Daft Punk - One More Time (Official Video)"),
            Some(("Daft Punk".to_string(), "One More Time".to_string()))
        );
    }

    #[test]
    fn falls_back_to_featuring_pattern() {
        assert_eq!(
            parse_title("Calvin Harris feat. Rihanna"),
            Some(("Calvin Harris".to_string(), "Rihanna".to_string()))
        );
    }

    #[test]
    fn rejects_titles_without_separator() {
        assert_eq!(parse_title("lofi beats to study to"), None);
        assert_eq!(parse_title(""), None);
    }
}

/// Filename derivation from media URLs and episode titles
use regex::Regex;
use tracing::warn;

/// Season and episode numbers extracted from a media URL's file stem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodeNumbers {
    Matched { season: u32, episode: u32 },
    Unmatched,
}

/// Match an optional "short" marker followed by s<digits>e<digits> at the
/// start of the stem, case-insensitively.
pub fn match_episode_numbers(stem: &str) -> EpisodeNumbers {
    if let Ok(re) = Regex::new(r"^(?:short)?s(?P<season>[0-9]+)e(?P<episode>[0-9]+)") {
        if let Some(captures) = re.captures(&stem.to_lowercase()) {
            let season = captures.name("season").and_then(|m| m.as_str().parse().ok());
            let episode = captures.name("episode").and_then(|m| m.as_str().parse().ok());
            if let (Some(season), Some(episode)) = (season, episode) {
                return EpisodeNumbers::Matched { season, episode };
            }
        }
    }
    EpisodeNumbers::Unmatched
}

/// Strip characters that are illegal in filenames
pub fn sanitize_title(title: &str) -> String {
    if let Ok(re) = Regex::new(r#"["/<>|*.]+"#) {
        re.replace_all(title, "").into_owned()
    } else {
        title.to_string()
    }
}

/// Derive a normalized `S00E00 Title.ext` filename from a media URL and a
/// human-readable episode title.
///
/// If either the URL stem or the title fails to match the expected patterns,
/// falls back to the URL's trailing path segment verbatim and logs a warning.
pub fn derive(url: &str, title: &str) -> String {
    match derive_normalized(url, title) {
        Some(filename) => filename,
        None => {
            warn!("Failed to make filename for url='{}', title='{}'", url, title);
            trailing_segment(url).to_string()
        }
    }
}

/// The last path segment of a URL
pub fn trailing_segment(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}

fn derive_normalized(url: &str, title: &str) -> Option<String> {
    let segment = trailing_segment(url);

    // Stem and extension, exactly one separator
    let parts: Vec<&str> = segment.split('.').collect();
    let (stem, extension) = match parts[..] {
        [stem, extension] => (stem, extension),
        _ => return None,
    };

    let (season, episode) = match match_episode_numbers(stem) {
        EpisodeNumbers::Matched { season, episode } => (season, episode),
        EpisodeNumbers::Unmatched => return None,
    };

    let cleaned = sanitize_title(title);
    let remainder = strip_numeric_prefix(&cleaned)?;

    Some(format!(
        "S{:02}E{:02} {}.{}",
        season,
        episode,
        title_case(remainder.trim()),
        extension
    ))
}

/// Strip a leading `"<number>. "` token, keeping only the remaining
/// alphanumeric/space/apostrophe text.
fn strip_numeric_prefix(title: &str) -> Option<String> {
    let re = Regex::new(r"^[0-9]+\.?\s(?P<title>[0-9a-zA-Z\s']+)").ok()?;
    re.captures(title)
        .and_then(|captures| captures.name("title"))
        .map(|m| m.as_str().to_string())
}

/// Capitalize the first letter of each word, lowercasing the rest
fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_well_formed() {
        let filename = derive("http://example.com/videos/s1e2.mp4", "3. Gem Glow");
        assert_eq!(filename, "S01E02 Gem Glow.mp4");
    }

    #[test]
    fn test_derive_short_marker_ignored() {
        let filename = derive("http://example.com/videos/shorts3e1.mp4", "1. We Deserve To Shine");
        assert_eq!(filename, "S03E01 We Deserve To Shine.mp4");
    }

    #[test]
    fn test_derive_pads_season_and_episode() {
        let filename = derive("http://example.com/s12e104.mp4", "104. Change Your Mind");
        assert_eq!(filename, "S12E104 Change Your Mind.mp4");
    }

    #[test]
    fn test_derive_uppercase_stem() {
        let filename = derive("http://example.com/S1E5.mp4", "5. Frybo");
        assert_eq!(filename, "S01E05 Frybo.mp4");
    }

    #[test]
    fn test_derive_title_cased() {
        let filename = derive("http://example.com/s1e4.mp4", "4. together breakfast");
        assert_eq!(filename, "S01E04 Together Breakfast.mp4");
    }

    #[test]
    fn test_derive_unmatched_stem_falls_back() {
        let filename = derive("http://example.com/videos/finale.mp4", "3. Gem Glow");
        assert_eq!(filename, "finale.mp4");
    }

    #[test]
    fn test_derive_unmatched_title_falls_back() {
        // No numeric prefix on the title
        let filename = derive("http://example.com/videos/s1e2.mp4", "Gem Glow");
        assert_eq!(filename, "s1e2.mp4");
    }

    #[test]
    fn test_derive_multi_dot_segment_falls_back() {
        let filename = derive("http://example.com/s1e2.part1.mp4", "2. Laser Light Cannon");
        assert_eq!(filename, "s1e2.part1.mp4");
    }

    #[test]
    fn test_match_episode_numbers() {
        assert_eq!(
            match_episode_numbers("s1e2"),
            EpisodeNumbers::Matched { season: 1, episode: 2 }
        );
        assert_eq!(
            match_episode_numbers("shorts3e1"),
            EpisodeNumbers::Matched { season: 3, episode: 1 }
        );
        assert_eq!(match_episode_numbers("finale"), EpisodeNumbers::Unmatched);
        assert_eq!(match_episode_numbers("season1"), EpisodeNumbers::Unmatched);
    }

    #[test]
    fn test_sanitize_strips_illegal_characters() {
        assert_eq!(sanitize_title(r#"3. "Gem/Glow" <*>|"#), "3 GemGlow ");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let once = sanitize_title(r#"3. "Gem/Glow""#);
        let twice = sanitize_title(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_trailing_segment() {
        assert_eq!(trailing_segment("http://example.com/a/b/s1e1.mp4"), "s1e1.mp4");
        assert_eq!(trailing_segment("s1e1.mp4"), "s1e1.mp4");
    }
}

use lazy_static::lazy_static;
use regex::Regex;

pub const DEFAULT_SEARCH_TERM: &str = "meditation";
pub const ZERO_DURATION: &str = "PT0M0S";

const YOUTUBE_EMBED_BASE: &str = "https://www.youtube.com/embed";

lazy_static! {
    static ref ISO8601_DURATION: Regex =
        Regex::new(r"PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?").expect("duration pattern is valid");
}

/// Apply the relevance policy to a raw query: absent or empty becomes the
/// default term, anything not mentioning "meditation" gets it appended.
pub fn normalize_search_term(raw: Option<&str>) -> String {
    let term = match raw {
        Some(term) if !term.is_empty() => term,
        _ => return DEFAULT_SEARCH_TERM.to_string(),
    };

    if term.to_lowercase().contains(DEFAULT_SEARCH_TERM) {
        term.to_string()
    } else {
        format!("{term} {DEFAULT_SEARCH_TERM}")
    }
}

/// Parse ISO8601 duration string (PT1H2M3S) into (hours, minutes, seconds)
pub fn parse_iso8601_duration(duration_str: &str) -> Option<(u64, u64, u64)> {
    let captures = ISO8601_DURATION.captures(duration_str)?;
    let component = |index: usize| {
        captures
            .get(index)
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .unwrap_or(0)
    };

    Some((component(1), component(2), component(3)))
}

/// Render an ISO8601 duration as a clock string: `H:MM:SS` or `M:SS`.
/// Anything unparseable renders as `0:00`.
pub fn format_iso8601_duration(duration_str: &str) -> String {
    let Some((hours, minutes, seconds)) = parse_iso8601_duration(duration_str) else {
        return "0:00".to_string();
    };

    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}

pub fn youtube_embed_url(video_id: &str, autoplay: bool) -> String {
    format!(
        "{YOUTUBE_EMBED_BASE}/{video_id}?enablejsapi=1&autoplay={}&modestbranding=1&rel=0&showinfo=0",
        u8::from(autoplay)
    )
}

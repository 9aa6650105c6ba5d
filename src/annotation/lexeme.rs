//! Lexical predicates shared by the rule-based backend and the merger.
use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

lazy_static! {
    /// Bare domains with an optional path (`example.com`, `docs.rs/regex`).
    static ref BARE_DOMAIN: Regex = Regex::new(
        r"(?i)^[a-z0-9][a-z0-9-]*(\.[a-z0-9-]+)*\.(com|org|net|edu|gov|io|co|uk|de|fr|info|me|ly|gl)(:\d+)?(/\S*)?$"
    )
    .unwrap();
}

/// Returns true if `text` looks like a URL.
///
/// Matches absolute http(s)/ftp URLs, `www.` prefixed hosts and bare domains with a
/// common top-level domain.
pub fn like_url(text: &str) -> bool {
    if text.len() < 4 || text.chars().any(char::is_whitespace) {
        return false;
    }

    if let Ok(url) = Url::parse(text) {
        if matches!(url.scheme(), "http" | "https" | "ftp") && url.host().is_some() {
            return true;
        }
    }

    let lower = text.to_lowercase();
    if lower.starts_with("www.") && lower.len() > 4 {
        return true;
    }

    BARE_DOMAIN.is_match(text)
}

/// Returns true if `text` is a number (digits with optional separators).
pub fn like_num(text: &str) -> bool {
    let digits = text.trim_start_matches(&['+', '-'][..]);
    !digits.is_empty()
        && digits.chars().any(|c| c.is_ascii_digit())
        && digits
            .chars()
            .all(|c| c.is_ascii_digit() || c == '.' || c == ',')
}

/// Returns true if `text` is only made of punctuation/symbols.
pub fn is_punct(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| !c.is_alphanumeric() && !c.is_whitespace())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls() {
        assert!(like_url("http://example.com"));
        assert!(like_url("https://docs.rs/regex/latest"));
        assert!(like_url("www.example.org"));
        assert!(like_url("example.com"));
        assert!(like_url("reddit.com/r/rust"));
    }

    #[test]
    fn not_urls() {
        assert!(!like_url("hello"));
        assert!(!like_url("e.g."));
        assert!(!like_url("mailto:someone@example.com"));
        assert!(!like_url("file.txt"));
        assert!(!like_url("http://"));
        assert!(!like_url("www."));
    }

    #[test]
    fn numbers() {
        assert!(like_num("42"));
        assert!(like_num("-3.14"));
        assert!(like_num("1,000"));
        assert!(!like_num("4x4"));
        assert!(!like_num(","));
        assert!(!like_num(""));
    }

    #[test]
    fn punct() {
        assert!(is_punct("..."));
        assert!(is_punct("?!"));
        assert!(!is_punct("a."));
        assert!(!is_punct(""));
    }
}

//! Raw line cleanup before annotation.
//!
//! Comments scraped from forums carry markdown and a few HTML entities.
//! [sanitize] removes the bits that would otherwise end up as tokens:
//!
//! ```text
//! *See [this](http://example.com) &gt; that*
//! ```
//!
//! becomes
//!
//! ```text
//! See this > that
//! ```
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// `[label](http://…)` and `[label](%%URL)` links.
    static ref LINK: Regex = Regex::new(r"\[([^\]]+)\]\((?:https?://[^)]+|%%URL)\)").unwrap();
    static ref LEADING_FORMAT: Regex = Regex::new(r"^[`*~]+").unwrap();
    static ref TRAILING_FORMAT: Regex = Regex::new(r"[`*~]+$").unwrap();
}

const ENTITIES: [(&str, &str); 3] = [("&gt;", ">"), ("&lt;", "<"), ("&nbsp;", " ")];

/// Clean a raw line. Never fails: anything that does not match is kept as is.
///
/// Links are replaced until none remain, since removing a link can reveal
/// another one (`[[a](http://x)](http://y)`).
/// Emphasis markers (`` ` ``, `*`, `~`) are stripped as a whole run at each end,
/// not one marker at a time: `**strong**` becomes `strong`, and `*a* b` becomes `a* b`.
/// Sanitizing twice thus gives the same result as sanitizing once.
pub fn sanitize(line: &str) -> String {
    let mut text = line.to_string();
    while LINK.is_match(&text) {
        text = LINK.replace_all(&text, "$1").into_owned();
    }

    for (entity, decoded) in ENTITIES {
        if text.contains(entity) {
            text = text.replace(entity, decoded);
        }
    }

    let text = LEADING_FORMAT.replace(&text, "");
    let text = TRAILING_FORMAT.replace(&text, "");
    text.into_owned()
}

/// Returns true if the sanitized line has something worth annotating.
pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link() {
        assert_eq!(sanitize("See [this](http://example.com) now"), "See this now");
        assert_eq!(
            sanitize("[secure](https://example.com/a?b=c) link"),
            "secure link"
        );
    }

    #[test]
    fn placeholder_link() {
        assert_eq!(sanitize("go [there](%%URL) please"), "go there please");
    }

    #[test]
    fn non_http_link_untouched() {
        let s = "a [label](ftp://host) b";
        assert_eq!(sanitize(s), s);
    }

    #[test]
    fn nested_links() {
        assert_eq!(sanitize("[[a](http://x)](http://y)"), "a");
    }

    #[test]
    fn entities() {
        assert_eq!(sanitize("a &gt; b &lt; c&nbsp;d"), "a > b < c d");
        assert_eq!(sanitize("&amp;"), "&amp;");
    }

    #[test]
    fn emphasis() {
        assert_eq!(sanitize("*bold*"), "bold");
        assert_eq!(sanitize("`code`"), "code");
        assert_eq!(sanitize("~strike"), "strike");
        assert_eq!(sanitize("**strong**"), "strong");
        assert_eq!(sanitize("in*side"), "in*side");
        assert_eq!(sanitize("*a* b"), "a* b");
    }

    #[test]
    fn plain_text_unchanged() {
        let lines = [
            "Nothing to see here.",
            "Numbers 1, 2 and 3 (with parens) [and brackets].",
            "émoji 🕷️ and accents",
            "",
        ];
        for line in lines {
            assert_eq!(sanitize(line), line);
        }
    }

    #[test]
    fn idempotent() {
        let lines = [
            "**bold** text",
            "`*~mixed~*`",
            "[[a](http://x)](http://y)",
            "&&gt;lt; weird",
            "* [link](https://a.b) *",
            "~ &nbsp;~",
            "[a&nbsp;](http://x)&gt;",
            "plain",
        ];
        for line in lines {
            let once = sanitize(line);
            assert_eq!(sanitize(&once), once, "input: {line:?}");
        }
    }

    #[test]
    fn blank() {
        assert!(is_blank(&sanitize("**")));
        assert!(is_blank(&sanitize("&nbsp;&nbsp;")));
        assert!(!is_blank(&sanitize("*a*")));
    }
}

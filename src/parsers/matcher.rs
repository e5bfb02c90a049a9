use regex::Regex;
use std::sync::LazyLock;

/// `http`/`https` URL whose last character is not trailing punctuation
pub const URL_PATTERN: &str =
    r"https?://[-A-Za-z0-9+&@#/%?=~_()|!:,.;]*[-A-Za-z0-9+&@#/%=~_|]";

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(URL_PATTERN).expect("url pattern compiles"));

static STANDALONE_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^\s*({URL_PATTERN})\s*$")).expect("standalone pattern compiles")
});

/// One URL occurrence, as byte offsets into the scanned buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSpan {
    pub start: usize,
    pub end: usize,
    pub url: String,
}

/// All URL occurrences in `text`, left to right, duplicates included
pub fn find_urls(text: &str) -> impl Iterator<Item = &str> {
    URL_RE.find_iter(text).map(|m| m.as_str())
}

pub fn find_spans(text: &str) -> Vec<MatchSpan> {
    URL_RE
        .find_iter(text)
        .map(|m| MatchSpan {
            start: m.start(),
            end: m.end(),
            url: m.as_str().to_string(),
        })
        .collect()
}

pub fn contains_url(text: &str) -> bool {
    URL_RE.is_match(text)
}

/// The URL if `text` is exactly one URL plus surrounding whitespace
pub fn standalone_url(text: &str) -> Option<&str> {
    STANDALONE_URL_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_punctuation_excluded() {
        let urls: Vec<_> = find_urls("see http://a.com/x. and (http://b.com/y), ok").collect();
        assert_eq!(urls, vec!["http://a.com/x", "http://b.com/y"]);
    }

    #[test]
    fn test_query_and_fragment_kept() {
        let urls: Vec<_> = find_urls("https://e.com/p?q=1&r=2#top!").collect();
        assert_eq!(urls, vec!["https://e.com/p?q=1&r=2#top"]);
    }

    #[test]
    fn test_duplicates_reported() {
        let spans = find_spans("A http://x B http://x C");
        assert_eq!(
            spans,
            vec![
                MatchSpan { start: 2, end: 10, url: "http://x".to_string() },
                MatchSpan { start: 13, end: 21, url: "http://x".to_string() },
            ]
        );
    }

    #[test]
    fn test_standalone() {
        assert_eq!(standalone_url("  http://a.com/x \n"), Some("http://a.com/x"));
        assert_eq!(standalone_url("http://a.com/x"), Some("http://a.com/x"));
        assert_eq!(standalone_url("see http://a.com/x"), None);
        assert_eq!(standalone_url("http://a http://b"), None);
        assert_eq!(standalone_url("ftp://a.com"), None);
    }

    #[test]
    fn test_non_http_schemes_ignored() {
        assert!(!contains_url("mailto:a@b.com ftp://c.com"));
        assert!(contains_url("xhttp://c.com"));
    }
}

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

/// Schemes of browser-internal or local pages.
const RESTRICTED_SCHEMES: [&str; 10] = [
    "chrome",
    "chrome-extension",
    "chrome-search",
    "chrome-devtools",
    "about",
    "data",
    "file",
    "view-source",
    "edge",
    "brave",
];

static SEARCH_PAGE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"google\.[^/]+/search",
        r"google\.[^/]+/webhp",
        r"www\.google\.[^/]+/?$",
        r"www\.google\.[^/]+/\?",
    ]
    .into_iter()
    .map(|pattern| Regex::new(pattern).expect("Failed to compile search page regex"))
    .collect()
});

/// Whether a url points at a regular web page worth saving.
pub fn is_savable_url(url: &str) -> bool {
    let url = url.trim();
    if url.is_empty() {
        return false;
    }

    let Ok(parsed) = Url::parse(url) else {
        return false;
    };

    if RESTRICTED_SCHEMES.contains(&parsed.scheme()) {
        return false;
    }

    if SEARCH_PAGE_PATTERNS
        .iter()
        .any(|pattern| pattern.is_match(parsed.as_str()))
    {
        return false;
    }

    let host = parsed.host_str().unwrap_or_default();
    if host == "newtab" || host.ends_with("chrome.com") || host.ends_with("chromium.org") {
        return false;
    }

    true
}

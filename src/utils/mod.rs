//! URL helpers shared by the extractors and the silk passes.

pub mod http;

use url::Url;

/// Join `href` onto `base`; an unjoinable href is returned unchanged.
pub fn resolve_url(base: &Url, href: &str) -> String {
    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Like [`resolve_url`], `None` when the base itself does not parse.
pub fn resolve(base_url: &str, href: &str) -> Option<String> {
    Url::parse(base_url)
        .ok()
        .map(|base| resolve_url(&base, href))
}

/// Last path segment of a URL, used as the file name of a downloaded image.
pub fn file_name_from_url(url_str: &str) -> Option<String> {
    Url::parse(url_str)
        .ok()?
        .path_segments()?
        .next_back()
        .filter(|segment| !segment.is_empty())
        .map(|segment| segment.to_string())
}

/// Whether `url` uses a scheme the renderer can open.
pub fn has_web_scheme(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

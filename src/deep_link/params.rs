use reqwest::Url;
use std::collections::HashMap;

/// Flat query parameters of a deep link.
pub type DeepLinkParams = HashMap<String, String>;

/// Parses the query string of `url` into a flat map.
///
/// Values are percent- and plus-decoded. A key given more than once keeps
/// its last value. Returns `None` when `url` is not an absolute URL.
pub fn extract_params(url: &str) -> Option<DeepLinkParams> {
    let parsed = Url::parse(url).ok()?;
    Some(parsed.query_pairs().into_owned().collect())
}

/// The part of `url` before any query string or fragment.
pub(super) fn strip_query(url: &str) -> &str {
    match url.find(|c| c == '?' || c == '#') {
        Some(end) => &url[..end],
        None => url,
    }
}

use std::borrow::Cow;

use url::Url;

/// Turns a reference found in a page into a fetchable URL.
///
/// * `//host/path` is assumed to be served over `https:`.
/// * `/path` is joined onto the origin of `base_url`. When `base_url` has no
///   parseable origin it is used verbatim as the prefix.
/// * Anything else is returned unchanged. Page-relative references such as
///   `../img.png` are not resolved.
pub fn resolve(base_url: &str, reference: &str) -> String {
    if reference.starts_with("//") {
        format!("https:{}", reference)
    } else if reference.starts_with('/') {
        format!("{}{}", origin(base_url), reference)
    } else {
        reference.to_string()
    }
}

fn origin(base_url: &str) -> Cow<'_, str> {
    match Url::parse(base_url) {
        Ok(url) if url.has_host() && url.origin().is_tuple() => {
            Cow::Owned(url.origin().ascii_serialization())
        }
        _ => Cow::Borrowed(base_url),
    }
}

/// Everything after the final `/` of `url`. Query strings and characters that
/// are illegal on the local filesystem are kept as-is.
pub fn file_name(url: &str) -> &str {
    match url.rfind('/') {
        Some(idx) => &url[idx + 1..],
        None => url,
    }
}

/// Drops a leading `https://` or `http://`.
pub fn strip_scheme(url: &str) -> &str {
    url.strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url)
}

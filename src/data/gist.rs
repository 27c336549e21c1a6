//! Gist URL normalization
//!
//! Inventory entries may point at a Gist page instead of its raw content.
//! Every URL is normalized before fetching and before being used as a cache
//! key, so the cache is always keyed by the raw URL.

const GIST_HOST: &str = "gist.github.com";
const RAW_GIST_HOST: &str = "gist.githubusercontent.com";

/// Rewrites a Gist page URL to its raw content URL
///
/// `https://gist.github.com/<user>/<hash>` (with or without a trailing
/// slash, over http or https) becomes
/// `https://gist.githubusercontent.com/<user>/<hash>/raw`. URLs already on
/// the raw host, and anything that isn't a Gist page URL, are returned
/// unchanged.
pub fn to_raw_gist_url(url: &str) -> String {
    if url.contains(RAW_GIST_HOST) {
        return url.to_string();
    }

    let Some(rest) = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
    else {
        return url.to_string();
    };
    let Some(path) = rest
        .strip_prefix(GIST_HOST)
        .and_then(|p| p.strip_prefix('/'))
    else {
        return url.to_string();
    };

    let path = path.strip_suffix('/').unwrap_or(path);
    match path.split_once('/') {
        Some((user, hash))
            if !user.is_empty() && !hash.is_empty() && !hash.contains('/') =>
        {
            format!("https://{}/{}/{}/raw", RAW_GIST_HOST, user, hash)
        }
        _ => url.to_string(),
    }
}

/// Returns true if the URL points at either Gist host
pub fn is_gist_url(url: &str) -> bool {
    url.contains(GIST_HOST) || url.contains(RAW_GIST_HOST)
}

//! Site base-URL normalization and REST root derivation.
//!
//! The base URL is taken from the active site when one is selected, else from
//! the legacy configured URL. An empty result means no site is configured and
//! callers must not issue requests.

use crate::error::CoreError;

/// Path suffix of the WordPress REST root.
pub const REST_SUFFIX: &str = "/wp-json";

/// Canonicalize a raw site URL.
///
/// - surrounding whitespace is trimmed
/// - `https://` is prefixed when no `http://` or `https://` scheme is present
/// - one trailing slash is stripped
///
/// An empty or blank input yields an empty string.
///
/// ```
/// use sitecrm_core::site_url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("example.com/"), "https://example.com");
/// assert_eq!(normalize_base_url("http://crm.local"), "http://crm.local");
/// ```
pub fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let mut url = if has_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    if url.ends_with('/') {
        url.pop();
    }
    url
}

/// Append [`REST_SUFFIX`] to an already-normalized base URL unless present.
pub fn rest_root(base_url: &str) -> String {
    if base_url.is_empty() || base_url.ends_with(REST_SUFFIX) {
        return base_url.to_string();
    }
    format!("{base_url}{REST_SUFFIX}")
}

/// Resolve the canonical site base URL.
///
/// Resolution order: the active site's URL, then the legacy configured URL,
/// then the empty string.
pub fn wp_url(active_site_url: Option<&str>, legacy_url: Option<&str>) -> String {
    [active_site_url, legacy_url]
        .into_iter()
        .flatten()
        .map(normalize_base_url)
        .find(|url| !url.is_empty())
        .unwrap_or_default()
}

/// Resolve the REST root for the same sources as [`wp_url`].
pub fn wp_rest_url(active_site_url: Option<&str>, legacy_url: Option<&str>) -> String {
    rest_root(&wp_url(active_site_url, legacy_url))
}

/// Like [`wp_rest_url`], but maps "nothing configured" to
/// [`CoreError::NoSiteConfigured`].
pub fn require_rest_url(
    active_site_url: Option<&str>,
    legacy_url: Option<&str>,
) -> Result<String, CoreError> {
    let url = wp_rest_url(active_site_url, legacy_url);
    if url.is_empty() {
        return Err(CoreError::NoSiteConfigured);
    }
    Ok(url)
}

fn has_scheme(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.starts_with("https://") || lower.starts_with("http://")
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn bare_host_with_trailing_slash() {
        assert_eq!(wp_url(None, Some("example.com/")), "https://example.com");
        assert_eq!(
            wp_rest_url(None, Some("example.com/")),
            "https://example.com/wp-json"
        );
    }

    #[test]
    fn rest_suffix_not_duplicated() {
        assert_eq!(
            wp_rest_url(Some("https://foo.com/wp-json"), None),
            "https://foo.com/wp-json"
        );
    }

    #[test]
    fn only_one_trailing_slash_is_stripped() {
        assert_eq!(normalize_base_url("https://foo.com//"), "https://foo.com/");
    }

    #[test]
    fn existing_scheme_is_kept() {
        assert_eq!(normalize_base_url("http://foo.com/"), "http://foo.com");
        assert_eq!(normalize_base_url("HTTPS://Foo.com"), "HTTPS://Foo.com");
    }

    #[test]
    fn active_site_wins_over_legacy() {
        assert_eq!(
            wp_url(Some("active.example"), Some("legacy.example")),
            "https://active.example"
        );
    }

    #[test]
    fn blank_active_site_falls_back_to_legacy() {
        assert_eq!(
            wp_url(Some("   "), Some("legacy.example")),
            "https://legacy.example"
        );
    }

    #[test]
    fn nothing_configured_is_empty() {
        assert_eq!(wp_url(None, None), "");
        assert_eq!(wp_rest_url(None, None), "");
        assert_matches!(require_rest_url(None, Some("")), Err(CoreError::NoSiteConfigured));
    }

    #[test]
    fn require_rest_url_returns_root() {
        assert_eq!(
            require_rest_url(Some("crm.example.org"), None).unwrap(),
            "https://crm.example.org/wp-json"
        );
    }
}

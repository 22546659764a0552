//! Canonical https form for user-entered links.

use thiserror::Error;
use url::Url;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UrlError {
    #[error("URL is empty")]
    Empty,
    #[error("invalid URL: {0}")]
    Invalid(#[from] url::ParseError),
    #[error("unsupported URL scheme: {0}")]
    UnsupportedScheme(String),
}

/// Normalize a URL to `https`.
///
/// Missing schemes (including protocol-relative `//host`) become `https://`,
/// `http` is upgraded, a leading `www.` is dropped, `utm_*` tracking
/// parameters are removed, remaining query parameters are sorted by key and a
/// trailing slash is removed from the path.
pub fn normalize_url(input: &str) -> Result<String, UrlError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let with_scheme = if let Some(rest) = trimmed.strip_prefix("//") {
        format!("https://{rest}")
    } else if has_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let mut url = Url::parse(&with_scheme)?;
    match url.scheme() {
        "https" => {}
        "http" => {
            // http -> https between special schemes always succeeds
            let _ = url.set_scheme("https");
        }
        other => return Err(UrlError::UnsupportedScheme(other.to_string())),
    }

    if let Some(bare) = url
        .host_str()
        .and_then(|host| host.strip_prefix("www."))
        .filter(|rest| rest.contains('.'))
        .map(str::to_string)
    {
        url.set_host(Some(&bare))?;
    }

    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !key.to_ascii_lowercase().starts_with("utm_"))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    if params.is_empty() {
        url.set_query(None);
    } else {
        params.sort_by(|a, b| a.0.cmp(&b.0));
        url.query_pairs_mut().clear().extend_pairs(params);
    }

    let path = url.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        url.set_path(path.trim_end_matches('/'));
    }

    let mut out = url.to_string();
    if url.path() == "/" && url.query().is_none() && url.fragment().is_none() {
        out.pop();
    }
    Ok(out)
}

/// A scheme is only recognized ahead of the first `/`, `?` or `#`, so URLs
/// embedded in a query string do not count
fn has_scheme(input: &str) -> bool {
    let head_end = input.find(['/', '?', '#']).unwrap_or(input.len());
    input[..head_end].ends_with(':') && input[head_end..].starts_with("//")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adds_https_to_bare_host() {
        assert_eq!(normalize_url("example.com").unwrap(), "https://example.com");
        assert_eq!(
            normalize_url("  linkedin.com/in/ada  ").unwrap(),
            "https://linkedin.com/in/ada"
        );
    }

    #[test]
    fn upgrades_http_and_strips_www() {
        assert_eq!(
            normalize_url("http://www.Example.com/").unwrap(),
            "https://example.com"
        );
        assert_eq!(
            normalize_url("https://twitter.com/ada/").unwrap(),
            "https://twitter.com/ada"
        );
    }

    #[test]
    fn protocol_relative_gravatar_link() {
        assert_eq!(
            normalize_url("//www.gravatar.com/avatar/abc?s=200&r=pg&d=mm").unwrap(),
            "https://gravatar.com/avatar/abc?d=mm&r=pg&s=200"
        );
    }

    #[test]
    fn drops_tracking_parameters() {
        assert_eq!(
            normalize_url("https://site.io/page?utm_source=x&b=2&a=1").unwrap(),
            "https://site.io/page?a=1&b=2"
        );
        assert_eq!(
            normalize_url("https://site.io/?utm_medium=mail").unwrap(),
            "https://site.io"
        );
    }

    #[test]
    fn bare_links_carrying_urls_in_the_query() {
        assert_eq!(
            normalize_url("ada.dev/login?next=https://ada.dev/home").unwrap(),
            "https://ada.dev/login?next=https%3A%2F%2Fada.dev%2Fhome"
        );
        assert_eq!(
            normalize_url("linkedin.com/in/ada?ref=http://x.io").unwrap(),
            "https://linkedin.com/in/ada?ref=http%3A%2F%2Fx.io"
        );
        assert_eq!(
            normalize_url("www.ada.dev#http://anchor").unwrap(),
            "https://ada.dev/#http://anchor"
        );
        assert_eq!(
            normalize_url("http://ada.dev?next=https://x.io").unwrap(),
            "https://ada.dev/?next=https%3A%2F%2Fx.io"
        );
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(normalize_url("   "), Err(UrlError::Empty));
        assert!(matches!(
            normalize_url("ftp://files.example.com"),
            Err(UrlError::UnsupportedScheme(s)) if s == "ftp"
        ));
        assert!(matches!(
            normalize_url("http://exa mple.com"),
            Err(UrlError::Invalid(_))
        ));
    }
}

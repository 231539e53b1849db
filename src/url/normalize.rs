use crate::UrlError;
use url::Url;

/// Normalizes a website cell from the input table into an origin URL
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace; reject empty input
/// 2. Drop a single trailing `.` (a common spreadsheet artifact)
/// 3. Prepend `https://` when no scheme is present
/// 4. Parse the URL; reject if malformed, not HTTP(S), or host-less
/// 5. Append a trailing `/` to the path so relative resources resolve
///    beneath it
///
/// Host case and `www.` prefixes are left untouched: the origin is recorded
/// exactly as it will be fetched.
///
/// # Examples
///
/// ```
/// use email_crawler::url::normalize_origin;
///
/// let url = normalize_origin("acme.org").unwrap();
/// assert_eq!(url.as_str(), "https://acme.org/");
///
/// let url = normalize_origin("http://acme.org/team.").unwrap();
/// assert_eq!(url.as_str(), "http://acme.org/team/");
/// ```
pub fn normalize_origin(raw: &str) -> Result<Url, UrlError> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_suffix('.').unwrap_or(trimmed);
    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let qualified = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let mut url = Url::parse(&qualified).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingDomain);
    }

    if url.query().is_none() && !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

/// Returns the `http://` variant of an `https://` URL
///
/// Used to retry once after a TLS failure. Returns `None` for URLs that are
/// not HTTPS, since there is nothing to downgrade.
pub fn downgrade_to_http(url: &Url) -> Option<Url> {
    if url.scheme() != "https" {
        return None;
    }
    let mut downgraded = url.clone();
    downgraded.set_scheme("http").ok()?;
    Some(downgraded)
}

/// Returns the `scheme://host[:port]/` base of a URL
///
/// Contact links are resolved against this base rather than the full page
/// URL, so `about.html` on `https://acme.org/en/home` becomes
/// `https://acme.org/about.html`.
pub fn site_base(url: &Url) -> Url {
    let mut base = url.clone();
    base.set_path("/");
    base.set_query(None);
    base.set_fragment(None);
    base
}

/// Returns the robots.txt location for a site
pub fn robots_url(url: &Url) -> Url {
    let mut robots = site_base(url);
    robots.set_path("/robots.txt");
    robots
}

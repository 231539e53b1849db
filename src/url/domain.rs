use url::Url;

/// Extracts a display domain from a URL
///
/// The host is lowercased and a leading `www.` is dropped, so that
/// `https://www.Acme.org/` and `http://acme.org/contact` report the same
/// organization in logs and summaries. Ports are not part of the domain.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use email_crawler::url::extract_domain;
///
/// let url = Url::parse("https://www.acme.org/contact").unwrap();
/// assert_eq!(extract_domain(&url), Some("acme.org".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    match host.strip_prefix("www.") {
        Some(rest) if !rest.is_empty() => Some(rest.to_string()),
        _ => Some(host),
    }
}

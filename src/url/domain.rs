use url::Url;

/// Extracts the host from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// If the URL has no host (which shouldn't happen for valid HTTP(S) URLs), it returns None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use docs_trawl::url::extract_host;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_host(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("https://sub.example.com/path").unwrap();
/// assert_eq!(extract_host(&url), Some("sub.example.com".to_string()));
/// ```
pub fn extract_host(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Checks whether `candidate` lives on exactly the same host as `base`
///
/// Subdomains are distinct origins: `docs.example.com` is not the same site
/// as `example.com`, even though they share the registrable domain. Explicit
/// ports must match too (default ports compare equal to an omitted port).
///
/// # Examples
///
/// ```
/// use url::Url;
/// use docs_trawl::url::same_host;
///
/// let base = Url::parse("https://example.com/").unwrap();
/// assert!(same_host(&base, &Url::parse("https://example.com:443/a").unwrap()));
/// assert!(!same_host(&base, &Url::parse("https://docs.example.com/a").unwrap()));
/// ```
pub fn same_host(base: &Url, candidate: &Url) -> bool {
    match (extract_host(base), extract_host(candidate)) {
        (Some(a), Some(b)) => {
            a == b && base.port_or_known_default() == candidate.port_or_known_default()
        }
        _ => false,
    }
}

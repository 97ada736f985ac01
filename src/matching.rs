//! RFC 6265 domain and path matching, and the lookup of cookies for a request.

use crate::index::CookieIndex;
use crate::record::CookieRecord;
use crate::suffix::PublicSuffix;
use std::cmp::Ordering;
use std::net::IpAddr;
use time::OffsetDateTime;

/// Lower cased, without the leading dot a `Domain` attribute may carry.
pub fn canonical_domain(domain: &str) -> String {
    domain
        .strip_prefix('.')
        .unwrap_or(domain)
        .to_ascii_lowercase()
}

fn is_ip_address(host: &str) -> bool {
    let host = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    host.parse::<IpAddr>().is_ok()
}

/// RFC 6265 5.1.3. Both arguments are expected canonical.
///
/// `domain` covers `host` if they are identical, or if `host` ends with
/// `.domain` and is not an IP address.
pub fn domain_match(host: &str, domain: &str) -> bool {
    if host == domain {
        return true;
    }
    if domain.is_empty() || is_ip_address(host) {
        return false;
    }
    host.len() > domain.len()
        && host.ends_with(domain)
        && host.as_bytes()[host.len() - domain.len() - 1] == b'.'
}

/// RFC 6265 5.1.4. Whether a cookie with `cookie_path` is sent for
/// `request_path`.
pub fn path_match(request_path: &str, cookie_path: &str) -> bool {
    if request_path == cookie_path || cookie_path == "/" {
        return true;
    }
    if !request_path.starts_with(cookie_path) {
        return false;
    }
    // "/a/b/" covers "/a/b/c", "/a/b" covers "/a/b/c", but not "/a/bc"
    cookie_path.ends_with('/') || request_path.as_bytes().get(cookie_path.len()) == Some(&b'/')
}

/// RFC 6265 5.1.4 default-path of a request path.
pub fn default_path(request_path: &str) -> String {
    if !request_path.starts_with('/') {
        return "/".into();
    }
    match request_path.rfind('/') {
        Some(0) | None => "/".into(),
        Some(idx) => request_path[..idx].into(),
    }
}

/// The domains whose cookies can apply to `host`: the host itself, then each
/// parent with one more leading label stripped, "a.b.example.com",
/// "b.example.com", "example.com".
///
/// With a suffix list, the walk stops before the first public suffix. Without
/// one, it goes all the way to the top level label. IP addresses have no
/// parents.
pub fn candidate_domains(host: &str, suffixes: Option<&dyn PublicSuffix>) -> Vec<String> {
    let mut ret = vec![host.to_owned()];

    if is_ip_address(host) {
        return ret;
    }

    let mut cur = host;
    while let Some(idx) = cur.find('.') {
        cur = &cur[idx + 1..];
        if cur.is_empty() {
            break;
        }
        if let Some(suffixes) = suffixes {
            if suffixes.is_public_suffix(cur) {
                break;
            }
        }
        ret.push(cur.to_owned());
    }

    ret
}

/// Longer paths first, then earlier creation, then earlier insertion.
pub fn cookie_order(a: &CookieRecord, b: &CookieRecord) -> Ordering {
    b.path
        .len()
        .cmp(&a.path.len())
        .then_with(|| a.creation.cmp(&b.creation))
        .then_with(|| a.creation_index.cmp(&b.creation_index))
}

/// A request to match cookies for.
#[derive(Debug, Clone, Copy)]
pub struct MatchQuery<'a> {
    /// Canonical request host.
    pub host: &'a str,
    pub path: &'a str,
    pub secure: bool,
    pub now: OffsetDateTime,
}

/// Collect and order every cookie in `index` that applies to `query`.
///
/// `sameSite` is not applied here; each record carries it for the caller.
pub fn find_matching<'a>(
    index: &'a CookieIndex,
    query: &MatchQuery<'_>,
    suffixes: Option<&dyn PublicSuffix>,
) -> Vec<&'a CookieRecord> {
    let path = if query.path.is_empty() { "/" } else { query.path };

    let mut ret = vec![];

    for candidate in candidate_domains(query.host, suffixes) {
        let exact = candidate == query.host;

        for rec in index.enumerate(Some(candidate.as_str()), None) {
            if rec.host_only && !exact {
                trace!("Skip host only cookie for parent domain: {}", rec.key);
                continue;
            }
            if !path_match(path, &rec.path) {
                continue;
            }
            // secure cookies need a secure transport
            if rec.secure && !query.secure {
                trace!("Skip secure cookie on insecure request: {}", rec.key);
                continue;
            }
            if rec.is_expired(query.now) {
                continue;
            }
            ret.push(rec);
        }
    }

    ret.sort_by(|a, b| cookie_order(a, b));

    ret
}

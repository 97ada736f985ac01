//! Set-Cookie ingestion and Cookie header production on top of a `MemoryStore`.

use crate::matching::{canonical_domain, default_path, domain_match};
use crate::record::{CookieRecord, Expiry, SameSite};
use crate::store::MemoryStore;
use crate::uri_ext::UriExt;
use crate::Error;
use cookie::Cookie;
use time::{Duration, OffsetDateTime};

/// A cookie jar for an http client.
///
/// ```
/// use hjar::{BlockExt, Jar};
///
/// let jar = Jar::new();
/// let uri: http::Uri = "https://www.example.com/account/login".parse().unwrap();
///
/// jar.set_cookie(&uri, "sid=abc123; Domain=example.com; Path=/; Secure")
///     .block()
///     .unwrap();
///
/// let other: http::Uri = "https://api.example.com/v1".parse().unwrap();
/// assert_eq!(jar.cookie_header(&other).unwrap().as_deref(), Some("sid=abc123"));
/// ```
#[derive(Debug, Default)]
pub struct Jar {
    store: MemoryStore,
}

impl Jar {
    pub fn new() -> Self {
        Jar {
            store: MemoryStore::new(),
        }
    }

    /// A jar over a configured store.
    pub fn with_store(store: MemoryStore) -> Self {
        Jar { store }
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    /// Store the cookie from a `Set-Cookie` value received from `uri`.
    ///
    /// Returns the record as stored. A cookie that is already expired removes
    /// any stored cookie with the same identity instead of being stored.
    pub async fn set_cookie(&self, uri: &http::Uri, header: &str) -> Result<CookieRecord, Error> {
        let cookie = Cookie::parse(header)?;
        let now = self.store.now();
        let record = to_record(&cookie, uri, now)?;

        if record.is_expired(now) {
            trace!("Cookie expired on arrival, removing: {}", record.key);
            self.store
                .remove_one(&record.domain, &record.path, &record.key)
                .await?;
            return Ok(record);
        }

        self.store.put(record).await
    }

    /// The cookies to send with a request to `uri`, in send order.
    pub fn get_cookies(&self, uri: &http::Uri) -> Result<Vec<CookieRecord>, Error> {
        let host = match uri.cookie_host() {
            Some(v) => v,
            None => {
                debug!("No cookies for uri without a host: {}", uri);
                return Ok(vec![]);
            }
        };
        self.store
            .find_matching(&host, uri.cookie_path(), uri.is_secure())
    }

    /// The `Cookie` request header value for `uri`, if any cookie applies.
    pub fn cookie_header(&self, uri: &http::Uri) -> Result<Option<String>, Error> {
        let cookies = self.get_cookies(uri)?;
        if cookies.is_empty() {
            return Ok(None);
        }
        // values go back byte for byte as the server sent them
        let pairs: Vec<String> = cookies
            .iter()
            .map(|c| format!("{}={}", c.key, c.value))
            .collect();
        Ok(Some(pairs.join("; ")))
    }

    /// Remove the cookie `name` set for exactly the host and path of `uri`.
    pub async fn remove(&self, uri: &http::Uri, name: &str) -> Result<Option<CookieRecord>, Error> {
        let host = match uri.cookie_host() {
            Some(v) => v,
            None => return Ok(None),
        };
        self.store.remove_one(&host, uri.cookie_path(), name).await
    }

    pub async fn clear(&self) -> Result<(), Error> {
        self.store.clear_all().await
    }

    /// Serialize every cookie, in insertion order.
    #[cfg(feature = "json")]
    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(&self.store.export_all()?)?)
    }

    /// Load cookies serialized by `to_json()` into this jar, under the rules
    /// of its store. Use this on `Jar::with_store()` to load a snapshot taken
    /// from a jar that accepts public suffix domains.
    #[cfg(feature = "json")]
    pub fn load_json(&mut self, json: &str) -> Result<usize, Error> {
        let records: Vec<CookieRecord> = serde_json::from_str(json)?;
        self.store.restore(records)
    }

    /// A default jar holding the cookies serialized by `to_json()`.
    ///
    /// The default store rejects public suffix domains, so a snapshot holding
    /// such a cookie fails to load as a whole. See `load_json()`.
    #[cfg(feature = "json")]
    pub fn from_json(json: &str) -> Result<Jar, Error> {
        let mut jar = Jar::new();
        jar.load_json(json)?;
        Ok(jar)
    }
}

fn to_record(cookie: &Cookie<'_>, uri: &http::Uri, now: OffsetDateTime) -> Result<CookieRecord, Error> {
    let host = match uri.cookie_host() {
        Some(v) => v,
        None => {
            debug!("Ignore cookie for uri without a host: {}", uri);
            return Err(Error::InvalidRecord(format!("uri without a host: {}", uri)));
        }
    };

    let (domain, host_only) = effective_domain(cookie.domain(), &host)?;

    let (path, path_is_default) = match cookie.path() {
        Some(p) if p.starts_with('/') => (p.to_owned(), false),
        _ => (default_path(uri.cookie_path()), true),
    };

    Ok(CookieRecord {
        domain,
        path,
        key: cookie.name().to_owned(),
        value: cookie.value().to_owned(),
        expires: expiry(cookie, now),
        creation: now,
        last_accessed: now,
        secure: cookie.secure().unwrap_or(false),
        http_only: cookie.http_only().unwrap_or(false),
        host_only,
        same_site: cookie.same_site().map(SameSite::from).unwrap_or_default(),
        path_is_default,
        creation_index: 0,
    })
}

/// The domain the cookie is stored under, and whether it is host only.
fn effective_domain(cookie_domain: Option<&str>, host: &str) -> Result<(String, bool), Error> {
    let cookie_domain = match cookie_domain {
        Some(v) if !v.is_empty() => canonical_domain(v),
        _ => {
            trace!("No domain in cookie, using uri host: {}", host);
            return Ok((host.to_owned(), true));
        }
    };

    // the cookie must be for the host or one of its parents.
    if domain_match(host, &cookie_domain) {
        Ok((cookie_domain, false))
    } else {
        trace!(
            "Ignore cookie where domain doesn't match host domain: {} != {}",
            cookie_domain,
            host
        );
        Err(Error::InvalidRecord(format!(
            "cookie domain {} does not match host {}",
            cookie_domain, host
        )))
    }
}

/// Max-Age wins over Expires. Neither makes a session cookie, which lives as
/// long as the store.
fn expiry(cookie: &Cookie<'_>, now: OffsetDateTime) -> Expiry {
    if let Some(max_age) = cookie.max_age() {
        if max_age <= Duration::ZERO {
            return Expiry::At(OffsetDateTime::UNIX_EPOCH);
        }
        return now
            .checked_add(max_age)
            .map(Expiry::At)
            .unwrap_or(Expiry::Never);
    }
    match cookie.expires_datetime() {
        Some(at) => Expiry::At(at),
        None => Expiry::Never,
    }
}

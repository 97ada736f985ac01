use serde::{Deserialize, Serialize};
use std::fmt;
use time::OffsetDateTime;

/// When a cookie stops being sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Expiry {
    /// Expires at the given instant.
    At(#[serde(with = "time::serde::rfc3339")] OffsetDateTime),
    /// Never expires. Session cookies live as long as the store.
    #[default]
    Never,
}

impl Expiry {
    /// An expiry at or before `now` is expired.
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        match self {
            Expiry::At(t) => *t <= now,
            Expiry::Never => false,
        }
    }
}

/// The `SameSite` attribute. Applying it is left to the http layer, which
/// knows the request context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SameSite {
    Strict,
    Lax,
    #[default]
    None,
}

impl From<cookie::SameSite> for SameSite {
    fn from(s: cookie::SameSite) -> Self {
        match s {
            cookie::SameSite::Strict => SameSite::Strict,
            cookie::SameSite::Lax => SameSite::Lax,
            cookie::SameSite::None => SameSite::None,
        }
    }
}

/// A stored cookie.
///
/// The identity is `(domain, path, key)`. Once handed to a store, the store
/// owns the record; everything it gives back is a copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieRecord {
    pub domain: String,
    pub path: String,
    /// The cookie name.
    pub key: String,
    pub value: String,
    pub expires: Expiry,
    #[serde(with = "time::serde::rfc3339")]
    pub creation: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub last_accessed: OffsetDateTime,
    pub secure: bool,
    pub http_only: bool,
    pub host_only: bool,
    pub same_site: SameSite,
    pub path_is_default: bool,
    /// Insertion sequence assigned by the store. Breaks ordering ties between
    /// cookies created within the same clock tick.
    #[serde(default)]
    pub creation_index: u64,
}

impl CookieRecord {
    /// A session cookie created now, with every flag off.
    pub fn new(domain: &str, path: &str, key: &str, value: &str) -> Self {
        let now = OffsetDateTime::now_utc();
        CookieRecord {
            domain: domain.to_owned(),
            path: path.to_owned(),
            key: key.to_owned(),
            value: value.to_owned(),
            expires: Expiry::default(),
            creation: now,
            last_accessed: now,
            secure: false,
            http_only: false,
            host_only: false,
            same_site: SameSite::default(),
            path_is_default: false,
            creation_index: 0,
        }
    }

    /// `(domain, path, key)`
    pub fn identity(&self) -> (&str, &str, &str) {
        (&self.domain, &self.path, &self.key)
    }

    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires.is_expired(now)
    }
}

/// Formats as a `Cookie` request header pair, `key=value`.
impl fmt::Display for CookieRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

//! Public suffix lookups.

use ::psl::{List, Psl};

/// Tells whether a domain is a public suffix, such as "com" or "co.uk".
///
/// Cookies may not be scoped to a public suffix, and domain walks during
/// matching stop before reaching one.
pub trait PublicSuffix: Send + Sync {
    fn is_public_suffix(&self, domain: &str) -> bool;
}

/// The public suffix list compiled into the `psl` crate.
///
/// Only suffixes known to the list count. Unknown top level names such as
/// "localhost" or "myownspecialdomain" are not treated as public suffixes.
#[derive(Debug, Clone, Copy, Default)]
pub struct PublicSuffixList;

impl PublicSuffix for PublicSuffixList {
    fn is_public_suffix(&self, domain: &str) -> bool {
        let domain = domain.trim_end_matches('.');
        let suffix = match List.suffix(domain.as_bytes()) {
            Some(v) => v,
            // empty or malformed, nothing to be a suffix of
            None => return false,
        };
        let is_suffix = suffix.is_known() && suffix.as_bytes().eq_ignore_ascii_case(domain.as_bytes());
        if is_suffix {
            trace!("Domain is a public suffix: {}", domain);
        }
        is_suffix
    }
}

/// No domain is a public suffix.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPublicSuffixes;

impl PublicSuffix for NoPublicSuffixes {
    fn is_public_suffix(&self, _domain: &str) -> bool {
        false
    }
}

impl<F> PublicSuffix for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_public_suffix(&self, domain: &str) -> bool {
        self(domain)
    }
}

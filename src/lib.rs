#![warn(clippy::all)]
//! hjar is an in-memory RFC 6265 cookie store for http clients.
//!
//! Cookies are indexed by domain, then path, then name. All three keys come
//! straight from servers (or scripts) and are treated as opaque strings: a
//! cookie for domain `__proto__` is stored and found like any other, and
//! touches nothing outside its own entry.
//!
//! ```
//! use hjar::{BlockExt, CookieRecord, MemoryStore};
//!
//! fn main() -> Result<(), hjar::Error> {
//!     let store = MemoryStore::new();
//!
//!     store.put(CookieRecord::new("example.com", "/", "root", "1")).block()?;
//!     store.put(CookieRecord::new("example.com", "/a/b", "deep", "2")).block()?;
//!
//!     // most specific path first
//!     let found = store.find_matching("www.example.com", "/a/b/c", false)?;
//!     let names: Vec<_> = found.iter().map(|c| c.key.as_str()).collect();
//!     assert_eq!(names, vec!["deep", "root"]);
//!
//!     Ok(())
//! }
//! ```
//!
//! For Set-Cookie headers and request URIs, see [`Jar`].

#[macro_use]
extern crate log;

mod block_ext;
mod clock;
mod cookies;
mod error;
mod index;
mod matching;
mod record;
mod safe_map;
mod store;
mod suffix;
mod uri_ext;

pub use crate::block_ext::BlockExt;
pub use crate::clock::{Clock, FixedClock, SystemClock};
pub use crate::cookies::Jar;
pub use crate::error::Error;
pub use crate::index::CookieIndex;
pub use crate::matching::{candidate_domains, default_path, domain_match, path_match};
pub use crate::record::{CookieRecord, Expiry, SameSite};
pub use crate::safe_map::{Keys, SafeMap};
pub use crate::store::MemoryStore;
pub use crate::suffix::{NoPublicSuffixes, PublicSuffix, PublicSuffixList};
pub use http;

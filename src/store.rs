//! The in-memory cookie store.
//!
//! Mutations queue up on a fair async mutex and are applied one at a time, in
//! arrival order. Once a mutation holds its turn, the index write happens in a
//! single synchronous section, so no reader ever sees a half built domain or
//! path level. Reads skip the queue.

use crate::clock::{Clock, SystemClock};
use crate::index::CookieIndex;
use crate::matching::{self, canonical_domain, MatchQuery};
use crate::record::CookieRecord;
use crate::suffix::{PublicSuffix, PublicSuffixList};
use crate::Error;
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use time::OffsetDateTime;
use tokio::sync::Mutex;

pub struct MemoryStore {
    index: RwLock<CookieIndex>,
    // one mutation at a time, granted in request order
    turn: Mutex<()>,
    next_creation_index: AtomicU64,
    broken: AtomicBool,
    reject_public_suffixes: bool,
    suffixes: Box<dyn PublicSuffix>,
    clock: Box<dyn Clock>,
}

impl MemoryStore {
    /// An empty store that rejects public suffix domains, using the bundled
    /// public suffix list and the system clock.
    pub fn new() -> Self {
        MemoryStore {
            index: RwLock::new(CookieIndex::new()),
            turn: Mutex::new(()),
            next_creation_index: AtomicU64::new(1),
            broken: AtomicBool::new(false),
            reject_public_suffixes: true,
            suffixes: Box::new(PublicSuffixList),
            clock: Box::new(SystemClock),
        }
    }

    /// Whether cookies with a public suffix `Domain` are refused, and domain
    /// walks stop at the public suffix boundary. Defaults to `true`.
    pub fn reject_public_suffixes(&mut self, reject: bool) {
        self.reject_public_suffixes = reject;
    }

    /// Replace the public suffix lookup.
    pub fn public_suffix(&mut self, suffixes: impl PublicSuffix + 'static) {
        self.suffixes = Box::new(suffixes);
    }

    /// Replace the time source.
    pub fn clock(&mut self, clock: impl Clock + 'static) {
        self.clock = Box::new(clock);
    }

    pub fn is_rejecting_public_suffixes(&self) -> bool {
        self.reject_public_suffixes
    }

    /// Current time according to the store clock.
    pub fn now(&self) -> OffsetDateTime {
        self.clock.now()
    }

    /// Store a record, overwriting any record with the same identity.
    ///
    /// An overwrite keeps the creation time of the record it replaces. The
    /// domain is stored lower cased. Returns a copy of what was stored.
    pub async fn put(&self, mut record: CookieRecord) -> Result<CookieRecord, Error> {
        let _turn = self.turn.lock().await;
        self.check_intact()?;

        record.domain = canonical_domain(&record.domain);
        self.check_identity(&record)?;

        let now = self.clock.now();
        let mut index = self.write()?;

        match index.get(&record.domain, &record.path, &record.key) {
            Some(old) => {
                record.creation = old.creation;
                record.creation_index = old.creation_index;
            }
            None => {
                record.creation_index = self.next_creation_index.fetch_add(1, Ordering::Relaxed);
            }
        }
        record.last_accessed = now;

        let stored = record.clone();
        index.put(record)?;

        // the leaf must now be reachable under exactly this identity
        let (domain, path, key) = stored.identity();
        if index.get(domain, path, key) != Some(&stored) {
            return Err(self.fail(&format!("record not reachable after put: {:?}", stored.identity())));
        }

        trace!("Stored cookie {} for {}{}", stored.key, stored.domain, stored.path);
        Ok(stored)
    }

    /// Remove one record. Returns it if it was present.
    pub async fn remove_one(
        &self,
        domain: &str,
        path: &str,
        key: &str,
    ) -> Result<Option<CookieRecord>, Error> {
        let _turn = self.turn.lock().await;
        self.check_intact()?;

        let domain = canonical_domain(domain);
        let removed = self.write()?.remove_one(&domain, path, key);
        Ok(removed)
    }

    /// Remove every record under `domain`, or only those under `domain` and
    /// the exact `path`. Returns the number removed.
    pub async fn remove_all_under(&self, domain: &str, path: Option<&str>) -> Result<usize, Error> {
        let _turn = self.turn.lock().await;
        self.check_intact()?;

        let domain = canonical_domain(domain);
        let removed = self.write()?.remove_all_under(&domain, path);
        debug!("Removed {} cookies under {} {:?}", removed, domain, path);
        Ok(removed)
    }

    /// Drop every record. The store behaves as newly created afterwards.
    pub async fn clear_all(&self) -> Result<(), Error> {
        let _turn = self.turn.lock().await;
        self.check_intact()?;

        self.write()?.clear_all();
        debug!("Cleared cookie store");
        Ok(())
    }

    /// Drop every record expired by now. Returns the number removed.
    pub async fn remove_expired(&self) -> Result<usize, Error> {
        let _turn = self.turn.lock().await;
        self.check_intact()?;

        let now = self.clock.now();
        let removed = self.write()?.retain(|rec| !rec.is_expired(now));
        if removed > 0 {
            debug!("Removed {} expired cookies", removed);
        }
        Ok(removed)
    }

    /// Copy of the record with this identity.
    pub fn get(&self, domain: &str, path: &str, key: &str) -> Result<Option<CookieRecord>, Error> {
        self.check_intact()?;
        let domain = canonical_domain(domain);
        Ok(self.read()?.get(&domain, path, key).cloned())
    }

    /// Copies of the records under an exact domain and/or exact path key.
    pub fn enumerate(
        &self,
        domain: Option<&str>,
        path: Option<&str>,
    ) -> Result<Vec<CookieRecord>, Error> {
        self.check_intact()?;
        let domain = domain.map(canonical_domain);
        let index = self.read()?;
        Ok(index.enumerate(domain.as_deref(), path).cloned().collect())
    }

    /// Number of stored records, expired ones included.
    pub fn len(&self) -> Result<usize, Error> {
        self.check_intact()?;
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, Error> {
        Ok(self.len()? == 0)
    }

    /// Every record, in insertion order, for persistence.
    pub fn export_all(&self) -> Result<Vec<CookieRecord>, Error> {
        let mut all = self.enumerate(None, None)?;
        all.sort_by_key(|r| r.creation_index);
        Ok(all)
    }

    /// The cookies to send for a request to `domain` and `path`, most specific
    /// path first, then oldest first.
    ///
    /// Expired cookies are left out, as are secure cookies when the request is
    /// not secure. Every returned record gets its `last_accessed` bumped.
    pub fn find_matching(
        &self,
        domain: &str,
        path: &str,
        secure: bool,
    ) -> Result<Vec<CookieRecord>, Error> {
        self.check_intact()?;

        let host = canonical_domain(domain);
        let now = self.clock.now();
        let query = MatchQuery {
            host: &host,
            path,
            secure,
            now,
        };

        let mut found: Vec<CookieRecord> = {
            let index = self.read()?;
            matching::find_matching(&index, &query, self.suffix_boundary())
                .into_iter()
                .cloned()
                .collect()
        };

        for rec in &mut found {
            rec.last_accessed = now;
        }
        self.touch(&found, now);

        Ok(found)
    }

    /// Load records verbatim, such as from an earlier `export_all()`.
    ///
    /// Either every record is loaded or none is. Returns the number of
    /// distinct identities loaded; a later duplicate replaces an earlier one.
    pub fn restore(&mut self, records: Vec<CookieRecord>) -> Result<usize, Error> {
        self.check_intact()?;

        let current = self.index.get_mut().ok().map(|v| v.clone());
        let mut staged = match current {
            Some(v) => v,
            None => return Err(self.fail("index lock poisoned")),
        };

        let mut seen = HashSet::new();
        let mut max_index = 0;
        for mut rec in records {
            rec.domain = canonical_domain(&rec.domain);
            self.check_identity(&rec)?;
            max_index = max_index.max(rec.creation_index);
            let (domain, path, key) = rec.identity();
            seen.insert((domain.to_owned(), path.to_owned(), key.to_owned()));
            staged.put(rec)?;
        }
        let count = seen.len();

        let next = self.next_creation_index.get_mut();
        *next = (*next).max(max_index + 1);

        let swapped = match self.index.get_mut() {
            Ok(v) => {
                *v = staged;
                true
            }
            Err(_) => false,
        };
        if !swapped {
            return Err(self.fail("index lock poisoned"));
        }

        debug!("Restored {} cookies", count);
        Ok(count)
    }

    fn suffix_boundary(&self) -> Option<&dyn PublicSuffix> {
        if self.reject_public_suffixes {
            Some(&*self.suffixes)
        } else {
            None
        }
    }

    fn check_identity(&self, record: &CookieRecord) -> Result<(), Error> {
        if record.domain.is_empty() || record.key.is_empty() {
            return Err(Error::InvalidRecord(format!(
                "cookie identity must have a domain and a name: {:?}",
                record.identity()
            )));
        }
        // a host only cookie is the public suffix host's own
        if self.reject_public_suffixes
            && !record.host_only
            && self.suffixes.is_public_suffix(&record.domain)
        {
            trace!("Reject cookie with public suffix domain: {}", record.domain);
            return Err(Error::DomainRejected(format!(
                "cookie domain is a public suffix: {}",
                record.domain
            )));
        }
        Ok(())
    }

    // Relaxed: a record removed or replaced since the read is left alone.
    fn touch(&self, records: &[CookieRecord], now: OffsetDateTime) {
        if records.is_empty() {
            return;
        }
        let mut index = match self.index.write() {
            Ok(v) => v,
            // the next checked operation reports this
            Err(_) => return,
        };
        for rec in records {
            if let Some(stored) = index.get_mut(&rec.domain, &rec.path, &rec.key) {
                if stored.creation_index == rec.creation_index {
                    stored.last_accessed = now;
                }
            }
        }
    }

    fn check_intact(&self) -> Result<(), Error> {
        if self.broken.load(Ordering::Acquire) {
            return Err(Error::KeyIntegrityViolation(
                "cookie store is no longer usable".into(),
            ));
        }
        Ok(())
    }

    fn fail(&self, reason: &str) -> Error {
        error!("Cookie store integrity failure: {}", reason);
        self.broken.store(true, Ordering::Release);
        Error::KeyIntegrityViolation(reason.to_owned())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, CookieIndex>, Error> {
        self.index
            .read()
            .map_err(|_| self.fail("index lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, CookieIndex>, Error> {
        self.index
            .write()
            .map_err(|_| self.fail("index lock poisoned"))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        MemoryStore::new()
    }
}

impl fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStore")
            .field("reject_public_suffixes", &self.reject_public_suffixes)
            .field("broken", &self.broken.load(Ordering::Relaxed))
            .finish()
    }
}

//! The three level cookie index: domain, then path, then cookie name.
//!
//! Every level is a [`SafeMap`], so no domain, path or name string can reach
//! anything but the entries this index inserted itself. Emptied levels are
//! pruned eagerly; a missing level and an empty level both read as
//! "no cookies".

use crate::record::CookieRecord;
use crate::safe_map::SafeMap;
use crate::Error;

type NameLevel = SafeMap<CookieRecord>;
type PathLevel = SafeMap<NameLevel>;

#[derive(Debug, Clone, Default)]
pub struct CookieIndex {
    domains: SafeMap<PathLevel>,
}

impl CookieIndex {
    pub fn new() -> Self {
        CookieIndex {
            domains: SafeMap::new(),
        }
    }

    /// Insert or overwrite the record under its `(domain, path, key)`.
    ///
    /// Returns the record that was replaced. A record with an empty domain or
    /// key is refused before anything is written.
    pub fn put(&mut self, record: CookieRecord) -> Result<Option<CookieRecord>, Error> {
        if record.domain.is_empty() {
            return Err(Error::InvalidRecord(format!(
                "empty domain for cookie: {:?}",
                record.key
            )));
        }
        if record.key.is_empty() {
            return Err(Error::InvalidRecord(format!(
                "empty cookie name in domain: {:?}",
                record.domain
            )));
        }

        let key = record.key.clone();
        let paths = self
            .domains
            .get_or_insert_with(&record.domain, SafeMap::new);
        let names = paths.get_or_insert_with(&record.path, SafeMap::new);

        Ok(names.set(&key, record))
    }

    pub fn get(&self, domain: &str, path: &str, key: &str) -> Option<&CookieRecord> {
        self.domains.get(domain)?.get(path)?.get(key)
    }

    pub fn get_mut(&mut self, domain: &str, path: &str, key: &str) -> Option<&mut CookieRecord> {
        self.domains.get_mut(domain)?.get_mut(path)?.get_mut(key)
    }

    pub fn remove_one(&mut self, domain: &str, path: &str, key: &str) -> Option<CookieRecord> {
        let paths = self.domains.get_mut(domain)?;
        let names = paths.get_mut(path)?;
        let removed = names.delete(key)?;

        let names_empty = names.is_empty();
        if names_empty {
            paths.delete(path);
        }
        if paths.is_empty() {
            self.domains.delete(domain);
        }

        Some(removed)
    }

    /// Remove everything under `domain`, or under `domain` + `path`. Returns the
    /// number of records removed.
    pub fn remove_all_under(&mut self, domain: &str, path: Option<&str>) -> usize {
        match path {
            None => self
                .domains
                .delete(domain)
                .map(|paths| paths.values().map(|n| n.len()).sum::<usize>())
                .unwrap_or(0),
            Some(path) => {
                let paths = match self.domains.get_mut(domain) {
                    Some(v) => v,
                    None => return 0,
                };
                let removed = paths.delete(path).map(|n| n.len()).unwrap_or(0);
                if paths.is_empty() {
                    self.domains.delete(domain);
                }
                removed
            }
        }
    }

    /// Keep only the records for which `f` returns true. Returns the number
    /// of records removed.
    pub fn retain<F: FnMut(&CookieRecord) -> bool>(&mut self, mut f: F) -> usize {
        let mut removed = 0;

        self.domains.retain(|_, paths| {
            paths.retain(|_, names| {
                let before = names.len();
                names.retain(|_, rec| f(&*rec));
                removed += before - names.len();
                !names.is_empty()
            });
            !paths.is_empty()
        });

        removed
    }

    /// Discard the whole index for a new, empty top level container.
    pub fn clear_all(&mut self) {
        self.domains = SafeMap::new();
    }

    /// Lazily walk the records, optionally only those under an exact domain
    /// key and/or an exact path key.
    pub fn enumerate<'a: 'f, 'f>(
        &'a self,
        domain: Option<&'f str>,
        path: Option<&'f str>,
    ) -> impl Iterator<Item = &'a CookieRecord> + 'f {
        select(&self.domains, domain)
            .flat_map(move |paths| select(paths, path))
            .flat_map(|names| names.values())
    }

    pub fn has_domain(&self, domain: &str) -> bool {
        self.domains.has(domain)
    }

    pub fn len(&self) -> usize {
        self.enumerate(None, None).count()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}

// one value when filtered, every value otherwise
fn select<'a: 'f, 'f, V>(
    map: &'a SafeMap<V>,
    filter: Option<&'f str>,
) -> impl Iterator<Item = &'a V> + 'f {
    let (one, all) = match filter {
        Some(key) => (map.get(key), None),
        None => (None, Some(map.values())),
    };
    one.into_iter().chain(all.into_iter().flatten())
}

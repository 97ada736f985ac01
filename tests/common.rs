#![allow(unused)]

use hjar::{CookieRecord, Expiry, FixedClock, MemoryStore};
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::sync::{Arc, Once};
use time::macros::datetime;

/// Keys that mean something to a prototype based object model.
pub const RESERVED: &[&str] = &[
    "__proto__",
    "constructor",
    "prototype",
    "toString",
    "hasOwnProperty",
];

pub fn setup_logger() {
    static START: Once = Once::new();
    START.call_once(|| {
        let test_log = std::env::var("TEST_LOG")
            .map(|x| x != "0" && x.to_lowercase() != "false")
            .unwrap_or(false);
        let level = if test_log {
            log::LevelFilter::Trace
        } else {
            log::LevelFilter::Info
        };
        pretty_env_logger::formatted_builder()
            .filter_level(log::LevelFilter::Warn)
            .filter_module("hjar", level)
            .target(env_logger::Target::Stdout)
            .init();
    });
}

/// A store on a clock that stands still at 2020-01-01 until advanced.
pub fn fixed_store() -> (MemoryStore, Arc<FixedClock>) {
    let clock = Arc::new(FixedClock::new(datetime!(2020-01-01 0:00 UTC)));
    let mut store = MemoryStore::new();
    store.clock(clock.clone());
    (store, clock)
}

pub fn record(domain: &str, path: &str, key: &str, value: &str) -> CookieRecord {
    let mut rec = CookieRecord::new(domain, path, key, value);
    rec.creation = datetime!(2020-01-01 0:00 UTC);
    rec.last_accessed = rec.creation;
    rec.expires = Expiry::Never;
    rec
}

/// Lower case alphanumeric, like a canonical domain label.
pub fn random_key(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect::<String>()
        .to_ascii_lowercase()
}

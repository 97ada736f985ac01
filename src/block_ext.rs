use std::future::Future;

/// Drive a store future to completion on the current thread.
///
/// For callers without an async runtime, the way `setCookieSync` style APIs
/// are used:
///
/// ```
/// use hjar::{BlockExt, CookieRecord, MemoryStore};
///
/// let store = MemoryStore::new();
/// store
///     .put(CookieRecord::new("example.com", "/", "Foo", "Bar"))
///     .block()
///     .unwrap();
/// ```
pub trait BlockExt {
    fn block(self) -> Self::Output
    where
        Self: Future;
}

impl<F: Future> BlockExt for F {
    fn block(self) -> F::Output {
        futures_executor::block_on(self)
    }
}

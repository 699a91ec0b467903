//! Per-item serialization of contribution writes.
//!
//! The fulfilled-check and the append must be atomic with respect to each
//! other: two concurrent contributions that both pass the check would
//! over-fulfill the item beyond the accepted over-contribution tolerance.
//! One async mutex per item id serializes the whole check-and-append
//! section in-process.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

#[derive(Clone, Default)]
pub struct ItemLocks {
    inner: Arc<Mutex<HashMap<i64, Arc<AsyncMutex<()>>>>>,
}

impl ItemLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the write lock for `item_id`, creating it on first use.
    ///
    /// The registry mutex is only held long enough to clone the per-item
    /// lock; the await happens outside it. Entries nobody holds or waits
    /// on (registry is the sole `Arc` owner) are evicted on the way in so
    /// the map does not grow with every item id ever touched.
    pub async fn acquire(&self, item_id: i64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().expect("item lock registry poisoned");
            map.retain(|_, lock| Arc::strong_count(lock) > 1);
            map.entry(item_id)
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    #[cfg(test)]
    fn registry_len(&self) -> usize {
        self.inner.lock().expect("item lock registry poisoned").len()
    }
}

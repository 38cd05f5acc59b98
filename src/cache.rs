use std::sync::{Arc, PoisonError, RwLock};

#[derive(Debug, Default)]
struct Slot {
    generation: u64,
    page: Option<Arc<str>>,
}

/// Cached rendering of the listing page.
///
/// Mutations call [`ListingCache::invalidate`]; the cache is never refilled
/// from that side, the next read renders from the store again.
#[derive(Debug, Default)]
pub struct ListingCache {
    slot: RwLock<Slot>,
}

impl ListingCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<Arc<str>> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .page
            .clone()
    }

    /// Generation to pass back to [`ListingCache::store`] once a render that
    /// starts now has finished.
    pub fn generation(&self) -> u64 {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .generation
    }

    /// Caches `page` unless an invalidation happened since `generation` was
    /// read. Returns whether the page was kept.
    pub fn store(&self, generation: u64, page: Arc<str>) -> bool {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        if slot.generation != generation {
            return false;
        }
        slot.page = Some(page);
        true
    }

    pub fn invalidate(&self) {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        slot.generation = slot.generation.wrapping_add(1);
        slot.page = None;
        tracing::debug!(generation = slot.generation, "listing view invalidated");
    }
}

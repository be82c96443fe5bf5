use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};

use crate::documents::OfferDescriptor;

/// In-memory descriptor cache keyed by offer id.
///
/// Every `clear()` starts a new generation. Writers capture the generation
/// before their first await and pass it back on insert, so results of work
/// started before a clear are never stored after it.
#[derive(Default)]
pub struct DescriptorCache {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    generation: u64,
    descriptors: HashMap<String, OfferDescriptor>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Seeded,
    Present,
    Stale,
}

impl DescriptorCache {
    pub fn new() -> Self {
        DescriptorCache::default()
    }

    pub fn generation(&self) -> u64 {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .generation
    }

    pub fn get(&self, offer_id: &str) -> Option<OfferDescriptor> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .descriptors
            .get(offer_id)
            .cloned()
    }

    pub fn contains(&self, offer_id: &str) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .descriptors
            .contains_key(offer_id)
    }

    pub fn offer_ids(&self) -> Vec<String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .descriptors
            .keys()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .descriptors
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stores `descriptor`, replacing any previous one for the same offer.
    /// Returns false without storing if the cache was cleared after
    /// `generation` was read.
    pub fn insert(&self, generation: u64, descriptor: OfferDescriptor) -> bool {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if inner.generation != generation {
            return false;
        }
        inner
            .descriptors
            .insert(descriptor.offer_id.clone(), descriptor);
        true
    }

    /// Stores `descriptor` only if no descriptor exists for its offer.
    pub fn seed(&self, generation: u64, descriptor: OfferDescriptor) -> SeedOutcome {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if inner.generation != generation {
            return SeedOutcome::Stale;
        }
        if inner.descriptors.contains_key(&descriptor.offer_id) {
            return SeedOutcome::Present;
        }
        inner
            .descriptors
            .insert(descriptor.offer_id.clone(), descriptor);
        SeedOutcome::Seeded
    }

    pub fn clear(&self) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.descriptors.clear();
        inner.generation += 1;
    }
}

//! Shared caches for descriptor loading
//!
//! Both caches are explicit services: whoever loads catalogs creates one and
//! passes it in, usually once per process or per compilation session.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use super::descriptor::{Checksum, TagHelperDescriptor};

const MIN_CLEANUP_THRESHOLD: usize = 64;

/// Weakly held string interner.
///
/// Descriptors repeat the same type, assembly and attribute names many times
/// over; interning makes them share one allocation. Entries do not keep their
/// strings alive. Dead entries are swept when the table doubles in size, so
/// the cost of cleanup is amortized over inserts.
#[derive(Debug)]
pub struct StringCache {
    entries: DashMap<Box<str>, Weak<str>>,
    cleanup_threshold: AtomicUsize,
    enabled: bool,
}

impl Default for StringCache {
    fn default() -> Self {
        Self::new()
    }
}

impl StringCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            cleanup_threshold: AtomicUsize::new(MIN_CLEANUP_THRESHOLD),
            enabled: true,
        }
    }

    /// A cache that never shares, for callers that want plain allocation
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::new()
        }
    }

    pub fn intern(&self, text: &str) -> Arc<str> {
        if !self.enabled {
            return Arc::from(text);
        }
        if let Some(existing) = self.entries.get(text).and_then(|entry| entry.upgrade()) {
            return existing;
        }

        let interned = match self.entries.entry(Box::from(text)) {
            Entry::Occupied(mut entry) => match entry.get().upgrade() {
                Some(existing) => existing,
                None => {
                    let fresh: Arc<str> = Arc::from(text);
                    entry.insert(Arc::downgrade(&fresh));
                    fresh
                }
            },
            Entry::Vacant(entry) => {
                let fresh: Arc<str> = Arc::from(text);
                entry.insert(Arc::downgrade(&fresh));
                fresh
            }
        };
        self.maybe_cleanup();
        interned
    }

    /// Number of entries, live or dead
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn maybe_cleanup(&self) {
        let threshold = self.cleanup_threshold.load(Ordering::Relaxed);
        if self.entries.len() < threshold {
            return;
        }
        self.entries.retain(|_, weak| weak.strong_count() > 0);
        let live = self.entries.len();
        self.cleanup_threshold
            .store((live * 2).max(MIN_CLEANUP_THRESHOLD), Ordering::Relaxed);
        tracing::trace!(live, "swept string cache");
    }
}

/// Descriptors keyed by checksum, so equal descriptors loaded from different
/// catalogs share one instance
#[derive(Debug, Default)]
pub struct DescriptorCache {
    entries: DashMap<Checksum, Arc<TagHelperDescriptor>>,
}

impl DescriptorCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, checksum: &Checksum) -> Option<Arc<TagHelperDescriptor>> {
        self.entries.get(checksum).map(|entry| entry.clone())
    }

    /// The cached descriptor equal to `descriptor`, inserting it when absent
    pub fn get_or_insert(&self, descriptor: TagHelperDescriptor) -> Arc<TagHelperDescriptor> {
        self.entries
            .entry(descriptor.checksum())
            .or_insert_with(|| Arc::new(descriptor))
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag_helpers::{TagHelperDescriptorBuilder, TagHelperKind};

    #[test]
    fn test_intern_shares_live_strings() {
        let cache = StringCache::new();
        let first = cache.intern("System.String");
        let second = cache.intern("System.String");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_dead_entries_are_replaced() {
        let cache = StringCache::new();
        drop(cache.intern("value"));
        let second = cache.intern("value");
        assert_eq!(&*second, "value");
        assert_eq!(Arc::strong_count(&second), 1);
        // the entry was reused, not duplicated
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_sweep_drops_dead_entries() {
        let cache = StringCache::new();
        for index in 0..MIN_CLEANUP_THRESHOLD {
            cache.intern(&format!("s{index}"));
        }
        // the insert that reached the threshold swept everything
        assert!(cache.len() < MIN_CLEANUP_THRESHOLD);
    }

    #[test]
    fn test_disabled_cache_never_shares() {
        let cache = StringCache::disabled();
        let first = cache.intern("a");
        let second = cache.intern("a");
        assert!(!Arc::ptr_eq(&first, &second));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_descriptor_cache_dedups_by_checksum() {
        let build = || {
            TagHelperDescriptorBuilder::new(TagHelperKind::TagHelper, "T.P", "T")
                .tag_matching_rule(|rule| {
                    rule.tag_name("p");
                })
                .build()
        };
        let cache = DescriptorCache::new();
        let first = cache.get_or_insert(build());
        let second = cache.get_or_insert(build());
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&first.checksum()).is_some());
    }
}

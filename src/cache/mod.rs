//! In-memory summary cache.
//!
//! Maps a log id to the summary text most recently fetched for it. The cache
//! is owned by a single review session and lives exactly as long as that
//! session: there is no TTL, no size bound and no persistence. Entries are
//! only removed by [`SummaryCache::clear`].

use std::collections::HashMap;

/// Log id → previously fetched summary text.
#[derive(Debug, Default, Clone)]
pub struct SummaryCache {
    entries: HashMap<String, String>,
}

impl SummaryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the cached summary for a log id.
    pub fn get(&self, log_id: &str) -> Option<&str> {
        self.entries.get(log_id).map(String::as_str)
    }

    /// Store a summary, replacing any previous value for the same id.
    pub fn set(&mut self, log_id: impl Into<String>, summary: impl Into<String>) {
        self.entries.insert(log_id.into(), summary.into());
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn contains(&self, log_id: &str) -> bool {
        self.entries.contains_key(log_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_returns_value_after_set() {
        let mut cache = SummaryCache::new();
        cache.set("LOG-1", "page loaded");
        assert_eq!(cache.get("LOG-1"), Some("page loaded"));
        assert!(cache.contains("LOG-1"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn missing_key_is_absent() {
        let cache = SummaryCache::new();
        assert_eq!(cache.get("LOG-404"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn set_overwrites_existing_entry() {
        let mut cache = SummaryCache::new();
        cache.set("LOG-1", "first");
        cache.set("LOG-1", "second");
        assert_eq!(cache.get("LOG-1"), Some("second"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn clear_removes_all_entries() {
        let mut cache = SummaryCache::new();
        cache.set("LOG-1", "a");
        cache.set("LOG-2", "b");
        cache.clear();
        assert_eq!(cache.get("LOG-1"), None);
        assert_eq!(cache.get("LOG-2"), None);
        assert!(cache.is_empty());
    }
}

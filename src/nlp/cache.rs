// Process-wide TTL cache of extracted entities, keyed by text hash
use crate::registry::Label;
use crate::utils::hash_text;
use moka::sync::Cache;
use std::time::Duration;

pub type EntityList = Vec<(String, Label)>;

pub struct EntityCache {
    entries: Cache<String, EntityList>,
}

impl EntityCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        let entries = Cache::builder()
            .time_to_live(ttl)
            .max_capacity(capacity.max(1) as u64)
            .build();
        Self { entries }
    }

    pub fn get(&self, text: &str) -> Option<EntityList> {
        self.entries.get(&hash_text(text))
    }

    pub fn put(&self, text: &str, entities: EntityList) {
        self.entries.insert(hash_text(text), entities);
    }

    /// Entry count after pending evictions have run.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.run_pending_tasks();
        self.entries.entry_count() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_stored_entities() {
        let cache = EntityCache::new(Duration::from_secs(60), 10);
        cache.put("Hape Kugelbahn", vec![("Hape".into(), Label::Company)]);
        assert_eq!(cache.get("Hape Kugelbahn"), Some(vec![("Hape".into(), Label::Company)]));
        assert_eq!(cache.get("other"), None);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn expired_entries_are_dropped() {
        let cache = EntityCache::new(Duration::from_millis(1), 10);
        cache.put("Tisch", vec![]);
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(cache.get("Tisch"), None);
    }

    #[test]
    fn stays_within_capacity() {
        let cache = EntityCache::new(Duration::from_secs(60), 2);
        for text in ["a", "b", "c", "d"] {
            cache.put(text, vec![]);
        }
        assert!(cache.len() <= 2);
    }
}

use std::{
    collections::{HashMap, HashSet},
    num::NonZeroUsize,
    sync::Mutex,
};

use indy_api_types::domain::wallet::{CacheConfig, CachingAlgorithm};

use crate::{
    cache::{cache::Cache, lru::LruCache},
    storage::{StorageRecord, Tag, TagName},
    wallet::EncryptedValue,
    RecordOptions,
};

#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub struct WalletCacheKey {
    type_: Vec<u8>,
    id: Vec<u8>,
}

#[derive(Clone, Debug)]
pub struct WalletCacheValue {
    value: EncryptedValue,
    tags: Vec<Tag>,
}

/// Read-through cache of encrypted records for the configured types.
///
/// A poisoned lock disables the cache for that call; storage stays the
/// source of truth.
pub struct WalletCache {
    cache: Option<Mutex<Box<dyn Cache + Send>>>,
    cache_entities: HashSet<String>,
}

impl WalletCache {
    pub fn new(config: Option<CacheConfig>) -> Self {
        match config {
            Some(cache_config) if !cache_config.entities.is_empty() => {
                let cache: Box<dyn Cache + Send> = match cache_config.algorithm {
                    CachingAlgorithm::LRU => Box::new(LruCache::new(
                        NonZeroUsize::new(cache_config.size).unwrap_or(NonZeroUsize::MIN),
                    )),
                };

                WalletCache {
                    cache: Some(Mutex::new(cache)),
                    cache_entities: HashSet::from_iter(cache_config.entities.iter().cloned()),
                }
            }
            _ => WalletCache {
                cache: None,
                cache_entities: HashSet::new(),
            },
        }
    }

    pub fn is_type_cacheable(&self, type_: &str) -> bool {
        self.cache.is_some() && self.cache_entities.contains(type_)
    }

    fn with_cache<R>(&self, type_: &str, f: impl FnOnce(&mut Box<dyn Cache + Send>) -> R) -> Option<R> {
        if !self.is_type_cacheable(type_) {
            return None;
        }

        let cache = self.cache.as_ref()?;
        let mut guard = cache.lock().ok()?;
        Some(f(&mut guard))
    }

    pub fn add(
        &self,
        type_: &str,
        etype: &[u8],
        eid: &[u8],
        evalue: &EncryptedValue,
        etags: &[Tag],
    ) {
        self.with_cache(type_, |cache| {
            let key = WalletCacheKey {
                type_: etype.to_owned(),
                id: eid.to_owned(),
            };
            let value = WalletCacheValue {
                value: evalue.to_owned(),
                tags: etags.to_owned(),
            };
            cache.put(key, value);
        });
    }

    pub fn add_tags(&self, type_: &str, etype: &[u8], eid: &[u8], etags: &[Tag]) {
        self.with_cache(type_, |cache| {
            let key = WalletCacheKey {
                type_: etype.to_owned(),
                id: eid.to_owned(),
            };

            if let Some(cached) = cache.get_mut(&key) {
                let mut merged: HashMap<Vec<u8>, Tag> = cached
                    .tags
                    .drain(..)
                    .map(|tag| (_tag_name(&tag).to_owned(), tag))
                    .collect();

                for tag in etags {
                    merged.insert(_tag_name(tag).to_owned(), tag.clone());
                }

                cached.tags = merged.into_values().collect();
            }
        });
    }

    pub fn update_tags(&self, type_: &str, etype: &[u8], eid: &[u8], etags: &[Tag]) {
        self.with_cache(type_, |cache| {
            let key = WalletCacheKey {
                type_: etype.to_owned(),
                id: eid.to_owned(),
            };

            if let Some(cached) = cache.get_mut(&key) {
                cached.tags = etags.to_vec();
            }
        });
    }

    pub fn delete_tags(&self, type_: &str, etype: &[u8], eid: &[u8], etag_names: &[TagName]) {
        self.with_cache(type_, |cache| {
            let key = WalletCacheKey {
                type_: etype.to_owned(),
                id: eid.to_owned(),
            };

            if let Some(cached) = cache.get_mut(&key) {
                cached.tags.retain(|tag| {
                    !etag_names.iter().any(|name| match (name, tag) {
                        (TagName::OfEncrypted(name), Tag::Encrypted(tag_name, _)) => {
                            name == tag_name
                        }
                        (TagName::OfPlain(name), Tag::PlainText(tag_name, _)) => name == tag_name,
                        _ => false,
                    })
                });
            }
        });
    }

    pub fn update(&self, type_: &str, etype: &[u8], eid: &[u8], evalue: &EncryptedValue) {
        self.with_cache(type_, |cache| {
            let key = WalletCacheKey {
                type_: etype.to_owned(),
                id: eid.to_owned(),
            };

            if let Some(cached) = cache.get_mut(&key) {
                cached.value = evalue.to_owned();
            }
        });
    }

    pub fn get(
        &self,
        type_: &str,
        etype: &[u8],
        eid: &[u8],
        options: &RecordOptions,
    ) -> Option<StorageRecord> {
        self.with_cache(type_, |cache| {
            let key = WalletCacheKey {
                type_: etype.to_owned(),
                id: eid.to_owned(),
            };

            cache.get(&key).map(|cached| StorageRecord {
                id: eid.to_owned(),
                value: if options.retrieve_value {
                    Some(cached.value.clone())
                } else {
                    None
                },
                type_: if options.retrieve_type {
                    Some(etype.to_owned())
                } else {
                    None
                },
                tags: if options.retrieve_tags {
                    Some(cached.tags.clone())
                } else {
                    None
                },
            })
        })
        .flatten()
    }

    pub fn delete(&self, type_: &str, etype: &[u8], eid: &[u8]) {
        self.with_cache(type_, |cache| {
            let key = WalletCacheKey {
                type_: etype.to_owned(),
                id: eid.to_owned(),
            };
            cache.pop(&key);
        });
    }

    pub fn get_capacity(&self) -> usize {
        match self.cache.as_ref().and_then(|cache| cache.lock().ok()) {
            Some(cache) => cache.cap(),
            None => 0,
        }
    }

    pub fn get_size(&self) -> usize {
        match self.cache.as_ref().and_then(|cache| cache.lock().ok()) {
            Some(cache) => cache.len(),
            None => 0,
        }
    }
}

fn _tag_name(tag: &Tag) -> &[u8] {
    match tag {
        Tag::Encrypted(name, _) | Tag::PlainText(name, _) => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn _config(size: usize) -> Option<CacheConfig> {
        Some(CacheConfig {
            size,
            entities: vec!["Indy::Did".to_string()],
            algorithm: CachingAlgorithm::LRU,
        })
    }

    fn _value(byte: u8) -> EncryptedValue {
        EncryptedValue::new(vec![byte], vec![byte])
    }

    #[test]
    fn only_configured_types_are_cached() {
        let cache = WalletCache::new(_config(2));

        cache.add("Indy::Key", b"k", b"1", &_value(1), &[]);
        cache.add("Indy::Did", b"d", b"1", &_value(1), &[]);

        assert!(cache
            .get("Indy::Key", b"k", b"1", &RecordOptions::full())
            .is_none());
        assert!(cache
            .get("Indy::Did", b"d", b"1", &RecordOptions::full())
            .is_some());
        assert_eq!(cache.get_size(), 1);
    }

    #[test]
    fn disabled_without_config() {
        let cache = WalletCache::new(None);
        assert!(!cache.is_type_cacheable("Indy::Did"));
        assert_eq!(cache.get_capacity(), 0);
    }

    #[test]
    fn least_recently_used_is_evicted() {
        let cache = WalletCache::new(_config(2));

        cache.add("Indy::Did", b"d", b"1", &_value(1), &[]);
        cache.add("Indy::Did", b"d", b"2", &_value(2), &[]);
        cache.get("Indy::Did", b"d", b"1", &RecordOptions::id());
        cache.add("Indy::Did", b"d", b"3", &_value(3), &[]);

        assert!(cache
            .get("Indy::Did", b"d", b"2", &RecordOptions::id())
            .is_none());
        assert!(cache
            .get("Indy::Did", b"d", b"1", &RecordOptions::id())
            .is_some());
        assert_eq!(cache.get_capacity(), 2);
    }

    #[test]
    fn tag_changes_are_mirrored() {
        let cache = WalletCache::new(_config(2));
        cache.add(
            "Indy::Did",
            b"d",
            b"1",
            &_value(1),
            &[Tag::PlainText(vec![1], "a".to_string())],
        );

        cache.add_tags(
            "Indy::Did",
            b"d",
            b"1",
            &[
                Tag::PlainText(vec![1], "b".to_string()),
                Tag::Encrypted(vec![2], vec![3]),
            ],
        );
        let tags = cache
            .get("Indy::Did", b"d", b"1", &RecordOptions::full())
            .and_then(|record| record.tags)
            .unwrap();
        assert_eq!(tags.len(), 2);
        assert!(tags.contains(&Tag::PlainText(vec![1], "b".to_string())));

        cache.delete_tags("Indy::Did", b"d", b"1", &[TagName::OfEncrypted(vec![2])]);
        let tags = cache
            .get("Indy::Did", b"d", b"1", &RecordOptions::full())
            .and_then(|record| record.tags)
            .unwrap();
        assert_eq!(tags, vec![Tag::PlainText(vec![1], "b".to_string())]);

        cache.delete("Indy::Did", b"d", b"1");
        assert_eq!(cache.get_size(), 0);
    }
}

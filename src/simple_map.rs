//! Key → primitive map node (§4.4).
//!
//! Generic over the key kind (`i64` or `String`, via [`MapKey`]) and the value
//! type descriptor (via [`ValueType`]), replacing the source's separately
//! generated `intSimpleMap`/`stringSimpleMap` pair with a single type.

use std::collections::{BTreeMap, BTreeSet};
use std::marker::PhantomData;

use serde_json::{Map, Value as Json};
use tracing::{trace, warn};

use crate::error::Result;
use crate::map_key::MapKey;
use crate::node::Node;
use crate::path::Path;
use crate::updates::Updates;
use crate::value::{DocValue, SyncValue, ValueType};

/// A map from key to primitive value, with per-key dirty/tombstone tracking.
///
/// Occupies a fixed position in its owning tree for its whole lifetime (it is
/// never relocated the way an object-map *value* can be), so it caches its
/// absolute path at construction rather than holding a parent back-reference.
#[derive(Debug, Clone)]
pub struct SimpleMap<K: MapKey, VT: ValueType> {
    xpath: Path,
    data: BTreeMap<K, VT::Native>,
    updated_keys: BTreeSet<K>,
    removed_keys: BTreeSet<K>,
    _value_type: PhantomData<VT>,
}

impl<K: MapKey, VT: ValueType> SimpleMap<K, VT> {
    /// Constructs an empty map whose absolute path is `xpath`.
    pub fn new(xpath: Path) -> Self {
        SimpleMap {
            xpath,
            data: BTreeMap::new(),
            updated_keys: BTreeSet::new(),
            removed_keys: BTreeSet::new(),
            _value_type: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The currently-present keys, freshly collected (no preallocation artifacts;
    /// see §9's note on the source's `Keys()` bug).
    pub fn keys(&self) -> Vec<K> {
        self.data.keys().cloned().collect()
    }

    pub fn get(&self, key: &K) -> Option<&VT::Native> {
        self.data.get(key)
    }

    /// Inserts or overwrites `key`. Returns the previous value, if any.
    pub fn put(&mut self, key: K, value: VT::Native) -> Option<VT::Native> {
        if let Some(old) = self.data.get(&key) {
            if *old == value {
                return Some(old.clone());
            }
            let old = self.data.insert(key.clone(), value);
            self.updated_keys.insert(key);
            return old;
        }
        self.data.insert(key.clone(), value);
        self.updated_keys.insert(key.clone());
        self.removed_keys.remove(&key);
        None
    }

    /// Removes `key`. Returns `true` if it was present.
    pub fn remove(&mut self, key: &K) -> bool {
        if self.data.remove(key).is_some() {
            self.updated_keys.remove(key);
            self.removed_keys.insert(key.clone());
            true
        } else {
            false
        }
    }

    /// Removes every key, marking them all as deletions.
    pub fn clear(&mut self) {
        self.updated_keys.clear();
        for key in self.data.keys() {
            self.removed_keys.insert(key.clone());
        }
        self.data.clear();
    }

    /// Replaces all data from a document, skipping entries whose key fails to
    /// parse (e.g. a non-base-10 key in an integer-keyed map) and leaving the
    /// map clean afterward.
    pub fn load_document(&mut self, doc: &Map<String, Json>) -> Result<()> {
        self.reset();
        self.data.clear();
        for (segment, raw) in doc {
            let Some(key) = K::parse(segment) else {
                warn!(segment, xpath = %self.xpath, "skipping unparseable map key on document load");
                continue;
            };
            let value = VT::parse_from_document(raw)?;
            self.data.insert(key, value);
        }
        Ok(())
    }

    /// Symmetric to [`Self::load_document`] for client-sent JSON.
    pub fn load_parsed_json(&mut self, any: &Json) -> Result<()> {
        self.reset();
        self.data.clear();
        let Json::Object(obj) = any else {
            return Ok(());
        };
        for (segment, raw) in obj {
            let Some(key) = K::parse(segment) else {
                warn!(segment, xpath = %self.xpath, "skipping unparseable map key on json load");
                continue;
            };
            let value = VT::parse_from_json(raw)?;
            self.data.insert(key, value);
        }
        Ok(())
    }

    /// Only the dirty keys, client-sync shaped.
    pub fn to_sync(&self) -> SyncValue {
        let mut out = Map::new();
        for key in &self.updated_keys {
            if let Some(v) = self.data.get(key) {
                out.insert(key.segment(), VT::to_sync_value(v));
            }
        }
        Json::Object(out)
    }

    /// Only the removed keys, mapped to the client-facing sentinel `1`.
    pub fn to_delete(&self) -> SyncValue {
        let mut out = Map::new();
        for key in &self.removed_keys {
            out.insert(key.segment(), Json::from(1));
        }
        Json::Object(out)
    }
}

impl<K: MapKey, VT: ValueType> Node for SimpleMap<K, VT> {
    fn xpath(&self) -> Path {
        self.xpath.clone()
    }

    fn any_updated(&self) -> bool {
        !self.updated_keys.is_empty() || self.any_deleted()
    }

    fn any_deleted(&self) -> bool {
        !self.removed_keys.is_empty()
    }

    fn reset(&mut self) {
        self.updated_keys.clear();
        self.removed_keys.clear();
    }

    fn to_document_value(&self) -> DocValue {
        let mut out = Map::new();
        for (k, v) in &self.data {
            out.insert(k.segment(), VT::to_document_value(v));
        }
        Json::Object(out)
    }

    fn append_updates(&self, updates: &mut Updates) {
        for key in &self.updated_keys {
            if let Some(v) = self.data.get(key) {
                trace!(xpath = %self.xpath, key = %key.segment(), "emitting simple map $set");
                updates.set(self.xpath.resolve(key.segment()).value(), VT::to_document_value(v));
            }
        }
        for key in &self.removed_keys {
            updates.unset(self.xpath.resolve(key.segment()).value());
        }
    }
}

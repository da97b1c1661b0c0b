//! Key → object-node map, with child rebinding between owning maps (§4.5, §9).
//!
//! Values are shared (`Rc<RefCell<V>>`) so that a handle returned by `get`/`put`
//! can be mutated directly and have the owning map observe the change through
//! [`MapValueBase::notify_updated`], mirroring how callers hold onto a fixture
//! like `Equipment` and call its setters directly in the scenario tests.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::{Rc, Weak};

use serde_json::{Map, Value as Json};
use tracing::{trace, warn};

use crate::error::Result;
use crate::map_key::MapKey;
use crate::node::Node;
use crate::path::Path;
use crate::updates::Updates;
use crate::value::{DocValue, SyncValue};

/// Back-reference and key held by every map value, enabling §9's rebind
/// strategy: a `Weak` pointer that simply upgrades to `None` once unbound,
/// rather than a raw reference that could dangle.
#[derive(Debug)]
pub struct MapValueBase<K: MapKey, V> {
    owner: Weak<RefCell<ObjectMapState<K, V>>>,
    key: Option<K>,
    fully_updated: bool,
}

impl<K: MapKey, V> Default for MapValueBase<K, V> {
    fn default() -> Self {
        MapValueBase {
            owner: Weak::new(),
            key: None,
            fully_updated: false,
        }
    }
}

impl<K: MapKey, V> Clone for MapValueBase<K, V> {
    fn clone(&self) -> Self {
        MapValueBase {
            owner: self.owner.clone(),
            key: self.key.clone(),
            fully_updated: self.fully_updated,
        }
    }
}

impl<K: MapKey, V> MapValueBase<K, V> {
    /// This value's absolute path: the owning map's path resolved by this
    /// value's key, or the root path if currently unbound.
    pub fn xpath(&self) -> Path {
        match (self.owner.upgrade(), &self.key) {
            (Some(owner), Some(key)) => owner.borrow().xpath.resolve(key.segment()),
            _ => Path::root(),
        }
    }

    pub fn key(&self) -> Option<&K> {
        self.key.as_ref()
    }

    pub fn fully_updated(&self) -> bool {
        self.fully_updated
    }

    pub fn set_fully_updated(&mut self, flag: bool) {
        self.fully_updated = flag;
    }

    fn bind(&mut self, owner: Weak<RefCell<ObjectMapState<K, V>>>, key: K) {
        self.owner = owner;
        self.key = Some(key);
    }

    fn unbind(&mut self) {
        self.owner = Weak::new();
        self.key = None;
    }

    /// The map state currently owning this value, if any and still alive.
    fn owner_state(&self) -> Option<Rc<RefCell<ObjectMapState<K, V>>>> {
        self.owner.upgrade()
    }

    /// Notifies the owning map that a field changed in place (§4.5
    /// "Child-signaled updates"), without touching the fully-updated flag.
    pub fn notify_updated(&self) {
        if let (Some(owner), Some(key)) = (self.owner.upgrade(), &self.key) {
            owner.borrow_mut().mark_updated(key);
        }
    }
}

/// A node that can live inside an [`ObjectMap`] as a value.
pub trait MapValueNode<K: MapKey>: Node + Default + Sized {
    fn base(&self) -> &MapValueBase<K, Self>;
    fn base_mut(&mut self) -> &mut MapValueBase<K, Self>;

    /// Replaces state from a document sub-object, leaving the value clean.
    fn load_document_value(&mut self, doc: &Map<String, Json>) -> Result<()>;

    /// Replaces state from a client-sent JSON sub-object, leaving the value clean.
    fn load_parsed_json_value(&mut self, v: &Json) -> Result<()>;

    /// Client-facing sync form; a fully-updated value renders its complete
    /// state (mirroring the source's `if FullyUpdate() { return self }`).
    fn to_sync(&self) -> SyncValue;

    /// Client-facing delete form.
    fn to_delete(&self) -> SyncValue;
}

#[derive(Debug)]
struct ObjectMapState<K: MapKey, V> {
    xpath: Path,
    data: BTreeMap<K, Rc<RefCell<V>>>,
    updated_keys: BTreeSet<K>,
    removed_keys: BTreeSet<K>,
}

impl<K: MapKey, V> ObjectMapState<K, V> {
    /// Records an in-place field edit on the value at `key` (§4.5 "Child-signaled
    /// updates"). A no-op if `key` isn't actually present, which can happen if a
    /// value keeps notifying after it was removed from this map.
    fn mark_updated(&mut self, key: &K) {
        if self.data.contains_key(key) {
            self.updated_keys.insert(key.clone());
        }
    }
}

/// A map from key to object-node value (§4.5).
#[derive(Debug)]
pub struct ObjectMap<K: MapKey, V: MapValueNode<K>> {
    inner: Rc<RefCell<ObjectMapState<K, V>>>,
}

impl<K: MapKey, V: MapValueNode<K>> Clone for ObjectMap<K, V> {
    fn clone(&self) -> Self {
        ObjectMap {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<K: MapKey, V: MapValueNode<K>> ObjectMap<K, V> {
    pub fn new(xpath: Path) -> Self {
        ObjectMap {
            inner: Rc::new(RefCell::new(ObjectMapState {
                xpath,
                data: BTreeMap::new(),
                updated_keys: BTreeSet::new(),
                removed_keys: BTreeSet::new(),
            })),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().data.is_empty()
    }

    pub fn keys(&self) -> Vec<K> {
        self.inner.borrow().data.keys().cloned().collect()
    }

    pub fn get(&self, key: &K) -> Option<Rc<RefCell<V>>> {
        self.inner.borrow().data.get(key).cloned()
    }

    /// Inserts `value` at `key`, binding it to this map. If `key` already holds
    /// a *different* value instance, the old one is unbound first; if it holds
    /// the *same* instance, this is a no-op (§4.5). If `value` is currently
    /// owned by a *different* map (or a different key of this same map), it is
    /// detached from there first (a map-value node has at most one owner at
    /// any instant, invariant 4; Scenario F), and the old owner's path is
    /// marked as a removal, since that's now stale from a persistence
    /// standpoint.
    pub fn put(&self, key: K, value: Rc<RefCell<V>>) -> Option<Rc<RefCell<V>>> {
        let weak_self = Rc::downgrade(&self.inner);
        let existing = self.inner.borrow().data.get(&key).cloned();
        if let Some(existing) = &existing {
            if Rc::ptr_eq(existing, &value) {
                return Some(Rc::clone(existing));
            }
        }

        self.detach_from_prior_owner(&value, &key);

        if let Some(existing) = existing {
            {
                let mut state = self.inner.borrow_mut();
                state.data.insert(key.clone(), Rc::clone(&value));
                state.updated_keys.insert(key.clone());
            }
            existing.borrow_mut().base_mut().unbind();
            value.borrow_mut().base_mut().bind(weak_self, key.clone());
            value.borrow_mut().base_mut().set_fully_updated(true);
            trace!(key = %key.segment(), "object map replaced value instance");
            return Some(existing);
        }
        {
            let mut state = self.inner.borrow_mut();
            state.data.insert(key.clone(), Rc::clone(&value));
            state.updated_keys.insert(key.clone());
            state.removed_keys.remove(&key);
        }
        value.borrow_mut().base_mut().bind(weak_self, key);
        value.borrow_mut().base_mut().set_fully_updated(true);
        None
    }

    /// If `value` currently lives in some map other than `(self, key)`, removes
    /// it from that map's data and marks that map's old key as a deletion.
    /// No-op if the value is unbound, or already sits at exactly `(self, key)`
    /// (the same-instance replace path above handles that case itself).
    fn detach_from_prior_owner(&self, value: &Rc<RefCell<V>>, key: &K) {
        let (prior_owner, prior_key) = {
            let v = value.borrow();
            let base = v.base();
            (base.owner_state(), base.key().cloned())
        };
        let (Some(prior_owner), Some(prior_key)) = (prior_owner, prior_key) else {
            return;
        };
        if Rc::ptr_eq(&prior_owner, &self.inner) && prior_key == *key {
            return;
        }
        let mut state = prior_owner.borrow_mut();
        if let Some(still_there) = state.data.get(&prior_key) {
            if Rc::ptr_eq(still_there, value) {
                state.data.remove(&prior_key);
                state.updated_keys.remove(&prior_key);
                state.removed_keys.insert(prior_key);
            }
        }
    }

    /// Removes and unbinds the value at `key`. Returns `true` if present.
    pub fn remove(&self, key: &K) -> bool {
        let removed = {
            let mut state = self.inner.borrow_mut();
            let removed = state.data.remove(key);
            if removed.is_some() {
                state.updated_keys.remove(key);
                state.removed_keys.insert(key.clone());
            }
            removed
        };
        match removed {
            Some(value) => {
                value.borrow_mut().base_mut().unbind();
                true
            }
            None => false,
        }
    }

    /// Removes and unbinds every value.
    pub fn clear(&self) {
        let values: Vec<Rc<RefCell<V>>> = {
            let mut state = self.inner.borrow_mut();
            state.updated_keys.clear();
            for key in state.data.keys() {
                state.removed_keys.insert(key.clone());
            }
            let values = state.data.values().cloned().collect();
            state.data.clear();
            values
        };
        for value in values {
            value.borrow_mut().base_mut().unbind();
        }
    }

    /// Replaces all values from a document. Integer-keyed maps skip entries
    /// whose key fails to parse; every kind skips entries whose value is not a
    /// sub-document. Leaves the map clean afterward.
    pub fn load_document(&self, doc: &Map<String, Json>) -> Result<()> {
        self.clear_for_load();
        let mut fresh = Vec::new();
        for (segment, raw) in doc {
            let Some(key) = K::parse(segment) else {
                warn!(segment, "skipping unparseable object-map key on document load");
                continue;
            };
            let Json::Object(sub) = raw else {
                warn!(segment, "skipping object-map entry whose value is not a sub-document");
                continue;
            };
            let mut value = V::default();
            value.load_document_value(sub)?;
            fresh.push((key, Rc::new(RefCell::new(value))));
        }
        self.bind_fresh(fresh);
        Ok(())
    }

    /// Symmetric to [`Self::load_document`] for client-sent JSON.
    pub fn load_parsed_json(&self, any: &Json) -> Result<()> {
        self.clear_for_load();
        let Json::Object(obj) = any else {
            return Ok(());
        };
        let mut fresh = Vec::new();
        for (segment, raw) in obj {
            let Some(key) = K::parse(segment) else {
                warn!(segment, "skipping unparseable object-map key on json load");
                continue;
            };
            let mut value = V::default();
            value.load_parsed_json_value(raw)?;
            fresh.push((key, Rc::new(RefCell::new(value))));
        }
        self.bind_fresh(fresh);
        Ok(())
    }

    fn clear_for_load(&self) {
        let values: Vec<Rc<RefCell<V>>> = {
            let mut state = self.inner.borrow_mut();
            state.updated_keys.clear();
            state.removed_keys.clear();
            let values = state.data.values().cloned().collect();
            state.data.clear();
            values
        };
        for value in values {
            value.borrow_mut().base_mut().unbind();
        }
    }

    fn bind_fresh(&self, fresh: Vec<(K, Rc<RefCell<V>>)>) {
        let weak_self = Rc::downgrade(&self.inner);
        {
            let mut state = self.inner.borrow_mut();
            for (key, cell) in &fresh {
                state.data.insert(key.clone(), Rc::clone(cell));
            }
        }
        for (key, cell) in fresh {
            cell.borrow_mut().base_mut().bind(weak_self.clone(), key);
        }
    }

    /// Client-facing sync shape: only the dirty keys, each rendered via the
    /// value's own sync form.
    pub fn to_sync(&self) -> SyncValue {
        let state = self.inner.borrow();
        let mut out = Map::new();
        for key in &state.updated_keys {
            if let Some(v) = state.data.get(key) {
                out.insert(key.segment(), v.borrow().to_sync());
            }
        }
        Json::Object(out)
    }

    /// Client-facing delete shape: removed keys mapped to the sentinel `1`.
    pub fn to_delete(&self) -> SyncValue {
        let state = self.inner.borrow();
        let mut out = Map::new();
        for key in &state.removed_keys {
            out.insert(key.segment(), Json::from(1));
        }
        Json::Object(out)
    }
}

impl<K: MapKey, V: MapValueNode<K>> Node for ObjectMap<K, V> {
    fn xpath(&self) -> Path {
        self.inner.borrow().xpath.clone()
    }

    fn any_updated(&self) -> bool {
        !self.inner.borrow().updated_keys.is_empty() || self.any_deleted()
    }

    fn any_deleted(&self) -> bool {
        !self.inner.borrow().removed_keys.is_empty()
    }

    fn reset(&mut self) {
        let values: Vec<Rc<RefCell<V>>> = {
            let mut state = self.inner.borrow_mut();
            let values = state
                .updated_keys
                .iter()
                .filter_map(|k| state.data.get(k).cloned())
                .collect();
            state.updated_keys.clear();
            state.removed_keys.clear();
            values
        };
        for value in values {
            let mut v = value.borrow_mut();
            v.reset();
            v.base_mut().set_fully_updated(false);
        }
    }

    fn to_document_value(&self) -> DocValue {
        let state = self.inner.borrow();
        let mut out = Map::new();
        for (k, v) in &state.data {
            out.insert(k.segment(), v.borrow().to_document_value());
        }
        Json::Object(out)
    }

    fn append_updates(&self, updates: &mut Updates) {
        let state = self.inner.borrow();
        for key in &state.updated_keys {
            let Some(v) = state.data.get(key) else {
                continue;
            };
            let vb = v.borrow();
            if vb.base().fully_updated() {
                updates.set(vb.xpath().value(), vb.to_document_value());
            } else {
                vb.append_updates(updates);
            }
        }
        for key in &state.removed_keys {
            updates.unset(state.xpath.resolve(key.segment()).value());
        }
    }
}

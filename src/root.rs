//! The root of a tracked tree, and the three emission entry points (§4.6).
//!
//! A root is simply an object node whose [`crate::node::ObjectNodeBase`] was
//! constructed via [`crate::node::ObjectNodeBase::root`]. There is no
//! separate "root type" in this crate, since the concrete field set is
//! schema-defined (see the integration tests' `Player` fixture). What the
//! root *does* add over a plain embedded object is the pair of client-facing
//! emission shapes, captured here as the [`ClientSync`] trait, plus the three
//! free functions every schema's `to_update`/`to_sync`/`to_delete` wrappers
//! delegate to.

use serde_json::{Map, Value as Json};

use crate::node::Node;
use crate::updates::Updates;
use crate::value::SyncValue;

/// Additionally implemented by any object node that has client-facing sync
/// and delete shapes: in practice, the root, and any [`crate::object_map::MapValueNode`]
/// (which already carries these per §4.5's "rendered via its own sync form").
///
/// Unlike [`Node::append_updates`], which writes flat dot-notation paths into
/// a shared accumulator, these two produce a *nested* mapping keyed by the
/// schema's client-facing names (§6), and each only includes what's presently
/// dirty or deleted, mirroring how [`crate::simple_map::SimpleMap::to_sync`]
/// and [`crate::object_map::ObjectMap::to_sync`] already behave.
pub trait ClientSync: Node {
    fn to_sync(&self) -> SyncValue;
    fn to_delete(&self) -> SyncValue;
}

/// Produces the incremental update-operator document for a root node:
/// `append_updates` into a fresh accumulator if anything changed, otherwise
/// an empty accumulator (§4.6). [`Updates`] itself already guarantees that an
/// untouched accumulator never serializes an empty `$set`/`$unset` sub-map.
pub fn to_update<N: Node + ?Sized>(root: &N) -> Updates {
    let mut updates = Updates::new();
    if root.any_updated() {
        root.append_updates(&mut updates);
    }
    updates
}

/// Produces the client-sync delta for a root node: its nested, client-named
/// dirty shape if anything changed, otherwise an empty mapping (§4.6, §6).
pub fn to_sync<N: ClientSync + ?Sized>(root: &N) -> SyncValue {
    if root.any_updated() {
        root.to_sync()
    } else {
        Json::Object(Map::new())
    }
}

/// Produces the client-delete delta for a root node: its nested, client-named
/// deletion shape if anything was removed, otherwise an empty mapping.
pub fn to_delete<N: ClientSync + ?Sized>(root: &N) -> SyncValue {
    if root.any_deleted() {
        root.to_delete()
    } else {
        Json::Object(Map::new())
    }
}

/// Renders [`Node::to_document_value`] through `serde_json`, mirroring the
/// source's `*Json` convenience wrappers around its marshaller (§4.6).
pub fn to_document_json<N: Node + ?Sized>(root: &N) -> String {
    serde_json::to_string(&root.to_document_value()).expect("document values are always valid JSON")
}

/// Renders [`to_update`] through `serde_json`.
pub fn to_update_json<N: Node + ?Sized>(root: &N) -> String {
    serde_json::to_string(&to_update(root).into_json()).expect("update accumulators are always valid JSON")
}

/// Renders [`to_sync`] through `serde_json`.
pub fn to_sync_json<N: ClientSync + ?Sized>(root: &N) -> String {
    serde_json::to_string(&to_sync(root)).expect("sync shapes are always valid JSON")
}

/// Renders [`to_delete`] through `serde_json`.
pub fn to_delete_json<N: ClientSync + ?Sized>(root: &N) -> String {
    serde_json::to_string(&to_delete(root)).expect("delete shapes are always valid JSON")
}

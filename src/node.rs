//! The [`Node`] contract and a reusable base for fixed-position object nodes.
//!
//! "Fixed-position" means the node's place in the tree never changes after
//! construction (an embedded object field, an embedded simple/object map, or
//! the root itself). Such nodes cache their absolute [`Path`] once and never need
//! a parent back-reference: invariant 1 (`xpath(N) == parent(N).xpath().resolve(segment(N))`)
//! holds by construction rather than by runtime lookup. Map *values*, which can
//! be rebound between owning maps at runtime, use [`crate::object_map::MapValueBase`]
//! instead (see §9 of the design notes for why the two cases differ).

use serde_json::{Map, Value as Json};

use crate::dirty::DirtyBits;
use crate::error::Result;
use crate::path::Path;
use crate::updates::Updates;
use crate::value::{DocValue, ValueType};

/// The contract every node in the tree satisfies.
pub trait Node {
    /// This node's absolute path from the root.
    fn xpath(&self) -> Path;

    /// Does this node, or any descendant, have a pending write?
    fn any_updated(&self) -> bool;

    /// Does this node, or any descendant, have a pending deletion?
    fn any_deleted(&self) -> bool;

    /// Clears all change tracking in this node and its descendants.
    fn reset(&mut self);

    /// Renders this node's current state as a document value.
    fn to_document_value(&self) -> DocValue;

    /// Writes this node's pending changes into `updates`, using absolute paths.
    fn append_updates(&self, updates: &mut Updates);
}

/// Shared state for a node whose position in the tree is fixed for its entire
/// lifetime: a cached absolute path, and the dirty-field bitset (§9, "Dirty
/// tracking of object fields").
#[derive(Debug, Clone, Default)]
pub struct ObjectNodeBase {
    xpath: Path,
    dirty: DirtyBits,
}

impl ObjectNodeBase {
    /// Constructs the base for a node whose absolute path is `xpath` (e.g.
    /// `parent.xpath().resolve("wlt")` for an embedded wallet field).
    pub fn new(xpath: Path) -> Self {
        ObjectNodeBase {
            xpath,
            dirty: DirtyBits::new(),
        }
    }

    /// Constructs the base for the root object, whose path is always empty.
    pub fn root() -> Self {
        Self::new(Path::root())
    }

    pub fn xpath(&self) -> Path {
        self.xpath.clone()
    }

    pub fn dirty(&self) -> DirtyBits {
        self.dirty
    }

    pub fn dirty_mut(&mut self) -> &mut DirtyBits {
        &mut self.dirty
    }

    pub fn any_field_dirty(&self) -> bool {
        self.dirty.any_field()
    }

    pub fn fully_updated(&self) -> bool {
        self.dirty.fully_updated()
    }

    pub fn reset(&mut self) {
        self.dirty.clear_all();
    }
}

/// Extracts a field from an already-loaded document (strict: a present but
/// wrongly-typed value is a [`crate::error::Error::TypeMismatch`]; an absent
/// field falls back to `default`). Mirrors the source's per-type `IntValue`,
/// `StringValue`, etc., collapsed into one generic function via [`ValueType`].
pub fn document_field<VT: ValueType>(
    doc: &Map<String, Json>,
    field: &str,
    default: VT::Native,
) -> Result<VT::Native> {
    match doc.get(field) {
        None => Ok(default),
        Some(v) => VT::parse_from_document(v),
    }
}

/// Extracts a field from client-sent JSON (lenient: absent or `null` falls back
/// to `default` without error). Mirrors the source's `AnyIntValue`, `AnyStringValue`,
/// etc.
pub fn any_json_field<VT: ValueType>(v: Option<&Json>, default: VT::Native) -> Result<VT::Native> {
    match v {
        None => Ok(default),
        Some(inner) => VT::parse_from_json(inner),
    }
}

/// Extracts a sub-document (embedded object) field, or an empty map if absent.
pub fn embedded_document(doc: &Map<String, Json>, field: &str) -> Map<String, Json> {
    match doc.get(field) {
        Some(Json::Object(m)) => m.clone(),
        _ => Map::new(),
    }
}

/// Extracts a nullable field from an already-loaded document: absent or
/// explicit `null` loads as `None`, anything else is parsed strictly.
pub fn optional_document_field<VT: ValueType>(doc: &Map<String, Json>, field: &str) -> Result<Option<VT::Native>> {
    match doc.get(field) {
        None | Some(Json::Null) => Ok(None),
        Some(v) => VT::parse_from_document(v).map(Some),
    }
}

/// Emits a `$set` or `$unset` entry for a dirty `Option`-typed object field
/// (SPEC_FULL §4.7, exercised by Scenario D's `cash.set_cards(none)`): `$set`
/// when the field currently holds a value, `$unset` when it's `None`. Setters
/// on such fields must mark the field dirty on *every* write, including a
/// write of `None` over `Some` or vice versa (value-equality no-op detection
/// still applies between two `None`s or two equal `Some`s, same as any other
/// field).
pub fn append_optional_update(updates: &mut Updates, path: Path, value: Option<DocValue>) {
    match value {
        Some(v) => updates.set(path.value(), v),
        None => updates.unset(path.value()),
    }
}

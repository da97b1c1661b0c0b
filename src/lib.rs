//!
//! An in-memory document model with incremental change tracking. Applications
//! build a tree of typed nodes (object nodes, maps of primitives, maps of
//! objects), mutate it through typed setters, then ask the root to produce
//! one of four shapes:
//!
//! * a full document, for insert / full replace
//! * an incremental `{$set, $unset}` update-operator document, for persistence
//! * a client-sync delta, containing only what changed
//! * a client-delete delta, containing only what was removed
//!
//! ## Core Concepts
//!
//! * **[`Node`]**: the contract every tree member satisfies (path, dirty
//!   state, reset, and the three emission forms).
//! * **[`path::Path`]**: dot-notation addressing, shared cheaply via `Rc<str>`.
//! * **[`value::ValueType`]**: primitive conversion descriptors (integer,
//!   string, float, boolean, datetime, date).
//! * **[`simple_map::SimpleMap`]**: key → primitive, with per-key dirty and
//!   tombstone tracking.
//! * **[`object_map::ObjectMap`]**: key → object node, with the same tracking
//!   plus ownership rebinding between maps.
//! * **[`updates::Updates`]**: the `$set`/`$unset` accumulator produced by
//!   [`Node::append_updates`].
//! * **[`root::ClientSync`]** and the [`to_update`]/[`to_sync`]/[`to_delete`]
//!   free functions: the three emission entry points a root calls into.
//!
//! Concrete schemas (the equivalent of generated model types) are not part of
//! this crate's public surface; see the integration tests for worked examples
//! built on top of these primitives.

pub mod dirty;
pub mod error;
pub mod map_key;
pub mod node;
pub mod object_map;
pub mod path;
pub mod root;
pub mod simple_map;
pub mod updates;
pub mod value;

pub use dirty::DirtyBits;
pub use error::{Error, Result};
pub use map_key::MapKey;
pub use node::{Node, ObjectNodeBase};
pub use object_map::{MapValueBase, MapValueNode, ObjectMap};
pub use path::Path;
pub use root::{ClientSync, to_delete, to_delete_json, to_document_json, to_sync, to_sync_json, to_update, to_update_json};
pub use simple_map::SimpleMap;
pub use updates::Updates;
pub use value::{Boolean, DateTimeType, DateType, DocValue, Float, Integer, StringType, SyncValue, ValueType};

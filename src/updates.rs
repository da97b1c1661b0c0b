//! The `{$set, $unset}` update-operator accumulator (§4.6, §6).
//!
//! Sub-maps are created lazily: an `Updates` that nothing was ever written to
//! serializes to an empty JSON object, never to `{"$set": {}}`.

use serde_json::{Map, Value as Json};

use crate::value::DocValue;

/// The `$unset` sentinel value, pinned to the empty string per spec (§9
/// resolves the source's inconsistency between `""` and `1` in favor of `""`).
pub const UNSET_SENTINEL: &str = "";

/// Accumulates `$set`/`$unset` entries keyed by absolute dot-notation path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Updates {
    set: Option<Map<String, Json>>,
    unset: Option<Map<String, Json>>,
}

impl Updates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a `$set` entry at `path`.
    pub fn set(&mut self, path: impl Into<String>, value: DocValue) {
        self.set.get_or_insert_with(Map::new).insert(path.into(), value);
    }

    /// Records an `$unset` entry at `path`.
    pub fn unset(&mut self, path: impl Into<String>) {
        self.unset
            .get_or_insert_with(Map::new)
            .insert(path.into(), Json::from(UNSET_SENTINEL));
    }

    /// True if neither `$set` nor `$unset` has ever been written to.
    pub fn is_empty(&self) -> bool {
        self.set.is_none() && self.unset.is_none()
    }

    /// Renders the accumulator as `{"$set": {...}, "$unset": {...}}`, omitting
    /// whichever sub-map was never written to.
    pub fn into_json(self) -> Json {
        let mut out = Map::new();
        if let Some(set) = self.set {
            out.insert("$set".to_string(), Json::Object(set));
        }
        if let Some(unset) = self.unset {
            out.insert("$unset".to_string(), Json::Object(unset));
        }
        Json::Object(out)
    }
}

//! Generic key kind for [`crate::simple_map::SimpleMap`] and [`crate::object_map::ObjectMap`].
//!
//! The original source duplicates every map type for `int` and `string` keys.
//! This crate collapses that duplication into one generic map family parameterized
//! by `K: MapKey`, implemented here for `i64` and `String` (the only two key
//! kinds the spec calls for).

/// A key usable in the document model's maps.
///
/// `segment()` renders the key as the path segment / client-sync object key used
/// in every output shape; `parse()` is the inverse, used when loading a document
/// or client JSON payload. Integer keys that fail to parse as base-10 are skipped
/// by the caller (per §7), not reported as an error from `parse` itself.
pub trait MapKey: Clone + Eq + Ord + std::hash::Hash + std::fmt::Debug {
    /// Renders this key as it appears in a dot-notation path or JSON object key.
    fn segment(&self) -> String;

    /// Parses a key from its string form, or `None` if it isn't a valid key of
    /// this kind (e.g. a non-base-10 string for an integer-keyed map).
    fn parse(segment: &str) -> Option<Self>;
}

impl MapKey for i64 {
    fn segment(&self) -> String {
        self.to_string()
    }

    fn parse(segment: &str) -> Option<Self> {
        segment.parse().ok()
    }
}

impl MapKey for String {
    fn segment(&self) -> String {
        self.clone()
    }

    fn parse(segment: &str) -> Option<Self> {
        Some(segment.to_owned())
    }
}

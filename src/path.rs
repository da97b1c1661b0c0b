//! Dot-notation paths identifying a node's position within a tracked document tree.
//!
//! A [`Path`] is either the root path (empty) or a resolved path formed by joining
//! one or more segments with `.`. Resolving a root path with a name never produces
//! a leading dot: `Path::root().resolve("wlt")` is `"wlt"`, not `".wlt"`.

use std::fmt;
use std::rc::Rc;

/// An immutable, cheaply-clonable dot-notation path.
///
/// Cloning a `Path` only bumps a reference count; the underlying string is shared
/// between a path and every path it was `resolve`d from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Path(Option<Rc<str>>);

impl Path {
    /// The empty path identifying the root of the tree.
    pub fn root() -> Self {
        Path(None)
    }

    /// Constructs a path directly from a single segment name.
    pub fn of(segment: impl Into<String>) -> Self {
        Path(Some(Rc::from(segment.into())))
    }

    /// True iff this is the root path.
    pub fn is_root(&self) -> bool {
        self.0.is_none()
    }

    /// The string form of this path, `""` for the root.
    pub fn value(&self) -> &str {
        self.0.as_deref().unwrap_or("")
    }

    /// Appends a named segment, returning a new path.
    pub fn resolve(&self, name: impl AsRef<str>) -> Path {
        let name = name.as_ref();
        match &self.0 {
            None => Path::of(name.to_string()),
            Some(base) => Path(Some(Rc::from(format!("{base}.{name}")))),
        }
    }

    /// Appends a base-10 integer segment, as used for array/int-keyed-map indices.
    pub fn resolve_index(&self, index: i64) -> Path {
        self.resolve(index.to_string())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}

impl AsRef<str> for Path {
    fn as_ref(&self) -> &str {
        self.value()
    }
}

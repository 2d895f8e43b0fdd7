//! Content sources that can be dumped to bytes and relocated.
//!
//! # Variants
//!
//! | Variant      | Content                                   | `in_dir` effect            |
//! |--------------|-------------------------------------------|----------------------------|
//! | `Empty`      | nothing                                   | none                       |
//! | `Bytes`      | in-memory buffer                          | none                       |
//! | `File`       | read lazily from disk                     | relative path re-anchored  |
//! | `Collection` | ordered concatenation of children         | applied to every child     |
//! | `Altered`    | wrapped resource + alteration chain       | applied to wrapped resource|

mod altered;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{IoContext, Result};
use crate::path::rewrite_path;

pub use altered::{AlteredResource, alter_all};

/// A pure content transformation.
///
/// Implementations receive the resource by reference and must return a new
/// one; the input is never touched.
pub trait Alteration: Send + Sync {
    /// Short name used in logs and error messages.
    fn name(&self) -> &'static str {
        "alteration"
    }

    fn alter(&self, resource: &Resource) -> Result<Resource>;
}

impl<F> Alteration for F
where
    F: Fn(&Resource) -> Result<Resource> + Send + Sync,
{
    fn alter(&self, resource: &Resource) -> Result<Resource> {
        self(resource)
    }
}

/// Shared handle to an alteration, cheap to clone into rewritten assets.
pub type SharedAlteration = Arc<dyn Alteration>;

impl fmt::Debug for dyn Alteration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Anything with byte content that can be relocated under a base directory.
#[derive(Clone, Default)]
pub enum Resource {
    /// Placeholder content, dumps to nothing.
    #[default]
    Empty,
    Bytes(Vec<u8>),
    File(PathBuf),
    Collection(Vec<Resource>),
    Altered(AlteredResource),
}

impl Resource {
    pub fn empty() -> Self {
        Self::Empty
    }

    pub fn bytes(content: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(content.into())
    }

    pub fn string(content: impl Into<String>) -> Self {
        Self::Bytes(content.into().into_bytes())
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    pub fn collection(resources: impl IntoIterator<Item = Resource>) -> Self {
        Self::Collection(resources.into_iter().collect())
    }

    /// Wrap `resource` so that `alterations` run, in order, on every dump.
    pub fn altered(
        resource: Resource,
        alterations: impl IntoIterator<Item = SharedAlteration>,
    ) -> Self {
        Self::Altered(AlteredResource::new(resource, alterations))
    }

    /// Produce the current content.
    ///
    /// Files are read on each call; a collection fails on its first failing
    /// child and returns no partial output.
    pub fn dump(&self) -> Result<Vec<u8>> {
        match self {
            Self::Empty => Ok(Vec::new()),
            Self::Bytes(content) => Ok(content.clone()),
            Self::File(path) => fs::read(path).at(path),
            Self::Collection(children) => {
                let mut buf = Vec::new();
                for child in children {
                    buf.extend_from_slice(&child.dump()?);
                }
                Ok(buf)
            }
            Self::Altered(altered) => altered.dump(),
        }
    }

    /// Return a copy with every relative embedded path anchored under `base`.
    pub fn in_dir(&self, base: impl AsRef<Path>) -> Self {
        let base = base.as_ref();
        match self {
            Self::Empty => Self::Empty,
            Self::Bytes(content) => Self::Bytes(content.clone()),
            Self::File(path) => Self::File(rewrite_path(base, path)),
            Self::Collection(children) => {
                Self::Collection(children.iter().map(|child| child.in_dir(base)).collect())
            }
            Self::Altered(altered) => Self::Altered(altered.in_dir(base)),
        }
    }

    /// Path backing a `File` resource.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::File(path) => Some(path),
            _ => None,
        }
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("Empty"),
            Self::Bytes(content) => write!(f, "Bytes({} bytes)", content.len()),
            Self::File(path) => f.debug_tuple("File").field(path).finish(),
            Self::Collection(children) => f.debug_tuple("Collection").field(children).finish(),
            Self::Altered(altered) => fmt::Debug::fmt(altered, f),
        }
    }
}

impl From<&str> for Resource {
    fn from(content: &str) -> Self {
        Self::string(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_bytes_dump() {
        let b = Resource::bytes(b"test".to_vec());
        assert_eq!(b.dump().unwrap(), b"test");
        // Repeated dumps are identical
        assert_eq!(b.dump().unwrap(), b.dump().unwrap());
        assert_eq!(Resource::string("test2").dump().unwrap(), b"test2");
    }

    #[test]
    fn test_bytes_in_dir_is_identity() {
        let b = Resource::string("test");
        let moved = b.in_dir("whatever");
        assert_eq!(moved.dump().unwrap(), b"test");
        assert!(moved.path().is_none());
    }

    #[test]
    fn test_empty() {
        assert!(Resource::empty().dump().unwrap().is_empty());
        assert!(Resource::empty().in_dir("/base").dump().unwrap().is_empty());
    }

    #[test]
    fn test_file_dump() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("file.txt");
        fs::write(&path, "file").unwrap();

        let f = Resource::file(&path);
        assert_eq!(f.dump().unwrap(), b"file");
    }

    #[test]
    fn test_file_dump_missing() {
        let err = Resource::file("/nonexistent/statix/file").dump().unwrap_err();
        assert!(err.to_string().contains("/nonexistent/statix/file"));
    }

    #[test]
    fn test_file_in_dir() {
        let f = Resource::file("file/path");
        let moved = f.in_dir("base");
        assert_eq!(moved.path(), Some(Path::new("base/file/path")));
        // Receiver untouched
        assert_eq!(f.path(), Some(Path::new("file/path")));

        let abs = Resource::file("/abs//path");
        assert_eq!(abs.in_dir("base").path(), Some(Path::new("/abs/path")));
    }

    #[test]
    fn test_collection_dump_nested() {
        let c1 = Resource::collection([Resource::string("string1"), Resource::string("string2")]);
        let c2 = Resource::collection([c1, Resource::string("string3")]);
        let flat = Resource::collection([
            Resource::string("string1"),
            Resource::string("string2"),
            Resource::string("string3"),
        ]);
        assert_eq!(c2.dump().unwrap(), b"string1string2string3");
        assert_eq!(c2.dump().unwrap(), flat.dump().unwrap());
    }

    #[test]
    fn test_collection_fails_on_child() {
        let c = Resource::collection([
            Resource::string("ok"),
            Resource::file("/nonexistent/statix/child"),
        ]);
        assert!(c.dump().is_err());
    }

    #[test]
    fn test_collection_in_dir() {
        let c = Resource::collection([Resource::file("file/path"), Resource::string("x")]);
        let moved = c.in_dir("base");

        let Resource::Collection(children) = &moved else {
            panic!("expected a collection");
        };
        assert_eq!(children[0].path(), Some(Path::new("base/file/path")));

        let Resource::Collection(original) = &c else {
            panic!("expected a collection");
        };
        assert_eq!(original[0].path(), Some(Path::new("file/path")));
    }
}

//! Publishable units: a single resource or a directory-scanned pack.
//!
//! Every asset is an immutable description. [`Asset::rewrite_paths`] returns
//! a fresh copy anchored under build-time base directories, and
//! [`Asset::dump`] only has filesystem side effects.

mod pack;
mod single;

use std::borrow::Cow;
use std::path::Path;

use crate::dumper::Dumper;
use crate::error::Result;
use crate::manager::Filter;
use crate::path::{add_file_suffix, md5_hex};
use crate::resource::Resource;

pub use pack::AssetPack;
pub use single::SingleAsset;

/// A named entry of the [`Manager`](crate::Manager).
#[derive(Debug, Clone)]
pub enum Asset {
    Single(SingleAsset),
    Pack(AssetPack),
}

impl Asset {
    /// Anchor relative input/output paths under `input` and `output`.
    pub fn rewrite_paths(&self, input: &Path, output: &Path) -> Self {
        match self {
            Self::Single(single) => Self::Single(single.rewrite_paths(input, output)),
            Self::Pack(pack) => Self::Pack(pack.rewrite_paths(input, output)),
        }
    }

    /// Publish the asset, returning the number of artifacts written.
    pub fn dump(&self, filters: &[Filter]) -> Result<usize> {
        match self {
            Self::Single(single) => single.dump(filters),
            Self::Pack(pack) => pack.dump(filters),
        }
    }
}

impl From<SingleAsset> for Asset {
    fn from(asset: SingleAsset) -> Self {
        Self::Single(asset)
    }
}

impl From<AssetPack> for Asset {
    fn from(asset: AssetPack) -> Self {
        Self::Pack(asset)
    }
}

/// Apply every filter whose pattern matches `output`, in declared order.
fn apply_filters<'a>(
    resource: &'a Resource,
    output: &Path,
    filters: &[Filter],
) -> Result<Cow<'a, Resource>> {
    let output = output.to_string_lossy();
    let mut current = Cow::Borrowed(resource);
    for filter in filters.iter().filter(|f| f.pattern.matches(&output)) {
        current = Cow::Owned(filter.alteration.alter(&current)?);
    }
    Ok(current)
}

/// Suffix inserted before the extension of a content-addressed artifact.
fn hash_suffix(content: &[u8]) -> String {
    format!(".{}", md5_hex(content))
}

/// Hash `content` and hand it to `dumper` under `stable` and its hashed sibling.
fn publish(dumper: &dyn Dumper, stable: &Path, content: &[u8]) -> Result<()> {
    let hashed = add_file_suffix(stable, &hash_suffix(content));
    dumper.dump(&hashed, stable, content)
}

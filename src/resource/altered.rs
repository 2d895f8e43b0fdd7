//! Resources wrapped in an alteration chain.

use std::borrow::Cow;
use std::fmt;
use std::path::Path;

use super::{Resource, SharedAlteration};
use crate::error::Result;

/// A resource plus the alterations applied to it on every dump.
#[derive(Clone)]
pub struct AlteredResource {
    resource: Box<Resource>,
    alterations: Vec<SharedAlteration>,
}

impl AlteredResource {
    pub fn new(
        resource: Resource,
        alterations: impl IntoIterator<Item = SharedAlteration>,
    ) -> Self {
        Self {
            resource: Box::new(resource),
            alterations: alterations.into_iter().collect(),
        }
    }

    /// The wrapped resource, before any alteration.
    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    pub fn alterations(&self) -> &[SharedAlteration] {
        &self.alterations
    }

    /// Run the chain earliest first and dump the final resource.
    pub fn dump(&self) -> Result<Vec<u8>> {
        alter_all(&self.resource, &self.alterations)?.dump()
    }

    /// Same chain, wrapped resource anchored under `base`.
    pub fn in_dir(&self, base: &Path) -> Self {
        Self {
            resource: Box::new(self.resource.in_dir(base)),
            alterations: self.alterations.clone(),
        }
    }
}

impl fmt::Debug for AlteredResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = self.alterations.iter().map(|a| a.name()).collect();
        f.debug_struct("Altered")
            .field("resource", &self.resource)
            .field("alterations", &names)
            .finish()
    }
}

/// Feed `resource` through `alterations` in order.
///
/// The output of each alteration is the input of the next; the first
/// failure aborts the chain. An empty chain borrows the input unchanged.
pub fn alter_all<'a>(
    resource: &'a Resource,
    alterations: &[SharedAlteration],
) -> Result<Cow<'a, Resource>> {
    let mut current = Cow::Borrowed(resource);
    for alteration in alterations {
        current = Cow::Owned(alteration.alter(&current)?);
    }
    Ok(current)
}

//! Provisioned-device exclusion index.

use std::collections::HashSet;

use tracing::{debug, info, instrument};

use crate::error::DirectoryResult;
use crate::traits::DeviceDirectory;
use crate::types::ProvisionedIdentity;

/// Immutable set of directory device ids that must never be swept.
///
/// Built once before classification and only read afterwards. Lookups are
/// case-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionIndex {
    ids: HashSet<String>,
}

impl ExclusionIndex {
    /// An index that protects nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds the index from raw provisioned identities.
    ///
    /// Identities without a directory device reference are ignored.
    pub fn from_identities<'a, I>(identities: I) -> Self
    where
        I: IntoIterator<Item = &'a ProvisionedIdentity>,
    {
        let ids = identities
            .into_iter()
            .filter_map(|identity| {
                let reference = identity
                    .directory_device_id
                    .as_deref()
                    .map(str::trim)
                    .filter(|id| !id.is_empty());
                if reference.is_none() {
                    debug!(identity = %identity.id, "Provisioned identity has no device reference");
                }
                reference.map(str::to_ascii_lowercase)
            })
            .collect();

        Self { ids }
    }

    /// Returns true if the directory id is protected.
    #[must_use]
    pub fn contains(&self, directory_id: &str) -> bool {
        self.ids.contains(&directory_id.trim().to_ascii_lowercase())
    }

    /// Number of protected ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns true if nothing is protected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Queries the provisioned identities and builds the exclusion index.
#[instrument(skip(directory))]
pub async fn build_exclusion_index<D>(directory: &D) -> DirectoryResult<ExclusionIndex>
where
    D: DeviceDirectory + ?Sized,
{
    info!("Fetching provisioned identities for exclusion");
    let identities = directory.list_provisioned_identities().await?;
    let index = ExclusionIndex::from_identities(&identities);
    info!(
        identities = identities.len(),
        protected = index.len(),
        "Exclusion index built"
    );
    Ok(index)
}

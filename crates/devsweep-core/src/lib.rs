//! # devsweep core
//!
//! Decision and workflow logic for device lifecycle management against a
//! cloud directory.
//!
//! The directory itself is reached only through the capability traits in
//! [`traits`]; everything else in this crate is policy:
//!
//! - [`inventory`] - fetch the device set with a fixed attribute projection
//! - [`exclusion`] - immutable index of provisioned devices to protect
//! - [`staleness`] - cutoff and missing-timestamp classification
//! - [`mutator`] - guarded disable-then-delete workflow with dry run
//! - [`recovery`] - one-row-per-key recovery key extraction
//! - [`attributes`] - first-class vs. overflow attribute resolution
//!
//! Work is strictly sequential. Devices are handled in input order and a
//! failure on one device is recorded in the run's report, never propagated.

pub mod attributes;
pub mod error;
pub mod exclusion;
pub mod inventory;
pub mod mutator;
pub mod recovery;
pub mod staleness;
pub mod traits;
pub mod types;

pub use error::{DirectoryError, DirectoryResult};
pub use exclusion::{build_exclusion_index, ExclusionIndex};
pub use inventory::{fetch_inventory, DEVICE_PROJECTION};
pub use mutator::{
    GuardedRemoval, RemovalOptions, RemovalOutcome, RemovalReport, RemovalState, RemovalTarget,
};
pub use recovery::{
    ExtractionOptions, ExtractionReport, KeyExportDevice, KeyExtractor, KeyFailure,
    KeyFailureKind, RecoveryKeyRow,
};
pub use staleness::{Classification, ClassificationSummary, StaleSelection, StalenessPolicy};
pub use traits::{DeviceDirectory, DeviceMutation, RecoveryKeyDirectory};
pub use types::{
    DeviceRecord, DeviceUpdate, ProvisionedIdentity, RecoveryKeyMetadata, RecoveryKeyValue,
};

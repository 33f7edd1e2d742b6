//! Staleness classification
//!
//! Decides which devices have gone stale. A device is stale when its last
//! sign-in is at or before the cutoff. A missing timestamp is not evidence of
//! staleness, so such devices are only included when the caller opts in.
//! Provisioned devices are protected before any timestamp is looked at.

use chrono::{DateTime, Duration, Utc};

use crate::exclusion::ExclusionIndex;
use crate::types::DeviceRecord;

/// Default age after which a device counts as stale.
pub const DEFAULT_STALE_DAYS: i64 = 180;

/// Outcome of classifying one device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Last sign-in at or before the cutoff, or no timestamp with opt-in.
    Stale,
    /// Last sign-in after the cutoff.
    Active,
    /// No timestamp and missing-timestamp inclusion not requested.
    MissingTimestamp,
    /// Present in the exclusion index while exclusion is requested.
    Protected,
}

impl Classification {
    /// Returns true if the device belongs in the stale export.
    #[must_use]
    pub fn is_stale(self) -> bool {
        self == Self::Stale
    }
}

/// Cutoff and missing-data policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StalenessPolicy {
    /// Devices that signed in at or before this instant are stale.
    pub cutoff: DateTime<Utc>,
    /// Treat devices without a sign-in timestamp as stale.
    pub include_no_timestamp: bool,
    /// Never report devices found in the exclusion index.
    pub exclude_provisioned: bool,
}

impl StalenessPolicy {
    /// Builds a policy whose cutoff is `stale_days` before `now`.
    ///
    /// Returns `None` when the cutoff falls outside the representable date
    /// range.
    #[must_use]
    pub fn from_days(now: DateTime<Utc>, stale_days: i64) -> Option<Self> {
        let cutoff = now.checked_sub_signed(Duration::try_days(stale_days)?)?;
        Some(Self {
            cutoff,
            include_no_timestamp: false,
            exclude_provisioned: false,
        })
    }

    #[must_use]
    pub fn include_no_timestamp(mut self, include: bool) -> Self {
        self.include_no_timestamp = include;
        self
    }

    #[must_use]
    pub fn exclude_provisioned(mut self, exclude: bool) -> Self {
        self.exclude_provisioned = exclude;
        self
    }

    /// Classifies a single device.
    #[must_use]
    pub fn classify(&self, device: &DeviceRecord, exclusions: &ExclusionIndex) -> Classification {
        if self.exclude_provisioned && exclusions.contains(&device.id) {
            return Classification::Protected;
        }

        match device.last_sign_in {
            Some(last) if last <= self.cutoff => Classification::Stale,
            Some(_) => Classification::Active,
            None if self.include_no_timestamp => Classification::Stale,
            None => Classification::MissingTimestamp,
        }
    }

    /// Returns the stale subset of `devices`, preserving input order.
    #[must_use]
    pub fn select_stale<'a>(
        &self,
        devices: &'a [DeviceRecord],
        exclusions: &ExclusionIndex,
    ) -> StaleSelection<'a> {
        let mut selection = StaleSelection::default();

        for device in devices {
            let class = self.classify(device, exclusions);
            selection.summary.record(class);
            if class.is_stale() {
                selection.stale.push(device);
            }
        }

        selection
    }
}

/// Counts per classification over one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassificationSummary {
    pub total: usize,
    pub stale: usize,
    pub active: usize,
    pub missing_timestamp: usize,
    pub protected: usize,
}

impl ClassificationSummary {
    fn record(&mut self, class: Classification) {
        self.total += 1;
        match class {
            Classification::Stale => self.stale += 1,
            Classification::Active => self.active += 1,
            Classification::MissingTimestamp => self.missing_timestamp += 1,
            Classification::Protected => self.protected += 1,
        }
    }
}

/// Stale devices plus the summary of how every device was classified.
#[derive(Debug, Default)]
pub struct StaleSelection<'a> {
    pub stale: Vec<&'a DeviceRecord>,
    pub summary: ClassificationSummary,
}

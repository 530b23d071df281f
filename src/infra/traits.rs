//! Trait definitions for the collaborators around the fusion engine
//!
//! The engine never calls these; the [`super::ScanPipeline`] does, before and
//! after each engine invocation.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
#[cfg(test)]
use mockall::automock;
use uuid::Uuid;

use crate::domain::{AiEvent, AnprEvent, RegistryVehicle};
use crate::intake::SanitizedScan;

use super::{DedupRule, FusionRecord, RecordOutcome, Result, StoredScan};

/// Registry of enrolled vehicles.
///
/// Invariant: at most one record per plate; a public key, if present, is
/// bound to one record.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait VehicleRegistry: Send + Sync {
    /// Look up by normalized plate
    async fn find_by_plate(&self, plate: &str) -> Result<Option<RegistryVehicle>>;

    /// Look up by exact normalized public key. Callers try each `04` form.
    async fn find_by_public_key(&self, public_key: &str) -> Result<Option<RegistryVehicle>>;

    /// Enroll a vehicle, enforcing plate and key uniqueness
    async fn enroll(&self, vehicle: RegistryVehicle) -> Result<()>;
}

/// Storage for ANPR and AI camera reads with a temporal join.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ObservationStore: Send + Sync {
    async fn record_anpr(&self, event: AnprEvent) -> Result<AnprEvent>;

    async fn record_ai(&self, event: AiEvent) -> Result<AiEvent>;

    /// Most recent ANPR read for `plate` strictly within `window` of `at`
    async fn latest_anpr_near(
        &self,
        plate: &str,
        at: DateTime<Utc>,
        window: Duration,
    ) -> Result<Option<AnprEvent>>;

    /// Most recent AI read for `plate` strictly within `window` of `at`
    async fn latest_ai_near(
        &self,
        plate: &str,
        at: DateTime<Utc>,
        window: Duration,
    ) -> Result<Option<AiEvent>>;
}

/// Forensic scan log and counter history.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ScanStore: Send + Sync {
    async fn record_scan(&self, scan: SanitizedScan) -> Result<StoredScan>;

    /// Counter of the most recent prior scan with this UUID, excluding
    /// `exclude`
    async fn last_counter(&self, uuid: &str, exclude: Uuid) -> Result<Option<u64>>;

    /// Newest first
    async fn recent_scans(&self, limit: usize) -> Result<Vec<StoredScan>>;
}

/// Fusion result store.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait FusionStore: Send + Sync {
    /// Write a record unless `dedup` matches an existing one. The check and
    /// the write are atomic.
    async fn record(
        &self,
        record: FusionRecord,
        dedup: Option<DedupRule>,
    ) -> Result<RecordOutcome>;

    /// Newest first
    async fn recent(&self, limit: usize) -> Result<Vec<FusionRecord>>;
}

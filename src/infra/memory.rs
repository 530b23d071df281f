//! In-memory collaborator implementations
//!
//! Used by the operator CLI's simulation mode and by tests. Each store
//! guards its state with a single async `RwLock`, so conditional writes are
//! atomic with respect to concurrent pipeline calls.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::authority::{normalize_hex, KeyCandidates};
use crate::domain::{normalize_plate, AiEvent, AnprEvent, RegistryVehicle};
use crate::intake::SanitizedScan;

use super::{
    DedupRule, FusionError, FusionRecord, FusionStore, ObservationStore, RecordOutcome, Result,
    ScanStore, StoredScan, VehicleRegistry,
};

// ============================================================================
// Vehicle registry
// ============================================================================

#[derive(Default)]
struct RegistryState {
    /// Normalized plate -> vehicle
    vehicles: HashMap<String, RegistryVehicle>,
    /// Normalized public key, as enrolled -> normalized plate
    keys: HashMap<String, String>,
}

/// In-memory vehicle registry
pub struct InMemoryVehicleRegistry {
    state: RwLock<RegistryState>,
}

impl InMemoryVehicleRegistry {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(RegistryState::default()),
        }
    }

    /// Create with pre-enrolled vehicles
    pub async fn with_vehicles(vehicles: Vec<RegistryVehicle>) -> Result<Self> {
        let registry = Self::new();
        for vehicle in vehicles {
            registry.enroll(vehicle).await?;
        }
        Ok(registry)
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.vehicles.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for InMemoryVehicleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VehicleRegistry for InMemoryVehicleRegistry {
    async fn find_by_plate(&self, plate: &str) -> Result<Option<RegistryVehicle>> {
        let plate = normalize_plate(Some(plate));
        let state = self.state.read().await;
        Ok(state.vehicles.get(&plate).cloned())
    }

    async fn find_by_public_key(&self, public_key: &str) -> Result<Option<RegistryVehicle>> {
        let key = normalize_hex(public_key);
        let state = self.state.read().await;
        Ok(state
            .keys
            .get(&key)
            .and_then(|plate| state.vehicles.get(plate))
            .cloned())
    }

    async fn enroll(&self, vehicle: RegistryVehicle) -> Result<()> {
        let plate = vehicle.normalized_plate();
        if plate.is_empty() {
            return Err(FusionError::malformed("plate", "registry vehicle has no plate"));
        }

        let key = match vehicle.public_key.as_deref().map(normalize_hex) {
            Some(key) if !key.is_empty() => {
                let candidates = KeyCandidates::from_observed(&key);
                if candidates.is_empty() {
                    return Err(FusionError::malformed(
                        "public_key",
                        "registry public key is not hex",
                    ));
                }
                Some((key, candidates))
            }
            _ => None,
        };

        let mut state = self.state.write().await;

        if state.vehicles.contains_key(&plate) {
            return Err(FusionError::DuplicatePlate(plate));
        }

        if let Some((key, candidates)) = key {
            if candidates.iter().any(|k| state.keys.contains_key(k)) {
                return Err(FusionError::DuplicatePublicKey(key));
            }
            state.keys.insert(key, plate.clone());
        }

        state.vehicles.insert(plate, vehicle);
        Ok(())
    }
}

// ============================================================================
// Camera observations
// ============================================================================

/// In-memory ANPR and AI read log
#[derive(Default)]
pub struct InMemoryObservationStore {
    anpr: RwLock<Vec<AnprEvent>>,
    ai: RwLock<Vec<AiEvent>>,
}

impl InMemoryObservationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn within_window(ts: DateTime<Utc>, at: DateTime<Utc>, window: Duration) -> bool {
    let delta = ts - at;
    delta < window && delta > -window
}

#[async_trait]
impl ObservationStore for InMemoryObservationStore {
    async fn record_anpr(&self, event: AnprEvent) -> Result<AnprEvent> {
        self.anpr.write().await.push(event.clone());
        Ok(event)
    }

    async fn record_ai(&self, event: AiEvent) -> Result<AiEvent> {
        self.ai.write().await.push(event.clone());
        Ok(event)
    }

    async fn latest_anpr_near(
        &self,
        plate: &str,
        at: DateTime<Utc>,
        window: Duration,
    ) -> Result<Option<AnprEvent>> {
        let plate = normalize_plate(Some(plate));
        let events = self.anpr.read().await;
        Ok(events
            .iter()
            .filter(|e| normalize_plate(Some(e.plate.as_str())) == plate)
            .filter(|e| within_window(e.ts, at, window))
            .max_by_key(|e| e.ts)
            .cloned())
    }

    async fn latest_ai_near(
        &self,
        plate: &str,
        at: DateTime<Utc>,
        window: Duration,
    ) -> Result<Option<AiEvent>> {
        let plate = normalize_plate(Some(plate));
        let events = self.ai.read().await;
        Ok(events
            .iter()
            .filter(|e| e.plate.is_some() && normalize_plate(e.plate.as_deref()) == plate)
            .filter(|e| within_window(e.ts, at, window))
            .max_by_key(|e| e.ts)
            .cloned())
    }
}

// ============================================================================
// Scan log
// ============================================================================

/// In-memory scan log
#[derive(Default)]
pub struct InMemoryScanStore {
    scans: RwLock<Vec<StoredScan>>,
}

impl InMemoryScanStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScanStore for InMemoryScanStore {
    async fn record_scan(&self, scan: SanitizedScan) -> Result<StoredScan> {
        let stored = StoredScan {
            id: Uuid::new_v4(),
            created_at: scan.timestamp.unwrap_or_else(Utc::now),
            scan,
        };
        self.scans.write().await.push(stored.clone());
        Ok(stored)
    }

    async fn last_counter(&self, uuid: &str, exclude: Uuid) -> Result<Option<u64>> {
        let scans = self.scans.read().await;
        Ok(scans
            .iter()
            .filter(|s| s.id != exclude && s.scan.uuid.as_deref() == Some(uuid))
            .max_by_key(|s| s.created_at)
            .map(|s| s.scan.counter))
    }

    async fn recent_scans(&self, limit: usize) -> Result<Vec<StoredScan>> {
        let scans = self.scans.read().await;
        let mut recent: Vec<_> = scans.iter().rev().cloned().collect();
        recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        recent.truncate(limit);
        Ok(recent)
    }
}

// ============================================================================
// Fusion results
// ============================================================================

/// In-memory fusion result store
#[derive(Default)]
pub struct InMemoryFusionStore {
    records: RwLock<Vec<FusionRecord>>,
}

impl InMemoryFusionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FusionStore for InMemoryFusionStore {
    async fn record(
        &self,
        record: FusionRecord,
        dedup: Option<DedupRule>,
    ) -> Result<RecordOutcome> {
        let mut records = self.records.write().await;

        if let Some(rule) = dedup {
            if let Some(existing) = records.iter().rev().find(|r| rule.matches(r)) {
                return Ok(RecordOutcome::Suppressed {
                    existing: existing.id,
                });
            }
        }

        let id = record.id;
        records.push(record);
        Ok(RecordOutcome::Recorded(id))
    }

    async fn recent(&self, limit: usize) -> Result<Vec<FusionRecord>> {
        let records = self.records.read().await;
        let mut recent: Vec<_> = records.iter().rev().cloned().collect();
        recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        recent.truncate(limit);
        Ok(recent)
    }
}

//! Scan pipeline
//!
//! Orders the collaborator calls around one engine invocation:
//!
//! 1. sanitize and record the scan
//! 2. resolve the identity against the registry
//! 3. join camera reads for the observed plate
//! 4. fetch the previous counter for the tag
//! 5. decide, then persist the fusion record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::authority::resolve_identity;
use crate::config::FusionConfig;
use crate::domain::{AiEvent, AnprEvent, FusedResult, FusionInput, FusionVerdict, RegistryVehicle};
use crate::engine::FusionEngine;
use crate::intake::{AiSubmission, AnprSubmission, ScanSubmission};
use crate::metrics::{metric_names, MetricsRegistry};

use super::{
    clamp_recent_limit, CloudAssessment, DedupRule, FusionRecord, FusionStore, InMemoryFusionStore,
    InMemoryObservationStore, InMemoryScanStore, InMemoryVehicleRegistry, LinkedEvents,
    ObservationStore, RecordOutcome, Result, ScanStore, StoredScan, VehicleRegistry,
    MAX_RECENT_LIMIT,
};

/// Outcome of one scan submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanOutcome {
    pub scan_id: Uuid,
    pub created_at: DateTime<Utc>,
    /// None when the fusion record was suppressed as a duplicate
    pub fusion_id: Option<Uuid>,
    pub deduplicated: bool,
    pub result: FusedResult,
    pub cloud: CloudAssessment,
}

/// Scan pipeline over pluggable collaborators.
pub struct ScanPipeline {
    registry: Arc<dyn VehicleRegistry>,
    observations: Arc<dyn ObservationStore>,
    scans: Arc<dyn ScanStore>,
    fusions: Arc<dyn FusionStore>,
    engine: FusionEngine,
    config: FusionConfig,
    metrics: Arc<MetricsRegistry>,
}

impl ScanPipeline {
    pub fn new(
        registry: Arc<dyn VehicleRegistry>,
        observations: Arc<dyn ObservationStore>,
        scans: Arc<dyn ScanStore>,
        fusions: Arc<dyn FusionStore>,
        config: FusionConfig,
    ) -> Self {
        Self {
            registry,
            observations,
            scans,
            fusions,
            engine: FusionEngine::new(config.policy()),
            config,
            metrics: Arc::new(MetricsRegistry::new()),
        }
    }

    /// Pipeline backed entirely by in-memory stores
    pub fn in_memory(config: FusionConfig) -> Self {
        Self::new(
            Arc::new(InMemoryVehicleRegistry::new()),
            Arc::new(InMemoryObservationStore::new()),
            Arc::new(InMemoryScanStore::new()),
            Arc::new(InMemoryFusionStore::new()),
            config,
        )
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }

    pub async fn enroll(&self, vehicle: RegistryVehicle) -> Result<()> {
        self.registry.enroll(vehicle).await
    }

    #[instrument(skip(self, submission))]
    pub async fn ingest_anpr(&self, submission: AnprSubmission) -> Result<AnprEvent> {
        let event = match submission.into_event(Utc::now()) {
            Ok(event) => event,
            Err(err) => {
                warn!(error = %err, "rejected ANPR read");
                return Err(err);
            }
        };
        let event = self.observations.record_anpr(event).await?;
        self.metrics.inc_counter(metric_names::ANPR_INGESTED).await;
        debug!(plate = %event.plate, ts = %event.ts, "ANPR read recorded");
        Ok(event)
    }

    #[instrument(skip(self, submission))]
    pub async fn ingest_ai(&self, submission: AiSubmission) -> Result<AiEvent> {
        let event = self
            .observations
            .record_ai(submission.into_event(Utc::now()))
            .await?;
        self.metrics.inc_counter(metric_names::AI_INGESTED).await;
        debug!(plate = ?event.plate, ts = %event.ts, "AI read recorded");
        Ok(event)
    }

    /// Run one scan through resolution, correlation and fusion.
    #[instrument(skip(self, submission))]
    pub async fn submit_scan(&self, submission: ScanSubmission) -> Result<ScanOutcome> {
        let started = Instant::now();

        let scan = match submission.sanitize(self.config.max_counter) {
            Ok(scan) => scan,
            Err(err) => {
                self.metrics.inc_counter(metric_names::SCANS_REJECTED).await;
                warn!(error = %err, "rejected scan");
                return Err(err);
            }
        };

        let stored = self.scans.record_scan(scan).await?;
        let scan = &stored.scan;

        let resolution =
            resolve_identity(self.registry.as_ref(), &scan.pubkey_hex, &scan.plate).await?;
        let cloud = CloudAssessment::from(&resolution);

        let (anpr_event, ai_event) = self.correlate(&scan.plate, stored.created_at).await?;

        let last_counter = match scan.uuid.as_deref() {
            Some(uuid) => self.scans.last_counter(uuid, stored.id).await?,
            None => None,
        };

        let input = FusionInput {
            registry_vehicle: resolution.vehicle,
            scan_event: Some(scan.to_scan_event(resolution.verdict)),
            anpr_event,
            ai_event,
            last_counter,
        };

        let result = self.engine.decide(&input);

        let linked = LinkedEvents {
            scan_id: Some(stored.id),
            anpr_id: input.anpr_event.as_ref().and_then(|e| e.id),
            ai_id: input.ai_event.as_ref().and_then(|e| e.id),
        };
        let record = FusionRecord::new(result.clone(), cloud.clone(), linked, stored.created_at);

        let outcome = self
            .fusions
            .record(
                record,
                self.dedup_rule(&result, &scan.plate, stored.created_at),
            )
            .await?;

        self.metrics.inc_counter(metric_names::SCANS_ACCEPTED).await;
        self.metrics.record_fusion(&result).await;
        if let RecordOutcome::Suppressed { existing } = outcome {
            self.metrics
                .inc_counter(metric_names::DEDUP_SUPPRESSED)
                .await;
            debug!(%existing, "duplicate UUID_MISSING result suppressed");
        }
        self.metrics
            .observe_histogram(
                metric_names::SCAN_LATENCY,
                started.elapsed().as_secs_f64(),
            )
            .await;

        if result.fusion_verdict == FusionVerdict::Match {
            info!(
                scan_id = %stored.id,
                verdict = %result.fusion_verdict,
                label = %result.final_label,
                "scan fused"
            );
        } else {
            warn!(
                scan_id = %stored.id,
                plate = ?result.plate,
                verdict = %result.fusion_verdict,
                label = %result.final_label,
                cloud_verdict = %cloud.cloud_verdict,
                "scan fused with alert"
            );
        }

        Ok(ScanOutcome {
            scan_id: stored.id,
            created_at: stored.created_at,
            fusion_id: outcome.recorded_id(),
            deduplicated: outcome.recorded_id().is_none(),
            result,
            cloud,
        })
    }

    pub async fn recent_fusions(&self, limit: Option<i64>) -> Result<Vec<FusionRecord>> {
        self.fusions.recent(clamp_recent_limit(limit)).await
    }

    pub async fn recent_scans(&self, limit: Option<i64>) -> Result<Vec<StoredScan>> {
        let limit = match limit {
            Some(n) if n > 0 => clamp_recent_limit(Some(n)),
            _ => MAX_RECENT_LIMIT,
        };
        self.scans.recent_scans(limit).await
    }

    async fn correlate(
        &self,
        plate: &str,
        at: DateTime<Utc>,
    ) -> Result<(Option<AnprEvent>, Option<AiEvent>)> {
        if plate.is_empty() {
            return Ok((None, None));
        }
        let window = self.config.correlation_window;
        let anpr = self.observations.latest_anpr_near(plate, at, window).await?;
        let ai = self.observations.latest_ai_near(plate, at, window).await?;
        Ok((anpr, ai))
    }

    /// Keyed on the normalized scan plate; the displayed plate may come
    /// from a camera read with different spacing or case.
    fn dedup_rule(
        &self,
        result: &FusedResult,
        scan_plate: &str,
        at: DateTime<Utc>,
    ) -> Option<DedupRule> {
        if result.fusion_verdict != FusionVerdict::UuidMissing
            || !self.config.dedup_enabled()
            || scan_plate.is_empty()
        {
            return None;
        }
        Some(DedupRule {
            plate: scan_plate.to_string(),
            verdict: result.fusion_verdict,
            since: at - self.config.uuid_missing_dedup,
        })
    }
}

//! Persisted record shapes for scans and fusion results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::authority::IdentityResolution;
use crate::domain::{
    normalize_plate, CloudAction, CloudVerdict, FinalLabel, FusedResult, FusionVerdict,
    VehicleSummary, VisualConfidence,
};
use crate::intake::SanitizedScan;

/// Most rows returned by a recent-records listing.
pub const MAX_RECENT_LIMIT: usize = 100;
pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// Clamp a caller-supplied listing limit: absent or non-positive means the
/// default, anything above the cap is capped.
pub fn clamp_recent_limit(limit: Option<i64>) -> usize {
    match limit {
        Some(n) if n > 0 => (n as u64).min(MAX_RECENT_LIMIT as u64) as usize,
        _ => DEFAULT_RECENT_LIMIT,
    }
}

/// A scan as stored by the scan store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredScan {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub scan: SanitizedScan,
}

/// Cloud authority outcome attached to a fusion record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudAssessment {
    pub cloud_verdict: CloudVerdict,
    pub cloud_action: CloudAction,
    pub cloud_reasons: Vec<String>,
    pub vehicle: Option<VehicleSummary>,
}

impl From<&IdentityResolution> for CloudAssessment {
    fn from(resolution: &IdentityResolution) -> Self {
        Self {
            cloud_verdict: resolution.verdict,
            cloud_action: resolution.action,
            cloud_reasons: resolution.reasons.clone(),
            vehicle: resolution.vehicle.as_ref().map(|v| v.summary()),
        }
    }
}

/// Ids of the events a fusion result was built from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedEvents {
    pub scan_id: Option<Uuid>,
    pub anpr_id: Option<Uuid>,
    pub ai_id: Option<Uuid>,
}

/// Fusion result as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusionRecord {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub plate: Option<String>,
    pub fusion_verdict: FusionVerdict,
    pub final_label: FinalLabel,
    pub visual_confidence: VisualConfidence,
    pub has_gotid: bool,
    pub registry_status: String,
    pub reasons: Vec<String>,
    pub linked: LinkedEvents,
    pub cloud: CloudAssessment,
    pub result: FusedResult,
}

impl FusionRecord {
    pub fn new(
        result: FusedResult,
        cloud: CloudAssessment,
        linked: LinkedEvents,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at,
            plate: result.plate.clone(),
            fusion_verdict: result.fusion_verdict,
            final_label: result.final_label,
            visual_confidence: result.visual_confidence,
            has_gotid: result.has_gotid,
            registry_status: result.registry_status.clone(),
            reasons: result.reasons.clone(),
            linked,
            cloud,
            result,
        }
    }
}

/// Suppress a write when a record with the same plate and verdict exists at
/// or after `since`. Plates compare after normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DedupRule {
    pub plate: String,
    pub verdict: FusionVerdict,
    pub since: DateTime<Utc>,
}

impl DedupRule {
    pub fn matches(&self, record: &FusionRecord) -> bool {
        record.fusion_verdict == self.verdict
            && record.created_at >= self.since
            && record.plate.is_some()
            && normalize_plate(record.plate.as_deref())
                == normalize_plate(Some(self.plate.as_str()))
    }
}

/// Outcome of a conditional fusion write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Recorded(Uuid),
    /// An equivalent record already exists
    Suppressed { existing: Uuid },
}

impl RecordOutcome {
    pub fn recorded_id(&self) -> Option<Uuid> {
        match self {
            RecordOutcome::Recorded(id) => Some(*id),
            RecordOutcome::Suppressed { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recent_limit_clamping() {
        assert_eq!(clamp_recent_limit(None), DEFAULT_RECENT_LIMIT);
        assert_eq!(clamp_recent_limit(Some(0)), DEFAULT_RECENT_LIMIT);
        assert_eq!(clamp_recent_limit(Some(-3)), DEFAULT_RECENT_LIMIT);
        assert_eq!(clamp_recent_limit(Some(25)), 25);
        assert_eq!(clamp_recent_limit(Some(5_000)), MAX_RECENT_LIMIT);
    }

    #[test]
    fn test_dedup_rule_ignores_plate_spacing_and_case() {
        let now = Utc::now();
        let result = crate::engine::decide_fusion(&crate::domain::FusionInput {
            registry_vehicle: Some(crate::domain::RegistryVehicle::new("BT55WMO")),
            anpr_event: Some(crate::domain::AnprEvent::new("bt55 wmo", now, Some(0.9))),
            ..Default::default()
        });
        assert_eq!(result.fusion_verdict, FusionVerdict::UuidMissing);

        let record = FusionRecord::new(
            result,
            CloudAssessment {
                cloud_verdict: CloudVerdict::UuidMissing,
                cloud_action: CloudAction::Investigate,
                cloud_reasons: Vec::new(),
                vehicle: None,
            },
            LinkedEvents::default(),
            now,
        );
        assert_eq!(record.plate.as_deref(), Some("bt55 wmo"));

        let rule = |plate: &str, since| DedupRule {
            plate: plate.to_string(),
            verdict: FusionVerdict::UuidMissing,
            since,
        };
        assert!(rule("BT55WMO", now - chrono::Duration::seconds(30)).matches(&record));
        assert!(!rule("KX20ABC", now - chrono::Duration::seconds(30)).matches(&record));
        assert!(!rule("BT55WMO", now + chrono::Duration::seconds(1)).matches(&record));
    }
}

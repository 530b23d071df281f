//! Identity fusion and anti-clone verdict engine
//!
//! Pure, synchronous, re-entrant. The caller resolves the registry record,
//! the correlated camera reads and the previous counter beforehand and
//! passes them in as plain values; the engine performs no I/O and holds no
//! shared state.
//!
//! ```text
//!  FusionInput ──► ScanFacts ──► FusionClassifier ──► verdict ─┐
//!        │          (ReplayGuard)                              ├─► LabelMapper ──► FusedResult
//!        └────────► VisualCorrelator ──► visual confidence ────┘
//! ```

mod classifier;
mod label;
mod replay;
mod visual;

pub use classifier::{
    Classification, FusionClassifier, GuardRule, ScanFacts, Step, GUARD_CHAIN, MATCH_REASON,
};
pub use label::LabelMapper;
pub use replay::ReplayGuard;
pub use visual::{
    compare_appearance, confidence_points, AppearanceMatch, VisualAssessment, VisualCorrelator,
    APPEARANCE_MISMATCH_REASON, STRONG_READ, USABLE_READ,
};

use serde::{Deserialize, Serialize};

use crate::domain::{
    CryptoSnapshot, FusedResult, FusionInput, RegistryVehicle, REGISTRY_STATUS_UNKNOWN,
};

/// How to treat a registry record whose enrollment flag is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentPolicy {
    /// Enrolled unless the registry explicitly says otherwise
    AssumeEnrolled,
    /// Enrolled only when the registry explicitly says so
    RequireExplicit,
}

/// Registry rows predating the enrollment column are treated as enrolled.
pub const DEFAULT_ENROLLMENT_POLICY: EnrollmentPolicy = EnrollmentPolicy::AssumeEnrolled;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FusionPolicy {
    pub enrollment: EnrollmentPolicy,
}

impl Default for FusionPolicy {
    fn default() -> Self {
        Self {
            enrollment: DEFAULT_ENROLLMENT_POLICY,
        }
    }
}

impl FusionPolicy {
    /// Enrollment as reported in the result. No registry record means not
    /// enrolled.
    pub fn has_gotid(&self, vehicle: Option<&RegistryVehicle>) -> bool {
        match (vehicle, self.enrollment) {
            (None, _) => false,
            (Some(v), EnrollmentPolicy::AssumeEnrolled) => v.has_gotid.unwrap_or(true),
            (Some(v), EnrollmentPolicy::RequireExplicit) => v.has_gotid.unwrap_or(false),
        }
    }
}

/// Combines the classifier, visual correlator and label mapper.
#[derive(Debug, Clone, Copy, Default)]
pub struct FusionEngine {
    policy: FusionPolicy,
}

impl FusionEngine {
    pub fn new(policy: FusionPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &FusionPolicy {
        &self.policy
    }

    /// Produce the verdict for one scan. Total over well-typed inputs.
    pub fn decide(&self, input: &FusionInput) -> FusedResult {
        let facts = ScanFacts::gather(input, &self.policy);
        let classification = FusionClassifier::classify(&facts);

        let visual = VisualCorrelator::assess(
            input.anpr_event.as_ref(),
            input.ai_event.as_ref(),
            input.registry_vehicle.as_ref(),
        );

        let final_label = LabelMapper::map(
            Some(classification.verdict),
            visual.confidence,
            facts.has_gotid,
        );

        let mut reasons = classification.reasons;
        reasons.extend(visual.reasons);

        FusedResult {
            fusion_verdict: classification.verdict,
            final_label,
            visual_confidence: visual.confidence,
            reasons,
            plate: FusedResult::display_plate(input),
            has_gotid: facts.has_gotid,
            registry_status: input
                .registry_vehicle
                .as_ref()
                .and_then(|v| v.status.clone())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| REGISTRY_STATUS_UNKNOWN.to_string()),
            crypto: CryptoSnapshot::capture(input.scan_event.as_ref(), input.last_counter),
            anpr: input.anpr_event.clone(),
            ai: input.ai_event.clone(),
            scan: input.scan_event.clone(),
        }
    }
}

/// Decide with the default policy.
pub fn decide_fusion(input: &FusionInput) -> FusedResult {
    FusionEngine::default().decide(input)
}

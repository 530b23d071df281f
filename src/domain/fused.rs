//! Fusion engine input and output envelopes

use serde::{Deserialize, Serialize};

use super::{
    AiEvent, AnprEvent, CloudVerdict, FinalLabel, FusionVerdict, RegistryVehicle, ScanEvent,
    VisualConfidence,
};

/// Registry status echoed when no registry record matched.
pub const REGISTRY_STATUS_UNKNOWN: &str = "unknown";

/// Everything the engine needs for one scan, fetched by the caller beforehand.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FusionInput {
    pub registry_vehicle: Option<RegistryVehicle>,
    pub scan_event: Option<ScanEvent>,
    pub anpr_event: Option<AnprEvent>,
    pub ai_event: Option<AiEvent>,
    /// Last counter observed for the same identity, excluding this scan
    pub last_counter: Option<u64>,
}

/// Raw crypto inputs echoed into the result for forensic review.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CryptoSnapshot {
    pub sig_valid: Option<bool>,
    pub chal_valid: Option<bool>,
    pub pubkey_match: Option<bool>,
    pub tamper: Option<bool>,
    pub counter: Option<u64>,
    pub last_counter: Option<u64>,
    pub cloud_verdict: Option<CloudVerdict>,
    pub has_identity: Option<bool>,
}

impl CryptoSnapshot {
    pub fn capture(scan: Option<&ScanEvent>, last_counter: Option<u64>) -> Self {
        match scan {
            Some(scan) => Self {
                sig_valid: scan.sig_valid,
                chal_valid: scan.chal_valid,
                pubkey_match: scan.pubkey_match,
                tamper: scan.tamper,
                counter: scan.counter,
                last_counter,
                cloud_verdict: scan.cloud_verdict,
                has_identity: scan.has_identity,
            },
            None => Self {
                last_counter,
                ..Default::default()
            },
        }
    }
}

/// Verdict produced for a single scan. Constructed fresh per call and owned
/// by the caller, which persists it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusedResult {
    pub fusion_verdict: FusionVerdict,
    pub final_label: FinalLabel,
    pub visual_confidence: VisualConfidence,
    /// Human-readable reasons, in the order they were established
    pub reasons: Vec<String>,
    pub plate: Option<String>,
    pub has_gotid: bool,
    pub registry_status: String,
    pub crypto: CryptoSnapshot,
    pub anpr: Option<AnprEvent>,
    pub ai: Option<AiEvent>,
    pub scan: Option<ScanEvent>,
}

impl FusedResult {
    /// Plate shown to the officer: ANPR read, else scanned plate, else
    /// registry plate. Blank values are skipped.
    pub fn display_plate(input: &FusionInput) -> Option<String> {
        let non_blank = |p: Option<&String>| p.filter(|p| !p.is_empty()).cloned();

        input
            .anpr_event
            .as_ref()
            .and_then(|a| non_blank(Some(&a.plate)))
            .or_else(|| {
                input
                    .scan_event
                    .as_ref()
                    .and_then(|s| non_blank(s.plate.as_ref()))
            })
            .or_else(|| {
                input
                    .registry_vehicle
                    .as_ref()
                    .and_then(|v| non_blank(v.plate.as_ref()))
            })
    }
}

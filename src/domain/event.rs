//! Observation events consumed by the fusion engine
//!
//! - [`ScanEvent`]: one cryptographic GOT-ID tag observation
//! - [`AnprEvent`]: one plate-recognition camera read
//! - [`AiEvent`]: one appearance-recognition camera read
//!
//! All three are immutable once created. Absent fields are never treated as
//! positive signals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::CloudVerdict;

/// Cryptographic scan observation, already sanitized by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanEvent {
    pub plate: Option<String>,

    /// Tag UUID, when the scanner reported one
    pub uuid: Option<String>,

    /// Monotonic tag counter
    pub counter: Option<u64>,

    pub sig_valid: Option<bool>,
    pub chal_valid: Option<bool>,
    pub pubkey_match: Option<bool>,
    pub tamper: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rssi: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub est_distance_m: Option<f64>,

    /// Identity-resolution outcome computed before fusion
    pub cloud_verdict: Option<CloudVerdict>,

    /// True only if an actual public key was captured
    pub has_identity: Option<bool>,
}

impl ScanEvent {
    /// Whether this scan genuinely captured a GOT-ID identity.
    ///
    /// Any one of: an explicit identity flag, a non-blank UUID, a positive
    /// pubkey match, or a cloud verdict that could only come from a captured
    /// key.
    pub fn captured_identity(&self) -> bool {
        self.has_identity == Some(true)
            || self
                .uuid
                .as_deref()
                .is_some_and(|uuid| !uuid.trim().is_empty())
            || self.pubkey_match == Some(true)
            || matches!(
                self.cloud_verdict,
                Some(CloudVerdict::Authentic) | Some(CloudVerdict::KeyMismatch)
            )
    }
}

/// Plate-recognition camera read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnprEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,

    pub plate: String,

    #[serde(default = "Utc::now")]
    pub ts: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera_id: Option<String>,

    /// Read confidence in `0.0..=1.0`
    #[serde(default)]
    pub confidence: Option<f64>,

    /// Raw camera payload
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub raw: serde_json::Value,
}

impl AnprEvent {
    pub fn new(plate: impl Into<String>, ts: DateTime<Utc>, confidence: Option<f64>) -> Self {
        Self {
            id: None,
            plate: plate.into(),
            ts,
            camera_id: None,
            confidence,
            raw: serde_json::Value::Null,
        }
    }

    pub fn effective_confidence(&self) -> Option<f64> {
        effective_confidence(self.confidence, &self.raw)
    }
}

/// Appearance-recognition camera read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,

    /// AI can run when the plate is unreadable
    #[serde(default)]
    pub plate: Option<String>,

    #[serde(default = "Utc::now")]
    pub ts: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera_id: Option<String>,

    #[serde(default, alias = "vehicle_conf")]
    pub confidence: Option<f64>,

    #[serde(default)]
    pub make: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default)]
    pub colour: Option<String>,

    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub raw: serde_json::Value,
}

impl AiEvent {
    pub fn new(plate: Option<String>, ts: DateTime<Utc>, confidence: Option<f64>) -> Self {
        Self {
            id: None,
            plate,
            ts,
            camera_id: None,
            confidence,
            make: None,
            model: None,
            colour: None,
            raw: serde_json::Value::Null,
        }
    }

    pub fn with_appearance(mut self, make: impl Into<String>, colour: impl Into<String>) -> Self {
        self.make = Some(make.into());
        self.colour = Some(colour.into());
        self
    }

    pub fn effective_confidence(&self) -> Option<f64> {
        effective_confidence(self.confidence, &self.raw)
    }
}

/// Typed confidence when finite, else a finite `raw.confidence`, else unknown.
fn effective_confidence(typed: Option<f64>, raw: &serde_json::Value) -> Option<f64> {
    typed.filter(|c| c.is_finite()).or_else(|| {
        raw.get("confidence")
            .and_then(serde_json::Value::as_f64)
            .filter(|c| c.is_finite())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identity_requires_positive_evidence() {
        assert!(!ScanEvent::default().captured_identity());

        let blank_uuid = ScanEvent {
            uuid: Some("   ".to_string()),
            has_identity: Some(false),
            pubkey_match: Some(false),
            cloud_verdict: Some(CloudVerdict::UuidMissing),
            ..Default::default()
        };
        assert!(!blank_uuid.captured_identity());
    }

    #[test]
    fn test_identity_sources() {
        let flagged = ScanEvent {
            has_identity: Some(true),
            ..Default::default()
        };
        let with_uuid = ScanEvent {
            uuid: Some("tag-01".to_string()),
            ..Default::default()
        };
        let matched = ScanEvent {
            pubkey_match: Some(true),
            ..Default::default()
        };
        let authentic = ScanEvent {
            cloud_verdict: Some(CloudVerdict::Authentic),
            ..Default::default()
        };
        let key_mismatch = ScanEvent {
            cloud_verdict: Some(CloudVerdict::KeyMismatch),
            ..Default::default()
        };

        for scan in [flagged, with_uuid, matched, authentic, key_mismatch] {
            assert!(scan.captured_identity(), "{scan:?}");
        }
    }

    #[test]
    fn test_confidence_falls_back_to_raw() {
        let mut anpr = AnprEvent::new("BT55WMO", Utc::now(), None);
        assert_eq!(anpr.effective_confidence(), None);

        anpr.raw = json!({ "confidence": 0.8 });
        assert_eq!(anpr.effective_confidence(), Some(0.8));

        anpr.confidence = Some(0.95);
        assert_eq!(anpr.effective_confidence(), Some(0.95));

        anpr.confidence = Some(f64::NAN);
        assert_eq!(anpr.effective_confidence(), Some(0.8));

        anpr.raw = json!({ "confidence": "high" });
        assert_eq!(anpr.effective_confidence(), None);
    }

    #[test]
    fn test_ai_accepts_vehicle_conf_alias() {
        let ai: AiEvent =
            serde_json::from_str(r#"{"plate":"BT55WMO","vehicle_conf":0.88,"make":"AUDI"}"#)
                .unwrap();
        assert_eq!(ai.effective_confidence(), Some(0.88));
        assert_eq!(ai.make.as_deref(), Some("AUDI"));
    }
}

//! Scanner and camera intake normalization
//!
//! Submissions arrive loosely typed from scanners and cameras. Everything
//! here runs before the fusion engine so that the engine only ever sees
//! sanitized, typed values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::authority::{is_hex, normalize_hex};
use crate::domain::{normalize_plate, AiEvent, AnprEvent, CloudVerdict, ScanEvent};
use crate::infra::{FusionError, Result};

pub const MAX_PLATE_LEN: usize = 16;
pub const MAX_UUID_LEN: usize = 128;
pub const MAX_SCANNER_ID_LEN: usize = 64;
pub const MAX_OFFICER_ID_LEN: usize = 64;
pub const MAX_PUBKEY_HEX_LEN: usize = 300;
pub const MAX_RESULT_LEN: usize = 32;
pub const MAX_VIN_LEN: usize = 32;
pub const MAX_MAKE_LEN: usize = 64;
pub const MAX_MODEL_LEN: usize = 128;
pub const MAX_COLOUR_LEN: usize = 32;

pub const DEFAULT_MAX_COUNTER: u64 = 2_000_000_000;
pub const DEFAULT_CAMERA_ID: &str = "C920_CAM";
pub const DEFAULT_ANPR_CONFIDENCE: f64 = 0.9;
pub const DEFAULT_SCAN_RESULT: &str = "UNKNOWN";

/// Raw scan report from a roadside scanner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSubmission {
    pub plate: Option<String>,
    pub uuid: Option<String>,
    pub counter: Option<i64>,
    #[serde(deserialize_with = "lenient_flag")]
    pub sig_valid: Option<bool>,
    #[serde(deserialize_with = "lenient_flag")]
    pub chal_valid: Option<bool>,
    #[serde(alias = "tamper_flag", deserialize_with = "lenient_flag")]
    pub tamper: Option<bool>,
    pub pubkey_hex: Option<String>,
    #[serde(deserialize_with = "lenient_flag")]
    pub pubkey_match: Option<bool>,
    pub result: Option<String>,
    pub rssi: Option<i64>,
    pub est_distance_m: Option<f64>,
    pub gps_lat: Option<f64>,
    pub gps_lon: Option<f64>,
    pub scanner_id: Option<String>,
    pub officer_id: Option<String>,
    pub vin: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub colour: Option<String>,
    /// Scan time; defaults to the time of recording
    pub timestamp: Option<DateTime<Utc>>,
    /// Raw scanner payload; `raw.pubkey_hex` takes precedence over the
    /// top-level field
    #[serde(alias = "raw_json")]
    pub raw: serde_json::Value,
}

/// Scan after intake normalization. This is what gets stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SanitizedScan {
    /// Normalized plate, empty when not reported
    pub plate: String,
    pub uuid: Option<String>,
    pub counter: u64,
    pub sig_valid: bool,
    pub chal_valid: bool,
    pub tamper: bool,
    /// Normalized hex, empty when no key was captured
    pub pubkey_hex: String,
    pub has_identity: bool,
    pub pubkey_match: Option<bool>,
    pub result: String,
    pub rssi: Option<i32>,
    pub est_distance_m: Option<f64>,
    pub gps_lat: Option<f64>,
    pub gps_lon: Option<f64>,
    pub scanner_id: Option<String>,
    pub officer_id: Option<String>,
    pub vin: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub colour: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub raw: serde_json::Value,
}

impl ScanSubmission {
    /// Normalize a submission. Rejects a non-hex public key.
    ///
    /// Without a captured key crypto cannot have passed, so `sig_valid` and
    /// `chal_valid` are forced false.
    pub fn sanitize(&self, max_counter: u64) -> Result<SanitizedScan> {
        let plate = normalize_plate(truncate(self.plate.as_deref(), MAX_PLATE_LEN).as_deref());

        let raw_key = self
            .raw
            .get("pubkey_hex")
            .and_then(serde_json::Value::as_str)
            .or(self.pubkey_hex.as_deref());
        let pubkey_hex = normalize_hex(&truncate(raw_key, MAX_PUBKEY_HEX_LEN).unwrap_or_default());

        if !pubkey_hex.is_empty() && !is_hex(&pubkey_hex) {
            return Err(FusionError::malformed(
                "pubkey_hex",
                "pubkey_hex malformed (non-hex)",
            ));
        }

        let has_identity = !pubkey_hex.is_empty();
        let ceiling = i64::try_from(max_counter).unwrap_or(i64::MAX);
        let counter = self.counter.unwrap_or(0).clamp(0, ceiling) as u64;

        Ok(SanitizedScan {
            plate,
            uuid: truncate(self.uuid.as_deref(), MAX_UUID_LEN),
            counter,
            sig_valid: has_identity && self.sig_valid.unwrap_or(true),
            chal_valid: has_identity && self.chal_valid.unwrap_or(true),
            tamper: self.tamper.unwrap_or(false),
            pubkey_hex,
            has_identity,
            pubkey_match: self.pubkey_match,
            result: truncate(self.result.as_deref(), MAX_RESULT_LEN)
                .unwrap_or_else(|| DEFAULT_SCAN_RESULT.to_string()),
            rssi: self.rssi.map(|r| r.clamp(-120, 20) as i32),
            est_distance_m: clamp_finite(self.est_distance_m, 0.0, 5000.0),
            gps_lat: clamp_finite(self.gps_lat, -90.0, 90.0),
            gps_lon: clamp_finite(self.gps_lon, -180.0, 180.0),
            scanner_id: truncate(self.scanner_id.as_deref(), MAX_SCANNER_ID_LEN),
            officer_id: truncate(self.officer_id.as_deref(), MAX_OFFICER_ID_LEN),
            vin: truncate(self.vin.as_deref(), MAX_VIN_LEN),
            make: truncate(self.make.as_deref(), MAX_MAKE_LEN),
            model: truncate(self.model.as_deref(), MAX_MODEL_LEN),
            colour: truncate(self.colour.as_deref(), MAX_COLOUR_LEN),
            timestamp: self.timestamp,
            raw: match &self.raw {
                serde_json::Value::Object(_) => self.raw.clone(),
                _ => serde_json::Value::Object(Default::default()),
            },
        })
    }
}

impl SanitizedScan {
    /// Engine view of this scan, carrying the cloud authority verdict.
    pub fn to_scan_event(&self, cloud_verdict: CloudVerdict) -> ScanEvent {
        ScanEvent {
            plate: non_empty(&self.plate),
            uuid: self.uuid.clone(),
            counter: Some(self.counter),
            sig_valid: Some(self.sig_valid),
            chal_valid: Some(self.chal_valid),
            pubkey_match: self.pubkey_match,
            tamper: Some(self.tamper),
            rssi: self.rssi,
            est_distance_m: self.est_distance_m,
            cloud_verdict: Some(cloud_verdict),
            has_identity: Some(self.has_identity),
        }
    }
}

/// Plate-recognition camera report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnprSubmission {
    pub plate: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub camera_id: Option<String>,
    pub confidence: Option<f64>,
    pub raw: serde_json::Value,
}

impl AnprSubmission {
    /// Build the stored event. A plate is required; confidence defaults to
    /// a good read.
    pub fn into_event(self, now: DateTime<Utc>) -> Result<AnprEvent> {
        let plate = self
            .plate
            .filter(|p| !p.trim().is_empty())
            .ok_or(FusionError::MissingPlate)?;

        Ok(AnprEvent {
            id: Some(Uuid::new_v4()),
            plate,
            ts: self.timestamp.unwrap_or(now),
            camera_id: Some(
                non_empty_opt(self.camera_id).unwrap_or_else(|| DEFAULT_CAMERA_ID.to_string()),
            ),
            confidence: Some(self.confidence.unwrap_or(DEFAULT_ANPR_CONFIDENCE)),
            raw: self.raw,
        })
    }
}

/// Appearance-recognition camera report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiSubmission {
    pub plate: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub camera_id: Option<String>,
    pub vehicle_conf: Option<f64>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub colour: Option<String>,
    pub raw: serde_json::Value,
}

impl AiSubmission {
    pub fn into_event(self, now: DateTime<Utc>) -> AiEvent {
        AiEvent {
            id: Some(Uuid::new_v4()),
            plate: non_empty_opt(self.plate),
            ts: self.timestamp.unwrap_or(now),
            camera_id: Some(
                non_empty_opt(self.camera_id).unwrap_or_else(|| DEFAULT_CAMERA_ID.to_string()),
            ),
            confidence: self.vehicle_conf,
            make: non_empty_opt(self.make),
            model: non_empty_opt(self.model),
            colour: non_empty_opt(self.colour),
            raw: self.raw,
        }
    }
}

/// Scanner flag as sent by field firmware: a bool, a number (non-zero is
/// true) or one of `true/false`, `1/0`, `yes/no`. Anything else is absent.
fn lenient_flag<'de, D>(deserializer: D) -> std::result::Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(parse_flag))
}

fn parse_flag(value: &serde_json::Value) -> Option<bool> {
    match value {
        serde_json::Value::Bool(flag) => Some(*flag),
        serde_json::Value::Number(n) => n.as_f64().map(|n| n != 0.0),
        serde_json::Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// First `max_chars` characters of a non-empty string.
fn truncate(value: Option<&str>, max_chars: usize) -> Option<String> {
    value
        .filter(|v| !v.is_empty())
        .map(|v| v.chars().take(max_chars).collect())
}

fn clamp_finite(value: Option<f64>, min: f64, max: f64) -> Option<f64> {
    value.filter(|v| v.is_finite()).map(|v| v.clamp(min, max))
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

fn non_empty_opt(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_key_forces_crypto_false() {
        let submission = ScanSubmission {
            plate: Some("bt55 wmo".to_string()),
            sig_valid: Some(true),
            chal_valid: Some(true),
            ..Default::default()
        };
        let scan = submission.sanitize(DEFAULT_MAX_COUNTER).unwrap();
        assert_eq!(scan.plate, "BT55WMO");
        assert!(!scan.has_identity);
        assert!(!scan.sig_valid);
        assert!(!scan.chal_valid);
        assert!(!scan.tamper);
        assert_eq!(scan.counter, 0);
        assert_eq!(scan.result, DEFAULT_SCAN_RESULT);
    }

    #[test]
    fn test_captured_key_defaults_crypto_true() {
        let submission = ScanSubmission {
            pubkey_hex: Some("04 ab cd".to_string()),
            ..Default::default()
        };
        let scan = submission.sanitize(DEFAULT_MAX_COUNTER).unwrap();
        assert_eq!(scan.pubkey_hex, "04ABCD");
        assert!(scan.has_identity);
        assert!(scan.sig_valid);
        assert!(scan.chal_valid);
    }

    #[test]
    fn test_raw_pubkey_takes_precedence() {
        let submission = ScanSubmission {
            pubkey_hex: Some("zz".to_string()),
            raw: json!({ "pubkey_hex": "04aa" }),
            ..Default::default()
        };
        let scan = submission.sanitize(DEFAULT_MAX_COUNTER).unwrap();
        assert_eq!(scan.pubkey_hex, "04AA");
    }

    #[test]
    fn test_non_hex_key_rejected() {
        let submission = ScanSubmission {
            pubkey_hex: Some("04-not-hex".to_string()),
            ..Default::default()
        };
        let err = submission.sanitize(DEFAULT_MAX_COUNTER).unwrap_err();
        assert!(matches!(
            err,
            FusionError::MalformedInput {
                field: "pubkey_hex",
                ..
            }
        ));
    }

    #[test]
    fn test_numeric_clamping() {
        let submission = ScanSubmission {
            counter: Some(-5),
            rssi: Some(-500),
            est_distance_m: Some(f64::INFINITY),
            gps_lat: Some(123.0),
            gps_lon: Some(-200.0),
            ..Default::default()
        };
        let scan = submission.sanitize(100).unwrap();
        assert_eq!(scan.counter, 0);
        assert_eq!(scan.rssi, Some(-120));
        assert_eq!(scan.est_distance_m, None);
        assert_eq!(scan.gps_lat, Some(90.0));
        assert_eq!(scan.gps_lon, Some(-180.0));

        let over = ScanSubmission {
            counter: Some(5_000),
            ..Default::default()
        };
        assert_eq!(over.sanitize(100).unwrap().counter, 100);
    }

    #[test]
    fn test_string_truncation() {
        let submission = ScanSubmission {
            plate: Some("ABCDEFGHIJKLMNOPQRSTUVWXYZ".to_string()),
            uuid: Some("u".repeat(500)),
            ..Default::default()
        };
        let scan = submission.sanitize(DEFAULT_MAX_COUNTER).unwrap();
        assert_eq!(scan.plate.len(), MAX_PLATE_LEN);
        assert_eq!(scan.uuid.map(|u| u.len()), Some(MAX_UUID_LEN));
    }

    #[test]
    fn test_scan_event_projection() {
        let scan = ScanSubmission {
            pubkey_hex: Some("04AA".to_string()),
            uuid: Some("tag-1".to_string()),
            counter: Some(7),
            pubkey_match: Some(true),
            ..Default::default()
        }
        .sanitize(DEFAULT_MAX_COUNTER)
        .unwrap();

        let event = scan.to_scan_event(CloudVerdict::Authentic);
        assert_eq!(event.plate, None);
        assert_eq!(event.counter, Some(7));
        assert_eq!(event.has_identity, Some(true));
        assert_eq!(event.cloud_verdict, Some(CloudVerdict::Authentic));
    }

    #[test]
    fn test_anpr_defaults() {
        let now = Utc::now();
        let event = AnprSubmission {
            plate: Some("BT55WMO".to_string()),
            ..Default::default()
        }
        .into_event(now)
        .unwrap();
        assert_eq!(event.ts, now);
        assert_eq!(event.confidence, Some(DEFAULT_ANPR_CONFIDENCE));
        assert_eq!(event.camera_id.as_deref(), Some(DEFAULT_CAMERA_ID));
        assert!(event.id.is_some());

        let missing = AnprSubmission::default().into_event(now);
        assert!(matches!(missing, Err(FusionError::MissingPlate)));
    }

    #[test]
    fn test_scanner_flags_accept_loose_encodings() {
        let submission: ScanSubmission = serde_json::from_value(json!({
            "pubkey_hex": "04AA",
            "sig_valid": "yes",
            "chal_valid": 0,
            "tamper_flag": " TRUE ",
            "pubkey_match": "maybe",
        }))
        .unwrap();
        assert_eq!(submission.sig_valid, Some(true));
        assert_eq!(submission.chal_valid, Some(false));
        assert_eq!(submission.tamper, Some(true));
        assert_eq!(submission.pubkey_match, None);

        let scan = submission.sanitize(DEFAULT_MAX_COUNTER).unwrap();
        assert!(scan.sig_valid);
        assert!(!scan.chal_valid);
        assert!(scan.tamper);

        let absent: ScanSubmission = serde_json::from_value(json!({ "sig_valid": null })).unwrap();
        assert_eq!(absent.sig_valid, None);
        assert_eq!(absent.tamper, None);
    }

    #[test]
    fn test_ai_allows_missing_plate() {
        let now = Utc::now();
        let event = AiSubmission {
            make: Some("AUDI".to_string()),
            colour: Some(String::new()),
            ..Default::default()
        }
        .into_event(now);
        assert_eq!(event.plate, None);
        assert_eq!(event.confidence, None);
        assert_eq!(event.make.as_deref(), Some("AUDI"));
        assert_eq!(event.colour, None);
    }
}

//! Common test utilities and fixtures for integration tests

#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};

use gotid_fusion::config::FusionConfig;
use gotid_fusion::domain::{
    AiEvent, AnprEvent, CloudVerdict, FusionInput, RegistryVehicle, ScanEvent,
};
use gotid_fusion::intake::{AiSubmission, AnprSubmission, ScanSubmission};
use gotid_fusion::ScanPipeline;

pub const TEST_PLATE: &str = "BT55WMO";
pub const TEST_PUBKEY: &str = "04A1B2C3D4E5F60718293A4B5C6D7E8F";
pub const TEST_TAG_UUID: &str = "tag-0001";

/// Fixed scan time so that camera offsets are deterministic
pub fn scan_time() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-03-14T09:30:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

/// Active, enrolled vehicle with a bound key and known appearance
pub fn enrolled_vehicle() -> RegistryVehicle {
    RegistryVehicle::new(TEST_PLATE)
        .with_public_key(TEST_PUBKEY)
        .with_appearance("Audi", "Black")
}

/// Clean scan of an enrolled tag
pub fn clean_scan(counter: u64) -> ScanEvent {
    ScanEvent {
        plate: Some(TEST_PLATE.to_string()),
        uuid: Some(TEST_TAG_UUID.to_string()),
        counter: Some(counter),
        sig_valid: Some(true),
        chal_valid: Some(true),
        pubkey_match: Some(true),
        tamper: Some(false),
        cloud_verdict: Some(CloudVerdict::Authentic),
        has_identity: Some(true),
        ..Default::default()
    }
}

pub fn strong_anpr() -> AnprEvent {
    AnprEvent::new(TEST_PLATE, scan_time(), Some(0.95))
}

pub fn strong_ai() -> AiEvent {
    AiEvent::new(Some(TEST_PLATE.to_string()), scan_time(), Some(0.95))
        .with_appearance("AUDI", "black")
}

/// Enrolled vehicle, clean scan advancing from `last_counter`, no cameras
pub fn matching_input(counter: u64, last_counter: u64) -> FusionInput {
    FusionInput {
        registry_vehicle: Some(enrolled_vehicle()),
        scan_event: Some(clean_scan(counter)),
        anpr_event: None,
        ai_event: None,
        last_counter: Some(last_counter),
    }
}

/// Scanner submission for the enrolled tag
pub fn tag_scan(counter: i64, at: DateTime<Utc>) -> ScanSubmission {
    ScanSubmission {
        plate: Some("bt55 wmo".to_string()),
        uuid: Some(TEST_TAG_UUID.to_string()),
        counter: Some(counter),
        pubkey_hex: Some(TEST_PUBKEY.to_lowercase()),
        pubkey_match: Some(true),
        timestamp: Some(at),
        ..Default::default()
    }
}

/// Scanner submission with no tag captured
pub fn tagless_scan(plate: &str, at: DateTime<Utc>) -> ScanSubmission {
    ScanSubmission {
        plate: Some(plate.to_string()),
        timestamp: Some(at),
        ..Default::default()
    }
}

pub fn anpr_read(plate: &str, offset_secs: i64, confidence: f64) -> AnprSubmission {
    AnprSubmission {
        plate: Some(plate.to_string()),
        timestamp: Some(scan_time() + Duration::seconds(offset_secs)),
        confidence: Some(confidence),
        ..Default::default()
    }
}

pub fn ai_read(plate: &str, offset_secs: i64, make: &str, colour: &str) -> AiSubmission {
    AiSubmission {
        plate: Some(plate.to_string()),
        timestamp: Some(scan_time() + Duration::seconds(offset_secs)),
        vehicle_conf: Some(0.95),
        make: Some(make.to_string()),
        colour: Some(colour.to_string()),
        ..Default::default()
    }
}

/// In-memory pipeline with the enrolled test vehicle
pub async fn pipeline_with_vehicle(config: FusionConfig) -> ScanPipeline {
    let pipeline = ScanPipeline::in_memory(config);
    pipeline
        .enroll(enrolled_vehicle())
        .await
        .expect("enroll test vehicle");
    pipeline
}

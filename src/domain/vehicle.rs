//! Registry vehicle records
//!
//! A [`RegistryVehicle`] is owned by the registry collaborator and is
//! read-only to the fusion engine.

use serde::{Deserialize, Serialize};

/// Lifecycle status string the registry uses for usable vehicles.
pub const STATUS_ACTIVE: &str = "ACTIVE";

/// Enrolled vehicle identity record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryVehicle {
    pub plate: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vin: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colour: Option<String>,

    /// GOT-ID enrollment flag. `None` means the registry row predates the
    /// column; see [`crate::engine::EnrollmentPolicy`].
    #[serde(default)]
    pub has_gotid: Option<bool>,

    /// Hex-encoded public key bound to this vehicle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,

    /// Lifecycle status (`ACTIVE`, `REVOKED`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub metadata: serde_json::Value,
}

impl RegistryVehicle {
    /// Create an ACTIVE, enrolled vehicle with the given plate.
    pub fn new(plate: impl Into<String>) -> Self {
        Self {
            plate: Some(plate.into()),
            has_gotid: Some(true),
            status: Some(STATUS_ACTIVE.to_string()),
            ..Default::default()
        }
    }

    pub fn with_public_key(mut self, public_key: impl Into<String>) -> Self {
        self.public_key = Some(public_key.into());
        self
    }

    pub fn with_appearance(mut self, make: impl Into<String>, colour: impl Into<String>) -> Self {
        self.make = Some(make.into());
        self.colour = Some(colour.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_has_gotid(mut self, has_gotid: Option<bool>) -> Self {
        self.has_gotid = has_gotid;
        self
    }

    /// Normalized lifecycle status; empty when the registry has none.
    pub fn normalized_status(&self) -> String {
        normalize_label(self.status.as_deref())
    }

    /// An empty status is treated as active.
    pub fn is_active(&self) -> bool {
        let status = self.normalized_status();
        status.is_empty() || status == STATUS_ACTIVE
    }

    /// Registry-bound plate in normalized form.
    pub fn normalized_plate(&self) -> String {
        normalize_plate(self.plate.as_deref())
    }

    /// Summary without key material or metadata, for operator responses.
    pub fn summary(&self) -> VehicleSummary {
        VehicleSummary {
            plate: self.plate.clone(),
            vin: self.vin.clone(),
            make: self.make.clone(),
            model: self.model.clone(),
            colour: self.colour.clone(),
            status: self.status.clone(),
        }
    }
}

/// Operator-facing projection of a [`RegistryVehicle`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleSummary {
    pub plate: Option<String>,
    pub vin: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub colour: Option<String>,
    pub status: Option<String>,
}

/// Uppercase a plate and strip every whitespace character.
pub fn normalize_plate(plate: Option<&str>) -> String {
    plate
        .unwrap_or_default()
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Trim and uppercase a free-text attribute (make, colour, status).
pub fn normalize_label(value: Option<&str>) -> String {
    value.unwrap_or_default().trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plate_normalization() {
        assert_eq!(normalize_plate(Some(" bt55 wmo ")), "BT55WMO");
        assert_eq!(normalize_plate(Some("ab\t12\ncd")), "AB12CD");
        assert_eq!(normalize_plate(None), "");
    }

    #[test]
    fn test_label_normalization() {
        assert_eq!(normalize_label(Some("  Audi ")), "AUDI");
        assert_eq!(normalize_label(None), "");
    }

    #[test]
    fn test_empty_status_is_active() {
        let mut vehicle = RegistryVehicle::new("BT55WMO");
        vehicle.status = None;
        assert!(vehicle.is_active());

        let vehicle = RegistryVehicle::new("BT55WMO").with_status(" active ");
        assert!(vehicle.is_active());

        let vehicle = RegistryVehicle::new("BT55WMO").with_status("REVOKED");
        assert!(!vehicle.is_active());
    }

    #[test]
    fn test_deserialize_sparse_row() {
        let vehicle: RegistryVehicle =
            serde_json::from_str(r#"{"plate":"BT55WMO","make":"AUDI"}"#).unwrap();
        assert_eq!(vehicle.has_gotid, None);
        assert_eq!(vehicle.make.as_deref(), Some("AUDI"));
        assert!(vehicle.metadata.is_null());
    }
}

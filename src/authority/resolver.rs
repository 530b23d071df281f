//! Cloud authority classification
//!
//! Resolves an observed public key and plate against the vehicle registry.
//! Lookup is key-first; the plate is consulted only when no key was
//! captured or the captured key is unknown.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::{normalize_plate, CloudAction, CloudVerdict, RegistryVehicle};
use crate::infra::{Result, VehicleRegistry};

use super::keys::{normalize_hex, KeyCandidates};

/// Outcome of identity resolution, handed to the fusion engine as
/// `cloud_verdict` plus the matched registry record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityResolution {
    pub verdict: CloudVerdict,
    pub action: CloudAction,
    pub vehicle: Option<RegistryVehicle>,
    /// Always at least one entry
    pub reasons: Vec<String>,
}

impl IdentityResolution {
    fn new(verdict: CloudVerdict, vehicle: Option<RegistryVehicle>, reasons: Vec<String>) -> Self {
        Self {
            verdict,
            action: verdict.action(),
            vehicle,
            reasons,
        }
    }
}

/// Classify an observed identity against the registry.
///
/// `observed_pubkey` and `observed_plate` may be empty; both are
/// normalized here.
#[instrument(skip(registry, observed_pubkey), fields(plate = %observed_plate))]
pub async fn resolve_identity<R>(
    registry: &R,
    observed_pubkey: &str,
    observed_plate: &str,
) -> Result<IdentityResolution>
where
    R: VehicleRegistry + ?Sized,
{
    let plate = normalize_plate(Some(observed_plate));
    let pubkey = normalize_hex(observed_pubkey);

    if pubkey.is_empty() {
        return resolve_without_key(registry, &plate).await;
    }

    let candidates = KeyCandidates::from_observed(&pubkey);
    if candidates.is_empty() {
        return Ok(IdentityResolution::new(
            CloudVerdict::InvalidIdentity,
            None,
            vec!["pubkey_hex invalid (no usable candidates).".to_string()],
        ));
    }

    let mut matched = None;
    for key in candidates.iter() {
        if let Some(vehicle) = registry.find_by_public_key(key).await? {
            debug!(candidate = key, "public key matched registry");
            matched = Some(vehicle);
            break;
        }
    }

    let Some(vehicle) = matched else {
        return resolve_unknown_key(registry, &plate).await;
    };

    if !vehicle.is_active() {
        let status = vehicle.normalized_status();
        return Ok(IdentityResolution::new(
            CloudVerdict::RevokedVehicle,
            Some(vehicle),
            vec![format!("Registry status={status}")],
        ));
    }

    let assigned = vehicle.normalized_plate();
    if !plate.is_empty() && !assigned.is_empty() && plate != assigned {
        return Ok(IdentityResolution::new(
            CloudVerdict::Mismatch,
            Some(vehicle),
            vec![format!(
                "Plate mismatch observed={plate} assigned={assigned}"
            )],
        ));
    }

    Ok(IdentityResolution::new(
        CloudVerdict::Authentic,
        Some(vehicle),
        vec!["Identity enrolled + ACTIVE; plate consistent.".to_string()],
    ))
}

async fn resolve_without_key<R>(registry: &R, plate: &str) -> Result<IdentityResolution>
where
    R: VehicleRegistry + ?Sized,
{
    let mut reasons =
        vec!["No pubkey_hex provided by scanner (tag missing / not captured).".to_string()];

    if plate.is_empty() {
        return Ok(IdentityResolution::new(
            CloudVerdict::UuidMissing,
            None,
            reasons,
        ));
    }

    match registry.find_by_plate(plate).await? {
        Some(vehicle) => {
            reasons.push(
                "Plate is enrolled but no GOT-ID identity was captured within scan window."
                    .to_string(),
            );
            Ok(IdentityResolution::new(
                CloudVerdict::UuidMissing,
                Some(vehicle),
                reasons,
            ))
        }
        None => {
            reasons.push(
                "Plate not found in registry (not enrolled / unknown vehicle).".to_string(),
            );
            Ok(IdentityResolution::new(
                CloudVerdict::UnregisteredVehicle,
                None,
                reasons,
            ))
        }
    }
}

async fn resolve_unknown_key<R>(registry: &R, plate: &str) -> Result<IdentityResolution>
where
    R: VehicleRegistry + ?Sized,
{
    let unregistered = || {
        IdentityResolution::new(
            CloudVerdict::UnregisteredIdentity,
            None,
            vec!["Identity not enrolled in cloud registry.".to_string()],
        )
    };

    if plate.is_empty() {
        return Ok(unregistered());
    }

    match registry.find_by_plate(plate).await? {
        Some(vehicle) => Ok(IdentityResolution::new(
            CloudVerdict::KeyMismatch,
            Some(vehicle),
            vec![format!(
                "Plate {plate} is enrolled, but pubkey_hex is not enrolled/matching. Possible clone."
            )],
        )),
        None => Ok(unregistered()),
    }
}

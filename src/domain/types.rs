//! Closed verdict vocabularies for GOT-ID fusion
//!
//! Every enum here serializes to the SCREAMING_SNAKE_CASE wire names used by
//! scanners, the registry and officer-facing tooling.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity-resolution outcome computed by matching an observed public key
/// and plate against the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CloudVerdict {
    /// Key enrolled, vehicle ACTIVE, plate consistent
    Authentic,
    /// Key enrolled but bound to a different plate
    Mismatch,
    /// Key enrolled but the vehicle is not ACTIVE
    RevokedVehicle,
    /// No key captured and the plate is not in the registry
    UnregisteredVehicle,
    /// Key captured but neither key nor plate is enrolled
    UnregisteredIdentity,
    /// Captured key is not usable hex
    InvalidIdentity,
    /// Plate enrolled under a different key (clone suspected)
    KeyMismatch,
    /// Identity expected but not captured
    UuidMissing,
}

impl CloudVerdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            CloudVerdict::Authentic => "AUTHENTIC",
            CloudVerdict::Mismatch => "MISMATCH",
            CloudVerdict::RevokedVehicle => "REVOKED_VEHICLE",
            CloudVerdict::UnregisteredVehicle => "UNREGISTERED_VEHICLE",
            CloudVerdict::UnregisteredIdentity => "UNREGISTERED_IDENTITY",
            CloudVerdict::InvalidIdentity => "INVALID_IDENTITY",
            CloudVerdict::KeyMismatch => "KEY_MISMATCH",
            CloudVerdict::UuidMissing => "UUID_MISSING",
        }
    }

    /// Operator action that accompanies this verdict.
    pub fn action(&self) -> CloudAction {
        match self {
            CloudVerdict::Authentic => CloudAction::None,
            CloudVerdict::Mismatch | CloudVerdict::KeyMismatch | CloudVerdict::RevokedVehicle => {
                CloudAction::Stop
            }
            CloudVerdict::InvalidIdentity => CloudAction::StopInvestigate,
            CloudVerdict::UuidMissing
            | CloudVerdict::UnregisteredVehicle
            | CloudVerdict::UnregisteredIdentity => CloudAction::Investigate,
        }
    }
}

impl fmt::Display for CloudVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Roadside action recommended alongside a [`CloudVerdict`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CloudAction {
    None,
    Investigate,
    Stop,
    StopInvestigate,
}

/// Canonical crypto-and-registry outcome of a single scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FusionVerdict {
    Match,
    UuidMissing,
    Mismatch,
    MismatchPubkey,
    CryptoFail,
    CounterRollback,
    Tamper,
    NotEnrolled,
    UnknownTag,
}

impl FusionVerdict {
    pub const ALL: [FusionVerdict; 9] = [
        FusionVerdict::Match,
        FusionVerdict::UuidMissing,
        FusionVerdict::Mismatch,
        FusionVerdict::MismatchPubkey,
        FusionVerdict::CryptoFail,
        FusionVerdict::CounterRollback,
        FusionVerdict::Tamper,
        FusionVerdict::NotEnrolled,
        FusionVerdict::UnknownTag,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FusionVerdict::Match => "MATCH",
            FusionVerdict::UuidMissing => "UUID_MISSING",
            FusionVerdict::Mismatch => "MISMATCH",
            FusionVerdict::MismatchPubkey => "MISMATCH_PUBKEY",
            FusionVerdict::CryptoFail => "CRYPTO_FAIL",
            FusionVerdict::CounterRollback => "COUNTER_ROLLBACK",
            FusionVerdict::Tamper => "TAMPER",
            FusionVerdict::NotEnrolled => "NOT_ENROLLED",
            FusionVerdict::UnknownTag => "UNKNOWN_TAG",
        }
    }
}

impl fmt::Display for FusionVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Officer-facing label combining the fusion verdict and visual confidence.
///
/// `NotEnrolled`, `UnknownTag` and `UuidMissing` are pass-through labels that
/// echo the verdict unchanged; `Unknown` is reserved for an absent verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinalLabel {
    MatchStrong,
    MatchWeakVisual,
    CloneMissingTagStrong,
    CloneMissingTagWeak,
    CloneSuspect,
    CloneCrypto,
    TamperStrong,
    TamperWeak,
    NotEnrolled,
    UnknownTag,
    UuidMissing,
    Unknown,
}

impl FinalLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            FinalLabel::MatchStrong => "MATCH_STRONG",
            FinalLabel::MatchWeakVisual => "MATCH_WEAK_VISUAL",
            FinalLabel::CloneMissingTagStrong => "CLONE_MISSING_TAG_STRONG",
            FinalLabel::CloneMissingTagWeak => "CLONE_MISSING_TAG_WEAK",
            FinalLabel::CloneSuspect => "CLONE_SUSPECT",
            FinalLabel::CloneCrypto => "CLONE_CRYPTO",
            FinalLabel::TamperStrong => "TAMPER_STRONG",
            FinalLabel::TamperWeak => "TAMPER_WEAK",
            FinalLabel::NotEnrolled => "NOT_ENROLLED",
            FinalLabel::UnknownTag => "UNKNOWN_TAG",
            FinalLabel::UuidMissing => "UUID_MISSING",
            FinalLabel::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for FinalLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Qualitative grade of camera-based corroboration.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VisualConfidence {
    #[default]
    None,
    Weak,
    Medium,
    Strong,
}

impl VisualConfidence {
    /// Grade an accumulated visual score.
    pub fn from_score(score: u32) -> Self {
        match score {
            s if s >= 4 => VisualConfidence::Strong,
            s if s >= 2 => VisualConfidence::Medium,
            1 => VisualConfidence::Weak,
            _ => VisualConfidence::None,
        }
    }

    /// MEDIUM and STRONG both count as corroborating for label purposes.
    pub fn is_corroborating(&self) -> bool {
        matches!(self, VisualConfidence::Medium | VisualConfidence::Strong)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VisualConfidence::None => "NONE",
            VisualConfidence::Weak => "WEAK",
            VisualConfidence::Medium => "MEDIUM",
            VisualConfidence::Strong => "STRONG",
        }
    }
}

impl fmt::Display for VisualConfidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of comparing the current counter against the last observed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReplayOutcome {
    /// One of the two counters is absent
    NotCompared,
    Advanced,
    /// Counter equal to the previous one
    Stalled,
    /// Counter strictly below the previous one
    Rollback,
}

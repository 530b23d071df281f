//! Runtime configuration for the scan pipeline.

use chrono::Duration;

use crate::engine::{EnrollmentPolicy, FusionPolicy, DEFAULT_ENROLLMENT_POLICY};
use crate::intake::DEFAULT_MAX_COUNTER;

pub const DEFAULT_CORRELATION_WINDOW_SECS: i64 = 10;
pub const DEFAULT_UUID_MISSING_DEDUP_SECS: i64 = 30;

/// Pipeline configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FusionConfig {
    /// Camera reads are joined to a scan when strictly within this window
    pub correlation_window: Duration,
    /// Repeated UUID_MISSING results for a plate within this window are
    /// suppressed. Zero disables suppression.
    pub uuid_missing_dedup: Duration,
    pub enrollment: EnrollmentPolicy,
    /// Scan counters above this are clamped
    pub max_counter: u64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            correlation_window: Duration::seconds(DEFAULT_CORRELATION_WINDOW_SECS),
            uuid_missing_dedup: Duration::seconds(DEFAULT_UUID_MISSING_DEDUP_SECS),
            enrollment: DEFAULT_ENROLLMENT_POLICY,
            max_counter: DEFAULT_MAX_COUNTER,
        }
    }
}

impl FusionConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let correlation_secs: i64 = std::env::var("FUSION_CORRELATION_WINDOW_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|v: &i64| *v > 0)
            .unwrap_or(DEFAULT_CORRELATION_WINDOW_SECS);

        let dedup_secs: i64 = std::env::var("FUSION_UUID_MISSING_DEDUP_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|v: &i64| *v >= 0)
            .unwrap_or(DEFAULT_UUID_MISSING_DEDUP_SECS);

        let assume_enrolled = std::env::var("FUSION_ASSUME_ENROLLED")
            .ok()
            .map(|v| {
                !matches!(
                    v.trim().to_ascii_lowercase().as_str(),
                    "0" | "false" | "off"
                )
            })
            .unwrap_or(true);

        let max_counter: u64 = std::env::var("FUSION_MAX_COUNTER")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_COUNTER);

        Self {
            correlation_window: Duration::seconds(correlation_secs),
            uuid_missing_dedup: Duration::seconds(dedup_secs),
            enrollment: if assume_enrolled {
                EnrollmentPolicy::AssumeEnrolled
            } else {
                EnrollmentPolicy::RequireExplicit
            },
            max_counter,
        }
    }

    pub fn policy(&self) -> FusionPolicy {
        FusionPolicy {
            enrollment: self.enrollment,
        }
    }

    pub fn dedup_enabled(&self) -> bool {
        self.uuid_missing_dedup > Duration::zero()
    }
}

//! GOT-ID Identity Fusion Library
//!
//! Anti-clone verdict engine for roadside vehicle checks. Fuses a scanned
//! GOT-ID identity, the cloud registry record and camera reads into one
//! verdict and an officer-facing label.
//!
//! ## Modules
//!
//! - [`domain`] - Core domain types (vehicles, scans, camera reads, results)
//! - [`authority`] - Identity resolution against the vehicle registry
//! - [`engine`] - Pure fusion engine (replay guard, classifier, visual correlation, labels)
//! - [`intake`] - Scanner and camera submission normalization
//! - [`infra`] - Collaborator traits, in-memory stores and the scan pipeline
//! - [`config`] - Environment configuration
//! - [`metrics`] - Verdict and label counters
//! - [`telemetry`] - Logging setup

pub mod authority;
pub mod config;
pub mod domain;
pub mod engine;
pub mod infra;
pub mod intake;
pub mod metrics;
pub mod telemetry;

// Re-export commonly used types
pub use domain::{
    AiEvent, AnprEvent, CloudAction, CloudVerdict, FinalLabel, FusedResult, FusionInput,
    FusionVerdict, RegistryVehicle, ScanEvent, VisualConfidence,
};

pub use authority::{resolve_identity, IdentityResolution};
pub use config::FusionConfig;
pub use engine::{decide_fusion, FusionEngine, FusionPolicy};
pub use infra::{FusionError, Result, ScanOutcome, ScanPipeline};

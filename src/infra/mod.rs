//! Infrastructure layer for GOT-ID fusion
//!
//! Contains trait definitions and implementations for:
//! - Vehicle registry (enrollment, key and plate lookup)
//! - Camera observations (ANPR and AI reads, temporal join)
//! - Scan log (counter history)
//! - Fusion results (conditional write with de-duplication)
//! - The scan pipeline that drives one engine invocation

mod error;
mod memory;
mod pipeline;
mod records;
mod traits;

pub use error::*;
pub use memory::{
    InMemoryFusionStore, InMemoryObservationStore, InMemoryScanStore, InMemoryVehicleRegistry,
};
pub use pipeline::{ScanOutcome, ScanPipeline};
pub use records::*;
pub use traits::*;

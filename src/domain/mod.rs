//! Domain models for GOT-ID identity fusion
//!
//! Registry records, observation events, verdict vocabularies and the
//! engine's input/output envelopes.

mod event;
mod fused;
mod types;
mod vehicle;

pub use event::*;
pub use fused::*;
pub use types::*;
pub use vehicle::*;

//! Cloud master authority: identity resolution against the vehicle registry
//!
//! - [`keys`] - public key normalization and `04`-prefix candidates
//! - [`resolve_identity`] - key-first registry classification

pub mod keys;
mod resolver;

pub use keys::{is_hex, normalize_hex, KeyCandidates, UNCOMPRESSED_POINT_PREFIX};
pub use resolver::{resolve_identity, IdentityResolution};

//! lmi.score_request.v1 boundary
//!
//! This module validates incoming score requests before they reach the
//! engine. Only a body that is not a JSON object (or not JSON at all) is
//! rejected; every field inside is defaulted or clamped when unusable.

mod adapter;
pub mod fields;

pub use adapter::*;

/// Current request schema version
pub const REQUEST_SCHEMA_VERSION: &str = "lmi.score_request.v1";

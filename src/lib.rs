//! Life Morale - deterministic scoring engine for weekly morale check-ins
//!
//! The engine turns a 24-question survey and a weekly time map into a single
//! Life Morale Index through a fixed pipeline: answer calibration → dimension
//! aggregation → time-weighted blend → Residual Influence and emotional
//! ceiling adjustment. Top drainers and uplifters are ranked alongside.
//!
//! ## Surfaces
//!
//! - **Typed API**: [`score_lmi`] on a [`ScoreInput`]
//! - **JSON API**: [`score_json`] and [`LmiEngine`] (lmi.score_request.v1)
//! - **C ABI**: the `lmi_*` functions in [`ffi`]

pub mod adjustment;
pub mod blend;
pub mod calibration;
pub mod config;
pub mod dimensions;
pub mod encoder;
pub mod error;
pub mod pipeline;
pub mod ranking;
pub mod schema;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use config::{EliModel, ScoringConfig};
pub use encoder::{ReportEncoder, ScoreReport};
pub use error::ScoreError;
pub use pipeline::{score_json, score_lmi, LmiEngine};
pub use schema::{RequestAdapter, REQUEST_SCHEMA_VERSION};
pub use types::{Answer, InputFlag, ScoreInput, ScoreOutput, TimeCategory, TimeRow};

/// Engine version embedded in every report
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for score reports
pub const PRODUCER_NAME: &str = "life-morale";

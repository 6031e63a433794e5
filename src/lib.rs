//! Senz Core - compute engine for senz sensor probability data
//!
//! Senz Core turns time-stamped multi-sensor readings into the inputs of a
//! behavior-recognition pipeline through three pure computations, each run
//! as request adaptation → compute → response encoding:
//!
//! - **Alignment**: pick the richest timeline as primary and match every other
//!   timeline's nearest event to each primary event
//! - **Scale refinement**: densify a sparse per-scale sequence of probability
//!   records, wrapping around the scale where needed
//! - **Joint ranking**: combine motion, location and sound distributions into
//!   ranked joint hypotheses, exhaustively or with a top-N approximation

pub mod align;
pub mod config;
pub mod encoder;
pub mod error;
pub mod pipeline;
pub mod rank;
pub mod scale;
pub mod schema;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use config::Config;
pub use encoder::Envelope;
pub use error::SenzError;
pub use pipeline::{
    align_timelines_json, rank_joint_json, refine_scale_json, Operation, SenzProcessor,
};
pub use schema::{AlignRequest, RankRequest, RefineRequest, RequestAdapter};

/// Senz Core version
pub const SENZ_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name reported by the CLI
pub const PRODUCER_NAME: &str = "senz-core";

//! Request schema
//!
//! Typed requests for align, refine and rank, and the adapter that builds
//! them from JSON bodies with per-key validation.

mod adapter;
mod request;

pub use adapter::*;
pub use request::*;

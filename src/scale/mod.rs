//! Scale refinement module
//!
//! Densifies per-scale (minute, ten-minute, half-hour, hour) sequences of senz
//! probability records, filling small gaps and rejecting batches with large
//! ones. Windows may wrap around the end of the scale.

pub mod blend;
pub mod refine;
pub mod window;

pub use blend::{arithmetic_average, collect_probs, DEFAULT_WEIGHT};
pub use refine::{check_blank_condition, refine, MAX_BLANK};
pub use window::ScaleWindow;

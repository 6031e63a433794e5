//! Typed requests for the three operations
//!
//! These are what the adapter produces from raw JSON bodies. Optional values
//! stay optional here; defaults come from the processor's configuration.

use crate::types::{ProbSlot, ScaleRecord, ScaleType, Strategy, TimelineSet};

/// Align secondary timelines onto a primary one
#[derive(Debug, Clone, PartialEq)]
pub struct AlignRequest {
    /// Squared-distance tolerance for a genuine match
    pub filter: f64,
    pub timelines: TimelineSet,
    /// Fallback primary key when no timeline qualifies
    pub primary_key: Option<String>,
}

/// Refine a sparse per-scale sequence over `[start, end]`
#[derive(Debug, Clone, PartialEq)]
pub struct RefineRequest {
    pub scale_type: ScaleType,
    pub start: i64,
    pub end: i64,
    pub records: Vec<ScaleRecord>,
}

/// Rank joint hypotheses over per-slot distributions
#[derive(Debug, Clone, PartialEq)]
pub struct RankRequest {
    pub slots: Vec<ProbSlot>,
    pub strategy: Strategy,
    /// `mutiMaxNum`: hypotheses to keep (exhaustive) or N (top-N)
    pub max_num: Option<usize>,
    pub log_floor: Option<f64>,
}

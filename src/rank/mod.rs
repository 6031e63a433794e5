//! Joint probability ranking module
//!
//! Combines per-slot motion, location and sound distributions into ranked
//! joint hypotheses, either exhaustively or with the top-N approximation.

pub mod exact;
pub mod top_n;

pub use exact::{rank_exact, slot_candidates};
pub use top_n::{rank_top_n, slot_top_candidates, ZERO_PROB_SUBSTITUTE};

use crate::error::SenzError;
use crate::types::{JointHypothesis, ProbSlot, Strategy};

/// Rank `slots` with `strategy` and keep at most `max_num` hypotheses.
///
/// Exhaustive results are sorted by probability, highest first; top-N
/// results keep their rank order.
pub fn rank(
    slots: &[ProbSlot],
    strategy: Strategy,
    max_num: usize,
    log_floor: f64,
) -> Result<Vec<JointHypothesis>, SenzError> {
    match strategy {
        Strategy::SelectMaxProb => {
            let mut hypotheses = rank_exact(slots, log_floor);
            hypotheses.sort_by(|a, b| b.prob.total_cmp(&a.prob));
            hypotheses.truncate(max_num);
            Ok(hypotheses)
        }
        Strategy::SelectMaxNProb => rank_top_n(slots, max_num, log_floor),
    }
}

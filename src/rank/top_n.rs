//! Quick top-N joint ranking
//!
//! Instead of enumerating every label triple, each slot contributes at most
//! `top_n` candidates: the i-th candidate pairs the i-th most likely label of
//! every category. Hypothesis i is then the i-th surviving candidate of each
//! slot, in slot order.

use crate::error::SenzError;
use crate::types::{Category, JointHypothesis, ProbSlot, SenzSelection};
use tracing::debug;

/// Stand-in for zero probabilities so the logarithm stays finite
pub const ZERO_PROB_SUBSTITUTE: f64 = 1e-128;

/// The i-th ranked label of one category, clamped to its last label
fn nth_label(ranked: &[(&str, f64)], i: usize) -> (String, f64) {
    let (label, prob) = ranked[i.min(ranked.len() - 1)];
    let prob = if prob == 0.0 {
        ZERO_PROB_SUBSTITUTE
    } else {
        prob
    };
    (label.to_string(), prob)
}

/// Up to `top_n` rank-aligned candidates of `slot` above `log_floor`.
///
/// `slot_index` is only used to report an empty category.
pub fn slot_top_candidates(
    slot: &ProbSlot,
    slot_index: usize,
    top_n: usize,
    log_floor: f64,
) -> Result<Vec<SenzSelection>, SenzError> {
    let mut ranked = Vec::with_capacity(Category::ALL.len());
    for category in Category::ALL {
        let dist = slot.distribution(category);
        if dist.is_empty() {
            return Err(SenzError::EmptyDistribution {
                slot: slot_index,
                category: category.as_str().to_string(),
            });
        }
        ranked.push(dist.ranked());
    }

    let mut candidates = Vec::new();
    for i in 0..top_n {
        let (motion, motion_prob) = nth_label(&ranked[0], i);
        let (location, location_prob) = nth_label(&ranked[1], i);
        let (sound, sound_prob) = nth_label(&ranked[2], i);

        let prob = motion_prob.ln() + location_prob.ln() + sound_prob.ln();
        if prob > log_floor {
            candidates.push(SenzSelection {
                motion,
                location,
                sound,
                prob,
                extra: slot.extra.clone(),
            });
        }
    }

    Ok(candidates)
}

/// At most `top_n` joint hypotheses, in rank order.
///
/// Hypothesis i takes the i-th surviving candidate of every slot that has
/// one. Slots with fewer survivors are skipped, so a hypothesis may cover
/// fewer slots than the input; hypotheses covering none are dropped.
pub fn rank_top_n(
    slots: &[ProbSlot],
    top_n: usize,
    log_floor: f64,
) -> Result<Vec<JointHypothesis>, SenzError> {
    let per_slot = slots
        .iter()
        .enumerate()
        .map(|(index, slot)| slot_top_candidates(slot, index, top_n, log_floor))
        .collect::<Result<Vec<_>, _>>()?;

    let mut hypotheses = Vec::new();
    for i in 0..top_n {
        let mut senz_list = Vec::new();
        let mut prob = 0.0;
        for candidates in &per_slot {
            if let Some(selection) = candidates.get(i) {
                prob += selection.prob;
                senz_list.push(selection.clone());
            }
        }

        if !senz_list.is_empty() {
            hypotheses.push(JointHypothesis { senz_list, prob });
        }
    }

    debug!(
        slots = slots.len(),
        top_n,
        hypotheses = hypotheses.len(),
        "ranked top-N joint hypotheses"
    );

    Ok(hypotheses)
}

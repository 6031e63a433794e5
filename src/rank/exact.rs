//! Exhaustive joint ranking
//!
//! Every (motion, location, sound) triple of every slot is scored, and the
//! per-slot candidates are combined slot by slot into full-sequence
//! hypotheses. Anything at or below the log floor is pruned at each step.

use crate::types::{JointHypothesis, ProbSlot, SenzSelection};
use tracing::debug;

/// Every label triple of `slot` whose log-probability exceeds `log_floor`
pub fn slot_candidates(slot: &ProbSlot, log_floor: f64) -> Vec<SenzSelection> {
    let mut candidates = Vec::new();

    for (motion, motion_prob) in slot.motion.iter() {
        for (location, location_prob) in slot.location.iter() {
            for (sound, sound_prob) in slot.sound.iter() {
                let prob = motion_prob.ln() + location_prob.ln() + sound_prob.ln();
                if prob > log_floor {
                    candidates.push(SenzSelection {
                        motion: motion.to_string(),
                        location: location.to_string(),
                        sound: sound.to_string(),
                        prob,
                        extra: slot.extra.clone(),
                    });
                }
            }
        }
    }

    candidates
}

/// Extend every hypothesis of `frontier` by every candidate of the next slot,
/// keeping combinations above `log_floor`
fn expand(
    frontier: Vec<JointHypothesis>,
    candidates: &[SenzSelection],
    log_floor: f64,
) -> Vec<JointHypothesis> {
    frontier
        .iter()
        .flat_map(|hypothesis| {
            candidates
                .iter()
                .filter(move |c| hypothesis.prob + c.prob > log_floor)
                .map(move |c| hypothesis.extended(c))
        })
        .collect()
}

/// All joint hypotheses over `slots` whose cumulative log-probability
/// exceeds `log_floor`. The result is unordered.
pub fn rank_exact(slots: &[ProbSlot], log_floor: f64) -> Vec<JointHypothesis> {
    let Some((first, rest)) = slots.split_first() else {
        return Vec::new();
    };

    let mut frontier: Vec<JointHypothesis> = slot_candidates(first, log_floor)
        .into_iter()
        .map(JointHypothesis::seed)
        .collect();

    for (index, slot) in rest.iter().enumerate() {
        let candidates = slot_candidates(slot, log_floor);
        frontier = expand(frontier, &candidates, log_floor);
        debug!(
            slot = index + 1,
            candidates = candidates.len(),
            frontier = frontier.len(),
            "expanded joint hypotheses"
        );
        if frontier.is_empty() {
            break;
        }
    }

    frontier
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProbDist;

    fn dist(pairs: &[(&str, f64)]) -> ProbDist {
        pairs.iter().copied().collect()
    }

    fn running_slot() -> ProbSlot {
        ProbSlot::new(
            dist(&[("Running", 1.29321983128e-78)]),
            dist(&[("school", 3.14)]),
            dist(&[("talk", 2.3324e-12)]),
        )
    }

    fn walking_slot() -> ProbSlot {
        ProbSlot::new(
            dist(&[
                ("Riding", 9.94268884532027e-11),
                ("Walking", 0.8979591835334749),
                ("Running", 0.08163265323813619),
                ("Driving", 0.02040816312895674),
                ("Sitting", 7.69994010250898e-98),
            ]),
            dist(&[("restaurant", 0.213423), ("resident", 0.235434542)]),
            dist(&[("talk", 0.234234523454)]),
        )
    }

    #[test]
    fn test_slot_candidates_single_triple() {
        let slot = running_slot();
        let candidates = slot_candidates(&slot, 1e-90f64.ln());
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].motion, "Running");
        assert_eq!(candidates[0].location, "school");
        assert_eq!(candidates[0].sound, "talk");
        assert!((candidates[0].prob - -204.9844026873817).abs() < 1e-9);

        assert!(slot_candidates(&slot, 1e-70f64.ln()).is_empty());
    }

    #[test]
    fn test_slot_candidates_prunes_below_floor() {
        let slot = walking_slot();
        let candidates = slot_candidates(&slot, 1e-30f64.ln());
        // Sitting is far below the floor; the other four motions pair with
        // both locations
        assert_eq!(candidates.len(), 8);
        assert!(candidates.iter().all(|c| c.motion != "Sitting"));

        let walking_resident = candidates
            .iter()
            .find(|c| c.motion == "Walking" && c.location == "resident")
            .unwrap();
        assert!((walking_resident.prob - -3.0053854503466702).abs() < 1e-9);

        assert!(slot_candidates(&slot, 0.0).is_empty());
    }

    #[test]
    fn test_zero_probability_is_pruned() {
        let slot = ProbSlot::new(
            dist(&[("Walking", 0.0), ("Sitting", 1.0)]),
            dist(&[("home", 1.0)]),
            dist(&[("quiet", 1.0)]),
        );
        let candidates = slot_candidates(&slot, 1e-30f64.ln());
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].motion, "Sitting");
    }

    #[test]
    fn test_rank_exact_combines_slots() {
        let slots = vec![walking_slot(), walking_slot()];
        let floor = 1e-30f64.ln();
        let hypotheses = rank_exact(&slots, floor);

        // 8 x 8 combinations, minus those crossing the floor
        assert!(!hypotheses.is_empty());
        assert!(hypotheses.len() <= 64);
        for h in &hypotheses {
            assert_eq!(h.senz_list.len(), 2);
            assert!(h.prob > floor);
            let sum: f64 = h.senz_list.iter().map(|s| s.prob).sum();
            assert!((h.prob - sum).abs() < 1e-9);
        }

        let best = hypotheses
            .iter()
            .max_by(|a, b| a.prob.total_cmp(&b.prob))
            .unwrap();
        assert!(best.senz_list.iter().all(|s| s.motion == "Walking"));
        assert!((best.prob - 2.0 * -3.0053854503466702).abs() < 1e-9);
    }

    #[test]
    fn test_rank_exact_cumulative_floor() {
        // Each slot alone survives, but two together fall below the floor
        let slots = vec![running_slot(), running_slot()];
        assert_eq!(rank_exact(&slots[..1], 1e-90f64.ln()).len(), 1);
        assert!(rank_exact(&slots, 1e-90f64.ln()).is_empty());
    }

    #[test]
    fn test_rank_exact_empty_inputs() {
        assert!(rank_exact(&[], 1e-30f64.ln()).is_empty());

        let empty_sound = ProbSlot::new(
            dist(&[("Walking", 1.0)]),
            dist(&[("home", 1.0)]),
            ProbDist::new(),
        );
        assert!(rank_exact(&[walking_slot(), empty_sound], 1e-30f64.ln()).is_empty());
    }

    #[test]
    fn test_rank_exact_carries_slot_fields() {
        let mut slot = running_slot();
        slot.extra
            .insert("timestamp".to_string(), serde_json::json!(1297923712));
        let hypotheses = rank_exact(&[slot], 1e-90f64.ln());
        assert_eq!(hypotheses[0].senz_list[0].extra["timestamp"], 1297923712);
    }
}

use proptest::prelude::*;
use std::collections::BTreeMap;

use senz_core::align::{align, find_nearest};
use senz_core::rank::{rank_exact, rank_top_n};
use senz_core::scale::{collect_probs, refine, ScaleWindow};
use senz_core::types::{Event, ProbDist, ProbFields, ProbSlot, ScaleRecord, ScaleType, SenzId, TimelineSet};

fn dist_strategy() -> impl Strategy<Value = ProbDist> {
    prop::collection::btree_map("[a-e]", 0.001f64..1.0, 1..4)
        .prop_map(|labels: BTreeMap<String, f64>| labels.into_iter().collect())
}

fn slot_strategy() -> impl Strategy<Value = ProbSlot> {
    (dist_strategy(), dist_strategy(), dist_strategy())
        .prop_map(|(motion, location, sound)| ProbSlot::new(motion, location, sound))
}

fn scale_strategy() -> impl Strategy<Value = ScaleType> {
    prop::sample::select(ScaleType::ALL.to_vec())
}

proptest! {
    #[test]
    fn empty_secondary_is_always_counterfeit(
        timestamps in prop::collection::vec(-1_000_000i64..1_000_000, 1..20),
        tolerance in 0.0f64..1e6,
    ) {
        let mut timelines = TimelineSet::new();
        timelines.insert("PK".to_string(), timestamps.iter().map(|&t| Event::new(t)).collect());
        timelines.insert("SK".to_string(), Vec::new());

        let tuples = align("PK", &timelines, tolerance).unwrap();
        prop_assert_eq!(tuples.len(), timestamps.len());
        for (tuple, &timestamp) in tuples.iter().zip(&timestamps) {
            prop_assert!(tuple["SK"].is_counterfeit());
            prop_assert_eq!(tuple["SK"].timestamp, timestamp);
        }
    }

    #[test]
    fn nearest_is_a_closest_timestamp(
        target in -1000i64..1000,
        mut sorted in prop::collection::vec(-1000i64..1000, 1..30),
    ) {
        sorted.sort_unstable();
        let nearest = find_nearest(target, &sorted).unwrap();
        prop_assert!(sorted.contains(&nearest));
        let best = sorted.iter().map(|t| (t - target).abs()).min().unwrap();
        prop_assert_eq!((nearest - target).abs(), best);
    }

    #[test]
    fn self_blend_is_identity(dist in dist_strategy()) {
        let blended = collect_probs(&[&dist], &[&dist], 0.5);
        prop_assert_eq!(blended.len(), dist.len());
        for (label, prob) in dist.iter() {
            let got = blended.get(label).unwrap();
            prop_assert!((got - prob).abs() < 1e-12);
        }
    }

    #[test]
    fn exact_ranking_respects_floor(
        slots in prop::collection::vec(slot_strategy(), 0..4),
        floor_exp in 1i32..12,
    ) {
        let floor = 10f64.powi(-floor_exp).ln();
        for hypothesis in rank_exact(&slots, floor) {
            prop_assert!(hypothesis.prob > floor);
            prop_assert_eq!(hypothesis.senz_list.len(), slots.len());
        }
    }

    #[test]
    fn top_n_never_exceeds_n(
        slots in prop::collection::vec(slot_strategy(), 0..5),
        top_n in 0usize..6,
    ) {
        let hypotheses = rank_top_n(&slots, top_n, 1e-30f64.ln()).unwrap();
        prop_assert!(hypotheses.len() <= top_n);
        for hypothesis in &hypotheses {
            prop_assert!(!hypothesis.senz_list.is_empty());
            prop_assert!(hypothesis.senz_list.len() <= slots.len());
        }
    }

    #[test]
    fn wrap_unwrap_round_trip(
        scale_type in scale_strategy(),
        start_frac in 0.0f64..1.0,
        end_frac in 0.0f64..1.0,
        bucket_frac in 0.0f64..1.0,
    ) {
        let pick = |frac: f64| (frac * scale_type.modulus() as f64) as i64;
        let (start, end, bucket) = (pick(start_frac), pick(end_frac), pick(bucket_frac));
        prop_assume!(start != end);

        let window = ScaleWindow::new(scale_type, start, end).unwrap().unwrap();
        if let Some(linear) = window.to_linear(bucket) {
            prop_assert!(linear >= window.start() && linear <= window.linear_end());
            prop_assert_eq!(window.to_bucket(linear), bucket);
        }
    }

    #[test]
    fn refined_output_covers_window_or_is_empty(
        start in 0i64..24,
        end in 0i64..24,
        buckets in prop::collection::vec(0i64..24, 0..12),
    ) {
        let records: Vec<ScaleRecord> = buckets
            .iter()
            .enumerate()
            .map(|(i, &bucket)| {
                let mut fields = ProbFields::new();
                fields.insert("motionProb".to_string(), [("Walking", 0.6), ("Sitting", 0.4)].into_iter().collect());
                ScaleRecord { bucket, timestamp: 1000 * i as i64, senz_id: SenzId::Int(i as i64), fields }
            })
            .collect();

        let refined = refine(ScaleType::PerHourScale, start, end, &records).unwrap();
        if start == end || refined.is_empty() {
            return Ok(());
        }

        let window = ScaleWindow::new(ScaleType::PerHourScale, start, end).unwrap().unwrap();
        prop_assert_eq!(refined.len(), window.bucket_count());
        for (offset, record) in refined.iter().enumerate() {
            prop_assert_eq!(record.bucket, window.to_bucket(start + offset as i64));
        }
    }
}

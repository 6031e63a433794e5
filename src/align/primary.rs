//! Primary timeline selection

use crate::align::measures::{generate_measures, SequenceMeasures};
use crate::error::SenzError;
use crate::types::TimelineSet;
use tracing::{debug, info, warn};

/// Pick the timeline with the best measures.
///
/// Empty timelines are ignored. Candidates are scored by the product of their
/// measures; if every product is zero the sum is used instead. Returns `None`
/// when no timeline qualifies (all empty, or every sum is zero). Equal scores
/// go to the first timeline by name.
pub fn choose_primary(timelines: &TimelineSet) -> Option<String> {
    let (names, sequences): (Vec<&String>, Vec<Vec<i64>>) = timelines
        .iter()
        .filter(|(_, events)| !events.is_empty())
        .map(|(name, events)| {
            let mut timestamps: Vec<i64> = events.iter().map(|e| e.timestamp).collect();
            timestamps.sort_unstable();
            (name, timestamps)
        })
        .unzip();

    if names.is_empty() {
        return None;
    }

    let measures = generate_measures(&sequences);
    debug!(?names, ?measures, "timeline measures");

    let mut scores: Vec<u128> = measures.iter().map(SequenceMeasures::product).collect();
    if scores.iter().all(|&s| s == 0) {
        scores = measures.iter().map(SequenceMeasures::sum).collect();
    }

    let (best_index, best_score) = scores
        .iter()
        .enumerate()
        .fold((0, 0u128), |(best_i, best_s), (i, &s)| {
            if s > best_s {
                (i, s)
            } else {
                (best_i, best_s)
            }
        });

    if best_score == 0 {
        return None;
    }

    Some(names[best_index].clone())
}

/// Resolve the primary key, falling back to the caller's choice.
///
/// Fails when nothing qualifies and no fallback is given, or when the
/// resulting key does not name a timeline.
pub fn resolve_primary(
    timelines: &TimelineSet,
    fallback: Option<&str>,
) -> Result<String, SenzError> {
    let primary_key = match choose_primary(timelines) {
        Some(key) => key,
        None => {
            let key = fallback.ok_or(SenzError::NoPrimaryTimeline)?;
            warn!(primary_key = key, "no timeline qualifies, using fallback key");
            key.to_string()
        }
    };

    if !timelines.contains_key(&primary_key) {
        return Err(SenzError::UnknownTimeline(primary_key));
    }

    info!(primary_key = %primary_key, "chose primary timeline");
    Ok(primary_key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Event;

    fn timeline(timestamps: &[i64]) -> Vec<Event> {
        timestamps.iter().map(|&t| Event::new(t)).collect()
    }

    fn timelines(entries: &[(&str, &[i64])]) -> TimelineSet {
        entries
            .iter()
            .map(|(name, ts)| (name.to_string(), timeline(ts)))
            .collect()
    }

    #[test]
    fn test_choose_primary_by_product() {
        let set = timelines(&[
            ("key0", &[2, 4, 6, 9]),
            ("key1", &[3, 4, 7, 9]),
            ("key2", &[]),
        ]);
        assert_eq!(choose_primary(&set), Some("key0".to_string()));
    }

    #[test]
    fn test_choose_primary_ignores_input_order() {
        let set = timelines(&[("b", &[9, 2, 6, 4]), ("a", &[7, 3, 9, 4])]);
        // Sorted, "b" is [2, 4, 6, 9] and wins on span
        assert_eq!(choose_primary(&set), Some("b".to_string()));
    }

    #[test]
    fn test_choose_primary_falls_back_to_sum() {
        // Every distribution is zero, so the additive score decides
        let set = timelines(&[("short", &[1, 2]), ("single", &[5])]);
        assert_eq!(choose_primary(&set), Some("short".to_string()));
    }

    #[test]
    fn test_choose_primary_tie_goes_to_first_name() {
        let set = timelines(&[("beta", &[1, 2, 3, 4, 5, 6]), ("alpha", &[1, 2, 3, 4, 5, 6])]);
        assert_eq!(choose_primary(&set), Some("alpha".to_string()));
    }

    #[test]
    fn test_choose_primary_none_when_all_empty() {
        let set = timelines(&[("a", &[]), ("b", &[])]);
        assert_eq!(choose_primary(&set), None);
        assert_eq!(choose_primary(&TimelineSet::new()), None);
    }

    #[test]
    fn test_resolve_primary_uses_fallback() {
        let set = timelines(&[("HK", &[]), ("PK", &[])]);
        assert_eq!(resolve_primary(&set, Some("HK")).unwrap(), "HK");
        assert!(matches!(
            resolve_primary(&set, None),
            Err(SenzError::NoPrimaryTimeline)
        ));
        assert!(matches!(
            resolve_primary(&set, Some("XX")),
            Err(SenzError::UnknownTimeline(k)) if k == "XX"
        ));
    }

    #[test]
    fn test_resolve_primary_prefers_measured_choice() {
        let set = timelines(&[
            ("PK", &[1, 4, 5, 7, 9]),
            ("SK", &[3, 5, 8, 9]),
            ("HK", &[2, 5]),
        ]);
        assert_eq!(resolve_primary(&set, Some("HK")).unwrap(), "PK");
    }
}

//! Timeline alignment
//!
//! Multiple asynchronous sensor timelines are aligned onto the events of one
//! primary timeline: the timeline with the best length, span and time
//! distribution measures.
//!
//! Pipeline: TimelineSet → choose primary → nearest match per secondary → AlignedTuple list

pub mod collector;
pub mod measures;
pub mod primary;

pub use collector::{align, find_nearest};
pub use measures::{generate_measures, SequenceMeasures, TIME_SEG_NUM};
pub use primary::{choose_primary, resolve_primary};

use crate::error::SenzError;
use crate::types::{AlignedTuple, TimelineSet};

/// Choose the primary timeline (or the fallback) and align the rest onto it
pub fn collect_senz_lists(
    timelines: &TimelineSet,
    fallback_key: Option<&str>,
    tolerance: f64,
) -> Result<Vec<AlignedTuple>, SenzError> {
    let primary_key = resolve_primary(timelines, fallback_key)?;
    align(&primary_key, timelines, tolerance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Event;

    #[test]
    fn test_collect_senz_lists_prefers_scored_timeline_over_fallback() {
        let mut set = TimelineSet::new();
        set.insert("PK".to_string(), vec![Event::new(1)]);
        set.insert("SK".to_string(), Vec::new());

        // "PK" scores 1 on the additive measure, so it is chosen over the fallback
        let tuples = collect_senz_lists(&set, Some("SK"), 1.0).unwrap();
        assert_eq!(tuples.len(), 1);
        assert!(tuples[0]["SK"].is_counterfeit());
    }

    #[test]
    fn test_collect_senz_lists_empty_fallback_timeline() {
        let mut set = TimelineSet::new();
        set.insert("PK".to_string(), Vec::new());
        set.insert("SK".to_string(), Vec::new());

        let tuples = collect_senz_lists(&set, Some("PK"), 1.0).unwrap();
        assert!(tuples.is_empty());
    }
}

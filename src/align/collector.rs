//! Senz tuple collection
//!
//! Pairs every event of the primary timeline with the nearest event of each
//! secondary timeline. Matches farther away than the tolerance are replaced by
//! a placeholder event stamped with the primary timestamp.

use crate::error::SenzError;
use crate::types::{AlignedTuple, Event, TimelineSet};
use tracing::debug;

/// Nearest value to `target` in sorted `sorted`.
///
/// An exact match wins. Otherwise the closer neighbour is returned, the lower
/// one when both are equally far. Returns `None` only for an empty slice.
pub fn find_nearest(target: i64, sorted: &[i64]) -> Option<i64> {
    let index = sorted.partition_point(|&t| t < target);
    let lower = index.checked_sub(1).map(|i| sorted[i]);
    let upper = sorted.get(index).copied();

    match (lower, upper) {
        (_, Some(up)) if up == target => Some(up),
        (Some(lo), Some(up)) => {
            if target.abs_diff(lo) <= target.abs_diff(up) {
                Some(lo)
            } else {
                Some(up)
            }
        }
        (Some(lo), None) => Some(lo),
        (None, Some(up)) => Some(up),
        (None, None) => None,
    }
}

/// A secondary timeline prepared for repeated nearest lookups
struct SecondaryIndex<'a> {
    events: &'a [Event],
    sorted: Vec<i64>,
}

impl<'a> SecondaryIndex<'a> {
    fn new(events: &'a [Event]) -> Self {
        let mut sorted: Vec<i64> = events.iter().map(|e| e.timestamp).collect();
        sorted.sort_unstable();
        Self { events, sorted }
    }

    /// Event to pair with `timestamp`, or a placeholder when none is close enough
    fn matching(&self, timestamp: i64, tolerance: f64) -> Event {
        let Some(nearest) = find_nearest(timestamp, &self.sorted) else {
            return Event::counterfeit(timestamp);
        };

        let distance = timestamp.abs_diff(nearest) as f64;
        if distance * distance > tolerance {
            return Event::counterfeit(timestamp);
        }

        self.events
            .iter()
            .find(|e| e.timestamp == nearest)
            .cloned()
            .unwrap_or_else(|| Event::counterfeit(timestamp))
    }
}

/// Build one aligned tuple per event of the primary timeline.
///
/// `tolerance` bounds the squared timestamp distance of a genuine match.
/// Output follows the primary timeline's order.
pub fn align(
    primary_key: &str,
    timelines: &TimelineSet,
    tolerance: f64,
) -> Result<Vec<AlignedTuple>, SenzError> {
    let primary = timelines
        .get(primary_key)
        .ok_or_else(|| SenzError::UnknownTimeline(primary_key.to_string()))?;

    let secondaries: Vec<(&String, SecondaryIndex<'_>)> = timelines
        .iter()
        .filter(|(name, _)| name.as_str() != primary_key)
        .map(|(name, events)| (name, SecondaryIndex::new(events)))
        .collect();

    let tuples: Vec<AlignedTuple> = primary
        .iter()
        .map(|event| {
            let mut tuple = AlignedTuple::new();
            tuple.insert(primary_key.to_string(), event.clone());
            for (name, index) in &secondaries {
                tuple.insert((*name).clone(), index.matching(event.timestamp, tolerance));
            }
            tuple
        })
        .collect();

    debug!(
        primary_key,
        secondaries = secondaries.len(),
        tuples = tuples.len(),
        "aligned timelines"
    );
    Ok(tuples)
}

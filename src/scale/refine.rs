//! Scale refinement
//!
//! Turns a sparse, bucketed list of senz probability records into a dense
//! list covering every bucket of the requested window:
//!
//! 1. records outside the window are dropped and the rest grouped by bucket
//! 2. the batch is rejected when the occupied buckets leave too wide a gap
//! 3. each bucket blends its own mean with the mean of the whole window
//! 4. single missing buckets are interpolated from their neighbours
//! 5. a single missing bucket at either edge copies its neighbour

use crate::error::SenzError;
use crate::scale::blend::collect_probs;
use crate::scale::window::ScaleWindow;
use crate::types::{CombinedScaleRecord, ProbDist, ScaleRecord, ScaleType};
use std::collections::BTreeMap;
use tracing::debug;

/// Widest tolerated run of empty buckets
pub const MAX_BLANK: i64 = 2;

/// Share of a bucket's own records when blending with the window mean
pub const LOCAL_WEIGHT: f64 = 0.75;

/// Share of each neighbour when interpolating a missing bucket
pub const INTERPOLATION_WEIGHT: f64 = 0.5;

/// Whether the sorted `occupied` buckets cover `[start, end]` closely enough.
///
/// The first occupied bucket must be less than `max_blank` after `start`, the
/// last less than `max_blank` before `end`, and consecutive buckets at most
/// `max_blank` apart.
pub fn check_blank_condition(start: i64, end: i64, occupied: &[i64], max_blank: i64) -> bool {
    let (Some(first), Some(last)) = (occupied.first(), occupied.last()) else {
        return false;
    };

    if first - start >= max_blank || end - last >= max_blank {
        return false;
    }

    occupied
        .windows(2)
        .all(|pair| (pair[1] - pair[0]).abs() <= max_blank)
}

/// Refine `records` over the window `[start, end]` of `scale_type`.
///
/// `start > end` selects a window that wraps past the end of the scale.
/// Returns an empty list for a degenerate window or when the records leave a
/// disqualifying gap. Every record inside the window must carry the same
/// probability fields; records outside it are never inspected.
pub fn refine(
    scale_type: ScaleType,
    start: i64,
    end: i64,
    records: &[ScaleRecord],
) -> Result<Vec<CombinedScaleRecord>, SenzError> {
    let Some(window) = ScaleWindow::new(scale_type, start, end)? else {
        debug!(%scale_type, start, end, "degenerate scale window");
        return Ok(Vec::new());
    };

    let kept: Vec<(usize, i64, &ScaleRecord)> = records
        .iter()
        .enumerate()
        .filter_map(|(index, record)| {
            window
                .to_linear(record.bucket)
                .map(|linear| (index, linear, record))
        })
        .collect();

    let field_names = probability_fields(&kept)?;

    let mut groups: BTreeMap<i64, Vec<&ScaleRecord>> = BTreeMap::new();
    for &(_, linear, record) in &kept {
        groups.entry(linear).or_default().push(record);
    }

    let occupied: Vec<i64> = groups.keys().copied().collect();
    if !check_blank_condition(window.start(), window.linear_end(), &occupied, MAX_BLANK) {
        debug!(
            %scale_type,
            start,
            end,
            ?occupied,
            "rejected senz list with blank buckets"
        );
        return Ok(Vec::new());
    }

    let in_window: Vec<&ScaleRecord> = groups.values().flatten().copied().collect();
    let combined: Vec<CombinedScaleRecord> = groups
        .iter()
        .map(|(&linear, group)| combine_bucket(scale_type, linear, group, &in_window, &field_names))
        .collect();

    let mut refined = fill_blanks(combined);
    pad_edges(&window, &mut refined);

    for record in &mut refined {
        record.bucket = window.to_bucket(record.bucket);
    }

    debug!(
        %scale_type,
        input = records.len(),
        in_window = in_window.len(),
        output = refined.len(),
        "refined senz list"
    );
    Ok(refined)
}

/// Names of the probability fields, checked to be present on every record
/// kept in the window. Errors name the record's position in the input.
fn probability_fields(kept: &[(usize, i64, &ScaleRecord)]) -> Result<Vec<String>, SenzError> {
    let mut names: Vec<String> = kept
        .iter()
        .flat_map(|(_, _, r)| r.fields.keys().cloned())
        .collect();
    names.sort();
    names.dedup();

    for &(index, _, record) in kept {
        if let Some(missing) = names.iter().find(|n| !record.fields.contains_key(*n)) {
            return Err(SenzError::MissingField(format!(
                "senzList[{index}].{missing}"
            )));
        }
    }

    Ok(names)
}

/// Distributions of one field across `records`
fn field_of<'a>(records: &[&'a ScaleRecord], name: &str) -> Vec<&'a ProbDist> {
    records.iter().filter_map(|r| r.fields.get(name)).collect()
}

/// Floor of the mean of `values`
fn floor_mean(values: impl Iterator<Item = i64>) -> i64 {
    let (sum, count) = values.fold((0i128, 0i128), |(s, c), v| (s + v as i128, c + 1));
    if count == 0 {
        return 0;
    }
    sum.div_euclid(count) as i64
}

fn combine_bucket(
    scale_type: ScaleType,
    linear: i64,
    group: &[&ScaleRecord],
    in_window: &[&ScaleRecord],
    field_names: &[String],
) -> CombinedScaleRecord {
    let fields = field_names
        .iter()
        .map(|name| {
            let local = field_of(group, name);
            let overall = field_of(in_window, name);
            (name.clone(), collect_probs(&local, &overall, LOCAL_WEIGHT))
        })
        .collect();

    CombinedScaleRecord {
        scale_type,
        bucket: linear,
        timestamp: floor_mean(group.iter().map(|r| r.timestamp)),
        senz_ids: group.iter().map(|r| r.senz_id.clone()).collect(),
        fields,
    }
}

/// Synthesized record for the bucket between `prev` and `next`
fn interpolate(prev: &CombinedScaleRecord, next: &CombinedScaleRecord) -> CombinedScaleRecord {
    let fields = prev
        .fields
        .iter()
        .filter_map(|(name, prev_dist)| {
            let next_dist = next.fields.get(name)?;
            Some((
                name.clone(),
                collect_probs(&[prev_dist], &[next_dist], INTERPOLATION_WEIGHT),
            ))
        })
        .collect();

    CombinedScaleRecord {
        scale_type: prev.scale_type,
        bucket: prev.bucket + 1,
        timestamp: floor_mean([prev.timestamp, next.timestamp].into_iter()),
        senz_ids: Vec::new(),
        fields,
    }
}

/// Insert an interpolated record wherever exactly one bucket is missing
fn fill_blanks(combined: Vec<CombinedScaleRecord>) -> Vec<CombinedScaleRecord> {
    let mut refined = Vec::with_capacity(combined.len() * 2);
    let mut iter = combined.into_iter().peekable();

    while let Some(record) = iter.next() {
        let filler = iter
            .peek()
            .filter(|next| next.bucket - record.bucket == MAX_BLANK)
            .map(|next| interpolate(&record, next));
        refined.push(record);
        refined.extend(filler);
    }

    refined
}

/// Copy the outermost records onto an empty first or last bucket
fn pad_edges(window: &ScaleWindow, refined: &mut Vec<CombinedScaleRecord>) {
    if let Some(first) = refined.first() {
        if first.bucket - window.start() == 1 {
            let mut padding = first.clone();
            padding.bucket = window.start();
            padding.senz_ids.clear();
            refined.insert(0, padding);
        }
    }

    if let Some(last) = refined.last() {
        if window.linear_end() - last.bucket == 1 {
            let mut padding = last.clone();
            padding.bucket = window.linear_end();
            padding.senz_ids.clear();
            refined.push(padding);
        }
    }
}

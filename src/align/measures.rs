//! Timeline measures
//!
//! Each candidate timeline is described by three measures: how many events it
//! has, how much time it spans, and how evenly its events spread over the span
//! of the widest timeline.

/// Number of equal-width segments the widest span is cut into
pub const TIME_SEG_NUM: usize = 3;

/// The three measures of one timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceMeasures {
    pub length: u64,
    pub time_span: u64,
    pub distribution: u64,
}

impl SequenceMeasures {
    /// Multiplicative score used to rank candidates
    pub fn product(&self) -> u128 {
        (self.length as u128)
            .saturating_mul(self.time_span as u128)
            .saturating_mul(self.distribution as u128)
    }

    /// Additive score used when every product is zero
    pub fn sum(&self) -> u128 {
        self.length as u128 + self.time_span as u128 + self.distribution as u128
    }
}

/// Segmentation shared by every timeline in one measurement pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segmentation {
    /// First timestamp of the widest timeline
    pub start: i64,
    /// Width of one segment
    pub width: i64,
}

impl Segmentation {
    /// Derive the segmentation from the widest of `sequences`.
    ///
    /// Every sequence must be sorted and non-empty. The first widest sequence
    /// wins on ties. Returns `None` when there are no sequences.
    pub fn from_widest(sequences: &[Vec<i64>], seg_num: usize) -> Option<Self> {
        let mut widest: Option<(&Vec<i64>, u64)> = None;
        for sequence in sequences {
            let span = time_span(sequence);
            if widest.map_or(true, |(_, best)| span > best) {
                widest = Some((sequence, span));
            }
        }
        let (sequence, span) = widest?;
        let width = (span as f64 / seg_num as f64).round() as i64;
        Some(Self {
            start: *sequence.first()?,
            width,
        })
    }

    /// Half-open bounds `[lo, hi)` of segment `index`.
    ///
    /// Widened to `i128` so segments of spans near the `i64` limits stay exact.
    pub fn bounds(&self, index: usize) -> (i128, i128) {
        let start = self.start as i128;
        let width = self.width as i128;
        let index = index as i128;
        (start + index * width, start + (index + 1) * width)
    }
}

/// Distance between the first and last timestamp of a sorted sequence
pub fn time_span(sequence: &[i64]) -> u64 {
    match (sequence.first(), sequence.last()) {
        (Some(first), Some(last)) => last.abs_diff(*first),
        _ => 0,
    }
}

/// Product of per-segment event counts; zero when any segment is empty
pub fn time_distribution(sequence: &[i64], segmentation: &Segmentation, seg_num: usize) -> u64 {
    (0..seg_num)
        .map(|index| {
            let (lo, hi) = segmentation.bounds(index);
            sequence
                .iter()
                .filter(|&&t| (lo..hi).contains(&(t as i128)))
                .count() as u64
        })
        .fold(1u64, |acc, count| acc.saturating_mul(count))
}

/// Measure every sequence against a segmentation of the widest one.
///
/// Sequences must be sorted and non-empty.
pub fn generate_measures(sequences: &[Vec<i64>]) -> Vec<SequenceMeasures> {
    let Some(segmentation) = Segmentation::from_widest(sequences, TIME_SEG_NUM) else {
        return Vec::new();
    };

    sequences
        .iter()
        .map(|sequence| SequenceMeasures {
            length: sequence.len() as u64,
            time_span: time_span(sequence),
            distribution: time_distribution(sequence, &segmentation, TIME_SEG_NUM),
        })
        .collect()
}

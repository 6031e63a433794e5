//! Circular scale windows
//!
//! A window `[start, end]` on a scale whose `start` is greater than its `end`
//! wraps past the last bucket (e.g. hour 23 to hour 2). Inside a window every
//! bucket gets a linear index so ordering and distances work without modular
//! arithmetic: buckets after the wrap are shifted up by the scale's modulus,
//! and shifted back when results leave the window.

use crate::error::SenzError;
use crate::types::ScaleType;

/// A validated, non-empty range of buckets on one scale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaleWindow {
    scale_type: ScaleType,
    start: i64,
    end: i64,
}

impl ScaleWindow {
    /// Build a window, or `None` for the degenerate `start == end` range.
    ///
    /// Both ends must be valid buckets of `scale_type`.
    pub fn new(scale_type: ScaleType, start: i64, end: i64) -> Result<Option<Self>, SenzError> {
        for value in [start, end] {
            if !scale_type.contains(value) {
                return Err(SenzError::InvalidScaleValue {
                    scale_type: scale_type.to_string(),
                    value,
                });
            }
        }

        if start == end {
            return Ok(None);
        }

        Ok(Some(Self {
            scale_type,
            start,
            end,
        }))
    }

    pub fn scale_type(&self) -> ScaleType {
        self.scale_type
    }

    /// Whether the window crosses the end of the scale
    pub fn is_wrapped(&self) -> bool {
        self.start > self.end
    }

    /// Linear index of the first bucket
    pub fn start(&self) -> i64 {
        self.start
    }

    /// Linear index of the last bucket
    pub fn linear_end(&self) -> i64 {
        if self.is_wrapped() {
            self.end + self.scale_type.modulus()
        } else {
            self.end
        }
    }

    /// Number of buckets the window covers
    pub fn bucket_count(&self) -> usize {
        (self.linear_end() - self.start + 1) as usize
    }

    /// Wrap: linear index of `bucket`, or `None` when it lies outside the window
    pub fn to_linear(&self, bucket: i64) -> Option<i64> {
        if !self.scale_type.contains(bucket) {
            return None;
        }

        if self.is_wrapped() {
            if bucket <= self.end {
                Some(bucket + self.scale_type.modulus())
            } else if bucket >= self.start {
                Some(bucket)
            } else {
                None
            }
        } else if (self.start..=self.end).contains(&bucket) {
            Some(bucket)
        } else {
            None
        }
    }

    /// Unwrap: bucket on the scale for a linear index
    pub fn to_bucket(&self, linear: i64) -> i64 {
        if linear > self.scale_type.max_value() {
            linear - self.scale_type.modulus()
        } else {
            linear
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(scale_type: ScaleType, start: i64, end: i64) -> ScaleWindow {
        ScaleWindow::new(scale_type, start, end).unwrap().unwrap()
    }

    #[test]
    fn test_degenerate_window() {
        assert_eq!(ScaleWindow::new(ScaleType::PerHourScale, 5, 5).unwrap(), None);
    }

    #[test]
    fn test_out_of_range_window() {
        assert!(matches!(
            ScaleWindow::new(ScaleType::PerHourScale, 0, 24),
            Err(SenzError::InvalidScaleValue { value: 24, .. })
        ));
        assert!(matches!(
            ScaleWindow::new(ScaleType::TenMinScale, -1, 3),
            Err(SenzError::InvalidScaleValue { value: -1, .. })
        ));
        assert!(ScaleWindow::new(ScaleType::PerMinScale, 0, 1439).is_ok());
    }

    #[test]
    fn test_linear_window() {
        let w = window(ScaleType::PerHourScale, 0, 23);
        assert!(!w.is_wrapped());
        assert_eq!(w.linear_end(), 23);
        assert_eq!(w.bucket_count(), 24);
        assert_eq!(w.to_linear(0), Some(0));
        assert_eq!(w.to_linear(23), Some(23));
        assert_eq!(w.to_linear(24), None);
        assert_eq!(w.to_bucket(0), 0);
        assert_eq!(w.to_bucket(23), 23);
    }

    #[test]
    fn test_wrapped_window_boundaries() {
        let w = window(ScaleType::PerHourScale, 23, 2);
        assert!(w.is_wrapped());
        assert_eq!(w.start(), 23);
        assert_eq!(w.linear_end(), 26);
        assert_eq!(w.bucket_count(), 4);

        // modulus - 1 stays in place, 0 moves past the modulus
        assert_eq!(w.to_linear(23), Some(23));
        assert_eq!(w.to_linear(0), Some(24));
        assert_eq!(w.to_linear(2), Some(26));
        assert_eq!(w.to_linear(3), None);
        assert_eq!(w.to_linear(22), None);
        assert_eq!(w.to_linear(24), None);

        assert_eq!(w.to_bucket(23), 23);
        assert_eq!(w.to_bucket(24), 0);
        assert_eq!(w.to_bucket(26), 2);
    }

    #[test]
    fn test_wrap_round_trip_on_every_scale() {
        for scale_type in ScaleType::ALL {
            let max = scale_type.max_value();
            let w = window(scale_type, max, 0);
            for bucket in [0, max] {
                let linear = w.to_linear(bucket).unwrap();
                assert_eq!(w.to_bucket(linear), bucket);
            }
            assert_eq!(w.to_linear(0), Some(scale_type.modulus()));
            assert_eq!(w.bucket_count(), 2);
        }
    }
}

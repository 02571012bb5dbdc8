//! Plot-side helpers for rendering spectra
//!
//! The widget itself lives in the GUI shell. These types hold the data it is
//! given and compute what falls inside the visible x range, so large series
//! are only partially handed to the renderer.

use std::time::{Duration, Instant};

use crate::error::{AcousticError, Result};

/// Margin added above and below the visible y range
pub const DEFAULT_Y_PADDING: f64 = 0.1;

/// Minimum time between redraws while the view is being dragged or zoomed
pub const GRAPH_UPDATE_TIMEOUT: Duration = Duration::from_millis(50);

/// One x/y series as handed to a plot widget
#[derive(Debug, Clone, Default)]
pub struct PlotSeries {
    x: Vec<f64>,
    y: Vec<f64>,
    y_padding: f64,
}

/// Points of a series inside the current viewport
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleSeries {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    /// Padded (min, max) of the visible y values, `None` if nothing is visible
    pub y_range: Option<(f64, f64)>,
}

impl PlotSeries {
    pub fn new() -> Self {
        Self {
            y_padding: DEFAULT_Y_PADDING,
            ..Self::default()
        }
    }

    pub fn with_y_padding(mut self, y_padding: f64) -> Self {
        self.y_padding = y_padding;
        self
    }

    /// Replace the series data
    pub fn set_data(&mut self, x: &[f64], y: &[f64]) -> Result<()> {
        if x.len() != y.len() {
            return Err(AcousticError::LengthMismatch {
                x: x.len(),
                y: y.len(),
            });
        }
        self.x = x.to_vec();
        self.y = y.to_vec();
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Points with `x_min <= x <= x_max`, in series order
    pub fn visible(&self, x_min: f64, x_max: f64) -> VisibleSeries {
        let (x, y): (Vec<f64>, Vec<f64>) = self
            .x
            .iter()
            .zip(self.y.iter())
            .filter(|&(&x, _)| x >= x_min && x <= x_max)
            .map(|(&x, &y)| (x, y))
            .unzip();

        let y_range = y
            .iter()
            .fold(None, |range: Option<(f64, f64)>, &v| match range {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
            .map(|(lo, hi)| (lo - self.y_padding, hi + self.y_padding));

        VisibleSeries { x, y, y_range }
    }
}

impl VisibleSeries {
    /// Reduce to at most `max_points` by keeping the min and max of each bucket
    ///
    /// Peaks survive decimation, which plain striding would skip.
    pub fn decimate(&self, max_points: usize) -> VisibleSeries {
        if self.x.len() <= max_points || max_points < 2 {
            return self.clone();
        }

        let buckets = max_points / 2;
        let bucket_len = (self.x.len() + buckets - 1) / buckets;
        let mut x = Vec::with_capacity(max_points);
        let mut y = Vec::with_capacity(max_points);

        for start in (0..self.x.len()).step_by(bucket_len) {
            let end = (start + bucket_len).min(self.x.len());
            let bucket = &self.y[start..end];

            let mut lo = start;
            let mut hi = start;
            for (offset, &v) in bucket.iter().enumerate() {
                if v < self.y[lo] {
                    lo = start + offset;
                }
                if v > self.y[hi] {
                    hi = start + offset;
                }
            }

            let (first, second) = if lo <= hi { (lo, hi) } else { (hi, lo) };
            x.push(self.x[first]);
            y.push(self.y[first]);
            if second != first {
                x.push(self.x[second]);
                y.push(self.y[second]);
            }
        }

        VisibleSeries {
            x,
            y,
            y_range: self.y_range,
        }
    }
}

/// Rate limiter for redraws triggered by viewport changes
///
/// Skipped requests set a pending flag so the caller can schedule one final
/// redraw once the view settles.
#[derive(Debug, Clone)]
pub struct RedrawThrottle {
    interval: Duration,
    last: Option<Instant>,
    pending: bool,
}

impl RedrawThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
            pending: false,
        }
    }

    /// Returns true if a redraw should happen now
    pub fn request(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.duration_since(last) < self.interval => {
                self.pending = true;
                false
            }
            _ => {
                self.last = Some(now);
                self.pending = false;
                true
            }
        }
    }

    /// Whether a request was dropped since the last redraw
    pub fn has_pending(&self) -> bool {
        self.pending
    }
}

impl Default for RedrawThrottle {
    fn default() -> Self {
        Self::new(GRAPH_UPDATE_TIMEOUT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_data_length_mismatch() {
        let mut series = PlotSeries::new();
        assert!(matches!(
            series.set_data(&[1.0, 2.0], &[1.0]),
            Err(AcousticError::LengthMismatch { x: 2, y: 1 })
        ));
        assert!(series.is_empty());
    }

    #[test]
    fn test_visible_range_and_padding() {
        let mut series = PlotSeries::new();
        // FFT-ordered axis: negative frequencies come last
        series
            .set_data(&[0.0, 10.0, 20.0, -20.0, -10.0], &[5.0, 1.0, 3.0, 9.0, 2.0])
            .unwrap();

        let visible = series.visible(0.0, 15.0);
        assert_eq!(visible.x, vec![0.0, 10.0]);
        assert_eq!(visible.y, vec![5.0, 1.0]);
        let (lo, hi) = visible.y_range.unwrap();
        assert!((lo - 0.9).abs() < 1e-12);
        assert!((hi - 5.1).abs() < 1e-12);

        assert_eq!(series.visible(100.0, 200.0).y_range, None);
    }

    #[test]
    fn test_decimate_keeps_extremes() {
        let x: Vec<f64> = (0..1000).map(|i| i as f64).collect();
        let mut y = vec![0.0; 1000];
        y[333] = 50.0;
        y[777] = -50.0;

        let mut series = PlotSeries::new().with_y_padding(0.0);
        series.set_data(&x, &y).unwrap();
        let visible = series.visible(0.0, 1000.0);
        let reduced = visible.decimate(100);

        assert!(reduced.x.len() <= 100);
        assert!(reduced.y.contains(&50.0));
        assert!(reduced.y.contains(&-50.0));
        assert!(reduced.x.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(reduced.y_range, Some((-50.0, 50.0)));
    }

    #[test]
    fn test_decimate_small_series_unchanged() {
        let mut series = PlotSeries::new();
        series.set_data(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]).unwrap();
        let visible = series.visible(0.0, 5.0);
        assert_eq!(visible.decimate(10), visible);
    }

    #[test]
    fn test_redraw_throttle() {
        let mut throttle = RedrawThrottle::new(Duration::from_millis(50));
        let t0 = Instant::now();

        assert!(throttle.request(t0));
        assert!(!throttle.request(t0 + Duration::from_millis(10)));
        assert!(throttle.has_pending());
        assert!(throttle.request(t0 + Duration::from_millis(60)));
        assert!(!throttle.has_pending());
    }
}

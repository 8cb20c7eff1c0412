use crate::metrics::stats::window_stats;
use serde::{Deserialize, Serialize};

/// Plot area in pixels, y growing downward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PlotRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Clamp a pointer x into the plot area; NaN lands on the left edge.
    pub fn clamp_x(&self, x: f64) -> f64 {
        if x.is_nan() {
            return self.x;
        }
        x.clamp(self.x, self.right())
    }
}

/// Visible range over a decimated series of `len` points.
///
/// `window == None` is the full-range state; `Some((start, end))` is windowed with an
/// inclusive end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    len: usize,
    window: Option<(usize, usize)>,
}

impl Viewport {
    pub fn new(len: usize) -> Self {
        Self { len, window: None }
    }

    /// Back to full range, e.g. after a new session was loaded.
    pub fn reset(&mut self, len: usize) {
        self.len = len;
        self.window = None;
    }

    /// Enter the windowed state. Out-of-range and inverted bounds are clamped.
    pub fn set_range(&mut self, start: usize, end: usize) {
        if self.len == 0 {
            self.window = None;
            return;
        }
        let last = self.len - 1;
        let start = start.min(last);
        let end = end.clamp(start, last);
        self.window = Some((start, end));
    }

    /// Shift the window by `delta` decimated points, keeping its width.
    pub fn pan(&mut self, delta: isize) {
        let Some((start, end)) = self.window else {
            return;
        };
        let span = end - start;
        let last = self.len.saturating_sub(1);
        let max_start = last - span;
        let start = (start as isize + delta).clamp(0, max_start as isize) as usize;
        self.set_range(start, start + span);
    }

    /// Scale the window width by `factor` (< 1 zooms in) around the decimated index `anchor`.
    pub fn zoom(&mut self, factor: f64, anchor: usize) {
        if self.len < 2 || !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let (start, end) = self.range();
        let last = self.len - 1;
        let span = (end - start) as f64;
        let new_span = (span * factor).round().max(1.0);
        if new_span >= last as f64 {
            self.window = None;
            return;
        }
        let anchor = anchor.clamp(start, end) as f64;
        let ratio = if span > 0.0 {
            (anchor - start as f64) / span
        } else {
            0.5
        };
        let new_start = (anchor - ratio * new_span)
            .round()
            .clamp(0.0, last as f64 - new_span);
        let new_start = new_start as usize;
        self.set_range(new_start, new_start + new_span as usize);
    }

    /// Inclusive `(start, end)` of the visible window.
    pub fn range(&self) -> (usize, usize) {
        self.window.unwrap_or((0, self.len.saturating_sub(1)))
    }

    pub fn is_windowed(&self) -> bool {
        self.window.is_some()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn visible_count(&self) -> usize {
        if self.len == 0 {
            return 0;
        }
        let (start, end) = self.range();
        end - start + 1
    }
}

/// Vertical scale of one series over the visible window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YScale {
    pub min: f64,
    pub max: f64,
}

impl YScale {
    pub fn to_pixel(&self, value: f64, rect: &PlotRect) -> f64 {
        let span = self.max - self.min;
        if !value.is_finite() || span <= 0.0 {
            return rect.y + rect.height * 0.5;
        }
        rect.bottom() - (value - self.min) / span * rect.height
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PixelPoint {
    pub index: usize,
    pub x: f64,
    /// One entry per series, in the order given to [`ViewGeometry::new`].
    pub y: Vec<f64>,
}

/// Pixel coordinates of the visible window, computed once per viewport change.
#[derive(Debug, Clone)]
pub struct ViewGeometry<'a> {
    rect: PlotRect,
    start: usize,
    end: usize,
    series: Vec<&'a [f64]>,
    xs: Vec<f64>,
    scales: Vec<Option<YScale>>,
}

impl<'a> ViewGeometry<'a> {
    pub fn new(rect: PlotRect, viewport: &Viewport, series: &[&'a [f64]]) -> Self {
        let (start, end) = viewport.range();
        let visible = viewport.visible_count();
        let scales = series
            .iter()
            .map(|values| {
                window_stats(values, start, end).map(|s| YScale {
                    min: s.min,
                    max: s.max,
                })
            })
            .collect();
        let mut geometry = Self {
            rect,
            start,
            end,
            series: series.to_vec(),
            xs: Vec::with_capacity(visible),
            scales,
        };
        geometry.xs = (start..start + visible)
            .map(|i| geometry.x_for_index(i))
            .collect();
        geometry
    }

    pub fn rect(&self) -> &PlotRect {
        &self.rect
    }

    /// Inclusive visible window.
    pub fn window(&self) -> (usize, usize) {
        (self.start, self.end)
    }

    pub fn visible_indices(&self) -> std::ops::Range<usize> {
        self.start..self.start + self.xs.len()
    }

    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    pub fn series(&self, which: usize) -> Option<&'a [f64]> {
        self.series.get(which).copied()
    }

    pub fn scale(&self, which: usize) -> Option<YScale> {
        self.scales.get(which).copied().flatten()
    }

    pub fn x_for_index(&self, index: usize) -> f64 {
        if self.start == self.end {
            return self.rect.x;
        }
        let span = (self.end - self.start) as f64;
        self.rect.x + (index as f64 - self.start as f64) / span * self.rect.width
    }

    pub fn y_for_value(&self, which: usize, value: f64) -> f64 {
        match self.scale(which) {
            Some(scale) => scale.to_pixel(value, &self.rect),
            None => self.rect.bottom(),
        }
    }

    /// Fractional decimated index under pixel `x` (inverse of [`Self::x_for_index`]).
    pub fn fractional_index(&self, x: f64) -> f64 {
        let x = self.rect.clamp_x(x);
        if self.start == self.end || self.rect.width <= 0.0 {
            return self.start as f64;
        }
        let span = (self.end - self.start) as f64;
        self.start as f64 + (x - self.rect.x) / self.rect.width * span
    }

    pub fn index_to_pixel(&self, index: usize) -> PixelPoint {
        if self.xs.is_empty() {
            return PixelPoint {
                index: 0,
                x: self.rect.x,
                y: vec![self.rect.bottom(); self.series.len()],
            };
        }
        let y = self
            .series
            .iter()
            .enumerate()
            .map(|(which, values)| match values.get(index) {
                Some(&v) => self.y_for_value(which, v),
                None => self.rect.bottom(),
            })
            .collect();
        PixelPoint {
            index,
            x: self.x_for_index(index),
            y,
        }
    }

    /// Decimated index whose pixel x is closest to `x`; ties go to the lower index.
    pub fn pixel_x_to_index(&self, x: f64) -> usize {
        if self.xs.is_empty() {
            return 0;
        }
        let x = self.rect.clamp_x(x);
        let k = self.xs.partition_point(|&px| px < x);
        let nearest = if k == 0 {
            0
        } else if k >= self.xs.len() {
            self.xs.len() - 1
        } else if x - self.xs[k - 1] <= self.xs[k] - x {
            k - 1
        } else {
            k
        };
        self.start + nearest
    }
}

use serde::{Deserialize, Serialize};

/// Basic typed time series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSeries {
    /// Uniform sampling frequency in Hz
    pub fs: f64,
    /// Samples, possibly containing NaN where the sensor dropped out
    pub data: Vec<f64>,
}

impl TimeSeries {
    /// Series sampled once per second, the native rate of ride recordings.
    pub fn per_second(data: Vec<f64>) -> Self {
        Self { fs: 1.0, data }
    }
    /// Implicit time axis (seconds) for every sample.
    pub fn time_axis(&self) -> Vec<f64> {
        let dt = 1.0 / self.fs.max(f64::EPSILON);
        (0..self.data.len()).map(|i| i as f64 * dt).collect()
    }
}

/// Forward-fill state: remembers the most recent finite sample.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeldValue {
    last: Option<f64>,
}

impl HeldValue {
    /// Feed one raw sample (`None` when past the end of the series) and get the value to draw.
    pub fn read(&mut self, sample: Option<f64>) -> f64 {
        if let Some(v) = sample.filter(|v| v.is_finite()) {
            self.last = Some(v);
        }
        self.last.unwrap_or(0.0)
    }
}

/// Replace non-finite samples with the latest finite one (0 before the first).
pub fn forward_fill(values: &[f64]) -> Vec<f64> {
    let mut held = HeldValue::default();
    values.iter().map(|&v| held.read(Some(v))).collect()
}

use crate::io::text;
use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Samples as they appear on the wire; `null` marks a dropout.
pub type RawSamples = Vec<Option<f64>>;

/// Confidence bounds in any of the shapes the backend has emitted over time.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ConfidenceShape {
    /// `{"lower": [...], "upper": [...]}`
    Bounds {
        #[serde(default)]
        lower: RawSamples,
        #[serde(default)]
        upper: RawSamples,
    },
    /// `[[lower...], [upper...]]`
    Pair(RawSamples, RawSamples),
    /// `[[lo, hi], [lo, hi], ...]`
    PerSample(Vec<Option<(Option<f64>, Option<f64>)>>),
    /// Scalars and anything else: carries no per-sample band.
    Other(serde_json::Value),
}

impl ConfidenceShape {
    pub fn normalize(&self) -> Option<ConfidenceBand> {
        let band = match self {
            ConfidenceShape::Bounds { lower, upper } | ConfidenceShape::Pair(lower, upper) => {
                ConfidenceBand {
                    lower: to_samples(lower),
                    upper: to_samples(upper),
                }
            }
            ConfidenceShape::PerSample(pairs) => {
                let (lower, upper) = pairs
                    .iter()
                    .map(|pair| match pair {
                        Some((lo, hi)) => (or_nan(*lo), or_nan(*hi)),
                        None => (f64::NAN, f64::NAN),
                    })
                    .unzip();
                ConfidenceBand { lower, upper }
            }
            ConfidenceShape::Other(value) => {
                warn!("ignoring confidence bounds of unsupported shape: {}", value);
                return None;
            }
        };
        Some(band)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceBand {
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

impl ConfidenceBand {
    /// No finite value on either side.
    pub fn is_empty(&self) -> bool {
        !self.lower.iter().chain(&self.upper).any(|v| v.is_finite())
    }
}

/// Raw session object; every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionPayload {
    #[serde(default, alias = "time")]
    pub t: Option<RawSamples>,
    #[serde(default, alias = "power")]
    pub watts: Option<RawSamples>,
    #[serde(default, alias = "heart_rate", alias = "hr_series")]
    pub hr: Option<RawSamples>,
    #[serde(default, alias = "precision_watt_ci", alias = "band")]
    pub ci: Option<ConfidenceShape>,
}

impl SessionPayload {
    pub fn normalize(&self) -> SessionSeries {
        SessionSeries {
            time: self.t.as_deref().map(to_samples).filter(|t| !t.is_empty()),
            power: self.watts.as_deref().map(to_samples).unwrap_or_default(),
            heart_rate: self.hr.as_deref().map(to_samples).unwrap_or_default(),
            band: self
                .ci
                .as_ref()
                .and_then(ConfidenceShape::normalize)
                .filter(|band| !band.is_empty()),
        }
    }
}

/// Normalized session: plain `f64` series with NaN for dropouts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSeries {
    pub time: Option<Vec<f64>>,
    pub power: Vec<f64>,
    pub heart_rate: Vec<f64>,
    pub band: Option<ConfidenceBand>,
}

impl SessionSeries {
    /// Length of the explicit time axis, when the session has one.
    pub fn nominal_len(&self) -> Option<usize> {
        self.time.as_ref().map(Vec::len)
    }

    /// Longest series in the session.
    pub fn sample_count(&self) -> usize {
        let band = self
            .band
            .as_ref()
            .map(|b| b.lower.len().max(b.upper.len()))
            .unwrap_or(0);
        self.power
            .len()
            .max(self.heart_rate.len())
            .max(self.nominal_len().unwrap_or(0))
            .max(band)
    }
}

pub fn parse_session(text: &str) -> Result<SessionSeries> {
    let payload: SessionPayload =
        serde_json::from_str(text).context("parsing session payload")?;
    Ok(payload.normalize())
}

/// Load a session from a JSON payload, or a newline-delimited power series for any other
/// extension.
pub fn read_session(path: &Path) -> Result<SessionSeries> {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if !is_json {
        let power = text::read_f64_series(path)?;
        return Ok(SessionSeries {
            power,
            ..SessionSeries::default()
        });
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_session(&text).with_context(|| format!("in {}", path.display()))
}

fn or_nan(value: Option<f64>) -> f64 {
    value.unwrap_or(f64::NAN)
}

fn to_samples(raw: &[Option<f64>]) -> Vec<f64> {
    raw.iter().map(|v| or_nan(*v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn band_of(json: &str) -> Option<ConfidenceBand> {
        parse_session(json).unwrap().band
    }

    #[test]
    fn reads_series_with_dropouts_and_aliases() {
        let s = parse_session(r#"{"power": [200, null, 210], "hr_series": [120, 121]}"#).unwrap();
        assert_eq!(s.power.len(), 3);
        assert!(s.power[1].is_nan());
        assert_eq!(s.heart_rate, vec![120.0, 121.0]);
        assert!(s.time.is_none());
        assert_eq!(s.sample_count(), 3);
    }

    #[test]
    fn accepts_every_confidence_shape() {
        let expected = ConfidenceBand {
            lower: vec![190.0, 195.0, 200.0],
            upper: vec![210.0, 215.0, 220.0],
        };
        let bounds = r#"{"ci": {"lower": [190, 195, 200], "upper": [210, 215, 220]}}"#;
        let pair = r#"{"ci": [[190, 195, 200], [210, 215, 220]]}"#;
        let per_sample = r#"{"precision_watt_ci": [[190, 210], [195, 215], [200, 220]]}"#;
        assert_eq!(band_of(bounds), Some(expected.clone()));
        assert_eq!(band_of(pair), Some(expected.clone()));
        assert_eq!(band_of(per_sample), Some(expected));
    }

    #[test]
    fn unusable_confidence_is_dropped_not_fatal() {
        assert_eq!(band_of(r#"{"precision_watt_ci": 12.5}"#), None);
        assert_eq!(band_of(r#"{"ci": {"lower": [], "upper": [null]}}"#), None);
        assert_eq!(band_of(r#"{"ci": null}"#), None);
        assert_eq!(band_of(r#"{"ci": "n/a"}"#), None);
    }

    #[test]
    fn per_sample_nulls_become_gaps() {
        let band = band_of(r#"{"ci": [[1, 2], null, [null, 4], [5, 6]]}"#).unwrap();
        assert_eq!(band.lower.len(), 4);
        assert!(band.lower[1].is_nan() && band.upper[1].is_nan() && band.lower[2].is_nan());
        assert_eq!(band.upper[2], 4.0);
    }

    #[test]
    fn normalized_session_reads_back() {
        let session = SessionSeries {
            time: Some(vec![0.0, 1.0, 2.0]),
            power: vec![200.0, f64::NAN, 220.0],
            heart_rate: vec![130.0, 131.0, 132.0],
            band: Some(ConfidenceBand {
                lower: vec![190.0, 195.0, 200.0],
                upper: vec![210.0, 215.0, 240.0],
            }),
        };
        let text = serde_json::to_string(&session).unwrap();
        let back = parse_session(&text).unwrap();
        assert_eq!(back.time, session.time);
        assert!(back.power[1].is_nan());
        assert_eq!(back.heart_rate, session.heart_rate);
        assert_eq!(back.band, session.band);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(parse_session("{ not json").is_err());
    }

    #[test]
    fn reads_plain_text_series_as_power() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        writeln!(file, "100\n110\nnan\n130").unwrap();
        let session = read_session(file.path()).unwrap();
        assert_eq!(session.power.len(), 4);
        assert!(session.heart_rate.is_empty());
    }

    #[test]
    fn reads_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"t": [0, 1], "watts": [5, 6]}}"#).unwrap();
        let session = read_session(file.path()).unwrap();
        assert_eq!(session.nominal_len(), Some(2));
        assert_eq!(session.power, vec![5.0, 6.0]);
    }
}

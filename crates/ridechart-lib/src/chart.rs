use crate::io::SessionSeries;
use crate::plot::memo::fingerprint;
use crate::plot::sync::{decimate_aligned, SelectionSource};
use serde::{Deserialize, Serialize};

/// Session reduced to the chart budget; every present array is `indices.len()` long.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecimatedSession {
    /// Original sample index behind each decimated point.
    pub indices: Vec<usize>,
    pub time: Vec<f64>,
    pub power: Option<Vec<f64>>,
    pub heart_rate: Option<Vec<f64>>,
    /// Bounds keep NaN where data is missing; the band builder decides how to fill them.
    pub lower: Option<Vec<f64>>,
    pub upper: Option<Vec<f64>>,
    pub source: SelectionSource,
}

impl DecimatedSession {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Decimate power, heart rate, time axis and confidence bounds with one index selection.
///
/// Power is preferred as the primary series, heart rate second. Sessions without a time
/// axis get `0, 1, 2, ...` seconds.
pub fn decimate_session(session: &SessionSeries, budget: usize) -> DecimatedSession {
    let synthesized_time: Vec<f64>;
    let time: &[f64] = match &session.time {
        Some(t) => t,
        None => {
            let len = session.power.len().max(session.heart_rate.len());
            synthesized_time = (0..len).map(|i| i as f64).collect();
            &synthesized_time
        }
    };
    let power = session.power.as_slice();
    let heart_rate = session.heart_rate.as_slice();

    let out = decimate_aligned(
        &[power, heart_rate],
        &[time, power, heart_rate],
        session.nominal_len(),
        budget,
    );
    let mut aligned = out.aligned.into_iter();
    let time = aligned.next().unwrap_or_default();
    let power_out = aligned.next().filter(|_| !power.is_empty());
    let hr_out = aligned.next().filter(|_| !heart_rate.is_empty());

    let (lower, upper) = match &session.band {
        Some(band) => (
            Some(take_raw(&band.lower, &out.indices)),
            Some(take_raw(&band.upper, &out.indices)),
        ),
        None => (None, None),
    };

    DecimatedSession {
        indices: out.indices,
        time,
        power: power_out,
        heart_rate: hr_out,
        lower,
        upper,
        source: out.source,
    }
}

/// Content hash of everything [`decimate_session`] reads.
pub fn session_fingerprint(session: &SessionSeries) -> u64 {
    let empty: &[f64] = &[];
    let (lower, upper) = session
        .band
        .as_ref()
        .map(|b| (b.lower.as_slice(), b.upper.as_slice()))
        .unwrap_or((empty, empty));
    fingerprint(&[
        session.time.as_deref().unwrap_or(empty),
        &session.power,
        &session.heart_rate,
        lower,
        upper,
    ])
}

fn take_raw(values: &[f64], indices: &[usize]) -> Vec<f64> {
    indices
        .iter()
        .map(|&i| values.get(i).copied().unwrap_or(f64::NAN))
        .collect()
}

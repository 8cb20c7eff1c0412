use super::lttb::select_indices;
use crate::signal::HeldValue;
use log::debug;
use serde::{Deserialize, Serialize};

/// Which path produced the shared index selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionSource {
    /// LTTB over `primary_candidates[primary]`.
    Lttb { primary: usize },
    /// Uniform stride over the longest series; no candidate matched the nominal length.
    Stride,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aligned {
    pub indices: Vec<usize>,
    /// One entry per companion, each `indices.len()` long.
    pub aligned: Vec<Vec<f64>>,
    pub source: SelectionSource,
}

/// Length shared by every non-empty series, `None` when they disagree or are all empty.
pub fn nominal_length(series: &[&[f64]]) -> Option<usize> {
    let mut lengths = series.iter().map(|s| s.len()).filter(|&len| len > 0);
    let first = lengths.next()?;
    lengths.all(|len| len == first).then_some(first)
}

/// Every `ceil(len / target)`-th index starting at 0, ending at `len - 1` once the budget
/// allows two points.
///
/// When appending the final index would overflow the budget, it replaces the last
/// stride index instead. Budgets of 0 and 1 give `[]` and `[0]`, as [`select_indices`] does.
pub fn stride_indices(len: usize, target: usize) -> Vec<usize> {
    match (len, target) {
        (0, _) | (_, 0) => return Vec::new(),
        (_, 1) => return vec![0],
        _ => {}
    }
    let step = len.div_ceil(target).max(1);
    let mut indices: Vec<usize> = (0..len).step_by(step).collect();
    let last = len - 1;
    if indices.last() != Some(&last) {
        if indices.len() >= target {
            indices.pop();
        }
        indices.push(last);
    }
    indices
}

/// Read `values` at `indices`, forward-filling gaps and positions past the end.
///
/// The held value comes from this series alone and reflects every sample up to the
/// selected index, not just the previously selected ones.
pub fn sample_aligned(values: &[f64], indices: &[usize]) -> Vec<f64> {
    let mut held = HeldValue::default();
    let mut cursor = 0usize;
    indices
        .iter()
        .map(|&idx| {
            let upto = (idx + 1).min(values.len());
            while cursor < upto {
                held.read(Some(values[cursor]));
                cursor += 1;
            }
            held.read(values.get(idx).copied())
        })
        .collect()
}

/// Decimate a set of series to `target` points with a single shared index selection.
///
/// The selection is computed once from a primary series and reused verbatim so overlays
/// stay on the same original samples.
///
/// `nominal_len` is the length of the time axis when one exists; otherwise it is derived
/// from the companions with [`nominal_length`].
pub fn decimate_aligned(
    primary_candidates: &[&[f64]],
    companions: &[&[f64]],
    nominal_len: Option<usize>,
    target: usize,
) -> Aligned {
    let nominal = nominal_len.or_else(|| nominal_length(companions));
    let primary = nominal.and_then(|len| {
        primary_candidates
            .iter()
            .position(|s| !s.is_empty() && s.len() == len)
    });

    let (indices, source) = match primary {
        Some(p) => {
            debug!(
                "lttb selection over candidate {} ({} samples, budget {})",
                p,
                primary_candidates[p].len(),
                target
            );
            (
                select_indices(primary_candidates[p], target),
                SelectionSource::Lttb { primary: p },
            )
        }
        None => {
            let longest = companions
                .iter()
                .chain(primary_candidates.iter())
                .map(|s| s.len())
                .max()
                .unwrap_or(0);
            debug!(
                "no primary matches nominal length {:?}; stride over {} samples",
                nominal, longest
            );
            (stride_indices(longest, target), SelectionSource::Stride)
        }
    };

    let aligned = companions
        .iter()
        .map(|values| sample_aligned(values, &indices))
        .collect();
    Aligned {
        indices,
        aligned,
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wave(n: usize, period: f64, amp: f64) -> Vec<f64> {
        (0..n)
            .map(|i| (i as f64 / period).sin() * amp + amp)
            .collect()
    }

    #[test]
    fn companions_follow_primary_selection() {
        let power = wave(2000, 17.0, 150.0);
        let hr = wave(2000, 190.0, 40.0);
        let time: Vec<f64> = (0..2000).map(|i| i as f64).collect();
        let out = decimate_aligned(&[&power, &hr], &[&time, &power, &hr], Some(2000), 120);
        assert_eq!(out.source, SelectionSource::Lttb { primary: 0 });
        assert_eq!(out.indices, select_indices(&power, 120));
        for (k, &idx) in out.indices.iter().enumerate() {
            assert_eq!(out.aligned[0][k], idx as f64);
            assert_eq!(out.aligned[1][k], power[idx]);
            assert_eq!(out.aligned[2][k], hr[idx]);
        }
    }

    #[test]
    fn empty_power_promotes_heart_rate() {
        let hr = wave(500, 30.0, 20.0);
        let out = decimate_aligned(&[&[], &hr], &[&hr], None, 50);
        assert_eq!(out.source, SelectionSource::Lttb { primary: 1 });
        assert_eq!(out.indices.len(), 50);
    }

    #[test]
    fn ragged_companions_fall_back_to_stride() {
        let power = wave(100, 5.0, 100.0);
        let hr = wave(80, 9.0, 30.0);
        let out = decimate_aligned(&[&power, &hr], &[&power, &hr], None, 30);
        assert_eq!(out.source, SelectionSource::Stride);
        assert_eq!(out.indices, stride_indices(100, 30));
        assert_eq!(out.indices.last(), Some(&99));
        let hr_out = &out.aligned[1];
        assert_eq!(hr_out.len(), out.indices.len());
        // past the end of the heart-rate series the last sample is held
        for (k, &idx) in out.indices.iter().enumerate() {
            if idx >= 80 {
                assert_eq!(hr_out[k], hr[79]);
            } else {
                assert_eq!(hr_out[k], hr[idx]);
            }
        }
    }

    #[test]
    fn stride_respects_budget_and_ends_at_last() {
        assert_eq!(stride_indices(10, 4), vec![0, 3, 6, 9]);
        assert_eq!(stride_indices(11, 4), vec![0, 3, 6, 10]);
        assert_eq!(stride_indices(5, 10), vec![0, 1, 2, 3, 4]);
        assert!(stride_indices(7, 0).is_empty());
        assert_eq!(stride_indices(7, 1), vec![0]);
        assert_eq!(stride_indices(1, 3), vec![0]);
        assert!(stride_indices(0, 3).is_empty());
        for len in 2..200 {
            for target in 0..40 {
                let idx = stride_indices(len, target);
                assert!(idx.len() <= target, "len {len} target {target}");
                assert!(idx.windows(2).all(|w| w[1] > w[0]));
                if target >= 2 {
                    assert_eq!(idx[0], 0);
                    assert_eq!(*idx.last().unwrap(), len - 1);
                }
            }
        }
    }

    #[test]
    fn gaps_are_filled_per_companion() {
        let power = vec![100.0, f64::NAN, f64::NAN, 130.0, 140.0];
        let hr = vec![f64::NAN, 121.0, 122.0, f64::NAN, 124.0];
        let out = decimate_aligned(&[&power], &[&power, &hr], Some(5), 10);
        assert_eq!(out.indices, vec![0, 1, 2, 3, 4]);
        assert_eq!(out.aligned[0], vec![100.0, 100.0, 100.0, 130.0, 140.0]);
        assert_eq!(out.aligned[1], vec![0.0, 121.0, 122.0, 122.0, 124.0]);
    }

    #[test]
    fn held_value_sees_unselected_samples() {
        // index 3 is NaN; the last finite value at or before it is at index 2
        let values = vec![1.0, 2.0, 3.0, f64::NAN, 5.0];
        assert_eq!(sample_aligned(&values, &[0, 3, 4]), vec![1.0, 3.0, 5.0]);
        assert_eq!(sample_aligned(&[f64::NAN; 3], &[0, 2]), vec![0.0, 0.0]);
        assert_eq!(sample_aligned(&[], &[0, 5]), vec![0.0, 0.0]);
    }

    #[test]
    fn nominal_length_ignores_empty_series() {
        let a = [1.0; 4];
        let b = [2.0; 4];
        let c = [3.0; 3];
        assert_eq!(nominal_length(&[&a, &[], &b]), Some(4));
        assert_eq!(nominal_length(&[&a, &c]), None);
        assert_eq!(nominal_length(&[]), None);
    }
}

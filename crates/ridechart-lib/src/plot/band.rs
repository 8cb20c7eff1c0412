use super::viewport::ViewGeometry;
use serde::{Deserialize, Serialize};

/// Upper bound of synthesized band vertices (both sides together).
pub const MAX_SYNTHESIZED_POINTS: usize = 16;

/// Filled confidence band: upper edge left to right, lower edge left to right.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandPath {
    pub upper: Vec<[f64; 2]>,
    pub lower: Vec<[f64; 2]>,
    /// True when no bound data existed and the band was filled in from the primary range.
    pub synthesized: bool,
}

impl BandPath {
    /// Closed polygon: upper edge forward, lower edge backward.
    pub fn outline(&self) -> Vec<[f64; 2]> {
        self.upper
            .iter()
            .chain(self.lower.iter().rev())
            .copied()
            .collect()
    }

    pub fn vertex_count(&self) -> usize {
        self.upper.len() + self.lower.len()
    }
}

/// Visible vertices of series `which`.
pub fn polyline(geometry: &ViewGeometry<'_>, which: usize) -> Vec<[f64; 2]> {
    let Some(values) = geometry.series(which) else {
        return Vec::new();
    };
    geometry
        .visible_indices()
        .zip(geometry.xs())
        .filter_map(|(i, &x)| {
            values
                .get(i)
                .map(|&v| [x, geometry.y_for_value(which, v)])
        })
        .collect()
}

/// Band around series `primary`, scaled on the primary's axis.
///
/// Missing or non-finite bound samples fall back to the visible maximum (upper) or
/// minimum (lower) of the primary. Without any usable bound data the band is synthesized
/// from a handful of evenly spaced positions when `requested`, otherwise omitted.
pub fn band_path(
    geometry: &ViewGeometry<'_>,
    primary: usize,
    lower: Option<&[f64]>,
    upper: Option<&[f64]>,
    requested: bool,
) -> Option<BandPath> {
    if !requested {
        return None;
    }
    let scale = geometry.scale(primary)?;
    let has_data = |bound: Option<&[f64]>| {
        bound.is_some_and(|values| {
            geometry
                .visible_indices()
                .any(|i| values.get(i).is_some_and(|v| v.is_finite()))
        })
    };
    let edge = |bound: Option<&[f64]>, i: usize, fallback: f64| {
        bound
            .and_then(|values| values.get(i).copied())
            .filter(|v| v.is_finite())
            .unwrap_or(fallback)
    };

    let synthesized = !has_data(lower) && !has_data(upper);
    let positions: Vec<(usize, f64)> = if synthesized {
        spaced_positions(geometry, MAX_SYNTHESIZED_POINTS / 2)
    } else {
        geometry
            .visible_indices()
            .zip(geometry.xs().iter().copied())
            .collect()
    };

    let mut path = BandPath {
        upper: Vec::with_capacity(positions.len()),
        lower: Vec::with_capacity(positions.len()),
        synthesized,
    };
    for (i, x) in positions {
        let hi = edge(upper, i, scale.max);
        let lo = edge(lower, i, scale.min);
        path.upper.push([x, geometry.y_for_value(primary, hi)]);
        path.lower.push([x, geometry.y_for_value(primary, lo)]);
    }
    Some(path)
}

fn spaced_positions(geometry: &ViewGeometry<'_>, count: usize) -> Vec<(usize, f64)> {
    let visible = geometry.xs().len();
    let count = count.min(visible);
    let start = geometry.visible_indices().start;
    match count {
        0 => Vec::new(),
        1 => vec![(start, geometry.xs()[0])],
        _ => (0..count)
            .map(|j| {
                let k = j * (visible - 1) / (count - 1);
                (start + k, geometry.xs()[k])
            })
            .collect(),
    }
}

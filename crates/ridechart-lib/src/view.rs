use crate::chart::{decimate_session, session_fingerprint, DecimatedSession};
use crate::config::ChartConfig;
use crate::io::SessionSeries;
use crate::plot::memo::{CacheKey, DecimationCache};
use crate::plot::{
    band_path, polyline, BandSeries, Color, Figure, LineSeries, PlotRect, Series, Style,
    ViewGeometry, Viewport,
};
use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Geometry slot of the power series.
pub const POWER: usize = 0;
/// Geometry slot of the heart-rate series.
pub const HEART_RATE: usize = 1;

/// Values under the pointer, for tooltips and crosshairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tooltip {
    pub index: usize,
    pub original_index: usize,
    pub time: f64,
    pub power: Option<f64>,
    pub heart_rate: Option<f64>,
    pub x: f64,
    /// Pixel y per series slot ([`POWER`], [`HEART_RATE`]).
    pub y: Vec<f64>,
}

/// Decimated session plus the viewport, the only mutable chart state.
pub struct ChartView {
    width: u32,
    height: u32,
    rect: PlotRect,
    budget: usize,
    band: bool,
    cache: DecimationCache<DecimatedSession>,
    current: Option<(u64, Arc<DecimatedSession>)>,
    viewport: Viewport,
}

impl ChartView {
    pub fn new(config: &ChartConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            rect: config.plot_rect(),
            budget: config.budget,
            band: config.band,
            cache: DecimationCache::default(),
            current: None,
            viewport: Viewport::new(0),
        }
    }

    /// Show `session`. Returns true when its content differs from what was shown, in
    /// which case the viewport goes back to full range.
    pub fn load(&mut self, session: &SessionSeries) -> bool {
        let fp = session_fingerprint(session);
        if matches!(&self.current, Some((current, _)) if *current == fp) {
            return false;
        }
        let budget = self.budget;
        let data = self.cache.get_or_insert_with(
            CacheKey {
                fingerprint: fp,
                budget,
            },
            || decimate_session(session, budget),
        );
        debug!(
            "loaded session: {} samples -> {} points ({:?}), {} cached",
            session.sample_count(),
            data.len(),
            data.source,
            self.cache.len()
        );
        self.viewport.reset(data.len());
        self.current = Some((fp, data));
        true
    }

    pub fn data(&self) -> Option<&DecimatedSession> {
        self.current.as_ref().map(|(_, data)| data.as_ref())
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn set_range(&mut self, start: usize, end: usize) {
        self.viewport.set_range(start, end);
    }

    pub fn pan(&mut self, delta: isize) {
        self.viewport.pan(delta);
    }

    /// Zoom by `factor` keeping the sample under pixel `x` in place.
    pub fn zoom_at(&mut self, factor: f64, x: f64) {
        let anchor = self.geometry().fractional_index(x).round() as usize;
        self.viewport.zoom(factor, anchor);
    }

    pub fn reset(&mut self) {
        self.viewport.reset(self.viewport.len());
    }

    /// Pixel geometry for the current viewport, series in [`POWER`], [`HEART_RATE`] order.
    pub fn geometry(&self) -> ViewGeometry<'_> {
        let empty: &[f64] = &[];
        let (power, heart_rate) = match self.data() {
            Some(data) => (
                data.power.as_deref().unwrap_or(empty),
                data.heart_rate.as_deref().unwrap_or(empty),
            ),
            None => (empty, empty),
        };
        ViewGeometry::new(self.rect, &self.viewport, &[power, heart_rate])
    }

    pub fn tooltip_at(&self, x: f64) -> Option<Tooltip> {
        let data = self.data().filter(|d| !d.is_empty())?;
        let geometry = self.geometry();
        let index = geometry.pixel_x_to_index(x);
        let point = geometry.index_to_pixel(index);
        let value = |series: &Option<Vec<f64>>| {
            series.as_ref().and_then(|values| values.get(index).copied())
        };
        Some(Tooltip {
            index,
            original_index: *data.indices.get(index)?,
            time: *data.time.get(index)?,
            power: value(&data.power),
            heart_rate: value(&data.heart_rate),
            x: point.x,
            y: point.y,
        })
    }

    /// Drawable frame for the current viewport; the band is listed first so it sits
    /// under the lines.
    pub fn figure(&self, title: impl Into<Option<String>>) -> Figure {
        let mut fig = Figure::new(title, self.width, self.height, self.rect);
        let Some(data) = self.data() else {
            return fig;
        };
        let geometry = self.geometry();
        if data.power.is_some() {
            let band = band_path(
                &geometry,
                POWER,
                data.lower.as_deref(),
                data.upper.as_deref(),
                self.band,
            );
            if let Some(band) = band {
                fig.add_series(Series::Band(BandSeries {
                    name: "power ci".into(),
                    outline: band.outline(),
                    synthesized: band.synthesized,
                    color: Color::BAND,
                }));
            }
            fig.add_series(Series::Line(LineSeries {
                name: "power".into(),
                points: polyline(&geometry, POWER),
                style: Style {
                    width: 1.4,
                    dash: None,
                    color: Color::POWER,
                },
            }));
        }
        if data.heart_rate.is_some() {
            fig.add_series(Series::Line(LineSeries {
                name: "heart rate".into(),
                points: polyline(&geometry, HEART_RATE),
                style: Style {
                    width: 1.2,
                    dash: Some([4.0, 2.0]),
                    color: Color::HEART_RATE,
                },
            }));
        }
        fig
    }
}

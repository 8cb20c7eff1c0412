pub mod band;
pub mod lttb;
pub mod memo;
pub mod sync;
pub mod viewport;

pub use band::{band_path, polyline, BandPath};
pub use lttb::select_indices;
pub use sync::{decimate_aligned, sample_aligned, stride_indices, Aligned, SelectionSource};
pub use viewport::{PixelPoint, PlotRect, ViewGeometry, Viewport};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Style {
    pub width: f32,
    pub dash: Option<[f32; 2]>,
    pub color: Color,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color(pub u32);

impl Color {
    pub const POWER: Color = Color(0xFF0077);
    pub const HEART_RATE: Color = Color(0x1F77B4);
    pub const BAND: Color = Color(0xFFB3D1);

    pub fn rgb(self) -> (u8, u8, u8) {
        (
            ((self.0 >> 16) & 0xFF) as u8,
            ((self.0 >> 8) & 0xFF) as u8,
            (self.0 & 0xFF) as u8,
        )
    }
}

/// Polyline in pixel coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineSeries {
    pub name: String,
    pub points: Vec<[f64; 2]>,
    pub style: Style,
}

/// Filled polygon in pixel coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BandSeries {
    pub name: String,
    pub outline: Vec<[f64; 2]>,
    pub synthesized: bool,
    pub color: Color,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Series {
    Line(LineSeries),
    Band(BandSeries),
}

/// Drawable description of one chart frame, ready for any backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Figure {
    pub title: Option<String>,
    pub width: u32,
    pub height: u32,
    pub rect: PlotRect,
    pub series: Vec<Series>,
}

impl Figure {
    pub fn new(title: impl Into<Option<String>>, width: u32, height: u32, rect: PlotRect) -> Self {
        Self {
            title: title.into(),
            width,
            height,
            rect,
            series: Vec::new(),
        }
    }

    pub fn add_series(&mut self, series: Series) {
        self.series.push(series);
    }

    pub fn lines(&self) -> impl Iterator<Item = &LineSeries> {
        self.series.iter().filter_map(|s| match s {
            Series::Line(line) => Some(line),
            Series::Band(_) => None,
        })
    }

    pub fn band(&self) -> Option<&BandSeries> {
        self.series.iter().find_map(|s| match s {
            Series::Band(band) => Some(band),
            Series::Line(_) => None,
        })
    }
}

pub trait PlotBackend {
    fn draw(&mut self, fig: &Figure) -> anyhow::Result<()>;
}

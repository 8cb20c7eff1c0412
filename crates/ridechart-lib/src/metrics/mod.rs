pub mod stats;

pub use stats::{series_stats, window_stats, SeriesStats};

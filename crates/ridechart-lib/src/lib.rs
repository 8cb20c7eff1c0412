pub mod chart;
pub mod config;
pub mod io;
pub mod metrics;
pub mod plot;
pub mod signal;
pub mod view;

pub use chart::{decimate_session, DecimatedSession};
pub use config::{ChartConfig, ConfigError, DataSource};
pub use metrics::*;
pub use plot::*;
pub use signal::*;
pub use view::{ChartView, Tooltip};

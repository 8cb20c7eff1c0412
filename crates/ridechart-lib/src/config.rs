use crate::io::{mock_session, read_session, SessionSeries};
use crate::plot::PlotRect;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Where session data comes from. Passed in explicitly, never read from the environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataSource {
    Live { path: PathBuf },
    Mock {
        #[serde(default = "default_mock_seconds")]
        seconds: usize,
        #[serde(default)]
        seed: u64,
    },
}

impl Default for DataSource {
    fn default() -> Self {
        DataSource::Mock {
            seconds: default_mock_seconds(),
            seed: 0,
        }
    }
}

impl DataSource {
    pub fn load(&self) -> anyhow::Result<SessionSeries> {
        match self {
            DataSource::Live { path } => read_session(path),
            DataSource::Mock { seconds, seed } => Ok(mock_session(*seconds, *seed)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Decimated point budget per series.
    pub budget: usize,
    pub width: u32,
    pub height: u32,
    /// Space around the plot rectangle, in pixels.
    pub margin: u32,
    /// Draw the confidence band, synthesizing one when the session has none.
    pub band: bool,
    pub source: DataSource,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            budget: 500,
            width: 800,
            height: 480,
            margin: 40,
            band: true,
            source: DataSource::default(),
        }
    }
}

impl ChartConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let cfg: ChartConfig = toml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "chart size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if self.margin.saturating_mul(2) >= self.width.min(self.height) {
            return Err(ConfigError::Invalid(format!(
                "margin {} leaves no room for the plot",
                self.margin
            )));
        }
        Ok(())
    }

    pub fn plot_rect(&self) -> PlotRect {
        let m = self.margin as f64;
        PlotRect::new(
            m,
            m,
            self.width as f64 - 2.0 * m,
            self.height as f64 - 2.0 * m,
        )
    }
}

fn default_mock_seconds() -> usize {
    3600
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_keys() {
        let cfg = ChartConfig::from_toml("budget = 250\n").unwrap();
        assert_eq!(cfg.budget, 250);
        assert_eq!((cfg.width, cfg.height), (800, 480));
        assert!(cfg.band);
        assert_eq!(cfg.source, DataSource::default());
        assert_eq!(cfg.plot_rect(), PlotRect::new(40.0, 40.0, 720.0, 400.0));
    }

    #[test]
    fn parses_live_and_mock_sources() {
        let cfg = ChartConfig::from_toml(
            "[source]\nkind = \"live\"\npath = \"rides/today.json\"\n",
        )
        .unwrap();
        assert_eq!(
            cfg.source,
            DataSource::Live {
                path: PathBuf::from("rides/today.json")
            }
        );
        let cfg = ChartConfig::from_toml("[source]\nkind = \"mock\"\nseed = 9\n").unwrap();
        assert_eq!(
            cfg.source,
            DataSource::Mock {
                seconds: 3600,
                seed: 9
            }
        );
    }

    #[test]
    fn rejects_degenerate_sizes() {
        assert!(matches!(
            ChartConfig::from_toml("width = 0\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            ChartConfig::from_toml("margin = 300\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            ChartConfig::from_toml("budget = \"lots\"\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = ChartConfig::load(Path::new("/nonexistent/chart.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/chart.toml"));
    }

    #[test]
    fn mock_source_loads_without_io() {
        let source = DataSource::Mock {
            seconds: 120,
            seed: 3,
        };
        assert_eq!(source.load().unwrap().power.len(), 120);
    }
}

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use plotters::prelude::*;
use ridechart_lib::{
    chart::{decimate_session, DecimatedSession},
    config::ChartConfig,
    io::{mock_session, read_session, SessionSeries},
    metrics::stats::{series_stats, SeriesStats},
    plot::{Figure, PlotBackend, Series},
    view::ChartView,
};
use serde::Serialize;
use std::{
    io,
    path::{Path, PathBuf},
};

#[derive(Parser)]
#[command(
    name = "ridechart",
    version,
    about = "ridechart: decimate and chart dense ride sessions"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum OutputFormat {
    #[value(name = "json")]
    Json,
    #[value(name = "csv")]
    Csv,
}

#[derive(clap::Args)]
struct SourceArgs {
    /// Session JSON, or newline-delimited power samples
    #[arg(long)]
    input: Option<PathBuf>,
    /// Chart config (TOML); its `source` is used when --input is absent
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override the configured point budget
    #[arg(long)]
    budget: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Decimate all series of a session with one shared index selection
    Decimate {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long, default_value = "json")]
        format: OutputFormat,
    },
    /// Min/max/average of every series (gaps forward-filled)
    Stats {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Render the chart to a PNG via plotters
    Plot {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long)]
        out: PathBuf,
        /// First visible decimated index
        #[arg(long)]
        start: Option<usize>,
        /// Last visible decimated index
        #[arg(long)]
        end: Option<usize>,
        /// Skip the confidence band
        #[arg(long)]
        no_band: bool,
    },
    /// Resolve a pointer x (pixels) to the nearest sample and print the tooltip
    Probe {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long, allow_hyphen_values = true)]
        x: f64,
        #[arg(long)]
        start: Option<usize>,
        #[arg(long)]
        end: Option<usize>,
    },
    /// Print a reproducible synthetic session as JSON
    Mock {
        #[arg(long, default_value_t = 3600)]
        seconds: usize,
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Commands::Decimate { source, format } => cmd_decimate(&source, format)?,
        Commands::Stats { source } => cmd_stats(&source)?,
        Commands::Plot {
            source,
            out,
            start,
            end,
            no_band,
        } => cmd_plot(&source, &out, start, end, no_band)?,
        Commands::Probe {
            source,
            x,
            start,
            end,
        } => cmd_probe(&source, x, start, end)?,
        Commands::Mock { seconds, seed } => cmd_mock(seconds, seed)?,
    }
    Ok(())
}

fn load_config(source: &SourceArgs) -> Result<ChartConfig> {
    let mut cfg = match &source.config {
        Some(path) => ChartConfig::load(path)?,
        None => ChartConfig::default(),
    };
    if let Some(budget) = source.budget {
        cfg.budget = budget;
    }
    Ok(cfg)
}

fn load_session(source: &SourceArgs, cfg: &ChartConfig) -> Result<SessionSeries> {
    let session = match &source.input {
        Some(path) => read_session(path)?,
        None => cfg.source.load().context("loading configured data source")?,
    };
    info!(
        "session: {} power, {} heart-rate samples",
        session.power.len(),
        session.heart_rate.len()
    );
    Ok(session)
}

fn cmd_decimate(source: &SourceArgs, format: OutputFormat) -> Result<()> {
    let cfg = load_config(source)?;
    let session = load_session(source, &cfg)?;
    let out = decimate_session(&session, cfg.budget);
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(&out)?),
        OutputFormat::Csv => write_csv(&out, io::stdout().lock())?,
    }
    Ok(())
}

fn write_csv<W: io::Write>(out: &DecimatedSession, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record([
        "index",
        "original_index",
        "time",
        "power",
        "heart_rate",
        "lower",
        "upper",
    ])?;
    let cell = |series: &Option<Vec<f64>>, k: usize| {
        series
            .as_ref()
            .and_then(|values| values.get(k))
            .filter(|v| v.is_finite())
            .map(|v| v.to_string())
            .unwrap_or_default()
    };
    for (k, original) in out.indices.iter().enumerate() {
        wtr.write_record([
            k.to_string(),
            original.to_string(),
            out.time.get(k).map(|t| t.to_string()).unwrap_or_default(),
            cell(&out.power, k),
            cell(&out.heart_rate, k),
            cell(&out.lower, k),
            cell(&out.upper, k),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct SessionStats {
    power: Option<SeriesStats>,
    heart_rate: Option<SeriesStats>,
    lower: Option<SeriesStats>,
    upper: Option<SeriesStats>,
}

fn cmd_stats(source: &SourceArgs) -> Result<()> {
    let cfg = load_config(source)?;
    let session = load_session(source, &cfg)?;
    let band = session.band.as_ref();
    let stats = SessionStats {
        power: series_stats(&session.power),
        heart_rate: series_stats(&session.heart_rate),
        lower: band.and_then(|b| series_stats(&b.lower)),
        upper: band.and_then(|b| series_stats(&b.upper)),
    };
    println!("{}", serde_json::to_string(&stats)?);
    Ok(())
}

fn chart_view(
    source: &SourceArgs,
    start: Option<usize>,
    end: Option<usize>,
    band: bool,
) -> Result<ChartView> {
    let mut cfg = load_config(source)?;
    cfg.band &= band;
    let session = load_session(source, &cfg)?;
    let mut view = ChartView::new(&cfg);
    view.load(&session);
    if start.is_some() || end.is_some() {
        view.set_range(start.unwrap_or(0), end.unwrap_or(usize::MAX));
    }
    Ok(view)
}

fn cmd_plot(
    source: &SourceArgs,
    out: &Path,
    start: Option<usize>,
    end: Option<usize>,
    no_band: bool,
) -> Result<()> {
    let view = chart_view(source, start, end, !no_band)?;
    let title = source
        .input
        .as_ref()
        .and_then(|p| p.file_stem())
        .map(|s| s.to_string_lossy().into_owned());
    let fig = view.figure(title);
    PngBackend { path: out }.draw(&fig)?;
    info!("wrote {} ({} series)", out.display(), fig.series.len());
    Ok(())
}

fn cmd_probe(
    source: &SourceArgs,
    x: f64,
    start: Option<usize>,
    end: Option<usize>,
) -> Result<()> {
    let view = chart_view(source, start, end, false)?;
    let tooltip = view.tooltip_at(x);
    println!("{}", serde_json::to_string(&tooltip)?);
    Ok(())
}

fn cmd_mock(seconds: usize, seed: u64) -> Result<()> {
    let session = mock_session(seconds, seed);
    println!("{}", serde_json::to_string(&session)?);
    Ok(())
}

struct PngBackend<'a> {
    path: &'a Path,
}

impl PlotBackend for PngBackend<'_> {
    fn draw(&mut self, fig: &Figure) -> Result<()> {
        let backend = BitMapBackend::new(self.path, (fig.width, fig.height));
        let root = backend.into_drawing_area();
        root.fill(&WHITE)?;
        let rect = fig.rect;
        let to_px = |p: &[f64; 2]| (p[0].round() as i32, p[1].round() as i32);

        for series in &fig.series {
            match series {
                Series::Band(band) => {
                    let (r, g, b) = band.color.rgb();
                    let alpha = if band.synthesized { 0.25 } else { 0.5 };
                    root.draw(&Polygon::new(
                        band.outline.iter().map(to_px).collect::<Vec<_>>(),
                        RGBColor(r, g, b).mix(alpha).filled(),
                    ))?;
                }
                Series::Line(line) => {
                    let (r, g, b) = line.style.color.rgb();
                    let width = line.style.width.round().max(1.0) as u32;
                    root.draw(&PathElement::new(
                        line.points.iter().map(to_px).collect::<Vec<_>>(),
                        RGBColor(r, g, b).stroke_width(width),
                    ))?;
                }
            }
        }
        root.draw(&Rectangle::new(
            [
                (rect.x as i32, rect.y as i32),
                (rect.right() as i32, rect.bottom() as i32),
            ],
            BLACK.stroke_width(1),
        ))?;
        root.present()?;
        Ok(())
    }
}

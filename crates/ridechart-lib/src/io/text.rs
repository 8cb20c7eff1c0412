use anyhow::{Context, Result};
use std::path::Path;

/// Parse newline-delimited floating point series, ignoring blank/comment lines.
///
/// Dropout markers (`nan`, `null`, `-`) become NaN so the line keeps its sample slot.
pub fn parse_f64_series(text: &str) -> Result<Vec<f64>> {
    let mut out = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if matches!(trimmed.to_ascii_lowercase().as_str(), "nan" | "null" | "-") {
            out.push(f64::NAN);
            continue;
        }
        let val: f64 = trimmed
            .parse()
            .with_context(|| format!("line {} is not f64: {}", idx + 1, trimmed))?;
        out.push(val);
    }
    if out.is_empty() {
        anyhow::bail!("no numeric samples found");
    }
    Ok(out)
}

/// Read a newline-delimited floating point series from disk.
pub fn read_f64_series(path: &Path) -> Result<Vec<f64>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_f64_series(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropouts_keep_their_slot() {
        let series = parse_f64_series("# watts\n210\nnan\n\n-\n215.5\nNULL\n").unwrap();
        assert_eq!(series.len(), 5);
        assert_eq!(series[0], 210.0);
        assert!(series[1].is_nan() && series[2].is_nan() && series[4].is_nan());
        assert_eq!(series[3], 215.5);
    }

    #[test]
    fn rejects_garbage_and_empty_input() {
        assert!(parse_f64_series("12\nabc\n").is_err());
        assert!(parse_f64_series("# nothing\n\n").is_err());
    }
}

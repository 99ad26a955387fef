use std::fmt::Display;
use std::str::FromStr;

use anyhow::{Error, Result};
use simplelog::LevelFilter;

use vvsweep::SizeData;

/// Parses a non-negative integer given on the command line.
pub(crate) fn parse_count<T>(s: &str, what: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    s.trim()
        .parse::<T>()
        .map_err(|e| Error::msg(format!("invalid {}: {} ({})", what, s, e)))
}

pub(crate) fn parse_level_filter(verbosity: Option<&str>) -> LevelFilter {
    match verbosity {
        Some(s) => match s {
            "0" | "none" => LevelFilter::Off,
            "1" | "err" | "error" | "min" => LevelFilter::Error,
            "2" | "warn" | "warning" | "default" => LevelFilter::Warn,
            "3" | "info" => LevelFilter::Info,
            "4" | "debug" => LevelFilter::Debug,
            "5" | "trace" | "max" | "all" => LevelFilter::Trace,
            _ => LevelFilter::Warn,
        },
        _ => LevelFilter::Warn,
    }
}

/// Formats per-category summaries as a plain text table, one row per
/// category in plotting order.
pub(crate) fn format_summary_table(data: &SizeData) -> String {
    let mut table = format!(
        "{:<12} {:>6} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}\n",
        "category", "count", "min", "q1", "median", "q3", "max", "mean"
    );
    for (category, summary) in data.summaries() {
        let row = match summary {
            Some(s) => format!(
                "{:<12} {:>6} {:>10.3} {:>10.3} {:>10.3} {:>10.3} {:>10.3} {:>10.3}\n",
                category.as_str(),
                s.count,
                s.min,
                s.q1,
                s.median,
                s.q3,
                s.max,
                s.mean
            ),
            None => format!("{:<12} {:>6} {:>10}\n", category.as_str(), 0, "-"),
        };
        table.push_str(&row);
    }
    table
}

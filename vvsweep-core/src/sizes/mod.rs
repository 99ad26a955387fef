//! Aggregation of cell size measurements.
//!
//! Simulation runs write cell volumes into CSV files named
//! `<category>_sizes*.csv`, with at least a `Cell` column holding the
//! category label and a `Volume` column holding the measured value.
//! Loading collects the volumes from all the files matching a category
//! into one series per label, which can then be summarized or plotted.

mod plot;
mod stats;

pub use plot::{plot_sizes, PlotConfig};
pub use stats::{gaussian_kde, quantile, silverman_bandwidth, SeriesSummary};

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::Error;
use crate::util;
use crate::Result;

/// Header of the column holding category labels.
pub const LABEL_COLUMN: &str = "Cell";
/// Header of the column holding volumes.
pub const VALUE_COLUMN: &str = "Volume";

/// Suffix following the category name in the size file names, before
/// the optional run-specific part.
const FILE_STEM_SUFFIX: &str = "_sizes";
const FILE_EXTENSION: &str = ".csv";

/// Cell category label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    OneCell,
    TwoCell,
    FourCell,
    Apical,
    Basal,
    InnerApical,
    OuterApical,
    InnerBasal,
    OuterBasal,
}

impl Category {
    /// All the categories, in plotting order.
    pub const ALL: [Category; 9] = [
        Category::OneCell,
        Category::TwoCell,
        Category::FourCell,
        Category::Apical,
        Category::Basal,
        Category::InnerApical,
        Category::OuterApical,
        Category::InnerBasal,
        Category::OuterBasal,
    ];

    /// Label as found in the data files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::OneCell => "1cell",
            Category::TwoCell => "2cell",
            Category::FourCell => "4cell",
            Category::Apical => "Apical",
            Category::Basal => "Basal",
            Category::InnerApical => "InnerApical",
            Category::OuterApical => "OuterApical",
            Category::InnerBasal => "InnerBasal",
            Category::OuterBasal => "OuterBasal",
        }
    }

    /// Position of the category in plotting order.
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Category::ALL
            .iter()
            .find(|c| c.as_str() == s)
            .copied()
            .ok_or_else(|| Error::Other(format!("unknown category label: {}", s)))
    }
}

/// Which labels get collected from the files matching a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelScope {
    /// Every known label found in the matched files is collected. A
    /// `Basal` row inside an `Apical_sizes.csv` file ends up in the
    /// `Basal` series.
    AllLabels,
    /// Only rows labeled with the requested category are collected.
    FileCategory,
}

impl Default for LabelScope {
    fn default() -> Self {
        LabelScope::AllLabels
    }
}

/// Volumes aggregated per category.
#[derive(Debug, Clone, PartialEq)]
pub struct SizeData {
    series: Vec<Vec<f64>>,
    /// Files the data was loaded from.
    pub files: Vec<PathBuf>,
}

impl Default for SizeData {
    fn default() -> Self {
        SizeData {
            series: vec![Vec::new(); Category::ALL.len()],
            files: Vec::new(),
        }
    }
}

impl SizeData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, category: Category) -> &[f64] {
        &self.series[category.index()]
    }

    pub fn push(&mut self, category: Category, value: f64) {
        self.series[category.index()].push(value);
    }

    /// Iterates over all the categories in plotting order, including the
    /// empty ones.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &[f64])> {
        Category::ALL
            .iter()
            .map(move |c| (*c, self.series[c.index()].as_slice()))
    }

    /// Total number of values across all categories.
    pub fn len(&self) -> usize {
        self.series.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn summaries(&self) -> Vec<(Category, Option<SeriesSummary>)> {
        self.iter()
            .map(|(c, values)| (c, SeriesSummary::from_values(values)))
            .collect()
    }
}

/// Loads volumes from all the `<category>_sizes*.csv` files found in
/// `dir`.
///
/// Files are read in file name order. Any file that can't be read, lacks
/// one of the required columns or holds an invalid volume in a collected
/// row fails the whole load. Finding no files is not an error.
///
/// The category is matched as a literal file name prefix, wildcard
/// characters in it match only themselves.
pub fn load_sizes(dir: &Path, category: &str, scope: LabelScope) -> Result<SizeData> {
    let prefix = format!("{}{}", category, FILE_STEM_SUFFIX);
    let files = util::find_files_matching(dir, &prefix, FILE_EXTENSION)?;
    if files.is_empty() {
        warn!(
            "no files matching {}*{} found in {}",
            prefix,
            FILE_EXTENSION,
            dir.to_string_lossy()
        );
    }

    let requested = category.parse::<Category>().ok();
    if scope == LabelScope::FileCategory && requested.is_none() {
        warn!(
            "{} is not a known category label, no rows will be collected",
            category
        );
    }

    let mut data = SizeData::new();
    for file in files {
        let accept = |c: Category| match scope {
            LabelScope::AllLabels => true,
            LabelScope::FileCategory => Some(c) == requested,
        };
        let count = read_file(&file, accept, &mut data)?;
        debug!("loaded {} values from {}", count, file.to_string_lossy());
        data.files.push(file);
    }
    info!(
        "loaded {} values for category {} from {} files",
        data.len(),
        category,
        data.files.len()
    );
    Ok(data)
}

/// Reads a single size file, pushing the accepted rows into `data`.
/// Returns the number of values read.
fn read_file<F>(path: &Path, accept: F, data: &mut SizeData) -> Result<usize>
where
    F: Fn(Category) -> bool,
{
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    let column = |name: &'static str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| Error::MissingColumn(path.to_path_buf(), name))
    };
    let label_idx = column(LABEL_COLUMN)?;
    let value_idx = column(VALUE_COLUMN)?;

    let mut count = 0;
    for record in reader.records() {
        let record = record?;
        let category = match record.get(label_idx).map(str::parse::<Category>) {
            Some(Ok(c)) if accept(c) => c,
            _ => continue,
        };
        let raw = record.get(value_idx).unwrap_or_default();
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let value = raw
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| Error::InvalidVolume(path.to_path_buf(), line, raw.to_string()))?;
        data.push(category, value);
        count += 1;
    }
    Ok(count)
}

//! Configuration for the launcher and the size aggregator.
//!
//! Configuration is read from an optional file, either `toml` or `yaml`
//! (with the `yaml` feature). All the fields are optional and fall back
//! to the defaults defined in this module.

use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::util::{self, expand_index};
use crate::{
    Result, DEFAULT_OUTPUT_PATTERN, DEFAULT_PLOT_HEIGHT, DEFAULT_PLOT_WIDTH, DEFAULT_PROGRAM,
    DEFAULT_WORKERS, INDEX_PLACEHOLDER,
};

/// Top level structure of the config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub launcher: LauncherConfig,
    pub sizes: SizesConfig,
}

impl Config {
    /// Reads config from file at the given path.
    pub fn from_path(path: &Path) -> Result<Config> {
        let config: Config = util::deser_struct_from_path(path)?;
        debug!("loaded config from {}: {:?}", path.to_string_lossy(), config);
        Ok(config)
    }

    /// Reads config from file if it exists, otherwise returns defaults.
    pub fn from_path_or_default(path: &Path) -> Result<Config> {
        if path.is_file() {
            Self::from_path(path)
        } else {
            debug!(
                "config file not found at {}, using defaults",
                path.to_string_lossy()
            );
            Ok(Config::default())
        }
    }
}

/// Batch launcher settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherConfig {
    /// Executable invoked once per job.
    pub program: String,
    /// Arguments passed to the executable, `{index}` is replaced with
    /// the job index.
    pub args: Vec<String>,
    /// Number of jobs running at the same time.
    pub workers: usize,
    /// Output file name pattern, must contain `{index}`.
    pub output: String,
    /// Directory the jobs are run in and the outputs are written to.
    /// Inherited from the launching process if not set.
    pub dir: Option<PathBuf>,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        LauncherConfig {
            program: DEFAULT_PROGRAM.to_string(),
            args: vec![
                "--batch".to_string(),
                "model".to_string(),
                INDEX_PLACEHOLDER.to_string(),
            ],
            workers: DEFAULT_WORKERS,
            output: DEFAULT_OUTPUT_PATTERN.to_string(),
            dir: None,
        }
    }
}

impl LauncherConfig {
    /// Checks the settings before anything gets launched.
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(Error::InvalidConfig(
                "worker count must be at least 1".to_string(),
            ));
        }
        if self.program.trim().is_empty() {
            return Err(Error::InvalidConfig("program can't be empty".to_string()));
        }
        if !self.output.contains(INDEX_PLACEHOLDER) {
            return Err(Error::InvalidConfig(format!(
                "output pattern must contain {}: {}",
                INDEX_PLACEHOLDER, self.output
            )));
        }
        Ok(())
    }

    /// Sets arguments from a single shell-style string.
    pub fn set_args_str(&mut self, args: &str) -> Result<()> {
        self.args = shlex::split(args)
            .ok_or_else(|| Error::InvalidConfig(format!("failed parsing args: {}", args)))?;
        Ok(())
    }

    /// Path of the output file for the given job.
    pub fn output_path(&self, index: u32) -> PathBuf {
        let name = expand_index(&self.output, index);
        match &self.dir {
            Some(dir) => dir.join(name),
            None => PathBuf::from(name),
        }
    }

    /// Arguments for the given job.
    pub fn command_args(&self, index: u32) -> Vec<String> {
        self.args.iter().map(|a| expand_index(a, index)).collect()
    }
}

/// Size aggregator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizesConfig {
    /// Directory scanned for `<category>_sizes*.csv` files.
    pub dir: PathBuf,
    pub width: u32,
    pub height: u32,
}

impl Default for SizesConfig {
    fn default() -> Self {
        SizesConfig {
            dir: PathBuf::from("."),
            width: DEFAULT_PLOT_WIDTH,
            height: DEFAULT_PLOT_HEIGHT,
        }
    }
}

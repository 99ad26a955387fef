//! This library implements the tooling around cell complex simulation
//! sweeps.
//!
//! It covers three independent concerns:
//!
//! - [`batch`]: running a simulation program many times over a range of
//!   job indices, using a fixed-size worker pool, with each run's output
//!   captured to its own file.
//! - [`sizes`]: aggregating cell volume measurements written by the runs
//!   into per-category series, summarizing and plotting them.
//! - [`descriptor`]: static template instantiation descriptors consumed
//!   by an external code generator.
//!
//! # Using the library
//!
//! ```ignore
//! extern crate vvsweep_core as vvsweep;
//! use vvsweep::batch::{BatchEvent, BatchLauncher};
//! use vvsweep::config::LauncherConfig;
//!
//! pub fn main() {
//!     let launcher = BatchLauncher::new(LauncherConfig::default()).unwrap();
//!     let report = launcher.run(100, |event| {
//!         if let BatchEvent::JobDone(job) = event {
//!             println!("Process {} done", job.index);
//!         }
//!     }).unwrap();
//!     report.into_result().unwrap();
//! }
//! ```
//!
//! [`batch`]: batch/index.html
//! [`sizes`]: sizes/index.html
//! [`descriptor`]: descriptor/index.html

#[macro_use]
extern crate serde;
#[macro_use]
extern crate log;

// reexports
pub use batch::{BatchEvent, BatchLauncher, BatchReport, JobIndex};
pub use config::Config;
pub use descriptor::{TemplateDescriptor, CELL_COMPLEX_3D};
pub use error::{Error, Result};
pub use sizes::{Category, LabelScope, SizeData};

pub mod batch;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod sizes;

mod util;

pub const VERSION: &'static str = env!("CARGO_PKG_VERSION");

/// Name of the config file looked up in the working directory.
pub const CONFIG_FILE: &str = "vvsweep.toml";

/// Placeholder replaced with the job index in program arguments and
/// output file names.
pub const INDEX_PLACEHOLDER: &str = "{index}";

/// Simulation program invoked for each job.
pub const DEFAULT_PROGRAM: &str = "vveinterpreter";
/// Number of jobs running at the same time.
pub const DEFAULT_WORKERS: usize = 10;
pub const DEFAULT_OUTPUT_PATTERN: &str = "output{index}.txt";

pub const DEFAULT_PLOT_WIDTH: u32 = 1024;
pub const DEFAULT_PLOT_HEIGHT: u32 = 600;

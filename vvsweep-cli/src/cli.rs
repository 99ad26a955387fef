//! Application definition.

extern crate simplelog;

use std::path::{Path, PathBuf};

use anyhow::{Context, Error, Result};
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use colored::*;

use vvsweep::batch::{BatchEvent, BatchLauncher};
use vvsweep::sizes::{self, LabelScope, PlotConfig};
use vvsweep::config::LauncherConfig;
use vvsweep::{Config, JobIndex, CELL_COMPLEX_3D};

use self::simplelog::LevelFilter;
use crate::util;

pub const VERSION: &'static str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &'static str = env!("CARGO_PKG_AUTHORS");

pub fn app<'a, 'b>() -> App<'a, 'b> {
    App::new("vvsweep")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .version(VERSION)
        .author(AUTHORS)
        .about("Run simulation sweeps and analyse their output from the command line.")
        .arg(Arg::with_name("verbosity")
            .long("verbosity")
            .short("v")
            .takes_value(true)
            .default_value("info")
            .value_name("verb")
            .global(true)
            .help("Set the verbosity of the log output"))
        .arg(Arg::with_name("config")
            .long("config")
            .short("c")
            .takes_value(true)
            .value_name("path")
            .global(true)
            .help("Path to config file (defaults to ./vvsweep.toml if present)"))

        // run subcommand
        .subcommand(SubCommand::with_name("run")
            .display_order(10)
            .about("Run the simulation once for each job index in 0..count")
            .arg(Arg::with_name("count")
                .required(true)
                .value_name("count")
                .help("Number of jobs to run"))
            .arg(Arg::with_name("workers")
                .long("workers")
                .short("w")
                .takes_value(true)
                .value_name("n")
                .help("Number of jobs running at the same time"))
            .arg(Arg::with_name("program")
                .long("program")
                .short("p")
                .takes_value(true)
                .value_name("exe")
                .help("Program invoked for each job"))
            .arg(Arg::with_name("args")
                .long("args")
                .short("a")
                .takes_value(true)
                .allow_hyphen_values(true)
                .value_name("string")
                .help("Program arguments, {index} gets replaced with the job index"))
            .arg(Arg::with_name("output")
                .long("output")
                .short("o")
                .takes_value(true)
                .value_name("pattern")
                .help("Output file name pattern, must contain {index}"))
            .arg(Arg::with_name("dir")
                .long("dir")
                .short("d")
                .takes_value(true)
                .value_name("path")
                .help("Directory to run the jobs in and write the outputs to"))
        )

        // sizes subcommand
        .subcommand(SubCommand::with_name("sizes")
            .display_order(20)
            .about("Aggregate and plot cell sizes from <category>_sizes*.csv files")
            .arg(Arg::with_name("category")
                .required(true)
                .value_name("category")
                .help("Category selecting the files to load"))
            .arg(Arg::with_name("dir")
                .long("dir")
                .short("d")
                .takes_value(true)
                .value_name("path")
                .help("Directory to look for the files in"))
            .arg(Arg::with_name("output")
                .long("output")
                .short("o")
                .takes_value(true)
                .value_name("path")
                .help("Path of the plot file (defaults to <category>_sizes.svg)"))
            .arg(Arg::with_name("only-category")
                .long("only-category")
                .help("Only collect rows labeled with the given category"))
            .arg(Arg::with_name("no-plot")
                .long("no-plot")
                .help("Print the summary without plotting"))
        )

        // descriptor subcommand
        .subcommand(SubCommand::with_name("descriptor")
            .display_order(30)
            .about("Print the cell complex template descriptor")
            .arg(Arg::with_name("format")
                .long("format")
                .short("f")
                .takes_value(true)
                .possible_values(&["toml", "yaml"])
                .default_value("toml")
                .help("Output format"))
        )
}

/// Runs based on specified subcommand.
pub fn start(matches: ArgMatches) -> Result<()> {
    match matches.subcommand() {
        ("run", Some(m)) => start_run(m),
        ("sizes", Some(m)) => start_sizes(m),
        ("descriptor", Some(m)) => start_descriptor(m),
        _ => Ok(()),
    }
}

fn load_config(matches: &ArgMatches) -> Result<Config> {
    let config = match matches.value_of("config") {
        Some(path) => Config::from_path(Path::new(path))
            .with_context(|| format!("failed reading config at {}", path))?,
        None => Config::from_path_or_default(Path::new(vvsweep::CONFIG_FILE))?,
    };
    Ok(config)
}

fn start_run(matches: &ArgMatches) -> Result<()> {
    setup_log_verbosity(matches);
    let count = matches
        .value_of("count")
        .ok_or_else(|| Error::msg("job count must be provided"))?;
    let count = util::parse_count::<JobIndex>(count, "job count")?;
    let config = launcher_config(matches, load_config(matches)?)?;

    let launcher = BatchLauncher::new(config)?;
    let report = launcher.run(count, |event| match event {
        BatchEvent::JobDone(job) => match job.failure() {
            None => println!("Process {} done", job.index),
            Some(reason) => println!(
                "Process {} done {}",
                job.index,
                format!("({})", reason).yellow()
            ),
        },
        BatchEvent::AllDone(_) => println!("Done"),
    })?;

    for job in report.failed() {
        error!(
            "job {} failed: {} (see {})",
            job.index,
            job.failure().unwrap_or_default(),
            job.output.to_string_lossy()
        );
    }
    report.into_result()?;
    Ok(())
}

/// Applies the `run` subcommand flags on top of the loaded config.
fn launcher_config(matches: &ArgMatches, config: Config) -> Result<LauncherConfig> {
    let mut config = config.launcher;
    if let Some(workers) = matches.value_of("workers") {
        config.workers = util::parse_count(workers, "worker count")?;
    }
    if let Some(program) = matches.value_of("program") {
        config.program = program.to_string();
    }
    if let Some(args) = matches.value_of("args") {
        config.set_args_str(args)?;
    }
    if let Some(output) = matches.value_of("output") {
        config.output = output.to_string();
    }
    if let Some(dir) = matches.value_of("dir") {
        config.dir = Some(PathBuf::from(dir));
    }
    Ok(config)
}

fn label_scope(matches: &ArgMatches) -> LabelScope {
    if matches.is_present("only-category") {
        LabelScope::FileCategory
    } else {
        LabelScope::AllLabels
    }
}

fn start_sizes(matches: &ArgMatches) -> Result<()> {
    setup_log_verbosity(matches);
    let config = load_config(matches)?.sizes;

    let category = matches
        .value_of("category")
        .ok_or_else(|| Error::msg("category must be provided"))?;
    if category.parse::<vvsweep::Category>().is_err() {
        warn!("{} is not one of the known category labels", category);
    }
    let dir = matches
        .value_of("dir")
        .map(PathBuf::from)
        .unwrap_or(config.dir);
    let scope = label_scope(matches);

    let data = sizes::load_sizes(&dir, category, scope)
        .with_context(|| format!("failed loading sizes for {}", category))?;
    print!("{}", util::format_summary_table(&data));

    if !matches.is_present("no-plot") {
        let output = matches
            .value_of("output")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(format!("{}_sizes.svg", category)));
        let plot_config = PlotConfig {
            width: config.width,
            height: config.height,
            caption: format!("{} cell volumes", category),
        };
        sizes::plot_sizes(&data, &output, &plot_config)?;
        println!("Plot saved to {}", output.to_string_lossy());
    }
    Ok(())
}

fn start_descriptor(matches: &ArgMatches) -> Result<()> {
    setup_log_verbosity(matches);
    let text = match matches.value_of("format") {
        #[cfg(feature = "yaml")]
        Some("yaml") => CELL_COMPLEX_3D.to_yaml()?,
        #[cfg(not(feature = "yaml"))]
        Some("yaml") => return Err(Error::msg("yaml support not enabled")),
        _ => CELL_COMPLEX_3D.to_toml()?,
    };
    print!("{}", text);
    Ok(())
}

fn setup_log_verbosity(matches: &ArgMatches) {
    use self::simplelog::TermLogger;
    let level_filter = util::parse_level_filter(matches.value_of("verbosity"));
    let mut config_builder = simplelog::ConfigBuilder::new();
    let logger_conf = config_builder
        .set_time_level(LevelFilter::Error)
        .set_target_level(LevelFilter::Debug)
        .set_location_level(LevelFilter::Trace)
        .set_time_format_str("%H:%M:%S%.6f")
        .build();
    if TermLogger::init(level_filter, logger_conf, simplelog::TerminalMode::Mixed).is_err() {
        eprintln!("failed initializing logger");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn run_requires_count() {
        assert!(app().get_matches_from_safe(vec!["vvsweep", "run"]).is_err());
        let m = app()
            .get_matches_from_safe(vec!["vvsweep", "run", "12", "-w", "4"])
            .unwrap();
        let run = m.subcommand_matches("run").unwrap();
        assert_eq!(run.value_of("count"), Some("12"));
        assert_eq!(run.value_of("workers"), Some("4"));
    }

    #[test]
    fn args_may_start_with_hyphen() {
        let m = app()
            .get_matches_from_safe(vec!["vvsweep", "run", "3", "--args", "--batch model {index}"])
            .unwrap();
        let run = m.subcommand_matches("run").unwrap();
        assert_eq!(run.value_of("args"), Some("--batch model {index}"));
    }

    #[test]
    fn descriptor_format_is_checked() {
        assert!(app()
            .get_matches_from_safe(vec!["vvsweep", "descriptor", "-f", "json"])
            .is_err());
        let m = app()
            .get_matches_from_safe(vec!["vvsweep", "descriptor"])
            .unwrap();
        let desc = m.subcommand_matches("descriptor").unwrap();
        assert_eq!(desc.value_of("format"), Some("toml"));
    }

    #[test]
    fn global_options_reach_subcommands() {
        let m = app()
            .get_matches_from_safe(vec![
                "vvsweep",
                "sizes",
                "Apical",
                "--only-category",
                "-v",
                "debug",
                "-c",
                "conf.toml",
            ])
            .unwrap();
        let sizes = m.subcommand_matches("sizes").unwrap();
        assert_eq!(sizes.value_of("category"), Some("Apical"));
        assert!(sizes.is_present("only-category"));
        assert_eq!(sizes.value_of("verbosity"), Some("debug"));
        assert_eq!(sizes.value_of("config"), Some("conf.toml"));
    }

    fn launcher_config_from(args: Vec<&str>, config: Config) -> Result<LauncherConfig> {
        let m = app().get_matches_from_safe(args).unwrap();
        launcher_config(m.subcommand_matches("run").unwrap(), config)
    }

    #[test]
    fn run_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vvsweep.toml");
        fs::write(
            &path,
            "[launcher]\nprogram = \"model-runner\"\nworkers = 2\noutput = \"log{index}.txt\"\n",
        )
        .unwrap();
        let config = Config::from_path(&path).unwrap();

        let launcher = launcher_config_from(
            vec!["vvsweep", "run", "4", "-w", "7", "-a", "--seed {index}", "-d", "runs"],
            config.clone(),
        )
        .unwrap();
        assert_eq!(launcher.workers, 7);
        assert_eq!(launcher.args, vec!["--seed", "{index}"]);
        assert_eq!(launcher.dir, Some(PathBuf::from("runs")));
        assert_eq!(launcher.program, "model-runner");
        assert_eq!(launcher.output, "log{index}.txt");

        let untouched = launcher_config_from(vec!["vvsweep", "run", "4"], config.clone()).unwrap();
        assert_eq!(untouched, config.launcher);

        assert!(launcher_config_from(vec!["vvsweep", "run", "4", "-w", "many"], config).is_err());
    }

    #[test]
    fn only_category_selects_label_scope() {
        let m = app()
            .get_matches_from_safe(vec!["vvsweep", "sizes", "Apical", "--only-category"])
            .unwrap();
        assert_eq!(
            label_scope(m.subcommand_matches("sizes").unwrap()),
            LabelScope::FileCategory
        );
        let m = app()
            .get_matches_from_safe(vec!["vvsweep", "sizes", "Apical"])
            .unwrap();
        assert_eq!(
            label_scope(m.subcommand_matches("sizes").unwrap()),
            LabelScope::AllLabels
        );
    }

    #[cfg(unix)]
    #[test]
    fn failed_job_fails_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let tmp = dir.path().to_str().unwrap();
        let result = start(app().get_matches_from(vec![
            "vvsweep", "run", "2", "-p", "sh", "-a", "-c 'exit {index}'", "-d", tmp,
        ]));
        assert!(result.is_err());
        assert!(dir.path().join("output0.txt").exists());
        assert!(dir.path().join("output1.txt").exists());

        let result = start(app().get_matches_from(vec![
            "vvsweep", "run", "2", "-p", "sh", "-a", "-c 'exit 0'", "-d", tmp,
        ]));
        assert!(result.is_ok());
    }

    #[test]
    fn sizes_without_plot_writes_no_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("Apical_sizes_0.csv"),
            "Cell,Volume\nApical,1.5\nBasal,2.0\n",
        )
        .unwrap();
        let plot = dir.path().join("plot.svg");
        let tmp = dir.path().to_str().unwrap();
        let plot_str = plot.to_str().unwrap();

        start(app().get_matches_from(vec![
            "vvsweep", "sizes", "Apical", "-d", tmp, "-o", plot_str, "--only-category", "--no-plot",
        ]))
        .unwrap();
        assert!(!plot.exists());

        start(app().get_matches_from(vec!["vvsweep", "sizes", "Apical", "-d", tmp, "-o", plot_str]))
            .unwrap();
        assert!(fs::read_to_string(&plot).unwrap().contains("Basal"));
    }

    #[test]
    fn sizes_fail_on_bad_volume() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("Apical_sizes.csv"),
            "Cell,Volume\nApical,big\n",
        )
        .unwrap();
        let tmp = dir.path().to_str().unwrap();
        let result = start(app().get_matches_from(vec![
            "vvsweep", "sizes", "Apical", "-d", tmp, "--no-plot",
        ]));
        assert!(result.is_err());
    }
}

//! Runs a small sweep whose jobs write size files, then aggregates and
//! plots them.

#![cfg(unix)]

extern crate vvsweep_core as vvsweep;

use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};

use vvsweep::batch::{BatchEvent, BatchLauncher};
use vvsweep::config::{Config, LauncherConfig};
use vvsweep::sizes::{load_sizes, plot_sizes, PlotConfig};
use vvsweep::{Category, LabelScope};

const JOB_SCRIPT: &str = "printf 'Cell,Volume\\nApical,{index}.5\\nBasal,1.0\\nUnknown,9\\n' \
                          > Apical_sizes_run{index}.csv && echo written {index}";

#[test]
fn sweep_then_aggregate() {
    let dir = tempfile::tempdir().unwrap();
    let launcher = BatchLauncher::new(LauncherConfig {
        program: "sh".to_string(),
        args: vec!["-c".to_string(), JOB_SCRIPT.to_string()],
        workers: 3,
        dir: Some(dir.path().to_path_buf()),
        ..LauncherConfig::default()
    })
    .unwrap();

    let done = AtomicUsize::new(0);
    let report = launcher
        .run(6, |event| {
            if let BatchEvent::JobDone(_) = event {
                done.fetch_add(1, Ordering::SeqCst);
            }
        })
        .unwrap()
        .into_result()
        .unwrap();
    assert_eq!(done.load(Ordering::SeqCst), 6);
    assert_eq!(report.total(), 6);
    for job in &report.jobs {
        let log = fs::read_to_string(&job.output).unwrap();
        assert_eq!(log.trim(), format!("written {}", job.index));
    }

    let data = load_sizes(dir.path(), "Apical", LabelScope::AllLabels).unwrap();
    let mut apical = data.get(Category::Apical).to_vec();
    apical.sort_by(f64::total_cmp);
    assert_eq!(apical, vec![0.5, 1.5, 2.5, 3.5, 4.5, 5.5]);
    assert_eq!(data.get(Category::Basal).len(), 6);
    assert_eq!(data.len(), 12);

    let only = load_sizes(dir.path(), "Apical", LabelScope::FileCategory).unwrap();
    assert_eq!(only.len(), 6);

    let plot_path = dir.path().join("Apical_sizes.svg");
    plot_sizes(&data, &plot_path, &PlotConfig::default()).unwrap();
    let svg = fs::read_to_string(&plot_path).unwrap();
    assert!(svg.contains("<svg"));
    assert!(svg.contains("InnerBasal"));
}

#[test]
fn config_file_drives_the_launcher() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("vvsweep.toml");
    fs::write(
        &config_path,
        format!(
            "[launcher]\nprogram = \"sh\"\nargs = [\"-c\", \"echo run {{index}}\"]\n\
             workers = 2\noutput = \"log_{{index}}.out\"\ndir = {:?}\n",
            dir.path().to_string_lossy()
        ),
    )
    .unwrap();

    let config = Config::from_path(&config_path).unwrap();
    let launcher = BatchLauncher::new(config.launcher).unwrap();
    let report = launcher.run(3, |_| ()).unwrap();
    assert!(report.is_success());
    for i in 0..3 {
        let log = fs::read_to_string(dir.path().join(format!("log_{}.out", i))).unwrap();
        assert_eq!(log, format!("run {}\n", i));
    }
}

//! Running jobs as external processes.

use std::fs::File;
use std::io;
use std::env;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::config::LauncherConfig;
use crate::util::expand_index;

use super::{Executor, JobExit, JobIndex};

/// Runs each job as a separate process of an external program.
///
/// Both standard output and standard error of the process go to the job's
/// output file. Environment is inherited, as is the working directory
/// unless one is configured.
///
/// A relative program path with more than one component, like
/// `./vveinterpreter`, is resolved against the directory vvsweep was
/// started in, even when the jobs run in another directory. Bare program
/// names are looked up in `PATH`.
#[derive(Debug, Clone)]
pub struct SubprocessExecutor {
    pub program: String,
    pub args: Vec<String>,
    pub dir: Option<PathBuf>,
}

impl SubprocessExecutor {
    pub fn from_config(config: &LauncherConfig) -> SubprocessExecutor {
        SubprocessExecutor {
            program: config.program.clone(),
            args: config.args.clone(),
            dir: config.dir.clone(),
        }
    }

    /// Builds the command for the given job, without the output
    /// redirection.
    pub fn command(&self, index: JobIndex) -> Command {
        let mut cmd = Command::new(self.program_path());
        cmd.args(self.args.iter().map(|a| expand_index(a, index)));
        if let Some(dir) = &self.dir {
            cmd.current_dir(dir);
        }
        cmd
    }

    fn program_path(&self) -> PathBuf {
        let program = Path::new(&self.program);
        if self.dir.is_none() || program.is_absolute() || program.components().count() < 2 {
            return program.to_path_buf();
        }
        match env::current_dir() {
            Ok(cwd) => cwd.join(program),
            Err(e) => {
                warn!("can't resolve {} against the current dir: {}", self.program, e);
                program.to_path_buf()
            }
        }
    }
}

impl Executor for SubprocessExecutor {
    fn execute(&self, index: JobIndex, output: File) -> io::Result<JobExit> {
        let stderr = output.try_clone()?;
        let status = self
            .command(index)
            .stdout(Stdio::from(output))
            .stderr(Stdio::from(stderr))
            .status()
            .map_err(|e| io::Error::new(e.kind(), format!("{}: {}", self.program, e)))?;
        Ok(status.into())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::batch::BatchLauncher;
    use std::fs;

    fn sh_config(dir: &std::path::Path, script: &str) -> LauncherConfig {
        LauncherConfig {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), script.to_string()],
            workers: 4,
            dir: Some(dir.to_path_buf()),
            ..LauncherConfig::default()
        }
    }

    #[test]
    fn captures_stdout_and_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let launcher =
            BatchLauncher::new(sh_config(dir.path(), "echo out {index}; echo err {index} >&2"))
                .unwrap();
        let report = launcher.run(3, |_| ()).unwrap();
        assert!(report.is_success());
        for i in 0..3 {
            let content = fs::read_to_string(dir.path().join(format!("output{}.txt", i))).unwrap();
            assert!(content.contains(&format!("out {}", i)));
            assert!(content.contains(&format!("err {}", i)));
        }
    }

    #[test]
    fn truncates_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        let stale = dir.path().join("output0.txt");
        fs::write(&stale, "stale content that is longer than the new one").unwrap();
        let launcher = BatchLauncher::new(sh_config(dir.path(), "printf new")).unwrap();
        launcher.run(1, |_| ()).unwrap();
        assert_eq!(fs::read_to_string(&stale).unwrap(), "new");
    }

    #[test]
    fn runs_in_configured_dir() {
        let dir = tempfile::tempdir().unwrap();
        let launcher = BatchLauncher::new(sh_config(dir.path(), "touch marker{index}")).unwrap();
        launcher.run(2, |_| ()).unwrap();
        assert!(dir.path().join("marker0").exists());
        assert!(dir.path().join("marker1").exists());
    }

    #[test]
    fn nonzero_exit_is_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        let launcher = BatchLauncher::new(sh_config(dir.path(), "exit {index}")).unwrap();
        let report = launcher.run(3, |_| ()).unwrap();
        let failed: Vec<_> = report.failed().map(|j| j.index).collect();
        assert_eq!(failed, vec![1, 2]);
        assert_eq!(report.jobs[2].result, Ok(JobExit { code: Some(2) }));
    }

    #[test]
    fn relative_program_path_ignores_job_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut exec = SubprocessExecutor {
            program: "./vveinterpreter".to_string(),
            args: vec![],
            dir: Some(dir.path().to_path_buf()),
        };
        let cwd = env::current_dir().unwrap();
        assert_eq!(
            exec.command(0).get_program(),
            cwd.join("./vveinterpreter").as_os_str()
        );

        exec.program = "sh".to_string();
        assert_eq!(exec.command(0).get_program(), "sh");

        exec.program = "/bin/sh".to_string();
        assert_eq!(exec.command(0).get_program(), "/bin/sh");

        exec.program = "bin/run".to_string();
        exec.dir = None;
        assert_eq!(exec.command(0).get_program(), "bin/run");
    }

    #[test]
    fn missing_program_fails_every_job() {
        let dir = tempfile::tempdir().unwrap();
        let launcher = BatchLauncher::new(LauncherConfig {
            program: "vvsweep-surely-missing-program".to_string(),
            dir: Some(dir.path().to_path_buf()),
            ..LauncherConfig::default()
        })
        .unwrap();
        let report = launcher.run(4, |_| ()).unwrap();
        assert_eq!(report.failed_count(), 4);
        let reason = report.jobs[0].failure().unwrap();
        assert!(reason.contains("vvsweep-surely-missing-program"));
        assert!(report.into_result().is_err());
    }
}

use crate::heasoft::env::HeasoftEnv;
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use uvotcore::records::OutputKind;
use uvotcore::Filter;

/// Aperture photometry settings shared by `uvotsource` and `uvotmaghist`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PhotometryConfig {
    /// Source region, relative to the target directory (`fk5; circle(ra, dec, r")`).
    pub src_region: String,
    /// Background region, relative to the target directory.
    pub bkg_region: String,
    pub sigma: f64,
    pub apercorr: String,
}

impl Default for PhotometryConfig {
    fn default() -> Self {
        Self {
            src_region: "src.reg".into(),
            bkg_region: "bkg.reg".into(),
            sigma: 3.0,
            apercorr: "CURVEOFGROWTH".into(),
        }
    }
}

/// One HEAsoft task call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskInvocation {
    pub program: String,
    pub args: Vec<String>,
    /// Where to keep the task's stdout, if anywhere.
    pub stdout: Option<PathBuf>,
}

impl TaskInvocation {
    fn new(program: &str, args: Vec<String>) -> Self {
        Self {
            program: program.to_string(),
            args,
            stdout: None,
        }
    }

    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        if let Some(stdout) = &self.stdout {
            line.push_str(&format!(" > {}", stdout.display()));
        }
        line
    }
}

/// The tasks run for a single sky image.
pub struct ImageTasks<'a> {
    pub target_dir: &'a Path,
    pub image_dir: &'a Path,
    pub image: &'a Path,
    pub filter: Filter,
    pub config: &'a PhotometryConfig,
}

impl ImageTasks<'_> {
    fn summed_image(&self) -> PathBuf {
        self.image_dir.join(format!("{}.fits", self.filter.code()))
    }

    fn region(&self, name: &str) -> String {
        self.target_dir.join(name).display().to_string()
    }

    /// `uvotimsum` sums the exposures of the sky image into `<F>.fits`.
    pub fn imsum(&self) -> TaskInvocation {
        TaskInvocation::new(
            "uvotimsum",
            vec![
                format!("infile={}", self.image.display()),
                format!("outfile={}", self.summed_image().display()),
                "clobber=yes".into(),
            ],
        )
    }

    /// `uvotsource` on the summed image, written to `<F>_stacked.out`.
    pub fn source(&self) -> TaskInvocation {
        let mut task = TaskInvocation::new(
            "uvotsource",
            vec![
                format!("image={}", self.summed_image().display()),
                format!("srcreg={}", self.region(&self.config.src_region)),
                format!("bkgreg={}", self.region(&self.config.bkg_region)),
                format!("sigma={}", self.config.sigma),
                format!(
                    "outfile={}",
                    self.image_dir
                        .join(OutputKind::Stacked.file_name(self.filter))
                        .display()
                ),
                "syserr=yes".into(),
                "output=ALL".into(),
                format!("apercorr={}", self.config.apercorr),
                "clobber=yes".into(),
            ],
        );
        task.stdout = Some(self.image_dir.join(format!("{}.dat", self.filter.code())));
        task
    }

    /// `uvotmaghist` on every exposure, written to `<F>_maghist.out`.
    pub fn maghist(&self) -> TaskInvocation {
        TaskInvocation::new(
            "uvotmaghist",
            vec![
                format!("infile={}", self.image.display()),
                format!("srcreg={}", self.region(&self.config.src_region)),
                format!("bkgreg={}", self.region(&self.config.bkg_region)),
                format!(
                    "outfile={}",
                    self.image_dir
                        .join(OutputKind::MagHist.file_name(self.filter))
                        .display()
                ),
                format!("plotfile={}", self.image_dir.join(format!("{}_maghist.gif", self.filter.code())).display()),
                format!("sigma={}", self.config.sigma),
                format!("apercorr={}", self.config.apercorr),
                "clobber=yes".into(),
            ],
        )
    }

    pub fn all(&self) -> Vec<TaskInvocation> {
        vec![self.imsum(), self.source(), self.maghist()]
    }
}

/// Executes task invocations; each call blocks until the task is done.
pub trait TaskRunner {
    fn run(&self, task: &TaskInvocation, env: &HeasoftEnv) -> anyhow::Result<()>;
}

/// Spawns the task with the explicit HEAsoft environment.
pub struct ProcessRunner;

impl TaskRunner for ProcessRunner {
    fn run(&self, task: &TaskInvocation, env: &HeasoftEnv) -> anyhow::Result<()> {
        let mut command = Command::new(&task.program);
        command.args(&task.args);
        env.apply(&mut command);

        let output = command
            .output()
            .with_context(|| format!("spawning {}", task.program))?;
        if let Some(path) = &task.stdout {
            fs::write(path, &output.stdout)
                .with_context(|| format!("saving {} output to {}", task.program, path.display()))?;
        }
        if !output.status.success() {
            bail!(
                "{} exited with {}: {}",
                task.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(())
    }
}

/// Prints the command lines instead of running them.
pub struct DryRunner;

impl TaskRunner for DryRunner {
    fn run(&self, task: &TaskInvocation, _env: &HeasoftEnv) -> anyhow::Result<()> {
        println!("{}", task.command_line());
        Ok(())
    }
}

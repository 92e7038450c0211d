use crate::heasoft::env::HeasoftEnv;
use crate::heasoft::tasks::{ImageTasks, PhotometryConfig, TaskRunner};
use anyhow::Context;
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use uvotcore::processing::discovery::image_dir;
use uvotcore::Filter;

/// Marker for sky images inside `uvot/image`.
const SKY_IMAGE_MARKER: &str = "_sk.img.gz";

/// Swift observation ids are eleven digits.
pub fn is_observation_id(name: &str) -> bool {
    name.len() == 11 && name.bytes().all(|b| b.is_ascii_digit())
}

/// Filter of a sky image such as `sw00016042001uw1_sk.img.gz`.
pub fn image_filter(file_name: &str) -> Option<Filter> {
    file_name.get(14..16).and_then(Filter::from_image_code)
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DriverReport {
    pub observations: usize,
    pub images: usize,
    pub tasks_run: usize,
    pub failures: usize,
}

/// Runs the HEAsoft photometry chain over every sky image of a target.
pub struct PhotometryDriver<'a, R: TaskRunner> {
    config: &'a PhotometryConfig,
    env: &'a HeasoftEnv,
    runner: R,
}

impl<'a, R: TaskRunner> PhotometryDriver<'a, R> {
    pub fn new(config: &'a PhotometryConfig, env: &'a HeasoftEnv, runner: R) -> Self {
        Self {
            config,
            env,
            runner,
        }
    }

    pub fn run(&self, target_dir: &Path) -> anyhow::Result<DriverReport> {
        let mut report = DriverReport::default();
        for observation in observation_ids(target_dir)? {
            report.observations += 1;
            let images_dir = image_dir(&target_dir.join(&observation));
            for (image, filter) in sky_images(&images_dir)? {
                report.images += 1;
                info!("{} {}: {}", observation, filter, image.display());
                let tasks = ImageTasks {
                    target_dir,
                    image_dir: &images_dir,
                    image: &image,
                    filter,
                    config: self.config,
                };
                for task in tasks.all() {
                    report.tasks_run += 1;
                    if let Err(err) = self.runner.run(&task, self.env) {
                        warn!("{} {}: {:#}", observation, filter, err);
                        report.failures += 1;
                        break;
                    }
                }
            }
        }
        info!(
            "photometry finished: {} observations, {} images, {} tasks, {} failures",
            report.observations, report.images, report.tasks_run, report.failures
        );
        Ok(report)
    }
}

fn observation_ids(target_dir: &Path) -> anyhow::Result<Vec<String>> {
    let entries = fs::read_dir(target_dir)
        .with_context(|| format!("listing target directory {}", target_dir.display()))?;
    let mut ids = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("listing {}", target_dir.display()))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if is_observation_id(&name) && entry.path().is_dir() {
            ids.push(name);
        }
    }
    ids.sort();
    Ok(ids)
}

fn sky_images(images_dir: &Path) -> anyhow::Result<Vec<(PathBuf, Filter)>> {
    if !images_dir.is_dir() {
        warn!("{} has no UVOT images", images_dir.display());
        return Ok(Vec::new());
    }
    let entries = fs::read_dir(images_dir)
        .with_context(|| format!("listing {}", images_dir.display()))?;
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("listing {}", images_dir.display()))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.contains(SKY_IMAGE_MARKER) {
            names.push(name);
        }
    }
    names.sort();

    let mut images = Vec::new();
    for name in names {
        match image_filter(&name) {
            Some(filter) => images.push((images_dir.join(&name), filter)),
            None => warn!("{}: unrecognised filter code, skipping", name),
        }
    }
    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heasoft::tasks::TaskInvocation;
    use std::cell::RefCell;
    use tempfile::tempdir;

    #[derive(Default)]
    struct RecordingRunner {
        calls: RefCell<Vec<TaskInvocation>>,
        fail_program: Option<&'static str>,
    }

    impl TaskRunner for &RecordingRunner {
        fn run(&self, task: &TaskInvocation, env: &HeasoftEnv) -> anyhow::Result<()> {
            assert_eq!(env.get("HEADASPROMPT"), Some("/dev/null"));
            self.calls.borrow_mut().push(task.clone());
            match self.fail_program {
                Some(program) if program == task.program => anyhow::bail!("{} failed", program),
                _ => Ok(()),
            }
        }
    }

    fn env() -> HeasoftEnv {
        HeasoftEnv::from_vars([("HEADASPROMPT".to_string(), "/dev/null".to_string())].into())
    }

    fn target_with_images(root: &Path) -> PathBuf {
        let target = root.join("SN2023ixf");
        let images = image_dir(&target.join("00016042001"));
        fs::create_dir_all(&images).unwrap();
        for name in [
            "sw00016042001uw1_sk.img.gz",
            "sw00016042001ubb_sk.img.gz",
            "sw00016042001uxx_sk.img.gz",
            "sw00016042001uw1_ex.img.gz",
        ] {
            fs::write(images.join(name), b"").unwrap();
        }
        fs::create_dir_all(target.join("notes")).unwrap();
        target
    }

    #[test]
    fn recognises_observation_ids() {
        assert!(is_observation_id("00016042001"));
        assert!(!is_observation_id("0001604200"));
        assert!(!is_observation_id("0001604200a"));
    }

    #[test]
    fn filter_comes_from_image_name() {
        assert_eq!(image_filter("sw00016042001uw1_sk.img.gz"), Some(Filter::UW1));
        assert_eq!(image_filter("sw00016042001uvv_sk.img.gz"), Some(Filter::V));
        assert_eq!(image_filter("short"), None);
    }

    #[test]
    fn sky_images_are_sorted_and_filtered() {
        let root = tempdir().unwrap();
        let target = target_with_images(root.path());
        let images_dir = image_dir(&target.join("00016042001"));

        let images = sky_images(&images_dir).unwrap();
        let filters: Vec<Filter> = images.iter().map(|(_, filter)| *filter).collect();
        assert_eq!(filters, vec![Filter::B, Filter::UW1]);
        assert!(images[0].0.ends_with("sw00016042001ubb_sk.img.gz"));

        assert!(sky_images(&target.join("00016042002/uvot/image")).unwrap().is_empty());
    }

    #[test]
    fn runs_three_tasks_per_recognised_sky_image() {
        let root = tempdir().unwrap();
        let target = target_with_images(root.path());
        let runner = RecordingRunner::default();
        let config = PhotometryConfig::default();
        let env = env();

        let report = PhotometryDriver::new(&config, &env, &runner).run(&target).unwrap();

        assert_eq!(report.observations, 1);
        assert_eq!(report.images, 2);
        assert_eq!(report.tasks_run, 6);
        assert_eq!(report.failures, 0);
        let calls = runner.calls.borrow();
        assert!(calls[0].args.iter().any(|arg| arg.ends_with("B.fits")));
        assert!(calls[3].args.iter().any(|arg| arg.ends_with("UW1.fits")));
    }

    #[test]
    fn failed_task_stops_that_image_only() {
        let root = tempdir().unwrap();
        let target = target_with_images(root.path());
        let runner = RecordingRunner {
            fail_program: Some("uvotimsum"),
            ..Default::default()
        };
        let config = PhotometryConfig::default();
        let env = env();

        let report = PhotometryDriver::new(&config, &env, &runner).run(&target).unwrap();
        assert_eq!(report.images, 2);
        assert_eq!(report.tasks_run, 2);
        assert_eq!(report.failures, 2);
    }
}

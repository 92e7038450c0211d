use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use log::{info, warn};
use std::fs;
use std::path::PathBuf;

/// State of a target's data directory after preparation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetWorkspace {
    pub dir: PathBuf,
    pub created: bool,
    pub has_src_region: bool,
    pub has_bkg_region: bool,
}

impl TargetWorkspace {
    pub fn ready_for_photometry(&self) -> bool {
        self.has_src_region && self.has_bkg_region
    }
}

/// Creates `<data_root>/<name without spaces>` if needed and checks for region files.
pub fn prepare(config: &WorkflowConfig, name: &str) -> anyhow::Result<TargetWorkspace> {
    let dir = config.target_dir(name);
    let created = !dir.is_dir();
    if created {
        fs::create_dir_all(&dir)
            .with_context(|| format!("creating target directory {}", dir.display()))?;
        info!("created {}", dir.display());
    }

    let workspace = TargetWorkspace {
        has_src_region: dir.join(&config.photometry.src_region).is_file(),
        has_bkg_region: dir.join(&config.photometry.bkg_region).is_file(),
        created,
        dir,
    };
    if !workspace.ready_for_photometry() {
        warn!(
            "{}: add {} and {} (fk5; circle(ra, dec, radius\")) before running photometry",
            workspace.dir.display(),
            config.photometry.src_region,
            config.photometry.bkg_region
        );
    }
    Ok(workspace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn prepare_is_idempotent() {
        let root = tempdir().unwrap();
        let cfg = WorkflowConfig {
            data_root: root.path().join("data"),
            ..Default::default()
        };

        let first = prepare(&cfg, "SN 2023ixf").unwrap();
        assert!(first.created);
        assert!(first.dir.ends_with("data/SN2023ixf"));
        assert!(!first.ready_for_photometry());

        fs::write(first.dir.join("src.reg"), "fk5; circle(210.91,54.31,5\")\n").unwrap();
        fs::write(first.dir.join("bkg.reg"), "fk5; circle(210.95,54.33,20\")\n").unwrap();

        let second = prepare(&cfg, "SN 2023ixf").unwrap();
        assert!(!second.created);
        assert!(second.ready_for_photometry());
    }
}

use crate::prelude::{Filter, LightCurveError, LightCurveResult};
use crate::records::OutputKind;
use crate::telemetry::log::LogManager;
use std::fs;
use std::path::{Path, PathBuf};

/// Photometry products live here, relative to an observation directory.
pub const IMAGE_SUBDIR: [&str; 2] = ["uvot", "image"];

/// A per-filter photometry table chosen for one observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredTable {
    pub observation: String,
    pub filter: Filter,
    pub path: PathBuf,
    pub kind: OutputKind,
}

/// Result of scanning a target directory.
#[derive(Debug, Default, Clone)]
pub struct Discovery {
    pub tables: Vec<DiscoveredTable>,
    /// (observation, filter) pairs with no table at all.
    pub skipped: Vec<(String, Filter)>,
}

pub fn image_dir(observation_dir: &Path) -> PathBuf {
    IMAGE_SUBDIR
        .iter()
        .fold(observation_dir.to_path_buf(), |dir, part| dir.join(part))
}

/// Sub-directories of `target_dir`, sorted by name.
pub fn observation_dirs(target_dir: &Path) -> LightCurveResult<Vec<(String, PathBuf)>> {
    let entries = fs::read_dir(target_dir).map_err(|err| LightCurveError::io(target_dir, err))?;
    let mut observations = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| LightCurveError::io(target_dir, err))?;
        let path = entry.path();
        if path.is_dir() {
            observations.push((entry.file_name().to_string_lossy().into_owned(), path));
        }
    }
    observations.sort();
    Ok(observations)
}

/// Picks the table for one filter, preferring the stacked product.
pub fn select_table(image_dir: &Path, filter: Filter) -> Option<(PathBuf, OutputKind)> {
    [OutputKind::Stacked, OutputKind::MagHist]
        .into_iter()
        .map(|kind| (image_dir.join(kind.file_name(filter)), kind))
        .find(|(path, _)| path.is_file())
}

/// Walks every observation of a target and selects one table per filter.
pub struct TableDiscovery {
    filters: Vec<Filter>,
    logger: LogManager,
}

impl TableDiscovery {
    pub fn new(filters: &[Filter]) -> Self {
        Self {
            filters: filters.to_vec(),
            logger: LogManager::new("discovery"),
        }
    }

    pub fn scan(&self, target_dir: &Path) -> LightCurveResult<Discovery> {
        let mut discovery = Discovery::default();
        for (observation, dir) in observation_dirs(target_dir)? {
            let images = image_dir(&dir);
            for &filter in &self.filters {
                match select_table(&images, filter) {
                    Some((path, kind)) => {
                        self.logger
                            .detail(&format!("{} {} -> {}", observation, filter, path.display()));
                        discovery.tables.push(DiscoveredTable {
                            observation: observation.clone(),
                            filter,
                            path,
                            kind,
                        });
                    }
                    None => discovery.skipped.push((observation.clone(), filter)),
                }
            }
        }
        self.logger.record(&format!(
            "{} tables found under {}, {} filter/observation pairs without output",
            discovery.tables.len(),
            target_dir.display(),
            discovery.skipped.len()
        ));
        Ok(discovery)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(dir: &Path, name: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(name), b"").unwrap();
    }

    #[test]
    fn stacked_output_wins_over_maghist() {
        let root = tempdir().unwrap();
        let images = image_dir(&root.path().join("00012345001"));
        touch(&images, "U_stacked.out");
        touch(&images, "U_maghist.out");

        let discovery = TableDiscovery::new(&[Filter::U]).scan(root.path()).unwrap();
        assert_eq!(discovery.tables.len(), 1);
        assert_eq!(discovery.tables[0].kind, OutputKind::Stacked);
        assert_eq!(discovery.tables[0].path, images.join("U_stacked.out"));
    }

    #[test]
    fn maghist_is_used_when_no_stack_exists() {
        let root = tempdir().unwrap();
        let images = image_dir(&root.path().join("00012345001"));
        touch(&images, "UW2_maghist.out");

        let (path, kind) = select_table(&images, Filter::UW2).unwrap();
        assert_eq!(kind, OutputKind::MagHist);
        assert!(path.ends_with("UW2_maghist.out"));
    }

    #[test]
    fn missing_outputs_are_skipped_without_error() {
        let root = tempdir().unwrap();
        let images = image_dir(&root.path().join("00012345002"));
        touch(&images, "B_maghist.out");
        fs::create_dir_all(root.path().join("00012345001")).unwrap();

        let discovery = TableDiscovery::new(&Filter::ALL).scan(root.path()).unwrap();
        assert_eq!(discovery.tables.len(), 1);
        assert_eq!(discovery.tables[0].observation, "00012345002");
        assert_eq!(discovery.skipped.len(), 2 * Filter::ALL.len() - 1);
    }

    #[test]
    fn observations_are_sorted_and_files_ignored() {
        let root = tempdir().unwrap();
        fs::create_dir_all(root.path().join("00012345003")).unwrap();
        fs::create_dir_all(root.path().join("00012345001")).unwrap();
        fs::write(root.path().join("src.reg"), b"").unwrap();

        let names: Vec<String> = observation_dirs(root.path())
            .unwrap()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, vec!["00012345001", "00012345003"]);
    }

    #[test]
    fn filter_prefix_must_match_exactly() {
        let root = tempdir().unwrap();
        let images = image_dir(&root.path().join("00012345001"));
        touch(&images, "UW1_stacked.out");
        assert!(select_table(&images, Filter::W).is_none());
        assert!(select_table(&images, Filter::U).is_none());
    }
}

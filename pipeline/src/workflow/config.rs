use crate::heasoft::{HeasoftConfig, PhotometryConfig};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use uvotcore::io::LIGHT_CURVE_FILE;
use uvotcore::{AssemblyConfig, Filter, LimitOffset, MagnitudeSystem};

/// Settings for every `uvot` subcommand, loadable from YAML.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Directory holding one sub-directory per target.
    pub data_root: PathBuf,
    /// Fixed S/N for detections; negative uses each row's stored significance.
    pub snr_limit: f64,
    pub magnitude_system: MagnitudeSystem,
    pub limit_offset: LimitOffset,
    pub filters: Vec<Filter>,
    /// Light-curve table, relative to the target directory.
    pub output_file: String,
    /// Plot model, relative to the target directory.
    pub plot_file: String,
    /// Rendered SVG chart, relative to the target directory.
    pub plot_image: String,
    pub heasoft: HeasoftConfig,
    pub photometry: PhotometryConfig,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("data"),
            snr_limit: AssemblyConfig::PER_ROW_THRESHOLD,
            magnitude_system: MagnitudeSystem::default(),
            limit_offset: LimitOffset::default(),
            filters: Filter::ALL.to_vec(),
            output_file: LIGHT_CURVE_FILE.into(),
            plot_file: "UVOT_light_curve.json".into(),
            plot_image: "UVOT_light_curve.svg".into(),
            heasoft: HeasoftConfig::default(),
            photometry: PhotometryConfig::default(),
        }
    }
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn to_assembly_config(&self) -> AssemblyConfig {
        AssemblyConfig {
            snr_limit: self.snr_limit,
            magnitude_system: self.magnitude_system,
            limit_offset: self.limit_offset,
            filters: self.filters.clone(),
        }
    }

    pub fn target_dir(&self, name: &str) -> PathBuf {
        self.data_root.join(target_dir_name(name))
    }
}

/// Directory name for a target: the name with all whitespace removed.
pub fn target_dir_name(name: &str) -> String {
    name.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_match_the_light_curve_layout() {
        let cfg = WorkflowConfig::default();
        assert_eq!(cfg.output_file, "UVOT_light_curve.dat");
        assert_eq!(cfg.plot_image, "UVOT_light_curve.svg");
        assert_eq!(cfg.to_assembly_config().snr_override(), None);
        assert_eq!(cfg.filters.len(), 7);
    }

    #[test]
    fn target_names_lose_their_spaces() {
        assert_eq!(target_dir_name("SN 2023ixf"), "SN2023ixf");
        let cfg = WorkflowConfig::default();
        assert_eq!(cfg.target_dir("AT 2024 abc"), PathBuf::from("data/AT2024abc"));
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"data_root: /scratch/uvot\nsnr_limit: 3\nmagnitude_system: vega\nlimit_offset: signed\nfilters: [UW1, UM2, UW2]\nheasoft:\n  headas: /opt/heasoft/x86_64-pc-linux-gnu-libc2.35\n  caldb: /opt/caldb\nphotometry:\n  sigma: 5.0\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = WorkflowConfig::load(&path).unwrap();

        assert_eq!(cfg.data_root, PathBuf::from("/scratch/uvot"));
        assert_eq!(cfg.magnitude_system, MagnitudeSystem::Vega);
        assert_eq!(cfg.limit_offset, LimitOffset::Signed);
        assert_eq!(cfg.filters, vec![Filter::UW1, Filter::UM2, Filter::UW2]);
        assert_eq!(cfg.heasoft.caldb, Some(PathBuf::from("/opt/caldb")));
        assert_eq!(cfg.heasoft.prompt, "/dev/null");
        assert_eq!(cfg.photometry.sigma, 5.0);
        assert_eq!(cfg.photometry.src_region, "src.reg");
        assert_eq!(cfg.to_assembly_config().snr_override(), Some(3.0));
    }

    #[test]
    fn malformed_yaml_is_reported() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"snr_limit: [not, a, number]\n").unwrap();
        let path = temp.into_temp_path();
        assert!(WorkflowConfig::load(&path).is_err());
    }
}

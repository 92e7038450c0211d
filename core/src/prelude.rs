use crate::records::PhotometryRow;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// UVOT filters in the fixed order used for discovery and output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Filter {
    V,
    B,
    U,
    UW1,
    UM2,
    UW2,
    W,
}

impl Filter {
    pub const ALL: [Filter; 7] = [
        Filter::V,
        Filter::B,
        Filter::U,
        Filter::UW1,
        Filter::UM2,
        Filter::UW2,
        Filter::W,
    ];

    /// Canonical filter code as it appears in file names and the output table.
    pub fn code(self) -> &'static str {
        match self {
            Filter::V => "V",
            Filter::B => "B",
            Filter::U => "U",
            Filter::UW1 => "UW1",
            Filter::UM2 => "UM2",
            Filter::UW2 => "UW2",
            Filter::W => "W",
        }
    }

    /// Maps the two-letter code embedded in sky image names (`sw<obsid>u<xx>_sk.img.gz`).
    pub fn from_image_code(code: &str) -> Option<Filter> {
        match code {
            "vv" => Some(Filter::V),
            "bb" => Some(Filter::B),
            "uu" => Some(Filter::U),
            "w1" => Some(Filter::UW1),
            "m2" => Some(Filter::UM2),
            "w2" => Some(Filter::UW2),
            "wh" => Some(Filter::W),
            _ => None,
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Filter {
    type Err = LightCurveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Filter::ALL
            .iter()
            .copied()
            .find(|filter| filter.code() == s)
            .ok_or_else(|| LightCurveError::InvalidInput(format!("unknown filter '{}'", s)))
    }
}

/// Magnitude system used for the plotted value and limit offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MagnitudeSystem {
    #[default]
    Ab,
    Vega,
}

/// Sign convention for the one-sided offset of a limit point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LimitOffset {
    /// `|m - m_lim|`
    #[default]
    Absolute,
    /// `m - m_lim`, as written by the earliest light-curve scripts.
    Signed,
}

impl FromStr for MagnitudeSystem {
    type Err = LightCurveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ab" => Ok(MagnitudeSystem::Ab),
            "vega" => Ok(MagnitudeSystem::Vega),
            other => Err(LightCurveError::InvalidInput(format!(
                "unknown magnitude system '{}' (expected ab or vega)",
                other
            ))),
        }
    }
}

impl FromStr for LimitOffset {
    type Err = LightCurveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "absolute" => Ok(LimitOffset::Absolute),
            "signed" => Ok(LimitOffset::Signed),
            other => Err(LightCurveError::InvalidInput(format!(
                "unknown limit offset convention '{}' (expected absolute or signed)",
                other
            ))),
        }
    }
}

/// Shared configuration for discovery and classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssemblyConfig {
    /// Fixed S/N threshold; any negative value defers to the per-row significance.
    pub snr_limit: f64,
    pub magnitude_system: MagnitudeSystem,
    pub limit_offset: LimitOffset,
    pub filters: Vec<Filter>,
}

impl AssemblyConfig {
    pub const PER_ROW_THRESHOLD: f64 = -1.0;

    pub fn with_snr_limit(snr_limit: f64) -> Self {
        Self {
            snr_limit,
            ..Default::default()
        }
    }

    /// The caller's override, if it is active.
    pub fn snr_override(&self) -> Option<f64> {
        (self.snr_limit >= 0.0).then_some(self.snr_limit)
    }
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            snr_limit: Self::PER_ROW_THRESHOLD,
            magnitude_system: MagnitudeSystem::default(),
            limit_offset: LimitOffset::default(),
            filters: Filter::ALL.to_vec(),
        }
    }
}

/// Common error type for ingestion and output.
#[derive(thiserror::Error, Debug)]
pub enum LightCurveError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}: missing column {column}")]
    MissingColumn { path: PathBuf, column: String },
    #[error("{path}:{line}: {message}")]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },
    #[error("{path}: FITS error: {message}")]
    Fits { path: PathBuf, message: String },
    #[error("{path}: unsupported table format ({reason})")]
    UnsupportedFormat { path: PathBuf, reason: String },
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl LightCurveError {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        LightCurveError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

pub type LightCurveResult<T> = Result<T, LightCurveError>;

/// Source of photometry rows for one per-filter output file.
pub trait PhotometryReader {
    fn read_rows(&self, path: &Path) -> LightCurveResult<Vec<PhotometryRow>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_keep_fixed_order() {
        let codes: Vec<&str> = Filter::ALL.iter().map(|f| f.code()).collect();
        assert_eq!(codes, vec!["V", "B", "U", "UW1", "UM2", "UW2", "W"]);
        assert!(Filter::V < Filter::W);
    }

    #[test]
    fn image_codes_map_to_filters() {
        assert_eq!(Filter::from_image_code("w1"), Some(Filter::UW1));
        assert_eq!(Filter::from_image_code("wh"), Some(Filter::W));
        assert_eq!(Filter::from_image_code("xx"), None);
    }

    #[test]
    fn filter_parses_from_code() {
        assert_eq!("UM2".parse::<Filter>().unwrap(), Filter::UM2);
        assert!("um2".parse::<Filter>().is_err());
    }

    #[test]
    fn negative_snr_limit_defers_to_rows() {
        assert_eq!(AssemblyConfig::default().snr_override(), None);
        assert_eq!(AssemblyConfig::with_snr_limit(0.0).snr_override(), Some(0.0));
    }

    #[test]
    fn conventions_parse_case_insensitively() {
        assert_eq!("Vega".parse::<MagnitudeSystem>().unwrap(), MagnitudeSystem::Vega);
        assert_eq!("signed".parse::<LimitOffset>().unwrap(), LimitOffset::Signed);
        assert!("jansky".parse::<MagnitudeSystem>().is_err());
    }
}

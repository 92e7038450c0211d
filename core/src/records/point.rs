use crate::math::ModifiedJulianDate;
use crate::prelude::Filter;
use serde::{Deserialize, Serialize};

/// A classified light-curve point.
///
/// For detections both offsets are statistical magnitude uncertainties stored
/// as non-positive numbers: `value + upper` is the bright edge and
/// `value - lower` the faint edge. AB offsets come from the flux error; Vega
/// stores `-MAG_ERR` on both sides. For limits `upper` is the one-sided offset
/// to the limiting magnitude and `lower` is exactly zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightCurvePoint {
    pub filter: Filter,
    pub mjd: ModifiedJulianDate,
    pub value: f64,
    pub upper: f64,
    pub lower: f64,
    pub is_limit: bool,
}

impl LightCurvePoint {
    pub fn detection(filter: Filter, mjd: ModifiedJulianDate, value: f64, upper: f64, lower: f64) -> Self {
        Self {
            filter,
            mjd,
            value,
            upper,
            lower,
            is_limit: false,
        }
    }

    pub fn limit(filter: Filter, mjd: ModifiedJulianDate, value: f64, offset: f64) -> Self {
        Self {
            filter,
            mjd,
            value,
            upper: offset,
            lower: 0.0,
            is_limit: true,
        }
    }

    pub fn has_finite_offsets(&self) -> bool {
        self.upper.is_finite() && self.lower.is_finite()
    }
}

/// One line of the flat light-curve table: the classified point plus the
/// source columns carried through from the photometry row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightCurveRow {
    pub point: LightCurvePoint,
    pub vega_mag: f64,
    pub vega_mag_err: f64,
    /// µJy
    pub flux: f64,
    /// µJy
    pub flux_err: f64,
    pub ab_mag: f64,
}

/// Where a photometry table came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputKind {
    /// Measured on the summed image (`<F>_stacked.out`).
    Stacked,
    /// Per-exposure history (`<F>_maghist.out`).
    MagHist,
}

impl OutputKind {
    pub fn suffix(self) -> &'static str {
        match self {
            OutputKind::Stacked => "_stacked.out",
            OutputKind::MagHist => "_maghist.out",
        }
    }

    pub fn file_name(self, filter: Filter) -> String {
        format!("{}{}", filter.code(), self.suffix())
    }
}

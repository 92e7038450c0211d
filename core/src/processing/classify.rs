use crate::math::{MagnitudeHelper, ModifiedJulianDate};
use crate::prelude::{AssemblyConfig, Filter, LimitOffset, MagnitudeSystem};
use crate::records::{LightCurvePoint, LightCurveRow, PhotometryRow};
use crate::telemetry::log::LogManager;
use crate::telemetry::metrics::IngestMetrics;

/// Turns photometry rows into detections or one-sided limits.
pub struct Classifier {
    config: AssemblyConfig,
    logger: LogManager,
}

impl Classifier {
    pub fn new(config: &AssemblyConfig) -> Self {
        Self {
            config: config.clone(),
            logger: LogManager::new("classify"),
        }
    }

    /// S/N a row must reach to count as a detection.
    pub fn threshold(&self, row: &PhotometryRow) -> f64 {
        self.config.snr_override().unwrap_or(row.lim_sig)
    }

    pub fn classify(&self, filter: Filter, row: &PhotometryRow) -> LightCurvePoint {
        let mjd = ModifiedJulianDate::from_met(row.met);
        let (magnitude, limit) = match self.config.magnitude_system {
            MagnitudeSystem::Ab => (row.ab_mag, row.ab_mag_lim),
            MagnitudeSystem::Vega => (row.vega_mag, row.vega_mag_lim),
        };

        if row.snr() >= self.threshold(row) {
            let (upper, lower) = match self.config.magnitude_system {
                MagnitudeSystem::Ab => (
                    MagnitudeHelper::upper_offset(row.flux, row.flux_err),
                    MagnitudeHelper::lower_offset(row.flux, row.flux_err),
                ),
                MagnitudeSystem::Vega => (-row.vega_mag_err, -row.vega_mag_err),
            };
            LightCurvePoint::detection(filter, mjd, magnitude, upper, lower)
        } else {
            let offset = match self.config.limit_offset {
                LimitOffset::Absolute => (magnitude - limit).abs(),
                LimitOffset::Signed => magnitude - limit,
            };
            LightCurvePoint::limit(filter, mjd, limit, offset)
        }
    }

    /// Classifies every row of one table and keeps the source columns alongside.
    pub fn classify_rows(
        &self,
        filter: Filter,
        rows: &[PhotometryRow],
        metrics: &IngestMetrics,
    ) -> Vec<LightCurveRow> {
        rows.iter()
            .map(|row| {
                let point = self.classify(filter, row);
                let finite = point.has_finite_offsets();
                if !finite {
                    self.logger.anomaly(&format!(
                        "{} at MJD {:.6}: non-finite magnitude offset (flux {:.3e} +/- {:.3e})",
                        filter,
                        point.mjd.value(),
                        row.flux,
                        row.flux_err
                    ));
                }
                metrics.record_point(point.is_limit, finite);
                LightCurveRow {
                    point,
                    vega_mag: row.vega_mag,
                    vega_mag_err: row.vega_mag_err,
                    flux: MagnitudeHelper::to_micro_jansky(row.flux),
                    flux_err: MagnitudeHelper::to_micro_jansky(row.flux_err),
                    ab_mag: row.ab_mag,
                }
            })
            .collect()
    }
}

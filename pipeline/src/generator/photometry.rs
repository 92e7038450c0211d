use anyhow::Context;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use uvotcore::math::ModifiedJulianDate;
use uvotcore::processing::discovery::image_dir;
use uvotcore::records::{columns, OutputKind, PhotometryRow};
use uvotcore::Filter;

/// AB zero point in mJy.
const AB_ZERO_POINT_MJY: f64 = 3631.0e3;

/// AB minus Vega magnitude per UVOT filter.
fn ab_minus_vega(filter: Filter) -> f64 {
    match filter {
        Filter::V => -0.01,
        Filter::B => -0.13,
        Filter::U => 1.02,
        Filter::UW1 => 1.51,
        Filter::UM2 => 1.69,
        Filter::UW2 => 1.73,
        Filter::W => 0.80,
    }
}

fn ab_mag_to_flux(mag: f64) -> f64 {
    AB_ZERO_POINT_MJY * 10f64.powf(-0.4 * mag)
}

fn flux_to_ab_mag(flux: f64) -> f64 {
    -2.5 * (flux / AB_ZERO_POINT_MJY).log10()
}

/// Configuration for a synthetic fading transient.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticConfig {
    pub filters: Vec<Filter>,
    pub observations: usize,
    pub exposures_per_observation: usize,
    pub first_observation_id: u64,
    pub start_mjd: f64,
    pub cadence_days: f64,
    pub peak_mag: f64,
    pub decline_per_day: f64,
    /// 1-sigma flux noise floor in mJy.
    pub flux_noise: f64,
    pub lim_sig: f64,
    pub seed: u64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            filters: Filter::ALL.to_vec(),
            observations: 5,
            exposures_per_observation: 2,
            first_observation_id: 16_042_001,
            start_mjd: 60_083.5,
            cadence_days: 1.0,
            peak_mag: 17.0,
            decline_per_day: 0.6,
            flux_noise: 0.004,
            lim_sig: 3.0,
            seed: 0,
        }
    }
}

/// Rows one synthetic observation would produce in `filter`.
pub fn synthetic_rows(
    config: &SyntheticConfig,
    filter: Filter,
    observation: usize,
    rng: &mut StdRng,
) -> Vec<PhotometryRow> {
    let exposures = config.exposures_per_observation.max(1);
    (0..exposures)
        .map(|exposure| {
            let days = observation as f64 * config.cadence_days + exposure as f64 * 0.01;
            let met = ModifiedJulianDate::new(config.start_mjd + days).to_met();
            // Ultraviolet bands fade faster.
            let colour = ab_minus_vega(filter).max(0.0) * 0.3;
            let true_mag = config.peak_mag + (config.decline_per_day + colour) * days;

            let flux_err = config.flux_noise * rng.gen_range(0.8..1.2);
            let flux = ab_mag_to_flux(true_mag) + flux_err * rng.gen_range(-1.0..1.0);
            let ab_mag = flux_to_ab_mag(flux.max(flux_err * 0.1));
            let ab_mag_err = 2.5 / std::f64::consts::LN_10 * flux_err / flux.abs();
            let ab_mag_lim = flux_to_ab_mag(config.lim_sig * flux_err);

            PhotometryRow {
                met,
                flux,
                flux_err,
                ab_mag,
                ab_mag_err,
                vega_mag: ab_mag - ab_minus_vega(filter),
                vega_mag_err: ab_mag_err,
                ab_mag_lim,
                vega_mag_lim: ab_mag_lim - ab_minus_vega(filter),
                lim_sig: config.lim_sig,
            }
        })
        .collect()
}

/// Renders rows as a whitespace-delimited table with a column header.
pub fn render_table(rows: &[PhotometryRow]) -> String {
    let mut text = columns::REQUIRED.join(" ");
    text.push('\n');
    for row in rows {
        let _ = writeln!(
            text,
            "{:.3} {:.6e} {:.6e} {:.4} {:.4} {:.4} {:.4} {:.4} {:.4} {:.1}",
            row.met,
            row.flux,
            row.flux_err,
            row.ab_mag,
            row.ab_mag_err,
            row.vega_mag,
            row.vega_mag_err,
            row.ab_mag_lim,
            row.vega_mag_lim,
            row.lim_sig
        );
    }
    text
}

/// Lays out a target directory with `<F>_maghist.out` tables for every observation.
pub fn write_synthetic_target(target_dir: &Path, config: &SyntheticConfig) -> anyhow::Result<usize> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut written = 0;
    for observation in 0..config.observations {
        let obs_id = format!("{:011}", config.first_observation_id + observation as u64);
        let dir = image_dir(&target_dir.join(&obs_id));
        fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
        for &filter in &config.filters {
            let rows = synthetic_rows(config, filter, observation, &mut rng);
            let path = dir.join(OutputKind::MagHist.file_name(filter));
            fs::write(&path, render_table(&rows))
                .with_context(|| format!("writing {}", path.display()))?;
            written += 1;
        }
    }
    Ok(written)
}

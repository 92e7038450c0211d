use serde::{Deserialize, Serialize};

/// One row of a `uvotsource`/`uvotmaghist` output table.
///
/// Fluxes are in the tool's native unit (mJy); magnitudes are as calibrated by
/// the tool. The row is never modified after it has been read.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhotometryRow {
    /// Mission elapsed time in seconds.
    pub met: f64,
    pub flux: f64,
    pub flux_err: f64,
    pub ab_mag: f64,
    pub ab_mag_err: f64,
    pub vega_mag: f64,
    pub vega_mag_err: f64,
    pub ab_mag_lim: f64,
    pub vega_mag_lim: f64,
    /// Significance the tool used when it computed the limiting magnitude.
    pub lim_sig: f64,
}

/// Column names of the photometry table, in the order they map onto
/// [`PhotometryRow`] fields.
pub mod columns {
    pub const MET: &str = "MET";
    pub const FLUX: &str = "AB_FLUX_HZ";
    pub const FLUX_ERR: &str = "AB_FLUX_HZ_ERR";
    pub const AB_MAG: &str = "AB_MAG";
    pub const AB_MAG_ERR: &str = "AB_MAG_ERR";
    pub const VEGA_MAG: &str = "MAG";
    pub const VEGA_MAG_ERR: &str = "MAG_ERR";
    pub const AB_MAG_LIM: &str = "AB_MAG_LIM";
    pub const VEGA_MAG_LIM: &str = "MAG_LIM";
    pub const LIM_SIG: &str = "AB_MAG_LIM_SIG";

    pub const REQUIRED: [&str; 10] = [
        MET,
        FLUX,
        FLUX_ERR,
        AB_MAG,
        AB_MAG_ERR,
        VEGA_MAG,
        VEGA_MAG_ERR,
        AB_MAG_LIM,
        VEGA_MAG_LIM,
        LIM_SIG,
    ];
}

impl PhotometryRow {
    /// Builds a row from values ordered like [`columns::REQUIRED`].
    pub fn from_columns(values: [f64; 10]) -> Self {
        let [met, flux, flux_err, ab_mag, ab_mag_err, vega_mag, vega_mag_err, ab_mag_lim, vega_mag_lim, lim_sig] =
            values;
        Self {
            met,
            flux,
            flux_err,
            ab_mag,
            ab_mag_err,
            vega_mag,
            vega_mag_err,
            ab_mag_lim,
            vega_mag_lim,
            lim_sig,
        }
    }

    /// Flux over its uncertainty.
    pub fn snr(&self) -> f64 {
        self.flux / self.flux_err
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_columns_follows_required_order() {
        let row = PhotometryRow::from_columns([
            1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0,
        ]);
        assert_eq!(row.met, 1.0);
        assert_eq!(row.flux_err, 3.0);
        assert_eq!(row.vega_mag, 6.0);
        assert_eq!(row.vega_mag_lim, 9.0);
        assert_eq!(row.lim_sig, 10.0);
    }

    #[test]
    fn snr_is_flux_over_error() {
        let mut row = PhotometryRow::from_columns([0.0; 10]);
        row.flux = 0.3;
        row.flux_err = 0.1;
        assert!((row.snr() - 3.0).abs() < 1e-12);
    }
}

/// Magnitude offsets derived from a flux measurement.
pub struct MagnitudeHelper;

impl MagnitudeHelper {
    /// Upper (brighter-side) magnitude offset, `-2.5 log10(1 + σ/f)`.
    pub fn upper_offset(flux: f64, flux_err: f64) -> f64 {
        -2.5 * (1.0 + flux_err / flux).log10()
    }

    /// Lower (fainter-side) magnitude offset, `2.5 log10(1 - σ/f)`.
    ///
    /// Undefined once `flux_err >= flux`; the non-finite result is returned as is.
    pub fn lower_offset(flux: f64, flux_err: f64) -> f64 {
        2.5 * (1.0 - flux_err / flux).log10()
    }

    /// mJy to µJy.
    pub fn to_micro_jansky(milli_jansky: f64) -> f64 {
        milli_jansky * 1e3
    }
}

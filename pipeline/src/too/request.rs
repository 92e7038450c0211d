use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Observation types offered by the Swift ToO form.
pub const OBS_TYPES: [&str; 4] = ["Spectroscopy", "Light Curve", "Position", "Timing"];

pub const DEFAULT_SOURCE_TYPE: &str = "Supernova";
pub const DEFAULT_MONITORING_FREQ: &str = "1 day";
pub const DEFAULT_NUM_OF_VISITS: u32 = 7;
pub const DEFAULT_OBS_TYPE: usize = 1;
pub const DEFAULT_OPT_FILT: &str = "g";
pub const DEFAULT_URGENCY: u8 = 2;
pub const DEFAULT_UVOT_MODE: u32 = 0x223f;

pub const DEFAULT_SCIENCE_JUST: &str = "We aim to obtain a UV light curve of this young SN Ia to see if there are signs of interaction with a nearby companion (ejecta-companion collision, which manifests as a short lived UV flash), or an early radioactive peak powered by the nucleosynthesis of radioactive material in a He shell on the exploding white dwarf.";

pub const DEFAULT_UVOT_JUST: &str = "For this source it is essential that we obtain a UV light curve, and hence we need to obtain observations in each of the UV filters, but we also want the exposures weighted towards the UV filters as the SN is expected to be much brighter in the optical.";

pub fn default_exposure_just(exposure: f64) -> String {
    format!(
        "Our requested exposure time is based on previous experience observing young SNe and the current brightness of this target. In {:.0} s, we expect to detect the UV flux at SNR >~ 10 in each of the UV filters.",
        exposure
    )
}

/// Urgency levels of the ToO form.
pub fn urgency_rules() -> &'static str {
    "Urgency 1: We need observations within 4 hours\n\
     Urgency 2: Observations should start within the next 24 hours\n\
     Urgency 3: Observations should start in the next few days\n\
     Urgency 4: Weeks to a month"
}

/// A UVOT Target-of-Opportunity request, ready for submission by an external client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TooRequest {
    pub source_name: String,
    pub source_type: String,
    pub ra: f64,
    pub dec: f64,
    pub immediate_objective: String,
    pub exp_time_per_visit: f64,
    pub monitoring_freq: String,
    pub num_of_visits: u32,
    pub obs_type: String,
    pub opt_mag: f64,
    pub opt_filt: String,
    pub urgency: u8,
    pub instrument: String,
    /// Hex string such as `0x223f`.
    pub uvot_mode: String,
    pub science_just: String,
    pub exp_time_just: String,
    pub uvot_just: String,
}

/// Parses a UVOT mode given in hex, with or without a `0x` prefix.
pub fn parse_uvot_mode(text: &str) -> anyhow::Result<u32> {
    let digits = text
        .trim()
        .trim_start_matches("0x")
        .trim_start_matches("0X");
    u32::from_str_radix(digits, 16).with_context(|| format!("invalid UVOT mode '{}'", text))
}

pub fn format_uvot_mode(mode: u32) -> String {
    format!("0x{:04x}", mode)
}

impl TooRequest {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.source_name.trim().is_empty() {
            bail!("source name is required");
        }
        if self.immediate_objective.trim().is_empty() {
            bail!("immediate objective is required");
        }
        if !(0.0..360.0).contains(&self.ra) {
            bail!("right ascension {} is outside [0, 360)", self.ra);
        }
        if !(-90.0..=90.0).contains(&self.dec) {
            bail!("declination {} is outside [-90, 90]", self.dec);
        }
        if self.exp_time_per_visit <= 0.0 || !self.exp_time_per_visit.is_finite() {
            bail!("exposure time per visit must be positive");
        }
        if self.num_of_visits == 0 {
            bail!("at least one visit is required");
        }
        if !(1..=4).contains(&self.urgency) {
            bail!("urgency {} is outside 1..=4", self.urgency);
        }
        if !OBS_TYPES.contains(&self.obs_type.as_str()) {
            bail!("unknown observation type '{}'", self.obs_type);
        }
        parse_uvot_mode(&self.uvot_mode)?;
        Ok(())
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let yaml = serde_yaml::to_string(self).context("serialising ToO request")?;
        fs::write(path, yaml).with_context(|| format!("writing ToO request {}", path.display()))
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading ToO request {}", path.display()))?;
        serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing ToO request {}", path.display()))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tempfile::tempdir;

    pub(crate) fn sample() -> TooRequest {
        TooRequest {
            source_name: "SN 2023ixf".into(),
            source_type: DEFAULT_SOURCE_TYPE.into(),
            ra: 210.910674,
            dec: 54.311663,
            immediate_objective: "Early UV evolution of a nearby SN II.".into(),
            exp_time_per_visit: 1500.0,
            monitoring_freq: DEFAULT_MONITORING_FREQ.into(),
            num_of_visits: DEFAULT_NUM_OF_VISITS,
            obs_type: OBS_TYPES[DEFAULT_OBS_TYPE].into(),
            opt_mag: 11.2,
            opt_filt: DEFAULT_OPT_FILT.into(),
            urgency: DEFAULT_URGENCY,
            instrument: "UVOT".into(),
            uvot_mode: format_uvot_mode(DEFAULT_UVOT_MODE),
            science_just: DEFAULT_SCIENCE_JUST.into(),
            exp_time_just: default_exposure_just(1500.0),
            uvot_just: DEFAULT_UVOT_JUST.into(),
        }
    }

    #[test]
    fn sample_request_is_valid() {
        sample().validate().unwrap();
    }

    #[test]
    fn out_of_range_fields_are_rejected() {
        let mut bad = sample();
        bad.ra = 360.0;
        assert!(bad.validate().is_err());

        let mut bad = sample();
        bad.urgency = 5;
        assert!(bad.validate().is_err());

        let mut bad = sample();
        bad.uvot_mode = "0xzz".into();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn uvot_mode_parses_hex() {
        assert_eq!(parse_uvot_mode("0x223f").unwrap(), 0x223f);
        assert_eq!(parse_uvot_mode("30ed").unwrap(), 0x30ed);
        assert_eq!(format_uvot_mode(0x223f), "0x223f");
    }

    #[test]
    fn exposure_justification_mentions_exposure() {
        assert!(default_exposure_just(1500.0).contains("In 1500 s"));
    }

    #[test]
    fn request_round_trips_through_yaml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("too_request.yaml");
        let request = sample();
        request.save(&path).unwrap();
        assert_eq!(TooRequest::load(&path).unwrap(), request);
    }
}

use serde::{Deserialize, Serialize};

/// Seconds per day.
const SECONDS_PER_DAY: f64 = 86_400.0;

/// MJD of the Swift mission epoch (2001-01-01T00:00:00).
pub const SWIFT_EPOCH_MJD: f64 = 51_910.0;

/// Modified Julian Date.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModifiedJulianDate(f64);

impl ModifiedJulianDate {
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    /// Converts Swift mission elapsed time (seconds since the mission epoch).
    pub fn from_met(met: f64) -> Self {
        Self(met / SECONDS_PER_DAY + SWIFT_EPOCH_MJD)
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Inverse of [`ModifiedJulianDate::from_met`].
    pub fn to_met(&self) -> f64 {
        (self.0 - SWIFT_EPOCH_MJD) * SECONDS_PER_DAY
    }
}

impl From<f64> for ModifiedJulianDate {
    fn from(value: f64) -> Self {
        ModifiedJulianDate::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn met_zero_is_mission_epoch() {
        assert_eq!(ModifiedJulianDate::from_met(0.0).value(), 51910.0);
    }

    #[test]
    fn one_day_of_met_advances_one_mjd() {
        assert_eq!(ModifiedJulianDate::from_met(86400.0).value(), 51911.0);
    }

    #[test]
    fn to_met_inverts_from_met() {
        let mjd = ModifiedJulianDate::from_met(712_345_678.5);
        assert!((mjd.to_met() - 712_345_678.5).abs() < 1e-3);
    }

    #[test]
    fn ordering_follows_value() {
        let early: ModifiedJulianDate = 59000.0.into();
        let late: ModifiedJulianDate = 59000.5.into();
        assert!(early < late);
    }
}

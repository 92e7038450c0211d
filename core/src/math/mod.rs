pub mod magnitude;
pub mod stats;
pub mod time;

pub use magnitude::MagnitudeHelper;
pub use stats::StatsHelper;
pub use time::ModifiedJulianDate;

//! Light-curve assembly for Swift UVOT photometry.
//!
//! Per-filter tables written by `uvotsource`/`uvotmaghist` are discovered
//! under a target directory, every row is classified as a detection or a
//! one-sided limit, and the results are merged into time-ordered series per
//! filter and a flat multi-band table.

pub mod io;
pub mod math;
pub mod prelude;
pub mod processing;
pub mod records;
pub mod telemetry;

pub use prelude::{
    AssemblyConfig, Filter, LightCurveError, LightCurveResult, LimitOffset, MagnitudeSystem,
    PhotometryReader,
};
pub use processing::{LightCurve, LightCurveAssembler};

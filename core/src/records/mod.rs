pub mod photometry;
pub mod point;

pub use photometry::{columns, PhotometryRow};
pub use point::{LightCurvePoint, LightCurveRow, OutputKind};

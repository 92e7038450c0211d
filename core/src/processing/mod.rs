pub mod aggregate;
pub mod assembler;
pub mod classify;
pub mod discovery;

pub use aggregate::{FilterSeries, LightCurve, SeriesBuilder};
pub use assembler::{Assembly, LightCurveAssembler};
pub use classify::Classifier;
pub use discovery::{DiscoveredTable, Discovery, TableDiscovery};

pub mod chart;
pub mod model;
pub mod sink;

pub use chart::SvgPlotSink;
pub use model::PlotModel;
pub use sink::{JsonPlotSink, PlotSink, PlotSinks};

use crate::plot_bridge::model::PlotModel;
use anyhow::Context;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// Receives the finished light curve for rendering.
pub trait PlotSink {
    fn publish(&self, model: &PlotModel) -> anyhow::Result<()>;
}

/// Publishes one model to several sinks in order, stopping at the first failure.
#[derive(Default)]
pub struct PlotSinks {
    sinks: Vec<Box<dyn PlotSink>>,
}

impl PlotSinks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: impl PlotSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }
}

impl PlotSink for PlotSinks {
    fn publish(&self, model: &PlotModel) -> anyhow::Result<()> {
        for sink in &self.sinks {
            sink.publish(model)?;
        }
        Ok(())
    }
}

/// Writes the plot model as JSON for an external plotting front end.
pub struct JsonPlotSink {
    path: PathBuf,
}

impl JsonPlotSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PlotSink for JsonPlotSink {
    fn publish(&self, model: &PlotModel) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let file = File::create(&self.path)
            .with_context(|| format!("creating plot file {}", self.path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, model)
            .with_context(|| format!("writing plot file {}", self.path.display()))?;
        writer
            .flush()
            .with_context(|| format!("flushing plot file {}", self.path.display()))?;
        println!(
            "[plot] {} filters, {} points -> {}",
            model.series.len(),
            model.point_count(),
            self.path.display()
        );
        Ok(())
    }
}

use crate::io::AutoReader;
use crate::prelude::{AssemblyConfig, LightCurveResult, PhotometryReader};
use crate::processing::aggregate::{LightCurve, SeriesBuilder};
use crate::processing::classify::Classifier;
use crate::processing::discovery::{DiscoveredTable, TableDiscovery};
use crate::telemetry::log::LogManager;
use crate::telemetry::metrics::{Counts, IngestMetrics};
use std::path::Path;

/// Output of one assembly run.
#[derive(Debug, Clone)]
pub struct Assembly {
    pub curve: LightCurve,
    pub tables: Vec<DiscoveredTable>,
    pub counts: Counts,
}

/// Discovery, ingestion, classification and aggregation for one target.
pub struct LightCurveAssembler<R = AutoReader> {
    config: AssemblyConfig,
    reader: R,
    logger: LogManager,
}

impl LightCurveAssembler<AutoReader> {
    pub fn new(config: AssemblyConfig) -> Self {
        Self::with_reader(config, AutoReader::new())
    }
}

impl<R: PhotometryReader> LightCurveAssembler<R> {
    pub fn with_reader(config: AssemblyConfig, reader: R) -> Self {
        Self {
            config,
            reader,
            logger: LogManager::new("assemble"),
        }
    }

    /// Scans `target_dir` and assembles every table found there.
    pub fn assemble(&self, target_dir: &Path) -> LightCurveResult<Assembly> {
        let discovery = TableDiscovery::new(&self.config.filters).scan(target_dir)?;
        let metrics = IngestMetrics::new();
        for _ in &discovery.skipped {
            metrics.record_skipped();
        }
        let curve = self.assemble_tables(&discovery.tables, &metrics)?;
        Ok(Assembly {
            curve,
            tables: discovery.tables,
            counts: metrics.snapshot(),
        })
    }

    /// Reads and classifies the given tables; a table that fails to parse aborts the run.
    pub fn assemble_tables(
        &self,
        tables: &[DiscoveredTable],
        metrics: &IngestMetrics,
    ) -> LightCurveResult<LightCurve> {
        let classifier = Classifier::new(&self.config);
        let mut builder = SeriesBuilder::new();

        for table in tables {
            let rows = self.reader.read_rows(&table.path)?;
            metrics.record_file();
            self.logger.detail(&format!(
                "{} {}: {} rows from {}",
                table.observation,
                table.filter,
                rows.len(),
                table.path.display()
            ));
            builder.extend(table.filter, classifier.classify_rows(table.filter, &rows, metrics));
        }

        let curve = builder.finish();
        let counts = metrics.snapshot();
        self.logger.record(&format!(
            "{} points in {} filters ({} detections, {} limits, {} non-finite)",
            curve.len(),
            curve.series.len(),
            counts.detections,
            counts.limits,
            counts.non_finite
        ));
        Ok(curve)
    }
}

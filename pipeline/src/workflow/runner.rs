use crate::plot_bridge::{PlotModel, PlotSink};
use crate::workflow::config::{target_dir_name, WorkflowConfig};
use anyhow::Context;
use log::info;
use std::path::PathBuf;
use uvotcore::io::write_light_curve;
use uvotcore::processing::LightCurve;
use uvotcore::records::LightCurveRow;
use uvotcore::telemetry::Counts;
use uvotcore::LightCurveAssembler;

pub struct WorkflowResult {
    pub curve: LightCurve,
    pub counts: Counts,
    pub table_path: PathBuf,
}

/// Builds the light curve of one target and hands it to the table and plot outputs.
#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self, target: &str, sink: &dyn PlotSink) -> anyhow::Result<WorkflowResult> {
        let target_dir = self.config.target_dir(target);
        let assembler = LightCurveAssembler::new(self.config.to_assembly_config());
        let assembly = assembler
            .assemble(&target_dir)
            .with_context(|| format!("assembling light curve for {}", target_dir.display()))?;

        let rows: Vec<LightCurveRow> = assembly.curve.rows().cloned().collect();
        let table_path = target_dir.join(&self.config.output_file);
        write_light_curve(&table_path, &rows)
            .with_context(|| format!("writing {}", table_path.display()))?;
        info!("{} rows written to {}", rows.len(), table_path.display());

        let plot = PlotModel::from_curve(&target_dir_name(target), &assembly.curve);
        sink.publish(&plot).context("publishing plot model")?;

        Ok(WorkflowResult {
            curve: assembly.curve,
            counts: assembly.counts,
            table_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::photometry::{write_synthetic_target, SyntheticConfig};
    use std::cell::RefCell;
    use tempfile::tempdir;
    use uvotcore::io::read_light_curve;
    use uvotcore::Filter;

    #[derive(Default)]
    struct CapturingSink {
        published: RefCell<Option<PlotModel>>,
    }

    impl PlotSink for CapturingSink {
        fn publish(&self, model: &PlotModel) -> anyhow::Result<()> {
            *self.published.borrow_mut() = Some(model.clone());
            Ok(())
        }
    }

    #[test]
    fn runner_writes_table_and_publishes_plot() {
        let root = tempdir().unwrap();
        let cfg = WorkflowConfig {
            data_root: root.path().to_path_buf(),
            ..Default::default()
        };
        let synthetic = SyntheticConfig {
            filters: vec![Filter::B, Filter::UW2],
            observations: 3,
            ..Default::default()
        };
        write_synthetic_target(&cfg.target_dir("SN 2023ixf"), &synthetic).unwrap();

        let sink = CapturingSink::default();
        let result = Runner::new(cfg).execute("SN 2023ixf", &sink).unwrap();

        assert_eq!(result.curve.filters(), vec![Filter::B, Filter::UW2]);
        assert!(result.table_path.ends_with("SN2023ixf/UVOT_light_curve.dat"));
        let rows = read_light_curve(&result.table_path).unwrap();
        assert_eq!(rows.len(), result.curve.len());
        assert_eq!(result.counts.files_read, 6);

        let plot = sink.published.borrow().clone().unwrap();
        assert_eq!(plot.target, "SN2023ixf");
        assert_eq!(plot.point_count(), rows.len());
    }

    #[test]
    fn missing_target_directory_is_an_error() {
        let root = tempdir().unwrap();
        let cfg = WorkflowConfig {
            data_root: root.path().to_path_buf(),
            ..Default::default()
        };
        let sink = CapturingSink::default();
        assert!(Runner::new(cfg).execute("nowhere", &sink).is_err());
        assert!(sink.published.borrow().is_none());
    }
}

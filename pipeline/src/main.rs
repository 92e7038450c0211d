use anyhow::Context;
use clap::{Parser, Subcommand};
use generator::photometry::{write_synthetic_target, SyntheticConfig};
use heasoft::{DryRunner, HeasoftEnv, PhotometryDriver, ProcessRunner};
use plot_bridge::{JsonPlotSink, PlotSinks, SvgPlotSink};
use std::io::{self, BufWriter};
use std::path::PathBuf;
use too::{draft_request, Prompter, TooRequest};
use uvotcore::{LimitOffset, MagnitudeSystem};
use workflow::config::WorkflowConfig;
use workflow::runner::Runner;

mod generator;
mod heasoft;
mod plot_bridge;
mod too;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Swift UVOT photometry and light-curve driver")]
struct Args {
    /// Load the workflow config from YAML
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Directory holding one sub-directory per target
    #[arg(long, global = true)]
    data_root: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Assemble UVOT_light_curve.dat, the plot model and its SVG chart for a target
    Lightcurve {
        #[arg(short, long)]
        name: String,
        /// Fixed S/N threshold; negative uses each row's stored significance
        #[arg(long, allow_hyphen_values = true)]
        snr_limit: Option<f64>,
        /// Magnitude system of detections (ab or vega)
        #[arg(long)]
        system: Option<MagnitudeSystem>,
        /// Limit offset sign (absolute or signed)
        #[arg(long)]
        limit_offset: Option<LimitOffset>,
    },
    /// Run uvotimsum, uvotsource and uvotmaghist over every sky image of a target
    Phot {
        #[arg(short, long)]
        name: String,
        /// Print the task command lines instead of running them
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// Create the target directory and check for region files
    Prepare {
        #[arg(short, long)]
        name: String,
    },
    /// Draft a Target-of-Opportunity request interactively
    Too {
        #[arg(short, long, default_value = "too_request.yaml")]
        output: PathBuf,
        /// Validate an existing request instead of drafting a new one
        #[arg(long)]
        check: Option<PathBuf>,
    },
    /// Write a synthetic target with photometry tables for every configured filter
    Demo {
        #[arg(short, long, default_value = "SN demo")]
        name: String,
        #[arg(long, default_value_t = 5)]
        observations: usize,
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => WorkflowConfig::load(path)?,
        None => WorkflowConfig::default(),
    };
    if let Some(root) = args.data_root {
        config.data_root = root;
    }

    match args.command {
        Command::Lightcurve {
            name,
            snr_limit,
            system,
            limit_offset,
        } => {
            if let Some(limit) = snr_limit {
                config.snr_limit = limit;
            }
            if let Some(system) = system {
                config.magnitude_system = system;
            }
            if let Some(offset) = limit_offset {
                config.limit_offset = offset;
            }
            let target_dir = config.target_dir(&name);
            let plot_file = target_dir.join(&config.plot_file);
            let plot_image = target_dir.join(&config.plot_image);
            let sinks = PlotSinks::new()
                .with(JsonPlotSink::new(&plot_file))
                .with(SvgPlotSink::new(&plot_image));
            let result = Runner::new(config).execute(&name, &sinks)?;
            let counts = result.counts;
            println!(
                "{}: {} points in {} filters ({} detections, {} limits, {} non-finite) from {} tables, {} filters without data -> {}, {}, {}",
                name,
                result.curve.len(),
                result.curve.filters().len(),
                counts.detections,
                counts.limits,
                counts.non_finite,
                counts.files_read,
                counts.pairs_skipped,
                result.table_path.display(),
                plot_file.display(),
                plot_image.display()
            );
        }
        Command::Phot { name, dry_run } => {
            let target_dir = config.target_dir(&name);
            let report = if dry_run {
                let env = HeasoftEnv::default();
                PhotometryDriver::new(&config.photometry, &env, DryRunner).run(&target_dir)?
            } else {
                let env = HeasoftEnv::from_config(&config.heasoft)?;
                PhotometryDriver::new(&config.photometry, &env, ProcessRunner).run(&target_dir)?
            };
            println!(
                "{}: {} observations, {} images, {} tasks, {} failures",
                name, report.observations, report.images, report.tasks_run, report.failures
            );
        }
        Command::Prepare { name } => {
            let workspace = workflow::target::prepare(&config, &name)?;
            println!(
                "{} {} (regions {})",
                workspace.dir.display(),
                if workspace.created { "created" } else { "exists" },
                if workspace.ready_for_photometry() { "ready" } else { "missing" }
            );
        }
        Command::Too {
            check: Some(path), ..
        } => {
            let request = TooRequest::load(&path)?;
            request
                .validate()
                .with_context(|| format!("checking {}", path.display()))?;
            println!("{}: {} is valid", path.display(), request.source_name);
        }
        Command::Too {
            output,
            check: None,
        } => {
            let stdin = io::stdin();
            let mut prompter = Prompter::new(stdin.lock(), BufWriter::new(io::stdout()));
            let request = draft_request(&mut prompter)?;
            request.save(&output)?;
            println!("ToO request saved to {}", output.display());
        }
        Command::Demo {
            name,
            observations,
            seed,
        } => {
            let target_dir = config.target_dir(&name);
            let synthetic = SyntheticConfig {
                filters: config.filters.clone(),
                observations,
                seed,
                ..Default::default()
            };
            let tables = write_synthetic_target(&target_dir, &synthetic)
                .with_context(|| format!("writing demo target {}", target_dir.display()))?;
            println!("{} tables written under {}", tables, target_dir.display());
        }
    }

    Ok(())
}

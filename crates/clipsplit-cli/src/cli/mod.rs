//! CLI for the clipsplit extract scheduler.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use clipsplit_core::config::{self, BoundaryKind, CutMode, SplitConfig};
use clipsplit_core::logging;
use std::path::PathBuf;

use commands::{run_init_config, run_plan, run_scheduler};

/// Top-level CLI for clipsplit.
#[derive(Debug, Parser)]
#[command(name = "clipsplit")]
#[command(about = "clipsplit: split a dataset along a hierarchy of clipbounds", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Show the batches, their sources and stages without running anything.
    Plan {
        #[command(flatten)]
        opts: SplitArgs,
        /// Print the plan as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Run every extract, parents before children.
    Run {
        #[command(flatten)]
        opts: SplitArgs,
        /// Only print the plan (same as `plan`).
        #[arg(long)]
        dry_run: bool,
    },

    /// Write the default config to ~/.config/clipsplit/config.toml.
    InitConfig,
}

/// Options overriding the config file.
#[derive(Debug, Clone, Default, Args)]
pub struct SplitArgs {
    /// Config file (default: ~/.config/clipsplit/config.toml if present).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// Directory of boundary descriptors.
    #[arg(long, value_name = "DIR")]
    pub catalog: Option<PathBuf>,
    /// Descriptor file suffix, e.g. `.poly`.
    #[arg(long, value_name = "EXT")]
    pub boundary_ext: Option<String>,
    /// Boundary kind written to the job list: poly or osm.
    #[arg(long, value_name = "KIND")]
    pub boundary_kind: Option<BoundaryKind>,
    /// Suffix of generated extracts, e.g. `.osm.pbf`.
    #[arg(long, value_name = "EXT")]
    pub output_ext: Option<String>,
    /// Directory receiving the extracts.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
    /// Dataset read by extracts without a parent region.
    #[arg(long, value_name = "PATH")]
    pub master: Option<PathBuf>,
    /// Splitter executable.
    #[arg(long, value_name = "PATH")]
    pub engine: Option<PathBuf>,
    /// Extraction mode: softcut or hardcut.
    #[arg(long, value_name = "MODE")]
    pub mode: Option<CutMode>,
    /// Maximum sibling extracts per engine invocation.
    #[arg(long, value_name = "N")]
    pub batch_size: Option<usize>,
    /// Maximum concurrent engine invocations.
    #[arg(short = 'j', long, value_name = "N")]
    pub jobs: Option<usize>,
    /// Total extracts in flight; derives the batch size as N / jobs.
    #[arg(long, value_name = "N")]
    pub target_parallel: Option<usize>,
    /// Sleep after requeueing a batch whose parent is not finished (milliseconds).
    #[arg(long, value_name = "MS")]
    pub backoff_ms: Option<u64>,
    /// Pass --debug to the engine.
    #[arg(long)]
    pub engine_debug: bool,
}

impl SplitArgs {
    /// Load the config file (if any) and apply command-line overrides.
    pub fn load(&self) -> Result<SplitConfig> {
        let mut cfg = config::load(self.config.as_deref())?;
        self.apply(&mut cfg);
        Ok(cfg)
    }

    pub fn apply(&self, cfg: &mut SplitConfig) {
        if let Some(v) = &self.catalog {
            cfg.catalog_dir = v.clone();
        }
        if let Some(v) = &self.boundary_ext {
            cfg.boundary_extension = v.clone();
        }
        if let Some(v) = self.boundary_kind {
            cfg.boundary_kind = v;
        }
        if let Some(v) = &self.output_ext {
            cfg.output_extension = v.clone();
        }
        if let Some(v) = &self.output_dir {
            cfg.output_dir = v.clone();
        }
        if let Some(v) = &self.master {
            cfg.master_dataset = v.clone();
        }
        if let Some(v) = &self.engine {
            cfg.engine_command = v.clone();
        }
        if let Some(v) = self.mode {
            cfg.cut_mode = v;
        }
        if let Some(v) = self.batch_size {
            cfg.max_batch_size = v;
        }
        if let Some(v) = self.jobs {
            cfg.max_concurrent = v;
        }
        if let Some(v) = self.target_parallel {
            cfg.target_parallel_extracts = Some(v);
        }
        if let Some(v) = self.backoff_ms {
            cfg.requeue_backoff_ms = v;
        }
        if self.engine_debug {
            cfg.engine_debug = true;
        }
    }
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Plan { opts, json } => {
                // Dry runs never create files, including the log file.
                logging::init_logging_stderr();
                let cfg = opts.load()?;
                tracing::debug!("loaded config: {:?}", cfg);
                run_plan(&cfg, json)?;
            }
            CliCommand::Run { opts, dry_run } => {
                let mut cfg = opts.load()?;
                cfg.dry_run |= dry_run;
                if cfg.dry_run {
                    logging::init_logging_stderr();
                    tracing::debug!("loaded config: {:?}", cfg);
                    run_plan(&cfg, false)?;
                } else {
                    logging::init_run_logging();
                    tracing::debug!("loaded config: {:?}", cfg);
                    run_scheduler(cfg).await?;
                }
            }
            CliCommand::InitConfig => {
                logging::init_logging_stderr();
                run_init_config()?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;

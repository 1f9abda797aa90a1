use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

/// Extraction mode passed to the engine (`--softcut` / `--hardcut`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CutMode {
    #[default]
    Softcut,
    Hardcut,
}

impl CutMode {
    /// Command-line flag understood by the engine.
    pub fn flag(self) -> &'static str {
        match self {
            CutMode::Softcut => "--softcut",
            CutMode::Hardcut => "--hardcut",
        }
    }
}

impl FromStr for CutMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "softcut" => Ok(CutMode::Softcut),
            "hardcut" => Ok(CutMode::Hardcut),
            other => Err(format!("unknown cut mode '{other}' (expected softcut or hardcut)")),
        }
    }
}

/// Kind of boundary descriptor referenced by each job-list line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryKind {
    /// Osmosis polygon file.
    #[default]
    Poly,
    /// OSM XML outline.
    Osm,
}

impl BoundaryKind {
    /// Token written into the job-list file.
    pub fn token(self) -> &'static str {
        match self {
            BoundaryKind::Poly => "POLY",
            BoundaryKind::Osm => "OSM",
        }
    }
}

impl FromStr for BoundaryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "poly" => Ok(BoundaryKind::Poly),
            "osm" => Ok(BoundaryKind::Osm),
            other => Err(format!("unknown boundary kind '{other}' (expected poly or osm)")),
        }
    }
}

/// Configuration loaded from `~/.config/clipsplit/config.toml`, overridable from the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Directory tree of boundary descriptors; its shape is the extract hierarchy.
    pub catalog_dir: PathBuf,
    /// Suffix that marks a descriptor file (e.g. `.poly`).
    pub boundary_extension: String,
    /// Boundary kind token written for every job-list line.
    pub boundary_kind: BoundaryKind,
    /// Suffix of generated extracts (e.g. `.osm.pbf`).
    pub output_extension: String,
    /// Directory receiving generated extracts, mirroring the catalog layout.
    pub output_dir: PathBuf,
    /// Dataset read by extracts without a parent region.
    pub master_dataset: PathBuf,
    /// Engine executable: explicit path or a name looked up on `PATH`.
    pub engine_command: PathBuf,
    /// Engine extraction mode.
    pub cut_mode: CutMode,
    /// Maximum sibling tasks handed to one engine invocation.
    pub max_batch_size: usize,
    /// Maximum simultaneous engine invocations.
    pub max_concurrent: usize,
    /// Total extracts wanted in flight; when set, overrides `max_batch_size`
    /// with `target_parallel_extracts / max_concurrent`.
    pub target_parallel_extracts: Option<usize>,
    /// Pause after requeueing a batch whose parent is not finished yet.
    pub requeue_backoff_ms: u64,
    /// Pass `--debug` to the engine.
    pub engine_debug: bool,
    /// Plan only: no engine runs, no directories, no job-list files.
    pub dry_run: bool,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            catalog_dir: PathBuf::from("clipbounds"),
            boundary_extension: ".poly".to_string(),
            boundary_kind: BoundaryKind::Poly,
            output_extension: ".osm.pbf".to_string(),
            output_dir: PathBuf::from("o"),
            master_dataset: PathBuf::from("planet-latest.osm.pbf"),
            engine_command: PathBuf::from("osm-history-splitter"),
            cut_mode: CutMode::Softcut,
            max_batch_size: 2,
            max_concurrent: 4,
            target_parallel_extracts: None,
            requeue_backoff_ms: 5000,
            engine_debug: false,
            dry_run: false,
        }
    }
}

impl SplitConfig {
    /// Batch size actually used by the walker.
    pub fn effective_batch_size(&self) -> usize {
        match self.target_parallel_extracts {
            Some(target) => (target / self.max_concurrent.max(1)).max(1),
            None => self.max_batch_size,
        }
    }

    pub fn requeue_backoff(&self) -> Duration {
        Duration::from_millis(self.requeue_backoff_ms)
    }

    /// Checks the settings both plan and run depend on. The engine binary is
    /// checked separately when a command engine is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrent == 0 {
            return Err(ConfigError::ZeroLimit {
                field: "max_concurrent",
            });
        }
        if self.effective_batch_size() == 0 {
            return Err(ConfigError::ZeroLimit {
                field: "max_batch_size",
            });
        }
        if !self.catalog_dir.exists() {
            return Err(ConfigError::MissingCatalog(self.catalog_dir.clone()));
        }
        if !self.catalog_dir.is_dir() {
            return Err(ConfigError::CatalogNotDirectory(self.catalog_dir.clone()));
        }
        Ok(())
    }
}

/// Existing config file under the XDG config dir, if any. Never creates directories.
pub fn default_config_path() -> Result<Option<PathBuf>> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("clipsplit")?;
    Ok(xdg_dirs.find_config_file("config.toml"))
}

/// Load configuration from `path`, or from the XDG location, or fall back to defaults.
/// Read-only: a missing file is not created.
pub fn load(path: Option<&Path>) -> Result<SplitConfig> {
    let path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => default_config_path()?,
    };
    let Some(path) = path else {
        tracing::debug!("no config file, using defaults");
        return Ok(SplitConfig::default());
    };
    let data = fs::read_to_string(&path)
        .with_context(|| format!("read config {}", path.display()))?;
    let cfg: SplitConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    tracing::debug!("loaded config from {}", path.display());
    Ok(cfg)
}

/// Write the default configuration to the XDG config dir. Refuses to overwrite.
pub fn init_default() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("clipsplit")?;
    let path = xdg_dirs.place_config_file("config.toml")?;
    if path.exists() {
        anyhow::bail!("config already exists: {}", path.display());
    }
    let toml = toml::to_string_pretty(&SplitConfig::default())?;
    fs::write(&path, toml)?;
    tracing::info!("created default config at {}", path.display());
    Ok(path)
}

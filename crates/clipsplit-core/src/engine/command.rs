//! Engine backed by the splitter executable.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::{CutMode, SplitConfig};
use crate::error::{ConfigError, EngineError};

use super::ExtractionEngine;

/// Invokes `<program> [--debug] --softcut|--hardcut <source> <job-list>` and waits.
#[derive(Debug, Clone)]
pub struct CommandEngine {
    program: PathBuf,
    debug: bool,
}

impl CommandEngine {
    /// Resolve the engine binary; fails at startup when it cannot be found.
    pub fn from_config(cfg: &SplitConfig) -> Result<Self, ConfigError> {
        let program = resolve_program(&cfg.engine_command)
            .ok_or_else(|| ConfigError::MissingEngine(cfg.engine_command.clone()))?;
        Ok(Self {
            program,
            debug: cfg.engine_debug,
        })
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn args(&self, source: &Path, job_list: &Path, mode: CutMode) -> Vec<OsString> {
        let mut args = Vec::with_capacity(4);
        if self.debug {
            args.push(OsString::from("--debug"));
        }
        args.push(OsString::from(mode.flag()));
        args.push(source.as_os_str().to_owned());
        args.push(job_list.as_os_str().to_owned());
        args
    }
}

impl ExtractionEngine for CommandEngine {
    fn extract(&self, source: &Path, job_list: &Path, mode: CutMode) -> Result<(), EngineError> {
        let status = Command::new(&self.program)
            .args(self.args(source, job_list, mode))
            .status()
            .map_err(|source| EngineError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        if !status.success() {
            return Err(EngineError::Exit {
                program: self.program.clone(),
                status,
            });
        }
        Ok(())
    }
}

/// Locate an executable: paths with a separator must exist, bare names are searched on `PATH`.
/// On unix the file must also carry an execute bit.
pub fn resolve_program(program: &Path) -> Option<PathBuf> {
    if program.components().count() > 1 || program.is_absolute() {
        return is_executable(program).then(|| program.to_path_buf());
    }
    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .map(|dir| dir.join(program))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

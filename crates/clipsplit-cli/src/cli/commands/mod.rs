//! CLI command handlers. Each command is in its own file.

mod init_config;
mod plan;
mod run;

pub use init_config::run_init_config;
pub use plan::run_plan;
pub use run::run_scheduler;

pub mod config;
pub mod error;
pub mod logging;

pub mod catalog;
pub mod engine;
pub mod joblist;
pub mod scheduler;

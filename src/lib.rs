pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::cli::LocalStorage;
#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use core::{engine::AuditEngine, pipeline::AuditPipeline};
pub use utils::error::{AuditError, Result};

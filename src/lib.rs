pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;

pub use adapters::MediaWikiClient;
pub use config::AuditConfig;
pub use crate::core::{audit::AuditEngine, pipeline::AuditPipeline};
pub use domain::model::{AuditMode, FragmentReference, Report};
pub use utils::error::{AuditError, Result};

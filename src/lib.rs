pub mod analyzer;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod domain;
pub mod error;
pub mod git;
pub mod history;
pub mod module;
pub mod orphans;
pub mod plan;
pub mod skip;
pub mod ui;

pub use config::{Config, EngineSettings};
pub use error::{PublishError, Result};
pub use module::{ModuleRecord, ReleaseReason};
pub use plan::ReleasePlan;

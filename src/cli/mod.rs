//! Command-line workflow, independent of argument parsing

pub mod orchestration;

pub use orchestration::{prune_orphaned_tags, run_plan_workflow, PlanWorkflowArgs, PruneOutcome};

//! Analysis engine for turning commit messages into release types

pub mod commit_classifier;

pub use commit_classifier::{CommitAnalysis, CommitClassifier};

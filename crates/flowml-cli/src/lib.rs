//! CLI library components for the flow classifier.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod summary;

//! Prompt module for LLM-based operations.
//!
//! This module provides modular prompt templates for various LLM tasks.

pub mod gap_analysis;
pub mod query_builder;

pub use gap_analysis::build_analysis_prompt;
pub use query_builder::build_query_prompt;

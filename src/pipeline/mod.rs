//! Staged merge orchestration.
//!
//! Every layout strategy is a list of step functions run in order against a
//! shared [`context::MergeContext`]; exactly one step returns the final
//! encoded buffer.

pub mod context;
pub mod guards;
pub mod runner;

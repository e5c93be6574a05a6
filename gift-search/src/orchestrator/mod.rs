//! Search orchestrator: concurrent fan-out, scoring, ranking.
//!
//! This module fans out one query per (keyword, provider) pair, waits for
//! all of them, flattens the results, scores every candidate against the
//! search spec, and returns a stably sorted, plan-truncated ranking.

pub mod scoring;
pub mod search;

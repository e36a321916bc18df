//! Food-packaging microplastic exposure tracking.
//!
//! Reports from the analysis backend flow through [`parser`] and
//! [`normalize`] into [`normalize::AnalysisRecord`]s, which [`analyzers`]
//! turn into period statistics, trends, dashboard summaries and advice.

pub mod analyzers;
pub mod config;
pub mod fetch;
pub mod infra;
pub mod normalize;
pub mod output;
pub mod parser;
pub mod report;
pub mod services;

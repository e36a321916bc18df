//! Aggregation of normalized records into exposure statistics.
//!
//! This module groups records into day, week, month and year buckets,
//! computes trends between consecutive periods, summarizes the dashboard
//! and derives recommendations.

pub mod aggregate;
pub mod dashboard;
pub mod recommend;
pub mod trend;
pub mod types;
pub mod utility;

//! Analysis modules.
//!
//! Snapshot construction, rollup statistics, risk detection and milestones.

pub mod aggregator;
pub mod milestones;
pub mod risks;
pub mod rollup;

pub use aggregator::{Aggregator, AggregatorConfig};
pub use milestones::detect_milestones;
pub use risks::detect_risks;

pub mod error;
pub mod memory;
pub mod metrics;
pub mod planner;
pub mod profile;
pub mod scores;

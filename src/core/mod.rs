pub mod aggregator;
pub mod fallback;
pub mod labels;
pub mod orchestrator;

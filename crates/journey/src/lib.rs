//! Chain simulation: walks a drip campaign graph from a matching trigger,
//! advancing a simulated clock and recording a trace of what would happen.

pub mod engine;
pub mod evaluator;
pub mod messages;
pub mod navigator;
pub mod trigger;
pub mod types;

pub use engine::SimulationEngine;
pub use evaluator::ConditionEvaluator;
pub use messages::Locale;
pub use types::{SimulationReport, WalkOutcome};

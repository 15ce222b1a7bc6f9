use drip_core::types::SimulationContext;
use serde::{Deserialize, Serialize};

/// Why a walk ended. None of these are errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalkOutcome {
    /// No event node matched the trigger.
    NoMatchingStart,
    /// The current node had no usable outgoing edge.
    DeadEnd,
    /// A stop action was reached.
    Stopped,
    /// The step budget ran out, most likely because of a cycle.
    StepLimit,
    /// A node of unrecognised type was reached.
    UnknownNodeType,
    /// An edge pointed at a node id that does not exist.
    MissingNode,
}

impl WalkOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            WalkOutcome::NoMatchingStart => "no_matching_start",
            WalkOutcome::DeadEnd => "dead_end",
            WalkOutcome::Stopped => "stopped",
            WalkOutcome::StepLimit => "step_limit",
            WalkOutcome::UnknownNodeType => "unknown_node_type",
            WalkOutcome::MissingNode => "missing_node",
        }
    }
}

/// Everything one simulation run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationReport {
    /// Machine-oriented trace lines.
    pub logs: Vec<String>,
    /// Localized step messages for the editor.
    pub user_messages: Vec<String>,
    pub context: SimulationContext,
    pub outcome: WalkOutcome,
    /// Loop iterations the walk took.
    pub steps: usize,
}

//! Per-action outcome values
//!
//! Each individual dispatch attempt produces one of these. A failure is data,
//! not a panic, so one bad action can never abort its siblings.

use serde::{Deserialize, Serialize};

use crate::core::types::PlanetId;

/// Why an action was skipped without attempting a dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// The committed force would not clear the required margin
    InsufficientForce,
    /// A referenced planet no longer exists or changed hands
    MissingEntity,
    /// No viable attacker combination could be assembled
    NoAttackers,
    /// No planet in range is strong enough to help
    NoReinforcer,
}

/// Why an attempted dispatch produced no fleet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailReason {
    /// The host accepted the call but refused the order
    Refused,
    /// The host's dispatch capability faulted; message retained for logs
    Fault(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionResult {
    Dispatched,
    Skipped(SkipReason),
    Failed(FailReason),
}

/// One action considered during strategy execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionOutcome {
    /// Sending planet, absent when no source was ever chosen
    pub source: Option<PlanetId>,
    pub target: PlanetId,
    /// Ships involved (the intended count for skips and failures)
    pub ships: u32,
    pub result: ActionResult,
}

impl ActionOutcome {
    pub fn dispatched(source: PlanetId, target: PlanetId, ships: u32) -> Self {
        Self {
            source: Some(source),
            target,
            ships,
            result: ActionResult::Dispatched,
        }
    }

    pub fn skipped(target: PlanetId, reason: SkipReason) -> Self {
        Self {
            source: None,
            target,
            ships: 0,
            result: ActionResult::Skipped(reason),
        }
    }

    pub fn failed(source: PlanetId, target: PlanetId, ships: u32, reason: FailReason) -> Self {
        Self {
            source: Some(source),
            target,
            ships,
            result: ActionResult::Failed(reason),
        }
    }

    pub fn is_dispatched(&self) -> bool {
        matches!(self.result, ActionResult::Dispatched)
    }
}

/// Count of successful dispatches in a batch
pub fn dispatched_count(outcomes: &[ActionOutcome]) -> usize {
    outcomes.iter().filter(|o| o.is_dispatched()).count()
}

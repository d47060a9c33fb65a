//! Situation snapshot records
//!
//! Every field the rest of the pipeline reads is a statically known record
//! produced once per analysis pass and never mutated afterwards.

use serde::{Deserialize, Serialize};

use crate::core::types::{DecisionKind, FleetId, GameTime, PlanetId, Priority};

/// Per-owner planet aggregates
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OwnerStats {
    pub count: usize,
    pub total_garrison: u32,
    pub average_garrison: f32,
    pub total_production: f32,
    /// Garrison above the defend minimum, summed over all planets
    pub spare_garrison: u32,
    /// Planets with garrison above twice the minimum attack force
    pub strongholds: Vec<PlanetId>,
    /// Planets below the minimum defend force
    pub vulnerable: Vec<PlanetId>,
}

/// Planet aggregates for the agent, its opponent, and neutrals
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanetAnalysis {
    pub own: OwnerStats,
    pub enemy: OwnerStats,
    pub neutral: OwnerStats,
}

/// In-flight fleet aggregates
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FleetAnalysis {
    pub own_fleets: usize,
    pub enemy_fleets: usize,
    pub own_ships: u32,
    pub enemy_ships: u32,
    /// Enemy fleets currently heading for one of the agent's planets
    pub inbound_attacks: usize,
}

/// What makes a threat a threat
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ThreatKind {
    /// An enemy fleet is on its way to one of our planets
    FleetAttack {
        fleet: FleetId,
        /// Estimated seconds until arrival
        eta: f64,
        /// Whether a reinforcer is in range of the target
        defendable: bool,
    },
    /// A strong enemy planet sits close to one of ours
    NearbyEnemy { planet: PlanetId, distance: f32 },
}

/// A ranked threat against one of the agent's planets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Threat {
    pub target: PlanetId,
    /// Severity in [0, 1]
    pub severity: f32,
    pub kind: ThreatKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpportunityKind {
    Expansion,
    Attack,
    Reinforce,
}

/// A ranked opening the agent could act on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Opportunity {
    pub kind: OpportunityKind,
    pub target: PlanetId,
    /// Desirability in [0, 1]
    pub value: f32,
    /// Achievability in [0, 1]
    pub viability: f32,
    /// Planets that could act on this opportunity
    pub actors: Vec<PlanetId>,
}

/// Broad game phase, derived from how much of the map is still neutral
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Early,
    Mid,
    Late,
}

/// Relative standing label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Standing {
    Dominant,
    Advantageous,
    Balanced,
    Disadvantaged,
    Critical,
}

/// Summary of where the agent stands this tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategicSituation {
    pub phase: GamePhase,
    /// Signed [-1, 1]: whether the agent's relative position is improving
    pub momentum: f32,
    pub position: Standing,
    /// Aggregate threat pressure in [0, 1]
    pub threat_level: f32,
    pub urgency: f32,
    pub confidence: f32,
    /// Agent garrison total over enemy garrison total
    pub strength_ratio: f32,
    /// Fraction of the agent's garrison that is spare above defend minimums
    pub resource_availability: f32,
}

/// A rule-matched suggestion attached to the snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub kind: DecisionKind,
    pub priority: Priority,
    pub reason: String,
}

/// Immutable situation snapshot, produced once per analysis pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub created_at: GameTime,
    pub planets: PlanetAnalysis,
    pub fleets: FleetAnalysis,
    /// Sorted by severity, highest first
    pub threats: Vec<Threat>,
    /// Sorted by value, highest first
    pub opportunities: Vec<Opportunity>,
    pub situation: StrategicSituation,
    pub recommendations: Vec<Recommendation>,
}

impl Snapshot {
    /// Opportunities of one kind, preserving rank order
    pub fn opportunities_of(&self, kind: OpportunityKind) -> impl Iterator<Item = &Opportunity> {
        self.opportunities.iter().filter(move |o| o.kind == kind)
    }

    /// Threats from in-flight fleets, preserving rank order
    pub fn fleet_threats(&self) -> impl Iterator<Item = &Threat> {
        self.threats
            .iter()
            .filter(|t| matches!(t.kind, ThreatKind::FleetAttack { .. }))
    }
}

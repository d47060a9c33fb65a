//! Decision selector: one situation snapshot in, exactly one decision out
//!
//! Candidate options are generated per viable category, weighted by the
//! agent's personality and the assessed standing, and the best one wins. A
//! sufficiently aggressive agent may bundle runner-up options as secondary
//! actions in the same decision.

use std::time::Instant;

use ahash::AHashMap;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::analysis::snapshot::{
    GamePhase, OpportunityKind, Snapshot, Standing, Threat, ThreatKind,
};
use crate::core::config::AiConfig;
use crate::core::history::BoundedHistory;
use crate::core::types::{clamp01, DecisionKind, GameTime, PlanetId, Priority};

/// A lower-ranked option bundled into a multi-action decision
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecondaryAction {
    pub kind: DecisionKind,
    pub targets: Vec<PlanetId>,
}

/// The selector's single product: what to do this tick.
///
/// Immutable once created; the strategy executor consumes it exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    pub kind: DecisionKind,
    pub priority: Priority,
    pub confidence: f32,
    pub targets: Vec<PlanetId>,
    /// Threats this decision responds to; empty unless defending
    pub threats: Vec<Threat>,
    /// At most two bundled follow-up actions
    pub secondary: Vec<SecondaryAction>,
    /// The situation the decision was derived from
    pub situation: crate::analysis::snapshot::StrategicSituation,
    pub created_at: GameTime,
}

/// One scored candidate per category
#[derive(Debug, Clone)]
struct CandidateOption {
    kind: DecisionKind,
    base_value: f32,
    urgency: f32,
    viability: f32,
    total_value: f32,
    targets: Vec<PlanetId>,
    threats: Vec<Threat>,
}

/// Running totals over all decisions made by one selector
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecisionMetrics {
    pub decisions: u64,
    pub by_kind: AHashMap<DecisionKind, u64>,
    pub total_decision_ms: f64,
}

impl DecisionMetrics {
    pub fn average_decision_ms(&self) -> f64 {
        if self.decisions == 0 {
            0.0
        } else {
            self.total_decision_ms / self.decisions as f64
        }
    }
}

/// Options below this achievability are never selected
const VIABILITY_FLOOR: f32 = 0.25;

pub struct DecisionSelector {
    config: AiConfig,
    history: BoundedHistory<Decision>,
    metrics: DecisionMetrics,
}

impl DecisionSelector {
    pub fn new(config: AiConfig) -> Self {
        let cap = config.decision_history_cap;
        Self {
            config,
            history: BoundedHistory::new(cap),
            metrics: DecisionMetrics::default(),
        }
    }

    /// Produce exactly one decision from the snapshot.
    pub fn decide(&mut self, snapshot: &Snapshot) -> Decision {
        let started = Instant::now();

        let mut options = self.generate_options(snapshot);
        options.retain(|o| o.viability >= VIABILITY_FLOOR);
        options.sort_by_key(|o| std::cmp::Reverse(OrderedFloat(o.total_value)));

        if let Some(best) = options.first() {
            tracing::trace!(
                kind = ?best.kind,
                base_value = best.base_value,
                urgency = best.urgency,
                viability = best.viability,
                total_value = best.total_value,
                "top option"
            );
        }

        let decision = match options.first() {
            None => self.fallback_decision(snapshot),
            Some(_) => {
                let winner = options[0].clone();
                let secondary = self.secondary_actions(snapshot, &options);
                self.build_decision(snapshot, winner, secondary)
            }
        };

        self.metrics.decisions += 1;
        *self.metrics.by_kind.entry(decision.kind).or_insert(0) += 1;
        self.metrics.total_decision_ms += started.elapsed().as_secs_f64() * 1000.0;
        self.history.push(decision.clone());

        tracing::debug!(
            kind = ?decision.kind,
            confidence = decision.confidence,
            targets = decision.targets.len(),
            secondary = decision.secondary.len(),
            "decision selected"
        );
        decision
    }

    pub fn metrics(&self) -> &DecisionMetrics {
        &self.metrics
    }

    pub fn history(&self) -> &BoundedHistory<Decision> {
        &self.history
    }

    fn generate_options(&self, snapshot: &Snapshot) -> Vec<CandidateOption> {
        let mut options = Vec::new();
        let situation = &snapshot.situation;

        let expansion: Vec<_> = snapshot
            .opportunities_of(OpportunityKind::Expansion)
            .collect();
        let attack: Vec<_> = snapshot.opportunities_of(OpportunityKind::Attack).collect();
        let reinforce: Vec<_> = snapshot
            .opportunities_of(OpportunityKind::Reinforce)
            .collect();

        if let Some(best) = expansion.first() {
            let urgency = match situation.phase {
                GamePhase::Early => 0.7,
                GamePhase::Mid => 0.5,
                GamePhase::Late => 0.3,
            };
            options.push(self.option(
                snapshot,
                DecisionKind::Expand,
                best.value,
                urgency,
                best.viability,
                targets_of(&expansion, self.config.max_targets),
                Vec::new(),
            ));
        }

        if let Some(best) = attack.first() {
            let urgency = clamp01(0.4 + situation.momentum * 0.2);
            options.push(self.option(
                snapshot,
                DecisionKind::Attack,
                best.value,
                urgency,
                best.viability,
                targets_of(&attack, self.config.max_targets),
                Vec::new(),
            ));
        }

        if !snapshot.threats.is_empty() {
            let fleet_threats: Vec<Threat> = snapshot.fleet_threats().cloned().collect();
            let defendable = fleet_threats
                .iter()
                .filter(|t| matches!(t.kind, ThreatKind::FleetAttack { defendable: true, .. }))
                .count();
            let viability = if fleet_threats.is_empty() {
                0.5
            } else {
                clamp01(0.4 + 0.4 * defendable as f32 / fleet_threats.len() as f32)
            };
            options.push(self.option(
                snapshot,
                DecisionKind::Defend,
                clamp01(situation.threat_level + 0.1),
                clamp01(situation.threat_level + 0.2),
                viability,
                snapshot.threats.iter().map(|t| t.target).collect(),
                snapshot.threats.clone(),
            ));
        }

        if let Some(best) = reinforce.first() {
            options.push(self.option(
                snapshot,
                DecisionKind::Reinforce,
                best.value,
                clamp01(0.3 + situation.threat_level * 0.4),
                best.viability,
                targets_of(&reinforce, self.config.max_targets),
                Vec::new(),
            ));
        }

        // Aggressive expansion: a wider land-grab, only for confident,
        // unthreatened, aggressive personalities.
        if !expansion.is_empty()
            && situation.resource_availability > 0.6
            && situation.threat_level < 0.4
            && self.config.aggressiveness > 0.7
        {
            let best = expansion[0];
            options.push(self.option(
                snapshot,
                DecisionKind::AggressiveExpand,
                clamp01(best.value * 1.1),
                0.6,
                clamp01(best.viability * 0.9),
                targets_of(&expansion, self.config.max_targets + 1),
                Vec::new(),
            ));
        }

        options
    }

    #[allow(clippy::too_many_arguments)]
    fn option(
        &self,
        snapshot: &Snapshot,
        kind: DecisionKind,
        base_value: f32,
        urgency: f32,
        viability: f32,
        targets: Vec<PlanetId>,
        threats: Vec<Threat>,
    ) -> CandidateOption {
        let raw = base_value * 0.5 + urgency * 0.3 + viability * 0.2;
        let personality = self.personality_bias(kind);
        let situational = situational_bias(kind, snapshot.situation.position);
        CandidateOption {
            kind,
            base_value,
            urgency,
            viability,
            total_value: raw * personality * situational,
            targets,
            threats,
        }
    }

    fn personality_bias(&self, kind: DecisionKind) -> f32 {
        let c = &self.config;
        match kind {
            DecisionKind::Expand => 0.5 + c.expansion_priority,
            DecisionKind::Attack => 0.5 + c.aggressiveness,
            DecisionKind::Defend => 1.5 - c.risk_tolerance,
            DecisionKind::Reinforce => 0.5 + c.patience,
            DecisionKind::AggressiveExpand => c.aggressiveness * (0.5 + c.expansion_priority),
        }
    }

    fn secondary_actions(
        &self,
        snapshot: &Snapshot,
        ranked: &[CandidateOption],
    ) -> Vec<SecondaryAction> {
        let situation = &snapshot.situation;
        let allowed = self.config.aggressiveness > self.config.multi_action_threshold
            && situation.resource_availability > 0.7
            && ranked.len() > 1
            && situation.position != Standing::Critical;
        if !allowed {
            return Vec::new();
        }

        ranked
            .iter()
            .skip(1)
            .take(2)
            .map(|o| SecondaryAction {
                kind: o.kind,
                targets: o.targets.clone(),
            })
            .collect()
    }

    fn build_decision(
        &self,
        snapshot: &Snapshot,
        winner: CandidateOption,
        secondary: Vec<SecondaryAction>,
    ) -> Decision {
        let situation = &snapshot.situation;
        let priority = if winner.urgency > 0.7 || situation.position == Standing::Critical {
            Priority::High
        } else if winner.total_value < 0.3 {
            Priority::Low
        } else {
            Priority::Medium
        };

        Decision {
            kind: winner.kind,
            priority,
            confidence: (winner.total_value * 0.6 + situation.confidence * 0.4)
                .clamp(0.1, 0.95),
            targets: winner.targets,
            threats: winner.threats,
            secondary,
            situation: situation.clone(),
            created_at: snapshot.created_at,
        }
    }

    /// Nothing viable: hold position and consolidate.
    fn fallback_decision(&self, snapshot: &Snapshot) -> Decision {
        Decision {
            kind: DecisionKind::Reinforce,
            priority: Priority::Low,
            confidence: 0.3,
            targets: snapshot.planets.own.vulnerable.clone(),
            threats: Vec::new(),
            secondary: Vec::new(),
            situation: snapshot.situation.clone(),
            created_at: snapshot.created_at,
        }
    }
}

fn targets_of(
    opportunities: &[&crate::analysis::snapshot::Opportunity],
    cap: usize,
) -> Vec<PlanetId> {
    opportunities.iter().take(cap).map(|o| o.target).collect()
}

fn situational_bias(kind: DecisionKind, position: Standing) -> f32 {
    match (position, kind) {
        (Standing::Critical, DecisionKind::Defend) => 1.5,
        (Standing::Critical, DecisionKind::Reinforce) => 1.3,
        (Standing::Dominant, DecisionKind::Attack) => 1.4,
        (Standing::Dominant, DecisionKind::AggressiveExpand) => 1.3,
        _ => 1.0,
    }
}

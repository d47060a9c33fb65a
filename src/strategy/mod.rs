//! Strategy executor: decisions become fleet orders
//!
//! Each decision kind maps to a dedicated routine that re-queries the
//! targeting optimizer for concrete targets and issues dispatches. Every
//! dispatch is isolated; the strategy as a whole succeeds if any single
//! order went out.

pub mod outcome;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::config::AiConfig;
use crate::core::history::BoundedHistory;
use crate::core::types::{DecisionKind, GameTime, Owner, PlanetId};
use crate::decision::Decision;
use crate::targeting::TargetingOptimizer;
use crate::world::{FleetDispatch, WorldView};

use outcome::{dispatched_count, ActionOutcome, FailReason, SkipReason};

/// Unique identifier for strategy records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StrategyId(pub Uuid);

impl StrategyId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for StrategyId {
    fn default() -> Self {
        Self::new()
    }
}

/// Lifecycle of one strategy execution. Always terminal once `execute`
/// returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrategyStatus {
    Executing,
    Completed,
    Failed,
    /// A routine fault escaped the per-action isolation boundary
    Error,
}

impl StrategyStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StrategyStatus::Executing)
    }
}

/// Record of one executed strategy, kept in bounded history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyRecord {
    pub id: StrategyId,
    pub kind: DecisionKind,
    pub status: StrategyStatus,
    pub targets: Vec<PlanetId>,
    pub started_at: GameTime,
    pub finished_at: Option<GameTime>,
    /// Fleets actually sent
    pub dispatched: u32,
    pub outcomes: Vec<ActionOutcome>,
}

/// Notification hooks for the host. All methods are optional; the default
/// implementation ignores everything.
pub trait NotificationHooks {
    fn on_expansion_executed(&mut self, _target: PlanetId, _ships: u32) {}
    fn on_attack_executed(&mut self, _target: PlanetId, _ships: u32) {}
    fn on_defense_executed(&mut self, _target: PlanetId, _ships: u32) {}
    fn on_reinforcement_executed(&mut self, _target: PlanetId, _ships: u32) {}
}

/// Running execution totals; `total_strategies` always equals
/// `successful_strategies + failed_strategies`.
#[derive(Debug, Clone, Default)]
pub struct ExecutionMetrics {
    pub total_strategies: u64,
    pub successful_strategies: u64,
    pub failed_strategies: u64,
    pub dispatches_attempted: u64,
    pub dispatches_succeeded: u64,
    pub dispatch_faults: u64,
    pub attempts_by_kind: AHashMap<DecisionKind, u64>,
}

pub struct StrategyExecutor {
    side: Owner,
    config: AiConfig,
    history: BoundedHistory<StrategyRecord>,
    metrics: ExecutionMetrics,
    hooks: Option<Box<dyn NotificationHooks>>,
}

impl StrategyExecutor {
    pub fn new(side: Owner, config: AiConfig) -> Self {
        let cap = config.strategy_history_cap;
        Self {
            side,
            config,
            history: BoundedHistory::new(cap),
            metrics: ExecutionMetrics::default(),
            hooks: None,
        }
    }

    /// Install host notification hooks. Absence never affects execution.
    pub fn set_hooks(&mut self, hooks: Box<dyn NotificationHooks>) {
        self.hooks = Some(hooks);
    }

    /// Execute a decision against the world. Returns true when at least one
    /// dispatch went out. A record lands in history regardless of outcome.
    pub fn execute<W: WorldView + FleetDispatch>(
        &mut self,
        decision: &Decision,
        world: &mut W,
        targeting: &mut TargetingOptimizer,
    ) -> bool {
        let mut record = StrategyRecord {
            id: StrategyId::new(),
            kind: decision.kind,
            status: StrategyStatus::Executing,
            targets: decision.targets.clone(),
            started_at: world.time(),
            finished_at: None,
            dispatched: 0,
            outcomes: Vec::new(),
        };

        *self.metrics.attempts_by_kind.entry(decision.kind).or_insert(0) += 1;

        let mut faulted = false;
        match self.run_kind(decision.kind, decision, world, targeting) {
            Ok(outcomes) => record.outcomes.extend(outcomes),
            Err(error) => {
                tracing::warn!(kind = ?decision.kind, %error, "strategy routine faulted");
                faulted = true;
            }
        }

        if !faulted {
            for secondary in decision.secondary.iter().take(2) {
                *self
                    .metrics
                    .attempts_by_kind
                    .entry(secondary.kind)
                    .or_insert(0) += 1;
                match self.run_kind(secondary.kind, decision, world, targeting) {
                    Ok(outcomes) => record.outcomes.extend(outcomes),
                    Err(error) => {
                        tracing::warn!(
                            kind = ?secondary.kind,
                            %error,
                            "secondary routine faulted"
                        );
                        faulted = true;
                        break;
                    }
                }
            }
        }

        record.dispatched = dispatched_count(&record.outcomes) as u32;
        record.status = if faulted {
            StrategyStatus::Error
        } else if record.dispatched > 0 {
            StrategyStatus::Completed
        } else {
            StrategyStatus::Failed
        };
        record.finished_at = Some(world.time());

        self.metrics.total_strategies += 1;
        if record.status == StrategyStatus::Completed {
            self.metrics.successful_strategies += 1;
        } else {
            self.metrics.failed_strategies += 1;
        }

        let success = record.status == StrategyStatus::Completed;
        tracing::info!(
            kind = ?record.kind,
            status = ?record.status,
            dispatched = record.dispatched,
            "strategy finished"
        );
        self.history.push(record);
        success
    }

    pub fn metrics(&self) -> &ExecutionMetrics {
        &self.metrics
    }

    pub fn history(&self) -> &BoundedHistory<StrategyRecord> {
        &self.history
    }

    fn run_kind<W: WorldView + FleetDispatch>(
        &mut self,
        kind: DecisionKind,
        decision: &Decision,
        world: &mut W,
        targeting: &mut TargetingOptimizer,
    ) -> crate::core::Result<Vec<ActionOutcome>> {
        match kind {
            DecisionKind::Expand => self.execute_expansion(world, targeting, false),
            DecisionKind::AggressiveExpand => self.execute_expansion(world, targeting, true),
            DecisionKind::Attack => self.execute_attack(world, targeting),
            DecisionKind::Defend => self.execute_defend(decision, world),
            DecisionKind::Reinforce => self.execute_reinforce(decision, world),
        }
    }

    /// Claim neutral planets. Each dispatch must clear 1.2x the target
    /// garrison or the target is skipped untouched.
    fn execute_expansion<W: WorldView + FleetDispatch>(
        &mut self,
        world: &mut W,
        targeting: &mut TargetingOptimizer,
        aggressive: bool,
    ) -> crate::core::Result<Vec<ActionOutcome>> {
        let count = if aggressive {
            self.config.max_targets + 1
        } else {
            self.config.max_targets
        };
        let targets = targeting.expansion_targets(&*world, count);

        let mut outcomes = Vec::new();
        for target in targets.iter() {
            let Some(claim) = world.planet(target.planet) else {
                outcomes.push(ActionOutcome::skipped(target.planet, SkipReason::MissingEntity));
                continue;
            };
            if claim.owner != Owner::Neutral {
                outcomes.push(ActionOutcome::skipped(target.planet, SkipReason::MissingEntity));
                continue;
            }
            let target_garrison = claim.garrison;

            let source = world.planet(target.attacker);
            let Some(source) = source.filter(|p| p.owner == self.side) else {
                outcomes.push(ActionOutcome::skipped(target.planet, SkipReason::MissingEntity));
                continue;
            };

            let ships = (source.garrison as f32 * self.config.expand_percentage).floor() as u32;
            if (ships as f32) < target_garrison as f32 * 1.2 {
                outcomes.push(ActionOutcome::skipped(
                    target.planet,
                    SkipReason::InsufficientForce,
                ));
                continue;
            }

            let order = self.dispatch(
                world,
                target.attacker,
                target.planet,
                self.config.expand_percentage,
                ships,
            );
            outcomes.push(order);
        }

        self.notify(&outcomes, |hooks, target, ships| {
            hooks.on_expansion_executed(target, ships)
        });
        Ok(outcomes)
    }

    /// Assault enemy planets with greedy attacker combinations; every
    /// attacker dispatches independently.
    fn execute_attack<W: WorldView + FleetDispatch>(
        &mut self,
        world: &mut W,
        targeting: &mut TargetingOptimizer,
    ) -> crate::core::Result<Vec<ActionOutcome>> {
        let targets = targeting.attack_targets(&*world, self.config.max_targets);

        let mut outcomes = Vec::new();
        for target in targets.iter() {
            if world.planet(target.planet).is_none() {
                outcomes.push(ActionOutcome::skipped(target.planet, SkipReason::MissingEntity));
                continue;
            }

            let attackers = targeting.attackers_for(&*world, target.planet, self.config.max_attackers);
            if attackers.is_empty() {
                outcomes.push(ActionOutcome::skipped(target.planet, SkipReason::NoAttackers));
                continue;
            }

            let sources: Vec<PlanetId> = attackers.iter().map(|a| a.planet).collect();
            let timing = targeting.plan_routes(&*world, &sources, target.planet);
            tracing::debug!(
                target = ?target.planet,
                attackers = sources.len(),
                arrival = ?timing.arrival,
                "attack wave planned"
            );

            for attacker in attackers.iter() {
                let still_ours = world
                    .planet(attacker.planet)
                    .map_or(false, |p| p.owner == self.side);
                if !still_ours {
                    outcomes.push(ActionOutcome::skipped(target.planet, SkipReason::MissingEntity));
                    continue;
                }
                let order = self.dispatch(
                    world,
                    attacker.planet,
                    target.planet,
                    self.config.attack_percentage,
                    attacker.committed,
                );
                outcomes.push(order);
            }
        }

        self.notify(&outcomes, |hooks, target, ships| {
            hooks.on_attack_executed(target, ships)
        });
        Ok(outcomes)
    }

    /// Rush reinforcements to planets under immediate fleet attack.
    fn execute_defend<W: WorldView + FleetDispatch>(
        &mut self,
        decision: &Decision,
        world: &mut W,
    ) -> crate::core::Result<Vec<ActionOutcome>> {
        let mut outcomes = Vec::new();

        for threat in decision
            .threats
            .iter()
            .filter(|t| matches!(t.kind, crate::analysis::snapshot::ThreatKind::FleetAttack { .. }))
        {
            let defenders = self.reinforcers_for(&*world, threat.target);
            if defenders.is_empty() {
                outcomes.push(ActionOutcome::skipped(threat.target, SkipReason::NoReinforcer));
                continue;
            }

            for (defender, garrison) in defenders {
                let ships = (garrison as f32 * self.config.defend_percentage).floor() as u32;
                let order = self.dispatch(
                    world,
                    defender,
                    threat.target,
                    self.config.defend_percentage,
                    ships,
                );
                outcomes.push(order);
            }
        }

        self.notify(&outcomes, |hooks, target, ships| {
            hooks.on_defense_executed(target, ships)
        });
        Ok(outcomes)
    }

    /// Shore up weak planets, one best reinforcer each.
    fn execute_reinforce<W: WorldView + FleetDispatch>(
        &mut self,
        decision: &Decision,
        world: &mut W,
    ) -> crate::core::Result<Vec<ActionOutcome>> {
        let weak: Vec<PlanetId> = if decision.targets.is_empty() {
            world
                .planets_owned_by(self.side)
                .iter()
                .filter(|p| p.garrison < self.config.min_ships_to_defend)
                .map(|p| p.id)
                .collect()
        } else {
            decision.targets.clone()
        };

        let mut outcomes = Vec::new();
        for planet in weak {
            let still_ours = world
                .planet(planet)
                .map_or(false, |p| p.owner == self.side);
            if !still_ours {
                outcomes.push(ActionOutcome::skipped(planet, SkipReason::MissingEntity));
                continue;
            }

            // Best single reinforcer by garrison over distance
            let best = self
                .reinforcers_for(&*world, planet)
                .into_iter()
                .max_by(|a, b| {
                    let score = |&(id, garrison): &(PlanetId, u32)| {
                        let distance = match (world.planet(id), world.planet(planet)) {
                            (Some(from), Some(to)) => from.distance_to(to),
                            _ => f32::MAX,
                        };
                        garrison as f32 / (1.0 + distance)
                    };
                    score(a).partial_cmp(&score(b)).unwrap()
                });

            let Some((reinforcer, garrison)) = best else {
                outcomes.push(ActionOutcome::skipped(planet, SkipReason::NoReinforcer));
                continue;
            };

            let ships = (garrison as f32 * self.config.reinforce_percentage).floor() as u32;
            let order = self.dispatch(
                world,
                reinforcer,
                planet,
                self.config.reinforce_percentage,
                ships,
            );
            outcomes.push(order);
        }

        self.notify(&outcomes, |hooks, target, ships| {
            hooks.on_reinforcement_executed(target, ships)
        });
        Ok(outcomes)
    }

    /// Owned planets able to send help to `target`: in range, not the target
    /// itself, and holding a real surplus.
    fn reinforcers_for<W: WorldView>(&self, world: &W, target: PlanetId) -> Vec<(PlanetId, u32)> {
        let Some(target_planet) = world.planet(target) else {
            return Vec::new();
        };
        world
            .planets_owned_by(self.side)
            .iter()
            .filter(|p| {
                p.id != target
                    && p.garrison > self.config.min_ships_to_defend * 2
                    && p.distance_to(target_planet) <= self.config.reinforce_range
            })
            .map(|p| (p.id, p.garrison))
            .collect()
    }

    /// One isolated dispatch. Host faults become failed outcomes, never
    /// escapes.
    fn dispatch<W: WorldView + FleetDispatch>(
        &mut self,
        world: &mut W,
        source: PlanetId,
        target: PlanetId,
        fraction: f32,
        ships: u32,
    ) -> ActionOutcome {
        self.metrics.dispatches_attempted += 1;
        match world.send_fleet(source, target, fraction) {
            Ok(true) => {
                self.metrics.dispatches_succeeded += 1;
                ActionOutcome::dispatched(source, target, ships)
            }
            Ok(false) => ActionOutcome::failed(source, target, ships, FailReason::Refused),
            Err(fault) => {
                self.metrics.dispatch_faults += 1;
                tracing::warn!(?source, ?target, %fault, "dispatch fault");
                ActionOutcome::failed(source, target, ships, FailReason::Fault(fault.0))
            }
        }
    }

    /// Fire a hook once per routine run, with the first successful dispatch.
    fn notify<F>(&mut self, outcomes: &[ActionOutcome], fire: F)
    where
        F: Fn(&mut dyn NotificationHooks, PlanetId, u32),
    {
        let Some(hooks) = self.hooks.as_deref_mut() else {
            return;
        };
        if let Some(first) = outcomes.iter().find(|o| o.is_dispatched()) {
            fire(hooks, first.target, first.ships);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::AnalysisEngine;
    use crate::core::types::Vec2;
    use crate::decision::DecisionSelector;
    use crate::world::sim::GameWorld;
    use crate::world::Planet;
    use super::outcome::ActionResult;

    fn pipeline_parts() -> (DecisionSelector, StrategyExecutor, TargetingOptimizer) {
        let config = AiConfig::default();
        (
            DecisionSelector::new(config.clone()),
            StrategyExecutor::new(Owner::Ai, config.clone()),
            TargetingOptimizer::new(Owner::Ai, config),
        )
    }

    fn decide(world: &GameWorld) -> Decision {
        let snapshot = AnalysisEngine::new(Owner::Ai, AiConfig::default()).analyze(world);
        DecisionSelector::new(AiConfig::default()).decide(&snapshot)
    }

    #[test]
    fn test_expansion_dispatches_when_force_sufficient() {
        let mut world = GameWorld::new();
        world.add_planet(Planet::new(PlanetId(1), Vec2::new(0.0, 0.0), Owner::Ai, 50));
        world.add_planet(Planet::new(PlanetId(2), Vec2::new(100.0, 0.0), Owner::Neutral, 20));

        let decision = decide(&world);
        let (_, mut executor, mut targeting) = pipeline_parts();
        let success = executor.execute(&decision, &mut world, &mut targeting);

        assert!(success);
        // floor(50 * 0.5) = 25 >= 20 * 1.2 = 24: dispatched
        assert_eq!(world.planet(PlanetId(1)).unwrap().garrison, 25);
        assert_eq!(world.fleet_count(), 1);
        assert_eq!(world.fleets()[0].ships, 25);
        assert_eq!(executor.history().latest().unwrap().status, StrategyStatus::Completed);
    }

    #[test]
    fn test_expansion_skips_insufficient_force() {
        let mut world = GameWorld::new();
        world.add_planet(Planet::new(PlanetId(1), Vec2::new(0.0, 0.0), Owner::Ai, 46));
        world.add_planet(Planet::new(PlanetId(2), Vec2::new(100.0, 0.0), Owner::Neutral, 20));

        let decision = decide(&world);
        let (_, mut executor, mut targeting) = pipeline_parts();
        let success = executor.execute(&decision, &mut world, &mut targeting);

        // floor(46 * 0.5) = 23 < 24: skipped, garrison untouched
        assert!(!success);
        assert_eq!(world.planet(PlanetId(1)).unwrap().garrison, 46);
        assert_eq!(world.fleet_count(), 0);

        let record = executor.history().latest().unwrap();
        assert_eq!(record.status, StrategyStatus::Failed);
        assert!(record
            .outcomes
            .iter()
            .any(|o| o.result == ActionResult::Skipped(SkipReason::InsufficientForce)));
    }

    #[test]
    fn test_dispatch_fault_isolated_per_action() {
        let mut world = GameWorld::new();
        world.add_planet(Planet::new(PlanetId(1), Vec2::new(0.0, 0.0), Owner::Ai, 80));
        world.add_planet(Planet::new(PlanetId(2), Vec2::new(100.0, 0.0), Owner::Neutral, 10));
        world.add_planet(Planet::new(PlanetId(3), Vec2::new(0.0, 100.0), Owner::Neutral, 10));
        world.set_fail_dispatch(true);

        let decision = decide(&world);
        let (_, mut executor, mut targeting) = pipeline_parts();
        let success = executor.execute(&decision, &mut world, &mut targeting);

        assert!(!success);
        let record = executor.history().latest().unwrap();
        // Faults are per-action outcomes, not an error status
        assert_eq!(record.status, StrategyStatus::Failed);
        let faults = record
            .outcomes
            .iter()
            .filter(|o| matches!(o.result, ActionResult::Failed(FailReason::Fault(_))))
            .count();
        assert_eq!(faults, 2); // both targets attempted despite first fault
        assert_eq!(executor.metrics().dispatch_faults, 2);
    }

    #[test]
    fn test_metrics_invariant_over_many_executions() {
        let mut world = GameWorld::new();
        world.add_planet(Planet::new(PlanetId(1), Vec2::new(0.0, 0.0), Owner::Ai, 50));
        world.add_planet(Planet::new(PlanetId(2), Vec2::new(100.0, 0.0), Owner::Neutral, 20));

        let decision = decide(&world);
        let (_, mut executor, mut targeting) = pipeline_parts();

        for i in 0..10 {
            // Alternate fault injection so both outcomes occur
            world.set_fail_dispatch(i % 2 == 0);
            world.planet_mut(PlanetId(1)).unwrap().garrison = 50;
            executor.execute(&decision, &mut world, &mut targeting);
            world.step(3.0); // expire targeting caches between rounds
        }

        let metrics = executor.metrics();
        assert_eq!(metrics.total_strategies, 10);
        assert_eq!(
            metrics.total_strategies,
            metrics.successful_strategies + metrics.failed_strategies
        );
        assert!(executor
            .history()
            .iter()
            .all(|r| r.status.is_terminal()));
    }

    #[test]
    fn test_reinforce_picks_single_best_reinforcer() {
        let mut world = GameWorld::new();
        world.add_planet(Planet::new(PlanetId(1), Vec2::new(0.0, 0.0), Owner::Ai, 2));
        world.add_planet(Planet::new(PlanetId(2), Vec2::new(50.0, 0.0), Owner::Ai, 40));
        world.add_planet(Planet::new(PlanetId(3), Vec2::new(120.0, 0.0), Owner::Ai, 45));

        let decision = decide(&world);
        assert_eq!(decision.kind, DecisionKind::Reinforce);

        let (_, mut executor, mut targeting) = pipeline_parts();
        let success = executor.execute(&decision, &mut world, &mut targeting);
        assert!(success);

        // Closer planet 2 wins on garrison/distance despite smaller garrison:
        // 40/51 > 45/121
        assert_eq!(world.planet(PlanetId(2)).unwrap().garrison, 24);
        assert_eq!(world.planet(PlanetId(3)).unwrap().garrison, 45);
        assert_eq!(world.fleet_count(), 1);
    }

    #[test]
    fn test_defend_routes_help_to_threatened_planet() {
        let mut world = GameWorld::new();
        world.add_planet(Planet::new(PlanetId(1), Vec2::new(0.0, 0.0), Owner::Ai, 50));
        world.add_planet(Planet::new(PlanetId(2), Vec2::new(80.0, 0.0), Owner::Ai, 40));
        world.add_planet(Planet::new(PlanetId(3), Vec2::new(200.0, 0.0), Owner::Player, 140));
        world.send_fleet(PlanetId(3), PlanetId(1), 0.5).unwrap();

        let decision = decide(&world);
        assert_eq!(decision.kind, DecisionKind::Defend);

        let (_, mut executor, mut targeting) = pipeline_parts();
        let success = executor.execute(&decision, &mut world, &mut targeting);
        assert!(success);
        // Planet 2 sent floor(40 * 0.3) = 12 ships toward planet 1
        assert_eq!(world.planet(PlanetId(2)).unwrap().garrison, 28);
        let defense_fleet = world
            .fleets()
            .iter()
            .find(|f| f.owner == Owner::Ai)
            .unwrap();
        assert_eq!(defense_fleet.target, PlanetId(1));
        assert_eq!(defense_fleet.ships, 12);
    }

    #[test]
    fn test_hooks_fire_on_success() {
        struct Recorder(std::rc::Rc<std::cell::RefCell<Vec<(PlanetId, u32)>>>);
        impl NotificationHooks for Recorder {
            fn on_expansion_executed(&mut self, target: PlanetId, ships: u32) {
                self.0.borrow_mut().push((target, ships));
            }
        }

        let mut world = GameWorld::new();
        world.add_planet(Planet::new(PlanetId(1), Vec2::new(0.0, 0.0), Owner::Ai, 50));
        world.add_planet(Planet::new(PlanetId(2), Vec2::new(100.0, 0.0), Owner::Neutral, 20));

        let fired = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let decision = decide(&world);
        let (_, mut executor, mut targeting) = pipeline_parts();
        executor.set_hooks(Box::new(Recorder(std::rc::Rc::clone(&fired))));
        executor.execute(&decision, &mut world, &mut targeting);

        assert_eq!(*fired.borrow(), vec![(PlanetId(2), 25)]);
    }
}

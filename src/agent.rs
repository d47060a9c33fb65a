//! Agent front: one call per simulation tick
//!
//! Owns one instance of every pipeline stage. Running several agents means
//! constructing several players; caches and histories are never shared.

use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisEngine;
use crate::core::config::AiConfig;
use crate::core::types::{DecisionKind, GameTime, Owner, Priority};
use crate::decision::DecisionSelector;
use crate::strategy::{NotificationHooks, StrategyExecutor};
use crate::targeting::TargetingOptimizer;
use crate::world::{FleetDispatch, WorldView};

/// Summary of one pipeline run, returned to the host each tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickReport {
    pub time: GameTime,
    pub kind: DecisionKind,
    pub priority: Priority,
    pub confidence: f32,
    /// Whether at least one dispatch went out
    pub executed: bool,
    pub targets: usize,
    pub secondary_actions: usize,
}

/// A complete AI opponent for one owner role.
pub struct AiPlayer {
    side: Owner,
    analysis: AnalysisEngine,
    targeting: TargetingOptimizer,
    selector: DecisionSelector,
    executor: StrategyExecutor,
}

impl AiPlayer {
    /// Build a player for `side`. The config is validated; an invalid config
    /// is a programming error at the boundary, reported as `InvalidConfig`.
    pub fn new(side: Owner, config: AiConfig) -> crate::core::Result<Self> {
        config
            .validate()
            .map_err(crate::core::AiError::InvalidConfig)?;
        Ok(Self {
            side,
            analysis: AnalysisEngine::new(side, config.clone()),
            targeting: TargetingOptimizer::new(side, config.clone()),
            selector: DecisionSelector::new(config.clone()),
            executor: StrategyExecutor::new(side, config),
        })
    }

    /// Install host notification hooks.
    pub fn with_hooks(mut self, hooks: Box<dyn NotificationHooks>) -> Self {
        self.executor.set_hooks(hooks);
        self
    }

    pub fn side(&self) -> Owner {
        self.side
    }

    /// Run the full pipeline once: analyze, decide, execute.
    pub fn tick<W: WorldView + FleetDispatch>(&mut self, world: &mut W) -> TickReport {
        let snapshot = self.analysis.analyze(&*world);
        let decision = self.selector.decide(&snapshot);
        let executed = self
            .executor
            .execute(&decision, world, &mut self.targeting);

        tracing::debug!(
            side = ?self.side,
            kind = ?decision.kind,
            executed,
            "tick complete"
        );

        TickReport {
            time: world.time(),
            kind: decision.kind,
            priority: decision.priority,
            confidence: decision.confidence,
            executed,
            targets: decision.targets.len(),
            secondary_actions: decision.secondary.len(),
        }
    }

    /// Read access for inspection and tests
    pub fn analysis(&self) -> &AnalysisEngine {
        &self.analysis
    }

    pub fn targeting(&self) -> &TargetingOptimizer {
        &self.targeting
    }

    pub fn selector(&self) -> &DecisionSelector {
        &self.selector
    }

    pub fn executor(&self) -> &StrategyExecutor {
        &self.executor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{PlanetId, Vec2};
    use crate::world::sim::GameWorld;
    use crate::world::Planet;

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = AiConfig::default();
        config.expand_percentage = 1.4;
        assert!(AiPlayer::new(Owner::Ai, config).is_err());
    }

    #[test]
    fn test_tick_runs_full_pipeline() {
        let mut world = GameWorld::new();
        world.add_planet(Planet::new(PlanetId(1), Vec2::new(0.0, 0.0), Owner::Ai, 50));
        world.add_planet(Planet::new(PlanetId(2), Vec2::new(100.0, 0.0), Owner::Neutral, 20));

        let mut player = AiPlayer::new(Owner::Ai, AiConfig::default()).unwrap();
        let report = player.tick(&mut world);

        assert_eq!(report.kind, DecisionKind::Expand);
        assert!(report.executed);
        assert_eq!(player.executor().metrics().total_strategies, 1);
        assert_eq!(player.selector().metrics().decisions, 1);
    }

    #[test]
    fn test_players_are_fully_independent() {
        let mut world = GameWorld::new();
        world.add_planet(Planet::new(PlanetId(1), Vec2::new(0.0, 0.0), Owner::Ai, 50));
        world.add_planet(Planet::new(PlanetId(2), Vec2::new(300.0, 0.0), Owner::Player, 50));
        world.add_planet(Planet::new(PlanetId(3), Vec2::new(100.0, 0.0), Owner::Neutral, 20));
        world.add_planet(Planet::new(PlanetId(4), Vec2::new(200.0, 0.0), Owner::Neutral, 20));

        let mut ai = AiPlayer::new(Owner::Ai, AiConfig::default()).unwrap();
        let mut opponent = AiPlayer::new(Owner::Player, AiConfig::default()).unwrap();

        ai.tick(&mut world);
        // The opponent's engines have seen nothing
        assert_eq!(opponent.analysis().recompute_count(), 0);
        assert_eq!(opponent.selector().metrics().decisions, 0);

        opponent.tick(&mut world);
        assert_eq!(opponent.selector().metrics().decisions, 1);
        assert_eq!(ai.selector().metrics().decisions, 1);
    }
}

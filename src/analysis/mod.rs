//! Analysis engine: raw world state in, situation snapshot out
//!
//! The snapshot is memoized against world time so several pipeline stages in
//! the same tick share one assessment instead of rescanning the world.

pub mod opportunities;
pub mod situation;
pub mod snapshot;
pub mod threats;

use std::sync::Arc;

use crate::core::config::AiConfig;
use crate::core::types::{DecisionKind, GameTime, Owner, Priority};
use crate::world::{Planet, WorldView};

use snapshot::{
    FleetAnalysis, GamePhase, OpportunityKind, OwnerStats, PlanetAnalysis, Recommendation,
    Snapshot, Standing,
};

/// Produces and caches situation snapshots for one agent.
///
/// Each agent instance owns its own engine; snapshots are never shared across
/// agents.
pub struct AnalysisEngine {
    side: Owner,
    config: AiConfig,
    cache: Option<(GameTime, Arc<Snapshot>)>,
    recomputes: u64,
}

impl AnalysisEngine {
    pub fn new(side: Owner, config: AiConfig) -> Self {
        Self {
            side,
            config,
            cache: None,
            recomputes: 0,
        }
    }

    /// Analyze the world, reusing the previous snapshot while it is fresh.
    ///
    /// A cache hit returns the identical `Arc` without recomputation.
    pub fn analyze(&mut self, world: &impl WorldView) -> Arc<Snapshot> {
        let now = world.time();
        if let Some((created_at, cached)) = &self.cache {
            if now - created_at < self.config.analysis_cache_ttl {
                return Arc::clone(cached);
            }
        }

        self.recomputes += 1;
        let snapshot = Arc::new(self.compute(world, now));
        self.cache = Some((now, Arc::clone(&snapshot)));
        snapshot
    }

    /// How many times a snapshot was actually computed (cache misses)
    pub fn recompute_count(&self) -> u64 {
        self.recomputes
    }

    pub fn invalidate(&mut self) {
        self.cache = None;
    }

    fn compute(&self, world: &impl WorldView, now: GameTime) -> Snapshot {
        let planets = PlanetAnalysis {
            own: self.owner_stats(world.planets_owned_by(self.side)),
            enemy: self.owner_stats(world.planets_owned_by(self.side.opponent())),
            neutral: self.owner_stats(world.planets_owned_by(Owner::Neutral)),
        };

        let fleets = self.fleet_stats(world);
        let threats = threats::detect_threats(world, self.side, &self.config);
        let threat_level = threats::threat_level(&threats);
        let opportunities = opportunities::detect_opportunities(world, self.side, &self.config);
        let situation = situation::assess(&planets, &fleets, threat_level);
        let recommendations = derive_recommendations(&situation, &opportunities, &planets);

        tracing::debug!(
            threats = threats.len(),
            opportunities = opportunities.len(),
            threat_level,
            position = ?situation.position,
            "situation analyzed"
        );

        Snapshot {
            created_at: now,
            planets,
            fleets,
            threats,
            opportunities,
            situation,
            recommendations,
        }
    }

    fn owner_stats(&self, planets: Vec<&Planet>) -> OwnerStats {
        let count = planets.len();
        let total_garrison: u32 = planets.iter().map(|p| p.garrison).sum();
        let total_production: f32 = planets.iter().map(|p| p.production).sum();
        let spare_garrison: u32 = planets
            .iter()
            .map(|p| p.garrison.saturating_sub(self.config.min_ships_to_defend))
            .sum();

        let stronghold_floor = self.config.min_ships_to_attack * 2;
        let strongholds = planets
            .iter()
            .filter(|p| p.garrison > stronghold_floor)
            .map(|p| p.id)
            .collect();
        let vulnerable = planets
            .iter()
            .filter(|p| p.garrison < self.config.min_ships_to_defend)
            .map(|p| p.id)
            .collect();

        OwnerStats {
            count,
            total_garrison,
            average_garrison: if count == 0 {
                0.0
            } else {
                total_garrison as f32 / count as f32
            },
            total_production,
            spare_garrison,
            strongholds,
            vulnerable,
        }
    }

    fn fleet_stats(&self, world: &impl WorldView) -> FleetAnalysis {
        let enemy = self.side.opponent();
        let own_targets: Vec<_> = world
            .planets_owned_by(self.side)
            .iter()
            .map(|p| p.id)
            .collect();

        let mut stats = FleetAnalysis::default();
        for fleet in world.fleets() {
            if fleet.arrived {
                continue;
            }
            if fleet.owner == self.side {
                stats.own_fleets += 1;
                stats.own_ships += fleet.ships;
            } else if fleet.owner == enemy {
                stats.enemy_fleets += 1;
                stats.enemy_ships += fleet.ships;
                if own_targets.contains(&fleet.target) {
                    stats.inbound_attacks += 1;
                }
            }
        }
        stats
    }
}

/// Simple rule matches over the assessed situation, in fixed order.
fn derive_recommendations(
    situation: &snapshot::StrategicSituation,
    opportunities: &[snapshot::Opportunity],
    planets: &PlanetAnalysis,
) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();
    let has = |kind: OpportunityKind| opportunities.iter().any(|o| o.kind == kind);

    if situation.threat_level > 0.7 {
        recommendations.push(Recommendation {
            kind: DecisionKind::Defend,
            priority: Priority::High,
            reason: "threat pressure is critical".to_string(),
        });
    }
    if situation.phase == GamePhase::Early && has(OpportunityKind::Expansion) {
        recommendations.push(Recommendation {
            kind: DecisionKind::Expand,
            priority: Priority::Medium,
            reason: "neutral planets remain uncontested".to_string(),
        });
    }
    if situation.position == Standing::Dominant && has(OpportunityKind::Attack) {
        recommendations.push(Recommendation {
            kind: DecisionKind::Attack,
            priority: Priority::Medium,
            reason: "enemy is overmatched".to_string(),
        });
    }
    if !planets.own.vulnerable.is_empty() {
        recommendations.push(Recommendation {
            kind: DecisionKind::Reinforce,
            priority: Priority::Low,
            reason: "own planets below defend strength".to_string(),
        });
    }

    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{PlanetId, Vec2};
    use crate::world::sim::GameWorld;
    use crate::world::FleetDispatch;

    fn create_test_world() -> GameWorld {
        let mut world = GameWorld::new();
        world.add_planet(Planet::new(PlanetId(1), Vec2::new(0.0, 0.0), Owner::Ai, 50));
        world.add_planet(Planet::new(PlanetId(2), Vec2::new(100.0, 0.0), Owner::Neutral, 20));
        world.add_planet(Planet::new(PlanetId(3), Vec2::new(400.0, 0.0), Owner::Player, 60));
        world
    }

    #[test]
    fn test_snapshot_cached_within_ttl() {
        let world = create_test_world();
        let mut engine = AnalysisEngine::new(Owner::Ai, AiConfig::default());

        let first = engine.analyze(&world);
        let second = engine.analyze(&world);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(engine.recompute_count(), 1);
    }

    #[test]
    fn test_snapshot_recomputed_after_ttl() {
        let mut world = create_test_world();
        let mut engine = AnalysisEngine::new(Owner::Ai, AiConfig::default());

        let first = engine.analyze(&world);
        world.step(1.5); // past the 1.0s snapshot TTL
        let second = engine.analyze(&world);
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(engine.recompute_count(), 2);
    }

    #[test]
    fn test_owner_stats_classification() {
        let mut world = create_test_world();
        world.add_planet(Planet::new(PlanetId(4), Vec2::new(50.0, 50.0), Owner::Ai, 3));
        let mut engine = AnalysisEngine::new(Owner::Ai, AiConfig::default());
        let snapshot = engine.analyze(&world);

        let own = &snapshot.planets.own;
        assert_eq!(own.count, 2);
        assert_eq!(own.total_garrison, 53);
        // 50 > 2 * min_ships_to_attack (20): stronghold
        assert_eq!(own.strongholds, vec![PlanetId(1)]);
        // 3 < min_ships_to_defend (5): vulnerable
        assert_eq!(own.vulnerable, vec![PlanetId(4)]);
        assert_eq!(own.spare_garrison, 45);
    }

    #[test]
    fn test_recommendation_rules() {
        let world = create_test_world();
        let mut engine = AnalysisEngine::new(Owner::Ai, AiConfig::default());
        let snapshot = engine.analyze(&world);

        // Early phase with an expansion opportunity present
        assert!(snapshot
            .recommendations
            .iter()
            .any(|r| r.kind == DecisionKind::Expand));
        // No threats in this layout
        assert!(snapshot
            .recommendations
            .iter()
            .all(|r| r.kind != DecisionKind::Defend));
    }

    #[test]
    fn test_fleet_stats_inbound_attacks() {
        let mut world = create_test_world();
        world.planet_mut(PlanetId(3)).unwrap().position = Vec2::new(200.0, 0.0);
        world.send_fleet(PlanetId(3), PlanetId(1), 0.5).unwrap();
        let mut engine = AnalysisEngine::new(Owner::Ai, AiConfig::default());
        let snapshot = engine.analyze(&world);

        assert_eq!(snapshot.fleets.enemy_fleets, 1);
        assert_eq!(snapshot.fleets.enemy_ships, 30);
        assert_eq!(snapshot.fleets.inbound_attacks, 1);
        assert_eq!(snapshot.fleets.own_fleets, 0);
    }
}

//! Targeting optimizer: ranked target and attacker selection
//!
//! Both the decision selector (through opportunity data) and the strategy
//! executor (directly) lean on these rankings, so results are memoized for a
//! short window keyed by request signature.

pub mod attack;
pub mod attackers;
pub mod expansion;
pub mod routes;

use std::sync::Arc;

use ahash::AHashMap;

use crate::core::config::AiConfig;
use crate::core::types::{GameTime, Owner, PlanetId};
use crate::world::WorldView;

pub use attack::{success_probability, AttackTarget};
pub use attackers::AttackerPick;
pub use expansion::ExpansionTarget;
pub use routes::{ArrivalPlan, AttackTiming, Route};

struct Cached<T> {
    value: Arc<Vec<T>>,
    expires_at: GameTime,
}

/// Request-signature keyed cache with a fixed time-to-live.
struct QueryCache<K, T> {
    entries: AHashMap<K, Cached<T>>,
    ttl: f64,
}

impl<K: std::hash::Hash + Eq, T> QueryCache<K, T> {
    fn new(ttl: f64) -> Self {
        Self {
            entries: AHashMap::new(),
            ttl,
        }
    }

    fn get(&mut self, key: &K, now: GameTime) -> Option<Arc<Vec<T>>> {
        // Expired entries are dropped rather than served
        self.entries.retain(|_, cached| cached.expires_at > now);
        self.entries.get(key).map(|cached| Arc::clone(&cached.value))
    }

    fn insert(&mut self, key: K, value: Arc<Vec<T>>, now: GameTime) {
        self.entries.insert(
            key,
            Cached {
                value,
                expires_at: now + self.ttl,
            },
        );
    }
}

/// Ranks targets and attacker combinations for one agent.
///
/// Owns its caches; never shared between agent instances.
pub struct TargetingOptimizer {
    side: Owner,
    config: AiConfig,
    expansion_cache: QueryCache<(usize, usize), ExpansionTarget>,
    attack_cache: QueryCache<(usize, usize), AttackTarget>,
    attacker_cache: QueryCache<(PlanetId, usize, usize), AttackerPick>,
    recomputes: u64,
}

impl TargetingOptimizer {
    pub fn new(side: Owner, config: AiConfig) -> Self {
        let ttl = config.targeting_cache_ttl;
        Self {
            side,
            config,
            expansion_cache: QueryCache::new(ttl),
            attack_cache: QueryCache::new(ttl),
            attacker_cache: QueryCache::new(ttl),
            recomputes: 0,
        }
    }

    /// Best neutral planets to claim, at most `count`.
    pub fn expansion_targets(
        &mut self,
        world: &impl WorldView,
        count: usize,
    ) -> Arc<Vec<ExpansionTarget>> {
        let now = world.time();
        let pool = world.planets_owned_by(Owner::Neutral).len();
        let key = (count, pool);
        if let Some(cached) = self.expansion_cache.get(&key, now) {
            return cached;
        }

        self.recomputes += 1;
        let mut ranked = expansion::score_expansion_targets(world, self.side, &self.config);
        ranked.truncate(count);
        let ranked = Arc::new(ranked);
        self.expansion_cache.insert(key, Arc::clone(&ranked), now);
        ranked
    }

    /// Best enemy planets to assault, at most `count`.
    pub fn attack_targets(
        &mut self,
        world: &impl WorldView,
        count: usize,
    ) -> Arc<Vec<AttackTarget>> {
        let now = world.time();
        let pool = world.planets_owned_by(self.side.opponent()).len();
        let key = (count, pool);
        if let Some(cached) = self.attack_cache.get(&key, now) {
            return cached;
        }

        self.recomputes += 1;
        let mut ranked = attack::score_attack_targets(world, self.side, &self.config);
        ranked.truncate(count);
        let ranked = Arc::new(ranked);
        self.attack_cache.insert(key, Arc::clone(&ranked), now);
        ranked
    }

    /// Greedy attacker combination against `target`, at most `count` planets.
    pub fn attackers_for(
        &mut self,
        world: &impl WorldView,
        target: PlanetId,
        count: usize,
    ) -> Arc<Vec<AttackerPick>> {
        let now = world.time();
        let pool = world.planets_owned_by(self.side).len();
        let key = (target, count, pool);
        if let Some(cached) = self.attacker_cache.get(&key, now) {
            return cached;
        }

        self.recomputes += 1;
        let picks = Arc::new(attackers::select_attackers(
            world,
            self.side,
            target,
            count,
            &self.config,
        ));
        self.attacker_cache.insert(key, Arc::clone(&picks), now);
        picks
    }

    /// Direct-route timing for a chosen attacker set. Not memoized; route
    /// geometry is cheap next to the scoring scans.
    pub fn plan_routes(
        &self,
        world: &impl WorldView,
        attackers: &[PlanetId],
        target: PlanetId,
    ) -> AttackTiming {
        routes::plan_routes(world, self.side, attackers, target, &self.config)
    }

    /// How many ranked lists were actually computed (cache misses)
    pub fn recompute_count(&self) -> u64 {
        self.recomputes
    }
}

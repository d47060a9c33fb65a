//! Agent configuration with documented constants
//!
//! All tuning values for the decision pipeline are collected here with
//! explanations of their purpose. They have been balanced against each other;
//! changing one in isolation will change observable agent behavior.

use serde::{Deserialize, Serialize};

/// Configuration for one AI agent instance
///
/// Behavioral weights live in [0, 1]; thresholds and radii are in world units
/// (garrison ships, map distance, simulation seconds).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    // === PERSONALITY ===
    /// How strongly the agent favors offensive options
    ///
    /// Above 0.7 the agent will consider aggressive expansion; above
    /// `multi_action_threshold` it will bundle secondary actions into one
    /// decision.
    pub aggressiveness: f32,

    /// How strongly the agent favors claiming neutral planets
    pub expansion_priority: f32,

    /// Appetite for risky commitments
    ///
    /// Lower values bias the agent toward defensive options.
    pub risk_tolerance: f32,

    /// Willingness to sit on garrisons and reinforce instead of acting
    pub patience: f32,

    /// Aggressiveness level above which a decision may carry up to two
    /// secondary actions
    pub multi_action_threshold: f32,

    // === FORCE THRESHOLDS ===
    /// Minimum garrison before a planet is considered as an attacker
    ///
    /// Planets above twice this count as strongholds.
    pub min_ships_to_attack: u32,

    /// Garrison below which a planet is considered vulnerable
    pub min_ships_to_defend: u32,

    // === SELECTION CAPS ===
    /// Maximum targets returned per targeting query
    pub max_targets: usize,

    /// Maximum attackers committed against a single target
    pub max_attackers: usize,

    // === COMMITMENT FRACTIONS ===
    /// Fraction of an attacker's garrison sent in an attack
    pub attack_percentage: f32,

    /// Fraction of a defender's garrison sent to a threatened planet
    pub defend_percentage: f32,

    /// Fraction of a reinforcer's garrison sent to a weak planet
    pub reinforce_percentage: f32,

    /// Fraction of garrison sent when claiming a neutral planet
    ///
    /// Expansion only dispatches when the resulting fleet is at least 1.2x
    /// the target garrison, so this fraction interacts directly with
    /// `min_ships_to_attack`.
    pub expand_percentage: f32,

    /// Required attacker:defender strength ratio before an attack is
    /// considered viable
    pub strength_ratio_attack: f32,

    // === GEOMETRY ===
    /// Radius within which an enemy planet counts as a standing threat
    pub threat_radius: f32,

    /// Maximum distance from an owned planet to a neutral expansion target
    pub expansion_range: f32,

    /// Maximum distance over which one planet can reinforce another
    pub reinforce_range: f32,

    /// Radius within which owned planets contribute strength to an attack
    pub attack_support_radius: f32,

    /// Fleet travel speed in world units per second
    ///
    /// Only used to estimate arrival times; actual movement belongs to the
    /// host simulation.
    pub fleet_speed: f32,

    /// Arrival-time spread (seconds) below which a multi-attacker strike is
    /// recommended as simultaneous rather than staggered
    pub stagger_spread: f64,

    // === CACHING & HISTORY ===
    /// Seconds a situation snapshot stays valid
    pub analysis_cache_ttl: f64,

    /// Seconds a ranked target list stays valid
    pub targeting_cache_ttl: f64,

    /// Retained decision count (oldest evicted first)
    pub decision_history_cap: usize,

    /// Retained strategy record count (oldest evicted first)
    pub strategy_history_cap: usize,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            // Personality (neutral baseline, expansion-leaning)
            aggressiveness: 0.5,
            expansion_priority: 0.7,
            risk_tolerance: 0.5,
            patience: 0.5,
            multi_action_threshold: 0.8,

            // Force thresholds
            min_ships_to_attack: 10,
            min_ships_to_defend: 5,

            // Selection caps
            max_targets: 3,
            max_attackers: 3,

            // Commitment fractions
            attack_percentage: 0.7,
            defend_percentage: 0.3,
            reinforce_percentage: 0.4,
            expand_percentage: 0.5,
            strength_ratio_attack: 1.5,

            // Geometry
            threat_radius: 150.0,
            expansion_range: 200.0,
            reinforce_range: 150.0,
            attack_support_radius: 180.0,
            fleet_speed: 20.0,
            stagger_spread: 2.0,

            // Caching & history
            analysis_cache_ttl: 1.0,
            targeting_cache_ttl: 2.0,
            decision_history_cap: 30,
            strategy_history_cap: 50,
        }
    }
}

impl AiConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("aggressiveness", self.aggressiveness),
            ("expansion_priority", self.expansion_priority),
            ("risk_tolerance", self.risk_tolerance),
            ("patience", self.patience),
            ("multi_action_threshold", self.multi_action_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{} ({}) must be within [0, 1]", name, value));
            }
        }

        for (name, value) in [
            ("attack_percentage", self.attack_percentage),
            ("defend_percentage", self.defend_percentage),
            ("reinforce_percentage", self.reinforce_percentage),
            ("expand_percentage", self.expand_percentage),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{} ({}) must be within [0, 1]", name, value));
            }
        }

        if self.strength_ratio_attack < 1.0 {
            return Err(format!(
                "strength_ratio_attack ({}) must be >= 1.0",
                self.strength_ratio_attack
            ));
        }

        if self.max_targets == 0 || self.max_attackers == 0 {
            return Err("max_targets and max_attackers must be at least 1".to_string());
        }

        if self.fleet_speed <= 0.0 {
            return Err(format!("fleet_speed ({}) must be positive", self.fleet_speed));
        }

        if self.analysis_cache_ttl <= 0.0 || self.targeting_cache_ttl <= 0.0 {
            return Err("cache TTLs must be positive".to_string());
        }

        if self.decision_history_cap == 0 || self.strategy_history_cap == 0 {
            return Err("history capacities must be at least 1".to_string());
        }

        Ok(())
    }

    /// Apply overrides from a TOML document
    ///
    /// Unknown keys are ignored; recognized keys replace the current value.
    /// Expected layout:
    ///
    /// ```toml
    /// [personality]
    /// aggressiveness = 0.8
    ///
    /// [forces]
    /// min_ships_to_attack = 15
    /// attack_percentage = 0.6
    /// ```
    pub fn apply_toml(&mut self, content: &str) -> Result<(), String> {
        let toml: toml::Value = content
            .parse()
            .map_err(|e| format!("Invalid TOML: {}", e))?;

        if let Some(table) = toml.get("personality").and_then(|v| v.as_table()) {
            for (key, slot) in [
                ("aggressiveness", &mut self.aggressiveness),
                ("expansion_priority", &mut self.expansion_priority),
                ("risk_tolerance", &mut self.risk_tolerance),
                ("patience", &mut self.patience),
                ("multi_action_threshold", &mut self.multi_action_threshold),
            ] {
                if let Some(value) = table.get(key).and_then(|v| v.as_float()) {
                    *slot = value as f32;
                }
            }
        }

        if let Some(table) = toml.get("forces").and_then(|v| v.as_table()) {
            if let Some(value) = table.get("min_ships_to_attack").and_then(|v| v.as_integer()) {
                self.min_ships_to_attack = value.max(0) as u32;
            }
            if let Some(value) = table.get("min_ships_to_defend").and_then(|v| v.as_integer()) {
                self.min_ships_to_defend = value.max(0) as u32;
            }
            if let Some(value) = table.get("max_targets").and_then(|v| v.as_integer()) {
                self.max_targets = value.max(1) as usize;
            }
            if let Some(value) = table.get("max_attackers").and_then(|v| v.as_integer()) {
                self.max_attackers = value.max(1) as usize;
            }
            for (key, slot) in [
                ("attack_percentage", &mut self.attack_percentage),
                ("defend_percentage", &mut self.defend_percentage),
                ("reinforce_percentage", &mut self.reinforce_percentage),
                ("expand_percentage", &mut self.expand_percentage),
                ("strength_ratio_attack", &mut self.strength_ratio_attack),
            ] {
                if let Some(value) = table.get(key).and_then(|v| v.as_float()) {
                    *slot = value as f32;
                }
            }
        }

        if let Some(table) = toml.get("geometry").and_then(|v| v.as_table()) {
            for (key, slot) in [
                ("threat_radius", &mut self.threat_radius),
                ("expansion_range", &mut self.expansion_range),
                ("reinforce_range", &mut self.reinforce_range),
                ("attack_support_radius", &mut self.attack_support_radius),
                ("fleet_speed", &mut self.fleet_speed),
            ] {
                if let Some(value) = table.get(key).and_then(|v| v.as_float()) {
                    *slot = value as f32;
                }
            }
        }

        self.validate()
    }

    /// Parse a config from a TOML document, starting from defaults
    pub fn from_toml_str(content: &str) -> Result<Self, String> {
        let mut config = Self::default();
        config.apply_toml(content)?;
        Ok(config)
    }
}

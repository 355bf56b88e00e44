//! Tunable parameters for the simulation.
//!
//! Every constant the simulation uses lives in one of the config groups below.
//! `Default` carries the canonical tuning; any subset of fields can be
//! overridden from JSON (missing fields fall back to the defaults).
//!
//! # Example
//!
//! ```
//! use safezone_core::config::SimulationConfig;
//!
//! let config = SimulationConfig::from_json_str(
//!     r#"{ "arena": { "safe_zone_radius": 60.0 }, "population": { "max_bots": 6 } }"#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.arena.safe_zone_radius, 60.0);
//! assert_eq!(config.arena.safety_threshold, 40.0);
//! assert_eq!(config.population.max_bots, 6);
//! ```

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// =============================================================================
// Physics
// =============================================================================

/// Rigid-body tuning shared by every ship.
///
/// Drag uses a single linear model: each tick the velocity is scaled by
/// `1 - drag_coefficient * dt`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Acceleration while thrusting (units/s²).
    pub normal_thrust: f32,
    /// Acceleration while thrusting with boost active (units/s²).
    pub boost_thrust: f32,
    /// Linear drag coefficient (1/s).
    pub drag_coefficient: f32,
    /// Seconds before boost can be activated again. Boost stays active for
    /// the whole cooldown.
    pub boost_cooldown: f32,
    /// Collision sphere radius of a ship.
    pub ship_radius: f32,
    /// Coefficient of restitution for ship-ship collisions.
    pub restitution: f32,
    /// Minimum seconds between two resolved collisions of the same pair.
    pub collision_debounce: f32,
    /// Duration of the camera shake window after a collision (seconds).
    pub shake_duration: f32,
    /// Peak camera shake amplitude.
    pub shake_amplitude: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            normal_thrust: 12.0,
            boost_thrust: 40.0,
            drag_coefficient: 0.3,
            boost_cooldown: 2.0,
            ship_radius: 2.0,
            restitution: 0.8,
            collision_debounce: 0.1,
            shake_duration: 0.3,
            shake_amplitude: 0.5,
        }
    }
}

// =============================================================================
// Arena
// =============================================================================

/// Geometry of the spherical arena centred at the world origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Ships farther than this from the origin are eliminated.
    pub safe_zone_radius: f32,
    /// Inner danger radius; bots beyond it abandon their target and head home.
    pub safety_threshold: f32,
    /// Half edge length of the cube ships spawn in.
    pub spawn_extent: f32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            safe_zone_radius: 50.0,
            safety_threshold: 40.0,
            spawn_extent: 20.0,
        }
    }
}

// =============================================================================
// Behavior
// =============================================================================

/// Which bot policy new bots are created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    /// Chase the nearest ship (`Attack`), or hold the centre when alone.
    #[default]
    Pursuit,
    /// Circle the centre at constant speed, alternating moving and stopped phases.
    Orbit,
}

/// Tuning for the smooth-orbit bot policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitConfig {
    /// Cruise speed while moving (units/s).
    pub move_speed: f32,
    /// Length of a moving phase (seconds).
    pub move_phase: f32,
    /// Length of a stopped phase (seconds).
    pub stop_phase: f32,
    /// Fraction of the heading error corrected per tick.
    pub direction_adjustment_rate: f32,
    /// Velocity multiplier applied every tick while stopped.
    pub stop_damping: f32,
    /// Radians per tick the hull turns to face its velocity.
    pub facing_step: f32,
    /// A ship closer than this pulls the orbiting bot off its circle.
    pub ram_radius: f32,
    /// Orbit radius used when a bot spawns exactly at the centre.
    pub default_radius: f32,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            move_speed: 4.0,
            move_phase: 3.0,
            stop_phase: 3.0,
            direction_adjustment_rate: 0.10,
            stop_damping: 0.95,
            facing_step: 0.1,
            ram_radius: 8.0,
            default_radius: 40.0,
        }
    }
}

/// Tuning for bot decision making and steering.
///
/// Angles are in radians.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Policy given to newly spawned bots.
    pub policy: PolicyKind,
    /// Seconds between state re-evaluations.
    pub state_update_interval: f32,
    /// A bot avoiding the boundary keeps doing so until it is back inside this radius.
    pub recovery_radius: f32,
    /// Maximum hull turn rate (rad/s).
    pub turn_rate: f32,
    /// Thrust only while the target is inside this cone.
    pub thrust_cone: f32,
    /// Thrust cone used while heading home from the danger zone.
    pub avoid_thrust_cone: f32,
    /// Boost only while the target is inside this cone.
    pub boost_cone: f32,
    /// Attackers only boost when the target is farther than this.
    pub boost_distance: f32,
    /// Half width of the random offset added to an acquired target.
    pub target_jitter: f32,
    /// Seconds of target velocity used to predict where to aim.
    pub lead_time: f32,
    /// A lone bot drifts freely inside this radius of the centre.
    pub stay_center_radius: f32,
    /// Bots stop thrusting above this speed (u/s).
    pub max_speed: f32,
    /// Seconds of outward drift added to a bot's distance when checking the
    /// danger zone.
    pub danger_lookahead: f32,
    /// Orbit policy tuning.
    pub orbit: OrbitConfig,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            policy: PolicyKind::Pursuit,
            state_update_interval: 0.5,
            recovery_radius: 30.0,
            turn_rate: 3.0,
            thrust_cone: 60f32.to_radians(),
            avoid_thrust_cone: 90f32.to_radians(),
            boost_cone: 45f32.to_radians(),
            boost_distance: 15.0,
            target_jitter: 2.0,
            lead_time: 0.5,
            stay_center_radius: 10.0,
            max_speed: 15.0,
            danger_lookahead: 1.5,
            orbit: OrbitConfig::default(),
        }
    }
}

// =============================================================================
// Population & controls
// =============================================================================

/// Bot population bounds and rebalancing cadence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    /// Rebalancing never leaves fewer bots than this.
    pub min_bots: usize,
    /// Rebalancing never leaves more bots than this.
    pub max_bots: usize,
    /// Seconds between rebalancing passes.
    pub rebalance_interval: f32,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            min_bots: 2,
            max_bots: 4,
            rebalance_interval: 300.0,
        }
    }
}

/// Player control mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Pitch/yaw rate at full stick deflection (rad/s).
    pub rotation_rate: f32,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self { rotation_rate: 3.0 }
    }
}

// =============================================================================
// SimulationConfig
// =============================================================================

/// Complete simulation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Fixed simulation timestep (seconds).
    pub tick: f32,
    /// Frame deltas are clamped to this before accumulation (seconds).
    pub max_frame_delta: f32,
    /// Maximum fixed ticks run for a single frame.
    pub max_substeps: u32,
    /// Length of a round (seconds).
    pub round_duration: f32,
    /// Rigid-body tuning.
    pub physics: PhysicsConfig,
    /// Arena geometry.
    pub arena: ArenaConfig,
    /// Bot behavior tuning.
    pub behavior: BehaviorConfig,
    /// Bot population bounds.
    pub population: PopulationConfig,
    /// Player control mapping.
    pub controls: ControlConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick: 1.0 / 60.0,
            max_frame_delta: 0.1,
            max_substeps: 8,
            round_duration: 120.0,
            physics: PhysicsConfig::default(),
            arena: ArenaConfig::default(),
            behavior: BehaviorConfig::default(),
            population: PopulationConfig::default(),
            controls: ControlConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Parses a JSON document and validates the result.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::Invalid`] when a value fails [`validate`](Self::validate).
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the configuration as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if serialization fails.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError::Invalid`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("tick", self.tick)?;
        positive("max_frame_delta", self.max_frame_delta)?;
        positive("round_duration", self.round_duration)?;
        if self.max_substeps == 0 {
            return Err(ConfigError::invalid("max_substeps", "must be at least 1"));
        }

        let physics = &self.physics;
        positive("physics.normal_thrust", physics.normal_thrust)?;
        positive("physics.boost_thrust", physics.boost_thrust)?;
        non_negative("physics.drag_coefficient", physics.drag_coefficient)?;
        positive("physics.boost_cooldown", physics.boost_cooldown)?;
        positive("physics.ship_radius", physics.ship_radius)?;
        non_negative("physics.collision_debounce", physics.collision_debounce)?;
        positive("physics.shake_duration", physics.shake_duration)?;
        non_negative("physics.shake_amplitude", physics.shake_amplitude)?;
        if !(0.0..=1.0).contains(&physics.restitution) {
            return Err(ConfigError::invalid(
                "physics.restitution",
                format!("{} is outside [0, 1]", physics.restitution),
            ));
        }
        if physics.drag_coefficient * self.tick >= 1.0 {
            return Err(ConfigError::invalid(
                "physics.drag_coefficient",
                "drag would reverse velocity within a single tick",
            ));
        }

        let arena = &self.arena;
        positive("arena.safe_zone_radius", arena.safe_zone_radius)?;
        positive("arena.safety_threshold", arena.safety_threshold)?;
        non_negative("arena.spawn_extent", arena.spawn_extent)?;
        if arena.safety_threshold >= arena.safe_zone_radius {
            return Err(ConfigError::invalid(
                "arena.safety_threshold",
                format!(
                    "{} must be smaller than the safe zone radius {}",
                    arena.safety_threshold, arena.safe_zone_radius
                ),
            ));
        }

        let behavior = &self.behavior;
        positive("behavior.state_update_interval", behavior.state_update_interval)?;
        non_negative("behavior.recovery_radius", behavior.recovery_radius)?;
        positive("behavior.turn_rate", behavior.turn_rate)?;
        cone("behavior.thrust_cone", behavior.thrust_cone)?;
        cone("behavior.avoid_thrust_cone", behavior.avoid_thrust_cone)?;
        cone("behavior.boost_cone", behavior.boost_cone)?;
        non_negative("behavior.boost_distance", behavior.boost_distance)?;
        non_negative("behavior.target_jitter", behavior.target_jitter)?;
        non_negative("behavior.lead_time", behavior.lead_time)?;
        non_negative("behavior.stay_center_radius", behavior.stay_center_radius)?;
        positive("behavior.max_speed", behavior.max_speed)?;
        non_negative("behavior.danger_lookahead", behavior.danger_lookahead)?;
        if behavior.recovery_radius > arena.safety_threshold {
            return Err(ConfigError::invalid(
                "behavior.recovery_radius",
                "must not exceed the arena safety threshold",
            ));
        }

        let orbit = &behavior.orbit;
        positive("behavior.orbit.move_speed", orbit.move_speed)?;
        positive("behavior.orbit.move_phase", orbit.move_phase)?;
        positive("behavior.orbit.stop_phase", orbit.stop_phase)?;
        non_negative("behavior.orbit.facing_step", orbit.facing_step)?;
        non_negative("behavior.orbit.ram_radius", orbit.ram_radius)?;
        positive("behavior.orbit.default_radius", orbit.default_radius)?;
        unit_interval(
            "behavior.orbit.direction_adjustment_rate",
            orbit.direction_adjustment_rate,
        )?;
        unit_interval("behavior.orbit.stop_damping", orbit.stop_damping)?;

        let population = &self.population;
        positive("population.rebalance_interval", population.rebalance_interval)?;
        if population.min_bots > population.max_bots {
            return Err(ConfigError::invalid(
                "population.min_bots",
                format!(
                    "{} exceeds max_bots {}",
                    population.min_bots, population.max_bots
                ),
            ));
        }

        non_negative("controls.rotation_rate", self.controls.rotation_rate)?;
        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{value} must be positive and finite")))
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{value} must be non-negative and finite")))
    }
}

fn unit_interval(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{value} is outside [0, 1]")))
    }
}

fn cone(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value <= PI {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{value} rad is outside (0, π]")))
    }
}

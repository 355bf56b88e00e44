//! Fixed-tick orchestrator.
//!
//! The `Simulation` owns every ship and advances them in a fixed order each
//! tick:
//!
//! 1. **INTENT**: apply [`PlayerInput`] to the player, run every bot's
//!    [`BehaviorController`] against a snapshot of all ships
//! 2. **INTEGRATE**: [`RigidBody::update`] for every ship, noting who left the
//!    safe zone
//! 3. **COLLIDE**: resolve every pair once, in id order
//! 4. **ELIMINATE**: remove the ships that left the safe zone
//! 5. **UPKEEP**: thruster effect changes, bot population rebalancing
//! 6. **REPORT**: `(player_in_bounds, active_bot_count)` plus events
//!
//! # Determinism
//!
//! Ships live in a `BTreeMap` keyed by [`ShipId`], so every phase visits them
//! in the same order. All gameplay randomness (spawn points, target jitter,
//! population changes) comes from one `ChaCha8Rng` seeded from the master
//! seed. Camera shake draws from a separate stream so rendering never perturbs
//! the simulation.
//!
//! # Example
//!
//! ```
//! use safezone_core::simulation::{PlayerInput, Simulation};
//!
//! let mut sim = Simulation::new(7);
//! let bots = sim.bot_count();
//! assert!((2..=4).contains(&bots));
//!
//! let reports = sim.advance(0.05, &PlayerInput::default());
//! assert_eq!(reports.len(), 3);
//! assert_eq!(sim.tick(), 3);
//! ```

use std::collections::BTreeMap;
use std::fmt;

use glam::{Quat, Vec3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::behavior::{BehaviorController, BehaviorState, Contact};
use crate::config::SimulationConfig;
use crate::entity::{Ship, ShipId, ShipKind, Transform, PLAYER_ID};
use crate::error::ConfigError;
use crate::events::{SimEvent, TickReport};
use crate::physics::RigidBody;

/// Mixed into the master seed for the cosmetic (camera shake) stream.
const COSMETIC_SEED_SALT: u64 = 0x5AFE_20E5_C0DE_0001;

// =============================================================================
// PlayerInput
// =============================================================================

/// One tick of player control.
///
/// Stick axes are clamped to `[-1, 1]`. Positive pitch raises the nose,
/// positive yaw turns left.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerInput {
    /// Nose up (+) / down (-).
    pub pitch: f32,
    /// Turn left (+) / right (-).
    pub yaw: f32,
    /// Engine on.
    pub thrust: bool,
    /// Boost button held. Boost fires on the press, not while held.
    pub boost: bool,
}

// =============================================================================
// SimulationState
// =============================================================================

/// Everything that changes from tick to tick.
#[derive(Debug, Default)]
pub struct SimulationState {
    ships: BTreeMap<ShipId, Ship>,
    elapsed: f64,
    tick: u64,
    next_id: u64,
    next_rebalance_at: f64,
    boost_held: bool,
    pending_events: Vec<SimEvent>,
}

impl SimulationState {
    /// All ships in id order.
    pub fn ships(&self) -> impl Iterator<Item = &Ship> {
        self.ships.values()
    }

    /// Looks up a ship.
    #[must_use]
    pub fn ship(&self, id: ShipId) -> Option<&Ship> {
        self.ships.get(&id)
    }

    /// Number of ships, player included.
    #[must_use]
    pub fn ship_count(&self) -> usize {
        self.ships.len()
    }

    /// Number of bots.
    #[must_use]
    pub fn bot_count(&self) -> usize {
        self.ships.values().filter(|ship| ship.is_bot()).count()
    }

    /// Simulation time in seconds.
    #[must_use]
    pub const fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Ticks run so far.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Simulation time of the next population rebalance.
    #[must_use]
    pub const fn next_rebalance_at(&self) -> f64 {
        self.next_rebalance_at
    }

    fn allocate_id(&mut self) -> ShipId {
        self.next_id += 1;
        ShipId::new(self.next_id)
    }
}

/// Read-only view of one ship, for rendering or logging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipSnapshot {
    /// The ship.
    pub id: ShipId,
    /// Player or bot.
    pub kind: ShipKind,
    /// Position.
    pub position: Vec3,
    /// Orientation.
    pub orientation: Quat,
    /// Velocity.
    pub velocity: Vec3,
    /// Engine on.
    pub thrusting: bool,
    /// Boost in effect.
    pub boosting: bool,
    /// Bot state; `None` for the player.
    pub state: Option<BehaviorState>,
}

impl From<&Ship> for ShipSnapshot {
    fn from(ship: &Ship) -> Self {
        Self {
            id: ship.id(),
            kind: ship.kind(),
            position: ship.transform().position,
            orientation: ship.transform().orientation,
            velocity: ship.body().velocity(),
            thrusting: ship.body().is_thrusting(),
            boosting: ship.body().is_boosting(),
            state: ship.behavior_state(),
        }
    }
}

// =============================================================================
// Simulation
// =============================================================================

/// The arena simulation.
pub struct Simulation {
    config: SimulationConfig,
    state: SimulationState,
    rng: ChaCha8Rng,
    cosmetic_rng: ChaCha8Rng,
    accumulator: f64,
    seed: u64,
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("seed", &self.seed)
            .field("tick", &self.state.tick)
            .field("ships", &format!("[{} ships]", self.state.ships.len()))
            .field("accumulator", &self.accumulator)
            .finish_non_exhaustive()
    }
}

impl Simulation {
    /// Creates a simulation with the default configuration.
    ///
    /// The arena starts populated: the player at a random point in the spawn
    /// cube and between `min_bots` and `max_bots` bots.
    ///
    /// # Example
    ///
    /// ```
    /// use safezone_core::simulation::Simulation;
    ///
    /// let sim = Simulation::new(12345);
    /// assert_eq!(sim.tick(), 0);
    /// assert_eq!(sim.seed(), 12345);
    /// assert!(sim.player().is_some());
    /// ```
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self::build(SimulationConfig::default(), seed)
    }

    /// Creates a simulation with a custom configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `config` fails validation.
    pub fn with_config(config: SimulationConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, seed))
    }

    fn build(config: SimulationConfig, seed: u64) -> Self {
        let mut sim = Self {
            config,
            state: SimulationState::default(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            cosmetic_rng: ChaCha8Rng::seed_from_u64(seed ^ COSMETIC_SEED_SALT),
            accumulator: 0.0,
            seed,
        };
        let population = &sim.config.population;
        let count = sim.rng.gen_range(population.min_bots..=population.max_bots);
        sim.repopulate(count);
        sim
    }

    /// Starts a new round: fresh player and `min_bots` fresh bots.
    ///
    /// The player is placed at a random point in the spawn cube with zero
    /// velocity. Only the first arena of a simulation gets a random bot count;
    /// later rounds start at the minimum and grow through rebalancing. The
    /// clock keeps running.
    pub fn reset(&mut self) {
        self.repopulate(self.config.population.min_bots);
    }

    fn repopulate(&mut self, count: usize) {
        self.state.ships.clear();
        self.state.pending_events.clear();
        self.state.boost_held = false;
        self.accumulator = 0.0;

        let position = self.random_spawn_point();
        let body = RigidBody::new(
            PLAYER_ID,
            &self.config.physics,
            self.config.arena.safe_zone_radius,
        );
        self.state
            .ships
            .insert(PLAYER_ID, Ship::new_player(Transform::at_position(position), body));

        for _ in 0..count {
            let position = self.random_spawn_point();
            self.spawn_bot_at(position);
        }

        self.state.next_rebalance_at =
            self.state.elapsed + f64::from(self.config.population.rebalance_interval);
        info!(seed = self.seed, bots = count, "arena reset");
    }

    /// Runs one fixed tick.
    pub fn step(&mut self, input: &PlayerInput) -> TickReport {
        let dt = self.config.tick;

        self.apply_player_input(input, dt);
        self.run_controllers(dt);
        let out_of_bounds = self.integrate(dt);

        self.state.tick += 1;
        self.state.elapsed += f64::from(dt);

        let collisions = self.resolve_collisions();
        let eliminated = self.eliminate(&out_of_bounds);
        self.update_thruster_effects();
        if self.state.elapsed >= self.state.next_rebalance_at {
            self.rebalance_population();
            self.state.next_rebalance_at =
                self.state.elapsed + f64::from(self.config.population.rebalance_interval);
        }

        let report = TickReport {
            tick: self.state.tick,
            elapsed: self.state.elapsed,
            player_in_bounds: self.player_in_bounds(),
            active_bot_count: self.state.bot_count(),
            collisions,
            eliminated,
            events: std::mem::take(&mut self.state.pending_events),
        };
        trace!(
            tick = report.tick,
            bots = report.active_bot_count,
            collisions = report.collisions,
            "tick complete"
        );
        report
    }

    /// Advances by a variable frame delta using fixed ticks.
    ///
    /// The frame delta is clamped to `max_frame_delta` (negative or NaN deltas
    /// count as zero) and accumulated. Whole ticks are run, at most
    /// `max_substeps` of them; the remainder carries into the next frame.
    pub fn advance(&mut self, frame_delta: f32, input: &PlayerInput) -> Vec<TickReport> {
        let frame_delta = if frame_delta.is_nan() {
            0.0
        } else {
            frame_delta.clamp(0.0, self.config.max_frame_delta)
        };
        self.accumulator += f64::from(frame_delta);

        let tick = f64::from(self.config.tick);
        let mut reports = Vec::new();
        // Tolerance keeps float noise from dropping a tick the frame paid for.
        while self.accumulator + 1e-6 >= tick && reports.len() < self.config.max_substeps as usize {
            reports.push(self.step(input));
            self.accumulator = (self.accumulator - tick).max(0.0);
        }
        self.accumulator = self
            .accumulator
            .min(f64::from(self.config.max_frame_delta));
        reports
    }

    /// Adds a bot at `position` and returns its id.
    ///
    /// The bot's policy may move it (an orbiting bot never starts at the
    /// centre). Reported as [`SimEvent::BotSpawned`] on the next tick.
    pub fn spawn_bot_at(&mut self, position: Vec3) -> ShipId {
        let id = self.state.allocate_id();
        let mut transform = Transform::at_position(position);
        let mut body = RigidBody::new(id, &self.config.physics, self.config.arena.safe_zone_radius);
        let mut controller = BehaviorController::new(
            id,
            &self.config.behavior,
            self.config.arena.safety_threshold,
        );
        controller.prepare_spawn(&mut transform, &mut body);

        debug!(bot = %id, x = transform.position.x, y = transform.position.y, z = transform.position.z, "bot spawned");
        self.state
            .ships
            .insert(id, Ship::new_bot(id, transform, body, controller));
        self.state.pending_events.push(SimEvent::BotSpawned { ship: id });
        id
    }

    /// Removes a bot. Returns `false` if `id` is not a bot in the arena.
    pub fn remove_bot(&mut self, id: ShipId) -> bool {
        match self.state.ships.get(&id) {
            Some(ship) if ship.is_bot() => {}
            _ => return false,
        }
        self.state.ships.remove(&id);
        self.state.pending_events.push(SimEvent::BotRemoved { ship: id });
        debug!(bot = %id, "bot removed");
        true
    }

    /// Camera shake offset for the player ship this frame.
    pub fn player_shake_offset(&mut self) -> Vec3 {
        match self.state.ships.get(&PLAYER_ID) {
            Some(player) => player.body().shake_offset(&mut self.cosmetic_rng),
            None => Vec3::ZERO,
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &SimulationState {
        &self.state
    }

    /// The configuration in use.
    #[must_use]
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Looks up a ship.
    #[must_use]
    pub fn ship(&self, id: ShipId) -> Option<&Ship> {
        self.state.ship(id)
    }

    /// Mutable access to a ship, for scripted setups.
    pub fn ship_mut(&mut self, id: ShipId) -> Option<&mut Ship> {
        self.state.ships.get_mut(&id)
    }

    /// The player ship, unless eliminated.
    #[must_use]
    pub fn player(&self) -> Option<&Ship> {
        self.state.ship(PLAYER_ID)
    }

    /// Ids of all bots, in order.
    #[must_use]
    pub fn bot_ids(&self) -> Vec<ShipId> {
        self.state
            .ships
            .values()
            .filter(|ship| ship.is_bot())
            .map(Ship::id)
            .collect()
    }

    /// Number of bots in the arena.
    #[must_use]
    pub fn bot_count(&self) -> usize {
        self.state.bot_count()
    }

    /// Master seed.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Ticks run so far.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.state.tick
    }

    /// Simulation time in seconds.
    #[must_use]
    pub const fn elapsed(&self) -> f64 {
        self.state.elapsed
    }

    /// Snapshot of every ship in id order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<ShipSnapshot> {
        self.state.ships.values().map(ShipSnapshot::from).collect()
    }

    // -------------------------------------------------------------------------
    // Phases
    // -------------------------------------------------------------------------

    fn apply_player_input(&mut self, input: &PlayerInput, dt: f32) {
        let rate = self.config.controls.rotation_rate * dt;
        let boost_pressed = input.boost && !self.state.boost_held;
        self.state.boost_held = input.boost;

        let Some(player) = self.state.ships.get_mut(&PLAYER_ID) else {
            return;
        };

        let yaw = clamp_axis(input.yaw);
        let pitch = clamp_axis(input.pitch);
        if yaw != 0.0 {
            player.transform.rotate_local(Vec3::Y, yaw * rate);
        }
        if pitch != 0.0 {
            player.transform.rotate_local(Vec3::X, pitch * rate);
        }

        if input.thrust {
            player.body.start_thrust();
        } else {
            player.body.stop_thrust();
        }
        if boost_pressed && player.body.try_boost() {
            debug!("player boost");
        }
    }

    fn run_controllers(&mut self, dt: f32) {
        let contacts: Vec<Contact> = self
            .state
            .ships
            .values()
            .map(|ship| Contact {
                id: ship.id(),
                position: ship.transform.position,
                velocity: ship.body.velocity(),
            })
            .collect();

        for ship in self.state.ships.values_mut() {
            if let Some(controller) = ship.controller.as_mut() {
                controller.update(&mut ship.transform, &mut ship.body, &contacts, &mut self.rng, dt);
            }
        }
    }

    fn integrate(&mut self, dt: f32) -> Vec<ShipId> {
        let mut out_of_bounds = Vec::new();
        for ship in self.state.ships.values_mut() {
            if !ship.body.update(&mut ship.transform, dt) {
                out_of_bounds.push(ship.id());
            }
        }
        out_of_bounds
    }

    fn resolve_collisions(&mut self) -> usize {
        let now = self.state.elapsed;
        let mut ships: Vec<&mut Ship> = self.state.ships.values_mut().collect();
        for ship in &mut ships {
            ship.body.prune_contacts(now);
        }
        let mut collided = Vec::new();

        for i in 0..ships.len() {
            let (head, tail) = ships.split_at_mut(i + 1);
            let a = &mut *head[i];
            for b in tail.iter_mut() {
                if a.body.check_collision(&mut a.transform, &mut b.body, &mut b.transform, now) {
                    trace!(a = %a.id(), b = %b.id(), "collision");
                    collided.push(SimEvent::Collision { a: a.id(), b: b.id() });
                }
            }
        }

        let count = collided.len();
        self.state.pending_events.extend(collided);
        count
    }

    fn eliminate(&mut self, out_of_bounds: &[ShipId]) -> Vec<ShipId> {
        let mut eliminated = Vec::with_capacity(out_of_bounds.len());
        for &id in out_of_bounds {
            let Some(ship) = self.state.ships.remove(&id) else {
                continue;
            };
            debug!(ship = %id, kind = %ship.kind(), "ship left the safe zone");
            self.state.pending_events.push(SimEvent::Explosion {
                ship: id,
                position: ship.transform().position,
            });
            self.state.pending_events.push(SimEvent::Eliminated {
                ship: id,
                kind: ship.kind(),
            });
            eliminated.push(id);
        }
        eliminated
    }

    fn update_thruster_effects(&mut self) {
        for ship in self.state.ships.values_mut() {
            let wanted = ship.body.is_thrusting().then_some(ship.body.is_boosting());
            if wanted == ship.thruster_effect {
                continue;
            }
            ship.thruster_effect = wanted;
            let event = match wanted {
                Some(boost) => SimEvent::ThrusterAttached {
                    ship: ship.id(),
                    boost,
                },
                None => SimEvent::ThrusterDetached { ship: ship.id() },
            };
            self.state.pending_events.push(event);
        }
    }

    fn rebalance_population(&mut self) {
        let count = self.state.bot_count();
        let min = self.config.population.min_bots;
        let max = self.config.population.max_bots;

        if count < min {
            self.spawn_random_bot();
        } else if count > max {
            self.remove_random_bot();
        } else {
            let grow = self.rng.gen_bool(0.5);
            if grow && count < max {
                self.spawn_random_bot();
            } else if count > min {
                self.remove_random_bot();
            }
        }
        info!(before = count, after = self.state.bot_count(), "population rebalanced");
    }

    fn spawn_random_bot(&mut self) {
        let position = self.random_spawn_point();
        self.spawn_bot_at(position);
    }

    fn remove_random_bot(&mut self) {
        let bots = self.bot_ids();
        if bots.is_empty() {
            return;
        }
        let index = self.rng.gen_range(0..bots.len());
        self.remove_bot(bots[index]);
    }

    fn random_spawn_point(&mut self) -> Vec3 {
        let extent = self.config.arena.spawn_extent;
        if extent <= 0.0 {
            return Vec3::ZERO;
        }
        Vec3::new(
            self.rng.gen_range(-extent..extent),
            self.rng.gen_range(-extent..extent),
            self.rng.gen_range(-extent..extent),
        )
    }

    fn player_in_bounds(&self) -> bool {
        self.state
            .ships
            .get(&PLAYER_ID)
            .is_some_and(|player| !player.body().is_out_of_bounds())
    }
}

fn clamp_axis(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(-1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PolicyKind;

    fn quiet_config() -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.population.min_bots = 0;
        config.population.max_bots = 0;
        config
    }

    mod creation_tests {
        use super::*;

        #[test]
        fn new_populates_arena() {
            let sim = Simulation::new(1);
            let player = sim.player().unwrap();
            assert_eq!(player.id(), PLAYER_ID);
            assert_eq!(player.body().velocity(), Vec3::ZERO);
            assert!(player.transform().position.abs().max_element() <= 20.0);
            assert!((2..=4).contains(&sim.bot_count()));
        }

        #[test]
        fn invalid_config_is_rejected() {
            let mut config = SimulationConfig::default();
            config.arena.safety_threshold = 60.0;
            assert!(Simulation::with_config(config, 1).is_err());
        }

        #[test]
        fn bot_ids_are_unique_and_ordered() {
            let mut sim = Simulation::with_config(quiet_config(), 1).unwrap();
            let a = sim.spawn_bot_at(Vec3::new(5.0, 0.0, 0.0));
            let b = sim.spawn_bot_at(Vec3::new(-5.0, 0.0, 0.0));
            assert!(a < b);
            assert_eq!(sim.bot_ids(), vec![a, b]);
            assert!(sim.remove_bot(a));
            assert!(!sim.remove_bot(a));
            assert!(!sim.remove_bot(PLAYER_ID));
            let c = sim.spawn_bot_at(Vec3::ZERO);
            assert!(c > b);
        }
    }

    mod step_tests {
        use super::*;

        #[test]
        fn step_advances_clock() {
            let mut sim = Simulation::new(1);
            let report = sim.step(&PlayerInput::default());
            assert_eq!(report.tick, 1);
            assert!((report.elapsed - 1.0 / 60.0).abs() < 1e-6);
            assert_eq!(sim.tick(), 1);
        }

        #[test]
        fn initial_spawns_reported_on_first_tick() {
            let mut sim = Simulation::new(9);
            let bots = sim.bot_count();
            let report = sim.step(&PlayerInput::default());
            let spawned = report
                .events
                .iter()
                .filter(|e| matches!(e, SimEvent::BotSpawned { .. }))
                .count();
            assert_eq!(spawned, bots);
            let second = sim.step(&PlayerInput::default());
            assert!(!second
                .events
                .iter()
                .any(|e| matches!(e, SimEvent::BotSpawned { .. })));
        }

        #[test]
        fn player_thrust_moves_forward() {
            let mut sim = Simulation::with_config(quiet_config(), 3).unwrap();
            let start = sim.player().unwrap().transform().position;
            let input = PlayerInput {
                thrust: true,
                ..PlayerInput::default()
            };
            for _ in 0..30 {
                sim.step(&input);
            }
            let end = sim.player().unwrap().transform().position;
            assert!(end.z < start.z);
        }

        #[test]
        fn thruster_events_on_change_only() {
            let mut sim = Simulation::with_config(quiet_config(), 3).unwrap();
            let on = PlayerInput {
                thrust: true,
                ..PlayerInput::default()
            };
            let report = sim.step(&on);
            assert!(report.events.contains(&SimEvent::ThrusterAttached {
                ship: PLAYER_ID,
                boost: false,
            }));
            assert!(sim.step(&on).events.is_empty());
            let report = sim.step(&PlayerInput::default());
            assert!(report
                .events
                .contains(&SimEvent::ThrusterDetached { ship: PLAYER_ID }));
        }

        #[test]
        fn boost_fires_on_press_only() {
            let mut sim = Simulation::with_config(quiet_config(), 3).unwrap();
            let held = PlayerInput {
                boost: true,
                ..PlayerInput::default()
            };
            sim.step(&held);
            assert!(sim.player().unwrap().body().is_boosting());

            // Holding through the whole cooldown never re-triggers.
            for _ in 0..150 {
                sim.step(&held);
            }
            assert!(!sim.player().unwrap().body().is_boosting());

            sim.step(&PlayerInput::default());
            sim.step(&held);
            assert!(sim.player().unwrap().body().is_boosting());
        }

        #[test]
        fn yaw_and_pitch_turn_the_player() {
            let mut sim = Simulation::with_config(quiet_config(), 3).unwrap();
            let left = PlayerInput {
                yaw: 1.0,
                ..PlayerInput::default()
            };
            sim.step(&left);
            assert!(sim.player().unwrap().transform().forward().x < 0.0);

            let up = PlayerInput {
                pitch: 5.0,
                ..PlayerInput::default()
            };
            sim.step(&up);
            let forward = sim.player().unwrap().transform().forward();
            assert!(forward.y > 0.0);
            // Clamped to full deflection: one tick at 3 rad/s.
            assert!((forward.y.asin() - 0.05).abs() < 1e-3);
        }
    }

    mod elimination_tests {
        use super::*;

        #[test]
        fn player_leaving_zone_is_eliminated() {
            let mut sim = Simulation::with_config(quiet_config(), 5).unwrap();
            {
                let player = sim.ship_mut(PLAYER_ID).unwrap();
                player.transform_mut().position = Vec3::new(49.9, 0.0, 0.0);
                player.body_mut().set_velocity(Vec3::new(30.0, 0.0, 0.0));
            }
            let report = sim.step(&PlayerInput::default());
            assert!(!report.player_in_bounds);
            assert_eq!(report.eliminated, vec![PLAYER_ID]);
            assert!(report.events.contains(&SimEvent::Eliminated {
                ship: PLAYER_ID,
                kind: ShipKind::Player,
            }));
            assert!(report
                .events
                .iter()
                .any(|e| matches!(e, SimEvent::Explosion { ship, .. } if *ship == PLAYER_ID)));
            assert!(sim.player().is_none());

            let next = sim.step(&PlayerInput::default());
            assert!(!next.player_in_bounds);
        }

        #[test]
        fn bot_leaving_zone_is_eliminated() {
            let mut sim = Simulation::with_config(quiet_config(), 5).unwrap();
            let bot = sim.spawn_bot_at(Vec3::new(49.95, 0.0, 0.0));
            sim.ship_mut(bot)
                .unwrap()
                .body_mut()
                .set_velocity(Vec3::new(30.0, 0.0, 0.0));
            let report = sim.step(&PlayerInput::default());
            assert!(report.was_eliminated(bot));
            assert_eq!(report.active_bot_count, 0);
            assert!(report.player_in_bounds);
        }
    }

    mod collision_tests {
        use super::*;

        #[test]
        fn ships_on_a_collision_course_bounce() {
            let mut config = quiet_config();
            config.behavior.policy = PolicyKind::Orbit;
            let mut sim = Simulation::with_config(config, 5).unwrap();
            sim.ship_mut(PLAYER_ID).unwrap().transform_mut().position = Vec3::new(0.0, 10.0, 0.0);
            let bot = sim.spawn_bot_at(Vec3::new(1.0, 10.0, 0.0));
            sim.ship_mut(bot)
                .unwrap()
                .body_mut()
                .set_velocity(Vec3::new(-3.0, 0.0, 0.0));

            let report = sim.step(&PlayerInput::default());
            assert_eq!(report.collisions, 1);
            assert!(report.events.contains(&SimEvent::Collision {
                a: PLAYER_ID,
                b: bot,
            }));
            assert!(sim.player().unwrap().body().velocity().x < 0.0);
            assert!(sim.player().unwrap().body().shake_time_remaining() > 0.0);
        }

        #[test]
        fn removed_partner_does_not_linger_in_contacts() {
            let mut config = quiet_config();
            config.behavior.policy = PolicyKind::Orbit;
            let mut sim = Simulation::with_config(config, 5).unwrap();
            sim.ship_mut(PLAYER_ID).unwrap().transform_mut().position = Vec3::new(0.0, 10.0, 0.0);
            let bot = sim.spawn_bot_at(Vec3::new(1.0, 10.0, 0.0));
            sim.ship_mut(bot)
                .unwrap()
                .body_mut()
                .set_velocity(Vec3::new(-3.0, 0.0, 0.0));
            assert_eq!(sim.step(&PlayerInput::default()).collisions, 1);
            assert_eq!(sim.player().unwrap().body().recent_contact_count(), 1);

            assert!(sim.remove_bot(bot));
            for _ in 0..10 {
                sim.step(&PlayerInput::default());
            }
            assert_eq!(sim.player().unwrap().body().recent_contact_count(), 0);
        }
    }

    mod population_tests {
        use super::*;

        #[test]
        fn rebalance_tops_up_to_minimum() {
            let mut config = SimulationConfig::default();
            config.population.rebalance_interval = 0.01;
            let mut sim = Simulation::with_config(config, 11).unwrap();
            for id in sim.bot_ids() {
                sim.remove_bot(id);
            }
            sim.step(&PlayerInput::default());
            assert_eq!(sim.bot_count(), 1);
            sim.step(&PlayerInput::default());
            assert_eq!(sim.bot_count(), 2);
        }

        #[test]
        fn rebalance_trims_to_maximum() {
            let mut config = SimulationConfig::default();
            config.population.rebalance_interval = 0.01;
            let mut sim = Simulation::with_config(config, 11).unwrap();
            for i in 0..3 {
                sim.spawn_bot_at(Vec3::new(-15.0 + 10.0 * i as f32, -15.0, 15.0));
            }
            let before = sim.bot_count();
            assert!(before > 4);
            let report = sim.step(&PlayerInput::default());
            assert_eq!(sim.bot_count(), before - 1);
            assert!(report
                .events
                .iter()
                .any(|e| matches!(e, SimEvent::BotRemoved { .. })));
        }

        #[test]
        fn rebalance_waits_for_interval() {
            let mut sim = Simulation::new(11);
            let bots = sim.bot_count();
            for _ in 0..120 {
                sim.step(&PlayerInput::default());
            }
            // Only eliminations can change the count before the first rebalance.
            assert!(sim.bot_count() <= bots);
        }
    }

    mod reset_tests {
        use super::*;

        #[test]
        fn reset_always_starts_at_minimum_population() {
            let mut config = SimulationConfig::default();
            config.population.min_bots = 3;
            config.population.max_bots = 6;
            for seed in 0..10 {
                let mut sim = Simulation::with_config(config.clone(), seed).unwrap();
                assert!((3..=6).contains(&sim.bot_count()));
                sim.reset();
                assert_eq!(sim.bot_count(), 3);
            }
        }

        #[test]
        fn reset_restores_a_fresh_arena() {
            let mut sim = Simulation::new(21);
            {
                let player = sim.ship_mut(PLAYER_ID).unwrap();
                player.body_mut().set_velocity(Vec3::new(5.0, 0.0, 0.0));
            }
            for _ in 0..10 {
                sim.step(&PlayerInput::default());
            }
            sim.reset();
            let player = sim.player().unwrap();
            assert_eq!(player.body().velocity(), Vec3::ZERO);
            assert_eq!(sim.bot_count(), 2);
            assert!(sim.state().next_rebalance_at() > sim.elapsed());
        }
    }

    mod advance_tests {
        use super::*;

        #[test]
        fn frame_delta_is_clamped() {
            let mut sim = Simulation::with_config(quiet_config(), 1).unwrap();
            let reports = sim.advance(5.0, &PlayerInput::default());
            assert_eq!(reports.len(), 6);
        }

        #[test]
        fn remainder_carries_over() {
            let mut sim = Simulation::with_config(quiet_config(), 1).unwrap();
            assert_eq!(sim.advance(0.01, &PlayerInput::default()).len(), 0);
            assert_eq!(sim.advance(0.01, &PlayerInput::default()).len(), 1);
        }

        #[test]
        fn negative_and_nan_deltas_do_nothing() {
            let mut sim = Simulation::with_config(quiet_config(), 1).unwrap();
            assert!(sim.advance(-1.0, &PlayerInput::default()).is_empty());
            assert!(sim.advance(f32::NAN, &PlayerInput::default()).is_empty());
            assert_eq!(sim.tick(), 0);
        }

        #[test]
        fn substeps_are_capped() {
            let mut config = quiet_config();
            config.max_substeps = 2;
            let mut sim = Simulation::with_config(config, 1).unwrap();
            assert_eq!(sim.advance(0.1, &PlayerInput::default()).len(), 2);
        }
    }

    mod shake_tests {
        use super::*;

        #[test]
        fn shake_does_not_touch_gameplay_rng() {
            let mut a = Simulation::new(77);
            let mut b = Simulation::new(77);
            a.ship_mut(PLAYER_ID).unwrap().body_mut().set_velocity(Vec3::ONE);
            b.ship_mut(PLAYER_ID).unwrap().body_mut().set_velocity(Vec3::ONE);
            for _ in 0..200 {
                a.player_shake_offset();
                a.step(&PlayerInput::default());
                b.step(&PlayerInput::default());
            }
            assert_eq!(a.snapshot(), b.snapshot());
        }
    }
}

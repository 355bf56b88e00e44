//! Per-tick output of the simulation.
//!
//! Each [`Simulation::step`](crate::simulation::Simulation::step) returns a
//! [`TickReport`]: the round manager reads `player_in_bounds` and
//! `active_bot_count`, the effects layer drains `events`.
//!
//! # Example
//!
//! ```
//! use glam::Vec3;
//! use safezone_core::entity::ShipId;
//! use safezone_core::events::SimEvent;
//!
//! let event = SimEvent::Explosion { ship: ShipId::new(3), position: Vec3::new(51.0, 0.0, 0.0) };
//! assert_eq!(event.ship(), Some(ShipId::new(3)));
//! ```

use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::entity::{ShipId, ShipKind};

/// Something the effects layer may want to show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    /// A ship blew up at the edge of the safe zone.
    Explosion {
        /// The ship that exploded.
        ship: ShipId,
        /// Where it exploded.
        position: Vec3,
    },
    /// A ship's engine plume should be shown.
    ThrusterAttached {
        /// The thrusting ship.
        ship: ShipId,
        /// Show the boost plume instead of the normal one.
        boost: bool,
    },
    /// A ship's engine plume should be hidden.
    ThrusterDetached {
        /// The ship that stopped thrusting.
        ship: ShipId,
    },
    /// Two ships bounced off each other.
    Collision {
        /// Lower id of the pair.
        a: ShipId,
        /// Higher id of the pair.
        b: ShipId,
    },
    /// A ship left the safe zone and was removed.
    Eliminated {
        /// The removed ship.
        ship: ShipId,
        /// Player or bot.
        kind: ShipKind,
    },
    /// A bot joined the arena.
    BotSpawned {
        /// The new bot.
        ship: ShipId,
    },
    /// A bot was retired by population upkeep.
    BotRemoved {
        /// The retired bot.
        ship: ShipId,
    },
}

impl SimEvent {
    /// The ship the event is about. `None` for collisions, which involve two.
    #[must_use]
    pub const fn ship(&self) -> Option<ShipId> {
        match self {
            Self::Explosion { ship, .. }
            | Self::ThrusterAttached { ship, .. }
            | Self::ThrusterDetached { ship }
            | Self::Eliminated { ship, .. }
            | Self::BotSpawned { ship }
            | Self::BotRemoved { ship } => Some(*ship),
            Self::Collision { .. } => None,
        }
    }
}

impl fmt::Display for SimEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explosion { ship, .. } => write!(f, "explosion of ship {ship}"),
            Self::ThrusterAttached { ship, boost: true } => write!(f, "ship {ship} boosting"),
            Self::ThrusterAttached { ship, boost: false } => write!(f, "ship {ship} thrusting"),
            Self::ThrusterDetached { ship } => write!(f, "ship {ship} coasting"),
            Self::Collision { a, b } => write!(f, "ships {a} and {b} collided"),
            Self::Eliminated { ship, kind } => write!(f, "{kind} ship {ship} eliminated"),
            Self::BotSpawned { ship } => write!(f, "bot {ship} spawned"),
            Self::BotRemoved { ship } => write!(f, "bot {ship} removed"),
        }
    }
}

/// Result of one fixed tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    /// Tick number after this step (the first step reports 1).
    pub tick: u64,
    /// Simulation time after this step, in seconds.
    pub elapsed: f64,
    /// The player ship exists and is inside the safe zone.
    pub player_in_bounds: bool,
    /// Bots left after eliminations and population upkeep.
    pub active_bot_count: usize,
    /// Collisions resolved this tick.
    pub collisions: usize,
    /// Ships eliminated this tick.
    pub eliminated: Vec<ShipId>,
    /// Events raised this tick, in order.
    pub events: Vec<SimEvent>,
}

impl TickReport {
    /// Returns `true` if `ship` was eliminated this tick.
    #[must_use]
    pub fn was_eliminated(&self, ship: ShipId) -> bool {
        self.eliminated.contains(&ship)
    }

    /// Iterates over events of interest to a single ship.
    pub fn events_for(&self, ship: ShipId) -> impl Iterator<Item = &SimEvent> {
        self.events.iter().filter(move |event| match event {
            SimEvent::Collision { a, b } => *a == ship || *b == ship,
            other => other.ship() == Some(ship),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collision_has_no_single_ship() {
        let event = SimEvent::Collision {
            a: ShipId::new(1),
            b: ShipId::new(2),
        };
        assert_eq!(event.ship(), None);
        assert_eq!(event.to_string(), "ships 1 and 2 collided");
    }

    #[test]
    fn events_for_filters_by_ship() {
        let report = TickReport {
            events: vec![
                SimEvent::BotSpawned { ship: ShipId::new(4) },
                SimEvent::Collision {
                    a: ShipId::new(0),
                    b: ShipId::new(4),
                },
                SimEvent::ThrusterDetached { ship: ShipId::new(0) },
            ],
            ..TickReport::default()
        };
        assert_eq!(report.events_for(ShipId::new(4)).count(), 2);
        assert_eq!(report.events_for(ShipId::new(0)).count(), 2);
        assert_eq!(report.events_for(ShipId::new(9)).count(), 0);
    }

    #[test]
    fn report_serializes_to_json() {
        let report = TickReport {
            tick: 3,
            player_in_bounds: true,
            eliminated: vec![ShipId::new(2)],
            ..TickReport::default()
        };
        let json = serde_json::to_string(&report).unwrap();
        let parsed: TickReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report);
        assert!(parsed.was_eliminated(ShipId::new(2)));
    }
}

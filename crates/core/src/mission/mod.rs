//! Mission Model
//!
//! Immutable description of a parsed mission file: which vehicle runs it,
//! where that vehicle launches from, and the ordered commands it executes.
//!
//! # Mission File Format
//!
//! - Plain text, first line is a header (e.g. `QGC WPL 110`)
//! - One command record per subsequent non-empty line
//! - Whitespace-separated numeric fields, see [`parser`]

pub mod command;
pub mod parser;

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::geo::HomePosition;
use crate::policy::{VehiclePolicy, COPTER_POLICY, PLANE_POLICY, ROVER_POLICY};

pub use command::{
    Command, CommandType, MAV_CMD_NAV_LAND, MAV_CMD_NAV_RETURN_TO_LAUNCH, MAV_CMD_NAV_WAYPOINT,
};
pub use parser::{parse_command, parse_mission, ParseError};

/// Kind of vehicle executing the mission.
///
/// Serializes to the short lowercase name and deserializes from any name
/// [`FromStr`] accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum VehicleKind {
    Copter,
    Plane,
    Rover,
}

impl VehicleKind {
    /// Execution quirks of this vehicle kind.
    pub fn policy(&self) -> &'static VehiclePolicy {
        match self {
            Self::Copter => &COPTER_POLICY,
            Self::Plane => &PLANE_POLICY,
            Self::Rover => &ROVER_POLICY,
        }
    }
}

impl fmt::Display for VehicleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Copter => write!(f, "ArduCopter"),
            Self::Plane => write!(f, "ArduPlane"),
            Self::Rover => write!(f, "APMrover2"),
        }
    }
}

/// Returned when a vehicle name matches no known [`VehicleKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownVehicleKind;

impl fmt::Display for UnknownVehicleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown vehicle kind")
    }
}

impl core::error::Error for UnknownVehicleKind {}

impl FromStr for VehicleKind {
    type Err = UnknownVehicleKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const NAMES: [(&str, VehicleKind); 7] = [
            ("ArduCopter", VehicleKind::Copter),
            ("copter", VehicleKind::Copter),
            ("ArduPlane", VehicleKind::Plane),
            ("plane", VehicleKind::Plane),
            ("APMrover2", VehicleKind::Rover),
            ("ArduRover", VehicleKind::Rover),
            ("rover", VehicleKind::Rover),
        ];

        let s = s.trim();
        NAMES
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(s))
            .map(|(_, kind)| *kind)
            .ok_or(UnknownVehicleKind)
    }
}

impl TryFrom<String> for VehicleKind {
    type Error = UnknownVehicleKind;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        name.parse()
    }
}

/// A parsed mission, read-only once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mission {
    source_name: String,
    vehicle: VehicleKind,
    commands: Vec<Command>,
    home: HomePosition,
}

impl Mission {
    pub fn new(
        source_name: impl Into<String>,
        vehicle: VehicleKind,
        commands: Vec<Command>,
        home: HomePosition,
    ) -> Self {
        Self {
            source_name: source_name.into(),
            vehicle,
            commands,
            home,
        }
    }

    /// Identifier of the file the mission was read from.
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn vehicle(&self) -> VehicleKind {
        self.vehicle
    }

    /// Commands in execution order.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn home(&self) -> &HomePosition {
        &self.home
    }

    /// Number of commands in the mission.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

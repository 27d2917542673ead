//! Mission Command Model
//!
//! A single parsed record of a mission file. Command IDs follow MAVLink's
//! MAV_CMD numbering; only the three navigation commands that change the
//! oracle's prediction get their own [`CommandType`] variant.

use serde::{Deserialize, Serialize};

use crate::geo::GeoPosition;

/// MAV_CMD_NAV_WAYPOINT command ID.
pub const MAV_CMD_NAV_WAYPOINT: u16 = 16;

/// MAV_CMD_NAV_RETURN_TO_LAUNCH command ID.
pub const MAV_CMD_NAV_RETURN_TO_LAUNCH: u16 = 20;

/// MAV_CMD_NAV_LAND command ID.
pub const MAV_CMD_NAV_LAND: u16 = 21;

/// Semantic classification of a command ID.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandType {
    Waypoint,
    ReturnToLaunch,
    Land,
    /// Any other command, passed through unmodified
    Other(u16),
}

impl CommandType {
    pub fn from_id(command_id: u16) -> Self {
        match command_id {
            MAV_CMD_NAV_WAYPOINT => Self::Waypoint,
            MAV_CMD_NAV_RETURN_TO_LAUNCH => Self::ReturnToLaunch,
            MAV_CMD_NAV_LAND => Self::Land,
            other => Self::Other(other),
        }
    }

    pub fn id(&self) -> u16 {
        match self {
            Self::Waypoint => MAV_CMD_NAV_WAYPOINT,
            Self::ReturnToLaunch => MAV_CMD_NAV_RETURN_TO_LAUNCH,
            Self::Land => MAV_CMD_NAV_LAND,
            Self::Other(id) => *id,
        }
    }
}

/// One navigation instruction of a mission.
///
/// The current-waypoint and autocontinue flags of the file record are not
/// carried: both are always sent to the vehicle as 0.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Command {
    /// Index field of the file record
    pub seq: u16,
    /// Frame of reference (MAV_FRAME_GLOBAL_RELATIVE_ALT, etc.)
    pub frame: u8,
    /// Raw MAV_CMD ID
    pub command_id: u16,
    /// PARAM1..PARAM4 as read from the file, opaque to the engine.
    /// Narrowing to the wire format is left to the vehicle connection.
    pub params: [f64; 4],
    /// X/Y/Z target (latitude, longitude, altitude)
    pub target: GeoPosition,
}

impl Command {
    pub fn new(seq: u16, frame: u8, command_id: u16, params: [f64; 4], target: GeoPosition) -> Self {
        Self {
            seq,
            frame,
            command_id,
            params,
            target,
        }
    }

    /// Convenience constructor for a NAV_WAYPOINT in the relative-altitude frame.
    pub fn waypoint(seq: u16, lat_deg: f64, lon_deg: f64, alt_m: f64) -> Self {
        Self::new(
            seq,
            3, // MAV_FRAME_GLOBAL_RELATIVE_ALT
            MAV_CMD_NAV_WAYPOINT,
            [0.0; 4],
            GeoPosition::new(lat_deg, lon_deg, alt_m),
        )
    }

    pub fn command_type(&self) -> CommandType {
        CommandType::from_id(self.command_id)
    }

    /// Current-waypoint flag as uploaded to the vehicle.
    pub fn current(&self) -> u8 {
        0
    }

    /// Autocontinue flag as uploaded to the vehicle.
    pub fn autocontinue(&self) -> u8 {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_type_from_id() {
        assert_eq!(CommandType::from_id(16), CommandType::Waypoint);
        assert_eq!(CommandType::from_id(20), CommandType::ReturnToLaunch);
        assert_eq!(CommandType::from_id(21), CommandType::Land);
        assert_eq!(CommandType::from_id(22), CommandType::Other(22)); // NAV_TAKEOFF
    }

    #[test]
    fn test_command_type_id_round_trips_other() {
        assert_eq!(CommandType::Other(178).id(), 178);
        assert_eq!(CommandType::Land.id(), MAV_CMD_NAV_LAND);
    }

    #[test]
    fn test_waypoint_constructor() {
        let cmd = Command::waypoint(2, -35.36, 149.16, 20.0);
        assert_eq!(cmd.seq, 2);
        assert_eq!(cmd.frame, 3);
        assert_eq!(cmd.command_type(), CommandType::Waypoint);
        assert_eq!(cmd.target.alt_m, 20.0);
    }

    #[test]
    fn test_flags_always_zero() {
        let cmd = Command::waypoint(0, 0.0, 0.0, 0.0);
        assert_eq!(cmd.current(), 0);
        assert_eq!(cmd.autocontinue(), 0);
    }
}

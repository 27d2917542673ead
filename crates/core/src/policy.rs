//! Vehicle execution policies
//!
//! ArduPilot firmwares do not execute an uploaded mission identically.
//! Each [`VehicleKind`](crate::mission::VehicleKind) maps to one constant
//! policy so the oracle and the status-text classifier stay free of
//! per-vehicle branches.

/// Execution quirks of one vehicle kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VehiclePolicy {
    /// Commands after a RETURN_TO_LAUNCH are never executed
    pub stops_after_return_to_launch: bool,
    /// The first uploaded item is treated as home and never reported
    pub discards_first_command: bool,
    /// "Disarming motors" marks the end of the mission
    pub disarm_completes_mission: bool,
}

pub const COPTER_POLICY: VehiclePolicy = VehiclePolicy {
    stops_after_return_to_launch: true,
    discards_first_command: true,
    disarm_completes_mission: true,
};

pub const PLANE_POLICY: VehiclePolicy = VehiclePolicy {
    stops_after_return_to_launch: false,
    discards_first_command: false,
    disarm_completes_mission: false,
};

pub const ROVER_POLICY: VehiclePolicy = VehiclePolicy {
    stops_after_return_to_launch: false,
    discards_first_command: false,
    disarm_completes_mission: false,
};

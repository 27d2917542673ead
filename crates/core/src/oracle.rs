//! Mission Oracle
//!
//! Statically predicts the outcome of executing a mission: how many items
//! the vehicle should report as visited and where it should end up.
//!
//! The prediction is a single forward pass over the commands. Vehicle
//! quirks come from the mission's [`VehiclePolicy`](crate::policy::VehiclePolicy).
//!
//! # Known Quirk
//!
//! Vehicles that discard the first command lose one from the count
//! unconditionally, so a very short mission can predict a negative count.
//! The raw value is kept in [`Oracle::raw_waypoint_count`] and the expected
//! count is clamped at zero.

use serde::{Deserialize, Serialize};

use crate::geo::GeoPosition;
use crate::mission::{CommandType, Mission};

/// Default tolerance between the final and the expected end position.
pub const DEFAULT_MAX_END_DISTANCE_M: f64 = 3.0;

/// Expected outcome of one mission execution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Oracle {
    expected_waypoint_count: usize,
    raw_waypoint_count: i64,
    expected_end_position: GeoPosition,
    max_end_distance_m: f64,
    land_workaround: bool,
}

impl Oracle {
    /// Derive the oracle for `mission`.
    ///
    /// With `enable_land_workaround`, a LAND issued while the vehicle is
    /// already on the ground (after a RETURN_TO_LAUNCH) ends the pass: the
    /// vehicle ignores the rest of the mission in that case.
    pub fn build(mission: &Mission, enable_land_workaround: bool) -> Self {
        let policy = mission.vehicle().policy();
        let home = mission.home().position;

        let mut visited: i64 = 0;
        let mut end_position = home;
        let mut on_ground = false;

        for command in mission.commands() {
            match command.command_type() {
                CommandType::Waypoint => {
                    end_position = command.target;
                    on_ground = false;
                }
                CommandType::ReturnToLaunch => {
                    end_position = home;
                    on_ground = true;
                    if policy.stops_after_return_to_launch {
                        visited += 1;
                        break;
                    }
                }
                CommandType::Land if enable_land_workaround && on_ground => break,
                _ => {}
            }
            visited += 1;
        }

        if policy.discards_first_command {
            visited -= 1;
        }

        Self {
            expected_waypoint_count: visited.max(0) as usize,
            raw_waypoint_count: visited,
            expected_end_position: end_position,
            max_end_distance_m: DEFAULT_MAX_END_DISTANCE_M,
            land_workaround: enable_land_workaround,
        }
    }

    /// Replace the end-position tolerance.
    pub fn with_max_end_distance(mut self, meters: f64) -> Self {
        self.max_end_distance_m = meters;
        self
    }

    /// Minimum number of visited items the vehicle must report.
    pub fn expected_waypoint_count(&self) -> usize {
        self.expected_waypoint_count
    }

    /// Count before clamping; negative only for the short-mission quirk.
    pub fn raw_waypoint_count(&self) -> i64 {
        self.raw_waypoint_count
    }

    pub fn is_clamped(&self) -> bool {
        self.raw_waypoint_count < 0
    }

    pub fn expected_end_position(&self) -> &GeoPosition {
        &self.expected_end_position
    }

    pub fn max_end_distance_m(&self) -> f64 {
        self.max_end_distance_m
    }

    /// Whether the LAND-on-ground workaround was applied when building.
    pub fn land_workaround(&self) -> bool {
        self.land_workaround
    }
}

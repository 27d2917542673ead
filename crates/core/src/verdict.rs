//! Execution verdict
//!
//! The single, terminal answer of a monitoring run. Failed checks are
//! reportable outcomes, not errors.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::geo::{distance_3d, GeoPosition};
use crate::oracle::Oracle;

/// Why a run did not pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerdictReason {
    None,
    Unresponsive,
    WaypointsNotVisited,
    TooFarFromExpectedEnd,
}

impl fmt::Display for VerdictReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerdictReason::None => write!(f, "mission executed as expected"),
            VerdictReason::Unresponsive => write!(f, "vehicle became unresponsive"),
            VerdictReason::WaypointsNotVisited => write!(f, "vehicle didn't visit all of the WPs"),
            VerdictReason::TooFarFromExpectedEnd => {
                write!(f, "vehicle was too far away from expected end position")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionVerdict {
    pub success: bool,
    pub reason: VerdictReason,
}

impl ExecutionVerdict {
    pub const fn passed() -> Self {
        Self {
            success: true,
            reason: VerdictReason::None,
        }
    }

    pub const fn failed(reason: VerdictReason) -> Self {
        Self {
            success: false,
            reason,
        }
    }
}

impl fmt::Display for ExecutionVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = if self.success { "PASS" } else { "FAIL" };
        write!(f, "{}: {}", outcome, self.reason)
    }
}

/// Result of checking a completed mission against its oracle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionEvaluation {
    pub verdict: ExecutionVerdict,
    /// Distance to the expected end; `None` when the waypoint check failed first
    pub distance_m: Option<f64>,
}

/// Judge a mission the vehicle reported as complete.
///
/// With `check_waypoints`, too few visited items fail the run before the
/// end position is looked at.
pub fn evaluate_completion(
    oracle: &Oracle,
    visited_waypoints: usize,
    final_position: &GeoPosition,
    check_waypoints: bool,
) -> CompletionEvaluation {
    if check_waypoints && visited_waypoints < oracle.expected_waypoint_count() {
        return CompletionEvaluation {
            verdict: ExecutionVerdict::failed(VerdictReason::WaypointsNotVisited),
            distance_m: None,
        };
    }

    let distance = distance_3d(final_position, oracle.expected_end_position());
    let verdict = if distance <= oracle.max_end_distance_m() {
        ExecutionVerdict::passed()
    } else {
        ExecutionVerdict::failed(VerdictReason::TooFarFromExpectedEnd)
    };

    CompletionEvaluation {
        verdict,
        distance_m: Some(distance),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{HomePosition, EARTH_RADIUS_M};
    use crate::mission::{Command, Mission, VehicleKind};
    use alloc::vec;

    fn plane_oracle() -> Oracle {
        let mission = Mission::new(
            "verdict-test",
            VehicleKind::Plane,
            vec![
                Command::waypoint(0, 0.001, 0.0, 0.0),
                Command::waypoint(1, 0.002, 0.0, 0.0),
                Command::waypoint(2, 0.0, 0.0, 0.0),
            ],
            HomePosition::default(),
        );
        Oracle::build(&mission, false)
    }

    fn meters_north(m: f64) -> GeoPosition {
        GeoPosition::new(m / (EARTH_RADIUS_M * core::f64::consts::PI / 180.0), 0.0, 0.0)
    }

    #[test]
    fn test_pass_at_expected_end() {
        let eval = evaluate_completion(&plane_oracle(), 4, &GeoPosition::default(), true);
        assert_eq!(eval.verdict, ExecutionVerdict::passed());
        assert!(eval.distance_m.unwrap() < 1e-9);
    }

    #[test]
    fn test_waypoints_not_visited() {
        let eval = evaluate_completion(&plane_oracle(), 1, &GeoPosition::default(), true);
        assert_eq!(eval.verdict, ExecutionVerdict::failed(VerdictReason::WaypointsNotVisited));
        assert_eq!(eval.distance_m, None);
    }

    #[test]
    fn test_waypoint_shortfall_ignored_when_unchecked() {
        let eval = evaluate_completion(&plane_oracle(), 1, &GeoPosition::default(), false);
        assert!(eval.verdict.success);
    }

    #[test]
    fn test_too_far_from_end() {
        let eval = evaluate_completion(&plane_oracle(), 3, &meters_north(10.0), true);
        assert_eq!(eval.verdict, ExecutionVerdict::failed(VerdictReason::TooFarFromExpectedEnd));
        assert!((eval.distance_m.unwrap() - 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_within_tolerance_boundary() {
        let eval = evaluate_completion(&plane_oracle(), 3, &meters_north(2.9), true);
        assert!(eval.verdict.success);
    }

    #[test]
    fn test_verdict_display() {
        let verdict = ExecutionVerdict::failed(VerdictReason::Unresponsive);
        assert_eq!(alloc::format!("{}", verdict), "FAIL: vehicle became unresponsive");
    }
}

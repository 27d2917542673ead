//! Status-text classification
//!
//! ArduPilot reports mission progress through STATUSTEXT messages. Only
//! the message prefix matters; matching is exact and case-sensitive.

use crate::policy::VehiclePolicy;

/// Prefixes reported when a mission item has been reached or skipped.
pub const ITEM_REACHED_PREFIXES: [&str; 3] = [
    "Reached waypoint #",
    "Reached command #",
    "Skipping invalid cmd",
];

/// Prefixes reported when the mission has ended, for every vehicle kind.
pub const MISSION_END_PREFIXES: [&str; 2] = ["Reached destination", "Mission Complete"];

/// Prefix that ends the mission only when the policy says so.
pub const DISARM_PREFIX: &str = "Disarming motors";

/// Effect of a status-text message on mission progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTextKind {
    /// One more mission item visited
    ItemReached,
    /// One more item visited and the mission is over
    MissionEnded,
    /// Not related to mission progress
    Unrelated,
}

impl StatusTextKind {
    /// Whether the message counts towards the visited items.
    pub fn counts_as_visit(&self) -> bool {
        !matches!(self, Self::Unrelated)
    }
}

pub fn classify_status_text(text: &str, policy: &VehiclePolicy) -> StatusTextKind {
    if ITEM_REACHED_PREFIXES.iter().any(|p| text.starts_with(p)) {
        StatusTextKind::ItemReached
    } else if MISSION_END_PREFIXES.iter().any(|p| text.starts_with(p))
        || (policy.disarm_completes_mission && text.starts_with(DISARM_PREFIX))
    {
        StatusTextKind::MissionEnded
    } else {
        StatusTextKind::Unrelated
    }
}

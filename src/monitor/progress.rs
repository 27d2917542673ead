//! Shared run progress
//!
//! Written by the status-text listener (possibly on the connection's
//! receive thread) and read by the polling loop. One mutex guards the whole
//! tuple so a snapshot is always consistent.

use std::sync::{Mutex, MutexGuard};

use start_verify_core::{classify_status_text, GeoPosition, StatusTextKind, VehiclePolicy};

use crate::vehicle::StatusTextEvent;

/// Consistent view of a run's progress.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProgressSnapshot {
    pub visited_waypoints: usize,
    pub complete: bool,
    /// Position captured by the message that completed the mission
    pub final_position: Option<GeoPosition>,
}

#[derive(Debug)]
pub struct RunProgress {
    policy: &'static VehiclePolicy,
    state: Mutex<ProgressSnapshot>,
}

impl RunProgress {
    pub fn new(policy: &'static VehiclePolicy) -> Self {
        Self {
            policy,
            state: Mutex::new(ProgressSnapshot::default()),
        }
    }

    /// Apply one status-text message. Once complete, the progress is frozen.
    pub fn record(&self, event: &StatusTextEvent) {
        crate::log_debug!("received STATUSTEXT from vehicle: {}", event.text);

        let kind = classify_status_text(&event.text, self.policy);
        if !kind.counts_as_visit() {
            return;
        }

        let mut state = self.lock();
        if state.complete {
            crate::log_debug!("mission already complete, ignoring: {}", event.text);
            return;
        }

        state.visited_waypoints += 1;
        crate::log_debug!("visited waypoints: {}", state.visited_waypoints);

        if kind == StatusTextKind::MissionEnded {
            state.final_position = Some(event.position);
            state.complete = true;
            crate::log_debug!("message indicates end of mission");
        }
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        *self.lock()
    }

    fn lock(&self) -> MutexGuard<'_, ProgressSnapshot> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

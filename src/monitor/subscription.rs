//! Status-text subscription guard
//!
//! Attaches a [`RunProgress`] listener to the vehicle connection and
//! removes it when dropped, so no exit path (error, timeout, panic, or a
//! cancelled run future) leaves a listener on the shared connection.

use std::sync::Arc;

use super::progress::RunProgress;
use crate::vehicle::{StatusTextEvent, SubscriptionId, VehicleConnection};

pub struct StatusTextSubscription<'a, C: VehicleConnection + ?Sized> {
    conn: &'a C,
    id: SubscriptionId,
}

impl<'a, C: VehicleConnection + ?Sized> StatusTextSubscription<'a, C> {
    pub fn attach(conn: &'a C, progress: Arc<RunProgress>) -> Self {
        crate::log_debug!("attaching STATUSTEXT listener");
        let id = conn.subscribe_status_text(Box::new(move |event: &StatusTextEvent| {
            progress.record(event)
        }));
        crate::log_debug!("attached STATUSTEXT listener ({})", id);
        Self { conn, id }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }
}

impl<C: VehicleConnection + ?Sized> Drop for StatusTextSubscription<'_, C> {
    fn drop(&mut self) {
        self.conn.unsubscribe(self.id);
        crate::log_debug!("removed STATUSTEXT listener ({})", self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::mock::{MockVehicle, ScriptStep};
    use start_verify_core::{GeoPosition, VehicleKind};

    #[test]
    fn test_guard_unsubscribes_on_drop() {
        let vehicle = MockVehicle::new(GeoPosition::default())
            .with_script(vec![ScriptStep::status("Reached waypoint #1")]);
        let progress = Arc::new(RunProgress::new(VehicleKind::Plane.policy()));

        {
            let subscription = StatusTextSubscription::attach(&vehicle, progress.clone());
            assert_eq!(vehicle.active_subscriptions(), 1);
            assert_eq!(subscription.id().0, 1);
        }

        assert_eq!(vehicle.active_subscriptions(), 0);
        assert_eq!(progress.snapshot().visited_waypoints, 1);
    }

    #[test]
    fn test_guard_unsubscribes_on_panic() {
        let vehicle = MockVehicle::new(GeoPosition::default());
        let progress = Arc::new(RunProgress::new(VehicleKind::Plane.policy()));

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _subscription = StatusTextSubscription::attach(&vehicle, progress.clone());
            panic!("listener owner failed");
        }));

        assert!(result.is_err());
        assert_eq!(vehicle.active_subscriptions(), 0);
    }
}

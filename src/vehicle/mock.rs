//! Mock vehicle connection for testing
//!
//! Scripts the behaviour of a vehicle without a simulator: how long it
//! takes to become armable, how many arm requests it rejects, its heartbeat
//! age, and the status-text messages it sends once a listener attaches.
//!
//! # Feature Gate
//!
//! Available during test builds (`#[cfg(test)]`) and when the `mock`
//! feature is enabled.
//!
//! # Example
//!
//! ```ignore
//! use start_verify::vehicle::mock::{MockVehicle, ScriptStep};
//! use start_verify_core::GeoPosition;
//!
//! let vehicle = MockVehicle::new(GeoPosition::default()).with_script(vec![
//!     ScriptStep::status("Reached waypoint #1"),
//!     ScriptStep::status("Mission Complete"),
//! ]);
//! assert_eq!(vehicle.active_subscriptions(), 0);
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use start_verify_core::{Command, GeoPosition};

use super::{StatusTextCallback, StatusTextEvent, SubscriptionId, VehicleConnection};
use crate::error::VehicleError;

/// One scripted action, replayed in order when a listener subscribes.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptStep {
    /// Move the vehicle to a new position
    MoveTo(GeoPosition),
    /// Deliver a status-text message to every listener
    StatusText(String),
    /// Change the reported heartbeat age
    HeartbeatAge(Duration),
}

impl ScriptStep {
    pub fn status(text: impl Into<String>) -> Self {
        Self::StatusText(text.into())
    }
}

struct MockState {
    armable_after: u32,
    arm_rejections: u32,
    arm_requests: u32,
    armed: bool,
    mode: Option<String>,
    staged: Vec<Command>,
    uploaded: Vec<Command>,
    upload_failure: Option<VehicleError>,
    hang_upload: bool,
    start_index: Option<u16>,
    position: GeoPosition,
    heartbeat_age: Duration,
    script: Vec<ScriptStep>,
    subscribers: HashMap<SubscriptionId, Arc<StatusTextCallback>>,
    next_subscription: u64,
    total_subscriptions: u32,
}

/// Scripted [`VehicleConnection`] double.
pub struct MockVehicle {
    state: Mutex<MockState>,
}

impl MockVehicle {
    /// Armable, accepts the first arm request, fresh heartbeat, empty script.
    pub fn new(position: GeoPosition) -> Self {
        Self {
            state: Mutex::new(MockState {
                armable_after: 0,
                arm_rejections: 0,
                arm_requests: 0,
                armed: false,
                mode: None,
                staged: Vec::new(),
                uploaded: Vec::new(),
                upload_failure: None,
                hang_upload: false,
                start_index: None,
                position,
                heartbeat_age: Duration::ZERO,
                script: Vec::new(),
                subscribers: HashMap::new(),
                next_subscription: 1,
                total_subscriptions: 0,
            }),
        }
    }

    /// Report "not armable" for the first `polls` queries.
    pub fn with_armable_after(self, polls: u32) -> Self {
        self.lock().armable_after = polls;
        self
    }

    /// Ignore the first `count` arm requests.
    pub fn with_arm_rejections(self, count: u32) -> Self {
        self.lock().arm_rejections = count;
        self
    }

    pub fn with_heartbeat_age(self, age: Duration) -> Self {
        self.lock().heartbeat_age = age;
        self
    }

    pub fn with_script(self, script: Vec<ScriptStep>) -> Self {
        self.lock().script = script;
        self
    }

    pub fn with_upload_failure(self, error: VehicleError) -> Self {
        self.lock().upload_failure = Some(error);
        self
    }

    /// Never acknowledge the uploaded command list.
    pub fn with_hanging_upload(self) -> Self {
        self.lock().hang_upload = true;
        self
    }

    pub fn set_position(&self, position: GeoPosition) {
        self.lock().position = position;
    }

    pub fn set_heartbeat_age(&self, age: Duration) {
        self.lock().heartbeat_age = age;
    }

    /// Deliver a status-text message to every current listener.
    pub fn emit_status_text(&self, text: &str) {
        let (event, listeners) = {
            let state = self.lock();
            let listeners: Vec<_> = state.subscribers.values().cloned().collect();
            (StatusTextEvent::new(text, state.position), listeners)
        };
        for listener in listeners {
            (**listener)(&event);
        }
    }

    pub fn active_subscriptions(&self) -> usize {
        self.lock().subscribers.len()
    }

    pub fn total_subscriptions(&self) -> u32 {
        self.lock().total_subscriptions
    }

    pub fn arm_requests(&self) -> u32 {
        self.lock().arm_requests
    }

    pub fn armed(&self) -> bool {
        self.lock().armed
    }

    pub fn mode(&self) -> Option<String> {
        self.lock().mode.clone()
    }

    pub fn uploaded_commands(&self) -> Vec<Command> {
        self.lock().uploaded.clone()
    }

    pub fn start_index(&self) -> Option<u16> {
        self.lock().start_index
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn apply(&self, step: ScriptStep) {
        match step {
            ScriptStep::MoveTo(position) => self.set_position(position),
            ScriptStep::HeartbeatAge(age) => self.set_heartbeat_age(age),
            ScriptStep::StatusText(text) => self.emit_status_text(&text),
        }
    }
}

#[async_trait]
impl VehicleConnection for MockVehicle {
    async fn is_armable(&self) -> Result<bool, VehicleError> {
        let mut state = self.lock();
        if state.armable_after > 0 {
            state.armable_after -= 1;
            Ok(false)
        } else {
            Ok(true)
        }
    }

    async fn set_armed(&self, armed: bool) -> Result<(), VehicleError> {
        let mut state = self.lock();
        if !armed {
            state.armed = false;
            return Ok(());
        }
        state.arm_requests += 1;
        if state.arm_rejections > 0 {
            state.arm_rejections -= 1;
        } else {
            state.armed = true;
        }
        Ok(())
    }

    async fn is_armed(&self) -> Result<bool, VehicleError> {
        Ok(self.lock().armed)
    }

    async fn set_mode(&self, mode: &str) -> Result<(), VehicleError> {
        self.lock().mode = Some(mode.to_string());
        Ok(())
    }

    async fn clear_commands(&self) -> Result<(), VehicleError> {
        self.lock().staged.clear();
        Ok(())
    }

    async fn add_command(&self, command: &Command) -> Result<(), VehicleError> {
        self.lock().staged.push(*command);
        Ok(())
    }

    async fn upload_commands(&self) -> Result<(), VehicleError> {
        let mut state = self.lock();
        if let Some(error) = state.upload_failure.clone() {
            return Err(error);
        }
        state.uploaded = state.staged.clone();
        Ok(())
    }

    async fn wait_commands_ready(&self) -> Result<(), VehicleError> {
        let hang = self.lock().hang_upload;
        if hang {
            std::future::pending::<()>().await;
        }
        Ok(())
    }

    async fn send_start_message(&self, start_index: u16) -> Result<(), VehicleError> {
        self.lock().start_index = Some(start_index);
        Ok(())
    }

    fn current_position(&self) -> GeoPosition {
        self.lock().position
    }

    fn last_heartbeat_age(&self) -> Duration {
        self.lock().heartbeat_age
    }

    fn subscribe_status_text(&self, callback: StatusTextCallback) -> SubscriptionId {
        let (id, script) = {
            let mut state = self.lock();
            let id = SubscriptionId(state.next_subscription);
            state.next_subscription += 1;
            state.total_subscriptions += 1;
            state.subscribers.insert(id, Arc::new(callback));
            (id, std::mem::take(&mut state.script))
        };
        for step in script {
            self.apply(step);
        }
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.lock().subscribers.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn armable_after_polls() {
        let vehicle = MockVehicle::new(GeoPosition::default()).with_armable_after(2);
        assert!(!vehicle.is_armable().await.unwrap());
        assert!(!vehicle.is_armable().await.unwrap());
        assert!(vehicle.is_armable().await.unwrap());
    }

    #[tokio::test]
    async fn arm_rejections() {
        let vehicle = MockVehicle::new(GeoPosition::default()).with_arm_rejections(1);
        vehicle.set_armed(true).await.unwrap();
        assert!(!vehicle.is_armed().await.unwrap());
        vehicle.set_armed(true).await.unwrap();
        assert!(vehicle.is_armed().await.unwrap());
        assert_eq!(vehicle.arm_requests(), 2);
    }

    #[tokio::test]
    async fn upload_copies_staged_commands() {
        let vehicle = MockVehicle::new(GeoPosition::default());
        vehicle.add_command(&Command::waypoint(0, 1.0, 1.0, 1.0)).await.unwrap();
        vehicle.clear_commands().await.unwrap();
        vehicle.add_command(&Command::waypoint(1, 2.0, 2.0, 2.0)).await.unwrap();
        assert!(vehicle.uploaded_commands().is_empty());
        vehicle.upload_commands().await.unwrap();
        let uploaded = vehicle.uploaded_commands();
        assert_eq!(uploaded.len(), 1);
        assert_eq!(uploaded[0].seq, 1);
    }

    #[tokio::test]
    async fn upload_failure_is_reported() {
        let vehicle = MockVehicle::new(GeoPosition::default())
            .with_upload_failure(VehicleError::Disconnected);
        assert_eq!(vehicle.upload_commands().await, Err(VehicleError::Disconnected));
    }

    #[test]
    fn script_replays_on_subscribe_with_positions() {
        let end = GeoPosition::new(1.0, 2.0, 3.0);
        let vehicle = MockVehicle::new(GeoPosition::default()).with_script(vec![
            ScriptStep::status("Reached waypoint #1"),
            ScriptStep::MoveTo(end),
            ScriptStep::status("Mission Complete"),
        ]);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let id = vehicle.subscribe_status_text(Box::new(move |event| {
            sink.lock().unwrap().push(event.clone());
        }));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].position, GeoPosition::default());
        assert_eq!(seen[1].text, "Mission Complete");
        assert_eq!(seen[1].position, end);
        assert_eq!(vehicle.active_subscriptions(), 1);

        vehicle.unsubscribe(id);
        assert_eq!(vehicle.active_subscriptions(), 0);
        assert_eq!(vehicle.total_subscriptions(), 1);
    }

    #[test]
    fn unsubscribed_listener_receives_nothing() {
        let vehicle = MockVehicle::new(GeoPosition::default());
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let id = vehicle.subscribe_status_text(Box::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        vehicle.emit_status_text("Reached waypoint #1");
        vehicle.unsubscribe(id);
        vehicle.emit_status_text("Reached waypoint #2");
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}

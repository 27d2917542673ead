//! Vehicle connection abstraction
//!
//! The engine never speaks the vehicle's wire protocol. It is handed a
//! [`VehicleConnection`] implemented by an external client library (for
//! example a MAVLink ground-station link) and only uses the operations
//! below.

#[cfg(any(test, feature = "mock"))]
pub mod mock;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use start_verify_core::{Command, GeoPosition};

use crate::error::VehicleError;

/// Flight mode used to run an uploaded mission.
pub const AUTO_MODE: &str = "AUTO";

/// Handle returned by [`VehicleConnection::subscribe_status_text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Subscription({})", self.0)
    }
}

/// A STATUSTEXT message received from the vehicle.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusTextEvent {
    pub text: String,
    /// Global position the connection held when the message arrived
    pub position: GeoPosition,
}

impl StatusTextEvent {
    pub fn new(text: impl Into<String>, position: GeoPosition) -> Self {
        Self {
            text: text.into(),
            position,
        }
    }
}

/// Listener invoked for each status-text message, in delivery order.
///
/// May run on the connection's own receive thread, concurrently with the
/// monitor's polling loop.
pub type StatusTextCallback = Box<dyn Fn(&StatusTextEvent) + Send + Sync>;

/// Capabilities the engine needs from a live vehicle.
///
/// Implementations must be `Send + Sync`; the connection is used by a single
/// verification run at a time.
#[async_trait]
pub trait VehicleConnection: Send + Sync {
    /// Whether pre-arm checks currently pass.
    async fn is_armable(&self) -> Result<bool, VehicleError>;

    /// Request the vehicle to arm or disarm. The request may be ignored.
    async fn set_armed(&self, armed: bool) -> Result<(), VehicleError>;

    async fn is_armed(&self) -> Result<bool, VehicleError>;

    async fn set_mode(&self, mode: &str) -> Result<(), VehicleError>;

    /// Clear the locally staged command list.
    async fn clear_commands(&self) -> Result<(), VehicleError>;

    /// Append a command to the locally staged command list.
    async fn add_command(&self, command: &Command) -> Result<(), VehicleError>;

    /// Push the staged command list to the vehicle.
    async fn upload_commands(&self) -> Result<(), VehicleError>;

    /// Wait until the vehicle has acknowledged the uploaded command list.
    async fn wait_commands_ready(&self) -> Result<(), VehicleError>;

    /// Send the vehicle-specific mission-start directive.
    async fn send_start_message(&self, start_index: u16) -> Result<(), VehicleError>;

    /// Last known global position.
    fn current_position(&self) -> GeoPosition;

    /// Time since the last heartbeat was received.
    fn last_heartbeat_age(&self) -> Duration;

    fn subscribe_status_text(&self, callback: StatusTextCallback) -> SubscriptionId;

    fn unsubscribe(&self, id: SubscriptionId);
}

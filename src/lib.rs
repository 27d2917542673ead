//! start_verify - Mission verification engine for autopilot simulations
//!
//! Given a mission file and a live vehicle connection, this crate:
//! - parses the waypoint list into a [`Mission`]
//! - builds an [`Oracle`] predicting how many items the vehicle will report
//!   visiting and where it should stop, including per-vehicle quirks
//! - drives the vehicle through arming, upload, and AUTO mode, observes its
//!   status-text messages, and returns an [`ExecutionVerdict`]
//!
//! The pure mission logic lives in the `no_std` crate [`start_verify_core`];
//! this crate adds the async execution monitor, configuration, and logging.

pub mod logging;

pub mod config;
pub mod error;
pub mod loader;
pub mod monitor;
pub mod vehicle;

pub use config::VerifyConfig;
pub use error::{Result, VehicleError, VerifyError};
pub use loader::load_mission;
pub use logging::init_logging;
pub use monitor::{run, run_with_report, MonitorParams, MonitorStage, RunReport};
pub use vehicle::{StatusTextCallback, StatusTextEvent, SubscriptionId, VehicleConnection};

pub use start_verify_core;
pub use start_verify_core::{
    parse_mission, Command, CommandType, ExecutionVerdict, GeoPosition, HomePosition, Mission,
    Oracle, ParseError, VehicleKind, VerdictReason,
};

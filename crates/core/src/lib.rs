//! start_verify_core - Pure no_std logic for mission verification
//!
//! This crate contains the parts of the verification engine that never
//! touch a vehicle, a clock or a file: it can be tested on host without
//! any runtime.
//!
//! # Design Principles
//!
//! - **Pure no_std**: Only `core` and `alloc`
//! - **Immutable values**: Missions and oracles are built once and read thereafter
//! - **Policy tables**: Vehicle-specific behaviour lives in [`policy`], not inline
//!
//! # Modules
//!
//! - [`mission`]: Command/Mission model and the waypoint-list parser
//! - [`policy`]: Per-vehicle execution quirks
//! - [`oracle`]: Static derivation of the expected mission outcome
//! - [`geo`]: Distance between geographic positions
//! - [`status`]: Classification of vehicle status-text messages
//! - [`verdict`]: Verdict types and completion evaluation

#![no_std]

extern crate alloc;

pub mod geo;
pub mod mission;
pub mod oracle;
pub mod policy;
pub mod status;
pub mod verdict;

pub use geo::{distance_3d, haversine_distance, GeoPosition, HomePosition};
pub use mission::{
    parse_mission, Command, CommandType, Mission, ParseError, UnknownVehicleKind, VehicleKind,
};
pub use oracle::{Oracle, DEFAULT_MAX_END_DISTANCE_M};
pub use policy::VehiclePolicy;
pub use status::{classify_status_text, StatusTextKind};
pub use verdict::{evaluate_completion, CompletionEvaluation, ExecutionVerdict, VerdictReason};

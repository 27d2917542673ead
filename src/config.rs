//! Verification configuration
//!
//! TOML file describing the vehicle under test and how a run is monitored.
//! Every field has a default except `monitor.enable_land_workaround`, which
//! must always be chosen explicitly.
//!
//! ```toml
//! [vehicle]
//! kind = "ArduCopter"
//! home = [-35.362938, 149.165085, 584.0, 270.0]
//!
//! [monitor]
//! time_limit_secs = 300
//! speedup = 10.0
//! heartbeat_timeout_secs = 5
//! check_waypoints = true
//! enable_land_workaround = true
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use start_verify_core::{HomePosition, Mission, Oracle, VehicleKind};

use crate::error::{Result, VerifyError};
use crate::monitor::MonitorParams;

const MISSING_LAND_WORKAROUND: &str = "enable_land_workaround must be set explicitly";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyConfig {
    pub vehicle: VehicleSection,
    pub monitor: MonitorSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleSection {
    pub kind: VehicleKind,
    /// `[lat, lon, alt, heading]`
    pub home: [f64; 4],
}

impl Default for VehicleSection {
    fn default() -> Self {
        Self {
            kind: VehicleKind::Copter,
            // ArduPilot SITL default location (CMAC)
            home: [-35.363261, 149.165230, 584.0, 353.0],
        }
    }
}

impl VehicleSection {
    pub fn home_position(&self) -> HomePosition {
        let [lat, lon, alt, heading] = self.home;
        HomePosition::new(lat, lon, alt, heading)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorSection {
    pub time_limit_secs: u64,
    pub speedup: f64,
    pub heartbeat_timeout_secs: u64,
    pub check_waypoints: bool,
    /// No default: `validate()` rejects a config that leaves this unset
    pub enable_land_workaround: Option<bool>,
    /// Overrides the oracle's end-position tolerance when set
    pub max_end_distance_m: Option<f64>,
    pub armable_poll_ms: u64,
    pub arm_retry_ms: u64,
    pub status_poll_ms: u64,
}

impl Default for MonitorSection {
    fn default() -> Self {
        Self {
            time_limit_secs: 300,
            speedup: 1.0,
            heartbeat_timeout_secs: 5,
            check_waypoints: true,
            enable_land_workaround: None,
            max_end_distance_m: None,
            armable_poll_ms: 200,
            arm_retry_ms: 100,
            status_poll_ms: 200,
        }
    }
}

impl VerifyConfig {
    /// Load and validate a configuration file.
    pub async fn load(path: &Path) -> Result<Self> {
        let config = Self::read(path).await?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration file without validating it, so callers can
    /// apply overrides first.
    pub async fn read(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        Ok(toml::from_str(&content)?)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values for consistency.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        let monitor = &self.monitor;

        if monitor.time_limit_secs == 0 {
            errors.push("time_limit_secs must be greater than 0");
        }
        if !(monitor.speedup > 0.0 && monitor.speedup.is_finite()) {
            errors.push("speedup must be a positive number");
        }
        if monitor.heartbeat_timeout_secs == 0 {
            errors.push("heartbeat_timeout_secs must be greater than 0");
        }
        if monitor.enable_land_workaround.is_none() {
            errors.push(MISSING_LAND_WORKAROUND);
        }
        if monitor.armable_poll_ms == 0 || monitor.arm_retry_ms == 0 || monitor.status_poll_ms == 0
        {
            errors.push("poll intervals must be greater than 0");
        }
        if matches!(monitor.max_end_distance_m, Some(d) if d < 0.0 || d.is_nan()) {
            errors.push("max_end_distance_m must not be negative");
        }

        let [lat, lon, _, _] = self.vehicle.home;
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            errors.push("home latitude/longitude out of range");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(VerifyError::Config(errors.join("; ")))
        }
    }

    /// The explicitly configured LAND-on-ground workaround flag.
    pub fn land_workaround(&self) -> Result<bool> {
        self.monitor
            .enable_land_workaround
            .ok_or_else(|| VerifyError::Config(MISSING_LAND_WORKAROUND.to_string()))
    }

    pub fn monitor_params(&self) -> Result<MonitorParams> {
        let m = &self.monitor;
        let mut params = MonitorParams::new(
            Duration::from_secs(m.time_limit_secs),
            m.speedup,
            Duration::from_secs(m.heartbeat_timeout_secs),
            m.check_waypoints,
            self.land_workaround()?,
        );
        params.armable_poll = Duration::from_millis(m.armable_poll_ms);
        params.arm_retry = Duration::from_millis(m.arm_retry_ms);
        params.status_poll = Duration::from_millis(m.status_poll_ms);
        Ok(params)
    }

    /// Build the oracle for `mission` with the configured workaround flag
    /// and tolerance override.
    pub fn build_oracle(&self, mission: &Mission) -> Result<Oracle> {
        let oracle = Oracle::build(mission, self.land_workaround()?);
        Ok(match self.monitor.max_end_distance_m {
            Some(meters) => oracle.with_max_end_distance(meters),
            None => oracle,
        })
    }
}

impl TryFrom<&VerifyConfig> for MonitorParams {
    type Error = VerifyError;

    fn try_from(config: &VerifyConfig) -> Result<Self> {
        config.monitor_params()
    }
}

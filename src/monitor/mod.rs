//! Execution Monitor
//!
//! Drives one live mission run against a [`VehicleConnection`] and turns
//! the vehicle's status-text stream into an [`ExecutionVerdict`].
//!
//! # State Machine
//!
//! ```text
//! Idle -> WaitingArmable -> Arming -> Uploading -> Running
//!      -> Completed | VerificationFailed | Unresponsive | TimedOut
//! ```
//!
//! # Concurrency
//!
//! Single logical flow with cooperative polling. The status-text listener
//! may run concurrently with the polling loop; both share a
//! [`RunProgress`]. Timeouts and heartbeat loss are detected at polling
//! points, so detection latency is at most one poll interval.
//!
//! # Errors
//!
//! A run that concludes yields a verdict, pass or fail. Running out of
//! time is a [`VerifyError::TimedOut`], not a verdict: the observation
//! itself failed.

pub mod deadline;
pub mod progress;
pub mod subscription;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use start_verify_core::{
    evaluate_completion, ExecutionVerdict, GeoPosition, Mission, Oracle, VerdictReason,
};
use tokio::time::sleep;

use crate::error::{Result, VehicleError, VerifyError};
use crate::vehicle::{VehicleConnection, AUTO_MODE};
use crate::{log_debug, log_info, log_warn};

pub use deadline::{effective_time_limit, Deadline, SPEEDUP_STARTUP_ALLOWANCE};
pub use progress::{ProgressSnapshot, RunProgress};
pub use subscription::StatusTextSubscription;

/// Interval between armable queries.
pub const DEFAULT_ARMABLE_POLL: Duration = Duration::from_millis(200);

/// Interval between arm requests.
pub const DEFAULT_ARM_RETRY: Duration = Duration::from_millis(100);

/// Interval between completion/heartbeat/deadline checks while running.
pub const DEFAULT_STATUS_POLL: Duration = Duration::from_millis(200);

/// Stage of a monitoring run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonitorStage {
    #[default]
    Idle,
    WaitingArmable,
    Arming,
    Uploading,
    Running,
    Completed,
    TimedOut,
    Unresponsive,
    VerificationFailed,
}

impl MonitorStage {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::TimedOut | Self::Unresponsive | Self::VerificationFailed
        )
    }
}

impl fmt::Display for MonitorStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::WaitingArmable => "waiting for vehicle to become armable",
            Self::Arming => "arming",
            Self::Uploading => "uploading mission",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::TimedOut => "timed out",
            Self::Unresponsive => "unresponsive",
            Self::VerificationFailed => "verification failed",
        };
        f.write_str(name)
    }
}

/// Parameters of one monitoring run.
///
/// The LAND workaround flag has no default: the caller decides.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorParams {
    /// Mission time budget in simulated seconds
    pub time_limit: Duration,
    /// Simulation speed-up factor (1.0 = real time)
    pub speedup: f64,
    pub heartbeat_timeout: Duration,
    /// Require the oracle's visited-item count before checking the end position
    pub check_waypoints: bool,
    pub enable_land_workaround: bool,
    pub armable_poll: Duration,
    pub arm_retry: Duration,
    pub status_poll: Duration,
}

impl MonitorParams {
    pub fn new(
        time_limit: Duration,
        speedup: f64,
        heartbeat_timeout: Duration,
        check_waypoints: bool,
        enable_land_workaround: bool,
    ) -> Self {
        Self {
            time_limit,
            speedup,
            heartbeat_timeout,
            check_waypoints,
            enable_land_workaround,
            armable_poll: DEFAULT_ARMABLE_POLL,
            arm_retry: DEFAULT_ARM_RETRY,
            status_poll: DEFAULT_STATUS_POLL,
        }
    }
}

/// Verdict plus the observations it was based on.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub verdict: ExecutionVerdict,
    pub visited_waypoints: usize,
    pub expected_waypoints: usize,
    pub final_position: Option<GeoPosition>,
    pub distance_m: Option<f64>,
    pub elapsed: Duration,
}

enum Observation {
    Completed(ProgressSnapshot),
    Unresponsive(ProgressSnapshot),
}

/// Run `mission` on `conn` and judge it against `oracle`.
pub async fn run<C>(
    mission: &Mission,
    oracle: &Oracle,
    conn: &C,
    params: &MonitorParams,
) -> Result<ExecutionVerdict>
where
    C: VehicleConnection + ?Sized,
{
    run_with_report(mission, oracle, conn, params)
        .await
        .map(|report| report.verdict)
}

/// Like [`run`], also returning what was observed.
pub async fn run_with_report<C>(
    mission: &Mission,
    oracle: &Oracle,
    conn: &C,
    params: &MonitorParams,
) -> Result<RunReport>
where
    C: VehicleConnection + ?Sized,
{
    let mut monitor = MissionMonitor {
        mission,
        oracle,
        conn,
        params,
        stage: MonitorStage::Idle,
    };

    let result = monitor.execute().await;
    if let Err(VerifyError::TimedOut { limit, stage }) = &result {
        log_warn!("mission did not conclude within {:?} (stage: {})", limit, stage);
        monitor.transition(MonitorStage::TimedOut);
    }
    result
}

struct MissionMonitor<'a, C: VehicleConnection + ?Sized> {
    mission: &'a Mission,
    oracle: &'a Oracle,
    conn: &'a C,
    params: &'a MonitorParams,
    stage: MonitorStage,
}

impl<C: VehicleConnection + ?Sized> MissionMonitor<'_, C> {
    fn transition(&mut self, next: MonitorStage) {
        log_debug!("monitor: {} -> {}", self.stage, next);
        self.stage = next;
    }

    async fn execute(&mut self) -> Result<RunReport> {
        let limit = effective_time_limit(self.params.time_limit, self.params.speedup);
        if limit != self.params.time_limit {
            log_debug!(
                "adjusted time limit for speedup {}: {:?} -> {:?}",
                self.params.speedup,
                self.params.time_limit,
                limit
            );
        }
        log_debug!("using wall-clock time limit: {:?}", limit);

        if self.params.enable_land_workaround != self.oracle.land_workaround() {
            log_warn!(
                "LAND workaround is {} for this run but the oracle was built with it {}",
                on_off(self.params.enable_land_workaround),
                on_off(self.oracle.land_workaround())
            );
        }

        let deadline = Deadline::start(limit);

        self.transition(MonitorStage::WaitingArmable);
        self.wait_armable(&deadline).await?;

        self.transition(MonitorStage::Arming);
        self.arm(&deadline).await?;

        self.transition(MonitorStage::Uploading);
        self.upload(&deadline).await?;
        self.start_mission().await?;

        self.transition(MonitorStage::Running);
        let observation = self.observe(&deadline).await?;

        Ok(self.conclude(observation, &deadline))
    }

    async fn wait_armable(&mut self, deadline: &Deadline) -> Result<()> {
        log_debug!("waiting for vehicle to become armable");
        while !self.conn.is_armable().await? {
            deadline.check(self.stage)?;
            sleep(self.params.armable_poll).await;
        }
        log_debug!("vehicle is armable");
        Ok(())
    }

    async fn arm(&mut self, deadline: &Deadline) -> Result<()> {
        log_debug!("attempting to arm vehicle");
        self.conn.set_armed(true).await?;
        while !self.conn.is_armed().await? {
            deadline.check(self.stage)?;
            sleep(self.params.arm_retry).await;
            self.conn.set_armed(true).await?;
        }
        log_debug!("vehicle is armed");
        Ok(())
    }

    async fn upload(&mut self, deadline: &Deadline) -> Result<()> {
        self.conn.clear_commands().await?;
        for command in self.mission.commands() {
            self.conn.add_command(command).await?;
            crate::log_trace!("added command to list: {:?}", command);
        }

        log_debug!(
            "uploading {} commands from {}",
            self.mission.len(),
            self.mission.source_name()
        );
        deadline.bound(self.stage, self.conn.upload_commands()).await?;
        deadline
            .bound(self.stage, self.conn.wait_commands_ready())
            .await?;
        log_debug!("finished uploading mission to vehicle");

        if self.oracle.is_clamped() {
            log_warn!(
                "oracle predicted {} visited items; expecting 0 instead",
                self.oracle.raw_waypoint_count()
            );
        }
        log_debug!(
            "vehicle is expected to visit at least {} WPs",
            self.oracle.expected_waypoint_count()
        );
        Ok(())
    }

    async fn start_mission(&mut self) -> Result<()> {
        let start_index = u16::try_from(self.mission.len() + 1).map_err(|_| {
            VehicleError::Protocol(format!(
                "mission of {} commands exceeds the start index range",
                self.mission.len()
            ))
        })?;

        self.conn.set_mode(AUTO_MODE).await?;
        log_debug!("switched vehicle mode to {}", AUTO_MODE);
        self.conn.send_start_message(start_index).await?;
        log_debug!("sent mission start message (start index {})", start_index);
        Ok(())
    }

    async fn observe(&mut self, deadline: &Deadline) -> Result<Observation> {
        let progress = Arc::new(RunProgress::new(self.mission.vehicle().policy()));
        let _subscription = StatusTextSubscription::attach(self.conn, progress.clone());

        log_debug!("waiting for mission to terminate");
        loop {
            let snapshot = progress.snapshot();
            if snapshot.complete {
                return Ok(Observation::Completed(snapshot));
            }

            let age = self.conn.last_heartbeat_age();
            if age > self.params.heartbeat_timeout {
                log_debug!(
                    "vehicle became unresponsive (heartbeat age {:?}, timeout {:?})",
                    age,
                    self.params.heartbeat_timeout
                );
                return Ok(Observation::Unresponsive(snapshot));
            }

            deadline.check(self.stage)?;
            sleep(self.params.status_poll).await;
        }
    }

    fn conclude(&mut self, observation: Observation, deadline: &Deadline) -> RunReport {
        let expected = self.oracle.expected_waypoint_count();

        let (verdict, snapshot, final_position, distance_m) = match observation {
            Observation::Unresponsive(snapshot) => {
                self.transition(MonitorStage::Unresponsive);
                let verdict = ExecutionVerdict::failed(VerdictReason::Unresponsive);
                (verdict, snapshot, None, None)
            }
            Observation::Completed(snapshot) => {
                log_debug!(
                    "visited {} waypoints (expected >= {})",
                    snapshot.visited_waypoints,
                    expected
                );
                if !self.params.check_waypoints {
                    log_debug!("ignoring visited waypoints");
                }

                let final_position = snapshot
                    .final_position
                    .unwrap_or_else(|| self.conn.current_position());
                let evaluation = evaluate_completion(
                    self.oracle,
                    snapshot.visited_waypoints,
                    &final_position,
                    self.params.check_waypoints,
                );
                if let Some(distance) = evaluation.distance_m {
                    log_debug!(
                        "distance to expected end position: {:.3} m (max {:.3} m)",
                        distance,
                        self.oracle.max_end_distance_m()
                    );
                }

                self.transition(if evaluation.verdict.success {
                    MonitorStage::Completed
                } else {
                    MonitorStage::VerificationFailed
                });
                (
                    evaluation.verdict,
                    snapshot,
                    Some(final_position),
                    evaluation.distance_m,
                )
            }
        };

        log_info!("mission {}: {}", self.mission.source_name(), verdict);

        RunReport {
            verdict,
            visited_waypoints: snapshot.visited_waypoints,
            expected_waypoints: expected,
            final_position,
            distance_m,
            elapsed: deadline.elapsed(),
        }
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}

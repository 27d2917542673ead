//! Cooperative run deadline
//!
//! The time budget is an explicit value checked at every polling step.
//! Awaited vehicle calls that may block indefinitely are bounded by the
//! same instant.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use super::MonitorStage;
use crate::error::{Result, VehicleError, VerifyError};

/// Added to the scaled limit to absorb simulator startup time.
pub const SPEEDUP_STARTUP_ALLOWANCE: Duration = Duration::from_secs(10);

/// Wall-clock limit for a simulation running `speedup` times faster than real time.
///
/// Scaled limits are truncated to whole seconds.
pub fn effective_time_limit(time_limit: Duration, speedup: f64) -> Duration {
    if speedup > 1.0 {
        let scaled = (time_limit.as_secs_f64() / speedup).floor() as u64;
        Duration::from_secs(scaled) + SPEEDUP_STARTUP_ALLOWANCE
    } else {
        time_limit
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    started: Instant,
    limit: Duration,
}

impl Deadline {
    pub fn start(limit: Duration) -> Self {
        Self {
            started: Instant::now(),
            limit,
        }
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }

    pub fn expires_at(&self) -> Instant {
        self.started + self.limit
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at()
    }

    /// Fail with [`VerifyError::TimedOut`] once the limit has passed.
    pub fn check(&self, stage: MonitorStage) -> Result<()> {
        if self.is_expired() {
            Err(self.timed_out(stage))
        } else {
            Ok(())
        }
    }

    /// Await a vehicle call, giving up when the deadline expires.
    pub async fn bound<T, F>(&self, stage: MonitorStage, call: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, VehicleError>>,
    {
        match tokio::time::timeout_at(self.expires_at(), call).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(self.timed_out(stage)),
        }
    }

    fn timed_out(&self, stage: MonitorStage) -> VerifyError {
        VerifyError::TimedOut {
            limit: self.limit,
            stage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_speedup_keeps_limit() {
        let limit = Duration::from_secs(300);
        assert_eq!(effective_time_limit(limit, 1.0), limit);
        assert_eq!(effective_time_limit(limit, 0.5), limit);
    }

    #[test]
    fn test_speedup_scales_and_adds_allowance() {
        assert_eq!(
            effective_time_limit(Duration::from_secs(100), 10.0),
            Duration::from_secs(20)
        );
        // floor(95 / 4) = 23
        assert_eq!(
            effective_time_limit(Duration::from_secs(95), 4.0),
            Duration::from_secs(33)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_expires() {
        let deadline = Deadline::start(Duration::from_secs(2));
        assert!(deadline.check(MonitorStage::Running).is_ok());
        tokio::time::sleep(Duration::from_secs(2)).await;
        let err = deadline.check(MonitorStage::Arming).unwrap_err();
        assert!(matches!(
            err,
            VerifyError::TimedOut {
                stage: MonitorStage::Arming,
                ..
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_bound_times_out_pending_call() {
        let deadline = Deadline::start(Duration::from_secs(1));
        let pending = std::future::pending::<std::result::Result<(), VehicleError>>();
        let err = deadline.bound(MonitorStage::Uploading, pending).await.unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test(start_paused = true)]
    async fn test_bound_passes_vehicle_errors_through() {
        let deadline = Deadline::start(Duration::from_secs(1));
        let failing = async { Err::<(), _>(VehicleError::Disconnected) };
        let err = deadline.bound(MonitorStage::Uploading, failing).await.unwrap_err();
        assert!(matches!(err, VerifyError::Vehicle(VehicleError::Disconnected)));
    }
}

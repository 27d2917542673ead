//! Mission file loading

use std::path::Path;

use start_verify_core::{parse_mission, HomePosition, Mission, VehicleKind};

use crate::error::Result;
use crate::log_debug;

/// Read and parse a mission file.
///
/// The mission's source name is the path as given.
pub async fn load_mission(path: &Path, vehicle: VehicleKind, home: HomePosition) -> Result<Mission> {
    let text = tokio::fs::read_to_string(path).await?;
    let mission = parse_mission(&text, path.display().to_string(), vehicle, home)?;
    log_debug!(
        "loaded {} commands from {} for {}",
        mission.len(),
        mission.source_name(),
        vehicle
    );
    Ok(mission)
}

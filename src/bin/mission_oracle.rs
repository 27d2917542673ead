//! Print the oracle's prediction for a mission file.
//!
//! Usage:
//!   cargo run --bin mission_oracle -- --mission <FILE> [OPTIONS]
//!
//! Options:
//!   -m, --mission <FILE>     Mission file to analyse (required)
//!   -c, --config <FILE>      Verification config (TOML)
//!   --vehicle <KIND>         Vehicle kind, overrides the config
//!   --land-workaround        Stop counting at a LAND issued on the ground
//!   --no-land-workaround     Count items after a landing RTL
//!
//! The LAND workaround has no default: pass one of the two flags unless the
//! config file sets `monitor.enable_land_workaround`.
//!
//! Set `RUST_LOG` to adjust log output (default: `start_verify=info`).

use std::env;
use std::path::PathBuf;
use std::process;

use start_verify::{init_logging, load_mission, VehicleKind, VerifyConfig};

struct Args {
    mission: PathBuf,
    config: Option<PathBuf>,
    vehicle: Option<VehicleKind>,
    land_workaround: Option<bool>,
}

fn parse_args() -> Args {
    let mut mission = None;
    let mut config = None;
    let mut vehicle = None;
    let mut land_workaround = None;

    let raw: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < raw.len() {
        match raw[i].as_str() {
            "-m" | "--mission" => {
                i += 1;
                mission = Some(PathBuf::from(value_arg(&raw, i, "mission")));
            }
            "-c" | "--config" => {
                i += 1;
                config = Some(PathBuf::from(value_arg(&raw, i, "config")));
            }
            "--vehicle" => {
                i += 1;
                let value = value_arg(&raw, i, "vehicle");
                vehicle = Some(value.parse().unwrap_or_else(|_| {
                    eprintln!("Error: unknown vehicle kind: {value}");
                    process::exit(1);
                }));
            }
            "--land-workaround" => land_workaround = Some(true),
            "--no-land-workaround" => land_workaround = Some(false),
            "-h" | "--help" => {
                print_usage();
                process::exit(0);
            }
            other => {
                eprintln!("Unknown option: {other}");
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    let Some(mission) = mission else {
        eprintln!("Error: --mission is required");
        print_usage();
        process::exit(1);
    };

    Args {
        mission,
        config,
        vehicle,
        land_workaround,
    }
}

fn value_arg<'a>(raw: &'a [String], i: usize, name: &str) -> &'a str {
    raw.get(i).map(String::as_str).unwrap_or_else(|| {
        eprintln!("Error: --{name} requires a value");
        process::exit(1);
    })
}

fn print_usage() {
    eprintln!(
        "Usage: mission_oracle --mission <FILE> [OPTIONS]\n\
         \n\
         Options:\n\
         \x20 -m, --mission <FILE>     Mission file to analyse (required)\n\
         \x20 -c, --config <FILE>      Verification config (TOML)\n\
         \x20 --vehicle <KIND>         ArduCopter, ArduPlane or APMrover2\n\
         \x20 --land-workaround        Stop counting at a LAND issued on the ground\n\
         \x20 --no-land-workaround     Count items after a landing RTL\n\
         \x20 -h, --help               Show this help"
    );
}

async fn run(args: Args) -> start_verify::Result<()> {
    let mut config = match &args.config {
        Some(path) => VerifyConfig::read(path).await?,
        None => VerifyConfig::default(),
    };
    if let Some(kind) = args.vehicle {
        config.vehicle.kind = kind;
    }
    if let Some(enabled) = args.land_workaround {
        config.monitor.enable_land_workaround = Some(enabled);
    }
    config.validate()?;

    let mission = load_mission(
        &args.mission,
        config.vehicle.kind,
        config.vehicle.home_position(),
    )
    .await?;
    let oracle = config.build_oracle(&mission)?;

    let end = oracle.expected_end_position();
    println!("Mission:   {}", mission.source_name());
    println!("Vehicle:   {}", mission.vehicle());
    println!("Commands:  {}", mission.len());
    println!(
        "Expected:  {} waypoints{}",
        oracle.expected_waypoint_count(),
        if oracle.is_clamped() {
            format!(" (raw count {})", oracle.raw_waypoint_count())
        } else {
            String::new()
        }
    );
    println!(
        "End:       {:.6}, {:.6}, {:.1} m (tolerance {:.1} m)",
        end.lat_deg,
        end.lon_deg,
        end.alt_m,
        oracle.max_end_distance_m()
    );
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_logging("start_verify=info");

    if let Err(e) = run(parse_args()).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

//! Waypoint-list parser
//!
//! Turns the raw text of a mission file into a [`Mission`]. Each record
//! after the header line has the layout
//!
//! ```text
//! index current frame command p1 p2 p3 p4 x y z [autocontinue ...]
//! ```
//!
//! The first 11 fields are required. `current` is never read and anything
//! after `z` (usually the autocontinue flag) is ignored.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use heapless::Vec as FieldBuf;

use super::{Command, Mission, VehicleKind};
use crate::geo::{GeoPosition, HomePosition};

/// Number of fields every record must carry.
pub const REQUIRED_FIELDS: usize = 11;

const FIELD_NAMES: [&str; REQUIRED_FIELDS] = [
    "index",
    "current",
    "frame",
    "command",
    "param1",
    "param2",
    "param3",
    "param4",
    "x",
    "y",
    "z",
];

/// Malformed mission file. No partial mission is ever returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Input contained no header line
    MissingHeader,
    /// Record has fewer than the required number of fields
    MissingFields { line: usize, found: usize },
    /// Integer field could not be parsed (or is out of range)
    InvalidInteger { line: usize, field: &'static str },
    /// Floating point field could not be parsed
    InvalidFloat { line: usize, field: &'static str },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::MissingHeader => write!(f, "Mission file is empty (no header line)"),
            ParseError::MissingFields { line, found } => write!(
                f,
                "Line {}: expected at least {} fields, found {}",
                line, REQUIRED_FIELDS, found
            ),
            ParseError::InvalidInteger { line, field } => {
                write!(f, "Line {}: field '{}' is not a valid integer", line, field)
            }
            ParseError::InvalidFloat { line, field } => {
                write!(f, "Line {}: field '{}' is not a valid number", line, field)
            }
        }
    }
}

impl core::error::Error for ParseError {}

/// Parse one command record.
///
/// `line` is the 1-based line number used in error reports.
pub fn parse_command(record: &str, line: usize) -> Result<Command, ParseError> {
    let mut fields: FieldBuf<&str, REQUIRED_FIELDS> = FieldBuf::new();
    for field in record.split_whitespace() {
        if fields.push(field).is_err() {
            break;
        }
    }

    if fields.len() < REQUIRED_FIELDS {
        return Err(ParseError::MissingFields {
            line,
            found: fields.len(),
        });
    }

    let invalid_int = |i: usize| ParseError::InvalidInteger {
        line,
        field: FIELD_NAMES[i],
    };
    let int = |i: usize| fields[i].parse::<i64>().map_err(|_| invalid_int(i));
    let float = |i: usize| {
        fields[i].parse::<f64>().map_err(|_| ParseError::InvalidFloat {
            line,
            field: FIELD_NAMES[i],
        })
    };

    let seq = u16::try_from(int(0)?).map_err(|_| invalid_int(0))?;
    let frame = u8::try_from(int(2)?).map_err(|_| invalid_int(2))?;
    let command_id = u16::try_from(int(3)?).map_err(|_| invalid_int(3))?;

    let mut params = [0.0f64; 4];
    for (slot, i) in params.iter_mut().zip(4..8) {
        *slot = float(i)?;
    }
    let target = GeoPosition::new(float(8)?, float(9)?, float(10)?);

    Ok(Command::new(seq, frame, command_id, params, target))
}

/// Parse the full text of a mission file.
///
/// The first line is a header and is discarded; blank lines are skipped.
pub fn parse_mission(
    text: &str,
    source_name: impl Into<String>,
    vehicle: VehicleKind,
    home: HomePosition,
) -> Result<Mission, ParseError> {
    let mut lines = text.lines();
    if lines.next().is_none() {
        return Err(ParseError::MissingHeader);
    }

    let mut commands = Vec::new();
    for (offset, raw) in lines.enumerate() {
        let record = raw.trim();
        if record.is_empty() {
            continue;
        }
        // Header is line 1
        commands.push(parse_command(record, offset + 2)?);
    }

    Ok(Mission::new(source_name, vehicle, commands, home))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mission::CommandType;

    const SAMPLE: &str = "QGC WPL 110\n\
        0\t1\t0\t16\t0\t0\t0\t0\t-35.363261\t149.165230\t584.090000\t1\n\
        1\t0\t3\t22\t0.0\t0.0\t0.0\t0.0\t-35.361354\t149.163765\t20.000000\t1\n\
        2\t0\t3\t16\t0.0\t0.0\t0.0\t0.0\t-35.364114\t149.166022\t30.000000\t1\n\
        \n\
        3\t0\t3\t20\t0.0\t0.0\t0.0\t0.0\t0.0\t0.0\t0.0\t1\n";

    fn home() -> HomePosition {
        HomePosition::new(-35.363261, 149.165230, 584.0, 353.0)
    }

    #[test]
    fn test_parse_sample_mission() {
        let mission = parse_mission(SAMPLE, "sample.wpl", VehicleKind::Copter, home()).unwrap();
        assert_eq!(mission.len(), 4);
        assert_eq!(mission.source_name(), "sample.wpl");
        assert_eq!(mission.commands()[0].command_type(), CommandType::Waypoint);
        assert_eq!(mission.commands()[1].command_type(), CommandType::Other(22));
        assert_eq!(mission.commands()[3].command_type(), CommandType::ReturnToLaunch);
        assert_eq!(mission.commands()[2].frame, 3);
        assert!((mission.commands()[2].target.lat_deg - (-35.364114)).abs() < 1e-9);
        assert_eq!(mission.commands()[2].target.alt_m, 30.0);
    }

    #[test]
    fn test_parse_is_idempotent() {
        let a = parse_mission(SAMPLE, "sample.wpl", VehicleKind::Plane, home()).unwrap();
        let b = parse_mission(SAMPLE, "sample.wpl", VehicleKind::Plane, home()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_header_only_is_empty_mission() {
        let mission = parse_mission("QGC WPL 110\n", "empty", VehicleKind::Rover, home()).unwrap();
        assert!(mission.is_empty());
    }

    #[test]
    fn test_empty_input_is_error() {
        let err = parse_mission("", "none", VehicleKind::Rover, home()).unwrap_err();
        assert_eq!(err, ParseError::MissingHeader);
    }

    #[test]
    fn test_autocontinue_is_optional() {
        let cmd = parse_command("4 0 3 16 1 2 3 4 10.5 20.5 30", 5).unwrap();
        assert_eq!(cmd.seq, 4);
        assert_eq!(cmd.params, [1.0, 2.0, 3.0, 4.0]);
        assert_eq!(cmd.target, GeoPosition::new(10.5, 20.5, 30.0));
    }

    #[test]
    fn test_flags_are_discarded() {
        let cmd = parse_command("0 1 0 16 0 0 0 0 1 2 3 1", 2).unwrap();
        assert_eq!(cmd.current(), 0);
        assert_eq!(cmd.autocontinue(), 0);
    }

    #[test]
    fn test_flags_are_not_parsed() {
        let cmd = parse_command("0 1.0 3 16 0 0 0 0 1 2 3 1.0", 2).unwrap();
        assert_eq!(cmd.frame, 3);
        assert_eq!(cmd.target, GeoPosition::new(1.0, 2.0, 3.0));

        let cmd = parse_command("0 yes 3 16 0 0 0 0 1 2 3 no", 2).unwrap();
        assert_eq!(cmd.current(), 0);
    }

    #[test]
    fn test_params_keep_full_precision() {
        let cmd = parse_command("0 0 3 16 123456789.123 0 0 0 1 2 3", 2).unwrap();
        assert_eq!(cmd.params[0], 123456789.123);
    }

    #[test]
    fn test_missing_fields() {
        let err = parse_command("0 0 3 16 0 0 0 0 1 2", 7).unwrap_err();
        assert_eq!(err, ParseError::MissingFields { line: 7, found: 10 });
    }

    #[test]
    fn test_trailing_fields_are_ignored() {
        let cmd = parse_command("0 0 3 16 0 0 0 0 1 2 3 1 0", 3).unwrap();
        assert_eq!(cmd.target, GeoPosition::new(1.0, 2.0, 3.0));

        let cmd = parse_command("5 0 3 20 0 0 0 0 0 0 0 1 x y z", 3).unwrap();
        assert_eq!(cmd.seq, 5);
        assert_eq!(cmd.command_type(), crate::mission::CommandType::ReturnToLaunch);
    }

    #[test]
    fn test_frame_must_be_integer() {
        let err = parse_command("0 0 3.5 16 0 0 0 0 1 2 3", 2).unwrap_err();
        assert_eq!(err, ParseError::InvalidInteger { line: 2, field: "frame" });
    }

    #[test]
    fn test_command_out_of_range() {
        let err = parse_command("0 0 3 70000 0 0 0 0 1 2 3", 2).unwrap_err();
        assert_eq!(err, ParseError::InvalidInteger { line: 2, field: "command" });
    }

    #[test]
    fn test_invalid_float() {
        let err = parse_command("0 0 3 16 0 abc 0 0 1 2 3", 2).unwrap_err();
        assert_eq!(err, ParseError::InvalidFloat { line: 2, field: "param2" });
    }

    #[test]
    fn test_error_line_numbers_skip_blank_lines() {
        let text = "QGC WPL 110\n0 0 3 16 0 0 0 0 1 2 3\n\nbroken\n";
        let err = parse_mission(text, "bad", VehicleKind::Plane, home()).unwrap_err();
        assert_eq!(err, ParseError::MissingFields { line: 4, found: 1 });
    }

    #[test]
    fn test_error_display() {
        let err = ParseError::InvalidFloat { line: 3, field: "x" };
        assert_eq!(alloc::format!("{}", err), "Line 3: field 'x' is not a valid number");
    }
}

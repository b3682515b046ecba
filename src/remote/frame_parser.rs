//! Parser for the one-line remote report format.
//!
//! ```text
//! <14-char button-flags> <LX> <LY> <RX> <RY> <HAT>
//! ```
//!
//! Flag columns are A,B,X,Y,L,R,ZL,ZR,MINUS,PLUS,LCLICK,RCLICK,HOME,CAPTURE;
//! a '1' presses the button, anything else leaves it released. A short flags
//! token simply leaves the trailing buttons released. The stick values are
//! decimal 0-255, the hat 0-8.

use thiserror::Error;

use crate::report::{buttons, Hat, PadReport};

/// Why a remote line was dropped.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RemoteParseError {
    #[error("Line is missing fields (want flags + 5 values)")]
    MissingFields,

    #[error("Invalid numeric field '{0}'")]
    InvalidNumber(String),

    #[error("Hat value {0} out of range (0-8)")]
    HatOutOfRange(u8),
}

fn parse_u8(token: &str) -> Result<u8, RemoteParseError> {
    token
        .parse::<u8>()
        .map_err(|_| RemoteParseError::InvalidNumber(token.to_string()))
}

/// Parses one assembled line into a report.
///
/// Extra trailing fields are ignored; any other shape mismatch drops the
/// line without touching the published slot.
pub fn parse_line(line: &str) -> Result<PadReport, RemoteParseError> {
    let mut fields = line.split_whitespace();

    let flags = fields.next().ok_or(RemoteParseError::MissingFields)?;
    let mut mask: u16 = 0;
    for (bit, flag) in flags.chars().take(buttons::COUNT).enumerate() {
        if flag == '1' {
            mask |= 1 << bit;
        }
    }

    let mut next_value = || -> Result<u8, RemoteParseError> {
        parse_u8(fields.next().ok_or(RemoteParseError::MissingFields)?)
    };

    let lx = next_value()?;
    let ly = next_value()?;
    let rx = next_value()?;
    let ry = next_value()?;
    let hat_value = next_value()?;
    let hat = Hat::from_byte(hat_value).ok_or(RemoteParseError::HatOutOfRange(hat_value))?;

    Ok(PadReport {
        buttons: mask,
        lx,
        ly,
        rx,
        ry,
        hat,
    })
}

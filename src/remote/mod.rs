//! Remote control: one report per text line, delivered over a byte channel.
//!
//! Bytes from the serial driver are assembled into CR-terminated lines,
//! parsed into [`RemoteFrame`]s and published into a single-slot watch
//! channel. The sequencer only ever sees the latest fully-published frame;
//! intermediate frames are overwritten without queueing.

pub mod frame_parser;
pub mod line_assembler;
pub mod remote_handle;

pub use frame_parser::{parse_line, RemoteParseError};
pub use line_assembler::{LineAssembler, LINE_CAPACITY};
pub use remote_handle::RemoteHandle;

use chrono::{DateTime, Local};

use crate::report::PadReport;

/// The latest successfully parsed remote report, stamped on arrival.
#[derive(Clone, Debug)]
pub struct RemoteFrame {
    pub report: PadReport,
    pub received_at: DateTime<Local>,
}

impl Default for RemoteFrame {
    fn default() -> Self {
        Self {
            report: PadReport::neutral(),
            received_at: Local::now(),
        }
    }
}

//! Interface boundary to the transport collaborator.
//!
//! The transport layer (device enumeration, endpoint setup, the actual
//! exchange with the host) lives outside this crate. What crosses the
//! boundary per poll cycle: one outbound [`PadReport`], wire-encoded as
//! below, and one inbound [`HostFrame`] that the core receives and
//! discards.

use crate::report::PadReport;

/// Outbound report size on the wire.
pub const REPORT_WIRE_LEN: usize = 7;

/// Raw host-originated report delivered by the transport, one per poll
/// cycle. The core drains these without interpreting them.
#[derive(Clone, Debug, Default)]
pub struct HostFrame {
    pub data: Vec<u8>,
}

/// Wire layout: button mask (little endian), LX, LY, RX, RY, hat.
pub fn encode_report(report: &PadReport) -> [u8; REPORT_WIRE_LEN] {
    let [buttons_lo, buttons_hi] = report.buttons.to_le_bytes();
    [
        buttons_lo,
        buttons_hi,
        report.lx,
        report.ly,
        report.rx,
        report.ry,
        report.hat.as_byte(),
    ]
}

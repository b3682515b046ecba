//! The report sequencer core: one owned state object, one operation per
//! poll cycle.
//!
//! Every call to [`ReportSequencer::produce_next_report`] starts from the
//! neutral report and either advances the active macro program, relays the
//! latest remote frame, or idles. The lifecycle phase only ever moves
//! forward; once Done, every call returns neutral.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, trace};

use crate::macros::{self, MacroId};
use crate::remote::RemoteFrame;
use crate::report::PadReport;
use crate::sequencer::playback::{PlaybackCursor, StepOutcome};
use crate::transport::HostFrame;

/// Lifecycle phase, monotonic from Init to Done.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Init,
    Sync,
    Process,
    Cleanup,
    Done,
}

/// Active report source while in the Process phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PadMode {
    /// Emit neutral reports only.
    Idle,
    /// Drive the A-mashing table.
    MashA,
    /// Drive the date-skip watt farming table.
    WattFarm,
    /// Watt farming with the ID-lottery detour.
    IdWattFarm,
    /// Echo the latest parsed remote frame.
    RemoteRelay,
}

impl PadMode {
    /// The macro behind this mode, if it is table-driven.
    fn macro_id(self) -> Option<MacroId> {
        match self {
            PadMode::MashA => Some(MacroId::MashA),
            PadMode::WattFarm => Some(MacroId::WattFarm),
            PadMode::IdWattFarm => Some(MacroId::IdWattFarm),
            PadMode::Idle | PadMode::RemoteRelay => None,
        }
    }
}

impl std::fmt::Display for PadMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PadMode::Idle => write!(f, "Idle"),
            PadMode::MashA => write!(f, "MashA"),
            PadMode::WattFarm => write!(f, "WattFarm"),
            PadMode::IdWattFarm => write!(f, "IdWattFarm"),
            PadMode::RemoteRelay => write!(f, "RemoteRelay"),
        }
    }
}

/// Sequencer behaviour knobs, split out of [`crate::config::PadConfig`].
#[derive(Clone, Debug)]
pub struct SequencerSettings {
    /// Play the sync warm-up table before entering Process.
    pub use_sync: bool,
    /// Consecutive cycles a single remote frame is replayed before it goes
    /// stale.
    pub relay_hold_max: u8,
    /// Mode selected when the Process phase begins.
    pub startup_mode: PadMode,
}

impl Default for SequencerSettings {
    fn default() -> Self {
        Self {
            use_sync: true,
            relay_hold_max: 5,
            startup_mode: PadMode::MashA,
        }
    }
}

/// The core state machine. Single writer: the engine poll loop.
pub struct ReportSequencer {
    settings: SequencerSettings,
    phase: Phase,
    mode: PadMode,
    cursor: PlaybackCursor,
    last_report: PadReport,
    relay_count: u8,
    remote_rx: watch::Receiver<RemoteFrame>,
}

impl ReportSequencer {
    pub fn new(settings: SequencerSettings, remote_rx: watch::Receiver<RemoteFrame>) -> Self {
        info!("Creating report sequencer with settings: {:?}", settings);
        let mode = settings.startup_mode;
        Self {
            settings,
            phase: Phase::Init,
            mode,
            cursor: PlaybackCursor::new(),
            last_report: PadReport::neutral(),
            relay_count: 0,
            remote_rx,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn mode(&self) -> PadMode {
        self.mode
    }

    /// Produces the outbound report for this poll cycle. Never blocks,
    /// always returns a fully-populated report.
    pub fn produce_next_report(&mut self) -> PadReport {
        let mut report = PadReport::neutral();

        match self.phase {
            Phase::Init => {
                // Step 0 plus the sentinel bound, so the first table use
                // reloads its real length.
                self.cursor.reset();
                self.phase = if self.settings.use_sync {
                    Phase::Sync
                } else {
                    Phase::Process
                };
                debug!("Sequencer initialized, entering {:?}", self.phase);
            }

            Phase::Sync => {
                let outcome =
                    self.cursor
                        .advance(&macros::SYNC, 1, &mut self.last_report, &mut report);
                if outcome == StepOutcome::Exhausted {
                    info!("Sync sequence finished, entering Process");
                    self.phase = Phase::Process;
                }
            }

            Phase::Process => match self.mode {
                PadMode::Idle => {}

                PadMode::MashA | PadMode::WattFarm | PadMode::IdWattFarm => {
                    // Table-driven modes share one cursor, like the modes
                    // share one report stream.
                    if let Some(id) = self.mode.macro_id() {
                        self.cursor.advance(
                            id.program(),
                            id.hold_scale(),
                            &mut self.last_report,
                            &mut report,
                        );
                    }
                }

                PadMode::RemoteRelay => {
                    if self.relay_count < self.settings.relay_hold_max {
                        report = self.remote_rx.borrow().report;
                        self.relay_count += 1;
                    }
                    // Past the cap the frame is stale: stay neutral until a
                    // new line re-triggers the relay.
                }
            },

            Phase::Cleanup => {
                self.phase = Phase::Done;
                debug!("Cleanup finished, sequencer done");
            }

            Phase::Done => {
                // Terminal. The completion signal (lights/sound) lives with
                // the transport collaborator; nothing to do here.
            }
        }

        report
    }

    /// Caller-side relay policy: if the remote task published a new frame
    /// since the last cycle, switch to RemoteRelay and start a fresh relay
    /// window.
    pub fn poll_remote(&mut self) {
        if self.remote_rx.has_changed().unwrap_or(false) {
            let received_at = self.remote_rx.borrow_and_update().received_at;
            trace!(%received_at, "New remote frame");
            self.trigger_remote_relay();
        }
    }

    /// Switches to RemoteRelay with the relay counter reset.
    pub fn trigger_remote_relay(&mut self) {
        if self.mode != PadMode::RemoteRelay {
            debug!(from = %self.mode, "Switching to remote relay");
        }
        self.mode = PadMode::RemoteRelay;
        self.relay_count = 0;
    }

    pub fn set_mode(&mut self, mode: PadMode) {
        if self.mode != mode {
            info!(from = %self.mode, to = %mode, "Mode change");
        }
        self.mode = mode;
    }

    /// Requests the end-of-run phase. Ignored once Cleanup or Done has been
    /// reached; the phase never moves backwards.
    pub fn request_cleanup(&mut self) {
        match self.phase {
            Phase::Init | Phase::Sync | Phase::Process => {
                info!("Cleanup requested");
                self.phase = Phase::Cleanup;
            }
            Phase::Cleanup | Phase::Done => {}
        }
    }

    /// Host-originated report, one per poll cycle. Received and abandoned;
    /// reserved as an extension point.
    pub fn handle_host_frame(&mut self, frame: HostFrame) {
        trace!(len = frame.data.len(), "Discarding host frame");
    }
}

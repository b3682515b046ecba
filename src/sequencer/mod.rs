//! Report sequencing: the state machine that decides, once per poll cycle,
//! which controller report goes out next.
//!
//! The [`ReportSequencer`] is the core; [`engine`] wraps it in a statum
//! lifecycle and a tokio task driven by the poll interval.
//!
//! ```text
//! Init ──► Sync ──► Process ──► Cleanup ──► Done
//!            │         │
//!      (skippable)  Idle | MashA | WattFarm | IdWattFarm | RemoteRelay
//! ```

pub mod engine;
pub mod error;
pub mod playback;
pub mod report_sequencer;

pub use engine::{PadEngine, PadEngineHandle, PadEngineState};
pub use error::SequencerError;
pub use playback::{PlaybackCursor, StepOutcome};
pub use report_sequencer::{PadMode, Phase, ReportSequencer, SequencerSettings};

//! Compiled-in macro programs for the report sequencer.
//!
//! A program is a fixed, ordered table of (command, hold) steps. Hold counts
//! are poll cycles; the farm programs were authored against a 3x faster tick
//! and carry a per-macro hold scale to stretch them to the real cadence.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::report::PadCommand;

/// One table entry: a command and the number of poll cycles it is held
/// after its initial application.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Step {
    pub command: PadCommand,
    pub hold: u32,
}

const fn step(command: PadCommand, hold: u32) -> Step {
    Step { command, hold }
}

/// A named, immutable command table.
#[derive(Clone, Copy, Debug)]
pub struct Program {
    name: &'static str,
    steps: &'static [Step],
}

impl Program {
    pub const fn new(name: &'static str, steps: &'static [Step]) -> Self {
        Self { name, steps }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn step(&self, index: usize) -> Option<Step> {
        self.steps.get(index).copied()
    }

    /// Total poll cycles for one full pass, hold replays included.
    pub fn cycle_len(&self, scale: u32) -> u64 {
        self.steps
            .iter()
            .map(|s| u64::from(s.hold) * u64::from(scale) + 1)
            .sum()
    }

    /// An empty table would leave the sequencer without a current step;
    /// rejected before the engine starts.
    pub fn validate(&self) -> Result<(), MacroError> {
        if self.is_empty() {
            return Err(MacroError::EmptyProgram(self.name));
        }
        Ok(())
    }
}

/// Errors raised while validating the compiled-in tables.
#[derive(Debug, Error)]
pub enum MacroError {
    #[error("Macro program '{0}' has no steps")]
    EmptyProgram(&'static str),
}

/// Identifier for the selectable macro programs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MacroId {
    MashA,
    WattFarm,
    IdWattFarm,
}

impl MacroId {
    /// The command table driven by this macro.
    pub fn program(self) -> &'static Program {
        match self {
            MacroId::MashA => &MASH_A,
            MacroId::WattFarm => &WATT_FARM,
            MacroId::IdWattFarm => &ID_WATT_FARM,
        }
    }

    /// Hold multiplier for this macro's table.
    ///
    /// The farm tables assume the historical 3x faster tick, so every hold is
    /// stretched by 3; mashing was authored against the real cadence.
    pub fn hold_scale(self) -> u32 {
        match self {
            MacroId::MashA => 1,
            MacroId::WattFarm => 3,
            MacroId::IdWattFarm => 3,
        }
    }
}

impl std::fmt::Display for MacroId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MacroId::MashA => write!(f, "MashA"),
            MacroId::WattFarm => write!(f, "WattFarm"),
            MacroId::IdWattFarm => write!(f, "IdWattFarm"),
        }
    }
}

/// Warm-up played once before real input: two trigger presses and an A press
/// with long rests, driving the host through pad registration.
pub const SYNC: Program = Program::new(
    "sync",
    &[
        step(PadCommand::Nothing, 250),
        step(PadCommand::Triggers, 5),
        step(PadCommand::Nothing, 150),
        step(PadCommand::Triggers, 5),
        step(PadCommand::Nothing, 150),
        step(PadCommand::A, 5),
        step(PadCommand::Nothing, 250),
    ],
);

/// Press A, release, repeat.
pub const MASH_A: Program = Program::new(
    "mash_a",
    &[step(PadCommand::A, 5), step(PadCommand::Nothing, 5)],
);

/// Date-skip watt collection: talk to the den, hop to system settings,
/// advance the date by one day, return and collect again.
pub const WATT_FARM: Program = Program::new(
    "watt_farm",
    &[
        // Collect watts and dismiss the dialog
        step(PadCommand::A, 5),
        step(PadCommand::Nothing, 30),
        step(PadCommand::A, 5),
        step(PadCommand::Nothing, 30),
        step(PadCommand::B, 5),
        step(PadCommand::Nothing, 30),
        // To the home menu and into system settings
        step(PadCommand::Home, 5),
        step(PadCommand::Nothing, 25),
        step(PadCommand::Down, 5),
        step(PadCommand::Right, 5),
        step(PadCommand::Right, 5),
        step(PadCommand::Right, 5),
        step(PadCommand::Right, 5),
        step(PadCommand::A, 5),
        step(PadCommand::Nothing, 25),
        // System -> Date and Time
        step(PadCommand::Down, 40),
        step(PadCommand::A, 5),
        step(PadCommand::Nothing, 10),
        step(PadCommand::Down, 5),
        step(PadCommand::Down, 5),
        step(PadCommand::A, 5),
        step(PadCommand::Nothing, 10),
        // Bump the day forward and confirm
        step(PadCommand::Right, 5),
        step(PadCommand::Right, 5),
        step(PadCommand::Up, 5),
        step(PadCommand::Right, 20),
        step(PadCommand::A, 5),
        step(PadCommand::Nothing, 10),
        // Back into the game
        step(PadCommand::Home, 5),
        step(PadCommand::Nothing, 15),
        step(PadCommand::Home, 5),
        step(PadCommand::Nothing, 25),
    ],
);

/// Watt collection with the ID-lottery detour: same date skip, plus a
/// mashing segment that walks the lottery dialogs before collecting.
pub const ID_WATT_FARM: Program = Program::new(
    "id_watt_farm",
    &[
        // Lottery terminal: mash through the dialog chain
        step(PadCommand::A, 5),
        step(PadCommand::Nothing, 25),
        step(PadCommand::A, 5),
        step(PadCommand::Nothing, 25),
        step(PadCommand::B, 5),
        step(PadCommand::Nothing, 50),
        step(PadCommand::B, 5),
        step(PadCommand::Nothing, 25),
        // Collect watts at the den
        step(PadCommand::A, 5),
        step(PadCommand::Nothing, 30),
        step(PadCommand::A, 5),
        step(PadCommand::Nothing, 30),
        step(PadCommand::B, 5),
        step(PadCommand::Nothing, 30),
        // Date skip, same route as the plain watt farm
        step(PadCommand::Home, 5),
        step(PadCommand::Nothing, 25),
        step(PadCommand::Down, 5),
        step(PadCommand::Right, 5),
        step(PadCommand::Right, 5),
        step(PadCommand::Right, 5),
        step(PadCommand::Right, 5),
        step(PadCommand::A, 5),
        step(PadCommand::Nothing, 25),
        step(PadCommand::Down, 40),
        step(PadCommand::A, 5),
        step(PadCommand::Nothing, 10),
        step(PadCommand::Down, 5),
        step(PadCommand::Down, 5),
        step(PadCommand::A, 5),
        step(PadCommand::Nothing, 10),
        step(PadCommand::Right, 5),
        step(PadCommand::Right, 5),
        step(PadCommand::Up, 5),
        step(PadCommand::Right, 20),
        step(PadCommand::A, 5),
        step(PadCommand::Nothing, 10),
        step(PadCommand::Home, 5),
        step(PadCommand::Nothing, 15),
        step(PadCommand::Home, 5),
        step(PadCommand::Nothing, 25),
    ],
);

/// Validates every compiled-in table. Called once during engine
/// configuration; a failure here is a build mistake, not a runtime
/// condition.
pub fn validate_programs() -> Result<(), MacroError> {
    SYNC.validate()?;
    MASH_A.validate()?;
    WATT_FARM.validate()?;
    ID_WATT_FARM.validate()?;
    debug!("All macro programs validated");
    Ok(())
}

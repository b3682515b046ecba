//! Pure mapping from symbolic pad commands to report mutations.
//!
//! Cardinal directions move exactly one left-stick axis to its limit,
//! diagonals move both, button commands OR their bit into the mask and
//! `Nothing` forces the whole report back to neutral. The enum is closed, so
//! there is no unknown-token path at runtime; `Nothing` doubles as the
//! fail-safe reset.

use serde::{Deserialize, Serialize};

use super::{buttons, PadReport, STICK_MAX, STICK_MIN};

/// Symbolic button/direction command as stored in the macro tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PadCommand {
    Up,
    Down,
    Left,
    Right,
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
    A,
    B,
    X,
    Y,
    L,
    R,
    /// Both shoulder buttons at once, used by the sync sequence.
    Triggers,
    Plus,
    Minus,
    Home,
    /// Reset everything to neutral and do nothing else.
    Nothing,
}

/// Applies `command` to `report` in place.
///
/// Only the fields named by the command are touched; everything else keeps
/// whatever value the report already had.
pub fn apply_command(command: PadCommand, report: &mut PadReport) {
    match command {
        PadCommand::Up => report.ly = STICK_MIN,
        PadCommand::Down => report.ly = STICK_MAX,
        PadCommand::Left => report.lx = STICK_MIN,
        PadCommand::Right => report.lx = STICK_MAX,
        PadCommand::UpLeft => {
            report.lx = STICK_MIN;
            report.ly = STICK_MIN;
        }
        PadCommand::UpRight => {
            report.lx = STICK_MAX;
            report.ly = STICK_MIN;
        }
        PadCommand::DownLeft => {
            report.lx = STICK_MIN;
            report.ly = STICK_MAX;
        }
        PadCommand::DownRight => {
            report.lx = STICK_MAX;
            report.ly = STICK_MAX;
        }
        PadCommand::A => report.buttons |= buttons::A,
        PadCommand::B => report.buttons |= buttons::B,
        PadCommand::X => report.buttons |= buttons::X,
        PadCommand::Y => report.buttons |= buttons::Y,
        PadCommand::L => report.buttons |= buttons::L,
        PadCommand::R => report.buttons |= buttons::R,
        PadCommand::Triggers => report.buttons |= buttons::L | buttons::R,
        PadCommand::Plus => report.buttons |= buttons::PLUS,
        PadCommand::Minus => report.buttons |= buttons::MINUS,
        PadCommand::Home => report.buttons |= buttons::HOME,
        PadCommand::Nothing => report.reset(),
    }
}

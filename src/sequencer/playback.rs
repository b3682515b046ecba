//! Step-and-hold playback over a command table.
//!
//! The cursor owns the table position, the hold target of the current step
//! and the hold counter that increments once per poll cycle. Each call
//! either replays the retained last report, fetches the next step, or wraps
//! back to the start of the table with a single neutral report.

use tracing::trace;

use crate::macros::Program;
use crate::report::{apply_command, PadReport};

/// Step bound that cannot match any real table, forcing a reload of the
/// bound from the active program on first use.
const STEP_BOUND_SENTINEL: usize = usize::MAX;

/// Result of advancing playback by one poll cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// A report was produced; the table has not wrapped.
    Running,
    /// The table wrapped; the produced report is the neutral wrap report.
    Exhausted,
}

/// Cursor into the active program.
#[derive(Clone, Debug)]
pub struct PlaybackCursor {
    step_index: usize,
    step_bound: usize,
    hold_target: u32,
    hold_count: u32,
}

impl PlaybackCursor {
    pub fn new() -> Self {
        Self {
            step_index: 0,
            step_bound: STEP_BOUND_SENTINEL,
            hold_target: 0,
            hold_count: 0,
        }
    }

    /// Back to step 0 with the sentinel bound, as done when entering the
    /// Init phase.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Advances playback by one poll cycle.
    ///
    /// `out` must arrive neutral-initialized; `last` is the report retained
    /// from the previous cycle and is updated whenever a new report is
    /// produced. `scale` stretches every hold in the table.
    pub fn advance(
        &mut self,
        program: &Program,
        scale: u32,
        last: &mut PadReport,
        out: &mut PadReport,
    ) -> StepOutcome {
        // Replay the held report until the current step's scaled hold has
        // elapsed.
        if self.hold_count < self.hold_target.saturating_mul(scale) {
            self.hold_count += 1;
            *out = *last;
            return StepOutcome::Running;
        }
        self.hold_count = 0;

        // The bound is re-read from the table on fetch; the min() keeps a
        // cursor that outlived a longer table from indexing past a shorter
        // one after a mode switch.
        if self.step_index >= self.step_bound.min(program.len()) {
            self.step_index = 0;
            self.hold_target = 0;
            out.reset();
            *last = *out;
            trace!(program = program.name(), "Playback wrapped");
            return StepOutcome::Exhausted;
        }

        match program.step(self.step_index) {
            Some(step) => {
                self.step_index += 1;
                self.step_bound = program.len();
                self.hold_target = step.hold;
                apply_command(step.command, out);
                *last = *out;
                StepOutcome::Running
            }
            None => {
                // Unreachable with a validated table; treat like a wrap.
                self.step_index = 0;
                self.hold_target = 0;
                out.reset();
                *last = *out;
                StepOutcome::Exhausted
            }
        }
    }
}

impl Default for PlaybackCursor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::macros::{Program, Step};
    use crate::report::{buttons, PadCommand};
    use proptest::prelude::*;

    fn drive(
        cursor: &mut PlaybackCursor,
        program: &Program,
        scale: u32,
        last: &mut PadReport,
    ) -> (PadReport, StepOutcome) {
        let mut out = PadReport::neutral();
        let outcome = cursor.advance(program, scale, last, &mut out);
        (out, outcome)
    }

    #[test]
    fn hold_of_d_is_active_for_d_plus_one_calls() {
        let table = Program::new("t", &[Step { command: PadCommand::A, hold: 2 }]);
        let mut cursor = PlaybackCursor::new();
        let mut last = PadReport::neutral();

        for call in 0..3 {
            let (out, outcome) = drive(&mut cursor, &table, 1, &mut last);
            assert_eq!(out.buttons, buttons::A, "call {call}");
            assert_eq!(outcome, StepOutcome::Running);
        }
        let (out, outcome) = drive(&mut cursor, &table, 1, &mut last);
        assert_eq!(outcome, StepOutcome::Exhausted);
        assert_eq!(out, PadReport::neutral());
    }

    #[test]
    fn hold_zero_is_active_for_exactly_one_call() {
        let table = Program::new(
            "t",
            &[
                Step { command: PadCommand::A, hold: 0 },
                Step { command: PadCommand::B, hold: 0 },
            ],
        );
        let mut cursor = PlaybackCursor::new();
        let mut last = PadReport::neutral();

        let (out, _) = drive(&mut cursor, &table, 1, &mut last);
        assert_eq!(out.buttons, buttons::A);
        let (out, _) = drive(&mut cursor, &table, 1, &mut last);
        assert_eq!(out.buttons, buttons::B);
        let (_, outcome) = drive(&mut cursor, &table, 1, &mut last);
        assert_eq!(outcome, StepOutcome::Exhausted);
    }

    #[test]
    fn scale_three_replays_base_hold_two_six_times() {
        let table = Program::new("t", &[Step { command: PadCommand::X, hold: 2 }]);
        let mut cursor = PlaybackCursor::new();
        let mut last = PadReport::neutral();

        // Initial application.
        let (out, _) = drive(&mut cursor, &table, 3, &mut last);
        assert_eq!(out.buttons, buttons::X);
        // Held for 2 * 3 = 6 further cycles, not 2.
        for call in 0..6 {
            let (out, outcome) = drive(&mut cursor, &table, 3, &mut last);
            assert_eq!(out.buttons, buttons::X, "replay {call}");
            assert_eq!(outcome, StepOutcome::Running);
        }
        let (_, outcome) = drive(&mut cursor, &table, 3, &mut last);
        assert_eq!(outcome, StepOutcome::Exhausted);
    }

    #[test]
    fn call_after_wrap_replays_first_command() {
        let table = Program::new(
            "t",
            &[
                Step { command: PadCommand::A, hold: 1 },
                Step { command: PadCommand::B, hold: 0 },
            ],
        );
        let mut cursor = PlaybackCursor::new();
        let mut last = PadReport::neutral();

        loop {
            let (_, outcome) = drive(&mut cursor, &table, 1, &mut last);
            if outcome == StepOutcome::Exhausted {
                break;
            }
        }
        // The wrap report is emitted for exactly one cycle.
        let (out, outcome) = drive(&mut cursor, &table, 1, &mut last);
        assert_eq!(outcome, StepOutcome::Running);
        assert_eq!(out.buttons, buttons::A);
    }

    #[test]
    fn switching_to_a_shorter_table_wraps_instead_of_indexing_past_it() {
        let long = Program::new(
            "long",
            &[
                Step { command: PadCommand::A, hold: 0 },
                Step { command: PadCommand::B, hold: 0 },
                Step { command: PadCommand::X, hold: 0 },
            ],
        );
        let short = Program::new("short", &[Step { command: PadCommand::Y, hold: 0 }]);

        let mut cursor = PlaybackCursor::new();
        let mut last = PadReport::neutral();
        drive(&mut cursor, &long, 1, &mut last);
        drive(&mut cursor, &long, 1, &mut last);
        // Cursor sits at index 2; the short table has length 1.
        let (out, outcome) = drive(&mut cursor, &short, 1, &mut last);
        assert_eq!(outcome, StepOutcome::Exhausted);
        assert_eq!(out, PadReport::neutral());
        let (out, _) = drive(&mut cursor, &short, 1, &mut last);
        assert_eq!(out.buttons, buttons::Y);
    }

    proptest! {
        /// A full pass over any table takes sum(hold_i * scale + 1) calls and
        /// the call after that emits the neutral wrap report.
        #[test]
        fn playback_is_cyclic(
            holds in proptest::collection::vec(0u32..6, 1..5),
            scale in 1u32..4,
        ) {
            let steps: Vec<Step> = holds
                .iter()
                .map(|&hold| Step { command: PadCommand::A, hold })
                .collect();
            let steps: &'static [Step] = Box::leak(steps.into_boxed_slice());
            let table = Program::new("gen", steps);

            let mut cursor = PlaybackCursor::new();
            let mut last = PadReport::neutral();

            for pass in 0..2 {
                for call in 0..table.cycle_len(scale) {
                    let mut out = PadReport::neutral();
                    let outcome = cursor.advance(&table, scale, &mut last, &mut out);
                    prop_assert_eq!(
                        outcome,
                        StepOutcome::Running,
                        "pass {} call {}",
                        pass,
                        call
                    );
                    prop_assert_eq!(out.buttons, buttons::A);
                }
                let mut out = PadReport::neutral();
                let outcome = cursor.advance(&table, scale, &mut last, &mut out);
                prop_assert_eq!(outcome, StepOutcome::Exhausted);
                prop_assert_eq!(out, PadReport::neutral());
            }
        }
    }
}

//! This module defines the `TuringMachine` value, which simulates one execution of a
//! two-symbol, single-tape Turing Machine with an unbounded tape. Machines are immutable:
//! every transition returns a new machine that shares its tape structure with the old one.

use im::OrdSet;
use num_bigint::BigUint;
use num_traits::Zero;

use crate::types::{InstructionTable, Selector, HALT_STATE, MAX_EXECUTION_STEPS};

/// Represents the outcome of running a machine so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The machine can still take another step.
    Running,
    /// The machine has halted and has a decodable result.
    Halted,
    /// The machine revisited a checkpointed configuration and will never halt.
    Looping,
}

/// A snapshot of everything that determines a machine's future besides its table.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Configuration {
    state: i64,
    position: i64,
    tape: OrdSet<i64>,
}

/// Represents one execution state of a two-symbol Turing Machine.
///
/// The tape is stored as the set of cells holding a `1`; every other cell reads `0`.
/// The machine halts when its head moves left of cell 0 or when the table has no
/// instruction for the current state and bit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TuringMachine {
    table: InstructionTable,
    position: i64,
    state: i64,
    tape: OrdSet<i64>,
    elapsed_steps: u64,
    checkpoint: Option<Configuration>,
}

impl TuringMachine {
    /// Creates a machine that runs `table` on `input`.
    ///
    /// The input's binary digits are written from cell 0 rightwards, least significant
    /// bit first. The machine starts in state 0 with its head on cell 0.
    pub fn new(table: InstructionTable, input: &BigUint) -> Self {
        let tape = input
            .to_radix_le(2)
            .into_iter()
            .enumerate()
            .filter(|&(_, digit)| digit == 1)
            .map(|(cell, _)| cell as i64)
            .collect();

        Self {
            table,
            position: 0,
            state: 0,
            tape,
            elapsed_steps: 0,
            checkpoint: None,
        }
    }

    /// Returns a fresh execution of the same table on a different input.
    pub fn restarted(&self, input: &BigUint) -> Self {
        Self::new(self.table.clone(), input)
    }

    /// Returns the bit stored at `cell`.
    pub fn read(&self, cell: i64) -> bool {
        self.tape.contains(&cell)
    }

    /// Returns the selector used to look up the next instruction.
    pub fn selector(&self) -> Selector {
        Selector::new(self.state, self.read(self.position))
    }

    /// Checks if the machine has halted, either by leaving the tape on the left or by
    /// reaching a selector the table does not define.
    pub fn is_halted(&self) -> bool {
        self.position < 0 || !self.table.contains(&self.selector())
    }

    /// Checks if the machine is back in the configuration recorded at the last
    /// power-of-two step count. Such a machine cycles forever.
    pub fn is_loop_detected(&self) -> bool {
        self.checkpoint.as_ref().is_some_and(|checkpoint| {
            checkpoint.state == self.state
                && checkpoint.position == self.position
                && checkpoint.tape == self.tape
        })
    }

    pub fn outcome(&self) -> Step {
        if self.is_halted() {
            Step::Halted
        } else if self.is_loop_detected() {
            Step::Looping
        } else {
            Step::Running
        }
    }

    /// Executes a single transition and returns the resulting machine.
    ///
    /// Halted and looping machines are returned unchanged. A halt instruction leaves the
    /// tape and head alone and only enters [`HALT_STATE`]. Whenever the elapsed step count
    /// is a power of two, the current configuration becomes the new loop checkpoint
    /// before the transition is applied.
    pub fn advance_one_step(&self) -> Self {
        if self.outcome() != Step::Running {
            return self.clone();
        }
        let Some(instruction) = self.table.get(&self.selector()).copied() else {
            return self.clone();
        };

        let checkpoint = if self.elapsed_steps.is_power_of_two() {
            Some(self.configuration())
        } else {
            self.checkpoint.clone()
        };
        let elapsed_steps = self.elapsed_steps + 1;

        if instruction.is_halt() {
            return Self {
                table: self.table.clone(),
                position: self.position,
                state: HALT_STATE,
                tape: self.tape.clone(),
                elapsed_steps,
                checkpoint,
            };
        }

        let tape = if instruction.write {
            self.tape.update(self.position)
        } else {
            self.tape.without(&self.position)
        };

        Self {
            table: self.table.clone(),
            position: self.position + instruction.direction.offset(),
            state: instruction.next_state,
            tape,
            elapsed_steps,
            checkpoint,
        }
    }

    /// Executes up to `steps` transitions, stopping early once the machine halts or
    /// loops.
    pub fn advance(&self, steps: u64) -> Self {
        let mut machine = self.clone();
        for _ in 0..steps {
            if machine.outcome() != Step::Running {
                break;
            }
            machine = machine.advance_one_step();
        }
        machine
    }

    /// Runs the machine until it halts, loops, or reaches [`MAX_EXECUTION_STEPS`].
    pub fn run(&self) -> Self {
        self.advance(MAX_EXECUTION_STEPS)
    }

    /// Decodes the number left behind by a halted machine.
    ///
    /// The cells from `position - 1` down to 0 are read as binary digits, most significant
    /// first. A machine halted at or left of cell 0 decodes to zero.
    ///
    /// # Returns
    ///
    /// * `Some(BigUint)` if the machine has halted.
    /// * `None` if it is still running or looping.
    pub fn decoded_result(&self) -> Option<BigUint> {
        if !self.is_halted() {
            return None;
        }

        let result = (0..self.position).rev().fold(BigUint::zero(), |acc, cell| {
            (acc << 1u32) + BigUint::from(u8::from(self.read(cell)))
        });
        Some(result)
    }

    /// Renders the tape from the leftmost to the rightmost interesting cell (cell 0, the
    /// head, and every `1`) as a string of `0` and `1` characters.
    pub fn render_tape(&self) -> String {
        let first = [0, self.position, self.tape.get_min().copied().unwrap_or(0)]
            .into_iter()
            .min()
            .unwrap_or(0);
        let last = [0, self.position, self.tape.get_max().copied().unwrap_or(0)]
            .into_iter()
            .max()
            .unwrap_or(0);

        (first..=last)
            .map(|cell| if self.read(cell) { '1' } else { '0' })
            .collect()
    }

    pub fn table(&self) -> &InstructionTable {
        &self.table
    }

    pub fn position(&self) -> i64 {
        self.position
    }

    pub fn state(&self) -> i64 {
        self.state
    }

    /// Returns the set of cells currently holding a `1`.
    pub fn tape(&self) -> &OrdSet<i64> {
        &self.tape
    }

    pub fn elapsed_steps(&self) -> u64 {
        self.elapsed_steps
    }

    fn configuration(&self) -> Configuration {
        Configuration {
            state: self.state,
            position: self.position,
            tape: self.tape.clone(),
        }
    }
}

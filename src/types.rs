//! This module defines the core data structures and types shared across the inductor,
//! including instruction selectors and results, instruction tables, and error types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::Rule;

/// Control state a machine enters when it halts. Selectors never use negative states,
/// so a machine in this state has no matching instruction.
pub const HALT_STATE: i64 = -1;
/// The number of steps a hypothesis is advanced by each time it is chosen for work.
pub const DEFAULT_BATCH_STEPS: u64 = 100;
/// The maximum number of steps `TuringMachine::run` executes before giving up.
pub const MAX_EXECUTION_STEPS: u64 = 10000;
/// The maximum allowed size for a textual instruction table in bytes.
pub const MAX_TABLE_SIZE: usize = 65536; // 64KB

/// Represents the possible directions the head can move after an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one cell to the left.
    Left,
    /// Move the head one cell to the right.
    Right,
}

impl Direction {
    /// Returns the change in head position caused by this move.
    pub fn offset(self) -> i64 {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
        }
    }
}

/// The lookup key of an instruction: the current control state and the bit under the head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Selector {
    pub state: i64,
    pub bit: bool,
}

impl Selector {
    pub fn new(state: i64, bit: bool) -> Self {
        Self { state, bit }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.state, u8::from(self.bit))
    }
}

/// The result of looking up a selector: which state to enter, which bit to write and
/// where to move the head.
///
/// An instruction whose `next_state` is negative halts the machine without writing or
/// moving; [`Instruction::HALT`] is the canonical form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Instruction {
    pub next_state: i64,
    pub write: bool,
    pub direction: Direction,
}

impl Instruction {
    /// The explicit halt result offered for every selector during enumeration.
    pub const HALT: Instruction = Instruction {
        next_state: HALT_STATE,
        write: false,
        direction: Direction::Left,
    };

    pub fn new(next_state: i64, write: bool, direction: Direction) -> Self {
        Self {
            next_state,
            write,
            direction,
        }
    }

    /// Returns `true` if executing this instruction halts the machine.
    pub fn is_halt(&self) -> bool {
        self.next_state < 0
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_halt() {
            return write!(f, "halt");
        }

        let direction = match self.direction {
            Direction::Left => 'L',
            Direction::Right => 'R',
        };
        write!(
            f,
            "{}, {}, {}",
            self.next_state,
            u8::from(self.write),
            direction
        )
    }
}

/// A fixed program: a mapping from selectors to instructions.
///
/// Tables are immutable and cheap to clone; every machine running the same program
/// shares one copy of the rules.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct InstructionTable {
    rules: Arc<BTreeMap<Selector, Instruction>>,
}

impl InstructionTable {
    /// Builds a table from `(selector, instruction)` pairs. Later pairs replace earlier
    /// ones with the same selector.
    pub fn new(rules: impl IntoIterator<Item = (Selector, Instruction)>) -> Self {
        Self {
            rules: Arc::new(rules.into_iter().collect()),
        }
    }

    /// Returns the instruction for `selector`, if the table defines one.
    pub fn get(&self, selector: &Selector) -> Option<&Instruction> {
        self.rules.get(selector)
    }

    pub fn contains(&self, selector: &Selector) -> bool {
        self.rules.contains_key(selector)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The number of control states the table has rules for, i.e. one more than the
    /// largest selector state (zero for the empty table).
    pub fn state_count(&self) -> i64 {
        self.rules
            .keys()
            .next_back()
            .map_or(0, |selector| selector.state + 1)
    }

    /// Iterates over the rules in selector order.
    pub fn iter(&self) -> impl Iterator<Item = (&Selector, &Instruction)> {
        self.rules.iter()
    }
}

/// Formats the table in the textual rule format accepted by [`crate::parser::parse`],
/// one rule per line.
impl fmt::Display for InstructionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (selector, instruction)) in self.rules.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{selector} -> {instruction}")?;
        }
        Ok(())
    }
}

/// Represents the errors that can occur while building or driving an inductor.
#[derive(Debug, Error)]
pub enum InductionError {
    /// Indicates an error while parsing a textual instruction table.
    #[error("Table parsing error: {0}")]
    ParseError(#[from] Box<pest::error::Error<Rule>>),
    /// Indicates that an instruction table failed analysis.
    #[error("Table validation error: {0}")]
    ValidationError(String),
    /// Indicates an inductor configuration outside its allowed range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    /// Indicates malformed JSON, in a configuration document or while writing a report.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    /// Indicates an error related to reading table or configuration files.
    #[error("File error: {0}")]
    FileError(String),
    /// The frontier was empty although it always holds the unexplored-mass placeholder.
    #[error("Frontier exhausted: the unexplored-mass placeholder is missing")]
    FrontierExhausted,
    /// The table enumeration ended although it is infinite.
    #[error("Instruction table enumeration ended unexpectedly")]
    EnumerationExhausted,
}

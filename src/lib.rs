//! This crate approximates Solomonoff induction over two-symbol Turing machines.
//! It includes modules for simulating machines, enumerating every instruction table,
//! ordering hypotheses, and an anytime inductor that predicts and conditions on
//! observations, plus a parser and loaders for hand-written tables.

pub mod analyzer;
pub mod choice;
pub mod enumerator;
pub mod frontier;
pub mod hypothesis;
pub mod inductor;
pub mod loader;
pub mod machine;
pub mod parser;
pub mod programs;
pub mod types;

/// Re-exports the `Rule` enum from the parser module, used by the `pest` grammar.
pub use crate::parser::Rule;
/// Re-exports the analysis functions and the `AnalysisError` enum from the analyzer module.
pub use analyzer::{analyze, analyze_complete, reachable_states, AnalysisError};
/// Re-exports the `ChoiceEnumerator` struct from the choice module.
pub use choice::ChoiceEnumerator;
/// Re-exports the table enumeration types from the enumerator module.
pub use enumerator::{InstructionTableEnumerator, TableSpace};
/// Re-exports the `PriorityFrontier` struct from the frontier module.
pub use frontier::PriorityFrontier;
/// Re-exports the `Hypothesis` struct from the hypothesis module.
pub use hypothesis::Hypothesis;
/// Re-exports the inductor and its prediction types from the inductor module.
pub use inductor::{
    Advance, Inductor, InductorConfig, Outcome, Prediction, PredictionEntry, PredictionReport,
    PriorLedger,
};
/// Re-exports the loaders from the loader module.
pub use loader::{ConfigLoader, TableLoader};
/// Re-exports the `TuringMachine` struct and `Step` enum from the machine module.
pub use machine::{Step, TuringMachine};
/// Re-exports the `parse` function from the parser module.
pub use parser::parse;
/// Re-exports `Program`, `ProgramCatalog`, and `PROGRAMS` from the programs module.
pub use programs::{Program, ProgramCatalog, ProgramInfo, PROGRAMS};
/// Re-exports the core types from the types module.
pub use types::{
    Direction, InductionError, Instruction, InstructionTable, Selector, DEFAULT_BATCH_STEPS,
    HALT_STATE, MAX_EXECUTION_STEPS,
};

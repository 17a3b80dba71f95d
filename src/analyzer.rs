//! This module provides functions for analyzing instruction tables, from basic structural
//! checks on hand-written tables to the completeness guaranteed by the enumeration.

use std::collections::{BTreeSet, VecDeque};

use crate::enumerator::selectors;
use crate::types::{InductionError, InstructionTable};

/// Represents the problems that can be found while analyzing an instruction table.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum AnalysisError {
    /// Selectors with a negative control state, which no machine can ever be in.
    NegativeSelectorStates(Vec<i64>),
    /// Selectors of an `n`-state table that have no instruction.
    MissingSelectors(Vec<String>),
    /// Next states outside the table's states, which halt by missing their rules.
    UndefinedNextStates(Vec<i64>),
}

impl From<AnalysisError> for InductionError {
    /// Converts an `AnalysisError` into an `InductionError::ValidationError`.
    fn from(error: AnalysisError) -> Self {
        match error {
            AnalysisError::NegativeSelectorStates(states) => InductionError::ValidationError(
                format!("Selectors use negative states: {:?}", states),
            ),
            AnalysisError::MissingSelectors(selectors) => InductionError::ValidationError(
                format!("Table is incomplete, missing selectors: {:?}", selectors),
            ),
            AnalysisError::UndefinedNextStates(states) => InductionError::ValidationError(
                format!("Instructions reference undefined states: {:?}", states),
            ),
        }
    }
}

/// Checks that a table can be run at all.
///
/// Partial tables are accepted: a machine simply halts on a selector without an
/// instruction.
///
/// # Returns
///
/// * `Ok(())` if no errors are found.
/// * `Err(InductionError::ValidationError)` if a selector uses a negative state.
pub fn analyze(table: &InstructionTable) -> Result<(), InductionError> {
    check_selector_states(table)?;
    Ok(())
}

/// Checks that a table is complete in the sense of the enumeration: every selector of its
/// states has an instruction and every non-halting instruction stays within those states.
/// Such a machine only halts through an explicit halt instruction or by leaving the tape.
pub fn analyze_complete(table: &InstructionTable) -> Result<(), InductionError> {
    [check_selector_states, check_all_selectors, check_next_states]
        .iter()
        .find_map(|check| check(table).err())
        .map_or(Ok(()), |error| Err(error.into()))
}

/// Returns the states reachable from state 0 by following non-halting instructions.
pub fn reachable_states(table: &InstructionTable) -> BTreeSet<i64> {
    let mut reachable = BTreeSet::from([0]);
    let mut queue = VecDeque::from([0]);

    while let Some(state) = queue.pop_front() {
        let next_states = table
            .iter()
            .filter(|(selector, instruction)| selector.state == state && !instruction.is_halt())
            .map(|(_, instruction)| instruction.next_state);

        for next in next_states {
            if reachable.insert(next) {
                queue.push_back(next);
            }
        }
    }

    reachable
}

fn check_selector_states(table: &InstructionTable) -> Result<(), AnalysisError> {
    let negative: BTreeSet<i64> = table
        .iter()
        .map(|(selector, _)| selector.state)
        .filter(|&state| state < 0)
        .collect();

    if negative.is_empty() {
        Ok(())
    } else {
        Err(AnalysisError::NegativeSelectorStates(
            negative.into_iter().collect(),
        ))
    }
}

fn check_all_selectors(table: &InstructionTable) -> Result<(), AnalysisError> {
    let missing: Vec<String> = selectors(table.state_count())
        .into_iter()
        .filter(|selector| !table.contains(selector))
        .map(|selector| format!("({selector})"))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(AnalysisError::MissingSelectors(missing))
    }
}

fn check_next_states(table: &InstructionTable) -> Result<(), AnalysisError> {
    let state_count = table.state_count();
    let undefined: BTreeSet<i64> = table
        .iter()
        .map(|(_, instruction)| instruction)
        .filter(|instruction| !instruction.is_halt() && instruction.next_state >= state_count)
        .map(|instruction| instruction.next_state)
        .collect();

    if undefined.is_empty() {
        Ok(())
    } else {
        Err(AnalysisError::UndefinedNextStates(
            undefined.into_iter().collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Direction, Instruction, Selector};

    #[test]
    fn test_empty_table_is_complete() {
        assert!(analyze(&InstructionTable::default()).is_ok());
        assert!(analyze_complete(&InstructionTable::default()).is_ok());
    }

    #[test]
    fn test_missing_selector() {
        let table = InstructionTable::new([(Selector::new(0, false), Instruction::HALT)]);

        assert!(analyze(&table).is_ok());
        assert_eq!(
            check_all_selectors(&table),
            Err(AnalysisError::MissingSelectors(vec!["(0, 1)".to_string()]))
        );
        assert!(matches!(
            analyze_complete(&table),
            Err(InductionError::ValidationError(_))
        ));
    }

    #[test]
    fn test_undefined_next_state() {
        let table = InstructionTable::new([
            (
                Selector::new(0, false),
                Instruction::new(3, true, Direction::Right),
            ),
            (Selector::new(0, true), Instruction::HALT),
        ]);

        assert_eq!(
            check_next_states(&table),
            Err(AnalysisError::UndefinedNextStates(vec![3]))
        );
        let error = analyze_complete(&table).unwrap_err();
        assert!(error.to_string().contains("undefined states"));
    }

    #[test]
    fn test_negative_selector_state() {
        let table = InstructionTable::new([(Selector::new(-2, false), Instruction::HALT)]);

        assert!(matches!(
            analyze(&table),
            Err(InductionError::ValidationError(_))
        ));
    }

    #[test]
    fn test_reachable_states() {
        let table = InstructionTable::new([
            (
                Selector::new(0, false),
                Instruction::new(1, true, Direction::Right),
            ),
            (Selector::new(0, true), Instruction::HALT),
            (
                Selector::new(1, false),
                Instruction::new(0, false, Direction::Left),
            ),
            (Selector::new(2, false), Instruction::HALT),
        ]);

        assert_eq!(reachable_states(&table), BTreeSet::from([0, 1]));
    }
}

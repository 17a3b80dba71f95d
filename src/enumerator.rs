//! This module provides the infinite, deterministic enumeration of every complete
//! instruction table, smallest machines first.

use crate::choice::{ChoiceEnumerator, Choices};
use crate::types::{Direction, Instruction, InstructionTable, Selector};

/// All complete instruction tables over a fixed number of control states.
/// A negative state count is treated as zero.
///
/// A table for `n` states assigns one of `4n + 1` instructions (every next state, bit
/// and direction, plus halt) to each of the `2n` selectors, so there are
/// `(4n + 1)^(2n)` of them.
#[derive(Debug, Clone)]
pub struct TableSpace {
    state_count: i64,
    selectors: Vec<Selector>,
    choices: ChoiceEnumerator<Instruction>,
}

impl TableSpace {
    pub fn new(state_count: i64) -> Self {
        let state_count = state_count.max(0);
        let selectors = selectors(state_count);
        let instructions = instructions(state_count);
        let choices = ChoiceEnumerator::new(selectors.iter().map(|_| instructions.clone()));

        Self {
            state_count,
            selectors,
            choices,
        }
    }

    pub fn state_count(&self) -> i64 {
        self.state_count
    }

    /// Returns the number of tables in this space, or `None` if it overflows a `u64`.
    pub fn table_count(&self) -> Option<u64> {
        self.choices.combination_count()
    }

    /// Iterates over the tables of this space in canonical order.
    pub fn tables(&self) -> impl Iterator<Item = InstructionTable> + '_ {
        self.choices.iter().map(|choice| self.table(choice))
    }

    fn table(&self, choice: Vec<Instruction>) -> InstructionTable {
        InstructionTable::new(self.selectors.iter().copied().zip(choice))
    }
}

/// Returns every selector of an `n`-state table: states ascending, `0` before `1`.
pub fn selectors(state_count: i64) -> Vec<Selector> {
    (0..state_count)
        .flat_map(|state| [false, true].map(|bit| Selector::new(state, bit)))
        .collect()
}

/// Returns every instruction an `n`-state table may use: halt first, then each
/// `(next state, bit, direction)` triple with the state varying slowest.
pub fn instructions(state_count: i64) -> Vec<Instruction> {
    let moves = (0..state_count).flat_map(|state| {
        [false, true].into_iter().flat_map(move |bit| {
            [Direction::Left, Direction::Right]
                .map(|direction| Instruction::new(state, bit, direction))
        })
    });

    std::iter::once(Instruction::HALT).chain(moves).collect()
}

/// The infinite sequence of all complete instruction tables.
///
/// Tables are produced in blocks of increasing state count `0, 1, 2, ...`; inside a
/// block they follow [`TableSpace`] order. Every complete table appears exactly once.
/// The enumerator never returns `None`.
#[derive(Debug, Clone)]
pub struct InstructionTableEnumerator {
    space: TableSpace,
    cursor: Choices<Instruction>,
}

impl InstructionTableEnumerator {
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    /// Starts the enumeration at the first table with `state_count` states, or at the
    /// empty table if `state_count` is not positive.
    pub fn starting_at(state_count: i64) -> Self {
        let space = TableSpace::new(state_count);
        let cursor = space.choices.iter();
        Self { space, cursor }
    }

    /// Returns the state count of the block currently being enumerated.
    pub fn state_count(&self) -> i64 {
        self.space.state_count()
    }
}

impl Default for InstructionTableEnumerator {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for InstructionTableEnumerator {
    type Item = InstructionTable;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(choice) = self.cursor.next() {
                return Some(self.space.table(choice));
            }
            *self = Self::starting_at(self.space.state_count() + 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::analyze_complete;
    use std::collections::HashSet;

    #[test]
    fn test_first_table_is_empty() {
        let mut enumerator = InstructionTableEnumerator::new();

        assert_eq!(enumerator.next(), Some(InstructionTable::default()));
        assert_eq!(
            enumerator.next(),
            Some(InstructionTable::new([
                (Selector::new(0, false), Instruction::HALT),
                (Selector::new(0, true), Instruction::HALT),
            ]))
        );
    }

    #[test]
    fn test_output_space() {
        let instructions = instructions(1);

        assert_eq!(
            instructions,
            vec![
                Instruction::HALT,
                Instruction::new(0, false, Direction::Left),
                Instruction::new(0, false, Direction::Right),
                Instruction::new(0, true, Direction::Left),
                Instruction::new(0, true, Direction::Right),
            ]
        );
        assert_eq!(selectors(2).len(), 4);
    }

    #[test]
    fn test_space_sizes() {
        assert_eq!(TableSpace::new(0).table_count(), Some(1));
        assert_eq!(TableSpace::new(1).table_count(), Some(25));
        assert_eq!(TableSpace::new(2).table_count(), Some(6561));
        assert_eq!(TableSpace::new(3).table_count(), Some(4_826_809));
        assert_eq!(TableSpace::new(1).tables().count(), 25);
    }

    #[test]
    fn test_blocks_are_ordered_by_size() {
        let sizes: Vec<i64> = InstructionTableEnumerator::new()
            .take(1 + 25 + 6561 + 10)
            .map(|table| table.len() as i64 / 2)
            .collect();

        assert!(sizes.windows(2).all(|pair| pair[0] <= pair[1]));
        assert_eq!(sizes.iter().filter(|&&n| n == 0).count(), 1);
        assert_eq!(sizes.iter().filter(|&&n| n == 1).count(), 25);
        assert_eq!(sizes.iter().filter(|&&n| n == 2).count(), 6561);
        assert_eq!(sizes.iter().filter(|&&n| n == 3).count(), 10);
    }

    #[test]
    fn test_two_state_tables_are_complete_and_unique() {
        let mut enumerator = InstructionTableEnumerator::new();
        enumerator.by_ref().take(26).for_each(drop);
        assert_eq!(enumerator.state_count(), 1);

        let tables: Vec<_> = enumerator.by_ref().take(6561).collect();
        let distinct: HashSet<_> = tables.iter().cloned().collect();

        assert_eq!(distinct.len(), 6561);
        assert!(tables.iter().all(|table| table.len() == 4));
        assert!(tables.iter().all(|table| analyze_complete(table).is_ok()));
        assert_eq!(enumerator.next().map(|table| table.len()), Some(6));
    }

    #[test]
    fn test_enumeration_is_restartable() {
        let first: Vec<_> = InstructionTableEnumerator::new().take(40).collect();
        let second: Vec<_> = InstructionTableEnumerator::new().take(40).collect();

        assert_eq!(first, second);
    }

    #[test]
    fn test_starting_at_skips_smaller_blocks() {
        let table = InstructionTableEnumerator::starting_at(2).next();

        assert_eq!(table.map(|t| t.state_count()), Some(2));
    }

    #[test]
    fn test_negative_start_begins_at_empty_table() {
        let from_negative: Vec<_> = InstructionTableEnumerator::starting_at(-2).take(3).collect();
        let from_zero: Vec<_> = InstructionTableEnumerator::new().take(3).collect();

        assert_eq!(from_negative, from_zero);
        assert_eq!(
            from_negative
                .iter()
                .filter(|table| table.is_empty())
                .count(),
            1
        );
        assert_eq!(TableSpace::new(-1).state_count(), 0);
        assert_eq!(TableSpace::new(-1).table_count(), Some(1));
    }
}

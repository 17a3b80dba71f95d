//! This module provides `ChoiceEnumerator`, which lazily enumerates every way of picking
//! one option from each of an ordered sequence of option lists.

use std::sync::Arc;

/// The set of all combinations that pick one option per list.
///
/// For the lists `[[1, 2], [3, 4, 5]]` the combinations are, in order,
/// `[1, 3], [1, 4], [1, 5], [2, 3], [2, 4], [2, 5]`: the first list varies slowest.
///
/// The enumerator is restartable: every call to [`ChoiceEnumerator::iter`] starts an
/// independent pass, and a pass only keeps one cursor per list.
#[derive(Debug, Clone)]
pub struct ChoiceEnumerator<T> {
    choices: Arc<Vec<Vec<T>>>,
}

impl<T: Clone> ChoiceEnumerator<T> {
    pub fn new(choices: impl IntoIterator<Item = Vec<T>>) -> Self {
        Self {
            choices: Arc::new(choices.into_iter().collect()),
        }
    }

    /// Returns the number of option lists, which is the length of every combination.
    pub fn width(&self) -> usize {
        self.choices.len()
    }

    /// Returns the total number of combinations, or `None` if it does not fit in a `u64`.
    pub fn combination_count(&self) -> Option<u64> {
        self.choices
            .iter()
            .try_fold(1u64, |count, options| count.checked_mul(options.len() as u64))
    }

    /// Starts a fresh pass over all combinations.
    pub fn iter(&self) -> Choices<T> {
        Choices::new(Arc::clone(&self.choices))
    }
}

impl<T: Clone> IntoIterator for &ChoiceEnumerator<T> {
    type Item = Vec<T>;
    type IntoIter = Choices<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// One pass over the combinations of a [`ChoiceEnumerator`].
#[derive(Debug, Clone)]
pub struct Choices<T> {
    choices: Arc<Vec<Vec<T>>>,
    cursor: Vec<usize>,
    exhausted: bool,
}

impl<T: Clone> Choices<T> {
    fn new(choices: Arc<Vec<Vec<T>>>) -> Self {
        let exhausted = choices.iter().any(|options| options.is_empty());
        Self {
            cursor: vec![0; choices.len()],
            choices,
            exhausted,
        }
    }

    /// Moves the cursor to the next combination, odometer style with the last list
    /// turning fastest. Marks the pass exhausted once every cursor wraps around.
    fn turn(&mut self) {
        for (index, options) in self.cursor.iter_mut().zip(self.choices.iter()).rev() {
            *index += 1;
            if *index < options.len() {
                return;
            }
            *index = 0;
        }
        self.exhausted = true;
    }
}

impl<T: Clone> Iterator for Choices<T> {
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }

        let combination = self
            .cursor
            .iter()
            .zip(self.choices.iter())
            .map(|(&index, options)| options[index].clone())
            .collect();
        self.turn();

        Some(combination)
    }
}

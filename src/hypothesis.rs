//! This module defines `Hypothesis`, a Turing machine competing to explain the observations
//! together with its exact prior weight.

use num_bigint::{BigInt, BigUint};
use num_rational::BigRational;
use std::cmp::Ordering;

use crate::machine::{Step, TuringMachine};

/// A candidate explanation of the observations.
///
/// A hypothesis either runs a concrete machine, or is the single placeholder that stands
/// for every table not yet pulled from the enumeration. Its weight is its prior divided by
/// the longest run it has needed so far, so slow machines lose ground to fast ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hypothesis {
    prior: BigRational,
    process: Option<TuringMachine>,
    max_seen_elapsed_steps: u64,
    weight: BigRational,
}

impl Hypothesis {
    /// Creates a hypothesis running `machine` with the given prior.
    pub fn new(prior: BigRational, machine: TuringMachine) -> Self {
        Self::with_history(prior, Some(machine), 1)
    }

    /// Creates the placeholder holding the prior mass of every unexplored table.
    pub fn unexplored(prior: BigRational) -> Self {
        Self::with_history(prior, None, 1)
    }

    fn with_history(
        prior: BigRational,
        process: Option<TuringMachine>,
        max_seen_elapsed_steps: u64,
    ) -> Self {
        let divisor = BigRational::from_integer(BigInt::from(max_seen_elapsed_steps.max(1)));
        let weight = &prior / divisor;

        Self {
            prior,
            process,
            max_seen_elapsed_steps,
            weight,
        }
    }

    pub fn prior(&self) -> &BigRational {
        &self.prior
    }

    /// Returns the time-discounted weight, `prior / max(1, max_seen_elapsed_steps)`.
    pub fn weight(&self) -> &BigRational {
        &self.weight
    }

    pub fn process(&self) -> Option<&TuringMachine> {
        self.process.as_ref()
    }

    pub fn max_seen_elapsed_steps(&self) -> u64 {
        self.max_seen_elapsed_steps
    }

    pub fn is_unexplored(&self) -> bool {
        self.process.is_none()
    }

    /// The placeholder is always still running.
    pub fn outcome(&self) -> Step {
        self.process
            .as_ref()
            .map_or(Step::Running, TuringMachine::outcome)
    }

    pub fn decoded_result(&self) -> Option<BigUint> {
        self.process.as_ref().and_then(TuringMachine::decoded_result)
    }

    /// Runs the machine for up to `steps` more steps and refreshes the weight.
    pub fn advanced(self, steps: u64) -> Self {
        let Self {
            prior,
            process,
            max_seen_elapsed_steps,
            ..
        } = self;
        let Some(machine) = process else {
            return Self::with_history(prior, None, max_seen_elapsed_steps);
        };

        let machine = machine.advance(steps);
        let max_seen = max_seen_elapsed_steps.max(machine.elapsed_steps());
        Self::with_history(prior, Some(machine), max_seen)
    }

    /// Restarts the machine on `input`, keeping the prior and the step history.
    pub fn restarted(self, input: &BigUint) -> Self {
        let process = self.process.map(|machine| machine.restarted(input));
        Self {
            process,
            ..self
        }
    }

    /// Orders hypotheses heaviest first.
    pub fn by_weight(a: &Hypothesis, b: &Hypothesis) -> Ordering {
        b.weight.cmp(&a.weight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Direction, Instruction, InstructionTable, Selector};
    use num_traits::{One, Zero};

    fn ratio(numer: i64, denom: i64) -> BigRational {
        BigRational::new(BigInt::from(numer), BigInt::from(denom))
    }

    fn runner() -> TuringMachine {
        let table = InstructionTable::new([(
            Selector::new(0, false),
            Instruction::new(0, true, Direction::Right),
        )]);
        TuringMachine::new(table, &BigUint::zero())
    }

    #[test]
    fn test_fresh_weight_equals_prior() {
        let hypothesis = Hypothesis::new(ratio(9, 10), runner());

        assert_eq!(hypothesis.weight(), &ratio(9, 10));
        assert_eq!(hypothesis.max_seen_elapsed_steps(), 1);
        assert!(!hypothesis.is_unexplored());
    }

    #[test]
    fn test_weight_is_discounted_by_steps() {
        let hypothesis = Hypothesis::new(BigRational::one(), runner()).advanced(100);

        assert_eq!(hypothesis.max_seen_elapsed_steps(), 100);
        assert_eq!(hypothesis.weight(), &ratio(1, 100));
        assert_eq!(hypothesis.prior(), &BigRational::one());
        assert_eq!(hypothesis.outcome(), Step::Running);
    }

    #[test]
    fn test_restart_keeps_history() {
        let hypothesis = Hypothesis::new(BigRational::one(), runner())
            .advanced(40)
            .restarted(&BigUint::one());

        assert_eq!(hypothesis.max_seen_elapsed_steps(), 40);
        assert_eq!(hypothesis.weight(), &ratio(1, 40));
        assert_eq!(hypothesis.process().map(TuringMachine::elapsed_steps), Some(0));

        let advanced = hypothesis.advanced(10);
        assert_eq!(advanced.max_seen_elapsed_steps(), 40);
    }

    #[test]
    fn test_placeholder() {
        let placeholder = Hypothesis::unexplored(ratio(10, 1)).advanced(100);

        assert!(placeholder.is_unexplored());
        assert_eq!(placeholder.weight(), &ratio(10, 1));
        assert_eq!(placeholder.outcome(), Step::Running);
        assert_eq!(placeholder.decoded_result(), None);
        assert_eq!(placeholder.clone().restarted(&BigUint::one()), placeholder);
    }

    #[test]
    fn test_heaviest_orders_first() {
        let light = Hypothesis::new(ratio(1, 10), runner());
        let heavy = Hypothesis::unexplored(ratio(9, 1));

        assert_eq!(Hypothesis::by_weight(&heavy, &light), Ordering::Less);
        assert_eq!(Hypothesis::by_weight(&light, &heavy), Ordering::Greater);
        assert_eq!(Hypothesis::by_weight(&light, &light), Ordering::Equal);
    }
}

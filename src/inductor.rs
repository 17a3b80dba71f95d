//! This module provides the `Inductor`, an anytime approximation of Solomonoff induction.
//!
//! The inductor runs a best-first search over the infinite space of instruction tables.
//! Each call to [`Inductor::advance`] does one bounded unit of work: it either pulls the
//! next table out of the enumeration or runs the heaviest live hypothesis for a batch of
//! steps. [`Inductor::predict`] reads off the current posterior over outputs and
//! [`Inductor::observe`] conditions it on a measured output.
//!
//! The search never finishes. The frontier, the finished pool and the enumeration all grow
//! without bound for as long as the caller keeps advancing; the caller decides when to stop.
//! An inductor is not synchronized and belongs to one thread of control.

use num_bigint::{BigInt, BigUint};
use num_rational::BigRational;
use num_traits::{One, ToPrimitive, Zero};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info, trace};

use crate::enumerator::InstructionTableEnumerator;
use crate::frontier::PriorityFrontier;
use crate::hypothesis::Hypothesis;
use crate::machine::{Step, TuringMachine};
use crate::types::{InductionError, InstructionTable, DEFAULT_BATCH_STEPS};

/// Tunable parameters of an [`Inductor`].
///
/// The `k`-th enumerated table receives the prior `base^k`, where
/// `base = base_numerator / base_denominator` must lie strictly between 0 and 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InductorConfig {
    pub base_numerator: u64,
    pub base_denominator: u64,
    /// Steps a running hypothesis takes each time it is chosen.
    pub batch_steps: u64,
}

impl Default for InductorConfig {
    fn default() -> Self {
        Self {
            base_numerator: 9,
            base_denominator: 10,
            batch_steps: DEFAULT_BATCH_STEPS,
        }
    }
}

impl InductorConfig {
    /// Checks that the base lies strictly between 0 and 1 and that batches make progress.
    pub fn validate(&self) -> Result<(), InductionError> {
        if self.base_denominator == 0 {
            return Err(InductionError::InvalidConfig(
                "base denominator must not be zero".to_string(),
            ));
        }
        if self.base_numerator == 0 || self.base_numerator >= self.base_denominator {
            return Err(InductionError::InvalidConfig(format!(
                "base {}/{} must lie strictly between 0 and 1",
                self.base_numerator, self.base_denominator
            )));
        }
        if self.batch_steps == 0 {
            return Err(InductionError::InvalidConfig(
                "batch_steps must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn base(&self) -> BigRational {
        BigRational::new(
            BigInt::from(self.base_numerator),
            BigInt::from(self.base_denominator),
        )
    }

    /// The prior mass of all tables together, `1 / (1 - base)`.
    pub fn total_prior(&self) -> BigRational {
        (BigRational::one() - self.base()).recip()
    }
}

/// A predicted output: a decoded machine result, or the mass of everything still running.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Outcome {
    Unresolved,
    Resolved(BigUint),
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Unresolved => write!(f, "unresolved"),
            Outcome::Resolved(value) => write!(f, "{value}"),
        }
    }
}

/// The posterior distribution over outcomes. Probabilities are exact and sum to one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prediction {
    probabilities: BTreeMap<Outcome, BigRational>,
}

impl Prediction {
    /// Returns the probability of `outcome`, which is zero for outcomes no finished
    /// hypothesis produced.
    pub fn probability(&self, outcome: &Outcome) -> BigRational {
        self.probabilities
            .get(outcome)
            .cloned()
            .unwrap_or_else(BigRational::zero)
    }

    /// Returns the share of the posterior held by hypotheses that are still running.
    pub fn unresolved(&self) -> BigRational {
        self.probability(&Outcome::Unresolved)
    }

    /// Returns the resolved output with the highest probability. Ties go to the smaller
    /// output.
    pub fn most_likely(&self) -> Option<(&BigUint, &BigRational)> {
        self.probabilities
            .iter()
            .filter_map(|(outcome, probability)| match outcome {
                Outcome::Resolved(value) => Some((value, probability)),
                Outcome::Unresolved => None,
            })
            .fold(None, |best, (value, probability)| match best {
                Some((_, best_probability)) if best_probability >= probability => best,
                _ => Some((value, probability)),
            })
    }

    /// Iterates over the outcomes, `Unresolved` first and then outputs ascending.
    pub fn iter(&self) -> impl Iterator<Item = (&Outcome, &BigRational)> {
        self.probabilities.iter()
    }

    pub fn len(&self) -> usize {
        self.probabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probabilities.is_empty()
    }

    /// The sum of all probabilities; exactly one for every prediction of an inductor.
    pub fn total(&self) -> BigRational {
        self.probabilities
            .values()
            .fold(BigRational::zero(), |acc, probability| acc + probability)
    }

    /// Builds a serializable summary with exact and approximate probabilities.
    pub fn to_report(&self) -> PredictionReport {
        let entries = self
            .probabilities
            .iter()
            .map(|(outcome, probability)| PredictionEntry {
                outcome: outcome.to_string(),
                probability: probability.to_string(),
                approximate: probability.to_f64().unwrap_or(f64::NAN),
            })
            .collect();

        PredictionReport { entries }
    }
}

/// A serializable rendering of a [`Prediction`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionReport {
    pub entries: Vec<PredictionEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionEntry {
    pub outcome: String,
    /// The exact probability as `numerator/denominator`.
    pub probability: String,
    pub approximate: f64,
}

/// What a single call to [`Inductor::advance`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// The placeholder was split: the table with this enumeration index became live.
    Expanded { index: u64 },
    /// A hypothesis ran a batch and is still running.
    Running,
    /// A hypothesis halted and moved to the finished pool.
    Halted,
    /// A hypothesis was found looping and was discarded.
    Pruned,
}

/// Where the prior mass currently sits. The parts always add up to
/// [`InductorConfig::total_prior`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorLedger {
    /// Live hypotheses, including the placeholder.
    pub frontier: BigRational,
    pub finished: BigRational,
    /// Discarded by loop detection.
    pub pruned: BigRational,
    /// Discarded by observations they contradicted.
    pub refuted: BigRational,
}

impl PriorLedger {
    pub fn total(&self) -> BigRational {
        &self.frontier + &self.finished + &self.pruned + &self.refuted
    }
}

/// The lazily materialized tail of the hypothesis space: enumerated tables paired with
/// the geometric priors `1, base, base^2, ...`.
#[derive(Debug, Clone)]
struct Unexplored {
    tables: InstructionTableEnumerator,
    base: BigRational,
    next_prior: BigRational,
    next_index: u64,
}

impl Unexplored {
    fn new(base: BigRational) -> Self {
        Self {
            tables: InstructionTableEnumerator::new(),
            base,
            next_prior: BigRational::one(),
            next_index: 0,
        }
    }

    fn pull(&mut self) -> Option<(u64, InstructionTable, BigRational)> {
        let table = self.tables.next()?;
        let prior = std::mem::replace(&mut self.next_prior, BigRational::zero());
        self.next_prior = &prior * &self.base;
        let index = self.next_index;
        self.next_index += 1;

        Some((index, table, prior))
    }
}

/// Approximates Solomonoff induction with an anytime best-first search over Turing
/// machines.
#[derive(Debug, Clone)]
pub struct Inductor {
    config: InductorConfig,
    frontier: PriorityFrontier<Hypothesis>,
    finished: Vec<Hypothesis>,
    unexplored: Unexplored,
    input: BigUint,
    pruned: BigRational,
    refuted: BigRational,
}

impl Inductor {
    /// Creates an inductor with the default configuration: base 9/10, batches of 100 steps.
    pub fn new() -> Self {
        Self::build(InductorConfig::default())
    }

    /// Creates an inductor with a custom configuration.
    ///
    /// # Returns
    ///
    /// * `Ok(Inductor)` if the configuration is valid.
    /// * `Err(InductionError::InvalidConfig)` otherwise.
    pub fn with_config(config: InductorConfig) -> Result<Self, InductionError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: InductorConfig) -> Self {
        let mut frontier = PriorityFrontier::with_comparator(Hypothesis::by_weight);
        frontier.insert(Hypothesis::unexplored(config.total_prior()));

        Self {
            unexplored: Unexplored::new(config.base()),
            config,
            frontier,
            finished: Vec::new(),
            input: BigUint::zero(),
            pruned: BigRational::zero(),
            refuted: BigRational::zero(),
        }
    }

    pub fn config(&self) -> &InductorConfig {
        &self.config
    }

    /// Performs one unit of search work on the heaviest live hypothesis.
    ///
    /// If that is the placeholder, the next table is pulled from the enumeration and its
    /// prior share is split off the placeholder. Otherwise the hypothesis runs for one
    /// batch and is then finished, discarded as looping, or returned to the frontier.
    ///
    /// # Returns
    ///
    /// * `Ok(Advance)` describing the work done.
    /// * `Err(InductionError::FrontierExhausted)` or `Err(InductionError::EnumerationExhausted)`
    ///   if the inductor's internal invariants were broken.
    pub fn advance(&mut self) -> Result<Advance, InductionError> {
        let hypothesis = self
            .frontier
            .pop()
            .ok_or(InductionError::FrontierExhausted)?;

        if hypothesis.is_unexplored() {
            return self.expand(hypothesis);
        }

        let hypothesis = hypothesis.advanced(self.config.batch_steps);
        match hypothesis.outcome() {
            Step::Halted => {
                debug!(
                    result = %hypothesis.decoded_result().unwrap_or_default(),
                    steps = hypothesis.max_seen_elapsed_steps(),
                    weight = %hypothesis.weight(),
                    "Hypothesis halted"
                );
                self.finished.push(hypothesis);
                Ok(Advance::Halted)
            }
            Step::Looping => {
                debug!(prior = %hypothesis.prior(), "Hypothesis pruned as looping");
                self.pruned = &self.pruned + hypothesis.prior();
                Ok(Advance::Pruned)
            }
            Step::Running => {
                trace!(
                    steps = hypothesis.max_seen_elapsed_steps(),
                    weight = %hypothesis.weight(),
                    "Hypothesis still running"
                );
                self.frontier.insert(hypothesis);
                Ok(Advance::Running)
            }
        }
    }

    /// Calls [`Inductor::advance`] `steps + 1` times.
    ///
    /// The extra unit of work is long-standing behavior that callers may rely on; use
    /// `advance` in a loop for an exact count.
    pub fn advance_by(&mut self, steps: u64) -> Result<(), InductionError> {
        for _ in 0..=steps {
            self.advance()?;
        }
        Ok(())
    }

    fn expand(&mut self, placeholder: Hypothesis) -> Result<Advance, InductionError> {
        let (index, table, prior) = self
            .unexplored
            .pull()
            .ok_or(InductionError::EnumerationExhausted)?;
        let remaining = placeholder.prior() - &prior;

        debug!(
            index,
            states = table.state_count(),
            prior = %prior,
            "Materialized hypothesis"
        );

        let machine = TuringMachine::new(table, &self.input);
        self.frontier.insert(Hypothesis::new(prior, machine));
        self.frontier.insert(Hypothesis::unexplored(remaining));

        Ok(Advance::Expanded { index })
    }

    /// Returns the posterior over outcomes.
    ///
    /// Finished hypotheses are grouped by decoded result; everything still in the
    /// frontier, placeholder included, is reported as [`Outcome::Unresolved`]. Weights are
    /// normalized by their grand total.
    pub fn predict(&self) -> Prediction {
        let unresolved = self
            .frontier
            .iter()
            .fold(BigRational::zero(), |acc, h| acc + h.weight());

        let mut weights = BTreeMap::new();
        weights.insert(Outcome::Unresolved, unresolved);
        for hypothesis in &self.finished {
            if let Some(result) = hypothesis.decoded_result() {
                let weight = weights
                    .entry(Outcome::Resolved(result))
                    .or_insert_with(BigRational::zero);
                *weight += hypothesis.weight().clone();
            }
        }

        let total = weights
            .values()
            .fold(BigRational::zero(), |acc, weight| acc + weight);
        let probabilities = weights
            .into_iter()
            .map(|(outcome, weight)| (outcome, weight / &total))
            .collect();

        Prediction { probabilities }
    }

    /// Conditions the posterior on the system having produced `observed`, then restarts
    /// every surviving hypothesis on `next_input`.
    ///
    /// Finished hypotheses with a different result are discarded. Matching ones and the
    /// whole frontier survive with their priors and step histories intact; the frontier
    /// is never filtered since its hypotheses have not made a prediction yet. Tables pulled
    /// from the enumeration afterwards also start on `next_input`.
    pub fn observe(&mut self, observed: impl Into<BigUint>, next_input: impl Into<BigUint>) {
        let observed = observed.into();
        let next_input = next_input.into();

        let (matching, refuted): (Vec<_>, Vec<_>) = std::mem::take(&mut self.finished)
            .into_iter()
            .partition(|h| h.decoded_result().as_ref() == Some(&observed));
        let running = self.frontier.drain();

        info!(
            observed = %observed,
            next_input = %next_input,
            matching = matching.len(),
            refuted = refuted.len(),
            running = running.len(),
            "Conditioning on observation"
        );

        for hypothesis in &refuted {
            self.refuted = &self.refuted + hypothesis.prior();
        }
        for hypothesis in matching.into_iter().chain(running) {
            self.frontier.insert(hypothesis.restarted(&next_input));
        }
        self.input = next_input;
    }

    /// Returns the input value new and restarted machines run on.
    pub fn input(&self) -> &BigUint {
        &self.input
    }

    /// Returns the number of live hypotheses, placeholder included.
    pub fn frontier_len(&self) -> usize {
        self.frontier.len()
    }

    pub fn finished_len(&self) -> usize {
        self.finished.len()
    }

    /// Returns the number of tables pulled from the enumeration so far.
    pub fn materialized(&self) -> u64 {
        self.unexplored.next_index
    }

    /// Iterates over the live hypotheses in heap order.
    pub fn frontier(&self) -> impl Iterator<Item = &Hypothesis> {
        self.frontier.iter()
    }

    pub fn finished(&self) -> &[Hypothesis] {
        &self.finished
    }

    /// Accounts for where the prior mass currently sits.
    pub fn prior_ledger(&self) -> PriorLedger {
        PriorLedger {
            frontier: prior_sum(self.frontier.iter()),
            finished: prior_sum(self.finished.iter()),
            pruned: self.pruned.clone(),
            refuted: self.refuted.clone(),
        }
    }
}

fn prior_sum<'a>(hypotheses: impl Iterator<Item = &'a Hypothesis>) -> BigRational {
    hypotheses.fold(BigRational::zero(), |acc, h| acc + h.prior())
}

impl Default for Inductor {
    fn default() -> Self {
        Self::new()
    }
}

//! Genetic algorithm evolving the linear policy's weight vector.
//!
//! # Algorithm Overview
//!
//! Each generation runs the same cycle over a fixed-size population:
//!
//! 1. **Evaluate Fitness** - Score every weight vector with a [`FitnessEvaluator`]
//! 2. **Selection** - Take the `num_parents` best individuals (first index wins ties)
//! 3. **Crossover** - Splice consecutive parent pairs into `num_offsprings` children;
//!    each child is accepted with probability `crossover_rate`
//! 4. **Mutation** - With probability `mutation_rate`, perturb one component of a child
//! 5. **Replacement** - The next population is the parents followed by the mutants
//!
//! After the last generation the final population is scored once more and the
//! best individual is returned.
//!
//! # Key Components
//!
//! - [`GeneticAlgorithmParams`] - Population size, rates and generation count
//! - [`Population`] - Fixed-size collection of equally long weight vectors
//! - [`GeneticOptimizer`] - Runs the generation loop
//! - [`FitnessHistory`] - Fitness of every individual in every generation
//!
//! # Example
//!
//! ```
//! use pendulum_training::{
//!     dataset::{TrainingDataset, TrainingSample},
//!     fitness::ProjectionFitness,
//!     genetic::{GeneticAlgorithmParams, GeneticOptimizer},
//! };
//!
//! let dataset = TrainingDataset::from_samples([
//!     TrainingSample::new([1.0, 0.0, 0.5], 1.0),
//!     TrainingSample::new([0.0, 1.0, -0.5], -1.0),
//! ])?;
//! let params = GeneticAlgorithmParams {
//!     num_generations: 5,
//!     ..GeneticAlgorithmParams::default()
//! };
//! let optimizer = GeneticOptimizer::new(params, ProjectionFitness)?;
//! let result = optimizer.optimize(&dataset, &mut rand::rng())?;
//! assert_eq!(result.best_weights.len(), 3);
//! assert_eq!(result.history.len(), 5);
//! # Ok::<(), pendulum_training::TrainingError>(())
//! ```
//!
//! # Crossover Acceptance
//!
//! A rejected crossover draw is retried for the same offspring slot. Retries are
//! capped by `max_crossover_attempts` so that a rate close to zero fails with
//! [`TrainingError::InvalidPopulationConfig`] instead of spinning forever.

use pendulum_stats::descriptive::DescriptiveStats;
use rand::Rng;
use rand_distr::Uniform;
use serde::{Deserialize, Serialize};

use crate::{
    TrainingError,
    dataset::TrainingDataset,
    fitness::FitnessEvaluator,
    weights::{self, WeightVector},
};

/// Genetic algorithm configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneticAlgorithmParams {
    /// Population size, constant across generations
    pub num_solutions: usize,
    /// Individuals kept unchanged each generation; the rest are offsprings
    pub num_parents: usize,
    pub num_generations: usize,
    /// Probability that a crossover draw produces an offspring
    pub crossover_rate: f32,
    /// Probability that an offspring has one component perturbed
    pub mutation_rate: f32,
    /// Initial weights are drawn from `[-init_range, init_range]`
    pub init_range: f32,
    /// Mutation deltas are drawn from `[-mutation_delta, mutation_delta]`
    pub mutation_delta: f32,
    /// Crossover draws allowed per offspring slot before giving up
    pub max_crossover_attempts: usize,
}

impl Default for GeneticAlgorithmParams {
    fn default() -> Self {
        Self {
            num_solutions: 8,
            num_parents: 4,
            num_generations: 50,
            crossover_rate: 0.8,
            mutation_rate: 0.4,
            init_range: 2.0,
            mutation_delta: 1.0,
            max_crossover_attempts: 1000,
        }
    }
}

impl GeneticAlgorithmParams {
    /// Parameters with `num_parents` set to half of `num_solutions`.
    #[must_use]
    pub fn with_solutions(num_solutions: usize) -> Self {
        Self {
            num_solutions,
            num_parents: num_solutions / 2,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn num_offsprings(&self) -> usize {
        self.num_solutions.saturating_sub(self.num_parents)
    }

    pub fn validate(&self) -> Result<(), TrainingError> {
        if self.num_solutions == 0 {
            return Err(TrainingError::invalid_config("population is empty"));
        }
        if self.num_parents > self.num_solutions {
            return Err(TrainingError::invalid_config(format!(
                "num_parents ({}) exceeds population size ({})",
                self.num_parents, self.num_solutions
            )));
        }
        for (name, rate) in [
            ("crossover_rate", self.crossover_rate),
            ("mutation_rate", self.mutation_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(TrainingError::invalid_config(format!(
                    "{name} must be in [0, 1], got {rate}"
                )));
            }
        }
        if self.num_offsprings() > 0 {
            if self.num_parents == 0 {
                return Err(TrainingError::invalid_config(
                    "offsprings need at least one parent",
                ));
            }
            if self.crossover_rate <= 0.0 {
                return Err(TrainingError::invalid_config(
                    "crossover_rate is zero, no offspring can ever be accepted",
                ));
            }
            if self.max_crossover_attempts == 0 {
                return Err(TrainingError::invalid_config(
                    "max_crossover_attempts must be positive",
                ));
            }
        }
        Ok(())
    }
}

/// Fixed-size collection of weight vectors sharing one dimensionality.
#[derive(Debug, Clone, PartialEq)]
pub struct Population {
    members: Vec<WeightVector>,
}

impl Population {
    /// Creates `count` weight vectors of length `dim` drawn from `distr`.
    pub fn random<R>(rng: &mut R, distr: &Uniform<f32>, count: usize, dim: usize) -> Self
    where
        R: Rng + ?Sized,
    {
        let members = (0..count)
            .map(|_| weights::random(rng, distr, dim))
            .collect();
        Self { members }
    }

    /// Wraps existing weight vectors, rejecting ragged ones.
    pub fn from_members(members: Vec<WeightVector>) -> Result<Self, TrainingError> {
        if let Some(first) = members.first() {
            for member in &members {
                TrainingError::check_dim(first.len(), member.len())?;
            }
        }
        Ok(Self { members })
    }

    /// Builds the next generation: parents first, then mutants.
    pub fn from_parents_and_mutants(
        parents: Vec<WeightVector>,
        mutants: Vec<WeightVector>,
    ) -> Result<Self, TrainingError> {
        let mut members = parents;
        members.extend(mutants);
        Self::from_members(members)
    }

    #[must_use]
    pub fn members(&self) -> &[WeightVector] {
        &self.members
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Length of every weight vector, `None` for an empty population.
    #[must_use]
    pub fn dim(&self) -> Option<usize> {
        self.members.first().map(Vec::len)
    }
}

/// Indices of the `num_parents` fittest individuals, best first.
///
/// Each pick takes the highest remaining fitness (the first index on ties) and
/// then masks that slot out, so no index is returned twice whatever the
/// fitness values are.
pub fn select_parent_indices(
    fitness: &[f32],
    num_parents: usize,
) -> Result<Vec<usize>, TrainingError> {
    if num_parents > fitness.len() {
        return Err(TrainingError::invalid_config(format!(
            "num_parents ({num_parents}) exceeds population size ({})",
            fitness.len()
        )));
    }
    let mut remaining: Vec<Option<f32>> = fitness.iter().copied().map(Some).collect();
    let mut selected = Vec::with_capacity(num_parents);
    for _ in 0..num_parents {
        let mut best: Option<(usize, f32)> = None;
        for (i, f) in remaining.iter().enumerate() {
            let Some(f) = *f else { continue };
            if best.is_none_or(|(_, best_f)| f > best_f) {
                best = Some((i, f));
            }
        }
        // num_parents <= len guarantees an unmasked slot
        let Some((idx, _)) = best else { break };
        selected.push(idx);
        remaining[idx] = None;
    }
    Ok(selected)
}

/// Copies of the `num_parents` fittest weight vectors, best first.
pub fn select_parents(
    population: &Population,
    fitness: &[f32],
    num_parents: usize,
) -> Result<Vec<WeightVector>, TrainingError> {
    TrainingError::check_dim(population.len(), fitness.len())?;
    let indices = select_parent_indices(fitness, num_parents)?;
    Ok(indices
        .into_iter()
        .map(|i| population.members[i].clone())
        .collect())
}

/// Produces `num_offsprings` children by splicing consecutive parent pairs.
///
/// Slot `k` uses parents `k mod P` and `(k + 1) mod P`. A slot is filled when a
/// uniform draw from `[0, 1)` falls below `crossover_rate`; otherwise the slot
/// is retried, at most `max_attempts` times.
pub fn crossover<R>(
    parents: &[WeightVector],
    num_offsprings: usize,
    crossover_rate: f32,
    max_attempts: usize,
    rng: &mut R,
) -> Result<Vec<WeightVector>, TrainingError>
where
    R: Rng + ?Sized,
{
    if num_offsprings == 0 {
        return Ok(vec![]);
    }
    if parents.is_empty() {
        return Err(TrainingError::invalid_config(
            "offsprings need at least one parent",
        ));
    }

    let mut offsprings = Vec::with_capacity(num_offsprings);
    for slot in 0..num_offsprings {
        let p1 = &parents[slot % parents.len()];
        let p2 = &parents[(slot + 1) % parents.len()];
        let accepted = (0..max_attempts).any(|_| rng.random::<f32>() < crossover_rate);
        if !accepted {
            return Err(TrainingError::invalid_config(format!(
                "no offspring accepted for slot {slot} after {max_attempts} attempts \
                 (crossover_rate = {crossover_rate})"
            )));
        }
        offsprings.push(weights::splice(p1, p2));
    }
    Ok(offsprings)
}

/// Mutates one offspring with probability `mutation_rate`.
///
/// Returns the index of the perturbed component, or `None` if the offspring was
/// left unchanged.
pub fn mutate_offspring<R>(
    offspring: &mut [f32],
    mutation_rate: f32,
    delta: &Uniform<f32>,
    rng: &mut R,
) -> Option<usize>
where
    R: Rng + ?Sized,
{
    if rng.random::<f32>() < mutation_rate {
        weights::mutate_one(offspring, delta, rng)
    } else {
        None
    }
}

/// Turns offsprings into mutants. Each changes in at most one component.
pub fn mutate<R>(
    offsprings: Vec<WeightVector>,
    mutation_rate: f32,
    delta: &Uniform<f32>,
    rng: &mut R,
) -> Vec<WeightVector>
where
    R: Rng + ?Sized,
{
    offsprings
        .into_iter()
        .map(|mut offspring| {
            mutate_offspring(&mut offspring, mutation_rate, delta, rng);
            offspring
        })
        .collect()
}

/// Index of the first individual with maximal fitness.
#[must_use]
pub fn best_index(fitness: &[f32]) -> Option<usize> {
    select_parent_indices(fitness, 1).ok()?.first().copied()
}

/// Summary of one generation's fitness values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSummary {
    pub generation: usize,
    pub min: f32,
    pub max: f32,
    pub mean: f32,
}

/// Fitness of every individual in every generation, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FitnessHistory {
    generations: Vec<Vec<f32>>,
}

impl FitnessHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, fitness: Vec<f32>) {
        self.generations.push(fitness);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.generations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.generations.is_empty()
    }

    #[must_use]
    pub fn generations(&self) -> &[Vec<f32>] {
        &self.generations
    }

    pub fn summaries(&self) -> impl Iterator<Item = GenerationSummary> + '_ {
        self.generations
            .iter()
            .enumerate()
            .filter_map(|(generation, fitness)| {
                let stats = DescriptiveStats::new(fitness.iter().copied())?;
                Some(GenerationSummary {
                    generation,
                    min: stats.min,
                    max: stats.max,
                    mean: stats.mean,
                })
            })
    }

    #[must_use]
    pub fn mean_per_generation(&self) -> Vec<f32> {
        self.summaries().map(|s| s.mean).collect()
    }

    #[must_use]
    pub fn max_per_generation(&self) -> Vec<f32> {
        self.summaries().map(|s| s.max).collect()
    }
}

/// Outcome of [`GeneticOptimizer::optimize`].
#[derive(Debug, Clone)]
pub struct OptimizationResult {
    pub best_weights: WeightVector,
    /// Fitness of `best_weights` in the final re-evaluation
    pub best_fitness: f32,
    pub history: FitnessHistory,
    pub final_population: Population,
}

/// Runs the generation loop with a fixed fitness function.
#[derive(Debug, Clone)]
pub struct GeneticOptimizer<F> {
    params: GeneticAlgorithmParams,
    fitness: F,
    init_distr: Uniform<f32>,
    delta_distr: Uniform<f32>,
}

impl<F> GeneticOptimizer<F>
where
    F: FitnessEvaluator,
{
    pub fn new(params: GeneticAlgorithmParams, fitness: F) -> Result<Self, TrainingError> {
        params.validate()?;
        let init_distr = Uniform::new_inclusive(-params.init_range, params.init_range)
            .map_err(|e| TrainingError::invalid_config(format!("init_range: {e}")))?;
        let delta_distr = Uniform::new_inclusive(-params.mutation_delta, params.mutation_delta)
            .map_err(|e| TrainingError::invalid_config(format!("mutation_delta: {e}")))?;
        Ok(Self {
            params,
            fitness,
            init_distr,
            delta_distr,
        })
    }

    #[must_use]
    pub fn params(&self) -> &GeneticAlgorithmParams {
        &self.params
    }

    /// Creates the initial population for observations of length `dim`.
    pub fn initial_population<R>(&self, dim: usize, rng: &mut R) -> Population
    where
        R: Rng + ?Sized,
    {
        Population::random(rng, &self.init_distr, self.params.num_solutions, dim)
    }

    /// Runs one generation.
    ///
    /// Returns the next population together with the fitness of `population`.
    pub fn evolve<R>(
        &self,
        population: &Population,
        dataset: &TrainingDataset,
        rng: &mut R,
    ) -> Result<(Population, Vec<f32>), TrainingError>
    where
        R: Rng + ?Sized,
    {
        let fitness = self
            .fitness
            .evaluate_population(population.members(), dataset)?;
        let parents = select_parents(population, &fitness, self.params.num_parents)?;
        let offsprings = crossover(
            &parents,
            population.len() - parents.len(),
            self.params.crossover_rate,
            self.params.max_crossover_attempts,
            rng,
        )?;
        let mutants = mutate(
            offsprings,
            self.params.mutation_rate,
            &self.delta_distr,
            rng,
        );
        let next = Population::from_parents_and_mutants(parents, mutants)?;
        debug_assert_eq!(next.len(), population.len());
        Ok((next, fitness))
    }

    /// Evolves a random population for `num_generations` and returns the best
    /// individual of the final population.
    pub fn optimize<R>(
        &self,
        dataset: &TrainingDataset,
        rng: &mut R,
    ) -> Result<OptimizationResult, TrainingError>
    where
        R: Rng + ?Sized,
    {
        let dim = dataset.observation_dim().ok_or(TrainingError::EmptyDataset)?;
        let mut population = self.initial_population(dim, rng);
        tracing::debug!(population = ?population.members(), "initial population");

        let mut history = FitnessHistory::new();
        for generation in 0..self.params.num_generations {
            let (next, fitness) = self.evolve(&population, dataset, rng)?;
            if let Some(stats) = DescriptiveStats::new(fitness.iter().copied()) {
                tracing::info!(
                    generation,
                    mean = stats.mean,
                    max = stats.max,
                    "generation evaluated"
                );
            }
            tracing::debug!(generation, individuals = ?population.members(), ?fitness);
            history.push(fitness);
            population = next;
        }

        let final_fitness = self
            .fitness
            .evaluate_population(population.members(), dataset)?;
        let best = best_index(&final_fitness)
            .ok_or_else(|| TrainingError::invalid_config("population is empty"))?;
        let best_weights = population.members()[best].clone();
        let best_fitness = final_fitness[best];
        tracing::info!(?best_weights, best_fitness, "optimization finished");

        Ok(OptimizationResult {
            best_weights,
            best_fitness,
            history,
            final_population: population,
        })
    }
}

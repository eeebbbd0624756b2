//! Fitness functions scoring weight vectors against the training dataset.
//!
//! # Projection Fitness
//!
//! ```text
//! fitness(w) = Σ_rows (x_row · w)
//! ```
//!
//! This is an unsupervised proxy: it rewards weight vectors aligned with the
//! observations the heuristic saw during accepted episodes. The recorded
//! actions are available through the dataset but are not part of the score.

use crate::{TrainingError, dataset::TrainingDataset, weights};

/// Scores weight vectors on a dataset. Higher is better.
pub trait FitnessEvaluator {
    fn evaluate_individual(
        &self,
        weights: &[f32],
        dataset: &TrainingDataset,
    ) -> Result<f32, TrainingError>;

    /// Scores every member of a population, order-aligned with `population`.
    fn evaluate_population(
        &self,
        population: &[Vec<f32>],
        dataset: &TrainingDataset,
    ) -> Result<Vec<f32>, TrainingError> {
        population
            .iter()
            .map(|w| self.evaluate_individual(w, dataset))
            .collect()
    }
}

impl<F> FitnessEvaluator for &F
where
    F: FitnessEvaluator + ?Sized,
{
    fn evaluate_individual(
        &self,
        weights: &[f32],
        dataset: &TrainingDataset,
    ) -> Result<f32, TrainingError> {
        (**self).evaluate_individual(weights, dataset)
    }
}

/// Sum of the dataset's feature rows projected onto the weight vector.
///
/// ```
/// use pendulum_training::{
///     dataset::{TrainingDataset, TrainingSample},
///     fitness::{FitnessEvaluator, ProjectionFitness},
/// };
///
/// let dataset = TrainingDataset::from_samples([TrainingSample::new([1.0, 0.0, 0.0], 0.5)])?;
/// let fitness = ProjectionFitness
///     .evaluate_population(&[vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0]], &dataset)?;
/// assert_eq!(fitness, vec![1.0, 0.0]);
/// # Ok::<(), pendulum_training::TrainingError>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectionFitness;

impl FitnessEvaluator for ProjectionFitness {
    fn evaluate_individual(
        &self,
        weights: &[f32],
        dataset: &TrainingDataset,
    ) -> Result<f32, TrainingError> {
        let dim = dataset.observation_dim().ok_or(TrainingError::EmptyDataset)?;
        TrainingError::check_dim(dim, weights.len())?;
        // Labels (`dataset.labels()`) are intentionally left out of the score so
        // the fitness stays a pure projection of the observations.
        Ok(dataset.features().map(|x| weights::dot(x, weights)).sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::TrainingSample;

    fn dataset() -> TrainingDataset {
        TrainingDataset::from_samples([
            TrainingSample::new([1.0, 0.0, 0.0], 0.5),
            TrainingSample::new([0.5, 0.5, -2.0], -1.5),
        ])
        .unwrap()
    }

    #[test]
    fn test_sum_of_projections() {
        let fitness = ProjectionFitness
            .evaluate_individual(&[2.0, 1.0, 0.5], &dataset())
            .unwrap();
        // row 0: 2.0, row 1: 1.0 + 0.5 - 1.0
        assert!((fitness - 2.5).abs() < 1e-6);
    }

    #[test]
    fn test_labels_do_not_affect_fitness() {
        let relabeled = TrainingDataset::from_samples(
            dataset()
                .samples()
                .iter()
                .map(|s| TrainingSample::new(s.observation.clone(), -s.action)),
        )
        .unwrap();
        let w = [0.3, -0.7, 1.1];
        assert_eq!(
            ProjectionFitness.evaluate_individual(&w, &dataset()).unwrap(),
            ProjectionFitness
                .evaluate_individual(&w, &relabeled)
                .unwrap()
        );
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let population = vec![vec![1.0, 2.0, 3.0], vec![-1.0, 0.0, 0.5]];
        let dataset = dataset();
        let first = ProjectionFitness
            .evaluate_population(&population, &dataset)
            .unwrap();
        let second = ProjectionFitness
            .evaluate_population(&population, &dataset)
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), population.len());
    }

    #[test]
    fn test_dimension_mismatch() {
        let err = ProjectionFitness
            .evaluate_population(&[vec![1.0, 2.0]], &dataset())
            .unwrap_err();
        assert!(matches!(
            err,
            TrainingError::DimensionMismatch {
                expected: 3,
                actual: 2
            }
        ));
    }

    #[test]
    fn test_empty_dataset() {
        let err = ProjectionFitness
            .evaluate_individual(&[1.0], &TrainingDataset::new())
            .unwrap_err();
        assert!(matches!(err, TrainingError::EmptyDataset));
    }
}

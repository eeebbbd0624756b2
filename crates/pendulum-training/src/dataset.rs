//! Training samples collected from accepted rollouts.

use pendulum_engine::{Action, Observation};
use serde::{Deserialize, Serialize};

use crate::TrainingError;

/// An observation paired with the action the heuristic took from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSample {
    pub observation: Observation,
    pub action: Action,
}

impl TrainingSample {
    #[must_use]
    pub fn new(observation: impl Into<Observation>, action: Action) -> Self {
        Self {
            observation: observation.into(),
            action,
        }
    }
}

/// Ordered collection of samples sharing one observation dimensionality.
///
/// The first sample fixes the dimensionality; later samples with a different
/// one are rejected.
///
/// ```
/// use pendulum_training::dataset::{TrainingDataset, TrainingSample};
///
/// let mut dataset = TrainingDataset::new();
/// dataset.push(TrainingSample::new([1.0, 0.0, 0.0], 0.5)).unwrap();
/// assert_eq!(dataset.observation_dim(), Some(3));
/// assert!(dataset.push(TrainingSample::new([1.0, 0.0], 0.5)).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingDataset {
    samples: Vec<TrainingSample>,
}

impl TrainingDataset {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_samples<I>(samples: I) -> Result<Self, TrainingError>
    where
        I: IntoIterator<Item = TrainingSample>,
    {
        let mut dataset = Self::new();
        dataset.extend(samples)?;
        Ok(dataset)
    }

    pub fn push(&mut self, sample: TrainingSample) -> Result<(), TrainingError> {
        if let Some(expected) = self.observation_dim() {
            TrainingError::check_dim(expected, sample.observation.dim())?;
        }
        self.samples.push(sample);
        Ok(())
    }

    pub fn extend<I>(&mut self, samples: I) -> Result<(), TrainingError>
    where
        I: IntoIterator<Item = TrainingSample>,
    {
        for sample in samples {
            self.push(sample)?;
        }
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Dimensionality of the observations, `None` while the dataset is empty.
    #[must_use]
    pub fn observation_dim(&self) -> Option<usize> {
        self.samples.first().map(|s| s.observation.dim())
    }

    #[must_use]
    pub fn samples(&self) -> &[TrainingSample] {
        &self.samples
    }

    /// Feature rows (`X`), one per sample.
    pub fn features(&self) -> impl Iterator<Item = &[f32]> + '_ {
        self.samples.iter().map(|s| s.observation.as_slice())
    }

    /// Recorded actions (`y`), one per sample.
    pub fn labels(&self) -> impl Iterator<Item = Action> + '_ {
        self.samples.iter().map(|s| s.action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_dataset_has_no_dim() {
        let dataset = TrainingDataset::new();
        assert!(dataset.is_empty());
        assert_eq!(dataset.observation_dim(), None);
    }

    #[test]
    fn test_features_and_labels_follow_insertion_order() {
        let dataset = TrainingDataset::from_samples([
            TrainingSample::new([1.0, 2.0], 0.5),
            TrainingSample::new([3.0, 4.0], -1.0),
        ])
        .unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(
            dataset.features().collect::<Vec<_>>(),
            vec![&[1.0, 2.0][..], &[3.0, 4.0][..]]
        );
        assert_eq!(dataset.labels().collect::<Vec<_>>(), vec![0.5, -1.0]);
    }

    #[test]
    fn test_mismatched_sample_is_rejected() {
        let err = TrainingDataset::from_samples([
            TrainingSample::new([1.0, 2.0, 3.0], 0.5),
            TrainingSample::new([1.0], 0.5),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            TrainingError::DimensionMismatch {
                expected: 3,
                actual: 1
            }
        ));
    }
}

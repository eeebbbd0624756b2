//! Maps observations to torques with an evolved weight vector.
//!
//! ```text
//! hx     = sigmoid(observation · w)
//! action = (hx - 0.5) * 4
//! ```
//!
//! The sigmoid squashes the projection into `(0, 1)`; the rescale maps that onto
//! the open torque interval `(-2, 2)`.

use pendulum_engine::Action;

use crate::{
    TrainingError,
    weights::{self, WeightVector},
};

#[must_use]
pub fn sigmoid(z: f32) -> f32 {
    1.0 / (1.0 + (-z).exp())
}

/// Rescales a sigmoid output from `(0, 1)` onto `(-2, 2)`.
#[must_use]
pub fn rescale(hx: f32) -> Action {
    (hx - 0.5) * 4.0
}

/// Linear policy with a sigmoid squash.
///
/// ```
/// use pendulum_training::predictor::Predictor;
///
/// let predictor = Predictor::new(vec![1.0, 0.0, 0.0]);
/// assert_eq!(predictor.predict(&[0.0, 0.3, -0.7])?, 0.0);
/// assert!(predictor.predict(&[10.0, 0.0, 0.0])? > 1.9);
/// # Ok::<(), pendulum_training::TrainingError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Predictor {
    weights: WeightVector,
}

impl Predictor {
    #[must_use]
    pub fn new(weights: WeightVector) -> Self {
        Self { weights }
    }

    #[must_use]
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    pub fn predict(&self, observation: &[f32]) -> Result<Action, TrainingError> {
        TrainingError::check_dim(self.weights.len(), observation.len())?;
        let hx = sigmoid(weights::dot(observation, &self.weights));
        let action = rescale(hx);
        tracing::trace!(hx, action, "predicted");
        Ok(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sigmoid() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(20.0) > 0.999);
        assert!(sigmoid(-20.0) < 0.001);
    }

    #[test]
    fn test_rescale() {
        assert_eq!(rescale(0.5), 0.0);
        assert_eq!(rescale(1.0), 2.0);
        assert_eq!(rescale(0.0), -2.0);
    }

    #[test]
    fn test_prediction_is_bounded() {
        let predictor = Predictor::new(vec![3.0, -2.0, 1.5]);
        for obs in [
            [1.0, 0.0, 8.0],
            [-1.0, 0.0, -8.0],
            [0.0, 1.0, 0.0],
            [0.7, -0.7, 3.0],
        ] {
            let action = predictor.predict(&obs).unwrap();
            assert!((-2.0..=2.0).contains(&action));
        }
    }

    #[test]
    fn test_prediction_is_deterministic() {
        let predictor = Predictor::new(vec![0.4, -1.2, 0.3]);
        let obs = [0.2, 0.9, -1.4];
        assert_eq!(
            predictor.predict(&obs).unwrap(),
            predictor.predict(&obs).unwrap()
        );
    }

    #[test]
    fn test_prediction_sign_follows_projection() {
        let predictor = Predictor::new(vec![1.0, 1.0, 1.0]);
        assert!(predictor.predict(&[0.5, 0.5, 0.5]).unwrap() > 0.0);
        assert!(predictor.predict(&[-0.5, -0.5, -0.5]).unwrap() < 0.0);
    }

    #[test]
    fn test_dimension_mismatch() {
        let predictor = Predictor::new(vec![1.0, 1.0, 1.0]);
        let err = predictor.predict(&[1.0, 0.0]).unwrap_err();
        assert!(matches!(
            err,
            TrainingError::DimensionMismatch {
                expected: 3,
                actual: 2
            }
        ));
    }
}

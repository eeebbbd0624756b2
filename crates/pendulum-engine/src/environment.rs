use std::io;

use serde::{Deserialize, Serialize};

/// Scalar control input (torque) applied to the simulation.
pub type Action = f32;

/// Lower bound of the action domain.
pub const ACTION_MIN: Action = -2.0;
/// Upper bound of the action domain.
pub const ACTION_MAX: Action = 2.0;

/// Fixed-size real-valued description of the simulation state.
///
/// For [`Pendulum`](crate::Pendulum) this is `[cos θ, sin θ, θ̇]`.
#[derive(
    Debug, Clone, PartialEq, Default, Serialize, Deserialize, derive_more::From, derive_more::Deref,
)]
#[serde(transparent)]
pub struct Observation(Vec<f32>);

impl Observation {
    #[must_use]
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    /// Number of components in this observation.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

impl<const N: usize> From<[f32; N]> for Observation {
    fn from(values: [f32; N]) -> Self {
        Self(values.to_vec())
    }
}

/// Result of advancing the simulation by one step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub observation: Observation,
    /// Immediate single-step reward (not cumulative).
    pub reward: f32,
    /// Whether the episode hit its time limit. Advisory only.
    pub done: bool,
}

/// A simulation driven step by step by a controller.
///
/// Implementations own their state and random source. Errors are reported as
/// [`io::Error`] and propagate unmodified through the training system.
pub trait Environment {
    /// Number of components in every observation this environment produces.
    fn observation_dim(&self) -> usize;

    /// Starts a new episode and returns its initial observation.
    fn reset(&mut self) -> Observation;

    /// Applies `action` for one time step.
    ///
    /// Callers may keep stepping past the time limit; `done` only reports it.
    fn step(&mut self, action: Action) -> io::Result<StepOutcome>;

    /// Displays the current state. Blocks until the frame is written.
    fn render(&mut self) -> io::Result<()>;

    /// Releases display resources.
    fn close(&mut self) -> io::Result<()>;
}

impl<E> Environment for &mut E
where
    E: Environment + ?Sized,
{
    fn observation_dim(&self) -> usize {
        (**self).observation_dim()
    }

    fn reset(&mut self) -> Observation {
        (**self).reset()
    }

    fn step(&mut self, action: Action) -> io::Result<StepOutcome> {
        (**self).step(action)
    }

    fn render(&mut self) -> io::Result<()> {
        (**self).render()
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

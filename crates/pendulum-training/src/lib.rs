//! Training system for the linear pendulum policy.
//!
//! The policy is a single weight vector `w` with one weight per observation
//! component. It is learned by a genetic algorithm that scores candidates on a
//! dataset collected from heuristic rollouts.
//!
//! # How Training Works
//!
//! 1. **Rollouts** - A reactive heuristic drives the simulation; episodes that end
//!    with a step reward above the acceptance threshold are kept ([`rollout`])
//! 2. **Dataset** - Accepted episodes become `(observation, action)` samples ([`dataset`])
//! 3. **Evolution** - A fixed-size population of weight vectors is evolved by
//!    selection, crossover and mutation ([`genetic`], [`weights`])
//! 4. **Fitness** - Each candidate is scored by projecting the dataset onto it ([`fitness`])
//! 5. **Prediction** - The best vector maps observations to torques ([`predictor`])
//! 6. **Evaluation** - The evolved policy drives the simulation again ([`experiment`])
//!
//! # Architecture
//!
//! ```text
//! Environment (pendulum-engine)
//!     ↓ driven by
//! Rollout Generator (heuristic policy)
//!     ↓ produces
//! Training Dataset
//!     ↓ scored by
//! Fitness Evaluator
//!     ↓ guides
//! Genetic Optimizer
//!     ↓ produces
//! Best Weight Vector
//!     ↓ used by
//! Predictor → Environment (evaluation games)
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use pendulum_engine::Pendulum;
//! use pendulum_training::experiment::{ExperimentConfig, run_experiment};
//!
//! let mut env = Pendulum::new();
//! let mut rng = rand::rng();
//! let report = run_experiment(ExperimentConfig::default(), &mut env, &mut rng)?;
//! println!("average score: {}", report.average_evaluation_score);
//! # Ok::<(), pendulum_training::TrainingError>(())
//! ```
//!
//! # Current Limitations
//!
//! - **Proxy fitness**: fitness ignores the recorded actions, so the GA maximizes
//!   the projection of the observations rather than imitating the heuristic
//! - **Single-threaded**: every rollout, generation and evaluation game runs in sequence
//! - **No convergence check**: evolution always runs the configured number of generations

pub use self::error::TrainingError;

pub mod dataset;
mod error;
pub mod experiment;
pub mod fitness;
pub mod genetic;
pub mod predictor;
pub mod rollout;
pub mod weights;

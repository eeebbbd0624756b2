//! Simulation side of the pendulum experiment.
//!
//! This crate provides the environment the training system talks to:
//!
//! - [`Environment`] - The `reset` / `step` / `render` / `close` interface every
//!   simulation implements
//! - [`Pendulum`] - Classic swing-up inverted pendulum with continuous torque
//! - [`RenderFrame`] - Character-grid snapshot of the pendulum used by the
//!   terminal renderer
//!
//! # Example
//!
//! ```
//! use pendulum_engine::{Environment, Pendulum};
//!
//! let mut env = Pendulum::from_seed(42);
//! let observation = env.reset();
//! assert_eq!(observation.dim(), 3);
//!
//! let outcome = env.step(1.5).unwrap();
//! assert!(outcome.reward <= 0.0);
//! ```

pub use self::{environment::*, pendulum::*, render_frame::*};

mod environment;
mod pendulum;
mod render_frame;

use std::{f32::consts::PI, io};

use rand::{Rng, SeedableRng as _};
use rand_pcg::Pcg32;

use crate::{
    environment::{ACTION_MAX, ACTION_MIN, Action, Environment, Observation, StepOutcome},
    render_frame::{RenderFrame, TerminalRenderer},
};

const MAX_SPEED: f32 = 8.0;
const DT: f32 = 0.05;
const GRAVITY: f32 = 10.0;
const MASS: f32 = 1.0;
const LENGTH: f32 = 1.0;

/// Number of steps after which an episode reports `done`.
pub const DEFAULT_TIME_LIMIT: usize = 200;

/// Wraps an angle into `[-π, π)`.
#[must_use]
pub fn angle_normalize(theta: f32) -> f32 {
    (theta + PI).rem_euclid(2.0 * PI) - PI
}

/// Swing-up inverted pendulum with continuous torque control.
///
/// The pendulum starts at a random angle and velocity; the goal is to swing it
/// up and keep it upright. `θ = 0` is upright.
///
/// # Dynamics
///
/// ```text
/// u    = clamp(action, -2, 2)
/// cost = norm(θ)² + 0.1·θ̇² + 0.001·u²
/// θ̇'   = θ̇ + (3g/(2l)·sin θ + 3/(m·l²)·u)·dt
/// θ'   = θ + θ̇'·dt
/// θ̇'   = clamp(θ̇', -8, 8)
/// ```
///
/// The reward of a step is `-cost`, so it is always non-positive and reaches
/// its maximum of `0.0` when the pendulum is upright and at rest.
#[derive(Debug)]
pub struct Pendulum {
    theta: f32,
    theta_dot: f32,
    last_torque: Option<f32>,
    elapsed_steps: usize,
    time_limit: usize,
    rng: Pcg32,
    renderer: Option<TerminalRenderer>,
}

impl Pendulum {
    /// Creates a pendulum seeded from the thread-local RNG.
    #[must_use]
    pub fn new() -> Self {
        Self::from_seed(rand::rng().random())
    }

    /// Creates a pendulum whose initial states are reproducible from `seed`.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let theta = rng.random_range(-PI..=PI);
        let theta_dot = rng.random_range(-1.0..=1.0);
        Self {
            theta,
            theta_dot,
            last_torque: None,
            elapsed_steps: 0,
            time_limit: DEFAULT_TIME_LIMIT,
            rng,
            renderer: None,
        }
    }

    #[must_use]
    pub fn with_time_limit(mut self, time_limit: usize) -> Self {
        self.time_limit = time_limit;
        self
    }

    #[must_use]
    pub fn theta(&self) -> f32 {
        self.theta
    }

    #[must_use]
    pub fn theta_dot(&self) -> f32 {
        self.theta_dot
    }

    #[must_use]
    pub fn elapsed_steps(&self) -> usize {
        self.elapsed_steps
    }

    /// Places the pendulum in an explicit state.
    pub fn set_state(&mut self, theta: f32, theta_dot: f32) {
        self.theta = theta;
        self.theta_dot = theta_dot;
    }

    #[must_use]
    pub fn observation(&self) -> Observation {
        Observation::from([self.theta.cos(), self.theta.sin(), self.theta_dot])
    }

    #[must_use]
    pub fn render_frame(&self) -> RenderFrame {
        RenderFrame::new(self.theta, self.last_torque)
    }
}

impl Default for Pendulum {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for Pendulum {
    fn observation_dim(&self) -> usize {
        3
    }

    fn reset(&mut self) -> Observation {
        self.theta = self.rng.random_range(-PI..=PI);
        self.theta_dot = self.rng.random_range(-1.0..=1.0);
        self.last_torque = None;
        self.elapsed_steps = 0;
        self.observation()
    }

    fn step(&mut self, action: Action) -> io::Result<StepOutcome> {
        if !action.is_finite() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("non-finite action: {action}"),
            ));
        }

        let th = self.theta;
        let thdot = self.theta_dot;
        let u = action.clamp(ACTION_MIN, ACTION_MAX);

        let cost = angle_normalize(th).powi(2) + 0.1 * thdot.powi(2) + 0.001 * u.powi(2);

        let new_thdot = thdot
            + (3.0 * GRAVITY / (2.0 * LENGTH) * th.sin() + 3.0 / (MASS * LENGTH * LENGTH) * u)
                * DT;
        // angle integrates the unclamped velocity
        let new_th = th + new_thdot * DT;

        self.theta = new_th;
        self.theta_dot = new_thdot.clamp(-MAX_SPEED, MAX_SPEED);
        self.last_torque = Some(u);
        self.elapsed_steps += 1;

        Ok(StepOutcome {
            observation: self.observation(),
            reward: -cost,
            done: self.elapsed_steps >= self.time_limit,
        })
    }

    fn render(&mut self) -> io::Result<()> {
        let frame = self.render_frame();
        if self.renderer.is_none() {
            self.renderer = Some(TerminalRenderer::stderr()?);
        }
        if let Some(renderer) = &mut self.renderer {
            renderer.draw(&frame)?;
        }
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        if let Some(mut renderer) = self.renderer.take() {
            renderer.finish()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_angle_normalize_wraps_into_range() {
        assert!((angle_normalize(0.0)).abs() < 1e-6);
        assert!((angle_normalize(2.0 * PI)).abs() < 1e-5);
        assert!((angle_normalize(3.0 * PI / 2.0) + PI / 2.0).abs() < 1e-5);
        assert!((angle_normalize(-3.0 * PI / 2.0) - PI / 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_observation_is_unit_circle_and_velocity() {
        let mut env = Pendulum::from_seed(7);
        let obs = env.reset();
        assert_eq!(obs.dim(), 3);
        let norm = obs[0].powi(2) + obs[1].powi(2);
        assert!((norm - 1.0).abs() < 1e-5);
        assert!((-1.0..=1.0).contains(&obs[2]));
    }

    #[test]
    fn test_same_seed_same_episode() {
        let mut a = Pendulum::from_seed(3);
        let mut b = Pendulum::from_seed(3);
        assert_eq!(a.reset(), b.reset());
        for action in [0.5, -2.0, 1.0] {
            assert_eq!(a.step(action).unwrap(), b.step(action).unwrap());
        }
    }

    #[test]
    fn test_upright_at_rest_has_zero_reward() {
        let mut env = Pendulum::from_seed(0);
        env.set_state(0.0, 0.0);
        let outcome = env.step(0.0).unwrap();
        assert!(outcome.reward.abs() < 1e-6);
        assert!((env.theta()).abs() < 1e-6);
    }

    #[test]
    fn test_hanging_down_has_large_cost() {
        let mut env = Pendulum::from_seed(0);
        env.set_state(PI, 0.0);
        let outcome = env.step(0.0).unwrap();
        assert!(outcome.reward < -9.0);
    }

    #[test]
    fn test_torque_is_clamped() {
        let mut a = Pendulum::from_seed(0);
        let mut b = Pendulum::from_seed(0);
        a.set_state(0.3, 0.0);
        b.set_state(0.3, 0.0);
        let big = a.step(100.0).unwrap();
        let max = b.step(ACTION_MAX).unwrap();
        assert_eq!(big, max);
    }

    #[test]
    fn test_velocity_is_clamped() {
        let mut env = Pendulum::from_seed(0);
        env.set_state(PI / 2.0, MAX_SPEED);
        env.step(ACTION_MAX).unwrap();
        assert!(env.theta_dot() <= MAX_SPEED);
    }

    #[test]
    fn test_done_after_time_limit() {
        let mut env = Pendulum::from_seed(1).with_time_limit(3);
        env.reset();
        assert!(!env.step(0.0).unwrap().done);
        assert!(!env.step(0.0).unwrap().done);
        assert!(env.step(0.0).unwrap().done);
        env.reset();
        assert_eq!(env.elapsed_steps(), 0);
    }

    #[test]
    fn test_steps_past_time_limit_keep_simulating() {
        let mut env = Pendulum::from_seed(1).with_time_limit(1);
        env.reset();
        assert!(env.step(0.0).unwrap().done);
        let theta = env.theta();
        let outcome = env.step(2.0).unwrap();
        assert!(outcome.done);
        assert_eq!(env.elapsed_steps(), 2);
        assert_ne!(env.theta(), theta);
    }

    #[test]
    fn test_non_finite_action_is_rejected() {
        let mut env = Pendulum::from_seed(1);
        let err = env.step(f32::NAN).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_close_without_render_is_noop() {
        let mut env = Pendulum::from_seed(1);
        env.close().unwrap();
    }
}

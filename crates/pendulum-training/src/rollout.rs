//! Heuristic rollouts that produce the training dataset.
//!
//! A reactive controller explores the action space and keeps only episodes that
//! reach a single-step reward above the acceptance threshold.
//!
//! # Heuristic Policy
//!
//! ```text
//! previous reward == 1.0 (no signal yet) → U[-2, 2]
//! reward got worse                        → switch sign band: a > 0 → U[-2, 0], else U[0, 2]
//! reward improved or stayed equal         → keep sign band:   a < 0 → U[-2, 0], else U[0, 2]
//! ```
//!
//! # Acceptance
//!
//! An episode stops as soon as the immediate step reward exceeds the threshold
//! (`-0.1`); the cumulative score is not thresholded. Episodes that stop this
//! way contribute every recorded `(previous observation, action)` pair to the
//! dataset. Episodes that run out of steps are discarded.

use pendulum_engine::{ACTION_MAX, ACTION_MIN, Action, Environment, Observation};
use pendulum_stats::{descriptive::DescriptiveStats, percentiles::Percentiles};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    TrainingError,
    dataset::{TrainingDataset, TrainingSample},
};

/// Reward value standing for "no previous step yet".
pub const NO_SIGNAL_REWARD: f32 = 1.0;

/// Rollout configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RolloutParams {
    /// Number of episodes to play
    pub initial_games: usize,
    /// Step cap per episode
    pub goal_steps: usize,
    /// An episode is accepted once a step reward exceeds this value
    pub acceptance_threshold: f32,
}

impl Default for RolloutParams {
    fn default() -> Self {
        Self {
            initial_games: 10_000,
            goal_steps: 500,
            acceptance_threshold: -0.1,
        }
    }
}

/// Reactive action selection used to explore the environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicPolicy;

impl HeuristicPolicy {
    pub fn initial_action<R>(self, rng: &mut R) -> Action
    where
        R: Rng + ?Sized,
    {
        rng.random_range(ACTION_MIN..=ACTION_MAX)
    }

    /// Chooses the action for the next step from the last two rewards.
    #[expect(clippy::float_cmp)]
    pub fn next_action<R>(self, action: Action, prev_reward: f32, reward: f32, rng: &mut R) -> Action
    where
        R: Rng + ?Sized,
    {
        if prev_reward == NO_SIGNAL_REWARD {
            return rng.random_range(ACTION_MIN..=ACTION_MAX);
        }
        let negative_band = if prev_reward > reward {
            action > 0.0
        } else {
            action < 0.0
        };
        if negative_band {
            rng.random_range(ACTION_MIN..=0.0)
        } else {
            rng.random_range(0.0..=ACTION_MAX)
        }
    }
}

/// Data and diagnostics collected by [`RolloutGenerator::generate`].
#[derive(Debug, Clone)]
pub struct RolloutSummary {
    pub dataset: TrainingDataset,
    /// Score (sum of rewards) of every accepted episode
    pub accepted_scores: Vec<f32>,
    /// Score of every episode, accepted or not
    pub all_scores: Vec<f32>,
    pub accepted_stats: DescriptiveStats,
}

impl RolloutSummary {
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn acceptance_rate(&self) -> f32 {
        if self.all_scores.is_empty() {
            0.0
        } else {
            self.accepted_scores.len() as f32 / self.all_scores.len() as f32
        }
    }

    /// Nearest-rank percentiles of the accepted scores.
    #[must_use]
    pub fn accepted_percentiles(&self, points: &[f32]) -> Percentiles {
        Percentiles::new(&self.accepted_scores, points)
    }
}

/// Outcome of a single episode.
#[derive(Debug, Clone)]
struct Episode {
    samples: Vec<TrainingSample>,
    score: f32,
    accepted: bool,
}

/// Plays heuristic episodes and keeps the accepted ones.
#[derive(Debug, Clone, Default)]
pub struct RolloutGenerator {
    params: RolloutParams,
    policy: HeuristicPolicy,
}

impl RolloutGenerator {
    #[must_use]
    pub fn new(params: RolloutParams) -> Self {
        Self {
            params,
            policy: HeuristicPolicy,
        }
    }

    #[must_use]
    pub fn params(&self) -> &RolloutParams {
        &self.params
    }

    /// Plays `initial_games` episodes.
    ///
    /// Fails with [`TrainingError::EmptyDataset`] when no episode is accepted.
    pub fn generate<E, R>(&self, env: &mut E, rng: &mut R) -> Result<RolloutSummary, TrainingError>
    where
        E: Environment + ?Sized,
        R: Rng + ?Sized,
    {
        let mut dataset = TrainingDataset::new();
        let mut accepted_scores = vec![];
        let mut all_scores = Vec::with_capacity(self.params.initial_games);

        for _ in 0..self.params.initial_games {
            env.reset();
            let episode = self.play_episode(env, rng)?;
            if episode.accepted {
                accepted_scores.push(episode.score);
                dataset.extend(episode.samples)?;
            }
            all_scores.push(episode.score);
        }

        let accepted_stats = DescriptiveStats::new(accepted_scores.iter().copied())
            .ok_or(TrainingError::EmptyDataset)?;
        tracing::info!(
            episodes = all_scores.len(),
            accepted = accepted_scores.len(),
            samples = dataset.len(),
            "rollouts finished"
        );
        tracing::info!(
            mean = accepted_stats.mean,
            median = accepted_stats.median,
            "accepted scores"
        );

        Ok(RolloutSummary {
            dataset,
            accepted_scores,
            all_scores,
            accepted_stats,
        })
    }

    fn play_episode<E, R>(&self, env: &mut E, rng: &mut R) -> Result<Episode, TrainingError>
    where
        E: Environment + ?Sized,
        R: Rng + ?Sized,
    {
        let threshold = self.params.acceptance_threshold;
        let mut samples = vec![];
        let mut score = 0.0;
        let mut prev_observation: Option<Observation> = None;
        let mut prev_reward = NO_SIGNAL_REWARD;
        let mut last_reward = None;
        let mut action = self.policy.initial_action(rng);

        for _ in 0..self.params.goal_steps {
            let outcome = env.step(action)?;
            if let Some(observation) = prev_observation.take() {
                samples.push(TrainingSample {
                    observation,
                    action,
                });
            }
            prev_observation = Some(outcome.observation);
            score += outcome.reward;

            action = self
                .policy
                .next_action(action, prev_reward, outcome.reward, rng);
            prev_reward = outcome.reward;
            last_reward = Some(outcome.reward);
            if outcome.reward > threshold {
                break;
            }
        }

        Ok(Episode {
            samples,
            score,
            accepted: last_reward.is_some_and(|r| r > threshold),
        })
    }
}

//! End-to-end training run: rollouts, evolution, evaluation.

use pendulum_engine::{ACTION_MAX, ACTION_MIN, Action, Environment, Observation};
use pendulum_stats::descriptive::DescriptiveStats;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    TrainingError,
    fitness::ProjectionFitness,
    genetic::{FitnessHistory, GenerationSummary, GeneticAlgorithmParams, GeneticOptimizer},
    predictor::Predictor,
    rollout::{RolloutGenerator, RolloutParams},
    weights::WeightVector,
};

/// Every knob of a training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    pub rollout: RolloutParams,
    pub genetic: GeneticAlgorithmParams,
    /// Games played with the evolved policy after training
    pub evaluation_games: usize,
    /// Reference score printed next to the evaluation result
    pub score_requirement: f32,
    /// Render every evaluation step
    pub render: bool,
    /// Seed the run was started with, if any
    pub seed: Option<u64>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            rollout: RolloutParams::default(),
            genetic: GeneticAlgorithmParams::default(),
            evaluation_games: 10,
            score_requirement: 50.0,
            render: false,
            seed: None,
        }
    }
}

/// Rollout diagnostics kept in the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RolloutReport {
    pub episodes: usize,
    pub accepted_episodes: usize,
    pub samples: usize,
    pub accepted_scores: DescriptiveStats,
}

/// Results of [`run_experiment`].
#[derive(Debug, Clone, Serialize)]
pub struct ExperimentReport {
    pub config: ExperimentConfig,
    pub rollout: RolloutReport,
    /// Evolved policy. Kept in memory only.
    #[serde(skip)]
    pub best_weights: WeightVector,
    pub best_fitness: f32,
    #[serde(skip)]
    pub fitness_history: FitnessHistory,
    pub generations: Vec<GenerationSummary>,
    pub evaluation_scores: Vec<f32>,
    pub average_evaluation_score: f32,
    /// Distribution of the actions taken during evaluation
    pub actions: Option<DescriptiveStats>,
}

/// Runs the whole experiment on `env`.
///
/// The environment is closed before returning, whichever phase fails.
pub fn run_experiment<E, R>(
    config: ExperimentConfig,
    env: &mut E,
    rng: &mut R,
) -> Result<ExperimentReport, TrainingError>
where
    E: Environment + ?Sized,
    R: Rng + ?Sized,
{
    let report = train_and_evaluate(config, env, rng);
    let closed = env.close();
    let report = report?;
    closed?;
    Ok(report)
}

fn train_and_evaluate<E, R>(
    config: ExperimentConfig,
    env: &mut E,
    rng: &mut R,
) -> Result<ExperimentReport, TrainingError>
where
    E: Environment + ?Sized,
    R: Rng + ?Sized,
{
    // fail on a bad population config before spending time on rollouts
    let optimizer = GeneticOptimizer::new(config.genetic.clone(), ProjectionFitness)?;

    let rollouts = RolloutGenerator::new(config.rollout.clone()).generate(env, rng)?;
    let rollout = RolloutReport {
        episodes: rollouts.all_scores.len(),
        accepted_episodes: rollouts.accepted_scores.len(),
        samples: rollouts.dataset.len(),
        accepted_scores: rollouts.accepted_stats.clone(),
    };

    let optimized = optimizer.optimize(&rollouts.dataset, rng)?;
    let predictor = Predictor::new(optimized.best_weights.clone());

    let evaluation = evaluate_policy(&predictor, &config, env, rng)?;

    let average_evaluation_score = mean(&evaluation.scores);
    tracing::info!(
        average = average_evaluation_score,
        required = config.score_requirement,
        "evaluation finished"
    );

    Ok(ExperimentReport {
        rollout,
        best_weights: optimized.best_weights,
        best_fitness: optimized.best_fitness,
        generations: optimized.history.summaries().collect(),
        fitness_history: optimized.history,
        evaluation_scores: evaluation.scores,
        average_evaluation_score,
        actions: DescriptiveStats::new(evaluation.actions),
        config,
    })
}

/// Scores and actions of the evaluation games.
#[derive(Debug, Clone, Default)]
pub struct Evaluation {
    pub scores: Vec<f32>,
    pub actions: Vec<Action>,
}

/// Plays `evaluation_games` games with `predictor`.
///
/// The first action of a game is random; later actions are predicted from the
/// previous observation. A game ends after `goal_steps` steps or once a step
/// reward exceeds the acceptance threshold.
pub fn evaluate_policy<E, R>(
    predictor: &Predictor,
    config: &ExperimentConfig,
    env: &mut E,
    rng: &mut R,
) -> Result<Evaluation, TrainingError>
where
    E: Environment + ?Sized,
    R: Rng + ?Sized,
{
    let mut evaluation = Evaluation::default();
    for game in 0..config.evaluation_games {
        env.reset();
        let mut score = 0.0;
        let mut prev_observation: Option<Observation> = None;
        for _ in 0..config.rollout.goal_steps {
            if config.render {
                env.render()?;
            }
            let action = match &prev_observation {
                Some(observation) => predictor.predict(observation)?,
                None => rng.random_range(ACTION_MIN..=ACTION_MAX),
            };
            evaluation.actions.push(action);
            let outcome = env.step(action)?;
            score += outcome.reward;
            prev_observation = Some(outcome.observation);
            if outcome.reward > config.rollout.acceptance_threshold {
                break;
            }
        }
        tracing::info!(game, score, "evaluation game finished");
        evaluation.scores.push(score);
    }
    Ok(evaluation)
}

#[expect(clippy::cast_precision_loss)]
fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f32>() / values.len() as f32
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use pendulum_engine::{Pendulum, StepOutcome};
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    /// Accepts every episode on its third step.
    #[derive(Debug, Default)]
    struct ThreeStepEnv {
        steps: usize,
        renders: usize,
        closed: bool,
    }

    impl Environment for ThreeStepEnv {
        fn observation_dim(&self) -> usize {
            3
        }

        fn reset(&mut self) -> Observation {
            self.steps = 0;
            Observation::from([1.0, 0.0, 0.0])
        }

        #[expect(clippy::cast_precision_loss)]
        fn step(&mut self, action: Action) -> io::Result<StepOutcome> {
            self.steps += 1;
            let reward = if self.steps >= 3 { -0.05 } else { -1.0 };
            Ok(StepOutcome {
                observation: Observation::from([1.0, self.steps as f32, action]),
                reward,
                done: false,
            })
        }

        fn render(&mut self) -> io::Result<()> {
            self.renders += 1;
            Ok(())
        }

        fn close(&mut self) -> io::Result<()> {
            self.closed = true;
            Ok(())
        }
    }

    fn small_config() -> ExperimentConfig {
        ExperimentConfig {
            rollout: RolloutParams {
                initial_games: 4,
                goal_steps: 10,
                ..RolloutParams::default()
            },
            genetic: GeneticAlgorithmParams {
                num_generations: 6,
                ..GeneticAlgorithmParams::default()
            },
            evaluation_games: 3,
            ..ExperimentConfig::default()
        }
    }

    #[test]
    fn test_run_experiment_end_to_end() {
        let mut env = ThreeStepEnv::default();
        let report =
            run_experiment(small_config(), &mut env, &mut Pcg32::seed_from_u64(5)).unwrap();

        assert_eq!(report.rollout.episodes, 4);
        assert_eq!(report.rollout.accepted_episodes, 4);
        assert_eq!(report.rollout.samples, 8);
        assert_eq!(report.best_weights.len(), 3);
        assert_eq!(report.fitness_history.len(), 6);
        assert_eq!(report.generations.len(), 6);
        assert_eq!(report.evaluation_scores.len(), 3);
        assert!((report.average_evaluation_score + 2.05).abs() < 1e-5);
        assert_eq!(report.actions.as_ref().unwrap().count, 9);
        assert_eq!(env.renders, 0);
        assert!(env.closed);
    }

    #[test]
    fn test_render_is_called_every_evaluation_step() {
        let mut env = ThreeStepEnv::default();
        let config = ExperimentConfig {
            render: true,
            ..small_config()
        };
        run_experiment(config, &mut env, &mut Pcg32::seed_from_u64(5)).unwrap();
        assert_eq!(env.renders, 9);
    }

    #[test]
    fn test_invalid_config_fails_before_rollouts() {
        let mut env = ThreeStepEnv::default();
        let mut config = small_config();
        config.genetic.crossover_rate = 0.0;
        let err = run_experiment(config, &mut env, &mut Pcg32::seed_from_u64(5)).unwrap_err();
        assert!(matches!(err, TrainingError::InvalidPopulationConfig(_)));
        assert_eq!(env.steps, 0);
        assert!(env.closed);
    }

    #[test]
    fn test_env_is_closed_when_rollouts_fail() {
        let mut env = ThreeStepEnv::default();
        let mut config = small_config();
        // no step reward of the mock exceeds zero
        config.rollout.acceptance_threshold = 0.0;
        let err = run_experiment(config, &mut env, &mut Pcg32::seed_from_u64(5)).unwrap_err();
        assert!(matches!(err, TrainingError::EmptyDataset));
        assert!(env.steps > 0);
        assert!(env.closed);
    }

    #[test]
    fn test_report_serializes_without_weights() {
        let mut env = ThreeStepEnv::default();
        let report =
            run_experiment(small_config(), &mut env, &mut Pcg32::seed_from_u64(5)).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("best_weights").is_none());
        assert!(json.get("fitness_history").is_none());
        assert_eq!(json["generations"].as_array().unwrap().len(), 6);
        assert_eq!(json["config"]["genetic"]["num_solutions"], 8);
    }

    #[test]
    fn test_pendulum_rollouts_without_acceptance_fail() {
        // pendulum rewards are never positive
        let mut env = Pendulum::from_seed(9);
        let config = ExperimentConfig {
            rollout: RolloutParams {
                initial_games: 3,
                goal_steps: 1,
                acceptance_threshold: 0.0,
            },
            ..ExperimentConfig::default()
        };
        let err = run_experiment(config, &mut env, &mut Pcg32::seed_from_u64(1)).unwrap_err();
        assert!(matches!(err, TrainingError::EmptyDataset));
    }
}

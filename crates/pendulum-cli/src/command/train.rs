use std::path::PathBuf;

use chrono::{DateTime, Utc};
use pendulum_training::{
    experiment::{self, ExperimentConfig, ExperimentReport},
    genetic::GeneticAlgorithmParams,
    rollout::RolloutParams,
};
use serde::Serialize;

use crate::util::Output;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Number of heuristic episodes used to build the dataset
    #[arg(long, default_value_t = RolloutParams::default().initial_games)]
    initial_games: usize,
    /// Maximum steps per episode
    #[arg(long, default_value_t = RolloutParams::default().goal_steps)]
    goal_steps: usize,
    /// Number of generations to evolve
    #[arg(long, default_value_t = GeneticAlgorithmParams::default().num_generations)]
    generations: usize,
    /// Population size
    #[arg(long, default_value_t = GeneticAlgorithmParams::default().num_solutions)]
    solutions: usize,
    /// Parents kept every generation
    #[arg(long, default_value_t = GeneticAlgorithmParams::default().num_parents)]
    parents: usize,
    /// Probability of accepting a crossover pairing
    #[arg(long, default_value_t = GeneticAlgorithmParams::default().crossover_rate)]
    crossover_rate: f32,
    /// Probability of mutating an offspring
    #[arg(long, default_value_t = GeneticAlgorithmParams::default().mutation_rate)]
    mutation_rate: f32,
    /// Games played with the evolved policy
    #[arg(long, default_value_t = ExperimentConfig::default().evaluation_games)]
    evaluation_games: usize,
    /// Render the pendulum during evaluation
    #[arg(long)]
    render: bool,
    /// Seed for the RNG and the pendulum
    #[arg(long)]
    seed: Option<u64>,
    /// Write the run report as JSON to this path ("-" for stdout)
    #[arg(long)]
    report: Option<PathBuf>,
}

impl TrainArg {
    fn to_config(&self) -> ExperimentConfig {
        let defaults = ExperimentConfig::default();
        ExperimentConfig {
            rollout: RolloutParams {
                initial_games: self.initial_games,
                goal_steps: self.goal_steps,
                ..defaults.rollout
            },
            genetic: GeneticAlgorithmParams {
                num_solutions: self.solutions,
                num_parents: self.parents,
                num_generations: self.generations,
                crossover_rate: self.crossover_rate,
                mutation_rate: self.mutation_rate,
                ..defaults.genetic
            },
            evaluation_games: self.evaluation_games,
            render: self.render,
            seed: self.seed,
            ..defaults
        }
    }
}

#[derive(Debug, Serialize)]
struct RunReport<'a> {
    trained_at: DateTime<Utc>,
    #[serde(flatten)]
    report: &'a ExperimentReport,
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let config = arg.to_config();
    let (mut rng, mut env) = super::seeded(arg.seed);

    let report = experiment::run_experiment(config, &mut env, &mut rng)?;
    print_summary(&report);

    if let Some(path) = &arg.report {
        let path = (path.as_os_str() != "-").then(|| path.clone());
        let run_report = RunReport {
            trained_at: Utc::now(),
            report: &report,
        };
        Output::save_json(&run_report, path)?;
    }
    Ok(())
}

fn print_summary(report: &ExperimentReport) {
    eprintln!("Rollouts:");
    eprintln!(
        "  Accepted: {} / {} episodes ({} samples)",
        report.rollout.accepted_episodes, report.rollout.episodes, report.rollout.samples
    );
    eprintln!(
        "  Score:    mean {:.3}, median {:.3}",
        report.rollout.accepted_scores.mean, report.rollout.accepted_scores.median
    );

    eprintln!("Evolution:");
    if let (Some(first), Some(last)) = (report.generations.first(), report.generations.last()) {
        eprintln!(
            "  Mean fitness: {:.3} (gen {}) -> {:.3} (gen {})",
            first.mean, first.generation, last.mean, last.generation
        );
    }
    eprintln!("  Best fitness: {:.3}", report.best_fitness);
    eprintln!("  Best weights: {:.3?}", report.best_weights);

    eprintln!("Evaluation:");
    for (game, score) in report.evaluation_scores.iter().enumerate() {
        eprintln!("  Game {game:2}: {score:.3}");
    }
    eprintln!(
        "  Average score: {:.3} (requirement {:.3})",
        report.average_evaluation_score, report.config.score_requirement
    );
    if let Some(actions) = &report.actions {
        eprintln!(
            "  Actions: mean {:.3}, std dev {:.3}, range [{:.3}, {:.3}]",
            actions.mean, actions.std_dev, actions.min, actions.max
        );
    }
}

use pendulum_stats::percentiles::Percentiles;
use pendulum_training::rollout::{RolloutGenerator, RolloutParams};

const PERCENTILES: [f32; 5] = [10.0, 25.0, 50.0, 75.0, 90.0];

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct GenerateRolloutsArg {
    /// Number of heuristic episodes to play
    #[arg(long, default_value_t = RolloutParams::default().initial_games)]
    initial_games: usize,
    /// Maximum steps per episode
    #[arg(long, default_value_t = RolloutParams::default().goal_steps)]
    goal_steps: usize,
    /// Seed for the RNG and the pendulum
    #[arg(long)]
    seed: Option<u64>,
}

pub(crate) fn run(arg: &GenerateRolloutsArg) -> anyhow::Result<()> {
    let GenerateRolloutsArg {
        initial_games,
        goal_steps,
        seed,
    } = *arg;
    let (mut rng, mut env) = super::seeded(seed);

    let params = RolloutParams {
        initial_games,
        goal_steps,
        ..RolloutParams::default()
    };
    let summary = RolloutGenerator::new(params).generate(&mut env, &mut rng)?;
    let stats = &summary.accepted_stats;

    eprintln!("Rollouts:");
    eprintln!("  Episodes:        {}", summary.all_scores.len());
    eprintln!("  Accepted:        {}", summary.accepted_scores.len());
    eprintln!(
        "  Acceptance rate: {:.2}%",
        summary.acceptance_rate() * 100.0
    );
    eprintln!("  Samples:         {}", summary.dataset.len());
    eprintln!("Accepted scores:");
    eprintln!("  Mean:    {:.3}", stats.mean);
    eprintln!("  Median:  {:.3}", stats.median);
    eprintln!("  Min:     {:.3}", stats.min);
    eprintln!("  Max:     {:.3}", stats.max);
    eprintln!("  Std dev: {:.3}", stats.std_dev);
    eprintln!("Percentiles:");
    let percentiles: Percentiles = summary.accepted_percentiles(&PERCENTILES);
    for (p, value) in percentiles.iter() {
        eprintln!("  P{p:<3} {value:.3}");
    }
    Ok(())
}

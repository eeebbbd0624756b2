use clap::{Parser, Subcommand};
use pendulum_engine::Pendulum;
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;

use self::{generate_rollouts::GenerateRolloutsArg, train::TrainArg};

mod generate_rollouts;
mod train;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Generate rollouts, evolve a policy and evaluate it
    Train(#[clap(flatten)] TrainArg),
    /// Play heuristic rollouts and print dataset statistics
    GenerateRollouts(#[clap(flatten)] GenerateRolloutsArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Train(arg) => train::run(&arg)?,
        Mode::GenerateRollouts(arg) => generate_rollouts::run(&arg)?,
    }
    Ok(())
}

/// RNG and pendulum for a run, both reproducible when `seed` is given.
///
/// The pendulum is seeded from the first draw of the RNG so the two never
/// share a random stream.
fn seeded(seed: Option<u64>) -> (Pcg32, Pendulum) {
    let mut rng = match seed {
        Some(seed) => Pcg32::seed_from_u64(seed),
        None => Pcg32::from_rng(&mut rand::rng()),
    };
    let env = Pendulum::from_seed(rng.random());
    (rng, env)
}

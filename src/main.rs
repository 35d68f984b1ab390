use std::path::PathBuf;

use anyhow::{ensure, Context, Result};
use clap::{ArgAction, Parser};
use gridworld::{
    algo::{Fallback, ValueTableAgent, ValueTableAgentConfig},
    decay::{self, Schedule},
    exploration::EpsilonGreedy,
    gym::{self, GridConfig, GridWorld},
    Error,
};
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser)]
#[command(name = "gridworld")]
#[command(version, about = "Learn state values on a 3x4 grid world by backing up episode rewards")]
struct Cli {
    /// Number of training rounds; the value table is printed before and after each
    #[arg(long, default_value_t = 10)]
    iterations: u32,

    /// Episodes per round
    #[arg(long, default_value_t = 5)]
    episodes: u32,

    /// Actions allowed per episode before it is abandoned
    #[arg(long, default_value_t = 1000)]
    max_steps: u32,

    /// Exploration rate
    #[arg(long, default_value_t = 0.3)]
    epsilon: f32,

    /// Decay epsilon exponentially towards 0.01 at this rate per episode
    #[arg(long)]
    epsilon_decay: Option<f32>,

    /// Learning rate
    #[arg(long, default_value_t = 0.2)]
    alpha: f32,

    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Fail instead of taking the least bad action when every move looks negative
    #[arg(long)]
    strict: bool,

    /// Write one row per episode to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Print the board layout before training
    #[arg(long)]
    show_board: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

const EPSILON_FLOOR: f32 = 0.01;

fn exploration(cli: &Cli) -> Result<EpsilonGreedy<Schedule>> {
    ensure!(
        (0.0..=1.0).contains(&cli.epsilon),
        "--epsilon must be in [0, 1], got {}",
        cli.epsilon
    );

    let schedule = match cli.epsilon_decay {
        Some(rate) => Schedule::Exponential(
            decay::Exponential::new(rate, cli.epsilon, EPSILON_FLOOR)
                .context("invalid epsilon decay schedule")?,
        ),
        None => Schedule::Constant(decay::Constant::new(cli.epsilon)),
    };

    Ok(EpsilonGreedy::new(schedule))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    ensure!(
        (0.0..=1.0).contains(&cli.alpha),
        "--alpha must be in [0, 1], got {}",
        cli.alpha
    );

    let config = GridConfig::default();
    let mut env = GridWorld::new(config);
    let mut agent = ValueTableAgent::new(
        &env,
        ValueTableAgentConfig {
            exploration: exploration(&cli)?,
            alpha: cli.alpha,
            fallback: if cli.strict {
                Fallback::Strict
            } else {
                Fallback::BestValue
            },
            seed: cli.seed,
        },
    );

    let mut wtr = match &cli.csv {
        Some(path) => {
            let mut wtr = csv::Writer::from_path(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            wtr.write_record(["episode", "steps", "reward", "terminal_row", "terminal_col"])?;
            Some(wtr)
        }
        None => None,
    };

    if cli.show_board {
        print!("{}", gym::render_board(&config, config.start));
    }

    for i in 0..cli.iterations {
        println!("--------STARTING-------------");
        print!("{}", gym::render_values(&config, agent.state_value()));

        let (mut wins, mut losses, mut abandoned) = (0, 0, 0);
        for _ in 0..cli.episodes {
            let summary = match agent.go(&mut env, cli.max_steps) {
                Ok(summary) => summary,
                Err(Error::StepLimitExceeded { limit }) => {
                    log::warn!(
                        "episode {} abandoned after {limit} steps",
                        agent.episode() - 1
                    );
                    abandoned += 1;
                    continue;
                }
                Err(e) => return Err(e).context("episode failed"),
            };

            if summary.terminal == config.win {
                wins += 1;
            } else {
                losses += 1;
            }

            if let Some(wtr) = wtr.as_mut() {
                wtr.write_record(&[
                    summary.episode.to_string(),
                    summary.steps.to_string(),
                    summary.reward.to_string(),
                    summary.terminal.0.to_string(),
                    summary.terminal.1.to_string(),
                ])?;
            }
        }

        print!("{}", gym::render_values(&config, agent.state_value()));
        println!("----------END----------------");
        log::info!("round {}: {wins} won, {losses} lost, {abandoned} abandoned", i + 1);
    }

    if let Some(mut wtr) = wtr {
        wtr.flush()?;
    }

    Ok(())
}

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};

use sweeper_agent::{Mode, OracleConfig, play};
use sweeper_common::models::{GameOutcome, GameParams};

/// Minesweeper played by an external ASP solver.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Board width in cells
    #[arg(long, default_value_t = 9)]
    width: usize,

    /// Board height in cells
    #[arg(long, default_value_t = 9)]
    height: usize,

    /// Number of mines, must be less than width * height
    #[arg(long, default_value_t = 10)]
    mines: usize,

    /// Which rule programs to consult each round
    #[arg(long, value_enum, default_value_t = Mode::Broad)]
    mode: Mode,

    /// Solver executable (clingo-compatible)
    #[arg(long, default_value = "clingo")]
    solver: PathBuf,

    /// Rule program deriving certain-safe atoms
    #[arg(long, default_value = "minesweeper_player.lp")]
    strict_rules: PathBuf,

    /// Rule program enumerating candidate-safe models
    #[arg(long, default_value = "minesweeper_nostep.lp")]
    broad_rules: PathBuf,

    /// File the board facts are written to before each solver call
    #[arg(long, default_value = "game_board_data.lp")]
    facts_file: PathBuf,

    /// Wall-clock budget per solver query, in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let params = GameParams {
        width: args.width,
        height: args.height,
        mines: args.mines,
    };
    let oracle = OracleConfig {
        solver: args.solver,
        strict_rules: args.strict_rules,
        broad_rules: args.broad_rules,
        facts_file: args.facts_file,
        limit: Duration::from_secs(args.timeout),
        mode: args.mode,
    };

    match play::run(&params, &oracle).await {
        Ok(GameOutcome::Won) => info!("Game won"),
        Ok(GameOutcome::Lost) => info!("Game lost"),
        Ok(GameOutcome::InProgress) => unreachable!("the loop only returns terminal outcomes"),
        Err(err) => {
            error!("Game aborted: {err}");
            std::process::exit(1);
        }
    }
}

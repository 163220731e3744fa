//! Ballz Solver entry point
//!
//! Reads a board snapshot saved as JSON, searches for the best launch angle
//! and prints the decision with the swipe that would fire it.

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};

use ballz_solver::device::{Actuator, DryRunActuator, JsonFileProvider, SnapshotProvider};
use ballz_solver::search::{AngleSearch, SearchOptions, default_angles};
use ballz_solver::sim::{TraceObserver, simulate_with};
use ballz_solver::{Calibration, SolverResult, consts};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Calibration JSON (defaults to the built-in 1080px calibration)
    #[arg(global = true, long)]
    calibration: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search every candidate angle and report the best one
    Solve(SolveArgs),
    /// Replay a single angle and print the predicted board
    Simulate(SimulateArgs),
    /// Print the default calibration as JSON
    Calibration,
}

#[derive(Args, Debug)]
struct SolveArgs {
    /// Snapshot JSON: { "launch": [x, y], "grid": [[..7]..7], "extra_ball_count": n }
    #[arg(short, long)]
    snapshot: PathBuf,

    #[arg(long, default_value_t = consts::DEFAULT_MAX_BALLS)]
    max_balls: u32,

    /// Comma separated candidate angles in degrees
    #[arg(long, value_delimiter = ',')]
    angles: Option<Vec<f64>>,

    /// Evaluate candidates one at a time
    #[arg(long, default_value_t = false)]
    sequential: bool,

    /// Log the swipe instead of only printing it
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

#[derive(Args, Debug)]
struct SimulateArgs {
    #[arg(short, long)]
    snapshot: PathBuf,

    #[arg(short, long, default_value_t = 45.0)]
    angle: f64,

    /// Ball count (defaults to the snapshot's)
    #[arg(short, long)]
    balls: Option<u32>,

    /// Trace ball positions every N ticks (RUST_LOG=trace)
    #[arg(long, default_value_t = 10)]
    trace_every: u32,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        log::error!("{e}");
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> SolverResult<()> {
    let calibration = match &cli.calibration {
        Some(path) => Calibration::load(path)?,
        None => Calibration::default(),
    };

    match cli.command {
        Commands::Solve(args) => solve(args, calibration),
        Commands::Simulate(args) => replay(args, calibration),
        Commands::Calibration => {
            println!("{}", serde_json::to_string_pretty(&calibration)?);
            Ok(())
        }
    }
}

fn solve(args: SolveArgs, calibration: Calibration) -> SolverResult<()> {
    let snapshot = JsonFileProvider::new(&args.snapshot).board_snapshot()?;
    println!("{}", snapshot.grid);

    let options = SearchOptions {
        angles: args.angles.unwrap_or_else(default_angles),
        max_balls: args.max_balls,
        parallel: !args.sequential,
    };
    let search = AngleSearch::new(calibration, options);
    log::info!(
        "Evaluating {} angles with up to {} balls",
        search.options().angles.len(),
        search.options().max_balls
    );
    let decision = search.solve(&snapshot)?;
    let gesture = decision.swipe(&snapshot, search.calibration());

    println!(
        "Best: degrees={}, score={}, pseudo-runtime={}, balls={}",
        decision.angle_degrees, decision.score, decision.estimated_ticks, decision.balls_used
    );
    println!(
        "Swipe: ({:.0}, {:.0}) -> ({:.0}, {:.0}) over {} ms",
        gesture.from.x, gesture.from.y, gesture.to.x, gesture.to.y, gesture.duration_ms
    );
    println!("Estimated round: {} s", decision.estimated_wait().as_secs());
    println!("Predicted board:\n{}", decision.final_board);

    if args.dry_run {
        DryRunActuator::default().swipe(&gesture)?;
    }
    Ok(())
}

fn replay(args: SimulateArgs, calibration: Calibration) -> SolverResult<()> {
    let snapshot = JsonFileProvider::new(&args.snapshot).board_snapshot()?;
    let balls = args.balls.unwrap_or(snapshot.ball_count()).max(1);

    let mut observer = TraceObserver::new(args.trace_every);
    let outcome = simulate_with(
        &snapshot.grid,
        snapshot.launch_pos(),
        args.angle,
        balls,
        &calibration,
        &mut observer,
    )?;

    println!(
        "{} degs x {} balls -> score = {}, bonus = {}, loops = {}",
        args.angle, balls, outcome.score, outcome.bonus, outcome.ticks
    );
    println!("{}", outcome.board);
    Ok(())
}

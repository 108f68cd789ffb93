//! Raceway CLI
//!
//! Run a multithreaded race in the terminal and bet on the winner.

use clap::Parser;
use raceway_core::{RaceConfig, RacerProfile};
use raceway_env::{RaceEnv, SystemEnv};
use raceway_sim::report::{athlete_analysis, bet_lines, medical_report, podium_lines};
use raceway_sim::{RaceExport, Session, SessionReport, SimError, TrackRenderer};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Raceway terminal race simulator
#[derive(Parser, Debug)]
#[command(name = "raceway")]
#[command(about = "Run a multithreaded race and bet on the winner", long_about = None)]
struct Args {
    /// Track length in meters
    #[arg(short, long)]
    track_length: Option<u32>,

    /// Number of racers (1 to 20)
    #[arg(short, long)]
    racers: Option<usize>,

    /// Racer to bet on
    #[arg(short, long)]
    bet: Option<u32>,

    /// Master seed for roster and race draws (0 = random from time)
    #[arg(short, long, default_value = "0")]
    seed: u64,

    /// Pause between two steps of a racer, in milliseconds
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Pause between two frames of the live track, in milliseconds
    #[arg(long)]
    cadence_ms: Option<u64>,

    /// JSON file with a race configuration (flags override it)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Give every racer its own random stream
    #[arg(long)]
    per_racer_streams: bool,

    /// Do not clear the terminal between frames
    #[arg(long)]
    no_clear: bool,

    /// Skip the countdown before the start
    #[arg(long)]
    no_countdown: bool,

    /// JSON summary on stdout instead of the live track
    #[arg(long)]
    json: bool,

    /// Export every frame to a JSON file
    #[arg(long)]
    export: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Loads the config file, if any, and applies flag overrides.
    fn race_config(&self) -> Result<RaceConfig, SimError> {
        let mut config = match &self.config {
            Some(path) => RaceConfig::from_json_file(path)?,
            None => RaceConfig::default(),
        };
        if let Some(track_length) = self.track_length {
            config.track_length = track_length;
        }
        if let Some(racers) = self.racers {
            config.racer_count = racers;
        }
        if let Some(tick_ms) = self.tick_ms {
            config.tick_delay_ms = tick_ms;
        }
        if let Some(cadence_ms) = self.cadence_ms {
            config.monitor_cadence_ms = cadence_ms;
        }
        Ok(config)
    }
}

fn resolve_seed(seed: u64) -> u64 {
    if seed != 0 {
        return seed;
    }
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or(1)
        .max(1)
}

fn countdown(env: &impl RaceEnv, session: &Session) {
    let config = session.config();
    match session.bet() {
        Some(bet) => println!(
            ">>> {}m track. {} racers at the start. Bet on racer {}. <<<",
            config.track_length, config.racer_count, bet
        ),
        None => println!(
            ">>> {}m track. {} racers at the start. <<<",
            config.track_length, config.racer_count
        ),
    }
    env.sleep(Duration::from_secs(1));
    println!("\n>>> Get set... GO! <<<");
    env.sleep(Duration::from_secs(1));
}

fn print_results(report: &SessionReport) {
    let outcome = &report.outcome;
    println!();
    for line in podium_lines(outcome.podium()) {
        println!("{}", line);
    }
    println!();
    for line in medical_report(&outcome.eliminated()) {
        println!("{}", line);
    }
    if let Some((bet, _)) = report.bet {
        println!();
        for line in bet_lines(bet, outcome.podium()) {
            println!("{}", line);
        }
    }
}

fn json_summary(report: &SessionReport, session: &Session) -> serde_json::Value {
    let outcome = &report.outcome;
    serde_json::json!({
        "seed": report.seed,
        "track_length": session.config().track_length,
        "racers": session.roster().iter().map(|r| r.profile()).collect::<Vec<_>>(),
        "podium": outcome.podium(),
        "eliminated": outcome.eliminated(),
        "retired": outcome.retired(),
        "frames": outcome.monitor().frames,
        "elapsed_secs": outcome.final_snapshot().elapsed.as_secs_f64(),
        "bet": report.bet.map(|(racer, result)| serde_json::json!({
            "racer": racer,
            "result": result,
        })),
    })
}

fn run(args: &Args) -> Result<(), SimError> {
    let config = args.race_config()?;
    let seed = resolve_seed(args.seed);
    let session = Session::new(config, seed, args.bet)?.with_per_racer_streams(args.per_racer_streams);
    let env = SystemEnv::shared();
    let track_length = session.config().track_length;

    if !args.json {
        info!("Raceway v{} (seed={})", env!("CARGO_PKG_VERSION"), seed);
        for line in athlete_analysis(session.roster()) {
            println!("{}", line);
        }
        if !args.no_countdown && session.config().tick_delay_ms > 0 {
            countdown(env.as_ref(), &session);
        }
    }

    let renderer = TrackRenderer::new(track_length)
        .with_bet(args.bet)
        .with_clear(!args.no_clear);
    let profiles: Vec<RacerProfile> = session.roster().iter().map(|r| r.profile().clone()).collect();
    let mut export = args
        .export
        .as_ref()
        .map(|_| RaceExport::new(seed, track_length, profiles));
    let stdout = io::stdout();

    let report = session.run(Arc::clone(&env), |snapshot| {
        if let Some(export) = export.as_mut() {
            export.add_frame(snapshot);
        }
        if !args.json {
            if let Err(e) = renderer.draw(&mut stdout.lock(), snapshot) {
                warn!("Failed to draw frame: {}", e);
            }
        }
    })?;

    if let (Some(path), Some(export)) = (&args.export, export.as_mut()) {
        export.finalize(&report.outcome, args.bet);
        export.write_to_file(path)?;
        info!("Exported {} frames to {}", export.frames.len(), path);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&json_summary(&report, &session))?);
    } else {
        print_results(&report);
    }
    Ok(())
}

fn main() {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run(&args) {
        error!("{}", e);
        std::process::exit(1);
    }
}

//! War Forge - Main Binary
//!
//! Play, simulate and replay deterministic games of War

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::{json, Map, Value};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use war_forge_rs::{
    game::{
        render::{player_names, render_stats},
        CollectMode, GameLogger, GameLoop, GameObserver, RunGameOptions,
        StateHashMode, TieResolution, VerbosityLevel, WarRulesInput,
    },
    playback::{compute_playback_delay_ms, has_war_event, DEFAULT_PLAYBACK_DELAY_MS},
    simulate::{log_summary, simulate, SimulationOptions},
    trace::{replay_trace, view_trace, ReplayOptions, TraceFilter, TraceRecorder, TraceWriterOptions, ViewOptions},
};

/// Verbosity level for game output (custom parser supporting both names and numbers)
#[derive(Debug, Clone, Copy)]
struct VerbosityArg(VerbosityLevel);

impl std::str::FromStr for VerbosityArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "silent" | "0" => Ok(VerbosityArg(VerbosityLevel::Silent)),
            "minimal" | "low" | "1" => Ok(VerbosityArg(VerbosityLevel::Minimal)),
            "normal" | "2" => Ok(VerbosityArg(VerbosityLevel::Normal)),
            "verbose" | "high" | "3" => Ok(VerbosityArg(VerbosityLevel::Verbose)),
            _ => Err(format!(
                "invalid verbosity level '{s}' (expected: silent/0, minimal/low/1, normal/2, verbose/high/3)"
            )),
        }
    }
}

impl From<VerbosityArg> for VerbosityLevel {
    fn from(arg: VerbosityArg) -> Self {
        arg.0
    }
}

/// How recorded games are hashed each round
#[derive(Debug, Clone, Copy, ValueEnum)]
enum HashArg {
    Off,
    Counts,
    Full,
}

impl From<HashArg> for StateHashMode {
    fn from(arg: HashArg) -> Self {
        match arg {
            HashArg::Off => StateHashMode::Off,
            HashArg::Counts => StateHashMode::Counts,
            HashArg::Full => StateHashMode::Full,
        }
    }
}

/// Rule overrides shared by `play` and `simulate`
#[derive(Args, Debug, Clone)]
struct RulesArgs {
    /// Number of 52-card decks to shuffle together
    #[arg(long)]
    num_decks: Option<i64>,

    /// Face-down cards each player antes in a standard war
    #[arg(long)]
    war_face_down: Option<i64>,

    /// Where trick winners put collected cards (bottom-of-draw|won-pile)
    #[arg(long)]
    collect_mode: Option<CollectMode>,

    /// Recycle the won pile in award order instead of shuffling it
    #[arg(long)]
    no_shuffle_recycle: bool,

    /// End the game as a timeout after this many rounds
    #[arg(long, conflicts_with = "unlimited_rounds")]
    max_rounds: Option<i64>,

    /// Play until someone wins or the game stalls
    #[arg(long)]
    unlimited_rounds: bool,

    /// How ties are broken (standard-war|sudden-death)
    #[arg(long)]
    tie_resolution: Option<TieResolution>,
}

impl RulesArgs {
    fn to_input(&self) -> WarRulesInput {
        WarRulesInput {
            num_decks: self.num_decks,
            war_face_down_count: self.war_face_down,
            collect_mode: self.collect_mode,
            shuffle_won_pile_on_recycle: self.no_shuffle_recycle.then_some(false),
            max_rounds: self.max_rounds,
            unlimited_rounds: self.unlimited_rounds,
            tie_resolution: self.tie_resolution,
            ace_high: None,
        }
    }
}

#[derive(Parser)]
#[command(name = "war")]
#[command(about = "War Forge - deterministic War card game engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a game round by round (Enter = next round, a = toggle autoplay, s = stats, q = quit)
    Play {
        /// Player name; repeat for 2 to 4 players
        #[arg(long = "player", short = 'p', value_name = "NAME")]
        players: Vec<String>,

        /// Seed for the shuffle (defaults to a time-based seed)
        #[arg(long)]
        seed: Option<String>,

        #[command(flatten)]
        rules: RulesArgs,

        /// Emit a state hash after every round
        #[arg(long, value_enum, default_value = "off")]
        state_hash: HashArg,

        /// Record the game to this trace file
        #[arg(long, value_name = "FILE")]
        trace: Option<PathBuf>,

        /// Add a pile-count snapshot after each round to the trace
        #[arg(long, requires = "trace")]
        trace_snapshots: bool,

        /// Include the front card of each pile in trace snapshots
        #[arg(long, requires = "trace_snapshots")]
        trace_top_cards: bool,

        /// Start with autoplay on (rounds play in bursts between prompts)
        #[arg(long)]
        autoplay: bool,

        /// Delay between autoplayed rounds in milliseconds
        #[arg(long)]
        delay_ms: Option<f64>,

        /// Playback speed multiplier applied to the delay
        #[arg(long)]
        speed: Option<f64>,

        /// Stop autoplay after a war until Enter is pressed
        #[arg(long)]
        pause_on_war: bool,

        /// Verbosity level for game output (0=silent, 1=minimal, 2=normal, 3=verbose)
        #[arg(long, default_value = "normal", short = 'v')]
        verbosity: VerbosityArg,
    },

    /// Run many games in parallel and report aggregate statistics
    Simulate {
        /// Number of games to simulate
        #[arg(long, short = 'g', default_value_t = 100)]
        games: usize,

        /// Base seed; game i uses "{seed}-{i}"
        #[arg(long, default_value = "war")]
        seed: String,

        /// Player name; repeat for 2 to 4 players
        #[arg(long = "player", short = 'p', value_name = "NAME")]
        players: Vec<String>,

        #[command(flatten)]
        rules: RulesArgs,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,

        /// Verbosity level for the report
        #[arg(long, default_value = "normal", short = 'v')]
        verbosity: VerbosityArg,
    },

    /// Trace utilities: view and replay recorded games
    Trace {
        #[command(subcommand)]
        command: TraceCommands,
    },
}

#[derive(Subcommand)]
enum TraceCommands {
    /// Render a human-readable summary of a trace file
    View {
        /// Trace file to read
        file: PathBuf,

        /// First round to display (inclusive)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        from: Option<u32>,

        /// Last round to display (inclusive)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        to: Option<u32>,

        /// Events to show (all|wars|wins|recycles)
        #[arg(long, default_value = "all")]
        only: TraceFilter,
    },

    /// Replay a trace file, optionally verifying it against the engine
    Replay {
        /// Trace file to replay
        file: PathBuf,

        /// First round to display (inclusive)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        from: Option<u32>,

        /// Last round to display (inclusive)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        to: Option<u32>,

        /// Output verbosity (low|normal|high)
        #[arg(long, default_value = "normal", short = 'v')]
        verbosity: VerbosityArg,

        /// Playback speed multiplier
        #[arg(long)]
        speed: Option<f64>,

        /// Delay between rounds in milliseconds (0 disables)
        #[arg(long)]
        delay_ms: Option<f64>,

        /// Pause when a war starts until Enter is pressed
        #[arg(long)]
        pause_on_war: bool,

        /// Re-run the engine from the trace metadata and check event parity
        #[arg(long)]
        verify: bool,
    },
}

fn ensure_round_range(from: Option<u32>, to: Option<u32>) -> anyhow::Result<()> {
    if let (Some(from), Some(to)) = (from, to) {
        if from > to {
            bail!("--from must be less than or equal to --to.");
        }
    }
    Ok(())
}

fn names_or_default(players: Vec<String>) -> Option<Vec<String>> {
    (!players.is_empty()).then_some(players)
}

/// Replay pause: block on Enter when attached to a terminal, no-op otherwise
fn wait_for_enter(message: &str) -> war_forge_rs::Result<()> {
    if !std::io::stdin().is_terminal() {
        return Ok(());
    }
    println!("{message}");
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(())
}

fn print_help(autoplay: bool) {
    println!();
    println!("Controls:");
    println!("- Enter: play next round");
    println!("- a: toggle autoplay ({})", if autoplay { "on" } else { "off" });
    println!("- s: show stats");
    println!("- q: quit");
    println!("- ?: help");
}

/// Rounds autoplay plays before prompting again
const AUTOPLAY_BURST: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlayAction {
    Next,
    ToggleAutoplay,
    Stats,
    Quit,
    Help,
}

impl PlayAction {
    /// Unrecognised input shows the help
    fn parse(input: &str) -> Self {
        match input.trim().to_lowercase().as_str() {
            "" => PlayAction::Next,
            "a" => PlayAction::ToggleAutoplay,
            "s" => PlayAction::Stats,
            "q" => PlayAction::Quit,
            _ => PlayAction::Help,
        }
    }
}

struct PlaySession {
    game: GameLoop,
    recorder: Option<TraceRecorder>,
    autoplay: bool,
    pause_on_war: bool,
    delay_ms: u64,
}

impl PlaySession {
    /// Play one round; true when it contained a war
    fn play_round(&mut self) -> anyhow::Result<bool> {
        let Some(result) = self.game.step()? else {
            return Ok(false);
        };
        if let Some(recorder) = self.recorder.as_mut() {
            recorder.on_round(&result)?;
        }
        Ok(has_war_event(&result.events))
    }

    async fn pace(&self) {
        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }
    }

    /// Up to [`AUTOPLAY_BURST`] rounds; a war ends the burst early when pausing
    async fn play_burst(&mut self) -> anyhow::Result<()> {
        for _ in 0..AUTOPLAY_BURST {
            if self.game.is_finished() {
                break;
            }
            if self.play_round()? && self.pause_on_war {
                println!("War detected. Press Enter to continue...");
                break;
            }
            self.pace().await;
        }
        Ok(())
    }

    async fn play_to_end(&mut self) -> anyhow::Result<()> {
        while !self.game.is_finished() {
            self.play_round()?;
            self.pace().await;
        }
        Ok(())
    }

    /// Drive the game from `input`, one command per line
    async fn run<R>(&mut self, input: &mut Lines<R>) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        while !self.game.is_finished() {
            if self.autoplay {
                self.play_burst().await?;
                if self.game.is_finished() {
                    break;
                }
            }

            let Some(line) = input.next_line().await? else {
                // input closed: finish the game unattended
                return self.play_to_end().await;
            };
            match PlayAction::parse(&line) {
                PlayAction::Next => {
                    self.play_round()?;
                }
                PlayAction::ToggleAutoplay => {
                    self.autoplay = !self.autoplay;
                    println!("Autoplay {}.", if self.autoplay { "enabled" } else { "disabled" });
                }
                PlayAction::Stats => {
                    for line in render_stats(self.game.state()) {
                        println!("{line}");
                    }
                }
                PlayAction::Quit => {
                    println!("Quitting game. Thanks for playing!");
                    return Ok(());
                }
                PlayAction::Help => print_help(self.autoplay),
            }
        }
        Ok(())
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_play(
    players: Vec<String>,
    seed: Option<String>,
    rules: RulesArgs,
    state_hash: StateHashMode,
    trace: Option<PathBuf>,
    trace_snapshots: bool,
    trace_top_cards: bool,
    autoplay: bool,
    delay_ms: Option<f64>,
    speed: Option<f64>,
    pause_on_war: bool,
    verbosity: VerbosityLevel,
) -> anyhow::Result<()> {
    let seed = seed.unwrap_or_else(|| format!("war-{}", chrono::Utc::now().timestamp_millis()));
    let options = RunGameOptions::new(seed.clone())
        .rules(rules.to_input())
        .state_hash_mode(state_hash);
    let options = match names_or_default(players) {
        Some(names) => options.player_names(names),
        None => options,
    };

    let game = GameLoop::new(&options)
        .context("Failed to set up game")?
        .with_verbosity(verbosity);

    let recorder = match trace {
        Some(path) => {
            let cli_args: Map<String, Value> = match json!({
                "command": "play",
                "seed": seed,
                "stateHash": state_hash.as_str(),
                "autoplay": autoplay,
            }) {
                Value::Object(map) => map,
                _ => Map::new(),
            };
            let mut recorder = TraceRecorder::new(
                TraceWriterOptions {
                    file_path: path,
                    include_snapshots: trace_snapshots,
                    include_top_cards: trace_top_cards,
                },
                seed.clone(),
                state_hash,
            )
            .with_cli_args(cli_args);
            recorder
                .on_game_start(game.state())
                .with_context(|| format!("Failed to create trace file {}", recorder.path().display()))?;
            Some(recorder)
        }
        None => None,
    };

    println!("Starting War (seed: {seed})");
    println!("Players: {}", player_names(game.state()).join(" vs "));
    print_help(autoplay);
    if autoplay {
        println!("Autoplay enabled.");
    }

    let mut session = PlaySession {
        game,
        recorder,
        autoplay,
        pause_on_war,
        delay_ms: compute_playback_delay_ms(speed, delay_ms, DEFAULT_PLAYBACK_DELAY_MS),
    };
    let mut input = BufReader::new(tokio::io::stdin()).lines();
    session.run(&mut input).await?;

    // the logger already announced the ending unless it is silenced
    if verbosity == VerbosityLevel::Silent {
        if let Some(message) = session.game.outcome_message() {
            println!("{message}");
        }
    }
    for line in render_stats(session.game.state()) {
        println!("{line}");
    }
    if let Some(recorder) = session.recorder {
        let path = recorder.path().to_path_buf();
        recorder.finish().context("Failed to finish trace file")?;
        println!("Trace written to {}", path.display());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Play {
            players,
            seed,
            rules,
            state_hash,
            trace,
            trace_snapshots,
            trace_top_cards,
            autoplay,
            delay_ms,
            speed,
            pause_on_war,
            verbosity,
        } => {
            run_play(
                players,
                seed,
                rules,
                state_hash.into(),
                trace,
                trace_snapshots,
                trace_top_cards,
                autoplay,
                delay_ms,
                speed,
                pause_on_war,
                verbosity.into(),
            )
            .await?;
        }

        Commands::Simulate {
            games,
            seed,
            players,
            rules,
            json,
            verbosity,
        } => {
            let options = SimulationOptions {
                games,
                seed,
                player_names: names_or_default(players),
                rules: rules.to_input(),
            };
            let summary = simulate(&options).context("Simulation failed")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                log_summary(&summary, &GameLogger::with_verbosity(verbosity.into()));
            }
        }

        Commands::Trace { command } => match command {
            TraceCommands::View { file, from, to, only } => {
                ensure_round_range(from, to)?;
                let logger = GameLogger::with_verbosity(VerbosityLevel::Minimal);
                view_trace(&file, &ViewOptions { from, to, only }, &logger)?;
            }
            TraceCommands::Replay {
                file,
                from,
                to,
                verbosity,
                speed,
                delay_ms,
                pause_on_war,
                verify,
            } => {
                ensure_round_range(from, to)?;
                let logger = GameLogger::with_verbosity(verbosity.into());
                let options = ReplayOptions {
                    from,
                    to,
                    speed,
                    // replay runs at full speed unless a delay is requested
                    delay_ms: Some(delay_ms.unwrap_or(0.0)),
                    pause_on_war,
                    verify,
                };
                replay_trace(&file, &options, &logger, wait_for_enter).await?;
            }
        },
    }

    Ok(())
}

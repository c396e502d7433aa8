//! Game loop implementation
//!
//! Seeds a game, deals it and drives rounds until the game ends, reporting
//! each round to an observer and to the logger.

/// Conditional round logging that compiles away without `verbose-logging`
macro_rules! log_if_verbose {
    ($self:expr, $events:expr) => {
        #[cfg(feature = "verbose-logging")]
        {
            $self.log_events($events);
        }
        #[cfg(not(feature = "verbose-logging"))]
        {
            let _ = (&$self, &$events);
        }
    };
}

use crate::core::{create_deck, create_seeded_rng, shuffle_deck, SeededRng};
use crate::game::events::{EndReason, RoundEvent};
use crate::game::logger::{GameLogger, VerbosityLevel};
use crate::game::render::{ending_message, player_names};
use crate::game::round::{play_round, RoundResult};
use crate::game::rules::{validate_war_rules, WarRulesInput};
use crate::game::state::{create_game_state, GameState, GameStateOptions};
use crate::game::state_hash::StateHashMode;
use crate::Result;

/// Everything needed to start a seeded game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunGameOptions {
    pub seed: String,
    /// Defaults to two players
    pub player_names: Option<Vec<String>>,
    pub rules: WarRulesInput,
    pub state_hash_mode: StateHashMode,
    /// Keep every event in [`GameRunResult::events`]
    pub collect_events: bool,
}

impl RunGameOptions {
    pub fn new(seed: impl Into<String>) -> Self {
        RunGameOptions {
            seed: seed.into(),
            player_names: None,
            rules: WarRulesInput::default(),
            state_hash_mode: StateHashMode::Off,
            collect_events: true,
        }
    }

    pub fn player_names(mut self, names: Vec<String>) -> Self {
        self.player_names = Some(names);
        self
    }

    pub fn rules(mut self, rules: WarRulesInput) -> Self {
        self.rules = rules;
        self
    }

    pub fn state_hash_mode(mut self, mode: StateHashMode) -> Self {
        self.state_hash_mode = mode;
        self
    }

    pub fn collect_events(mut self, collect: bool) -> Self {
        self.collect_events = collect;
        self
    }
}

/// Result of running a game to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRunResult {
    pub seed: String,
    /// Final state
    pub state: GameState,
    /// Every event in order (empty when event collection is off)
    pub events: Vec<RoundEvent>,
    /// Reason from the last `GameEnded` event
    pub end_reason: Option<EndReason>,
}

/// Hooks called while a game runs; errors abort the run
pub trait GameObserver {
    fn on_game_start(&mut self, _state: &GameState) -> Result<()> {
        Ok(())
    }

    fn on_round(&mut self, _result: &RoundResult) -> Result<()> {
        Ok(())
    }
}

impl GameObserver for () {}

/// Build the initial state and the RNG that continues to drive it
///
/// The deck for `rules.num_decks` is shuffled with the seeded RNG and dealt
/// round-robin; the same RNG is then used for recycle shuffles.
pub fn create_game(options: &RunGameOptions) -> Result<(GameState, SeededRng)> {
    let mut rng = create_seeded_rng(&options.seed);
    let config = validate_war_rules(&options.rules)?;
    let deck = shuffle_deck(&create_deck(config.num_decks)?, &mut rng);

    let state = create_game_state(GameStateOptions {
        player_names: options.player_names.clone(),
        deck: Some(deck),
        rules: options.rules.clone(),
    })?;
    Ok((state, rng))
}

/// Game loop manager
///
/// Owns the state and the RNG; each [`step`](GameLoop::step) resolves one
/// round.
pub struct GameLoop {
    seed: String,
    state: GameState,
    rng: SeededRng,
    state_hash_mode: StateHashMode,
    collect_events: bool,
    logger: GameLogger,
    names: Vec<String>,
    rounds_played: u32,
    end_reason: Option<EndReason>,
}

impl GameLoop {
    /// Create and deal a new game
    pub fn new(options: &RunGameOptions) -> Result<Self> {
        let (state, rng) = create_game(options)?;
        let names = player_names(&state);
        Ok(GameLoop {
            seed: options.seed.clone(),
            state,
            rng,
            state_hash_mode: options.state_hash_mode,
            collect_events: options.collect_events,
            logger: GameLogger::new(),
            names,
            rounds_played: 0,
            end_reason: None,
        })
    }

    /// Set verbosity level for output
    pub fn with_verbosity(mut self, verbosity: VerbosityLevel) -> Self {
        self.logger.set_verbosity(verbosity);
        self
    }

    /// Replace the logger (e.g. with a capturing one)
    pub fn with_logger(mut self, logger: GameLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn logger(&self) -> &GameLogger {
        &self.logger
    }

    pub fn is_finished(&self) -> bool {
        !self.state.active
    }

    /// Rounds resolved by this loop so far
    pub fn rounds_played(&self) -> u32 {
        self.rounds_played
    }

    #[cfg_attr(not(feature = "verbose-logging"), allow(dead_code))]
    fn log_events(&self, events: &[RoundEvent]) {
        if self.logger.verbosity() == VerbosityLevel::Silent && !self.logger.is_capturing() {
            return;
        }
        crate::game::render::log_round_events(&self.logger, &self.names, events);
    }

    fn log_round(&self, result: &RoundResult) {
        log_if_verbose!(self, &result.events);

        #[cfg(not(feature = "verbose-logging"))]
        if let Some((reason, winner)) = result.events.iter().find_map(RoundEvent::ending) {
            self.logger.minimal(&ending_message(&self.names, reason, winner));
        }
    }

    /// Resolve one round; `None` once the game is over
    pub fn step(&mut self) -> Result<Option<RoundResult>> {
        if !self.state.active {
            return Ok(None);
        }

        let result = play_round(&self.state, &mut self.rng, self.state_hash_mode)?;
        self.state = result.state.clone();
        self.rounds_played += 1;
        if let Some(reason) = result.end_reason() {
            self.end_reason = Some(reason);
        }
        self.log_round(&result);
        Ok(Some(result))
    }

    /// Play to completion
    pub fn run<O: GameObserver + ?Sized>(mut self, observer: &mut O) -> Result<GameRunResult> {
        observer.on_game_start(&self.state)?;

        let mut events = Vec::new();
        while let Some(result) = self.step()? {
            observer.on_round(&result)?;
            if self.collect_events {
                events.extend(result.events);
            }
        }

        Ok(GameRunResult {
            seed: self.seed,
            state: self.state,
            events,
            end_reason: self.end_reason,
        })
    }

    /// Why the game ended, once it has
    pub fn end_reason(&self) -> Option<EndReason> {
        self.end_reason
    }

    /// Summary line for the finished game, if it has finished
    pub fn outcome_message(&self) -> Option<String> {
        self.end_reason
            .map(|reason| ending_message(&self.names, reason, self.state.winner))
    }
}

/// Seed, deal and play a whole game silently
pub fn run_game(options: &RunGameOptions) -> Result<GameRunResult> {
    GameLoop::new(options)?
        .with_verbosity(VerbosityLevel::Silent)
        .run(&mut ())
}

//! Game rules, state, round engine and driver

pub mod events;
pub mod game_loop;
pub mod logger;
pub mod render;
pub mod round;
pub mod rules;
pub mod state;
pub mod state_hash;

pub use events::{EndReason, Participants, RoundEvent};
pub use game_loop::{create_game, run_game, GameLoop, GameObserver, GameRunResult, RunGameOptions};
pub use logger::{GameLogger, LogEntry, OutputMode, VerbosityLevel};
pub use round::{play_round, RoundResult};
pub use rules::{
    validate_war_rules, CollectMode, TieResolution, WarRules, WarRulesInput, DEFAULT_MAX_ROUNDS,
};
pub use state::{
    create_game_state, default_player_names, GameState, GameStateOptions, GameStats, TableCard,
    TableState, MAX_PLAYERS, MIN_PLAYERS,
};
pub use state_hash::{format_hash, hash_state, hash_state_at, HashMode, StateHashMode};

//! Rules configuration and validation

use crate::{Result, WarError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where a round winner's trick goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollectMode {
    /// Appended to the back of the winner's draw pile
    BottomOfDraw,
    /// Added to the winner's won pile, recycled when the draw pile runs dry
    #[default]
    WonPile,
}

impl CollectMode {
    pub fn as_str(self) -> &'static str {
        match self {
            CollectMode::BottomOfDraw => "bottom-of-draw",
            CollectMode::WonPile => "won-pile",
        }
    }
}

impl fmt::Display for CollectMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollectMode {
    type Err = WarError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "bottom-of-draw" => Ok(CollectMode::BottomOfDraw),
            "won-pile" => Ok(CollectMode::WonPile),
            _ => Err(WarError::InvalidRules(
                "collectMode must be \"bottom-of-draw\" or \"won-pile\"".to_string(),
            )),
        }
    }
}

/// How ties on the face-up cards are broken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TieResolution {
    /// Face-down ante cards followed by a new face-up card
    #[default]
    StandardWar,
    /// A single new face-up card, no ante
    SuddenDeath,
}

impl TieResolution {
    pub fn as_str(self) -> &'static str {
        match self {
            TieResolution::StandardWar => "standard-war",
            TieResolution::SuddenDeath => "sudden-death",
        }
    }
}

impl fmt::Display for TieResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TieResolution {
    type Err = WarError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "standard-war" => Ok(TieResolution::StandardWar),
            "sudden-death" => Ok(TieResolution::SuddenDeath),
            _ => Err(WarError::InvalidRules(
                "tieResolution must be \"standard-war\" or \"sudden-death\"".to_string(),
            )),
        }
    }
}

pub const DEFAULT_MAX_ROUNDS: u32 = 10_000;

/// Validated, immutable rules for one game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarRules {
    pub num_decks: u32,
    pub war_face_down_count: u32,
    pub collect_mode: CollectMode,
    pub shuffle_won_pile_on_recycle: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rounds: Option<u32>,
    pub tie_resolution: TieResolution,
    /// Reserved; ranks always compare numerically with Ace = 14
    pub ace_high: bool,
}

impl Default for WarRules {
    fn default() -> Self {
        WarRules {
            num_decks: 1,
            war_face_down_count: 1,
            collect_mode: CollectMode::WonPile,
            shuffle_won_pile_on_recycle: true,
            max_rounds: Some(DEFAULT_MAX_ROUNDS),
            tie_resolution: TieResolution::StandardWar,
            ace_high: true,
        }
    }
}

/// Partial rules input, merged over [`WarRules::default`]
///
/// Integers are signed so that out-of-range input reaches validation rather
/// than failing inside a parser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WarRulesInput {
    pub num_decks: Option<i64>,
    pub war_face_down_count: Option<i64>,
    pub collect_mode: Option<CollectMode>,
    pub shuffle_won_pile_on_recycle: Option<bool>,
    pub max_rounds: Option<i64>,
    /// Drop the round cap entirely (takes precedence over `max_rounds`)
    pub unlimited_rounds: bool,
    pub tie_resolution: Option<TieResolution>,
    pub ace_high: Option<bool>,
}

impl WarRulesInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_decks(mut self, value: i64) -> Self {
        self.num_decks = Some(value);
        self
    }

    pub fn war_face_down_count(mut self, value: i64) -> Self {
        self.war_face_down_count = Some(value);
        self
    }

    pub fn collect_mode(mut self, value: CollectMode) -> Self {
        self.collect_mode = Some(value);
        self
    }

    pub fn shuffle_won_pile_on_recycle(mut self, value: bool) -> Self {
        self.shuffle_won_pile_on_recycle = Some(value);
        self
    }

    pub fn max_rounds(mut self, value: i64) -> Self {
        self.max_rounds = Some(value);
        self
    }

    pub fn unlimited_rounds(mut self) -> Self {
        self.unlimited_rounds = true;
        self
    }

    pub fn tie_resolution(mut self, value: TieResolution) -> Self {
        self.tie_resolution = Some(value);
        self
    }

    pub fn ace_high(mut self, value: bool) -> Self {
        self.ace_high = Some(value);
        self
    }
}

impl From<&WarRules> for WarRulesInput {
    fn from(rules: &WarRules) -> Self {
        WarRulesInput {
            num_decks: Some(i64::from(rules.num_decks)),
            war_face_down_count: Some(i64::from(rules.war_face_down_count)),
            collect_mode: Some(rules.collect_mode),
            shuffle_won_pile_on_recycle: Some(rules.shuffle_won_pile_on_recycle),
            max_rounds: rules.max_rounds.map(i64::from),
            unlimited_rounds: rules.max_rounds.is_none(),
            tie_resolution: Some(rules.tie_resolution),
            ace_high: Some(rules.ace_high),
        }
    }
}

fn bounded(value: i64, min: i64, message: &str) -> Result<u32> {
    if value < min {
        return Err(WarError::InvalidRules(message.to_string()));
    }
    u32::try_from(value).map_err(|_| WarError::InvalidRules(message.to_string()))
}

/// Merge `input` over the defaults and validate, failing on the first bad field
pub fn validate_war_rules(input: &WarRulesInput) -> Result<WarRules> {
    let defaults = WarRules::default();

    let num_decks = match input.num_decks {
        Some(value) => bounded(value, 1, "numDecks must be an integer >= 1")?,
        None => defaults.num_decks,
    };

    let war_face_down_count = match input.war_face_down_count {
        Some(value) => bounded(value, 0, "warFaceDownCount must be a non-negative integer")?,
        None => defaults.war_face_down_count,
    };

    let max_rounds = if input.unlimited_rounds {
        None
    } else {
        match input.max_rounds {
            Some(value) => Some(bounded(value, 1, "maxRounds must be an integer >= 1 when provided")?),
            None => defaults.max_rounds,
        }
    };

    Ok(WarRules {
        num_decks,
        war_face_down_count,
        collect_mode: input.collect_mode.unwrap_or(defaults.collect_mode),
        shuffle_won_pile_on_recycle: input
            .shuffle_won_pile_on_recycle
            .unwrap_or(defaults.shuffle_won_pile_on_recycle),
        max_rounds,
        tie_resolution: input.tie_resolution.unwrap_or(defaults.tie_resolution),
        ace_high: input.ace_high.unwrap_or(defaults.ace_high),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let rules = validate_war_rules(&WarRulesInput::default()).unwrap();
        assert_eq!(rules, WarRules::default());
        assert_eq!(rules.max_rounds, Some(10_000));
        assert_eq!(rules.collect_mode, CollectMode::WonPile);
        assert_eq!(rules.tie_resolution, TieResolution::StandardWar);
    }

    #[test]
    fn test_overrides_merge() {
        let input = WarRulesInput::new()
            .num_decks(2)
            .war_face_down_count(0)
            .collect_mode(CollectMode::BottomOfDraw)
            .tie_resolution(TieResolution::SuddenDeath)
            .max_rounds(50);
        let rules = validate_war_rules(&input).unwrap();
        assert_eq!(rules.num_decks, 2);
        assert_eq!(rules.war_face_down_count, 0);
        assert_eq!(rules.collect_mode, CollectMode::BottomOfDraw);
        assert_eq!(rules.tie_resolution, TieResolution::SuddenDeath);
        assert_eq!(rules.max_rounds, Some(50));
        assert!(rules.shuffle_won_pile_on_recycle);
    }

    #[test]
    fn test_field_errors() {
        let err = validate_war_rules(&WarRulesInput::new().num_decks(0)).unwrap_err();
        assert!(err.to_string().contains("numDecks"));

        let err = validate_war_rules(&WarRulesInput::new().war_face_down_count(-1)).unwrap_err();
        assert!(err.to_string().contains("warFaceDownCount"));

        let err = validate_war_rules(&WarRulesInput::new().max_rounds(0)).unwrap_err();
        assert!(err.to_string().contains("maxRounds"));
    }

    #[test]
    fn test_unlimited_rounds() {
        let rules = validate_war_rules(&WarRulesInput::new().max_rounds(5).unlimited_rounds()).unwrap();
        assert_eq!(rules.max_rounds, None);
    }

    #[test]
    fn test_enum_parsing() {
        assert_eq!("won-pile".parse::<CollectMode>().unwrap(), CollectMode::WonPile);
        assert_eq!("sudden-death".parse::<TieResolution>().unwrap(), TieResolution::SuddenDeath);
        assert!("top".parse::<CollectMode>().unwrap_err().to_string().contains("collectMode"));
        assert!("coin-flip".parse::<TieResolution>().unwrap_err().to_string().contains("tieResolution"));
    }

    #[test]
    fn test_input_from_json() {
        let input: WarRulesInput =
            serde_json::from_str(r#"{"numDecks":2,"collectMode":"bottom-of-draw"}"#).unwrap();
        let rules = validate_war_rules(&input).unwrap();
        assert_eq!(rules.num_decks, 2);
        assert_eq!(rules.collect_mode, CollectMode::BottomOfDraw);

        assert!(serde_json::from_str::<WarRulesInput>(r#"{"collectMode":"sideways"}"#).is_err());
    }

    #[test]
    fn test_rules_roundtrip_through_input() {
        let rules = validate_war_rules(&WarRulesInput::new().unlimited_rounds().num_decks(3)).unwrap();
        assert_eq!(validate_war_rules(&WarRulesInput::from(&rules)).unwrap(), rules);
    }
}

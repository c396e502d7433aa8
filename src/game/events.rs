//! Round events
//!
//! Each call to the round engine appends events in a fixed order:
//! `RoundStarted` first, `GameEnded` (if any) next to last, `StateHashed`
//! (if enabled) last.

use crate::core::PlayerId;
use crate::game::state::TableCard;
use crate::game::state_hash::HashMode;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

/// Players taking part in a flip or war (at most four)
pub type Participants = SmallVec<[PlayerId; 4]>;

/// Why a game stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndReason {
    Win,
    Timeout,
    Stalemate,
}

impl EndReason {
    pub fn as_str(self) -> &'static str {
        match self {
            EndReason::Win => "win",
            EndReason::Timeout => "timeout",
            EndReason::Stalemate => "stalemate",
        }
    }
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EndReason {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "win" => Ok(EndReason::Win),
            "timeout" => Ok(EndReason::Timeout),
            "stalemate" => Ok(EndReason::Stalemate),
            _ => Err(format!("unknown end reason '{s}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum RoundEvent {
    RoundStarted {
        round: u32,
    },
    CardsPlaced {
        cards: Vec<TableCard>,
        participants: Participants,
    },
    WarStarted {
        war_level: u32,
        participants: Participants,
    },
    PileRecycled {
        player_id: PlayerId,
        cards: usize,
        shuffled: bool,
    },
    TrickWon {
        winner: PlayerId,
        collected: Vec<TableCard>,
    },
    StateHashed {
        round: u32,
        mode: HashMode,
        hash: String,
    },
    GameEnded {
        reason: EndReason,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        winner: Option<PlayerId>,
    },
}

impl RoundEvent {
    /// Discriminant name as it appears in traces
    pub fn kind(&self) -> &'static str {
        match self {
            RoundEvent::RoundStarted { .. } => "RoundStarted",
            RoundEvent::CardsPlaced { .. } => "CardsPlaced",
            RoundEvent::WarStarted { .. } => "WarStarted",
            RoundEvent::PileRecycled { .. } => "PileRecycled",
            RoundEvent::TrickWon { .. } => "TrickWon",
            RoundEvent::StateHashed { .. } => "StateHashed",
            RoundEvent::GameEnded { .. } => "GameEnded",
        }
    }

    pub fn is_war(&self) -> bool {
        matches!(self, RoundEvent::WarStarted { .. })
    }

    /// `(reason, winner)` when this is a `GameEnded` event
    pub fn ending(&self) -> Option<(EndReason, Option<PlayerId>)> {
        match self {
            RoundEvent::GameEnded { reason, winner } => Some((*reason, *winner)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn test_event_wire_format() {
        let event = RoundEvent::WarStarted {
            war_level: 2,
            participants: smallvec![PlayerId::new(0), PlayerId::new(2)],
        };
        assert_eq!(
            serde_json::to_string(&event).unwrap(),
            r#"{"type":"WarStarted","warLevel":2,"participants":[0,2]}"#
        );

        let ended = RoundEvent::GameEnded {
            reason: EndReason::Stalemate,
            winner: None,
        };
        assert_eq!(
            serde_json::to_string(&ended).unwrap(),
            r#"{"type":"GameEnded","reason":"stalemate"}"#
        );
    }

    #[test]
    fn test_event_parse() {
        let event: RoundEvent =
            serde_json::from_str(r#"{"type":"PileRecycled","playerId":1,"cards":12,"shuffled":true}"#).unwrap();
        assert_eq!(
            event,
            RoundEvent::PileRecycled {
                player_id: PlayerId::new(1),
                cards: 12,
                shuffled: true
            }
        );
        assert_eq!(event.kind(), "PileRecycled");
        assert!(serde_json::from_str::<RoundEvent>(r#"{"type":"Nope"}"#).is_err());
    }

    #[test]
    fn test_ending_accessor() {
        let event = RoundEvent::GameEnded {
            reason: EndReason::Win,
            winner: Some(PlayerId::new(1)),
        };
        assert_eq!(event.ending(), Some((EndReason::Win, Some(PlayerId::new(1)))));
        assert_eq!(RoundEvent::RoundStarted { round: 1 }.ending(), None);
    }
}

//! Error types raised by the rules engine.
//!
//! Every variant signals a caller-contract violation. None of them are
//! retried internally; the caller is expected to fix its call sequence.
use thiserror::Error;

use crate::players::PlayerId;
use crate::turn::TurnPhase;

/// Errors raised when engine operations are invoked out of contract.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("a card was requested but the deck has no cards left")]
    EmptyDeck,
    #[error("{operation} is not allowed while the turn is {phase}")]
    IllegalPhase {
        operation: &'static str,
        phase: TurnPhase,
    },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Raised by the player bookkeeping in [`crate::players`]. [`crate::Turn::end_turn`]
    /// reports the same problem as [`Self::InvalidArgument`].
    #[error("player {0} is not active in this round")]
    PlayerNotActive(PlayerId),
    #[error("illegal state: {0}")]
    IllegalState(&'static str),
    #[error("the round has ended, no more turns can be played")]
    NoSuchTurn,
    #[error("the game has no rounds left to play")]
    NoSuchRound,
}

impl GameError {
    /// Whether this error belongs to the invalid-argument family.
    #[must_use]
    pub const fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_) | Self::PlayerNotActive(_))
    }
}

/// A single bound violated by a [`crate::GameSettings`] bundle.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SettingsViolation {
    #[error("the number of players ({count}) is below the minimum of {min}")]
    TooFewPlayers { count: usize, min: usize },
    #[error("the number of players ({count}) exceeds the maximum of {max}")]
    TooManyPlayers { count: usize, max: usize },
    #[error("player name '{name}' exceeds the maximum of {max} characters")]
    NameTooLong { name: String, max: usize },
    #[error("player names cannot be blank")]
    BlankName,
    #[error("player name '{0}' is used more than once")]
    DuplicateName(String),
    #[error("the number of rounds ({count}) must be between {min} and {max}")]
    RoundsOutOfRange { count: u32, min: u32, max: u32 },
    #[error("the deck has no cards")]
    EmptyDeck,
}

/// Errors raised when a settings bundle fails validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("invalid game settings: {}", join_violations(.0))]
    Invalid(Vec<SettingsViolation>),
}

impl SettingsError {
    /// Every violated bound, in the order they were checked.
    #[must_use]
    pub fn violations(&self) -> &[SettingsViolation] {
        match self {
            Self::Invalid(violations) => violations,
        }
    }
}

fn join_violations(violations: &[SettingsViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

//! Cavern Game Engine
//!
//! Rules engine for Cavern, a push-your-luck cave exploration card game.
//! Players draw from a shared deck, split the treasure they find and decide
//! every turn whether to keep exploring or leave with their loot.
//!
//! The crate has no UI; human decisions come in through [`HumanChoices`].

pub mod card;
pub mod cpu;
pub mod deck;
pub mod effects;
pub mod error;
pub mod game;
pub mod leaderboard;
pub mod players;
pub mod round;
pub mod seed;
pub mod session;
pub mod state;
pub mod turn;

// Re-export commonly used types
pub use card::{Card, CardKind, RELIC_GEM_VALUES, TREASURE_GEM_VALUES, TrapKind};
pub use cpu::{CpuDifficulty, CpuDifficultyVariables, LogicCpu, RiskFeatures};
pub use deck::{Deck, DeckBuilder, DeckComposition};
pub use effects::{EndCondition, GemModifier, RoundEffect};
pub use error::{GameError, SettingsError, SettingsViolation};
pub use game::{Game, GameSettings, GameSettingsBuilder};
pub use leaderboard::{Leaderboard, Standing};
pub use players::{PlayerChoice, PlayerId, PlayerInRound, PlayerKind, RoundPlayersManager};
pub use round::{Round, RoundEnding, RoundSummary};
pub use session::{GameSession, HumanChoices, RoundReport, TurnRecord};
pub use state::{PathRelic, RoundState};
pub use turn::{ExitRecord, Turn, TurnPhase, TurnSettlement};

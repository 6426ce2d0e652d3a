//! Drives a full game, asking a collaborator for human decisions.
use serde::{Deserialize, Serialize};

use crate::card::Card;
use crate::cpu::LogicCpu;
use crate::error::{GameError, SettingsError};
use crate::game::{Game, GameSettings};
use crate::leaderboard::Leaderboard;
use crate::players::{PlayerChoice, PlayerId, PlayerInRound};
use crate::round::RoundSummary;
use crate::seed::{CPU_STREAM, stream_rng};
use crate::state::RoundState;
use crate::turn::TurnSettlement;

/// Source of stay/exit decisions for human seats.
///
/// Asked once per active human per turn, with read access to the round.
pub trait HumanChoices {
    fn choose(&mut self, state: &RoundState, player: &PlayerInRound) -> PlayerChoice;
}

impl<F> HumanChoices for F
where
    F: FnMut(&RoundState, &PlayerInRound) -> PlayerChoice,
{
    fn choose(&mut self, state: &RoundState, player: &PlayerInRound) -> PlayerChoice {
        self(state, player)
    }
}

/// What happened in one turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnRecord {
    pub number: u32,
    pub current_player: Option<PlayerId>,
    pub card: Card,
    pub lost_gems: u32,
    pub settlement: TurnSettlement,
}

/// A finished round with its turn log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundReport {
    pub summary: RoundSummary,
    pub turns: Vec<TurnRecord>,
}

/// A game plus the CPU heuristic driving its CPU seats.
#[derive(Debug, Clone)]
pub struct GameSession {
    game: Game,
    cpu: LogicCpu,
}

impl GameSession {
    /// Build a session whose deck and CPU decisions all derive from `seed`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Invalid`] when the settings fail validation.
    pub fn new(settings: GameSettings, seed: u64) -> Result<Self, SettingsError> {
        let game = Game::new(settings, seed)?;
        let cpu = LogicCpu::new(stream_rng(seed, CPU_STREAM));
        Ok(Self { game, cpu })
    }

    #[must_use]
    pub const fn game(&self) -> &Game {
        &self.game
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.game.has_next()
    }

    /// Play the next round to completion.
    ///
    /// After each draw every active player is asked to stay or leave, even
    /// when the draw ends the round, so a lone leaver can still take the
    /// relics on the path.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NoSuchRound`] once every round was played, or
    /// whatever a turn rejects.
    pub fn play_round<H: HumanChoices + ?Sized>(
        &mut self,
        humans: &mut H,
    ) -> Result<RoundReport, GameError> {
        let profile = self.game.settings().cpu_profile();
        let mut round = self.game.next_round()?;
        let mut turns = Vec::new();
        while round.has_next() {
            let mut turn = round.next_turn()?;
            let card = turn.execute_draw_phase()?;
            let leaving = turn.collect_exits(&mut self.cpu, &profile, humans)?;
            let settlement = turn.end_turn(&leaving)?;
            turns.push(TurnRecord {
                number: turn.number(),
                current_player: turn.current_player(),
                card,
                lost_gems: turn.lost_gems(),
                settlement,
            });
        }
        let summary = round.end_round()?;
        Ok(RoundReport { summary, turns })
    }

    /// Play every remaining round.
    ///
    /// # Errors
    ///
    /// Propagates the first error raised by [`Self::play_round`].
    pub fn play_to_end<H: HumanChoices + ?Sized>(
        &mut self,
        humans: &mut H,
    ) -> Result<Vec<RoundReport>, GameError> {
        let mut reports = Vec::new();
        while self.game.has_next() {
            reports.push(self.play_round(humans)?);
        }
        Ok(reports)
    }

    /// # Errors
    ///
    /// Returns [`GameError::IllegalState`] while rounds remain.
    pub fn leaderboard(&self) -> Result<Leaderboard, GameError> {
        self.game.leaderboard()
    }

    #[must_use]
    pub fn into_game(self) -> Game {
        self.game
    }
}

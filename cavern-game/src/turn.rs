//! A single draw-and-settle cycle within a round.
//!
//! A turn moves through three phases:
//! - `AwaitingDraw`: nothing has happened yet
//! - `Drawn`: a card was drawn and its effect applied; choices are pending
//! - `Settled`: exits were resolved and the turn is over
use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

use crate::card::Card;
use crate::cpu::{CpuDifficultyVariables, LogicCpu};
use crate::effects::RoundEffect;
use crate::error::GameError;
use crate::players::{PlayerChoice, PlayerId, PlayerInRound};
use crate::session::HumanChoices;
use crate::state::RoundState;

type Seats = SmallVec<[PlayerId; 8]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    AwaitingDraw,
    Drawn,
    Settled,
}

impl fmt::Display for TurnPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AwaitingDraw => "awaiting draw",
            Self::Drawn => "drawn",
            Self::Settled => "settled",
        })
    }
}

/// Gems a player banked when leaving the cave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitRecord {
    pub player: PlayerId,
    pub banked: u32,
}

/// Outcome of [`Turn::end_turn`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnSettlement {
    pub exits: Vec<ExitRecord>,
    /// Relic gems claimed by a lone leaver.
    pub relic_claim: Option<(PlayerId, u32)>,
}

/// One turn bound to the round's shared state.
#[derive(Debug)]
pub struct Turn<'r> {
    number: u32,
    current_player: Option<PlayerId>,
    players: &'r mut [PlayerInRound],
    state: &'r mut RoundState,
    effect: &'r RoundEffect,
    phase: TurnPhase,
    drawn: Option<Card>,
    lost_gems: u32,
}

impl<'r> Turn<'r> {
    pub(crate) fn new(
        number: u32,
        current_player: Option<PlayerId>,
        players: &'r mut [PlayerInRound],
        state: &'r mut RoundState,
        effect: &'r RoundEffect,
    ) -> Self {
        Self {
            number,
            current_player,
            players,
            state,
            effect,
            phase: TurnPhase::AwaitingDraw,
            drawn: None,
            lost_gems: 0,
        }
    }

    #[must_use]
    pub const fn number(&self) -> u32 {
        self.number
    }

    #[must_use]
    pub const fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// Seat that flips the card this turn.
    #[must_use]
    pub const fn current_player(&self) -> Option<PlayerId> {
        self.current_player
    }

    /// The drawn card; `None` until [`Self::execute_draw_phase`] ran.
    #[must_use]
    pub const fn drawn_card(&self) -> Option<&Card> {
        self.drawn.as_ref()
    }

    /// Treasure gems that could not be split evenly this turn.
    #[must_use]
    pub const fn lost_gems(&self) -> u32 {
        self.lost_gems
    }

    #[must_use]
    pub fn state(&self) -> &RoundState {
        &*self.state
    }

    #[must_use]
    pub fn players(&self) -> &[PlayerInRound] {
        &*self.players
    }

    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&PlayerInRound> {
        self.players.iter().find(|player| player.id() == id)
    }

    /// Whether the round's end condition already holds after this draw.
    #[must_use]
    pub fn ends_round(&self) -> bool {
        self.effect.is_end_condition_met(&*self.state)
    }

    /// Draw a card and apply its effect.
    ///
    /// Treasure gems, after the round's gem modifier, are split evenly among
    /// active players; the remainder is lost. Traps and relics go on the path.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::IllegalPhase`] unless the turn is awaiting its
    /// draw, or [`GameError::EmptyDeck`] if the deck is exhausted.
    pub fn execute_draw_phase(&mut self) -> Result<Card, GameError> {
        self.require_phase(TurnPhase::AwaitingDraw, "execute_draw_phase")?;
        let card = self.state.deck_mut().draw()?;
        self.state.place_on_path(card);
        if let Card::Treasure { gems } = card {
            self.share_treasure(gems);
        }
        debug!(
            "turn {}: drew {card}, {} cards left",
            self.number,
            self.state.deck().remaining()
        );
        self.drawn = Some(card);
        self.phase = TurnPhase::Drawn;
        Ok(card)
    }

    fn share_treasure(&mut self, gems: u32) {
        let active: Seats = self.state.players().active_players().collect();
        let Ok(count) = u32::try_from(active.len()) else {
            return;
        };
        if count == 0 {
            return;
        }
        let adjusted = self.effect.apply_gem_modifier(&*self.state, gems);
        let share = adjusted / count;
        self.lost_gems = adjusted % count;
        for id in active {
            if let Some(player) = find_mut(self.players, id) {
                player.add_sack_gems(share);
            }
        }
    }

    /// Resolve the players leaving this turn.
    ///
    /// A lone leaver takes every unclaimed relic on the path. Each leaver
    /// then banks their sack and is marked as exited. Validation happens
    /// before anything is mutated.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::IllegalPhase`] unless a card has been drawn, and
    /// [`GameError::InvalidArgument`] when `exiting` names a seat that is not
    /// active or repeats a seat.
    pub fn end_turn(&mut self, exiting: &[PlayerId]) -> Result<TurnSettlement, GameError> {
        self.require_phase(TurnPhase::Drawn, "end_turn")?;
        self.validate_exits(exiting)?;

        let mut settlement = TurnSettlement::default();
        if let [lone] = exiting {
            let claimed = self.state.claim_relics(*lone);
            if claimed > 0 {
                if let Some(player) = find_mut(self.players, *lone) {
                    player.add_sack_gems(claimed);
                }
                settlement.relic_claim = Some((*lone, claimed));
            }
        }

        for &id in exiting {
            self.state.players_mut().mark_exited(id)?;
            let player = find_mut(self.players, id).ok_or(GameError::PlayerNotActive(id))?;
            player.leave()?;
            let banked = player.add_sack_to_chest();
            debug!("turn {}: {} leaves with {banked} gems", self.number, player.name());
            settlement.exits.push(ExitRecord { player: id, banked });
        }

        self.phase = TurnPhase::Settled;
        Ok(settlement)
    }

    fn validate_exits(&self, exiting: &[PlayerId]) -> Result<(), GameError> {
        let mut seen = Seats::new();
        for &id in exiting {
            if seen.contains(&id) {
                return Err(GameError::InvalidArgument(format!(
                    "player {id} is listed twice among the leavers"
                )));
            }
            seen.push(id);
            let known = self.player(id).is_some_and(|player| !player.has_left());
            if !known || !self.state.players().is_active(id) {
                return Err(GameError::InvalidArgument(format!(
                    "player {id} is not active in this round"
                )));
            }
        }
        Ok(())
    }

    /// Seats of active CPU players whose heuristic says to leave.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::IllegalPhase`] unless a card has been drawn, or
    /// whatever the heuristic raises.
    pub fn cpu_exits<R: Rng>(
        &self,
        cpu: &mut LogicCpu<R>,
        profile: &CpuDifficultyVariables,
    ) -> Result<Vec<PlayerId>, GameError> {
        self.collect(|state, player| {
            if player.is_cpu() {
                cpu.cpu_choice(state, player, profile).map(Some)
            } else {
                Ok(None)
            }
        })
    }

    /// Ask every active player, CPU and human alike, whether they leave.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::IllegalPhase`] unless a card has been drawn, or
    /// whatever the heuristic raises.
    pub fn collect_exits<R: Rng, H: HumanChoices + ?Sized>(
        &self,
        cpu: &mut LogicCpu<R>,
        profile: &CpuDifficultyVariables,
        humans: &mut H,
    ) -> Result<Vec<PlayerId>, GameError> {
        self.collect(|state, player| {
            if player.is_cpu() {
                cpu.cpu_choice(state, player, profile).map(Some)
            } else {
                Ok(Some(humans.choose(state, player)))
            }
        })
    }

    fn collect(
        &self,
        mut decide: impl FnMut(&RoundState, &PlayerInRound) -> Result<Option<PlayerChoice>, GameError>,
    ) -> Result<Vec<PlayerId>, GameError> {
        self.require_phase(TurnPhase::Drawn, "collecting choices")?;
        let mut leaving = Vec::new();
        for id in self.state.players().active_players() {
            let Some(player) = self.player(id) else {
                continue;
            };
            if decide(&*self.state, player)? == Some(PlayerChoice::Exit) {
                leaving.push(id);
            }
        }
        Ok(leaving)
    }

    fn require_phase(&self, expected: TurnPhase, operation: &'static str) -> Result<(), GameError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(GameError::IllegalPhase {
                operation,
                phase: self.phase,
            })
        }
    }
}

fn find_mut(players: &mut [PlayerInRound], id: PlayerId) -> Option<&mut PlayerInRound> {
    players.iter_mut().find(|player| player.id() == id)
}

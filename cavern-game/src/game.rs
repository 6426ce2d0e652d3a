//! Game settings and the round iterator.
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::cpu::{CpuDifficulty, CpuDifficultyVariables};
use crate::deck::Deck;
use crate::effects::{EndCondition, GemModifier, RoundEffect};
use crate::error::{GameError, SettingsError, SettingsViolation};
use crate::leaderboard::Leaderboard;
use crate::players::{PlayerId, PlayerInRound, PlayerKind};
use crate::round::Round;
use crate::seed::{DECK_STREAM, stream_rng};

pub const MIN_PLAYERS: usize = 3;
pub const MAX_PLAYERS: usize = 8;
pub const MAX_NAME_LEN: usize = 12;
pub const MIN_ROUNDS: u32 = 1;
pub const MAX_ROUNDS: u32 = 16;
pub const DEFAULT_ROUNDS: u32 = 8;
pub const DEFAULT_CPUS: usize = 3;
pub const CPU_NAME_PREFIX: &str = "CPU-";

/// Everything chosen before the first round.
///
/// `deck: None` means the standard deck, minted from the game seed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub player_names: Vec<String>,
    pub num_cpu: usize,
    pub deck: Option<Deck>,
    pub end_condition: EndCondition,
    pub gem_modifier: GemModifier,
    pub cpu_difficulty: CpuDifficulty,
    pub num_rounds: u32,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            player_names: Vec::new(),
            num_cpu: DEFAULT_CPUS,
            deck: None,
            end_condition: EndCondition::default(),
            gem_modifier: GemModifier::default(),
            cpu_difficulty: CpuDifficulty::default(),
            num_rounds: DEFAULT_ROUNDS,
        }
    }
}

impl GameSettings {
    #[must_use]
    pub fn builder() -> GameSettingsBuilder {
        GameSettingsBuilder::default()
    }

    #[must_use]
    pub fn total_players(&self) -> usize {
        self.player_names.len() + self.num_cpu
    }

    #[must_use]
    pub const fn effect(&self) -> RoundEffect {
        RoundEffect::new(self.end_condition, self.gem_modifier)
    }

    #[must_use]
    pub const fn cpu_profile(&self) -> CpuDifficultyVariables {
        self.cpu_difficulty.variables()
    }

    /// Names of the CPU seats, `CPU-1` onwards.
    pub fn cpu_names(&self) -> impl Iterator<Item = String> {
        (1..=self.num_cpu).map(|n| format!("{CPU_NAME_PREFIX}{n}"))
    }

    /// Check every bound, reporting all violations at once.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Invalid`] listing each violated bound.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let mut violations = Vec::new();

        let count = self.total_players();
        if count < MIN_PLAYERS {
            violations.push(SettingsViolation::TooFewPlayers {
                count,
                min: MIN_PLAYERS,
            });
        }
        if count > MAX_PLAYERS {
            violations.push(SettingsViolation::TooManyPlayers {
                count,
                max: MAX_PLAYERS,
            });
        }

        let mut seen = HashSet::new();
        let mut blank_reported = false;
        for name in self.player_names.iter().cloned().chain(self.cpu_names()) {
            if name.trim().is_empty() {
                if !blank_reported {
                    violations.push(SettingsViolation::BlankName);
                    blank_reported = true;
                }
                continue;
            }
            if name.chars().count() > MAX_NAME_LEN {
                violations.push(SettingsViolation::NameTooLong {
                    name: name.clone(),
                    max: MAX_NAME_LEN,
                });
            }
            if !seen.insert(name.clone()) {
                violations.push(SettingsViolation::DuplicateName(name));
            }
        }

        if !(MIN_ROUNDS..=MAX_ROUNDS).contains(&self.num_rounds) {
            violations.push(SettingsViolation::RoundsOutOfRange {
                count: self.num_rounds,
                min: MIN_ROUNDS,
                max: MAX_ROUNDS,
            });
        }

        if self.deck.as_ref().is_some_and(|deck| !deck.has_next()) {
            violations.push(SettingsViolation::EmptyDeck);
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(SettingsError::Invalid(violations))
        }
    }

    /// Humans in the order given, then the CPU seats.
    #[must_use]
    pub fn roster(&self) -> Vec<PlayerInRound> {
        let humans = self
            .player_names
            .iter()
            .map(|name| (name.clone(), PlayerKind::Human));
        let cpus = self.cpu_names().map(|name| (name, PlayerKind::Cpu));
        humans
            .chain(cpus)
            .enumerate()
            .map(|(seat, (name, kind))| PlayerInRound::new(PlayerId(seat), name, kind))
            .collect()
    }
}

/// Fluent construction of [`GameSettings`].
#[derive(Debug, Clone, Default)]
pub struct GameSettingsBuilder {
    settings: GameSettings,
}

impl GameSettingsBuilder {
    #[must_use]
    pub fn human(mut self, name: impl Into<String>) -> Self {
        self.settings.player_names.push(name.into());
        self
    }

    #[must_use]
    pub fn humans<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.settings
            .player_names
            .extend(names.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub const fn cpus(mut self, count: usize) -> Self {
        self.settings.num_cpu = count;
        self
    }

    #[must_use]
    pub fn deck(mut self, deck: Deck) -> Self {
        self.settings.deck = Some(deck);
        self
    }

    #[must_use]
    pub const fn end_condition(mut self, condition: EndCondition) -> Self {
        self.settings.end_condition = condition;
        self
    }

    #[must_use]
    pub const fn gem_modifier(mut self, modifier: GemModifier) -> Self {
        self.settings.gem_modifier = modifier;
        self
    }

    #[must_use]
    pub const fn cpu_difficulty(mut self, difficulty: CpuDifficulty) -> Self {
        self.settings.cpu_difficulty = difficulty;
        self
    }

    #[must_use]
    pub const fn rounds(mut self, count: u32) -> Self {
        self.settings.num_rounds = count;
        self
    }

    /// # Errors
    ///
    /// Returns [`SettingsError::Invalid`] when any bound is violated.
    pub fn build(self) -> Result<GameSettings, SettingsError> {
        self.settings.validate()?;
        Ok(self.settings)
    }
}

/// A whole game: players, the template deck, and the round counter.
#[derive(Debug, Clone)]
pub struct Game {
    settings: GameSettings,
    players: Vec<PlayerInRound>,
    template: Deck,
    rng: ChaCha20Rng,
    seed: u64,
    current_round: u32,
}

impl Game {
    /// # Errors
    ///
    /// Returns [`SettingsError::Invalid`] when the settings fail validation.
    pub fn new(settings: GameSettings, seed: u64) -> Result<Self, SettingsError> {
        settings.validate()?;
        let mut rng = stream_rng(seed, DECK_STREAM);
        let template = match &settings.deck {
            Some(deck) => deck.clone(),
            None => Deck::standard(&mut rng),
        };
        Ok(Self {
            players: settings.roster(),
            settings,
            template,
            rng,
            seed,
            current_round: 0,
        })
    }

    #[must_use]
    pub const fn settings(&self) -> &GameSettings {
        &self.settings
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    #[must_use]
    pub fn players(&self) -> &[PlayerInRound] {
        &self.players
    }

    /// Deck every round is shuffled from.
    #[must_use]
    pub const fn deck(&self) -> &Deck {
        &self.template
    }

    /// Rounds started so far.
    #[must_use]
    pub const fn current_round(&self) -> u32 {
        self.current_round
    }

    #[must_use]
    pub const fn total_rounds(&self) -> u32 {
        self.settings.num_rounds
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.current_round < self.settings.num_rounds
    }

    /// Start the next round with a freshly shuffled copy of the deck.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NoSuchRound`] once every round was played.
    pub fn next_round(&mut self) -> Result<Round<'_>, GameError> {
        if !self.has_next() {
            return Err(GameError::NoSuchRound);
        }
        self.current_round += 1;
        let deck = self.template.shuffled_copy(&mut self.rng);
        Round::new(
            self.current_round,
            &mut self.players,
            deck,
            self.settings.effect(),
        )
    }

    /// # Errors
    ///
    /// Returns [`GameError::IllegalState`] while rounds remain.
    pub fn leaderboard(&self) -> Result<Leaderboard, GameError> {
        if self.has_next() {
            return Err(GameError::IllegalState(
                "the leaderboard is only available once every round was played",
            ));
        }
        Ok(Leaderboard::new(&self.players))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Card;

    fn two_humans() -> GameSettingsBuilder {
        GameSettings::builder().humans(["Ana", "Bo"]).cpus(2)
    }

    #[test]
    fn defaults_describe_a_cpu_game() {
        let settings = GameSettings::default();
        assert_eq!(settings.total_players(), 3);
        assert_eq!(settings.num_rounds, DEFAULT_ROUNDS);
        assert_eq!(settings.effect(), RoundEffect::default());
        assert!(settings.validate().is_ok());
        let names: Vec<_> = settings.roster().into_iter().map(|p| p.name().to_string()).collect();
        assert_eq!(names, vec!["CPU-1", "CPU-2", "CPU-3"]);
    }

    #[test]
    fn roster_seats_humans_before_cpus() {
        let settings = two_humans().build().unwrap();
        let roster = settings.roster();
        assert_eq!(roster.len(), 4);
        assert_eq!(roster[0].name(), "Ana");
        assert_eq!(roster[1].kind(), PlayerKind::Human);
        assert_eq!(roster[2].name(), "CPU-1");
        assert!(roster[3].is_cpu());
        assert_eq!(roster[3].id(), PlayerId(3));
    }

    #[test]
    fn validation_collects_every_violation() {
        let err = GameSettings::builder()
            .humans(["", "Bartholomew-the-Bold", "CPU-1"])
            .cpus(6)
            .rounds(0)
            .deck(Deck::new(vec![]))
            .build()
            .unwrap_err();
        assert_eq!(
            err.violations(),
            &[
                SettingsViolation::TooManyPlayers { count: 9, max: 8 },
                SettingsViolation::BlankName,
                SettingsViolation::NameTooLong {
                    name: "Bartholomew-the-Bold".into(),
                    max: 12
                },
                SettingsViolation::DuplicateName("CPU-1".into()),
                SettingsViolation::RoundsOutOfRange {
                    count: 0,
                    min: 1,
                    max: 16
                },
                SettingsViolation::EmptyDeck,
            ]
        );
    }

    #[test]
    fn too_few_players_is_rejected() {
        let err = GameSettings::builder().human("Solo").cpus(1).build().unwrap_err();
        assert_eq!(
            err.violations(),
            &[SettingsViolation::TooFewPlayers { count: 2, min: 3 }]
        );
        assert!(Game::new(GameSettings { num_cpu: 2, ..GameSettings::default() }, 1).is_err());
    }

    #[test]
    fn game_iterates_the_configured_rounds() {
        let settings = two_humans().rounds(2).build().unwrap();
        let mut game = Game::new(settings, 7).unwrap();
        assert!(matches!(
            game.leaderboard(),
            Err(GameError::IllegalState(_))
        ));
        for expected in 1..=2 {
            let round = game.next_round().unwrap();
            assert_eq!(round.number(), expected);
            assert_eq!(round.state().deck().remaining(), 35);
        }
        assert!(!game.has_next());
        assert!(matches!(game.next_round(), Err(GameError::NoSuchRound)));
        assert_eq!(game.leaderboard().unwrap().players_sorted_by_score().len(), 4);
    }

    #[test]
    fn each_round_gets_a_reshuffled_copy_of_the_template() {
        let mut game = Game::new(two_humans().build().unwrap(), 11).unwrap();
        let template: Vec<Card> = game.deck().iter().copied().collect();
        let first: Vec<Card> = game.next_round().unwrap().state().deck().iter().copied().collect();
        let second: Vec<Card> = game.next_round().unwrap().state().deck().iter().copied().collect();
        assert_ne!(first, second);
        let sorted = |mut cards: Vec<Card>| {
            cards.sort_by_key(|card| (card.kind() as u8, card.gem_value(), card.trap_kind()));
            cards
        };
        assert_eq!(sorted(first), sorted(template.clone()));
        assert_eq!(game.deck().iter().copied().collect::<Vec<_>>(), template);
    }

    #[test]
    fn same_seed_deals_the_same_decks() {
        let deal = |seed| {
            let mut game = Game::new(two_humans().build().unwrap(), seed).unwrap();
            game.next_round()
                .unwrap()
                .state()
                .deck()
                .iter()
                .copied()
                .collect::<Vec<Card>>()
        };
        assert_eq!(deal(3), deal(3));
        assert_ne!(deal(3), deal(4));
    }

    #[test]
    fn settings_round_trip_through_json() {
        let settings = two_humans()
            .end_condition(EndCondition::ThreeRelicsDrawn)
            .gem_modifier(GemModifier::risky_reward(10))
            .cpu_difficulty(CpuDifficulty::Hard)
            .build()
            .unwrap();
        let json = serde_json::to_string(&settings).unwrap();
        let back: GameSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, settings);
        let partial: GameSettings = serde_json::from_str(r#"{"num_cpu": 4}"#).unwrap();
        assert_eq!(partial.num_rounds, DEFAULT_ROUNDS);
    }
}

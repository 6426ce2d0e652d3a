use std::fmt;

use cavern_game::{
    CpuDifficulty, CpuDifficultyVariables, HumanChoices, LogicCpu, PlayerChoice, PlayerInRound,
    RoundState,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Sack size at which the cautious seat walks out.
const CAUTIOUS_SACK_GEMS: u32 = 8;
/// Distinct trap kinds on the path that make the cautious seat nervous.
const CAUTIOUS_TRAP_KINDS: usize = 2;

/// Policy interface for automated human seats.
pub trait SeatPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Decide whether `player` keeps exploring.
    fn decide(&mut self, state: &RoundState, player: &PlayerInRound) -> PlayerChoice;
}

/// Built-in strategies for the human seats of a simulated game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SeatStrategy {
    Cautious,
    Greedy,
    CoinFlip,
    Mirror,
}

impl SeatStrategy {
    pub const ALL: [Self; 4] = [Self::Cautious, Self::Greedy, Self::CoinFlip, Self::Mirror];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            SeatStrategy::Cautious => "Cautious",
            SeatStrategy::Greedy => "Greedy",
            SeatStrategy::CoinFlip => "Coin Flip",
            SeatStrategy::Mirror => "Mirror",
        }
    }

    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            SeatStrategy::Cautious => "cautious",
            SeatStrategy::Greedy => "greedy",
            SeatStrategy::CoinFlip => "coinflip",
            SeatStrategy::Mirror => "mirror",
        }
    }

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.key().eq_ignore_ascii_case(key.trim()))
    }

    /// One policy drives every human seat of a game. `Mirror` plays with the
    /// same heuristic as the CPUs at `difficulty`.
    #[must_use]
    pub fn create_policy(self, seed: u64, difficulty: CpuDifficulty) -> Box<dyn SeatPolicy + Send> {
        match self {
            SeatStrategy::Cautious => Box::new(CautiousPolicy),
            SeatStrategy::Greedy => Box::new(GreedyPolicy),
            SeatStrategy::CoinFlip => Box::new(CoinFlipPolicy::new(seed)),
            SeatStrategy::Mirror => Box::new(MirrorPolicy::new(seed, difficulty)),
        }
    }
}

impl fmt::Display for SeatStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Adapts a [`SeatPolicy`] to the engine's human decision hook and counts
/// what it decided.
pub struct PolicySeats {
    policy: Box<dyn SeatPolicy + Send>,
    pub decisions: usize,
    pub exits: usize,
}

impl PolicySeats {
    #[must_use]
    pub fn new(policy: Box<dyn SeatPolicy + Send>) -> Self {
        Self {
            policy,
            decisions: 0,
            exits: 0,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.policy.name()
    }
}

impl HumanChoices for PolicySeats {
    fn choose(&mut self, state: &RoundState, player: &PlayerInRound) -> PlayerChoice {
        let choice = self.policy.decide(state, player);
        self.decisions += 1;
        if choice == PlayerChoice::Exit {
            self.exits += 1;
        }
        log::debug!(
            "{} seat {} chose {:?} with {} gems in the sack",
            self.policy.name(),
            player.name(),
            choice,
            player.sack_gems()
        );
        choice
    }
}

struct CautiousPolicy;
struct GreedyPolicy;

struct CoinFlipPolicy {
    rng: ChaCha20Rng,
}

impl CoinFlipPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

struct MirrorPolicy {
    cpu: LogicCpu,
    profile: CpuDifficultyVariables,
}

impl MirrorPolicy {
    fn new(seed: u64, difficulty: CpuDifficulty) -> Self {
        Self {
            cpu: LogicCpu::seeded(seed),
            profile: difficulty.variables(),
        }
    }
}

impl SeatPolicy for CautiousPolicy {
    fn name(&self) -> &'static str {
        "Cautious"
    }

    fn decide(&mut self, state: &RoundState, player: &PlayerInRound) -> PlayerChoice {
        if player.sack_gems() >= CAUTIOUS_SACK_GEMS
            || state.distinct_trap_kinds() >= CAUTIOUS_TRAP_KINDS
        {
            PlayerChoice::Exit
        } else {
            PlayerChoice::Stay
        }
    }
}

impl SeatPolicy for GreedyPolicy {
    fn name(&self) -> &'static str {
        "Greedy"
    }

    fn decide(&mut self, _state: &RoundState, _player: &PlayerInRound) -> PlayerChoice {
        PlayerChoice::Stay
    }
}

impl SeatPolicy for CoinFlipPolicy {
    fn name(&self) -> &'static str {
        "Coin Flip"
    }

    fn decide(&mut self, _state: &RoundState, _player: &PlayerInRound) -> PlayerChoice {
        if self.rng.gen_bool(0.5) {
            PlayerChoice::Exit
        } else {
            PlayerChoice::Stay
        }
    }
}

impl SeatPolicy for MirrorPolicy {
    fn name(&self) -> &'static str {
        "Mirror"
    }

    fn decide(&mut self, state: &RoundState, player: &PlayerInRound) -> PlayerChoice {
        // Only fails without active players, which never reach a decision.
        self.cpu
            .cpu_choice(state, player, &self.profile)
            .unwrap_or(PlayerChoice::Stay)
    }
}

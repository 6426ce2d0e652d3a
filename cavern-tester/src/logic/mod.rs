pub mod balance;
pub mod policy;
pub mod reports;
pub mod seeds;
pub mod simulation;
pub mod tester;

pub use balance::{BalanceAggregate, aggregate_balance};
pub use policy::SeatStrategy;
pub use seeds::resolve_seed_inputs;
pub use simulation::{GameRecord, ScenarioConfig};
pub use tester::*;

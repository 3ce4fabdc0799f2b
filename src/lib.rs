pub mod effects;
pub mod engine;
pub mod filters;
pub mod flight;
pub mod game;
pub mod goals;
pub mod levels;
pub mod push;
pub mod session;
pub mod solver;
pub mod tiles;
pub mod zobrist;

pub use engine::{Transition, transition};
pub use game::{Direction, State};
pub use levels::{LevelError, Levels};
pub use solver::{CancelToken, SolveOutcome, SolverOptions, solve};

//! Deterministic simulation module
//!
//! Everything that decides a shot's outcome lives here. This module must be
//! pure and deterministic:
//! - Fixed tick only
//! - No randomness
//! - Stable iteration order (board order for blocks and rings, launch order for balls)
//! - No rendering or device dependencies

pub mod board;
pub mod collision;
pub mod observer;
pub mod score;
pub mod state;
pub mod tick;

pub use board::{Board, Cell, CellPos};
pub use collision::{Contact, ContactKind, ball_block_contact, ball_ring_collision, respond_to_contact};
pub use observer::{NoopObserver, TickObserver, TraceObserver};
pub use score::{board_penalty, evaluate};
pub use state::{Ball, BallPhase, Block, Rect, Ring, SimulationRun};
pub use tick::{Outcome, SimError, run_to_completion, simulate, simulate_with, step};

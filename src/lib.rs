//! Ballz Solver - picks the launch angle for a volley of balls
//!
//! Core modules:
//! - `sim`: Deterministic simulation (board, kinematics, collisions, scoring)
//! - `search`: Brute-force angle search over the simulator
//! - `calibration`: Pixel geometry and tuning constants for the one supported screen
//! - `device`: Snapshot provider / actuator boundary and swipe geometry
//! - `error`: Crate-level error types

pub mod calibration;
pub mod device;
pub mod error;
pub mod search;
pub mod sim;

pub use calibration::Calibration;
pub use error::{SolverError, SolverResult};
pub use search::{AngleSearch, Decision, SearchOptions};

use glam::DVec2;

/// Board and search constants
pub mod consts {
    /// Board is always 7x7
    pub const BOARD_SIZE: usize = 7;

    /// Cell code for an empty cell
    pub const EMPTY_CODE: i32 = 0;
    /// Cell code for an extra-ball ring
    pub const RING_CODE: i32 = -1;
    /// Second marker emitted by state extraction (never simulated)
    pub const MARKER_CODE: i32 = -2;

    /// Candidate angles (degrees): 15, 18, ... 165
    pub const ANGLE_MIN_DEG: u32 = 15;
    pub const ANGLE_MAX_DEG: u32 = 165;
    pub const ANGLE_STEP_DEG: u32 = 3;

    /// Default cap on balls simulated per volley
    pub const DEFAULT_MAX_BALLS: u32 = 40;

    /// Simulation ticks per second of real play, used for the wait estimate
    pub const TICKS_PER_SECOND: f64 = 120.0;
    /// Fixed slack added to every round-duration estimate (seconds)
    pub const ROUND_SLACK_SECS: f64 = 8.0;
}

/// Launch velocity for an angle in degrees, 0 = right, 90 = straight up.
///
/// The y component is "up" positive; screen y grows downward, so the
/// kinematics subtract it.
#[inline]
pub fn launch_velocity(angle_deg: f64, speed: f64) -> DVec2 {
    let rad = angle_deg.to_radians();
    DVec2::new(rad.cos() * speed, rad.sin() * speed)
}

/// Offset of a point on a circle of `radius` at `angle_deg` (y up positive)
#[inline]
pub fn circle_offset(angle_deg: f64, radius: f64) -> DVec2 {
    launch_velocity(angle_deg, radius)
}

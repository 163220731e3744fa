//! Device boundary
//!
//! Screen capture, board recognition and touch input live outside this
//! crate. They are reached through two traits: a `SnapshotProvider` that
//! reports the board, and an `Actuator` that performs the aiming swipe.

use std::fs;
use std::path::{Path, PathBuf};

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::calibration::Calibration;
use crate::error::{SolverError, SolverResult};
use crate::sim::Board;

fn default_ball_count() -> u32 {
    1
}

/// What the device reports before a shot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    /// Where the volley launches from (screen pixels)
    pub launch: (i32, i32),
    /// Grid codes, row 0 at the top
    pub grid: Board,
    /// Balls available this turn; unreadable counts are reported as 1
    #[serde(default = "default_ball_count")]
    pub extra_ball_count: u32,
}

impl BoardSnapshot {
    pub fn new(launch: (i32, i32), grid: Board, extra_ball_count: u32) -> Self {
        Self {
            launch,
            grid,
            extra_ball_count,
        }
    }

    pub fn launch_pos(&self) -> DVec2 {
        DVec2::new(f64::from(self.launch.0), f64::from(self.launch.1))
    }

    /// Ball count with the "at least one" floor applied
    pub fn ball_count(&self) -> u32 {
        self.extra_ball_count.max(1)
    }

    pub fn from_json(json: &str) -> SolverResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Source of board snapshots (screen capture + recognition)
pub trait SnapshotProvider {
    fn board_snapshot(&mut self) -> SolverResult<BoardSnapshot>;
}

/// Performs touch gestures on the device
pub trait Actuator {
    fn swipe(&mut self, gesture: &SwipeGesture) -> SolverResult<()>;
}

/// Reads a snapshot saved as JSON
#[derive(Debug, Clone)]
pub struct JsonFileProvider {
    path: PathBuf,
}

impl JsonFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotProvider for JsonFileProvider {
    fn board_snapshot(&mut self) -> SolverResult<BoardSnapshot> {
        let json = fs::read_to_string(&self.path).map_err(|e| {
            SolverError::Device(format!("cannot read snapshot {}: {e}", self.path.display()))
        })?;
        let snapshot = BoardSnapshot::from_json(&json)?;
        log::debug!(
            "Snapshot from {}: launch={:?} balls={}",
            self.path.display(),
            snapshot.launch,
            snapshot.extra_ball_count
        );
        Ok(snapshot)
    }
}

/// Logs gestures instead of performing them
#[derive(Debug, Default)]
pub struct DryRunActuator {
    pub performed: Vec<SwipeGesture>,
}

impl Actuator for DryRunActuator {
    fn swipe(&mut self, gesture: &SwipeGesture) -> SolverResult<()> {
        log::info!(
            "Swipe ({:.0}, {:.0}) -> ({:.0}, {:.0}) over {} ms (dry run)",
            gesture.from.x,
            gesture.from.y,
            gesture.to.x,
            gesture.to.y,
            gesture.duration_ms
        );
        self.performed.push(*gesture);
        Ok(())
    }
}

/// A drag from the launch point, pulled back opposite the shot direction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwipeGesture {
    pub from: DVec2,
    pub to: DVec2,
    pub duration_ms: u32,
}

impl SwipeGesture {
    /// Gesture that fires the volley at `angle_deg`.
    ///
    /// The deviation from vertical is scaled by the calibration's angular
    /// correction, then the drag runs `swipe_distance` pixels the opposite
    /// way.
    pub fn for_angle(launch: DVec2, angle_deg: f64, cal: &Calibration) -> Self {
        let corrected = (angle_deg - 90.0) * cal.swipe_angle_correction + 90.0;
        let rad = (180.0 + corrected).to_radians();
        let delta = DVec2::new(rad.cos(), rad.sin()) * cal.swipe_distance;
        Self {
            from: launch,
            to: DVec2::new(launch.x + delta.x, launch.y - delta.y),
            duration_ms: cal.swipe_duration_ms,
        }
    }
}

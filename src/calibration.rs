//! Screen calibration and simulation tuning
//!
//! Every pixel constant lives here. The defaults describe a 1080px-wide
//! portrait screen; nothing else in the crate hard-codes geometry.

use std::fs;
use std::path::Path;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::consts::BOARD_SIZE;
use crate::error::{SolverError, SolverResult};

/// Geometry and tuning constants for one screen resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Calibration {
    // === Screen ===
    /// Playfield width; balls reflect off x = radius and x = width - radius
    pub screen_width: f64,
    /// Top of the playfield; balls reflect off y = ball_radius + ceiling_y
    pub ceiling_y: f64,
    /// Crossing above this line marks a ball as having left the launch area
    pub launch_exit_y: f64,
    /// Crossing below this line (after leaving) returns the ball
    pub return_y: f64,

    // === Board ===
    /// Top-left corner of block (0, 0)
    pub block_origin: DVec2,
    /// Distance between neighbouring cells (x = column, y = row)
    pub cell_spacing: DVec2,
    /// Block rectangle size
    pub block_size: DVec2,
    /// Center of ring (0, 0)
    pub ring_origin: DVec2,
    pub ring_radius: f64,

    // === Balls ===
    pub ball_radius: f64,
    /// Distance travelled per tick
    pub ball_speed: f64,
    /// Ticks between consecutive launches within a volley
    pub launch_stagger_ticks: u32,

    // === Collision ===
    /// Extra radius for the coarse block probe
    pub coarse_probe_margin: f64,
    pub coarse_probe_step_deg: u32,
    pub fine_probe_step_deg: u32,
    /// |dx - dy| below this is a corner contact
    pub corner_tolerance: f64,
    /// Blocks farther than this (squared, center to center) are skipped
    pub prune_distance_sq: f64,

    // === Scoring ===
    pub ring_bonus: i64,
    /// Penalty weight per remaining hit, indexed by row (top row first)
    pub row_coefficients: [i64; BOARD_SIZE],

    /// Runs still going after this many ticks are abandoned
    pub max_ticks: u32,

    // === Actuation ===
    /// Length of the aiming swipe
    pub swipe_distance: f64,
    /// Scale applied to the angle's deviation from vertical before swiping
    pub swipe_angle_correction: f64,
    pub swipe_duration_ms: u32,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            screen_width: 1080.0,
            ceiling_y: 160.0,
            launch_exit_y: 1490.0,
            return_y: 1510.0,

            block_origin: DVec2::new(22.0, 320.0),
            cell_spacing: DVec2::new(151.0, 154.0),
            block_size: DVec2::new(134.0, 137.0),
            ring_origin: DVec2::new(90.0, 388.0),
            ring_radius: 28.0,

            ball_radius: 21.0,
            ball_speed: 8.0,
            launch_stagger_ticks: 25,

            coarse_probe_margin: 5.0,
            coarse_probe_step_deg: 15,
            fine_probe_step_deg: 6,
            corner_tolerance: 1.5,
            prune_distance_sq: 15_000.0,

            ring_bonus: 15,
            row_coefficients: [1, 1, 2, 3, 10, 40, 160],

            max_ticks: 200_000,

            swipe_distance: 80.0,
            swipe_angle_correction: 0.993,
            swipe_duration_ms: 600,
        }
    }
}

impl Calibration {
    /// Top-left corner of the block rectangle at (row, col)
    pub fn block_min(&self, row: usize, col: usize) -> DVec2 {
        self.block_origin + self.cell_spacing * DVec2::new(col as f64, row as f64)
    }

    /// Center of the ring at (row, col)
    pub fn ring_center(&self, row: usize, col: usize) -> DVec2 {
        self.ring_origin + self.cell_spacing * DVec2::new(col as f64, row as f64)
    }

    /// Reject values that would make the simulation meaningless or endless
    pub fn validate(&self) -> SolverResult<()> {
        if self.coarse_probe_step_deg == 0 || self.fine_probe_step_deg == 0 {
            return Err(SolverError::Calibration(
                "probe step angles must be non-zero".to_string(),
            ));
        }
        if !(self.ball_speed > 0.0) || !(self.ball_radius > 0.0) {
            return Err(SolverError::Calibration(
                "ball speed and radius must be positive".to_string(),
            ));
        }
        if self.block_size.min_element() <= 0.0 || self.ring_radius < 0.0 {
            return Err(SolverError::Calibration(
                "block size must be positive and ring radius non-negative".to_string(),
            ));
        }
        if self.max_ticks == 0 {
            return Err(SolverError::Calibration(
                "max_ticks must be non-zero".to_string(),
            ));
        }
        if self.return_y <= self.launch_exit_y {
            return Err(SolverError::Calibration(format!(
                "return line {} must lie below the launch exit line {}",
                self.return_y, self.launch_exit_y
            )));
        }
        Ok(())
    }

    /// Load a calibration from a JSON file (missing fields take defaults)
    pub fn load(path: &Path) -> SolverResult<Self> {
        let json = fs::read_to_string(path)?;
        let calibration: Self = serde_json::from_str(&json)?;
        calibration.validate()?;
        log::info!("Loaded calibration from {}", path.display());
        Ok(calibration)
    }

    /// Write the calibration as pretty JSON
    pub fn save(&self, path: &Path) -> SolverResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        log::info!("Calibration saved to {}", path.display());
        Ok(())
    }
}

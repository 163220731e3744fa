//! Simulation entities and per-run state
//!
//! A `SimulationRun` owns its own board copy and entity tables, so runs
//! for different angles never share anything. Blocks and rings are kept
//! in stable tables and tombstoned instead of removed.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::board::{Board, Cell, CellPos};
use crate::calibration::Calibration;
use crate::launch_velocity;

/// Axis-aligned rectangle, half-open on the far edges
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: DVec2,
    pub size: DVec2,
}

impl Rect {
    pub fn new(min: DVec2, size: DVec2) -> Self {
        Self { min, size }
    }

    #[inline]
    pub fn contains(&self, point: DVec2) -> bool {
        let max = self.min + self.size;
        point.x >= self.min.x && point.x < max.x && point.y >= self.min.y && point.y < max.y
    }

    #[inline]
    pub fn center(&self) -> DVec2 {
        self.min + self.size / 2.0
    }
}

/// Where a ball is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BallPhase {
    /// Waiting for its turn to launch
    Delayed,
    /// Moving through the playfield
    Traveling,
    /// Back at the bottom; never moves again
    Returned,
}

/// A ball entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub pos: DVec2,
    /// Velocity per tick, y up positive
    pub vel: DVec2,
    pub radius: f64,
    /// Ticks left before the ball starts moving
    pub delay: u32,
    /// Set once the ball has risen out of the launch area
    pub left_launch: bool,
    /// Speed magnitude; zero marks the ball as returned
    pub speed: f64,
}

impl Ball {
    pub fn new(pos: DVec2, angle_deg: f64, speed: f64, radius: f64, delay: u32) -> Self {
        Self {
            pos,
            vel: launch_velocity(angle_deg, speed),
            radius,
            delay,
            left_launch: false,
            speed,
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.speed != 0.0
    }

    pub fn phase(&self) -> BallPhase {
        if !self.is_active() {
            BallPhase::Returned
        } else if self.delay > 0 {
            BallPhase::Delayed
        } else {
            BallPhase::Traveling
        }
    }

    /// Squared distance from the ball center to a block center
    #[inline]
    pub fn distance_sq_to(&self, block: &Block) -> f64 {
        self.pos.distance_squared(block.rect.center())
    }

    /// Advance one tick: count down the launch delay, or move and apply
    /// the wall, ceiling and return lines.
    pub fn advance(&mut self, cal: &Calibration) {
        if self.delay > 0 {
            self.delay -= 1;
            return;
        }

        self.pos.x += self.vel.x;
        self.pos.y -= self.vel.y;

        if self.pos.y < cal.launch_exit_y {
            self.left_launch = true;
        }

        if self.pos.x < self.radius {
            self.pos.x = self.radius;
            self.vel.x = -self.vel.x;
        } else if self.pos.x > cal.screen_width - self.radius {
            self.pos.x = cal.screen_width - self.radius;
            self.vel.x = -self.vel.x;
        }

        let ceiling = self.radius + cal.ceiling_y;
        if self.pos.y < ceiling {
            self.pos.y = ceiling;
            self.vel.y = -self.vel.y;
        } else if self.pos.y > cal.return_y && self.left_launch {
            self.pos.y = cal.return_y;
            self.vel = DVec2::ZERO;
            self.speed = 0.0;
        }
    }
}

/// A breakable block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub cell: CellPos,
    pub rect: Rect,
    /// Hits left
    pub value: u32,
    /// Tombstone; destroyed blocks are never checked again this run
    pub destroyed: bool,
}

impl Block {
    pub fn new(cell: CellPos, value: u32, cal: &Calibration) -> Self {
        Self {
            cell,
            rect: Rect::new(cal.block_min(cell.row, cell.col), cal.block_size),
            value,
            destroyed: false,
        }
    }
}

/// An extra-ball ring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ring {
    pub cell: CellPos,
    pub center: DVec2,
    pub radius: f64,
    /// Tombstone; a ring pays out once
    pub collected: bool,
}

impl Ring {
    pub fn new(cell: CellPos, cal: &Calibration) -> Self {
        Self {
            cell,
            center: cal.ring_center(cell.row, cell.col),
            radius: cal.ring_radius,
            collected: false,
        }
    }
}

/// One independent simulation for one candidate angle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationRun {
    pub board: Board,
    /// Blocks in board order (sorted by row, then column)
    pub blocks: Vec<Block>,
    /// Rings in board order
    pub rings: Vec<Ring>,
    /// Balls in launch order
    pub balls: Vec<Ball>,
    /// Ticks elapsed
    pub ticks: u32,
    /// Ring bonuses collected so far
    pub bonus: i64,
}

impl SimulationRun {
    /// Build a run from a board: a Block for every block cell, a Ring for
    /// every ring cell, and `ball_count` balls staggered at the launch point.
    pub fn new(
        board: &Board,
        launch: DVec2,
        angle_deg: f64,
        ball_count: u32,
        cal: &Calibration,
    ) -> Self {
        let board = *board;
        let mut blocks = Vec::new();
        let mut rings = Vec::new();
        for (pos, cell) in board.iter() {
            match cell {
                Cell::Block(value) => blocks.push(Block::new(pos, value, cal)),
                Cell::Ring => rings.push(Ring::new(pos, cal)),
                Cell::Empty | Cell::Marker => {}
            }
        }

        let balls = (0..ball_count)
            .map(|i| {
                Ball::new(
                    launch,
                    angle_deg,
                    cal.ball_speed,
                    cal.ball_radius,
                    i.saturating_mul(cal.launch_stagger_ticks),
                )
            })
            .collect();

        Self {
            board,
            blocks,
            rings,
            balls,
            ticks: 0,
            bonus: 0,
        }
    }

    /// True once every ball has returned
    pub fn is_finished(&self) -> bool {
        self.balls.iter().all(|b| !b.is_active())
    }

    pub fn live_blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter().filter(|b| !b.destroyed)
    }

    pub fn live_rings(&self) -> impl Iterator<Item = &Ring> {
        self.rings.iter().filter(|r| !r.collected)
    }
}

//! Per-tick observation hooks
//!
//! The stepper calls an observer after every tick. Production searches use
//! `NoopObserver`; the replay command uses `TraceObserver`.

use super::state::SimulationRun;

pub trait TickObserver {
    /// Called after each completed tick with the run's current state.
    fn on_tick(&mut self, _run: &SimulationRun) {}

    /// Called once when a block is destroyed.
    fn on_block_destroyed(&mut self, _run: &SimulationRun, _index: usize) {}

    /// Called once when a ring is collected.
    fn on_ring_collected(&mut self, _run: &SimulationRun, _index: usize) {}
}

/// Default: no overhead.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl TickObserver for NoopObserver {}

/// Logs ball positions at trace level every `every` ticks, and board
/// events at debug level.
#[derive(Debug, Clone, Copy)]
pub struct TraceObserver {
    every: u32,
}

impl TraceObserver {
    pub fn new(every: u32) -> Self {
        Self {
            every: every.max(1),
        }
    }
}

impl TickObserver for TraceObserver {
    fn on_tick(&mut self, run: &SimulationRun) {
        if run.ticks % self.every != 0 {
            return;
        }
        log::trace!(
            "tick {}: {} blocks, {} rings left",
            run.ticks,
            run.live_blocks().count(),
            run.live_rings().count()
        );
        for (i, ball) in run.balls.iter().enumerate() {
            log::trace!(
                "tick {} ball {} {:?} pos=({:.1}, {:.1}) vel=({:.2}, {:.2})",
                run.ticks,
                i,
                ball.phase(),
                ball.pos.x,
                ball.pos.y,
                ball.vel.x,
                ball.vel.y
            );
        }
    }

    fn on_block_destroyed(&mut self, run: &SimulationRun, index: usize) {
        if let Some(block) = run.blocks.get(index) {
            log::debug!(
                "tick {}: block ({}, {}) destroyed",
                run.ticks,
                block.cell.row,
                block.cell.col
            );
        }
    }

    fn on_ring_collected(&mut self, run: &SimulationRun, index: usize) {
        if let Some(ring) = run.rings.get(index) {
            log::debug!(
                "tick {}: ring ({}, {}) collected, bonus now {}",
                run.ticks,
                ring.cell.row,
                ring.cell.col,
                run.bonus
            );
        }
    }
}

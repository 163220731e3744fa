//! Outcome scoring
//!
//! Score = ring bonuses + board penalty. Every hit left on the board costs
//! its row's coefficient, so blocks close to the launch line hurt most.

use super::board::Board;
use super::state::SimulationRun;
use crate::calibration::Calibration;
use crate::consts::BOARD_SIZE;

/// Penalty for the blocks left on `board` (always <= 0)
pub fn board_penalty(board: &Board, row_coefficients: &[i64; BOARD_SIZE]) -> i64 {
    -board
        .iter()
        .filter_map(|(pos, cell)| {
            cell.block_value()
                .map(|value| i64::from(value) * row_coefficients[pos.row])
        })
        .sum::<i64>()
}

/// Final score of a finished (or abandoned) run
pub fn evaluate(run: &SimulationRun, cal: &Calibration) -> i64 {
    run.bonus + board_penalty(&run.board, &cal.row_coefficients)
}

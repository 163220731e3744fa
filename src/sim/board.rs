//! Board grid and cell codes
//!
//! The grid is 7x7, row-major, row 0 at the top of the screen. Cells are
//! stored typed; the integer codes only exist at the serde boundary.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::{BOARD_SIZE, EMPTY_CODE, MARKER_CODE, RING_CODE};

/// Contents of one board cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum Cell {
    #[default]
    Empty,
    /// Breakable block with this many hits left (always > 0)
    Block(u32),
    /// Extra-ball ring
    Ring,
    /// Marker reported by state extraction; inert during simulation
    Marker,
}

impl Cell {
    /// Decode a grid code. Unrecognized codes degrade to `Empty`.
    pub fn from_code(code: i32) -> Self {
        match code {
            c if c > 0 => Cell::Block(c as u32),
            RING_CODE => Cell::Ring,
            MARKER_CODE => Cell::Marker,
            _ => Cell::Empty,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Cell::Empty => EMPTY_CODE,
            Cell::Block(value) => value.min(i32::MAX as u32) as i32,
            Cell::Ring => RING_CODE,
            Cell::Marker => MARKER_CODE,
        }
    }

    /// Remaining hits if this is a block
    #[inline]
    pub fn block_value(self) -> Option<u32> {
        match self {
            Cell::Block(value) => Some(value),
            _ => None,
        }
    }

    #[inline]
    pub fn is_block(self) -> bool {
        matches!(self, Cell::Block(_))
    }
}

impl From<i32> for Cell {
    fn from(code: i32) -> Self {
        Cell::from_code(code)
    }
}

impl From<Cell> for i32 {
    fn from(cell: Cell) -> Self {
        cell.code()
    }
}

/// Row/column position on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellPos {
    pub row: usize,
    pub col: usize,
}

impl CellPos {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// The 7x7 board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    cells: [[Cell; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    /// Build a board from raw grid codes
    pub fn from_codes(codes: &[[i32; BOARD_SIZE]; BOARD_SIZE]) -> Self {
        let mut board = Self::default();
        for (row, line) in codes.iter().enumerate() {
            for (col, &code) in line.iter().enumerate() {
                board.cells[row][col] = Cell::from_code(code);
            }
        }
        board
    }

    /// Raw grid codes, as state extraction would report them
    pub fn to_codes(&self) -> [[i32; BOARD_SIZE]; BOARD_SIZE] {
        self.cells.map(|line| line.map(Cell::code))
    }

    #[inline]
    pub fn get(&self, pos: CellPos) -> Cell {
        self.cells[pos.row][pos.col]
    }

    #[inline]
    pub fn set(&mut self, pos: CellPos, cell: Cell) {
        self.cells[pos.row][pos.col] = cell;
    }

    /// Every position with its cell, row by row
    pub fn iter(&self) -> impl Iterator<Item = (CellPos, Cell)> + '_ {
        self.cells.iter().enumerate().flat_map(|(row, line)| {
            line.iter()
                .enumerate()
                .map(move |(col, &cell)| (CellPos::new(row, col), cell))
        })
    }

    /// Take one hit off the block at `pos`. Returns the remaining value, or
    /// `None` if there is no block there.
    pub fn hit_block(&mut self, pos: CellPos) -> Option<u32> {
        let remaining = self.get(pos).block_value()?.saturating_sub(1);
        let cell = if remaining == 0 {
            Cell::Empty
        } else {
            Cell::Block(remaining)
        };
        self.set(pos, cell);
        Some(remaining)
    }

    /// True if the block at `pos` is interior (1..=5 on both axes) and all
    /// four orthogonal neighbours currently hold blocks.
    pub fn is_landlocked(&self, pos: CellPos) -> bool {
        let CellPos { row, col } = pos;
        if row < 1 || col < 1 || row >= BOARD_SIZE - 1 || col >= BOARD_SIZE - 1 {
            return false;
        }
        [
            CellPos::new(row + 1, col),
            CellPos::new(row - 1, col),
            CellPos::new(row, col + 1),
            CellPos::new(row, col - 1),
        ]
        .into_iter()
        .all(|n| self.get(n).is_block())
    }

    pub fn block_count(&self) -> usize {
        self.iter().filter(|(_, cell)| cell.is_block()).count()
    }

    pub fn ring_count(&self) -> usize {
        self.iter().filter(|(_, cell)| *cell == Cell::Ring).count()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.cells {
            let row: Vec<String> = line.iter().map(|c| format!("{:>4}", c.code())).collect();
            writeln!(f, "[{} ]", row.join(","))?;
        }
        Ok(())
    }
}

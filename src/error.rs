//! Crate-level errors

use thiserror::Error;

pub use crate::sim::SimError;

#[derive(Error, Debug)]
pub enum SolverError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Calibration Error: {0}")]
    Calibration(String),

    #[error("Simulation Error: {0}")]
    Simulation(#[from] SimError),

    #[error("No viable angle among {candidates} candidates")]
    NoViableAngle { candidates: usize },

    #[error("Device Error: {0}")]
    Device(String),
}

pub type SolverResult<T> = Result<T, SolverError>;

//! Brute-force angle search
//!
//! Every candidate angle gets its own simulation run. Runs are independent,
//! so they are evaluated in parallel, but results are always collected in
//! candidate order and the tie-break (first strictly better score wins) is
//! applied over that order.

use std::time::Duration;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::calibration::Calibration;
use crate::consts::{
    ANGLE_MAX_DEG, ANGLE_MIN_DEG, ANGLE_STEP_DEG, DEFAULT_MAX_BALLS, ROUND_SLACK_SECS,
    TICKS_PER_SECOND,
};
use crate::device::{BoardSnapshot, SwipeGesture};
use crate::error::{SolverError, SolverResult};
use crate::sim::{Board, Outcome, SimError, simulate};

/// Candidate angles: every 3 degrees from 15 to 165
pub fn default_angles() -> Vec<f64> {
    (ANGLE_MIN_DEG..=ANGLE_MAX_DEG)
        .step_by(ANGLE_STEP_DEG as usize)
        .map(f64::from)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Candidates in evaluation (and tie-break) order
    pub angles: Vec<f64>,
    /// Cap on balls simulated per volley
    pub max_balls: u32,
    /// Evaluate candidates on the rayon pool
    pub parallel: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            angles: default_angles(),
            max_balls: DEFAULT_MAX_BALLS,
            parallel: true,
        }
    }
}

/// One candidate's result
#[derive(Debug, Clone, PartialEq)]
pub struct Trial {
    pub angle: f64,
    pub result: Result<Outcome, SimError>,
}

/// The chosen shot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub angle_degrees: f64,
    pub score: i64,
    pub estimated_ticks: u32,
    pub balls_used: u32,
    /// Board the simulation predicts after the volley
    pub final_board: Board,
}

impl Decision {
    /// Rough real-time length of the round: ticks at 120 per second plus a
    /// fixed slack, rounded down to whole seconds.
    pub fn estimated_wait(&self) -> Duration {
        let secs = f64::from(self.estimated_ticks) / TICKS_PER_SECOND + ROUND_SLACK_SECS;
        Duration::from_secs(secs as u64)
    }

    /// The gesture that fires this decision from `snapshot`'s launch point
    pub fn swipe(&self, snapshot: &BoardSnapshot, cal: &Calibration) -> SwipeGesture {
        SwipeGesture::for_angle(snapshot.launch_pos(), self.angle_degrees, cal)
    }
}

/// Index of the best successful trial: highest score, earliest on ties.
pub fn select_best(trials: &[Trial]) -> Option<usize> {
    let mut best: Option<(usize, i64)> = None;
    for (index, trial) in trials.iter().enumerate() {
        let Ok(outcome) = &trial.result else {
            continue;
        };
        if best.is_none_or(|(_, score)| outcome.score > score) {
            best = Some((index, outcome.score));
        }
    }
    best.map(|(index, _)| index)
}

pub struct AngleSearch {
    calibration: Calibration,
    options: SearchOptions,
}

impl AngleSearch {
    pub fn new(calibration: Calibration, options: SearchOptions) -> Self {
        Self {
            calibration,
            options,
        }
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    /// Balls a volley from `snapshot` simulates with
    pub fn balls_for(&self, snapshot: &BoardSnapshot, max_balls: u32) -> u32 {
        snapshot.ball_count().min(max_balls).max(1)
    }

    /// Simulate every candidate angle. Results are in candidate order.
    pub fn evaluate(&self, snapshot: &BoardSnapshot, ball_count: u32) -> Vec<Trial> {
        let launch = snapshot.launch_pos();
        let run = |&angle: &f64| Trial {
            angle,
            result: simulate(&snapshot.grid, launch, angle, ball_count, &self.calibration),
        };

        let trials: Vec<Trial> = if self.options.parallel {
            self.options.angles.par_iter().map(run).collect()
        } else {
            self.options.angles.iter().map(run).collect()
        };

        for trial in &trials {
            match &trial.result {
                Ok(outcome) => log::debug!(
                    "Simulating {} degs -> score = {} ticks = {}",
                    trial.angle,
                    outcome.score,
                    outcome.ticks
                ),
                Err(err) => log::warn!("Simulating {} degs failed: {}", trial.angle, err),
            }
        }
        trials
    }

    /// Pick the angle whose simulated volley scores best.
    ///
    /// Failed candidates are skipped; if none succeed the search fails with
    /// `NoViableAngle`.
    pub fn choose_best_angle(
        &self,
        snapshot: &BoardSnapshot,
        max_balls: u32,
    ) -> SolverResult<Decision> {
        let balls_used = self.balls_for(snapshot, max_balls);
        let trials = self.evaluate(snapshot, balls_used);

        let best = select_best(&trials)
            .and_then(|index| trials.into_iter().nth(index))
            .and_then(|trial| trial.result.ok().map(|outcome| (trial.angle, outcome)));
        let Some((angle, outcome)) = best else {
            return Err(SolverError::NoViableAngle {
                candidates: self.options.angles.len(),
            });
        };

        let decision = Decision {
            angle_degrees: angle,
            score: outcome.score,
            estimated_ticks: outcome.ticks,
            balls_used,
            final_board: outcome.board,
        };
        log::info!(
            "Best: degrees={}, score={}, pseudo-runtime={}, balls={}",
            decision.angle_degrees,
            decision.score,
            decision.estimated_ticks,
            decision.balls_used
        );
        Ok(decision)
    }

    /// `choose_best_angle` with the configured ball cap
    pub fn solve(&self, snapshot: &BoardSnapshot) -> SolverResult<Decision> {
        self.choose_best_angle(snapshot, self.options.max_balls)
    }
}

impl Default for AngleSearch {
    fn default() -> Self {
        Self::new(Calibration::default(), SearchOptions::default())
    }
}

/// Search with the default calibration and candidates
pub fn choose_best_angle(snapshot: &BoardSnapshot, max_balls: u32) -> SolverResult<Decision> {
    AngleSearch::default().choose_best_angle(snapshot, max_balls)
}

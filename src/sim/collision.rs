//! Collision detection and response
//!
//! Ball-block contact is found by sampling points on the ball's
//! circumference and testing them against the block rectangle, first
//! coarsely on an enlarged circle and then finely on the true one. The
//! response is a heuristic keyed on the offset of the first sample that
//! landed inside the block; it is not a physical reflection.

use glam::DVec2;

use super::state::{Ball, Block, Rect, Ring};
use crate::calibration::Calibration;
use crate::circle_offset;

/// Which response a contact triggers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactKind {
    /// |dx - dy| under the corner tolerance
    Corner,
    /// |dx| > |dy|
    TopBottom,
    LeftRight,
}

/// A confirmed ball-block contact
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Offset of the triggering sample from the ball center (y up positive)
    pub offset: DVec2,
    pub kind: ContactKind,
}

impl Contact {
    pub fn classify(offset: DVec2, corner_tolerance: f64) -> Self {
        let kind = if (offset.x - offset.y).abs() < corner_tolerance {
            ContactKind::Corner
        } else if offset.x.abs() > offset.y.abs() {
            ContactKind::TopBottom
        } else {
            ContactKind::LeftRight
        };
        Self { offset, kind }
    }
}

/// First sample on the circle around `center` (every `step_deg` degrees,
/// starting at 0) that lies inside `rect`. Returns its offset, y up positive.
pub fn probe_circle(center: DVec2, radius: f64, step_deg: u32, rect: &Rect) -> Option<DVec2> {
    (0..360u32)
        .step_by(step_deg.max(1) as usize)
        .map(|deg| circle_offset(f64::from(deg), radius))
        .find(|offset| rect.contains(DVec2::new(center.x + offset.x, center.y - offset.y)))
}

/// Two-phase ball-block test. `None` if the ball does not touch the block.
pub fn ball_block_contact(ball: &Ball, block: &Block, cal: &Calibration) -> Option<Contact> {
    probe_circle(
        ball.pos,
        ball.radius + cal.coarse_probe_margin,
        cal.coarse_probe_step_deg,
        &block.rect,
    )?;
    let offset = probe_circle(ball.pos, ball.radius, cal.fine_probe_step_deg, &block.rect)?;
    Some(Contact::classify(offset, cal.corner_tolerance))
}

/// Apply a contact to the ball's velocity and position.
///
/// The corner case assigns sequentially: vy takes the negation of the
/// already-updated vx.
pub fn respond_to_contact(ball: &mut Ball, contact: &Contact) {
    match contact.kind {
        ContactKind::Corner => {
            ball.vel.x = ball.vel.y;
            ball.vel.y = -ball.vel.x;
        }
        ContactKind::TopBottom => {
            ball.vel.x = -ball.vel.x;
            ball.pos.y += contact.offset.y;
        }
        ContactKind::LeftRight => {
            ball.vel.y = -ball.vel.y;
            ball.pos.x -= contact.offset.x;
        }
    }
}

/// Circle-circle overlap (touching counts)
#[inline]
pub fn ball_ring_collision(ball: &Ball, ring: &Ring) -> bool {
    let reach = ball.radius + ring.radius;
    ball.pos.distance_squared(ring.center) <= reach * reach
}

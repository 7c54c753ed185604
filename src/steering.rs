//! Turning rule: three sensor readings in, one heading adjustment out.
//!
//! The decision is a pure function of the readings. Only the "forward is
//! worst" case asks for a coin flip, and the caller supplies the coin.

use rand::Rng;

use crate::sensing::SensorReadings;

/// Outcome of comparing the three sensor readings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Turn {
    /// Keep the current heading.
    Straight,
    /// Add the rotation step.
    Left,
    /// Subtract the rotation step.
    Right,
    /// Forward is strictly worse than both sides: turn either way at random.
    Either,
}

impl Turn {
    /// Classify a set of readings.
    ///
    /// Ties that no branch claims (`F == FL == FR`, or `FL == FR` without a
    /// dominant forward reading) keep the heading.
    pub fn decide(readings: SensorReadings) -> Self {
        let SensorReadings {
            forward: f,
            left: fl,
            right: fr,
        } = readings;

        if f > fl && f > fr {
            Turn::Straight
        } else if f < fl && f < fr {
            Turn::Either
        } else if fr > fl {
            Turn::Right
        } else if fl > fr {
            Turn::Left
        } else {
            Turn::Straight
        }
    }

    /// Heading delta for this turn.
    ///
    /// `coin` is consulted only for [`Turn::Either`]: `true` turns right,
    /// `false` turns left.
    pub fn delta(self, rotation_step: f32, coin: impl FnOnce() -> bool) -> f32 {
        match self {
            Turn::Straight => 0.0,
            Turn::Left => rotation_step,
            Turn::Right => -rotation_step,
            Turn::Either => {
                if coin() {
                    -rotation_step
                } else {
                    rotation_step
                }
            }
        }
    }
}

/// Heading adjustment for one agent, drawing the coin from `rng` when needed.
#[inline]
pub fn steer<R: Rng + ?Sized>(readings: SensorReadings, rotation_step: f32, rng: &mut R) -> f32 {
    Turn::decide(readings).delta(rotation_step, || rng.gen_bool(0.5))
}

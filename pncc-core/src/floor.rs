//! Noise-floor tracking with an asymmetric single-pole lowpass.
//!
//! Per band, `floor[0] = 0.9 * x[0]` and for `m > 0`
//!
//! ```text
//! floor[m] = λa·floor[m-1] + (1-λa)·x[m]   if x[m] >= floor[m-1]
//! floor[m] = λb·floor[m-1] + (1-λb)·x[m]   otherwise
//! ```
//!
//! With `λa` close to one the floor rises slowly and with a smaller `λb` it
//! falls quickly, so it follows the lower envelope of `x`.

use crate::common::FLOOR_SEED_SCALE;
use crate::matrix::TfMatrix;

#[derive(Clone, Debug)]
pub struct FloorConfig {
    /// Smoothing rate while the input is at or above the floor.
    pub lambda_a: f32, // e.g., 0.999
    /// Smoothing rate while the input is below the floor.
    pub lambda_b: f32, // e.g., 0.5
}

impl Default for FloorConfig {
    fn default() -> Self {
        Self {
            lambda_a: 0.999,
            lambda_b: 0.5,
        }
    }
}

impl FloorConfig {
    pub(crate) fn validate(&self, name: &str) -> Result<(), crate::PnccError> {
        for (label, v) in [("lambda_a", self.lambda_a), ("lambda_b", self.lambda_b)] {
            if !(0.0..=1.0).contains(&v) {
                return Err(crate::PnccError::InvalidArg(format!(
                    "{name}.{label} must be within [0,1] (got {v})"
                )));
            }
        }
        Ok(())
    }
}

/// Track the floor of every band of `signal` independently.
pub fn asymmetric_lowpass(signal: &TfMatrix, cfg: &FloorConfig) -> TfMatrix {
    let (frames, bands) = signal.shape();
    let mut floor = TfMatrix::zeros(frames, bands);
    if frames == 0 {
        return floor;
    }

    for f in 0..bands {
        let mut prev = FLOOR_SEED_SCALE * signal.get(0, f);
        floor.set(0, f, prev);
        for m in 1..frames {
            let x = signal.get(m, f);
            let lambda = if x >= prev { cfg.lambda_a } else { cfg.lambda_b };
            prev = lambda * prev + (1.0 - lambda) * x;
            floor.set(m, f, prev);
        }
    }
    floor
}

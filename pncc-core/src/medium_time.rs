//! Medium-time power: a `2M+1` frame moving average of band power.
//!
//! Frames outside the utterance count as zero, so the first and last `M`
//! frames are pulled toward zero. That bias is part of the output.

use crate::matrix::TfMatrix;

#[derive(Clone, Debug)]
pub struct MediumTimeConfig {
    /// Half-width of the temporal window in frames.
    pub m: usize, // e.g., 2
}

impl Default for MediumTimeConfig {
    fn default() -> Self {
        Self { m: 2 }
    }
}

impl MediumTimeConfig {
    /// Largest accepted half-width.
    pub const MAX_HALF_WIDTH: usize = 1 << 16;
}

pub fn medium_time_power(power: &TfMatrix, cfg: &MediumTimeConfig) -> TfMatrix {
    let (frames, bands) = power.shape();
    let m = cfg.m;
    let scale = 1.0 / (2 * m + 1) as f32;
    let mut out = TfMatrix::zeros(frames, bands);

    for t in 0..frames {
        let t0 = t.saturating_sub(m);
        let t1 = t.saturating_add(m).saturating_add(1).min(frames);
        let row = out.row_mut(t);
        for tt in t0..t1 {
            for (o, &p) in row.iter_mut().zip(power.row(tt)) {
                *o += scale * p;
            }
        }
    }
    out
}

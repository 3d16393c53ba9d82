//! Temporal masking and floor re-application.
//!
//! Each band keeps an online peak that decays by `λt` per frame:
//!
//! ```text
//! peak[m]   = max(λt·peak[m-1], r[m])
//! masked[m] = r[m]             if r[m] >= λt·peak[m-1]
//!           = μt·peak[m-1]     otherwise
//! ```
//!
//! with `peak[-1] = 0`, so `masked[0] = r[0]`. Onsets pass through while dips
//! right after a peak are held at a fraction of it. The masked signal is then
//! clamped from below by a floor tracked on the rectified signal.

use crate::error::PnccError;
use crate::matrix::TfMatrix;

#[derive(Clone, Debug)]
pub struct MaskingConfig {
    /// Per-frame decay of the online peak.
    pub lambda_t: f32, // e.g., 0.85
    /// Fraction of the previous peak emitted for masked frames.
    pub mu_t: f32, // e.g., 0.2
}

impl Default for MaskingConfig {
    fn default() -> Self {
        Self {
            lambda_t: 0.85,
            mu_t: 0.2,
        }
    }
}

pub fn temporal_masking(rectified: &TfMatrix, cfg: &MaskingConfig) -> TfMatrix {
    let (frames, bands) = rectified.shape();
    let mut out = TfMatrix::zeros(frames, bands);

    for f in 0..bands {
        let mut peak = 0.0f32;
        for m in 0..frames {
            let r = rectified.get(m, f);
            let decayed = cfg.lambda_t * peak;
            let masked = if r >= decayed { r } else { cfg.mu_t * peak };
            out.set(m, f, masked);
            peak = if decayed >= r { decayed } else { r };
        }
    }
    out
}

/// `max(masked, floor)` elementwise.
pub fn apply_floor(masked: &TfMatrix, floor: &TfMatrix) -> Result<TfMatrix, PnccError> {
    masked.zip_map(floor, "floor re-application", |s, fl| if s > fl { s } else { fl })
}

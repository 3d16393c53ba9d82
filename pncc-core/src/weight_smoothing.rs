//! Spectral weight smoothing across neighbouring bands.
//!
//! The gain of band `k` is `G[:,k] / max(Q[:,k], 1e-4)`. Band `l` receives the
//! neighbourhood sum over `k` in `[l1, l2)` with `l1 = max(l - N, 1)` and
//! `l2 = min(l + N, L)`, scaled by `1 / (l2 - l1 + 1)`.
//!
//! The neighbourhood never includes band 0 or band `l2`, while the divisor
//! still counts `l2`. Features depend on these exact bounds.

use crate::common::MIN_DENOMINATOR;
use crate::error::PnccError;
use crate::matrix::TfMatrix;

#[derive(Clone, Debug)]
pub struct WeightSmoothingConfig {
    /// Neighbourhood half-width in bands.
    pub n: usize, // e.g., 4
}

impl Default for WeightSmoothingConfig {
    fn default() -> Self {
        Self { n: 4 }
    }
}

/// Neighbourhood `[l1, l2)` and its normaliser for band `l` of `total` bands.
fn neighbourhood(l: usize, n: usize, total: usize) -> (usize, usize, f32) {
    let l1 = l.saturating_sub(n).max(1);
    let l2 = (l + n).min(total);
    let width = (l2 as isize - l1 as isize + 1).max(1) as f32;
    (l1, l2, 1.0 / width)
}

pub fn weight_smoothing(
    switched: &TfMatrix,
    medium_time: &TfMatrix,
    cfg: &WeightSmoothingConfig,
) -> Result<TfMatrix, PnccError> {
    let gain = switched.zip_map(medium_time, "weight smoothing", |g, q| {
        g / if q > MIN_DENOMINATOR { q } else { MIN_DENOMINATOR }
    })?;

    let (frames, bands) = gain.shape();
    let mut out = TfMatrix::zeros(frames, bands);
    for l in 0..bands {
        let (l1, l2, scale) = neighbourhood(l, cfg.n, bands);
        for t in 0..frames {
            let row = gain.row(t);
            let mut acc = 0.0f32;
            for &g in row.iter().take(l2).skip(l1) {
                acc += scale * g;
            }
            out.set(t, l, acc);
        }
    }
    Ok(out)
}

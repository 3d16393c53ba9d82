//! Excitation / non-excitation switch.
//!
//! A cell is excited (signal-dominant) when its medium-time power is at least
//! `c` times the lower envelope. Excited cells keep the masked signal; the rest
//! fall back to a floor estimate.

use crate::error::PnccError;
use crate::matrix::TfMatrix;

/// Which floor replaces non-excited cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ExcitationFallback {
    /// Floor tracked on medium-time power (the lower envelope).
    #[default]
    LowerEnvelope,
    /// Floor tracked on the rectified signal.
    RectifiedFloor,
}

#[derive(Clone, Debug)]
pub struct ExcitationConfig {
    /// Excitation threshold as a multiple of the lower envelope.
    pub c: f32, // e.g., 2.0
    pub fallback: ExcitationFallback,
}

impl Default for ExcitationConfig {
    fn default() -> Self {
        Self {
            c: 2.0,
            fallback: ExcitationFallback::LowerEnvelope,
        }
    }
}

/// `masked` where `medium_time >= c * lower_envelope`, else `fallback`.
pub fn switch_excitation(
    masked: &TfMatrix,
    fallback: &TfMatrix,
    lower_envelope: &TfMatrix,
    medium_time: &TfMatrix,
    c: f32,
) -> Result<TfMatrix, PnccError> {
    const STAGE: &str = "excitation switch";
    masked.ensure_same_shape(fallback, STAGE)?;
    masked.ensure_same_shape(lower_envelope, STAGE)?;
    masked.ensure_same_shape(medium_time, STAGE)?;

    let (frames, bands) = masked.shape();
    let mut out = TfMatrix::zeros(frames, bands);
    for t in 0..frames {
        for f in 0..bands {
            let v = if medium_time.get(t, f) >= c * lower_envelope.get(t, f) {
                masked.get(t, f)
            } else {
                fallback.get(t, f)
            };
            out.set(t, f, v);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(xs: &[f32]) -> TfMatrix {
        TfMatrix::from_rows(vec![xs.to_vec()]).unwrap()
    }

    #[test]
    fn selects_per_cell() {
        let masked = row(&[7.0, 7.0, 7.0]);
        let floor = row(&[1.0, 1.0, 1.0]);
        let env = row(&[1.0, 1.0, 1.0]);
        let q = row(&[2.0, 1.9, 5.0]);
        let out = switch_excitation(&masked, &floor, &env, &q, 2.0).unwrap();
        // at threshold counts as excited
        assert_eq!(out.row(0), &[7.0f32, 1.0, 7.0]);
    }

    #[test]
    fn zero_envelope_is_always_excited() {
        let masked = row(&[0.0, 3.0]);
        let floor = row(&[9.0, 9.0]);
        let env = row(&[0.0, 0.0]);
        let q = row(&[0.0, 0.0]);
        let out = switch_excitation(&masked, &floor, &env, &q, 2.0).unwrap();
        assert_eq!(out.row(0), &[0.0f32, 3.0]);
    }

    #[test]
    fn rejects_mismatched_inputs() {
        let a = TfMatrix::zeros(2, 3);
        let b = TfMatrix::zeros(2, 4);
        assert!(switch_excitation(&a, &a, &a, &b, 2.0).is_err());
    }
}

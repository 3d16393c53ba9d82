//! DCT-II cepstral compression of the power-law features.

use crate::error::PnccError;
use crate::matrix::TfMatrix;

/// DCT basis `[n_filters × n_input]`.
///
/// Row 0 is `1/sqrt(n_input)`; row `i` is
/// `sqrt(2/n_input) · cos(i · (2j+1) · π / (2·n_input))`.
pub fn dct_basis(n_filters: usize, n_input: usize) -> TfMatrix {
    let mut basis = TfMatrix::zeros(n_filters, n_input);
    if n_input == 0 {
        return basis;
    }
    let n = n_input as f64;
    let first = (1.0 / n.sqrt()) as f32;
    let scale = (2.0 / n).sqrt();
    for i in 0..n_filters {
        for j in 0..n_input {
            let v = if i == 0 {
                first
            } else {
                let angle = i as f64 * (2 * j + 1) as f64 * std::f64::consts::PI / (2.0 * n);
                (scale * angle.cos()) as f32
            };
            basis.set(i, j, v);
        }
    }
    basis
}

/// Cepstra `[frames × n_pncc]` from features `[frames × bands]`.
pub fn apply_dct(features: &TfMatrix, n_pncc: usize) -> Result<TfMatrix, PnccError> {
    let bands = features.bands();
    if n_pncc > bands {
        return Err(PnccError::InvalidArg(format!(
            "n_pncc ({n_pncc}) exceeds band count ({bands})"
        )));
    }
    let basis = dct_basis(n_pncc, bands);
    let mut out = TfMatrix::zeros(features.frames(), n_pncc);
    for (t, frame) in features.rows().enumerate() {
        for i in 0..n_pncc {
            let c: f32 = basis.row(i).iter().zip(frame).map(|(b, x)| b * x).sum();
            out.set(t, i, c);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basis_rows_are_orthonormal() {
        let b = dct_basis(8, 8);
        for i in 0..8 {
            for k in 0..8 {
                let dot: f32 = b.row(i).iter().zip(b.row(k)).map(|(x, y)| x * y).sum();
                let expect = if i == k { 1.0 } else { 0.0 };
                assert!((dot - expect).abs() < 1e-5, "rows {i},{k}: {dot}");
            }
        }
    }

    #[test]
    fn constant_frame_has_only_dc() {
        let x = TfMatrix::from_rows(vec![vec![1.0; 40]]).unwrap();
        let c = apply_dct(&x, 13).unwrap();
        assert_eq!(c.shape(), (1, 13));
        assert!((c.get(0, 0) - 40.0f32.sqrt()).abs() < 1e-4);
        for i in 1..13 {
            assert!(c.get(0, i).abs() < 1e-4);
        }
    }

    #[test]
    fn too_many_coefficients() {
        assert!(apply_dct(&TfMatrix::zeros(2, 10), 13).is_err());
    }
}

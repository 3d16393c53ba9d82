//! Power-law nonlinearity `x^(1/n)`.

use crate::error::PnccError;
use crate::matrix::TfMatrix;

#[derive(Clone, Debug)]
pub struct PowerLawConfig {
    /// Root applied to the normalized power.
    pub n: f32, // e.g., 15.0
}

impl Default for PowerLawConfig {
    fn default() -> Self {
        Self { n: 15.0 }
    }
}

/// Fails on negative or non-finite cells instead of emitting NaN.
pub fn power_law(normalized: &TfMatrix, cfg: &PowerLawConfig) -> Result<TfMatrix, PnccError> {
    if !(cfg.n.is_finite() && cfg.n > 0.0) {
        return Err(PnccError::InvalidArg(format!(
            "power-law root must be positive (got {})",
            cfg.n
        )));
    }
    for (frame, row) in normalized.rows().enumerate() {
        if let Some((band, &value)) = row
            .iter()
            .enumerate()
            .find(|(_, v)| !(v.is_finite() && **v >= 0.0))
        {
            return Err(PnccError::NegativePower { frame, band, value });
        }
    }
    let exponent = 1.0 / cfg.n;
    Ok(normalized.map(|x| x.powf(exponent)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifteenth_root() {
        let x = TfMatrix::from_rows(vec![vec![0.0, 1.0, 32768.0]]).unwrap();
        let y = power_law(&x, &PowerLawConfig::default()).unwrap();
        assert_eq!(y.get(0, 0), 0.0);
        assert!((y.get(0, 1) - 1.0).abs() < 1e-7);
        // 2^15 -> 2
        assert!((y.get(0, 2) - 2.0).abs() < 1e-5);
    }

    #[test]
    fn rejects_negative_input() {
        let x = TfMatrix::from_rows(vec![vec![1.0, 1.0], vec![1.0, -0.5]]).unwrap();
        let err = power_law(&x, &PowerLawConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            PnccError::NegativePower {
                frame: 1,
                band: 1,
                ..
            }
        ));
    }

    #[test]
    fn rejects_zero_root() {
        let x = TfMatrix::zeros(1, 1);
        assert!(power_law(&x, &PowerLawConfig { n: 0.0 }).is_err());
    }
}

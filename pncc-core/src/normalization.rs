//! Time-frequency normalization and mean power normalization.
//!
//! The smoothed weights are reapplied to the unsmoothed band power, then every
//! frame is divided by a running mean of the power across bands:
//!
//! ```text
//! μ[0] = 1e-4
//! μ[m] = λμ·μ[m-1] + (1-λμ)/L · Σ_{k=0}^{L-2} T[m,k]
//! out[m,:] = k · T[m,:] / μ[m]
//! ```
//!
//! The sum skips the last band; the division still covers every band.

use crate::common::RUNNING_MEAN_SEED;
use crate::error::PnccError;
use crate::matrix::TfMatrix;

#[derive(Clone, Debug)]
pub struct MeanPowerConfig {
    /// Forgetting factor of the running mean.
    pub lambda_mu: f64, // e.g., 0.999
    /// Output gain.
    pub k: f32, // e.g., 1.0
}

impl Default for MeanPowerConfig {
    fn default() -> Self {
        Self {
            lambda_mu: 0.999,
            k: 1.0,
        }
    }
}

/// `power * smoothed_weight`, elementwise.
pub fn time_frequency_normalization(
    power: &TfMatrix,
    smoothed_weight: &TfMatrix,
) -> Result<TfMatrix, PnccError> {
    power.zip_map(smoothed_weight, "time-frequency normalization", |p, w| p * w)
}

/// Running mean μ, one value per frame.
pub fn running_mean(transfer: &TfMatrix, lambda_mu: f64) -> Vec<f64> {
    let (frames, bands) = transfer.shape();
    let mut mu = Vec::with_capacity(frames);
    if frames == 0 {
        return mu;
    }
    mu.push(RUNNING_MEAN_SEED);

    let scale = (1.0 - lambda_mu) / bands as f64;
    let summed = bands.saturating_sub(1);
    for m in 1..frames {
        let total: f64 = transfer.row(m)[..summed].iter().map(|&v| f64::from(v)).sum();
        let prev = mu[m - 1];
        mu.push(lambda_mu * prev + scale * total);
    }
    mu
}

pub fn mean_power_normalization(
    transfer: &TfMatrix,
    switched: &TfMatrix,
    cfg: &MeanPowerConfig,
) -> Result<TfMatrix, PnccError> {
    transfer.ensure_same_shape(switched, "mean power normalization")?;

    let mu = running_mean(transfer, cfg.lambda_mu);
    let (frames, bands) = transfer.shape();
    let mut out = TfMatrix::zeros(frames, bands);
    for (m, &mu_m) in mu.iter().enumerate() {
        let gain = f64::from(cfg.k) / mu_m;
        for (o, &v) in out.row_mut(m).iter_mut().zip(transfer.row(m)) {
            *o = (f64::from(v) * gain) as f32;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reapplies_weights() {
        let p = TfMatrix::from_rows(vec![vec![2.0, 4.0]]).unwrap();
        let w = TfMatrix::from_rows(vec![vec![0.5, 0.25]]).unwrap();
        let t = time_frequency_normalization(&p, &w).unwrap();
        assert_eq!(t.row(0), &[1.0f32, 1.0]);
    }

    #[test]
    fn running_mean_skips_last_band() {
        let t = TfMatrix::from_rows(vec![vec![9.0, 9.0, 9.0], vec![1.0, 2.0, 100.0]]).unwrap();
        let mu = running_mean(&t, 0.999);
        assert_eq!(mu[0], 1e-4);
        let expect = 0.999 * 1e-4 + 0.001 / 3.0 * 3.0;
        assert!((mu[1] - expect).abs() < 1e-12);
    }

    #[test]
    fn first_frame_divides_by_seed() {
        let t = TfMatrix::from_rows(vec![vec![1e-4, 2e-4]]).unwrap();
        let out = mean_power_normalization(&t, &t, &MeanPowerConfig::default()).unwrap();
        assert!((out.get(0, 0) - 1.0).abs() < 1e-5);
        assert!((out.get(0, 1) - 2.0).abs() < 1e-5);
    }

    #[test]
    fn all_zero_stays_zero() {
        let z = TfMatrix::zeros(50, 40);
        let out = mean_power_normalization(&z, &z, &MeanPowerConfig::default()).unwrap();
        assert!(out.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn switched_matrix_only_checks_shape() {
        let t = TfMatrix::zeros(3, 4);
        assert!(mean_power_normalization(&t, &TfMatrix::zeros(3, 5), &Default::default()).is_err());
    }
}

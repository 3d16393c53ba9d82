//! End-to-end PNCC: waveform -> band power -> normalized, compressed features.
//!
//! Stage order:
//! 1) medium-time power `Q` from band power `P`
//! 2) lower envelope `E` tracked on `Q`
//! 3) rectified `R = max(Q - E, 0)`
//! 4) floor `F` tracked on `R`, temporal masking of `R`, clamped by `F`
//! 5) excitation switch on `Q >= c·E`
//! 6) spectral weight smoothing of `switched / Q`
//! 7) `P · weight`, mean power normalization, power-law
//! 8) optional DCT to `n_pncc` cepstra
//!
//! Every call owns its buffers; nothing is carried between utterances.

use log::{debug, trace, warn};

use crate::dct::apply_dct;
use crate::error::PnccError;
use crate::excitation::{ExcitationConfig, ExcitationFallback, switch_excitation};
use crate::floor::{FloorConfig, asymmetric_lowpass};
use crate::frontend::{FrontEndConfig, run_frontend_step};
use crate::masking::{MaskingConfig, apply_floor, temporal_masking};
use crate::matrix::TfMatrix;
use crate::medium_time::{MediumTimeConfig, medium_time_power};
use crate::nonlinearity::{PowerLawConfig, power_law};
use crate::normalization::{MeanPowerConfig, mean_power_normalization, time_frequency_normalization};
use crate::rectify::{RectifyConfig, subtract_and_rectify};
use crate::weight_smoothing::{WeightSmoothingConfig, weight_smoothing};

#[derive(Clone, Debug)]
pub struct PnccConfig {
    pub frontend: FrontEndConfig,
    /// Number of cepstral coefficients kept by the DCT.
    pub n_pncc: usize, // e.g., 13
    /// Apply the DCT and report cepstra alongside the features.
    pub dct: bool,
    pub medium_time: MediumTimeConfig,
    /// Floor tracked on medium-time power.
    pub lower_envelope: FloorConfig,
    pub rectify: RectifyConfig,
    /// Floor tracked on the rectified signal.
    pub rectified_floor: FloorConfig,
    pub masking: MaskingConfig,
    pub excitation: ExcitationConfig,
    pub weight_smoothing: WeightSmoothingConfig,
    pub mean_power: MeanPowerConfig,
    pub power_law: PowerLawConfig,
}

impl Default for PnccConfig {
    fn default() -> Self {
        Self {
            frontend: FrontEndConfig::default(),
            n_pncc: 13,
            dct: true,
            medium_time: MediumTimeConfig::default(),
            lower_envelope: FloorConfig::default(),
            rectify: RectifyConfig::default(),
            rectified_floor: FloorConfig::default(),
            masking: MaskingConfig::default(),
            excitation: ExcitationConfig::default(),
            weight_smoothing: WeightSmoothingConfig::default(),
            mean_power: MeanPowerConfig::default(),
            power_law: PowerLawConfig::default(),
        }
    }
}

impl PnccConfig {
    /// Checks everything except sample-rate dependent front-end settings.
    pub fn validate(&self) -> Result<(), PnccError> {
        if self.dct && self.n_pncc > self.frontend.n_mels {
            return Err(PnccError::InvalidArg(format!(
                "n_pncc ({}) must not exceed n_mels ({})",
                self.n_pncc, self.frontend.n_mels
            )));
        }
        if self.medium_time.m > MediumTimeConfig::MAX_HALF_WIDTH {
            return Err(PnccError::InvalidArg(format!(
                "medium_time.m must not exceed {} (got {})",
                MediumTimeConfig::MAX_HALF_WIDTH,
                self.medium_time.m
            )));
        }
        self.lower_envelope.validate("lower_envelope")?;
        self.rectified_floor.validate("rectified_floor")?;
        if !(0.0..=1.0).contains(&self.masking.lambda_t) {
            return Err(PnccError::InvalidArg(format!(
                "masking.lambda_t must be within [0,1] (got {})",
                self.masking.lambda_t
            )));
        }
        if !(0.0..=1.0).contains(&self.masking.mu_t) {
            return Err(PnccError::InvalidArg(format!(
                "masking.mu_t must be within [0,1] (got {})",
                self.masking.mu_t
            )));
        }
        if !(self.excitation.c.is_finite() && self.excitation.c >= 0.0) {
            return Err(PnccError::InvalidArg(format!(
                "excitation.c must be finite and non-negative (got {})",
                self.excitation.c
            )));
        }
        if !(0.0..=1.0).contains(&self.mean_power.lambda_mu) {
            return Err(PnccError::InvalidArg(format!(
                "mean_power.lambda_mu must be within [0,1] (got {})",
                self.mean_power.lambda_mu
            )));
        }
        if !(self.mean_power.k.is_finite() && self.mean_power.k >= 0.0) {
            return Err(PnccError::InvalidArg(format!(
                "mean_power.k must be finite and non-negative (got {})",
                self.mean_power.k
            )));
        }
        if !(self.power_law.n.is_finite() && self.power_law.n > 0.0) {
            return Err(PnccError::InvalidArg("power_law.n must be positive".into()));
        }
        Ok(())
    }
}

/// Which matrix a caller wants out of a [`PnccResult`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum OutputKind {
    /// Power-law features `[frames × n_mels]`.
    #[default]
    Features,
    /// DCT cepstra `[frames × n_pncc]`.
    Cepstra,
}

#[derive(Clone, Debug)]
pub struct PnccResult {
    /// Band power from the front end, `[frames × n_mels]`. `None` when the
    /// caller supplied the band power.
    pub power: Option<TfMatrix>,
    /// Power-law compressed features, `[frames × n_mels]`.
    pub features: TfMatrix,
    /// Cepstra, `[frames × n_pncc]`, when the DCT is enabled.
    pub cepstra: Option<TfMatrix>,
}

impl PnccResult {
    pub fn frames(&self) -> usize {
        self.features.frames()
    }

    pub fn output(&self, kind: OutputKind) -> Option<&TfMatrix> {
        match kind {
            OutputKind::Features => Some(&self.features),
            OutputKind::Cepstra => self.cepstra.as_ref(),
        }
    }
}

/// Every intermediate matrix of one run, in pipeline order.
#[derive(Clone, Debug)]
pub struct PnccStages {
    pub medium_time: TfMatrix,
    pub lower_envelope: TfMatrix,
    pub rectified: TfMatrix,
    pub rectified_floor: TfMatrix,
    pub masked: TfMatrix,
    pub switched: TfMatrix,
    pub smoothed_weight: TfMatrix,
    pub transfer: TfMatrix,
    pub normalized: TfMatrix,
    pub features: TfMatrix,
}

/// Waveform to features.
pub fn run_pncc(
    samples: &[f32],
    sample_rate: u32,
    cfg: &PnccConfig,
) -> Result<PnccResult, PnccError> {
    cfg.validate()?;
    let power = run_frontend_step(samples, sample_rate, &cfg.frontend)?;
    let mut result = finish(compute_stages(&power, cfg)?, cfg)?;
    result.power = Some(power);
    Ok(result)
}

/// Band power to features, for callers with their own front end.
pub fn run_pncc_on_power(power: &TfMatrix, cfg: &PnccConfig) -> Result<PnccResult, PnccError> {
    cfg.validate()?;
    finish(compute_stages(power, cfg)?, cfg)
}

pub fn run_pncc_stages(power: &TfMatrix, cfg: &PnccConfig) -> Result<PnccStages, PnccError> {
    cfg.validate()?;
    compute_stages(power, cfg)
}

fn finish(stages: PnccStages, cfg: &PnccConfig) -> Result<PnccResult, PnccError> {
    let cepstra = if cfg.dct {
        Some(apply_dct(&stages.features, cfg.n_pncc)?)
    } else {
        None
    };
    Ok(PnccResult {
        power: None,
        features: stages.features,
        cepstra,
    })
}

// Expects a validated config.
fn compute_stages(power: &TfMatrix, cfg: &PnccConfig) -> Result<PnccStages, PnccError> {
    if power.frames() == 0 {
        warn!("no frames to process");
    } else if power.as_slice().iter().all(|&v| v == 0.0) {
        warn!("band power is all zero; output will be all zero");
    }

    let medium_time = medium_time_power(power, &cfg.medium_time);
    log_stage("medium-time power", &medium_time);

    let lower_envelope = asymmetric_lowpass(&medium_time, &cfg.lower_envelope);
    log_stage("lower envelope", &lower_envelope);

    let rectified = subtract_and_rectify(&medium_time, &lower_envelope, &cfg.rectify)?;
    log_stage("rectified", &rectified);

    let rectified_floor = asymmetric_lowpass(&rectified, &cfg.rectified_floor);
    log_stage("rectified floor", &rectified_floor);

    let masked = apply_floor(&temporal_masking(&rectified, &cfg.masking), &rectified_floor)?;
    log_stage("temporal masking", &masked);

    let fallback = match cfg.excitation.fallback {
        ExcitationFallback::LowerEnvelope => &lower_envelope,
        ExcitationFallback::RectifiedFloor => &rectified_floor,
    };
    let switched = switch_excitation(
        &masked,
        fallback,
        &lower_envelope,
        &medium_time,
        cfg.excitation.c,
    )?;
    log_stage("excitation switch", &switched);

    let smoothed_weight = weight_smoothing(&switched, &medium_time, &cfg.weight_smoothing)?;
    log_stage("weight smoothing", &smoothed_weight);

    let transfer = time_frequency_normalization(power, &smoothed_weight)?;
    log_stage("time-frequency normalization", &transfer);

    let normalized = mean_power_normalization(&transfer, &switched, &cfg.mean_power)?;
    log_stage("mean power normalization", &normalized);

    let features = power_law(&normalized, &cfg.power_law)?;
    log_stage("power-law", &features);

    Ok(PnccStages {
        medium_time,
        lower_envelope,
        rectified,
        rectified_floor,
        masked,
        switched,
        smoothed_weight,
        transfer,
        normalized,
        features,
    })
}

fn log_stage(name: &str, m: &TfMatrix) {
    debug!("{name}: {} x {}", m.frames(), m.bands());
    if let Some((lo, hi)) = m.min_max() {
        trace!("{name}: min {lo:.6e}, max {hi:.6e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp_power(frames: usize, bands: usize) -> TfMatrix {
        let rows = (0..frames)
            .map(|t| {
                (0..bands)
                    .map(|f| 1.0 + ((t * 7 + f * 3) % 11) as f32)
                    .collect()
            })
            .collect();
        TfMatrix::from_rows(rows).unwrap()
    }

    #[test]
    fn every_stage_preserves_shape() {
        let p = ramp_power(30, 40);
        let s = run_pncc_stages(&p, &PnccConfig::default()).unwrap();
        for m in [
            &s.medium_time,
            &s.lower_envelope,
            &s.rectified,
            &s.rectified_floor,
            &s.masked,
            &s.switched,
            &s.smoothed_weight,
            &s.transfer,
            &s.normalized,
            &s.features,
        ] {
            assert_eq!(m.shape(), (30, 40));
        }
    }

    #[test]
    fn rectified_and_switched_are_nonnegative() {
        let s = run_pncc_stages(&ramp_power(25, 40), &PnccConfig::default()).unwrap();
        assert!(s.rectified.as_slice().iter().all(|&v| v >= 0.0));
        assert!(s.switched.as_slice().iter().all(|&v| v >= 0.0));
    }

    #[test]
    fn lower_envelope_seed() {
        let p = ramp_power(10, 40);
        let s = run_pncc_stages(&p, &PnccConfig::default()).unwrap();
        for f in 0..40 {
            assert_eq!(
                s.lower_envelope.get(0, f),
                0.9f32 * s.medium_time.get(0, f)
            );
        }
    }

    #[test]
    fn cepstra_follow_dct_flag() {
        let p = ramp_power(12, 40);
        let with = run_pncc_on_power(&p, &PnccConfig::default()).unwrap();
        assert_eq!(with.output(OutputKind::Cepstra).unwrap().shape(), (12, 13));
        assert_eq!(with.output(OutputKind::Features).unwrap().shape(), (12, 40));

        let cfg = PnccConfig {
            dct: false,
            ..Default::default()
        };
        let without = run_pncc_on_power(&p, &cfg).unwrap();
        assert!(without.output(OutputKind::Cepstra).is_none());
        assert_eq!(with.features, without.features);
    }

    #[test]
    fn fallback_choice_only_touches_unexcited_cells() {
        let p = ramp_power(40, 40);
        let a = run_pncc_stages(&p, &PnccConfig::default()).unwrap();
        let mut cfg = PnccConfig::default();
        cfg.excitation.fallback = ExcitationFallback::RectifiedFloor;
        let b = run_pncc_stages(&p, &cfg).unwrap();
        for t in 0..40 {
            for f in 0..40 {
                let excited = a.medium_time.get(t, f) >= 2.0 * a.lower_envelope.get(t, f);
                if excited {
                    assert_eq!(a.switched.get(t, f), b.switched.get(t, f));
                } else {
                    assert_eq!(a.switched.get(t, f), a.lower_envelope.get(t, f));
                    assert_eq!(b.switched.get(t, f), b.rectified_floor.get(t, f));
                }
            }
        }
    }

    #[test]
    fn rejects_too_many_cepstra() {
        let cfg = PnccConfig {
            n_pncc: 41,
            ..Default::default()
        };
        assert!(matches!(
            run_pncc_on_power(&ramp_power(3, 40), &cfg),
            Err(PnccError::InvalidArg(_))
        ));
    }

    #[test]
    fn rejects_out_of_range_knobs_up_front() {
        let p = ramp_power(3, 40);
        let mut cfg = PnccConfig::default();
        cfg.mean_power.k = -1.0;
        assert!(matches!(run_pncc_on_power(&p, &cfg), Err(PnccError::InvalidArg(_))));

        let mut cfg = PnccConfig::default();
        cfg.mean_power.k = f32::NAN;
        assert!(matches!(cfg.validate(), Err(PnccError::InvalidArg(_))));

        let mut cfg = PnccConfig::default();
        cfg.masking.mu_t = 1.5;
        assert!(matches!(run_pncc_stages(&p, &cfg), Err(PnccError::InvalidArg(_))));

        let mut cfg = PnccConfig::default();
        cfg.excitation.c = f32::INFINITY;
        assert!(matches!(cfg.validate(), Err(PnccError::InvalidArg(_))));

        let mut cfg = PnccConfig::default();
        cfg.medium_time.m = usize::MAX;
        assert!(matches!(run_pncc_on_power(&p, &cfg), Err(PnccError::InvalidArg(_))));
    }

    #[test]
    fn caller_power_is_not_copied_into_result() {
        let out = run_pncc_on_power(&ramp_power(4, 40), &PnccConfig::default()).unwrap();
        assert!(out.power.is_none());
    }

    #[test]
    fn zero_frames_is_well_defined() {
        let out = run_pncc_on_power(&TfMatrix::zeros(0, 40), &PnccConfig::default()).unwrap();
        assert_eq!(out.features.shape(), (0, 40));
        assert_eq!(out.cepstra.unwrap().shape(), (0, 13));
    }
}

//! Spectral front end: pre-emphasis, STFT power, mel band power.
//!
//! - Pre-emphasis FIR `[1, -0.97]` with zero initial state.
//! - Centred STFT (reflect padding by `n_fft/2`), periodic analysis window,
//!   hop `n_fft/4` unless overridden.
//! - Slaney-scale triangular mel filterbank with area normalisation.
//! - Band power `P = |STFT|^power · |mel|^power`, shape `[frames × n_mels]`.
//!
//! Feed it mono f32 samples and the sample rate.

use std::str::FromStr;

use log::{debug, warn};
use realfft::{RealFftPlanner, num_complex::Complex32};

use crate::common::{hz_to_mel, mel_to_hz};
use crate::error::PnccError;
use crate::matrix::TfMatrix;

/// Analysis window applied to each STFT frame (periodic form).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Window {
    #[default]
    Hamming,
    Hann,
    Rectangular,
}

impl Window {
    pub fn coefficients(self, n: usize) -> Vec<f32> {
        let two_pi = 2.0 * std::f32::consts::PI;
        (0..n)
            .map(|i| {
                let phase = two_pi * i as f32 / n as f32;
                match self {
                    Window::Hamming => 0.54 - 0.46 * phase.cos(),
                    Window::Hann => 0.5 - 0.5 * phase.cos(),
                    Window::Rectangular => 1.0,
                }
            })
            .collect()
    }
}

impl FromStr for Window {
    type Err = PnccError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hamming" => Ok(Window::Hamming),
            "hann" | "hanning" => Ok(Window::Hann),
            "rectangular" | "boxcar" | "ones" => Ok(Window::Rectangular),
            other => Err(PnccError::InvalidArg(format!("unknown window `{other}`"))),
        }
    }
}

#[derive(Clone, Debug)]
pub struct FrontEndConfig {
    /// FFT size in samples; also the analysis window length.
    pub n_fft: usize, // e.g., 1024
    /// Hop size in samples; if 0, computed as n_fft/4.
    pub hop_length: usize,
    pub window: Window,
    /// Number of mel bands.
    pub n_mels: usize, // e.g., 40
    /// Lowest filterbank edge (Hz).
    pub fmin: f32,
    /// Highest filterbank edge (Hz); Nyquist if None.
    pub fmax: Option<f32>,
    /// Exponent applied to STFT magnitudes and to the mel weights.
    pub power: f32, // e.g., 2.0
    /// Pre-emphasis coefficient; 0 disables the filter.
    pub pre_emphasis: f32, // e.g., 0.97
}

impl Default for FrontEndConfig {
    fn default() -> Self {
        Self {
            n_fft: 1024,
            hop_length: 0, // interpret as n_fft/4
            window: Window::Hamming,
            n_mels: 40,
            fmin: 0.0,
            fmax: None,
            power: 2.0,
            pre_emphasis: 0.97,
        }
    }
}

impl FrontEndConfig {
    pub fn hop(&self) -> usize {
        if self.hop_length == 0 {
            (self.n_fft / 4).max(1)
        } else {
            self.hop_length
        }
    }

    pub fn validate(&self, sample_rate: u32) -> Result<(), PnccError> {
        if sample_rate == 0 {
            return Err(PnccError::InvalidArg("sample_rate must be > 0".into()));
        }
        if self.n_fft < 2 {
            return Err(PnccError::InvalidArg("n_fft must be >= 2".into()));
        }
        if self.n_mels == 0 {
            return Err(PnccError::InvalidArg("n_mels must be > 0".into()));
        }
        if !(self.power.is_finite() && self.power > 0.0) {
            return Err(PnccError::InvalidArg("power must be positive".into()));
        }
        let nyquist = sample_rate as f32 / 2.0;
        let fmax = self.fmax.unwrap_or(nyquist);
        if !(self.fmin >= 0.0 && self.fmin < fmax && fmax <= nyquist) {
            return Err(PnccError::InvalidArg(format!(
                "mel range must satisfy 0 <= fmin < fmax <= {nyquist} Hz (got {}..{fmax})",
                self.fmin
            )));
        }
        Ok(())
    }
}

/// Band power matrix `[frames × n_mels]` for mono `samples`.
pub fn run_frontend_step(
    samples: &[f32],
    sample_rate: u32,
    cfg: &FrontEndConfig,
) -> Result<TfMatrix, PnccError> {
    cfg.validate(sample_rate)?;

    let emphasized = pre_emphasis(samples, cfg.pre_emphasis);
    let spec = stft_power(&emphasized, cfg)?;
    let mut mel = mel_filterbank(
        sample_rate,
        cfg.n_fft,
        cfg.n_mels,
        cfg.fmin,
        cfg.fmax.unwrap_or(sample_rate as f32 / 2.0),
    );
    if cfg.power != 1.0 {
        mel = mel.map(|w| w.abs().powf(cfg.power));
    }

    let power = project_onto_bands(&spec, &mel)?;
    debug!(
        "front end: {} samples -> {} frames x {} bands",
        samples.len(),
        power.frames(),
        power.bands()
    );
    Ok(power)
}

/// First-order FIR `y[n] = x[n] - coeff * x[n-1]`, `x[-1] = 0`.
pub fn pre_emphasis(samples: &[f32], coeff: f32) -> Vec<f32> {
    let mut prev = 0.0f32;
    samples
        .iter()
        .map(|&x| {
            let y = x - coeff * prev;
            prev = x;
            y
        })
        .collect()
}

/// STFT power spectrogram `[frames × (n_fft/2 + 1)]`.
pub fn stft_power(samples: &[f32], cfg: &FrontEndConfig) -> Result<TfMatrix, PnccError> {
    let n = cfg.n_fft;
    let hop = cfg.hop();
    let n_bins = n / 2 + 1;

    if samples.is_empty() {
        warn!("empty signal; producing zero frames");
        return Ok(TfMatrix::zeros(0, n_bins));
    }

    let padded = center_pad(samples, n / 2);
    let n_frames = 1 + (padded.len() - n) / hop;
    let window = cfg.window.coefficients(n);

    let mut planner = RealFftPlanner::<f32>::new();
    let r2c = planner.plan_fft_forward(n);
    let mut in_buf = r2c.make_input_vec();
    let mut spec_buf = r2c.make_output_vec();

    let mut out = TfMatrix::zeros(n_frames, n_bins);
    for t in 0..n_frames {
        let start = t * hop;
        for (j, x) in in_buf.iter_mut().enumerate() {
            *x = padded[start + j] * window[j];
        }
        r2c.process(&mut in_buf, &mut spec_buf)
            .map_err(|e| PnccError::Fft(e.to_string()))?;

        let row = out.row_mut(t);
        for (k, out_k) in row.iter_mut().enumerate() {
            let Complex32 { re, im } = spec_buf[k];
            let p = re * re + im * im;
            *out_k = if cfg.power == 2.0 {
                p
            } else {
                p.sqrt().powf(cfg.power)
            };
        }
    }
    Ok(out)
}

/// Pad `half` samples on both sides: reflect when the signal is long enough,
/// zeros otherwise.
fn center_pad(samples: &[f32], half: usize) -> Vec<f32> {
    let len = samples.len();
    let mut out = Vec::with_capacity(len + 2 * half);
    if len > half {
        out.extend((1..=half).rev().map(|i| samples[i]));
        out.extend_from_slice(samples);
        out.extend((0..half).map(|i| samples[len - 2 - i]));
    } else {
        warn!("signal of {len} samples is too short to reflect-pad by {half}; zero padding");
        out.resize(half, 0.0);
        out.extend_from_slice(samples);
        out.resize(len + 2 * half, 0.0);
    }
    out
}

/// Triangular Slaney-normalised mel filterbank `[n_mels × (n_fft/2 + 1)]`.
pub fn mel_filterbank(
    sample_rate: u32,
    n_fft: usize,
    n_mels: usize,
    fmin: f32,
    fmax: f32,
) -> TfMatrix {
    let n_bins = n_fft / 2 + 1;
    let sr = sample_rate as f32;
    let fft_freqs: Vec<f32> = (0..n_bins).map(|k| k as f32 * sr / n_fft as f32).collect();

    let mel_min = hz_to_mel(fmin);
    let mel_max = hz_to_mel(fmax);
    let mel_f: Vec<f32> = (0..n_mels + 2)
        .map(|i| mel_to_hz(mel_min + (mel_max - mel_min) * i as f32 / (n_mels + 1) as f32))
        .collect();

    let mut weights = TfMatrix::zeros(n_mels, n_bins);
    for m in 0..n_mels {
        let lower_w = mel_f[m + 1] - mel_f[m];
        let upper_w = mel_f[m + 2] - mel_f[m + 1];
        let enorm = 2.0 / (mel_f[m + 2] - mel_f[m]);
        for (k, &f) in fft_freqs.iter().enumerate() {
            let lower = (f - mel_f[m]) / lower_w;
            let upper = (mel_f[m + 2] - f) / upper_w;
            weights.set(m, k, lower.min(upper).max(0.0) * enorm);
        }
    }
    weights
}

/// `spec [frames × bins] · filtersᵀ [bins × bands]`.
fn project_onto_bands(spec: &TfMatrix, filters: &TfMatrix) -> Result<TfMatrix, PnccError> {
    if spec.bands() != filters.bands() {
        return Err(PnccError::ShapeMismatch {
            stage: "mel projection",
            expected: (spec.frames(), filters.bands()),
            got: spec.shape(),
        });
    }
    let mut out = TfMatrix::zeros(spec.frames(), filters.frames());
    for t in 0..spec.frames() {
        let frame = spec.row(t);
        for m in 0..filters.frames() {
            let sum: f32 = frame
                .iter()
                .zip(filters.row(m))
                .map(|(s, w)| s * w)
                .sum();
            out.set(t, m, sum);
        }
    }
    Ok(out)
}

// --------------------------- Tests -----------------------------

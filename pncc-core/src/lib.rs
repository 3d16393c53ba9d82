//! Power-Normalized Cepstral Coefficients (PNCC).
//!
//! Noise-robust spectral features for speech and audio. The pipeline smooths
//! mel band power over time, tracks and subtracts a noise floor, applies
//! temporal masking, reweights the original power with the resulting gains,
//! normalizes by a running mean power and compresses with a power law.
//!
//! Entry points:
//! - [`run_pncc`] from mono samples
//! - [`run_pncc_on_power`] from a `[frames × bands]` power matrix
//! - [`input::decode_file`] to load audio

pub mod common;
pub mod dct;
pub mod error;
pub mod excitation;
pub mod floor;
pub mod frontend;
pub mod input;
pub mod masking;
pub mod matrix;
pub mod medium_time;
pub mod nonlinearity;
pub mod normalization;
pub mod pipeline;
pub mod rectify;
pub mod weight_smoothing;

pub use error::PnccError;
pub use matrix::TfMatrix;
pub use pipeline::{
    OutputKind, PnccConfig, PnccResult, PnccStages, run_pncc, run_pncc_on_power, run_pncc_stages,
};

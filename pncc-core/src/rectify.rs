//! Half-wave rectification of `medium-time power - lower envelope`.

use crate::error::PnccError;
use crate::matrix::TfMatrix;

#[derive(Clone, Debug, Default)]
pub struct RectifyConfig {
    /// Values below this are zeroed.
    pub threshold: f32, // e.g., 0.0
}

/// `x` where `x >= threshold`, else 0.
pub fn halfwave_rectify(signal: &TfMatrix, cfg: &RectifyConfig) -> TfMatrix {
    let th = cfg.threshold;
    signal.map(|x| if x < th { 0.0 } else { x })
}

/// Rectified `medium_time - lower_envelope`.
pub fn subtract_and_rectify(
    medium_time: &TfMatrix,
    lower_envelope: &TfMatrix,
    cfg: &RectifyConfig,
) -> Result<TfMatrix, PnccError> {
    let diff = medium_time.zip_map(lower_envelope, "envelope subtraction", |q, e| q - e)?;
    Ok(halfwave_rectify(&diff, cfg))
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PnccError {
    #[error("shape-mismatch in {stage}: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        stage: &'static str,
        expected: (usize, usize),
        got: (usize, usize),
    },
    #[error("ragged rows: row {row} has {got} bands, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        got: usize,
    },
    #[error("invalid-arg: {0}")]
    InvalidArg(String),
    #[error("negative power {value} at frame {frame}, band {band}")]
    NegativePower { frame: usize, band: usize, value: f32 },
    #[error("FFT error: {0}")]
    Fft(String),
}

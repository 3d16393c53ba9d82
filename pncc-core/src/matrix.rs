//! Dense time-by-frequency matrix shared by every pipeline stage.
//!
//! Storage is row-major: one row per frame, one column per band. Stages read
//! their inputs through shared references and always return a freshly
//! allocated matrix.

use crate::error::PnccError;

#[derive(Clone, Debug, PartialEq)]
pub struct TfMatrix {
    frames: usize,
    bands: usize,
    data: Vec<f32>,
}

impl TfMatrix {
    pub fn zeros(frames: usize, bands: usize) -> Self {
        Self {
            frames,
            bands,
            data: vec![0.0; frames * bands],
        }
    }

    /// Build from `[frames][bands]` rows; every row must have the same length.
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self, PnccError> {
        let frames = rows.len();
        let bands = rows.first().map(Vec::len).unwrap_or(0);
        let mut data = Vec::with_capacity(frames * bands);
        for (row, r) in rows.into_iter().enumerate() {
            if r.len() != bands {
                return Err(PnccError::RaggedRows {
                    row,
                    expected: bands,
                    got: r.len(),
                });
            }
            data.extend(r);
        }
        Ok(Self { frames, bands, data })
    }

    /// Wrap a flat row-major buffer.
    pub fn from_vec(frames: usize, bands: usize, data: Vec<f32>) -> Result<Self, PnccError> {
        if data.len() != frames * bands {
            return Err(PnccError::InvalidArg(format!(
                "buffer of {} values cannot hold {frames}x{bands}",
                data.len()
            )));
        }
        Ok(Self { frames, bands, data })
    }

    #[inline]
    pub fn frames(&self) -> usize {
        self.frames
    }

    #[inline]
    pub fn bands(&self) -> usize {
        self.bands
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.frames, self.bands)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn get(&self, frame: usize, band: usize) -> f32 {
        self.data[frame * self.bands + band]
    }

    #[inline]
    pub fn set(&mut self, frame: usize, band: usize, v: f32) {
        self.data[frame * self.bands + band] = v;
    }

    pub fn row(&self, frame: usize) -> &[f32] {
        &self.data[frame * self.bands..(frame + 1) * self.bands]
    }

    pub fn row_mut(&mut self, frame: usize) -> &mut [f32] {
        &mut self.data[frame * self.bands..(frame + 1) * self.bands]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        // chunks_exact(0) panics, and a zero-band matrix has no values anyway.
        self.data.chunks_exact(self.bands.max(1)).take(self.frames)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn to_rows(&self) -> Vec<Vec<f32>> {
        self.rows().map(<[f32]>::to_vec).collect()
    }

    /// Elementwise map into a new matrix of the same shape.
    pub fn map(&self, f: impl Fn(f32) -> f32) -> Self {
        Self {
            frames: self.frames,
            bands: self.bands,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }

    /// Elementwise combination of two equally shaped matrices.
    pub fn zip_map(
        &self,
        other: &Self,
        stage: &'static str,
        f: impl Fn(f32, f32) -> f32,
    ) -> Result<Self, PnccError> {
        self.ensure_same_shape(other, stage)?;
        Ok(Self {
            frames: self.frames,
            bands: self.bands,
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(&a, &b)| f(a, b))
                .collect(),
        })
    }

    pub fn ensure_same_shape(&self, other: &Self, stage: &'static str) -> Result<(), PnccError> {
        if self.shape() != other.shape() {
            return Err(PnccError::ShapeMismatch {
                stage,
                expected: self.shape(),
                got: other.shape(),
            });
        }
        Ok(())
    }

    pub fn transpose(&self) -> Self {
        let mut out = Self::zeros(self.bands, self.frames);
        for t in 0..self.frames {
            for f in 0..self.bands {
                out.set(f, t, self.get(t, f));
            }
        }
        out
    }

    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }

    /// (min, max) over all cells, `None` for an empty matrix.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        if self.data.is_empty() {
            return None;
        }
        Some(self.data.iter().fold(
            (f32::INFINITY, f32::NEG_INFINITY),
            |(lo, hi), &v| (lo.min(v), hi.max(v)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rows_rejects_ragged() {
        let err = TfMatrix::from_rows(vec![vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(matches!(
            err,
            PnccError::RaggedRows {
                row: 1,
                expected: 2,
                got: 1
            }
        ));
    }

    #[test]
    fn row_major_layout() {
        let m = TfMatrix::from_rows(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        assert_eq!(m.shape(), (2, 3));
        assert_eq!(m.get(1, 0), 4.0);
        assert_eq!(m.row(0), &[1.0, 2.0, 3.0]);
        let t = m.transpose();
        assert_eq!(t.shape(), (3, 2));
        assert_eq!(t.row(2), &[3.0, 6.0]);
    }

    #[test]
    fn zip_map_checks_shape() {
        let a = TfMatrix::zeros(2, 3);
        let b = TfMatrix::zeros(3, 2);
        let err = a.zip_map(&b, "test", |x, y| x + y).unwrap_err();
        assert!(matches!(err, PnccError::ShapeMismatch { stage: "test", .. }));
    }

    #[test]
    fn zero_band_matrix_has_no_rows_to_panic_on() {
        let m = TfMatrix::zeros(3, 0);
        assert_eq!(m.rows().count(), 0);
        assert!(m.min_max().is_none());
    }
}

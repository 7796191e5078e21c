use crate::dtype::Float;
use crate::error::{ClassifyError, ClassifyResult};
use crate::shape::Shape;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Dense row-major tensor. The classifiers use it as a 1-D vector or a
/// 2-D matrix (rows = samples or classes, columns = features).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "T: Float")]
pub struct Tensor<T: Float> {
    data: Vec<T>,
    shape: Shape,
}

// ─── Construction ───────────────────────────────────────────────────────────

impl<T: Float> Tensor<T> {
    /// Create a tensor from raw data and shape.
    pub fn new(data: Vec<T>, shape: Vec<usize>) -> ClassifyResult<Self> {
        let s = Shape::new(shape);
        if data.len() != s.numel() {
            return Err(ClassifyError::ShapeMismatch {
                expected: s.to_vec(),
                got: vec![data.len()],
            });
        }
        Ok(Tensor { data, shape: s })
    }

    /// Create a tensor filled with zeros.
    pub fn zeros(shape: Vec<usize>) -> Self {
        let s = Shape::new(shape);
        Tensor {
            data: vec![T::ZERO; s.numel()],
            shape: s,
        }
    }

    /// Create a 2-D tensor from nested rows.
    pub fn from_vec2d(data: &[Vec<T>]) -> ClassifyResult<Self> {
        if data.is_empty() {
            return Ok(Tensor::zeros(vec![0, 0]));
        }
        let rows = data.len();
        let cols = data[0].len();
        if let Some(bad) = data.iter().find(|r| r.len() != cols) {
            return Err(ClassifyError::ShapeMismatch {
                expected: vec![cols],
                got: vec![bad.len()],
            });
        }
        let flat: Vec<T> = data.iter().flat_map(|r| r.iter().copied()).collect();
        Tensor::new(flat, vec![rows, cols])
    }

    /// Identity matrix of size n×n.
    pub fn eye(n: usize) -> Self {
        let mut data = vec![T::ZERO; n * n];
        for i in 0..n {
            data[i * n + i] = T::ONE;
        }
        Tensor {
            data,
            shape: Shape::new(vec![n, n]),
        }
    }

    // ─── Accessors ──────────────────────────────────────────────────────────

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn shape_vec(&self) -> Vec<usize> {
        self.shape.to_vec()
    }

    pub fn ndim(&self) -> usize {
        self.shape.ndim()
    }

    pub fn numel(&self) -> usize {
        self.data.len()
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// `(rows, cols)` of a 2-D tensor.
    pub fn matrix_dims(&self) -> ClassifyResult<(usize, usize)> {
        if self.ndim() != 2 {
            return Err(ClassifyError::InvalidAxis {
                axis: 1,
                ndim: self.ndim(),
            });
        }
        Ok((self.shape.dim(0)?, self.shape.dim(1)?))
    }

    fn offset(&self, indices: &[usize]) -> ClassifyResult<usize> {
        if indices.len() != self.ndim() {
            return Err(ClassifyError::ShapeMismatch {
                expected: vec![self.ndim()],
                got: vec![indices.len()],
            });
        }
        let mut offset = 0;
        for (axis, &idx) in indices.iter().enumerate() {
            let size = self.shape.dim(axis)?;
            if idx >= size {
                return Err(ClassifyError::IndexOutOfBounds {
                    index: idx,
                    axis,
                    size,
                });
            }
            offset = offset * size + idx;
        }
        Ok(offset)
    }

    /// Multi-dimensional indexing.
    pub fn get(&self, indices: &[usize]) -> ClassifyResult<T> {
        Ok(self.data[self.offset(indices)?])
    }

    /// Set a single element.
    pub fn set(&mut self, indices: &[usize], value: T) -> ClassifyResult<()> {
        let offset = self.offset(indices)?;
        self.data[offset] = value;
        Ok(())
    }

    /// Borrow row `i` of a 2-D tensor.
    pub fn row(&self, i: usize) -> ClassifyResult<&[T]> {
        let (rows, cols) = self.matrix_dims()?;
        if i >= rows {
            return Err(ClassifyError::IndexOutOfBounds {
                index: i,
                axis: 0,
                size: rows,
            });
        }
        Ok(&self.data[i * cols..(i + 1) * cols])
    }

    /// Iterate over the rows of a 2-D tensor.
    pub fn rows(&self) -> ClassifyResult<impl Iterator<Item = &[T]> + '_> {
        let (_, cols) = self.matrix_dims()?;
        // chunks_exact panics on a zero chunk; a zero-column matrix has no data anyway.
        Ok(self.data.chunks_exact(cols.max(1)))
    }

    // ─── Row / column selection ─────────────────────────────────────────────

    /// New matrix holding the given rows, in the given order.
    pub fn select_rows(&self, indices: &[usize]) -> ClassifyResult<Tensor<T>> {
        let (_, cols) = self.matrix_dims()?;
        let mut data = Vec::with_capacity(indices.len() * cols);
        for &i in indices {
            data.extend_from_slice(self.row(i)?);
        }
        Tensor::new(data, vec![indices.len(), cols])
    }

    /// New matrix holding the given columns, in the given order.
    pub fn select_cols(&self, indices: &[usize]) -> ClassifyResult<Tensor<T>> {
        let (rows, cols) = self.matrix_dims()?;
        if let Some(&bad) = indices.iter().find(|&&j| j >= cols) {
            return Err(ClassifyError::IndexOutOfBounds {
                index: bad,
                axis: 1,
                size: cols,
            });
        }
        let mut data = Vec::with_capacity(rows * indices.len());
        for r in self.rows()? {
            data.extend(indices.iter().map(|&j| r[j]));
        }
        Tensor::new(data, vec![rows, indices.len()])
    }

    // ─── Linear algebra helpers ─────────────────────────────────────────────

    /// Matrix-vector product `self · x` for a 2-D tensor.
    pub fn matvec(&self, x: &[T]) -> ClassifyResult<Vec<T>> {
        let (_, cols) = self.matrix_dims()?;
        if x.len() != cols {
            return Err(ClassifyError::ShapeMismatch {
                expected: vec![cols],
                got: vec![x.len()],
            });
        }
        Ok(self
            .rows()?
            .map(|w| w.iter().zip(x).map(|(&a, &b)| a * b).sum())
            .collect())
    }

    /// In-place `self += alpha * other`.
    pub fn axpy(&mut self, alpha: T, other: &Tensor<T>) -> ClassifyResult<()> {
        if self.shape != other.shape {
            return Err(ClassifyError::ShapeMismatch {
                expected: self.shape_vec(),
                got: other.shape_vec(),
            });
        }
        for (a, &b) in self.data.iter_mut().zip(other.data.iter()) {
            *a += alpha * b;
        }
        Ok(())
    }

    /// Per-column maximum of a 2-D tensor.
    pub fn max_cols(&self) -> ClassifyResult<Vec<T>> {
        let (rows, cols) = self.matrix_dims()?;
        if rows == 0 {
            return Err(ClassifyError::EmptyInput("max_cols of an empty matrix"));
        }
        let mut out = vec![T::NEG_INFINITY; cols];
        for r in self.rows()? {
            for (m, &v) in out.iter_mut().zip(r) {
                *m = m.max(v);
            }
        }
        Ok(out)
    }

    /// Column means of a 2-D tensor.
    pub fn mean_cols(&self) -> ClassifyResult<Vec<T>> {
        let (rows, cols) = self.matrix_dims()?;
        if rows == 0 {
            return Err(ClassifyError::EmptyInput("mean_cols of an empty matrix"));
        }
        let mut out = vec![T::ZERO; cols];
        for r in self.rows()? {
            for (m, &v) in out.iter_mut().zip(r) {
                *m += v;
            }
        }
        let n = T::from_usize(rows);
        out.iter_mut().for_each(|m| *m /= n);
        Ok(out)
    }

    pub fn is_all_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }
}

impl<T: Float> PartialEq for Tensor<T> {
    fn eq(&self, other: &Self) -> bool {
        self.shape == other.shape && self.data == other.data
    }
}

// ─── Display ────────────────────────────────────────────────────────────────

impl<T: Float> fmt::Display for Tensor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.matrix_dims() {
            Ok((rows, cols)) => {
                writeln!(f, "tensor([")?;
                for i in 0..rows.min(8) {
                    write!(f, "  [")?;
                    for j in 0..cols.min(8) {
                        if j > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{:.4}", self.data[i * cols + j])?;
                    }
                    if cols > 8 {
                        write!(f, ", ...")?;
                    }
                    writeln!(f, "],")?;
                }
                if rows > 8 {
                    writeln!(f, "  ...")?;
                }
                write!(f, "], shape={})", self.shape)
            }
            Err(_) => write!(f, "tensor(shape={}, numel={})", self.shape, self.numel()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creation() {
        let t: Tensor<f64> = Tensor::zeros(vec![3, 4]);
        assert_eq!(t.shape_vec(), vec![3, 4]);
        assert_eq!(t.numel(), 12);
        assert!(Tensor::<f64>::new(vec![1.0, 2.0, 3.0], vec![2, 2]).is_err());
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let r = Tensor::<f64>::from_vec2d(&[vec![1.0, 2.0], vec![3.0]]);
        assert!(matches!(r, Err(ClassifyError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_indexing_and_rows() {
        let mut t: Tensor<f64> =
            Tensor::from_vec2d(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        assert_eq!(t.get(&[1, 2]).unwrap(), 6.0);
        t.set(&[0, 1], 9.0).unwrap();
        assert_eq!(t.row(0).unwrap(), &[1.0, 9.0, 3.0]);
        assert!(t.get(&[2, 0]).is_err());
        assert_eq!(t.rows().unwrap().count(), 2);
    }

    #[test]
    fn test_select() {
        let t: Tensor<f64> =
            Tensor::from_vec2d(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        let r = t.select_rows(&[1]).unwrap();
        assert_eq!(r.data(), &[4.0, 5.0, 6.0]);
        let c = t.select_cols(&[0, 2]).unwrap();
        assert_eq!(c.data(), &[1.0, 3.0, 4.0, 6.0]);
        assert!(t.select_cols(&[3]).is_err());
    }

    #[test]
    fn test_matvec_and_axpy() {
        let mut w: Tensor<f64> = Tensor::from_vec2d(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(w.matvec(&[1.0, 1.0]).unwrap(), vec![3.0, 7.0]);
        assert!(w.matvec(&[1.0]).is_err());

        let eye = Tensor::eye(2);
        w.axpy(-1.0, &eye).unwrap();
        assert_eq!(w.data(), &[0.0, 2.0, 3.0, 3.0]);
    }

    #[test]
    fn test_column_reductions() {
        let t: Tensor<f64> = Tensor::from_vec2d(&[vec![1.0, 8.0], vec![3.0, 2.0]]).unwrap();
        assert_eq!(t.max_cols().unwrap(), vec![3.0, 8.0]);
        assert_eq!(t.mean_cols().unwrap(), vec![2.0, 5.0]);
    }
}

use patternml_core::error::ClassifyResult;
use patternml_core::{ClassifyError, Float, Tensor};
use serde::Serialize;

/// Cholesky factor of a symmetric positive-definite matrix: A = L * Lᵀ
#[derive(Debug, Clone, Serialize)]
#[serde(bound = "T: Float")]
pub struct Cholesky<T: Float> {
    l: Tensor<T>,
    n: usize,
}

/// Factorize `a`. Fails with [`ClassifyError::SingularMatrix`] when `a` is
/// not positive definite.
pub fn cholesky<T: Float>(a: &Tensor<T>) -> ClassifyResult<Cholesky<T>> {
    let (n, m) = a.matrix_dims()?;
    if n != m {
        return Err(ClassifyError::ShapeMismatch {
            expected: vec![n, n],
            got: vec![n, m],
        });
    }

    let src = a.data();
    let mut l = vec![T::ZERO; n * n];

    for i in 0..n {
        for j in 0..=i {
            let mut sum = T::ZERO;
            for k in 0..j {
                sum += l[i * n + k] * l[j * n + k];
            }

            if i == j {
                let val = src[i * n + i] - sum;
                if !(val > T::ZERO) || !val.is_finite() {
                    return Err(ClassifyError::SingularMatrix);
                }
                l[i * n + j] = val.sqrt();
            } else {
                l[i * n + j] = (src[i * n + j] - sum) / l[j * n + j];
            }
        }
    }

    Ok(Cholesky {
        l: Tensor::new(l, vec![n, n])?,
        n,
    })
}

impl<T: Float> Cholesky<T> {
    /// Lower-triangular factor.
    pub fn factor(&self) -> &Tensor<T> {
        &self.l
    }

    pub fn dim(&self) -> usize {
        self.n
    }

    /// ln |A| = 2 Σ ln L_ii
    pub fn log_det(&self) -> T {
        let l = self.l.data();
        (0..self.n).map(|i| l[i * self.n + i].ln()).sum::<T>() * T::TWO
    }

    /// Solve L y = b by forward substitution.
    pub fn solve_lower(&self, b: &[T]) -> ClassifyResult<Vec<T>> {
        if b.len() != self.n {
            return Err(ClassifyError::ShapeMismatch {
                expected: vec![self.n],
                got: vec![b.len()],
            });
        }
        let l = self.l.data();
        let mut y = vec![T::ZERO; self.n];
        for i in 0..self.n {
            let mut sum = T::ZERO;
            for j in 0..i {
                sum += l[i * self.n + j] * y[j];
            }
            y[i] = (b[i] - sum) / l[i * self.n + i];
        }
        Ok(y)
    }

    /// Squared Mahalanobis norm dᵀ A⁻¹ d = ‖L⁻¹ d‖².
    pub fn mahalanobis_sq(&self, d: &[T]) -> ClassifyResult<T> {
        Ok(self.solve_lower(d)?.iter().map(|&v| v * v).sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn spd() -> Tensor<f64> {
        Tensor::new(vec![4.0, 2.0, 2.0, 3.0], vec![2, 2]).unwrap()
    }

    #[test]
    fn test_cholesky_reconstructs() {
        let a = spd();
        let c = cholesky(&a).unwrap();
        let l = c.factor().data();
        // L * Lᵀ ≈ A
        for i in 0..2 {
            for j in 0..2 {
                let v: f64 = (0..2).map(|k| l[i * 2 + k] * l[j * 2 + k]).sum();
                assert_abs_diff_eq!(v, a.get(&[i, j]).unwrap(), epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_log_det() {
        // det = 4*3 - 2*2 = 8
        let c = cholesky(&spd()).unwrap();
        assert_abs_diff_eq!(c.log_det(), 8f64.ln(), epsilon = 1e-12);
    }

    #[test]
    fn test_mahalanobis() {
        // A⁻¹ = 1/8 [[3, -2], [-2, 4]]; d = [1, 1] → (3 - 4 + 4) / 8
        let c = cholesky(&spd()).unwrap();
        let m = c.mahalanobis_sq(&[1.0, 1.0]).unwrap();
        assert_abs_diff_eq!(m, 3.0 / 8.0, epsilon = 1e-12);
        assert!(c.mahalanobis_sq(&[1.0]).is_err());
    }

    #[test]
    fn test_not_positive_definite() {
        let a: Tensor<f64> = Tensor::new(vec![1.0, 2.0, 2.0, 1.0], vec![2, 2]).unwrap();
        assert_eq!(cholesky(&a).unwrap_err(), ClassifyError::SingularMatrix);
        let z: Tensor<f64> = Tensor::zeros(vec![2, 2]);
        assert!(cholesky(&z).is_err());
    }

    #[test]
    fn test_non_square() {
        let a: Tensor<f64> = Tensor::zeros(vec![2, 3]);
        assert!(matches!(cholesky(&a), Err(ClassifyError::ShapeMismatch { .. })));
    }
}

//! Log-space multivariate normal densities.
//!
//! Densities of 9-dimensional vowel features routinely underflow `f64`, so
//! everything here works with logarithms; arg-max decisions are unchanged.

use patternml_core::error::ClassifyResult;
use patternml_core::{ClassifyError, Float};
use patternml_linalg::Cholesky;

fn ln_2pi<T: Float>() -> T {
    (T::TWO * T::PI).ln()
}

fn check_len(x: usize, mean: usize) -> ClassifyResult<()> {
    if x != mean {
        return Err(ClassifyError::ShapeMismatch {
            expected: vec![mean],
            got: vec![x],
        });
    }
    Ok(())
}

/// ln N(x | μ, diag(σ²)) = -½ Σ (ln 2π + ln σ²ⱼ + (xⱼ - μⱼ)² / σ²ⱼ)
///
/// A variance that is not strictly positive and finite is reported as
/// [`ClassifyError::NumericInstability`].
pub fn log_density_diag<T: Float>(x: &[T], mean: &[T], var: &[T]) -> ClassifyResult<T> {
    check_len(x.len(), mean.len())?;
    check_len(var.len(), mean.len())?;
    let ln_2pi = ln_2pi::<T>();
    let mut log_prob = T::ZERO;
    for ((&xj, &mj), &vj) in x.iter().zip(mean).zip(var) {
        if !(vj > T::ZERO) || !vj.is_finite() {
            return Err(ClassifyError::NumericInstability(format!(
                "variance {} is not strictly positive",
                vj
            )));
        }
        let diff = xj - mj;
        log_prob -= T::HALF * (ln_2pi + vj.ln() + diff * diff / vj);
    }
    Ok(log_prob)
}

/// ln N(x | μ, Σ) with Σ given by its Cholesky factor.
pub fn log_density_full<T: Float>(
    x: &[T],
    mean: &[T],
    chol: &Cholesky<T>,
) -> ClassifyResult<T> {
    check_len(x.len(), mean.len())?;
    check_len(chol.dim(), mean.len())?;
    let diff: Vec<T> = x.iter().zip(mean).map(|(&a, &b)| a - b).collect();
    let maha = chol.mahalanobis_sq(&diff)?;
    let d = T::from_usize(mean.len());
    Ok(-T::HALF * (d * ln_2pi::<T>() + chol.log_det() + maha))
}

/// ln Σ exp(vᵢ), shifted by the maximum so large negative terms do not
/// underflow to ln 0. Returns `-inf` when every term is `-inf`.
pub fn log_sum_exp<T: Float>(values: &[T]) -> T {
    let max = values.iter().copied().fold(T::NEG_INFINITY, T::max);
    if max == T::NEG_INFINITY || !max.is_finite() {
        return max;
    }
    let sum: T = values.iter().map(|&v| (v - max).exp()).sum();
    max + sum.ln()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use patternml_core::Tensor;
    use patternml_linalg::cholesky;

    #[test]
    fn test_standard_normal() {
        let lp = log_density_diag(&[0.0], &[0.0], &[1.0]).unwrap();
        let peak = 1.0 / (2.0 * std::f64::consts::PI).sqrt();
        assert_abs_diff_eq!(lp.exp(), peak, epsilon = 1e-15);
    }

    #[test]
    fn test_standard_normal_single_precision() {
        let lp = log_density_diag(&[0.0f32], &[0.0], &[1.0]).unwrap();
        assert_abs_diff_eq!(lp, -0.918_938_5f32, epsilon = 1e-6);
        let lp = log_density_diag(&[1.0f32], &[0.0], &[4.0]).unwrap();
        assert_abs_diff_eq!(lp, -0.918_938_5 - 2f32.ln() - 0.125, epsilon = 1e-6);
    }

    #[test]
    fn test_full_matches_diag_for_diagonal_covariance() {
        let cov: Tensor<f64> = Tensor::new(vec![2.0, 0.0, 0.0, 0.5], vec![2, 2]).unwrap();
        let chol = cholesky(&cov).unwrap();
        let x = [0.3, -1.2];
        let mean = [1.0, -1.0];
        let full = log_density_full(&x, &mean, &chol).unwrap();
        let diag = log_density_diag(&x, &mean, &[2.0, 0.5]).unwrap();
        assert_abs_diff_eq!(full, diag, epsilon = 1e-12);
    }

    #[test]
    fn test_bad_variance_is_reported() {
        assert!(matches!(
            log_density_diag(&[0.0], &[0.0], &[0.0]),
            Err(ClassifyError::NumericInstability(_))
        ));
        assert!(log_density_diag(&[0.0, 1.0], &[0.0], &[1.0]).is_err());
    }

    #[test]
    fn test_log_sum_exp() {
        assert_abs_diff_eq!(log_sum_exp(&[0.0f64, 0.0]), 2f64.ln(), epsilon = 1e-15);
        // Terms far below f64 range still combine.
        assert_abs_diff_eq!(
            log_sum_exp(&[-1000.0f64, -1000.0]),
            -1000.0 + 2f64.ln(),
            epsilon = 1e-12
        );
        let empty = log_sum_exp(&[f64::NEG_INFINITY, f64::NEG_INFINITY]);
        assert_eq!(empty, f64::NEG_INFINITY);
    }
}

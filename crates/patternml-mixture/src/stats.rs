use patternml_core::error::ClassifyResult;
use patternml_core::{ClassifyError, Float};

/// Responsibility-weighted moments of one class, per component.
///
/// Built by folding rows with [`absorb`](Self::absorb); partial folds over
/// disjoint row sets combine with [`merge`](Self::merge).
#[derive(Debug, Clone, PartialEq)]
pub struct SufficientStats<T: Float> {
    n_features: usize,
    /// Σᵢ rᵢₖ
    mass: Vec<T>,
    /// Σᵢ rᵢₖ xᵢ, row-major M × p
    sum_x: Vec<T>,
    /// Σᵢ rᵢₖ xᵢ², row-major M × p
    sum_xx: Vec<T>,
    log_likelihood: T,
    samples: usize,
}

impl<T: Float> SufficientStats<T> {
    pub fn new(n_components: usize, n_features: usize) -> Self {
        SufficientStats {
            n_features,
            mass: vec![T::ZERO; n_components],
            sum_x: vec![T::ZERO; n_components * n_features],
            sum_xx: vec![T::ZERO; n_components * n_features],
            log_likelihood: T::ZERO,
            samples: 0,
        }
    }

    pub fn n_components(&self) -> usize {
        self.mass.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Adds one row with its responsibilities and its log-likelihood under
    /// the current mixture.
    pub fn absorb(&mut self, row: &[T], resp: &[T], log_likelihood: T) -> ClassifyResult<()> {
        if row.len() != self.n_features || resp.len() != self.mass.len() {
            return Err(ClassifyError::ShapeMismatch {
                expected: vec![self.mass.len(), self.n_features],
                got: vec![resp.len(), row.len()],
            });
        }
        let p = self.n_features;
        for (k, &r) in resp.iter().enumerate() {
            self.mass[k] += r;
            for (j, &v) in row.iter().enumerate() {
                self.sum_x[k * p + j] += r * v;
                self.sum_xx[k * p + j] += r * v * v;
            }
        }
        self.log_likelihood += log_likelihood;
        self.samples += 1;
        Ok(())
    }

    pub fn merge(mut self, other: Self) -> ClassifyResult<Self> {
        if other.n_features != self.n_features || other.mass.len() != self.mass.len() {
            return Err(ClassifyError::ShapeMismatch {
                expected: vec![self.mass.len(), self.n_features],
                got: vec![other.mass.len(), other.n_features],
            });
        }
        for (a, b) in self.mass.iter_mut().zip(other.mass) {
            *a += b;
        }
        for (a, b) in self.sum_x.iter_mut().zip(other.sum_x) {
            *a += b;
        }
        for (a, b) in self.sum_xx.iter_mut().zip(other.sum_xx) {
            *a += b;
        }
        self.log_likelihood += other.log_likelihood;
        self.samples += other.samples;
        Ok(self)
    }

    /// Σᵢ rᵢₖ for component `k`.
    pub fn mass(&self, k: usize) -> ClassifyResult<T> {
        self.mass
            .get(k)
            .copied()
            .ok_or(ClassifyError::IndexOutOfBounds {
                index: k,
                axis: 0,
                size: self.mass.len(),
            })
    }

    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Mean per-sample log-likelihood of the absorbed rows.
    pub fn mean_log_likelihood(&self) -> T {
        if self.samples == 0 {
            return T::ZERO;
        }
        self.log_likelihood / T::from_usize(self.samples)
    }

    /// Weighted mean and variance of component `k` given its floored mass.
    /// Variance is clamped at zero before the caller adds regularization.
    pub(crate) fn moments(&self, k: usize, mass: T) -> (Vec<T>, Vec<T>) {
        let p = self.n_features;
        let mut mean = Vec::with_capacity(p);
        let mut var = Vec::with_capacity(p);
        for j in 0..p {
            let mu = self.sum_x[k * p + j] / mass;
            let second = self.sum_xx[k * p + j] / mass;
            mean.push(mu);
            var.push((second - mu * mu).max(T::ZERO));
        }
        (mean, var)
    }
}

//! Expectation-maximization for one class's diagonal Gaussian mixture.
//!
//! The E-step works in log space: component log-probabilities are
//! normalized with log-sum-exp before exponentiating into responsibilities.
//! Every M-step adds `reg_covar` to each variance, so no component
//! collapses onto a single point.

use log::{debug, warn};
use patternml_core::error::ClassifyResult;
use patternml_core::{ClassifyError, ConvergenceWarning, Float, Tensor};
use patternml_gaussian::{log_density_diag, log_sum_exp};
use serde::Serialize;

use crate::init::KMeansInit;
use crate::stats::SufficientStats;

/// Fitting controls shared by every class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EmParams {
    pub n_components: usize,
    pub reg_covar: f64,
    pub max_iter: usize,
    /// Stop once the mean per-sample log-likelihood moves less than this.
    pub tolerance: f64,
    pub seed: u64,
}

/// One weighted diagonal Gaussian.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(bound = "T: Float")]
pub struct Component<T: Float> {
    pub weight: T,
    pub mean: Vec<T>,
    pub variances: Vec<T>,
}

impl<T: Float> Component<T> {
    /// ln wₖ + ln N(row | μₖ, diag(σ²ₖ))
    pub fn weighted_log_density(&self, row: &[T]) -> ClassifyResult<T> {
        Ok(self.weight.ln() + log_density_diag(row, &self.mean, &self.variances)?)
    }
}

/// Mixture of diagonal Gaussians for a single class.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(bound = "T: Float")]
pub struct ClassMixture<T: Float> {
    components: Vec<Component<T>>,
}

impl<T: Float> ClassMixture<T> {
    pub fn new(components: Vec<Component<T>>) -> ClassifyResult<Self> {
        if components.is_empty() {
            return Err(ClassifyError::EmptyInput("mixture has no components"));
        }
        Ok(ClassMixture { components })
    }

    pub fn components(&self) -> &[Component<T>] {
        &self.components
    }

    pub fn n_components(&self) -> usize {
        self.components.len()
    }

    pub fn weight_sum(&self) -> T {
        self.components.iter().map(|c| c.weight).sum()
    }

    pub fn component_log_probs(&self, row: &[T]) -> ClassifyResult<Vec<T>> {
        self.components
            .iter()
            .map(|c| c.weighted_log_density(row))
            .collect()
    }

    /// ln Σₖ wₖ N(row | μₖ, diag(σ²ₖ))
    pub fn log_density(&self, row: &[T]) -> ClassifyResult<T> {
        Ok(log_sum_exp(&self.component_log_probs(row)?))
    }

    /// Mean per-sample log-likelihood of `x` under this mixture.
    pub fn mean_log_likelihood(&self, x: &Tensor<T>) -> ClassifyResult<T> {
        Ok(self.expectation(x)?.mean_log_likelihood())
    }

    /// E-step folded straight into sufficient statistics.
    fn expectation(&self, x: &Tensor<T>) -> ClassifyResult<SufficientStats<T>> {
        let (_, p) = x.matrix_dims()?;
        x.rows()?.try_fold(
            SufficientStats::new(self.n_components(), p),
            |mut stats, row| {
                let log_probs = self.component_log_probs(row)?;
                let ll = log_sum_exp(&log_probs);
                if !ll.is_finite() {
                    return Err(ClassifyError::NumericInstability(format!(
                        "sample log-likelihood is {}",
                        ll
                    )));
                }
                let resp: Vec<T> = log_probs.iter().map(|&lp| (lp - ll).exp()).collect();
                stats.absorb(row, &resp, ll)?;
                Ok::<_, ClassifyError>(stats)
            },
        )
    }

    /// M-step. Component mass is floored at 10·ε so weights stay positive;
    /// a component that received no mass keeps its previous mean and
    /// variances.
    fn maximization(&self, stats: &SufficientStats<T>, reg: T) -> ClassifyResult<Self> {
        let floor = T::EPSILON * T::from_f64(10.0);
        let raw = (0..stats.n_components())
            .map(|k| stats.mass(k))
            .collect::<ClassifyResult<Vec<T>>>()?;
        let total: T = raw.iter().map(|&m| m.max(floor)).sum();

        let components = self
            .components
            .iter()
            .zip(&raw)
            .enumerate()
            .map(|(k, (prev, &raw_mass))| {
                let mass = raw_mass.max(floor);
                let weight = mass / total;
                if raw_mass <= floor {
                    return Component {
                        weight,
                        mean: prev.mean.clone(),
                        variances: prev.variances.clone(),
                    };
                }
                let (mean, var) = stats.moments(k, mass);
                Component {
                    weight,
                    mean,
                    variances: var.into_iter().map(|v| v + reg).collect(),
                }
            })
            .collect();
        ClassMixture::new(components)
    }
}

/// Seeds a mixture from a K-Means partition of `x`: each cluster's share
/// of rows, its centroid and its within-cluster variance. Clusters with
/// fewer than two members take the variance of the whole class.
pub fn init_mixture<T: Float>(
    x: &Tensor<T>,
    params: &EmParams,
) -> ClassifyResult<ClassMixture<T>> {
    let (n, p) = x.matrix_dims()?;
    let m = params.n_components;
    let reg = T::from_f64(params.reg_covar);
    let partition = KMeansInit::new(m, params.seed).fit(x)?;

    let mut global = SufficientStats::new(1, p);
    let mut clusters = SufficientStats::new(m, p);
    let mut one_hot = vec![T::ZERO; m];
    for (row, &k) in x.rows()?.zip(&partition.assignments) {
        one_hot[k] = T::ONE;
        clusters.absorb(row, &one_hot, T::ZERO)?;
        one_hot[k] = T::ZERO;
        global.absorb(row, &[T::ONE], T::ZERO)?;
    }
    let (_, class_var) = global.moments(0, T::from_usize(n));

    let counts = partition.counts();
    let total: usize = counts.iter().map(|&c| c.max(1)).sum();
    let components = counts
        .iter()
        .zip(partition.centroids)
        .enumerate()
        .map(|(k, (&count, centroid))| {
            let var = if count >= 2 {
                clusters.moments(k, T::from_usize(count)).1
            } else {
                class_var.clone()
            };
            Component {
                weight: T::from_usize(count.max(1)) / T::from_usize(total),
                mean: centroid,
                variances: var.into_iter().map(|v| v + reg).collect(),
            }
        })
        .collect();
    ClassMixture::new(components)
}

/// One EM iteration. Returns the updated mixture and the mean per-sample
/// log-likelihood of `x` under the mixture passed in.
pub fn em_step<T: Float>(
    mixture: &ClassMixture<T>,
    x: &Tensor<T>,
    reg_covar: T,
) -> ClassifyResult<(ClassMixture<T>, T)> {
    let stats = mixture.expectation(x)?;
    let next = mixture.maximization(&stats, reg_covar)?;
    Ok((next, stats.mean_log_likelihood()))
}

/// Result of fitting one class.
#[derive(Debug, Clone, Serialize)]
#[serde(bound = "T: Float")]
pub struct ClassFit<T: Float> {
    pub mixture: ClassMixture<T>,
    pub n_iter: usize,
    pub converged: bool,
    /// Mean per-sample log-likelihood before each M-step.
    pub log_likelihood: Vec<T>,
    pub warning: Option<ConvergenceWarning>,
}

/// Runs EM on the rows of one class until the log-likelihood settles or
/// `max_iter` is reached.
pub fn fit_class_mixture<T: Float>(
    x: &Tensor<T>,
    params: &EmParams,
    class: usize,
) -> ClassifyResult<ClassFit<T>> {
    let (n, _) = x.matrix_dims()?;
    if n < params.n_components {
        return Err(ClassifyError::DegenerateStatistics {
            class,
            reason: format!(
                "{} training samples for {} mixture components",
                n, params.n_components
            ),
        });
    }

    let reg = T::from_f64(params.reg_covar);
    let tol = T::from_f64(params.tolerance);
    let mut mixture = init_mixture(x, params)?;
    let mut history: Vec<T> = Vec::with_capacity(params.max_iter);
    let mut prev = T::NEG_INFINITY;
    let mut change = T::INFINITY;
    let mut converged = false;

    for iter in 1..=params.max_iter {
        let (next, ll) = em_step(&mixture, x, reg)?;
        mixture = next;
        history.push(ll);
        change = (ll - prev).abs();
        debug!("class {} iter {}: mean log-likelihood {:.6}", class, iter, ll);
        if change < tol {
            converged = true;
            break;
        }
        prev = ll;
    }

    let warning = if converged {
        None
    } else {
        let w = ConvergenceWarning {
            class: Some(class),
            iterations: history.len(),
            last_change: change.to_f64(),
            tolerance: params.tolerance,
        };
        warn!("{}", w);
        Some(w)
    };

    Ok(ClassFit {
        mixture,
        n_iter: history.len(),
        converged,
        log_likelihood: history,
        warning,
    })
}

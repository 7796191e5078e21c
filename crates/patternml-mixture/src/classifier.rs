use log::info;
use patternml_core::error::ClassifyResult;
use patternml_core::{
    argmax, Classifier, ClassifyError, ConvergenceWarning, Dataset, Float, Predictor, ProblemConfig,
};
use serde::Serialize;

use crate::em::{fit_class_mixture, ClassFit, ClassMixture, EmParams};

pub const DEFAULT_MAX_ITER: usize = 100;
pub const DEFAULT_TOLERANCE: f64 = 1e-3;
pub const DEFAULT_SEED: u64 = 0;

/// One diagonal-covariance Gaussian mixture per class, fit independently
/// by EM; prediction picks the class with the highest mixture density.
#[derive(Debug, Clone)]
pub struct GaussianMixtureClassifier {
    config: ProblemConfig,
    params: EmParams,
}

impl GaussianMixtureClassifier {
    pub fn new(config: ProblemConfig, n_components: usize, reg_covar: f64) -> ClassifyResult<Self> {
        if n_components == 0 {
            return Err(ClassifyError::InvalidParameter(
                "n_components must be at least 1".into(),
            ));
        }
        if !(reg_covar > 0.0) || !reg_covar.is_finite() {
            return Err(ClassifyError::InvalidParameter(format!(
                "reg_covar must be positive and finite, got {}",
                reg_covar
            )));
        }
        Ok(GaussianMixtureClassifier {
            config,
            params: EmParams {
                n_components,
                reg_covar,
                max_iter: DEFAULT_MAX_ITER,
                tolerance: DEFAULT_TOLERANCE,
                seed: DEFAULT_SEED,
            },
        })
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> ClassifyResult<Self> {
        if max_iter == 0 {
            return Err(ClassifyError::InvalidParameter(
                "max_iter must be at least 1".into(),
            ));
        }
        self.params.max_iter = max_iter;
        Ok(self)
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> ClassifyResult<Self> {
        if !(tolerance >= 0.0) || !tolerance.is_finite() {
            return Err(ClassifyError::InvalidParameter(format!(
                "tolerance must be non-negative and finite, got {}",
                tolerance
            )));
        }
        self.params.tolerance = tolerance;
        Ok(self)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.params.seed = seed;
        self
    }

    pub fn config(&self) -> &ProblemConfig {
        &self.config
    }

    pub fn params(&self) -> &EmParams {
        &self.params
    }
}

impl<T: Float> Classifier<T> for GaussianMixtureClassifier {
    type Model = MixtureModel<T>;

    fn train(&self, data: &Dataset<T>) -> ClassifyResult<MixtureModel<T>> {
        let n_classes = self.config.n_classes();
        data.validate(n_classes, self.config.n_features())?;

        let classes = data
            .group_by_class(n_classes)?
            .iter()
            .enumerate()
            .map(|(class, rows)| -> ClassifyResult<ClassFit<T>> {
                let fit = fit_class_mixture(rows, &self.params, class)?;
                info!(
                    "class {} ({}): {} components, {} EM iterations, converged = {}",
                    class,
                    self.config.class_label(class).unwrap_or("?"),
                    self.params.n_components,
                    fit.n_iter,
                    fit.converged
                );
                Ok(fit)
            })
            .collect::<ClassifyResult<Vec<_>>>()?;

        info!(
            "trained gaussian mixture classifier ({}): {} classes, {} samples",
            self.config.name(),
            n_classes,
            data.len()
        );

        Ok(MixtureModel {
            params: self.params,
            classes,
        })
    }
}

/// Trained per-class mixtures.
#[derive(Debug, Clone, Serialize)]
#[serde(bound = "T: Float")]
pub struct MixtureModel<T: Float> {
    params: EmParams,
    classes: Vec<ClassFit<T>>,
}

impl<T: Float> MixtureModel<T> {
    pub fn params(&self) -> &EmParams {
        &self.params
    }

    pub fn class_fits(&self) -> &[ClassFit<T>] {
        &self.classes
    }

    pub fn mixture(&self, class: usize) -> ClassifyResult<&ClassMixture<T>> {
        self.classes
            .get(class)
            .map(|fit| &fit.mixture)
            .ok_or(ClassifyError::LabelOutOfRange {
                label: class,
                n_classes: self.classes.len(),
            })
    }

    pub fn log_density(&self, class: usize, row: &[T]) -> ClassifyResult<T> {
        self.mixture(class)?.log_density(row)
    }

    /// Mixture density Σₖ wₖ N(row | μₖ, diag(σ²ₖ)) for `class`.
    pub fn density(&self, class: usize, row: &[T]) -> ClassifyResult<T> {
        Ok(self.log_density(class, row)?.exp())
    }

    /// Classes whose EM stopped at `max_iter`.
    pub fn convergence_warnings(&self) -> Vec<&ConvergenceWarning> {
        self.classes
            .iter()
            .filter_map(|fit| fit.warning.as_ref())
            .collect()
    }
}

impl<T: Float> Predictor<T> for MixtureModel<T> {
    fn n_classes(&self) -> usize {
        self.classes.len()
    }

    fn predict_row(&self, row: &[T]) -> ClassifyResult<usize> {
        let scores = self
            .classes
            .iter()
            .map(|fit| fit.mixture.log_density(row))
            .collect::<ClassifyResult<Vec<T>>>()?;
        argmax(&scores)
    }
}

use log::{debug, info, warn};
use patternml_core::error::ClassifyResult;
use patternml_core::{
    argmax, Classifier, ClassifyError, ConvergenceWarning, Dataset, Float, Predictor,
    ProblemConfig, Tensor,
};
use serde::Serialize;

use crate::sigmoid::sigmoid;

/// Step size used for the Iris experiments.
pub const DEFAULT_LEARNING_RATE: f64 = 0.04;

/// Passes over the training set used for the Iris experiments.
pub const DEFAULT_ITERATIONS: usize = 4000;

/// Running sum of the MSE gradient and loss over a batch of samples.
///
/// `merge` is associative and commutative, so shards of a dataset can be
/// folded separately and combined.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientAccumulator<T: Float> {
    grad: Tensor<T>,
    loss: T,
    samples: usize,
}

impl<T: Float> GradientAccumulator<T> {
    pub fn new(n_classes: usize, n_cols: usize) -> Self {
        GradientAccumulator {
            grad: Tensor::zeros(vec![n_classes, n_cols]),
            loss: T::ZERO,
            samples: 0,
        }
    }

    /// Add one sample's contribution for the current weights `w`:
    /// `((g - t) ⊙ g ⊙ (1 - g)) xᵀ` to the gradient and `½‖g - t‖²` to the loss.
    pub fn absorb(&mut self, w: &Tensor<T>, x: &[T], label: usize) -> ClassifyResult<()> {
        if w.shape() != self.grad.shape() {
            return Err(ClassifyError::ShapeMismatch {
                expected: self.grad.shape_vec(),
                got: w.shape_vec(),
            });
        }
        let z = w.matvec(x)?;
        let cols = x.len();
        let grad = self.grad.data_mut();
        for (c, &zc) in z.iter().enumerate() {
            let g = sigmoid(zc);
            let t = if c == label { T::ONE } else { T::ZERO };
            let err = g - t;
            let delta = err * g * (T::ONE - g);
            for (gj, &xj) in grad[c * cols..(c + 1) * cols].iter_mut().zip(x) {
                *gj += delta * xj;
            }
            self.loss += T::HALF * err * err;
        }
        self.samples += 1;
        Ok(())
    }

    pub fn merge(mut self, other: Self) -> ClassifyResult<Self> {
        self.grad.axpy(T::ONE, &other.grad)?;
        self.loss += other.loss;
        self.samples += other.samples;
        Ok(self)
    }

    pub fn gradient(&self) -> &Tensor<T> {
        &self.grad
    }

    pub fn loss(&self) -> T {
        self.loss
    }

    pub fn samples(&self) -> usize {
        self.samples
    }
}

/// Linear discriminant trained by batch gradient descent on the MSE of a
/// sigmoid output layer.
#[derive(Debug, Clone)]
pub struct LinearGradientClassifier<T: Float> {
    config: ProblemConfig,
    n_iterations: usize,
    learning_rate: T,
    tolerance: Option<T>,
}

impl<T: Float> LinearGradientClassifier<T> {
    pub fn new(
        config: ProblemConfig,
        n_iterations: usize,
        learning_rate: T,
    ) -> ClassifyResult<Self> {
        if n_iterations == 0 {
            return Err(ClassifyError::InvalidParameter(
                "n_iterations must be at least 1".into(),
            ));
        }
        if !learning_rate.is_finite() || learning_rate < T::ZERO {
            return Err(ClassifyError::InvalidParameter(format!(
                "learning_rate must be finite and non-negative, got {}",
                learning_rate
            )));
        }
        Ok(LinearGradientClassifier {
            config,
            n_iterations,
            learning_rate,
            tolerance: None,
        })
    }

    /// Iteration count and step size of the Iris experiments.
    pub fn with_defaults(config: ProblemConfig) -> Self {
        LinearGradientClassifier {
            config,
            n_iterations: DEFAULT_ITERATIONS,
            learning_rate: T::from_f64(DEFAULT_LEARNING_RATE),
            tolerance: None,
        }
    }

    /// Report a [`ConvergenceWarning`] when the loss still moves by more
    /// than `tol` in the last iteration. Training length is unaffected.
    pub fn with_tolerance(mut self, tol: T) -> Self {
        self.tolerance = Some(tol);
        self
    }

    pub fn config(&self) -> &ProblemConfig {
        &self.config
    }

    pub fn n_iterations(&self) -> usize {
        self.n_iterations
    }

    pub fn learning_rate(&self) -> T {
        self.learning_rate
    }

    fn check_bias_column(data: &Dataset<T>) -> ClassifyResult<()> {
        match data.iter().position(|(row, _)| row.last() != Some(&T::ONE)) {
            Some(row) => Err(ClassifyError::MissingBiasColumn { row }),
            None => Ok(()),
        }
    }

    fn convergence_warning(&self, history: &[T]) -> Option<ConvergenceWarning> {
        let tol = self.tolerance?;
        let last_change = match history {
            [.., prev, last] => (*last - *prev).abs().to_f64(),
            _ => f64::INFINITY,
        };
        (last_change > tol.to_f64()).then_some(ConvergenceWarning {
            class: None,
            iterations: history.len(),
            last_change,
            tolerance: tol.to_f64(),
        })
    }
}

impl<T: Float> Classifier<T> for LinearGradientClassifier<T> {
    type Model = LinearModel<T>;

    /// Rows must be `[features..., 1.0]`.
    fn train(&self, data: &Dataset<T>) -> ClassifyResult<LinearModel<T>> {
        let n_classes = self.config.n_classes();
        let n_cols = self.config.n_features() + 1;
        data.validate(n_classes, n_cols)?;
        Self::check_bias_column(data)?;

        let mut w = Tensor::zeros(vec![n_classes, n_cols]);
        let mut history = Vec::with_capacity(self.n_iterations);

        for iter in 0..self.n_iterations {
            let acc = data.iter().try_fold(
                GradientAccumulator::new(n_classes, n_cols),
                |mut acc, (x, label)| {
                    acc.absorb(&w, x, label)?;
                    Ok::<_, ClassifyError>(acc)
                },
            )?;

            if !acc.loss().is_finite() || !acc.gradient().is_all_finite() {
                return Err(ClassifyError::NumericInstability(format!(
                    "gradient descent diverged at iteration {}",
                    iter
                )));
            }

            // Batch step: one update per full pass.
            w.axpy(-self.learning_rate, acc.gradient())?;
            history.push(acc.loss());

            if iter % 500 == 0 {
                debug!("iteration {}: mse {:.6}", iter, acc.loss());
            }
        }

        let warning = self.convergence_warning(&history);
        if let Some(diag) = &warning {
            warn!("linear classifier ({}): {}", self.config.name(), diag);
        }
        info!(
            "trained linear classifier ({}): {} samples, {} iterations, final mse {:.6}",
            self.config.name(),
            data.len(),
            self.n_iterations,
            history.last().copied().unwrap_or(T::ZERO)
        );

        Ok(LinearModel {
            weights: w,
            loss_history: history,
            warning,
        })
    }
}

/// Trained weight matrix (n_classes × (n_features + 1), bias in the last
/// column) with the loss recorded at each iteration.
#[derive(Debug, Clone, Serialize)]
#[serde(bound = "T: Float")]
pub struct LinearModel<T: Float> {
    weights: Tensor<T>,
    loss_history: Vec<T>,
    warning: Option<ConvergenceWarning>,
}

impl<T: Float> LinearModel<T> {
    pub fn weights(&self) -> &Tensor<T> {
        &self.weights
    }

    /// MSE before each weight update, one entry per iteration.
    pub fn loss_history(&self) -> &[T] {
        &self.loss_history
    }

    pub fn final_loss(&self) -> Option<T> {
        self.loss_history.last().copied()
    }

    pub fn convergence_warning(&self) -> Option<&ConvergenceWarning> {
        self.warning.as_ref()
    }

    /// Raw linear scores W·x.
    pub fn scores(&self, row: &[T]) -> ClassifyResult<Vec<T>> {
        self.weights.matvec(row)
    }
}

impl<T: Float> Predictor<T> for LinearModel<T> {
    fn n_classes(&self) -> usize {
        self.weights.matrix_dims().map(|(r, _)| r).unwrap_or(0)
    }

    /// Arg-max of the raw score. Sigmoid is monotonic, so skipping it does
    /// not change the ranking.
    fn predict_row(&self, row: &[T]) -> ClassifyResult<usize> {
        argmax(&self.scores(row)?)
    }
}

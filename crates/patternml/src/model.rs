use log::info;
use patternml_core::error::ClassifyResult;
use patternml_core::{ConvergenceWarning, Dataset, Float, Predictor};
use patternml_gaussian::GaussianModel;
use patternml_linear::LinearModel;
use patternml_metrics::ConfusionMatrix;
use patternml_mixture::MixtureModel;
use serde::Serialize;

/// Any trained classifier, so callers can hold one without generics.
#[derive(Debug, Clone, Serialize)]
#[serde(bound = "T: Float")]
pub enum TrainedModel<T: Float> {
    Linear(LinearModel<T>),
    Gaussian(GaussianModel<T>),
    Mixture(MixtureModel<T>),
}

impl<T: Float> TrainedModel<T> {
    pub fn kind(&self) -> &'static str {
        match self {
            TrainedModel::Linear(_) => "linear",
            TrainedModel::Gaussian(_) => "gaussian",
            TrainedModel::Mixture(_) => "mixture",
        }
    }

    /// Non-fatal warnings recorded while training.
    pub fn convergence_warnings(&self) -> Vec<&ConvergenceWarning> {
        match self {
            TrainedModel::Linear(m) => m.convergence_warning().into_iter().collect(),
            TrainedModel::Gaussian(_) => Vec::new(),
            TrainedModel::Mixture(m) => m.convergence_warnings(),
        }
    }
}

impl<T: Float> Predictor<T> for TrainedModel<T> {
    fn n_classes(&self) -> usize {
        match self {
            TrainedModel::Linear(m) => m.n_classes(),
            TrainedModel::Gaussian(m) => m.n_classes(),
            TrainedModel::Mixture(m) => m.n_classes(),
        }
    }

    fn predict_row(&self, row: &[T]) -> ClassifyResult<usize> {
        match self {
            TrainedModel::Linear(m) => m.predict_row(row),
            TrainedModel::Gaussian(m) => m.predict_row(row),
            TrainedModel::Mixture(m) => m.predict_row(row),
        }
    }
}

impl<T: Float> From<LinearModel<T>> for TrainedModel<T> {
    fn from(m: LinearModel<T>) -> Self {
        TrainedModel::Linear(m)
    }
}

impl<T: Float> From<GaussianModel<T>> for TrainedModel<T> {
    fn from(m: GaussianModel<T>) -> Self {
        TrainedModel::Gaussian(m)
    }
}

impl<T: Float> From<MixtureModel<T>> for TrainedModel<T> {
    fn from(m: MixtureModel<T>) -> Self {
        TrainedModel::Mixture(m)
    }
}

/// Predictions on a labelled test set and how they score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub predictions: Vec<usize>,
    pub confusion: ConfusionMatrix,
    /// Percent misclassified.
    pub error_rate: f64,
}

/// Predicts every row of `data` and tallies the result against its labels.
pub fn evaluate<T: Float, P: Predictor<T>>(
    model: &P,
    data: &Dataset<T>,
) -> ClassifyResult<Evaluation> {
    let predictions = model.predict(data.features())?;
    let confusion = ConfusionMatrix::build(&predictions, data.labels(), model.n_classes())?;
    let error_rate = confusion.error_rate()?;
    info!(
        "evaluated {} samples: error rate {:.2}%",
        confusion.total(),
        error_rate
    );
    Ok(Evaluation {
        predictions,
        confusion,
        error_rate,
    })
}

use crate::dataset::Dataset;
use crate::dtype::Float;
use crate::error::{ClassifyError, ClassifyResult};
use crate::tensor::Tensor;

/// A trainer: turns labeled rows into an immutable model.
pub trait Classifier<T: Float> {
    type Model: Predictor<T>;

    fn train(&self, data: &Dataset<T>) -> ClassifyResult<Self::Model>;
}

/// A trained model that maps one feature row to a class index.
pub trait Predictor<T: Float> {
    fn n_classes(&self) -> usize;

    fn predict_row(&self, row: &[T]) -> ClassifyResult<usize>;

    /// Predict every row of a 2-D feature matrix.
    fn predict(&self, x: &Tensor<T>) -> ClassifyResult<Vec<usize>> {
        x.rows()?.map(|r| self.predict_row(r)).collect()
    }
}

/// Index of the largest score; ties go to the lowest index.
///
/// NaN scores and an all `-inf` score vector are reported instead of being
/// silently resolved to class 0.
pub fn argmax<T: Float>(scores: &[T]) -> ClassifyResult<usize> {
    if scores.is_empty() {
        return Err(ClassifyError::EmptyInput("argmax over no scores"));
    }
    if let Some(i) = scores.iter().position(|s| s.is_nan()) {
        return Err(ClassifyError::NumericInstability(format!(
            "score for class {} is NaN",
            i
        )));
    }
    let mut best = 0;
    for (i, &s) in scores.iter().enumerate().skip(1) {
        if s > scores[best] {
            best = i;
        }
    }
    if scores[best] == T::NEG_INFINITY {
        return Err(ClassifyError::NumericInstability(
            "every class scored -inf".into(),
        ));
    }
    Ok(best)
}

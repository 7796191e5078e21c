use patternml_core::error::ClassifyResult;
use patternml_core::{ClassifyError, Dataset, Float, Tensor};
use serde::Serialize;

/// Divides every feature column by its maximum over the fitted rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(bound = "T: Float")]
pub struct MaxScaler<T: Float> {
    pub max: Option<Vec<T>>,
}

impl<T: Float> Default for MaxScaler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Float> MaxScaler<T> {
    pub fn new() -> Self {
        MaxScaler { max: None }
    }

    /// Records the column maxima. A column whose maximum is zero or not
    /// finite cannot be scaled.
    pub fn fit(&mut self, x: &Tensor<T>) -> ClassifyResult<()> {
        let max = x.max_cols()?;
        if let Some((col, m)) = max
            .iter()
            .enumerate()
            .find(|&(_, &m)| m == T::ZERO || !m.is_finite())
        {
            return Err(ClassifyError::NumericInstability(format!(
                "column {} has maximum {}, cannot normalize",
                col, m
            )));
        }
        self.max = Some(max);
        Ok(())
    }

    pub fn transform(&self, x: &Tensor<T>) -> ClassifyResult<Tensor<T>> {
        let max = self.max.as_ref().ok_or(ClassifyError::InvalidParameter(
            "fit() must be called before transform()".into(),
        ))?;
        let (rows, cols) = x.matrix_dims()?;
        if cols != max.len() {
            return Err(ClassifyError::ShapeMismatch {
                expected: vec![rows, max.len()],
                got: vec![rows, cols],
            });
        }

        let mut out = x.clone();
        for (i, v) in out.data_mut().iter_mut().enumerate() {
            *v /= max[i % cols];
        }
        Ok(out)
    }

    pub fn fit_transform(&mut self, x: &Tensor<T>) -> ClassifyResult<Tensor<T>> {
        self.fit(x)?;
        self.transform(x)
    }
}

/// Scales each feature by its maximum over the whole dataset, leaving the
/// labels untouched.
pub fn normalize_by_max<T: Float>(data: &Dataset<T>) -> ClassifyResult<Dataset<T>> {
    let scaled = MaxScaler::new().fit_transform(data.features())?;
    data.with_features(scaled)
}

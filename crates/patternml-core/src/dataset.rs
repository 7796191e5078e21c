use serde::{Deserialize, Serialize};

use crate::dtype::Float;
use crate::error::{ClassifyError, ClassifyResult};
use crate::tensor::Tensor;

/// Labeled samples: a rows × features matrix and one class index per row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "T: Float")]
pub struct Dataset<T: Float> {
    features: Tensor<T>,
    labels: Vec<usize>,
}

impl<T: Float> Dataset<T> {
    pub fn new(features: Tensor<T>, labels: Vec<usize>) -> ClassifyResult<Self> {
        let (rows, _) = features.matrix_dims()?;
        if rows != labels.len() {
            return Err(ClassifyError::LabelCountMismatch {
                rows,
                labels: labels.len(),
            });
        }
        Ok(Dataset { features, labels })
    }

    /// Build from nested rows.
    pub fn from_rows(rows: &[Vec<T>], labels: Vec<usize>) -> ClassifyResult<Self> {
        Dataset::new(Tensor::from_vec2d(rows)?, labels)
    }

    pub fn features(&self) -> &Tensor<T> {
        &self.features
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn n_features(&self) -> usize {
        self.features.matrix_dims().map(|(_, c)| c).unwrap_or(0)
    }

    pub fn row(&self, i: usize) -> ClassifyResult<&[T]> {
        self.features.row(i)
    }

    /// Iterate `(row, label)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&[T], usize)> + '_ {
        let cols = self.n_features().max(1);
        self.features
            .data()
            .chunks_exact(cols)
            .zip(self.labels.iter().copied())
    }

    /// Replace the feature matrix, keeping labels. Row count must not change.
    pub fn with_features(&self, features: Tensor<T>) -> ClassifyResult<Self> {
        Dataset::new(features, self.labels.clone())
    }

    /// Fail fast on anything a trainer cannot consume: no rows, a column
    /// count other than `expected_cols`, a label outside `[0, n_classes)` or
    /// a non-finite feature.
    pub fn validate(&self, n_classes: usize, expected_cols: usize) -> ClassifyResult<()> {
        if self.is_empty() {
            return Err(ClassifyError::EmptyInput("dataset has no rows"));
        }
        if self.n_features() != expected_cols {
            return Err(ClassifyError::ShapeMismatch {
                expected: vec![self.len(), expected_cols],
                got: self.features.shape_vec(),
            });
        }
        if let Some(&label) = self.labels.iter().find(|&&l| l >= n_classes) {
            return Err(ClassifyError::LabelOutOfRange { label, n_classes });
        }
        if !self.features.is_all_finite() {
            return Err(ClassifyError::NumericInstability(
                "dataset contains non-finite feature values".into(),
            ));
        }
        Ok(())
    }

    /// Row indices of every class, in dataset order.
    pub fn class_indices(&self, n_classes: usize) -> ClassifyResult<Vec<Vec<usize>>> {
        let mut groups = vec![Vec::new(); n_classes];
        for (i, &label) in self.labels.iter().enumerate() {
            groups
                .get_mut(label)
                .ok_or(ClassifyError::LabelOutOfRange { label, n_classes })?
                .push(i);
        }
        Ok(groups)
    }

    /// One feature matrix per class, in class order.
    pub fn group_by_class(&self, n_classes: usize) -> ClassifyResult<Vec<Tensor<T>>> {
        self.class_indices(n_classes)?
            .iter()
            .map(|idx| self.features.select_rows(idx))
            .collect()
    }

    /// Subset by row indices.
    pub fn select(&self, indices: &[usize]) -> ClassifyResult<Self> {
        let labels = indices
            .iter()
            .map(|&i| {
                self.labels.get(i).copied().ok_or(ClassifyError::IndexOutOfBounds {
                    index: i,
                    axis: 0,
                    size: self.len(),
                })
            })
            .collect::<ClassifyResult<Vec<_>>>()?;
        Dataset::new(self.features.select_rows(indices)?, labels)
    }
}

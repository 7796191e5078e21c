use std::collections::BTreeSet;

use patternml_core::error::ClassifyResult;
use patternml_core::{ClassifyError, Dataset, Float, Tensor};

/// Drops the listed feature columns. Order and duplicates in `columns`
/// do not matter; an index past the last column is an error.
pub fn remove_features<T: Float>(
    data: &Dataset<T>,
    columns: &[usize],
) -> ClassifyResult<Dataset<T>> {
    let n_cols = data.n_features();
    let drop: BTreeSet<usize> = columns.iter().copied().collect();
    if let Some(&bad) = drop.iter().find(|&&c| c >= n_cols) {
        return Err(ClassifyError::IndexOutOfBounds {
            index: bad,
            axis: 1,
            size: n_cols,
        });
    }
    if drop.len() == n_cols {
        return Err(ClassifyError::InvalidParameter(
            "cannot remove every feature".into(),
        ));
    }
    let keep: Vec<usize> = (0..n_cols).filter(|c| !drop.contains(c)).collect();
    data.with_features(data.features().select_cols(&keep)?)
}

/// Appends a constant `1.0` column, the bias input expected by the linear
/// classifier.
pub fn augment_bias<T: Float>(data: &Dataset<T>) -> ClassifyResult<Dataset<T>> {
    let (rows, cols) = data.features().matrix_dims()?;
    let mut out = Vec::with_capacity(rows * (cols + 1));
    for row in data.features().rows()? {
        out.extend_from_slice(row);
        out.push(T::ONE);
    }
    data.with_features(Tensor::new(out, vec![rows, cols + 1])?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset<f64> {
        Dataset::from_rows(
            &[vec![1.0, 2.0, 3.0, 4.0], vec![5.0, 6.0, 7.0, 8.0]],
            vec![0, 1],
        )
        .unwrap()
    }

    #[test]
    fn test_remove_features() {
        let d = remove_features(&sample(), &[2, 0, 2]).unwrap();
        assert_eq!(d.n_features(), 2);
        assert_eq!(d.row(0).unwrap(), &[2.0, 4.0]);
        assert_eq!(d.row(1).unwrap(), &[6.0, 8.0]);
        assert_eq!(d.labels(), &[0, 1]);
    }

    #[test]
    fn test_remove_features_errors() {
        assert!(remove_features(&sample(), &[4]).unwrap_err().is_input_shape());
        assert!(remove_features(&sample(), &[0, 1, 2, 3]).is_err());
        assert_eq!(remove_features(&sample(), &[]).unwrap(), sample());
    }

    #[test]
    fn test_augment_bias() {
        let d = augment_bias(&sample()).unwrap();
        assert_eq!(d.n_features(), 5);
        assert_eq!(d.row(1).unwrap(), &[5.0, 6.0, 7.0, 8.0, 1.0]);
    }
}

use log::debug;
use patternml_core::error::ClassifyResult;
use patternml_core::{ClassifyError, Dataset, Float};

/// Which end of each class block becomes training data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SplitOrder {
    /// First `n_training` rows of each block train, the rest test.
    #[default]
    Head,
    /// Last `n_training` rows of each block train, the first rows test.
    Tail,
}

/// Splits a dataset stored as consecutive class blocks of `n_per_class`
/// rows into `(training, test)`.
///
/// Both halves keep class-block order. Every row lands in exactly one half.
pub fn split_per_class<T: Float>(
    data: &Dataset<T>,
    n_per_class: usize,
    n_training: usize,
    order: SplitOrder,
) -> ClassifyResult<(Dataset<T>, Dataset<T>)> {
    if n_per_class == 0 {
        return Err(ClassifyError::InvalidParameter(
            "n_per_class must be at least 1".into(),
        ));
    }
    if n_training > n_per_class {
        return Err(ClassifyError::InvalidParameter(format!(
            "n_training {} exceeds the {} samples per class",
            n_training, n_per_class
        )));
    }
    if data.len() % n_per_class != 0 {
        return Err(ClassifyError::ShapeMismatch {
            expected: vec![n_per_class],
            got: vec![data.len()],
        });
    }

    let n_classes = data.len() / n_per_class;
    let n_test = n_per_class - n_training;
    let mut train_idx = Vec::with_capacity(n_classes * n_training);
    let mut test_idx = Vec::with_capacity(n_classes * n_test);

    for class in 0..n_classes {
        let start = class * n_per_class;
        let end = start + n_per_class;
        match order {
            SplitOrder::Head => {
                train_idx.extend(start..start + n_training);
                test_idx.extend(start + n_training..end);
            }
            SplitOrder::Tail => {
                test_idx.extend(start..start + n_test);
                train_idx.extend(start + n_test..end);
            }
        }
    }

    debug!(
        "split {} blocks of {}: {} training / {} test rows ({:?})",
        n_classes,
        n_per_class,
        train_idx.len(),
        test_idx.len(),
        order
    );

    Ok((data.select(&train_idx)?, data.select(&test_idx)?))
}

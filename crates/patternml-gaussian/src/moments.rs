use patternml_core::error::ClassifyResult;
use patternml_core::{ClassifyError, Float, Tensor};

/// Sample mean and unbiased (n - 1) covariance of the rows of `x`.
///
/// With `diagonal` set, off-diagonal entries are left at zero.
pub fn mean_and_covariance<T: Float>(
    x: &Tensor<T>,
    diagonal: bool,
) -> ClassifyResult<(Vec<T>, Tensor<T>)> {
    let (n, p) = x.matrix_dims()?;
    if n < 2 {
        return Err(ClassifyError::EmptyInput(
            "covariance needs at least two rows",
        ));
    }
    let mean = x.mean_cols()?;

    let mut cov = vec![T::ZERO; p * p];
    for row in x.rows()? {
        for i in 0..p {
            let di = row[i] - mean[i];
            if diagonal {
                cov[i * p + i] += di * di;
                continue;
            }
            for j in i..p {
                cov[i * p + j] += di * (row[j] - mean[j]);
            }
        }
    }

    let denom = T::from_usize(n - 1);
    for i in 0..p {
        for j in i..p {
            let v = cov[i * p + j] / denom;
            cov[i * p + j] = v;
            cov[j * p + i] = v;
        }
    }

    Ok((mean, Tensor::new(cov, vec![p, p])?))
}

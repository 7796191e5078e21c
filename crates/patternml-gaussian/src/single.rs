use log::{debug, info};
use patternml_core::error::ClassifyResult;
use patternml_core::{
    argmax, Classifier, ClassifyError, Dataset, Float, Predictor, ProblemConfig, Tensor,
};
use patternml_linalg::{cholesky, Cholesky};
use serde::Serialize;

use crate::density::log_density_full;
use crate::moments::mean_and_covariance;

/// Covariance structure estimated per class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CovarianceKind {
    /// Full sample covariance.
    Full,
    /// Variances only; features treated as independent.
    Diagonal,
}

/// One multivariate Gaussian per class, classified by maximum likelihood
/// (uniform class priors).
#[derive(Debug, Clone)]
pub struct GaussianDensityClassifier {
    config: ProblemConfig,
    kind: CovarianceKind,
}

impl GaussianDensityClassifier {
    pub fn new(config: ProblemConfig, kind: CovarianceKind) -> Self {
        GaussianDensityClassifier { config, kind }
    }

    pub fn config(&self) -> &ProblemConfig {
        &self.config
    }

    pub fn kind(&self) -> CovarianceKind {
        self.kind
    }
}

impl<T: Float> Classifier<T> for GaussianDensityClassifier {
    type Model = GaussianModel<T>;

    fn train(&self, data: &Dataset<T>) -> ClassifyResult<GaussianModel<T>> {
        let n_classes = self.config.n_classes();
        data.validate(n_classes, self.config.n_features())?;

        let groups = data.group_by_class(n_classes)?;
        let mut classes = Vec::with_capacity(n_classes);

        for (class, rows) in groups.iter().enumerate() {
            let (n, _) = rows.matrix_dims()?;
            if n < 2 {
                return Err(ClassifyError::DegenerateStatistics {
                    class,
                    reason: format!("{} training samples, covariance needs at least 2", n),
                });
            }

            let (mean, covariance) =
                mean_and_covariance(rows, self.kind == CovarianceKind::Diagonal)?;
            let chol = cholesky(&covariance).map_err(|_| ClassifyError::DegenerateStatistics {
                class,
                reason: "covariance matrix is not positive definite".into(),
            })?;
            debug!(
                "class {} ({}): {} samples, log|Σ| = {:.4}",
                class,
                self.config.class_label(class).unwrap_or("?"),
                n,
                chol.log_det()
            );

            classes.push(ClassGaussian {
                mean,
                covariance,
                chol,
            });
        }

        info!(
            "trained {:?}-covariance gaussian classifier ({}): {} classes, {} samples",
            self.kind,
            self.config.name(),
            n_classes,
            data.len()
        );

        Ok(GaussianModel {
            kind: self.kind,
            classes,
        })
    }
}

/// Mean and covariance of one class.
#[derive(Debug, Clone, Serialize)]
#[serde(bound = "T: Float")]
pub struct ClassGaussian<T: Float> {
    mean: Vec<T>,
    covariance: Tensor<T>,
    #[serde(skip)]
    chol: Cholesky<T>,
}

impl<T: Float> ClassGaussian<T> {
    pub fn mean(&self) -> &[T] {
        &self.mean
    }

    pub fn covariance(&self) -> &Tensor<T> {
        &self.covariance
    }

    pub fn log_density(&self, row: &[T]) -> ClassifyResult<T> {
        log_density_full(row, &self.mean, &self.chol)
    }
}

/// Trained per-class Gaussians.
#[derive(Debug, Clone, Serialize)]
#[serde(bound = "T: Float")]
pub struct GaussianModel<T: Float> {
    kind: CovarianceKind,
    classes: Vec<ClassGaussian<T>>,
}

impl<T: Float> GaussianModel<T> {
    pub fn kind(&self) -> CovarianceKind {
        self.kind
    }

    pub fn classes(&self) -> &[ClassGaussian<T>] {
        &self.classes
    }

    fn class(&self, class: usize) -> ClassifyResult<&ClassGaussian<T>> {
        self.classes.get(class).ok_or(ClassifyError::LabelOutOfRange {
            label: class,
            n_classes: self.classes.len(),
        })
    }

    pub fn log_density(&self, class: usize, row: &[T]) -> ClassifyResult<T> {
        self.class(class)?.log_density(row)
    }

    /// Class-conditional density N(row | μ_c, Σ_c).
    pub fn density(&self, class: usize, row: &[T]) -> ClassifyResult<T> {
        Ok(self.log_density(class, row)?.exp())
    }
}

impl<T: Float> Predictor<T> for GaussianModel<T> {
    fn n_classes(&self) -> usize {
        self.classes.len()
    }

    fn predict_row(&self, row: &[T]) -> ClassifyResult<usize> {
        let scores = self
            .classes
            .iter()
            .map(|c| c.log_density(row))
            .collect::<ClassifyResult<Vec<T>>>()?;
        argmax(&scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn one_feature() -> ProblemConfig {
        ProblemConfig::new("toy", vec!["narrow".into(), "wide".into()], 1).unwrap()
    }

    /// Both classes centred on 0; sample variances 1 and 4.
    fn same_mean() -> Dataset<f64> {
        Dataset::from_rows(
            &[
                vec![-1.0],
                vec![0.0],
                vec![1.0],
                vec![-2.0],
                vec![0.0],
                vec![2.0],
            ],
            vec![0, 0, 0, 1, 1, 1],
        )
        .unwrap()
    }

    #[test]
    fn test_narrow_class_wins_at_mean() {
        let _ = env_logger::builder().is_test(true).try_init();
        let clf = GaussianDensityClassifier::new(one_feature(), CovarianceKind::Diagonal);
        let model: GaussianModel<f64> = clf.train(&same_mean()).unwrap();

        assert_abs_diff_eq!(model.classes()[0].covariance().get(&[0, 0]).unwrap(), 1.0);
        assert_abs_diff_eq!(model.classes()[1].covariance().get(&[0, 0]).unwrap(), 4.0);

        // N(0|0,1) / N(0|0,4) = σ_wide / σ_narrow = 2
        let ratio = model.density(0, &[0.0]).unwrap() / model.density(1, &[0.0]).unwrap();
        assert_abs_diff_eq!(ratio, 2.0, epsilon = 1e-12);
        assert_eq!(model.predict_row(&[0.0]).unwrap(), 0);
        assert_eq!(model.predict_row(&[0.1]).unwrap(), 0);

        // Far in the tails the wide class takes over.
        assert_eq!(model.predict_row(&[3.0]).unwrap(), 1);
    }

    #[test]
    fn test_full_and_diagonal_differ_on_correlated_data() {
        let config = ProblemConfig::new("toy2", vec!["a".into(), "b".into()], 2).unwrap();
        let data = Dataset::from_rows(
            &[
                vec![0.0, 0.1],
                vec![1.0, 0.9],
                vec![2.0, 2.2],
                vec![3.0, 2.9],
                vec![0.0, 3.0],
                vec![1.0, 2.1],
                vec![2.0, 0.9],
                vec![3.0, 0.1],
            ],
            vec![0, 0, 0, 0, 1, 1, 1, 1],
        )
        .unwrap();

        let full: GaussianModel<f64> =
            GaussianDensityClassifier::new(config.clone(), CovarianceKind::Full)
                .train(&data)
                .unwrap();
        let diag: GaussianModel<f64> =
            GaussianDensityClassifier::new(config, CovarianceKind::Diagonal)
                .train(&data)
                .unwrap();

        assert!(full.classes()[0].covariance().get(&[0, 1]).unwrap() > 0.0);
        assert!(full.classes()[1].covariance().get(&[0, 1]).unwrap() < 0.0);
        assert_eq!(diag.classes()[0].covariance().get(&[0, 1]).unwrap(), 0.0);

        // Class 0 rises along y = x, class 1 falls along y = 3 - x; both
        // share the same mean. Only the full model sees the orientation.
        let on_diagonal = [2.5, 2.55];
        assert_eq!(full.predict_row(&on_diagonal).unwrap(), 0);
        let off_diagonal = [0.5, 2.5];
        assert_eq!(full.predict_row(&off_diagonal).unwrap(), 1);
        // Without the covariance term the slightly tighter y spread of
        // class 0 decides.
        assert_eq!(diag.predict_row(&off_diagonal).unwrap(), 0);
        assert_ne!(
            diag.predict_row(&off_diagonal).unwrap(),
            full.predict_row(&off_diagonal).unwrap()
        );
        assert_eq!(full.predict(data.features()).unwrap(), data.labels());
    }

    #[test]
    fn test_too_few_samples() {
        let data = Dataset::from_rows(&[vec![0.0], vec![1.0], vec![2.0]], vec![0, 0, 1]).unwrap();
        let clf = GaussianDensityClassifier::new(one_feature(), CovarianceKind::Full);
        let err = Classifier::<f64>::train(&clf, &data).unwrap_err();
        assert!(matches!(err, ClassifyError::DegenerateStatistics { class: 1, .. }));
    }

    #[test]
    fn test_singular_covariance() {
        // Class 0 has a constant feature: zero variance.
        let config = ProblemConfig::new("toy2", vec!["a".into(), "b".into()], 2).unwrap();
        let data = Dataset::from_rows(
            &[
                vec![1.0, 5.0],
                vec![2.0, 5.0],
                vec![3.0, 5.0],
                vec![0.0, 1.0],
                vec![1.0, 0.0],
                vec![2.0, 2.0],
            ],
            vec![0, 0, 0, 1, 1, 1],
        )
        .unwrap();
        let clf = GaussianDensityClassifier::new(config, CovarianceKind::Diagonal);
        let err = Classifier::<f64>::train(&clf, &data).unwrap_err();
        assert!(matches!(err, ClassifyError::DegenerateStatistics { class: 0, .. }));
    }

    #[test]
    fn test_predict_rejects_wrong_width() {
        let clf = GaussianDensityClassifier::new(one_feature(), CovarianceKind::Full);
        let model: GaussianModel<f64> = clf.train(&same_mean()).unwrap();
        assert!(model.predict_row(&[0.0, 1.0]).unwrap_err().is_input_shape());
        assert_eq!(model.predict_row(&[0.4]).unwrap(), model.predict_row(&[0.4]).unwrap());
    }
}

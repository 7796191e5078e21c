use patternml::core::{Classifier, Dataset, Predictor, ProblemConfig, Tensor};
use patternml::gaussian::{CovarianceKind, GaussianDensityClassifier};
use patternml::linear::LinearGradientClassifier;
use patternml::mixture::GaussianMixtureClassifier;
use approx::assert_abs_diff_eq;
use patternml::preprocessing::{
    augment_bias, normalize_by_max, remove_features, split_per_class, SplitOrder,
};
use patternml::{evaluate, Evaluation, TrainedModel};

const PER_CLASS: usize = 10;
const N_TRAINING: usize = 7;

/// Ten samples of each species, in class blocks.
fn iris_subset() -> Dataset<f64> {
    #[rustfmt::skip]
    let features: Vec<f64> = vec![
        // Setosa
        5.1,3.5,1.4,0.2, 4.9,3.0,1.4,0.2, 4.7,3.2,1.3,0.2, 4.6,3.1,1.5,0.2,
        5.0,3.6,1.4,0.2, 5.4,3.9,1.7,0.4, 4.6,3.4,1.4,0.3, 5.0,3.4,1.5,0.2,
        4.4,2.9,1.4,0.2, 4.9,3.1,1.5,0.1,
        // Versicolor
        7.0,3.2,4.7,1.4, 6.4,3.2,4.5,1.5, 6.9,3.1,4.9,1.5, 5.5,2.3,4.0,1.3,
        6.5,2.8,4.6,1.5, 5.7,2.8,4.5,1.3, 6.3,3.3,4.7,1.6, 4.9,2.4,3.3,1.0,
        6.6,2.9,4.6,1.3, 5.2,2.7,3.9,1.4,
        // Virginica
        6.3,3.3,6.0,2.5, 5.8,2.7,5.1,1.9, 7.1,3.0,5.9,2.1, 6.3,2.9,5.6,1.8,
        6.5,3.0,5.8,2.2, 7.6,3.0,6.6,2.1, 4.9,2.5,4.5,1.7, 7.3,2.9,6.3,1.8,
        6.7,2.5,5.8,1.8, 7.2,3.6,6.1,2.5,
    ];
    let labels: Vec<usize> = (0..3 * PER_CLASS).map(|i| i / PER_CLASS).collect();
    Dataset::new(Tensor::new(features, vec![30, 4]).unwrap(), labels).unwrap()
}

fn prepared(order: SplitOrder) -> (Dataset<f64>, Dataset<f64>) {
    let normalized = normalize_by_max(&iris_subset()).unwrap();
    split_per_class(&normalized, PER_CLASS, N_TRAINING, order).unwrap()
}

/// The reported error rate is the percentage of mismatched predictions.
fn check_error_rate(eval: &Evaluation, test: &Dataset<f64>) {
    let wrong = eval
        .predictions
        .iter()
        .zip(test.labels())
        .filter(|(p, a)| p != a)
        .count();
    let expected = 100.0 * wrong as f64 / test.len() as f64;
    assert_abs_diff_eq!(eval.error_rate, expected, epsilon = 1e-9);
}

fn setosa_all_correct(model: &TrainedModel<f64>, test: &Dataset<f64>) -> bool {
    test.iter()
        .filter(|&(_, label)| label == 0)
        .all(|(row, _)| model.predict_row(row).unwrap() == 0)
}

#[test]
fn linear_pipeline() {
    let _ = env_logger::builder().is_test(true).try_init();
    for order in [SplitOrder::Head, SplitOrder::Tail] {
        let (train, test) = prepared(order);
        let (train, test) = (augment_bias(&train).unwrap(), augment_bias(&test).unwrap());

        let clf = LinearGradientClassifier::with_defaults(ProblemConfig::iris());
        let model: TrainedModel<f64> = clf.train(&train).unwrap().into();
        let eval = evaluate(&model, &test).unwrap();

        assert_eq!(eval.confusion.total(), 9);
        check_error_rate(&eval, &test);
        assert!(eval.error_rate <= 100.0 / 9.0 + 1e-9, "{:?}: {}", order, eval.error_rate);
        assert!(setosa_all_correct(&model, &test));

        if let TrainedModel::Linear(m) = &model {
            let history = m.loss_history();
            assert_eq!(history.len(), 4000);
            assert!(history[history.len() - 1] < history[0]);
        }
    }
}

#[test]
fn gaussian_pipeline() {
    let _ = env_logger::builder().is_test(true).try_init();
    let (train, test) = prepared(SplitOrder::Head);

    let full: TrainedModel<f64> =
        GaussianDensityClassifier::new(ProblemConfig::iris(), CovarianceKind::Full)
            .train(&train)
            .unwrap()
            .into();
    let full_eval = evaluate(&full, &test).unwrap();
    check_error_rate(&full_eval, &test);
    assert!(full_eval.error_rate <= 100.0 / 9.0 + 1e-9);

    let diag: TrainedModel<f64> =
        GaussianDensityClassifier::new(ProblemConfig::iris(), CovarianceKind::Diagonal)
            .train(&train)
            .unwrap()
            .into();
    let diag_eval = evaluate(&diag, &test).unwrap();
    check_error_rate(&diag_eval, &test);
    assert!(diag_eval.error_rate <= 200.0 / 9.0 + 1e-9);
    assert!(setosa_all_correct(&diag, &test));
}

#[test]
fn mixture_pipeline() {
    let _ = env_logger::builder().is_test(true).try_init();
    let (train, test) = prepared(SplitOrder::Tail);

    let clf = GaussianMixtureClassifier::new(ProblemConfig::iris(), 2, 1e-4).unwrap();
    let model: TrainedModel<f64> = clf.train(&train).unwrap().into();
    assert_eq!(model.kind(), "mixture");

    let eval = evaluate(&model, &test).unwrap();
    assert_eq!(eval.confusion.total(), 9);
    check_error_rate(&eval, &test);
    assert!(eval.error_rate < 34.0);
    assert!(setosa_all_correct(&model, &test));

    // Same seed, same predictions.
    let again: TrainedModel<f64> = clf.train(&train).unwrap().into();
    assert_eq!(evaluate(&again, &test).unwrap().predictions, eval.predictions);
}

#[test]
fn feature_removal_keeps_pipeline_consistent() {
    let (train, test) = prepared(SplitOrder::Head);
    // Keep the petal measurements only.
    let train = remove_features(&train, &[0, 1]).unwrap();
    let test = remove_features(&test, &[0, 1]).unwrap();
    let config = ProblemConfig::iris().with_n_features(2).unwrap();

    let model: TrainedModel<f64> = GaussianDensityClassifier::new(config, CovarianceKind::Full)
        .train(&train)
        .unwrap()
        .into();
    let eval = evaluate(&model, &test).unwrap();
    check_error_rate(&eval, &test);
    assert!(eval.error_rate < 34.0);

    // The original four-feature config no longer fits the data.
    let clf = GaussianDensityClassifier::new(ProblemConfig::iris(), CovarianceKind::Full);
    assert!(Classifier::<f64>::train(&clf, &train).is_err());
}

use patternml_core::error::ClassifyResult;
use patternml_core::ClassifyError;
use serde::Serialize;

/// N×N count matrix indexed `[predicted][actual]`.
///
/// Row `i` holds every sample the model called class `i`; column `j` holds
/// every sample whose true class is `j`. The diagonal counts hits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    counts: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    pub fn build(
        predictions: &[usize],
        actual: &[usize],
        n_classes: usize,
    ) -> ClassifyResult<Self> {
        if predictions.len() != actual.len() {
            return Err(ClassifyError::ShapeMismatch {
                expected: vec![actual.len()],
                got: vec![predictions.len()],
            });
        }
        let mut counts = vec![vec![0usize; n_classes]; n_classes];
        for (&p, &a) in predictions.iter().zip(actual) {
            for label in [p, a] {
                if label >= n_classes {
                    return Err(ClassifyError::LabelOutOfRange { label, n_classes });
                }
            }
            counts[p][a] += 1;
        }
        Ok(ConfusionMatrix { counts })
    }

    pub fn n_classes(&self) -> usize {
        self.counts.len()
    }

    pub fn rows(&self) -> &[Vec<usize>] {
        &self.counts
    }

    pub fn get(&self, predicted: usize, actual: usize) -> ClassifyResult<usize> {
        let n = self.n_classes();
        self.counts
            .get(predicted)
            .and_then(|row| row.get(actual))
            .copied()
            .ok_or(ClassifyError::LabelOutOfRange {
                label: predicted.max(actual),
                n_classes: n,
            })
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    pub fn trace(&self) -> usize {
        self.counts.iter().enumerate().map(|(i, row)| row[i]).sum()
    }

    /// Fraction of samples on the diagonal.
    pub fn accuracy(&self) -> ClassifyResult<f64> {
        let total = self.total();
        if total == 0 {
            return Err(ClassifyError::EmptyInput("confusion matrix has no samples"));
        }
        Ok(self.trace() as f64 / total as f64)
    }

    /// Misclassification percentage, `(1 - trace / total) · 100`.
    pub fn error_rate(&self) -> ClassifyResult<f64> {
        Ok((1.0 - self.accuracy()?) * 100.0)
    }

    /// Hits over everything predicted as `class` (its row). 0 when the
    /// class was never predicted.
    pub fn precision(&self, class: usize) -> ClassifyResult<f64> {
        let hits = self.get(class, class)?;
        let predicted: usize = self.counts[class].iter().sum();
        Ok(ratio(hits, predicted))
    }

    /// Hits over every sample that truly is `class` (its column). 0 when
    /// the class never occurs.
    pub fn recall(&self, class: usize) -> ClassifyResult<f64> {
        let hits = self.get(class, class)?;
        let actual: usize = self.counts.iter().map(|row| row[class]).sum();
        Ok(ratio(hits, actual))
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

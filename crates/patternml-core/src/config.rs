use serde::{Deserialize, Serialize};

use crate::error::{ClassifyError, ClassifyResult};

/// Fixed description of a classification problem: the class vocabulary and
/// how many feature columns each sample carries.
///
/// Built once and handed to every classifier; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemConfig {
    name: String,
    class_labels: Vec<String>,
    n_features: usize,
}

impl ProblemConfig {
    pub fn new<S: Into<String>>(
        name: S,
        class_labels: Vec<String>,
        n_features: usize,
    ) -> ClassifyResult<Self> {
        if class_labels.len() < 2 {
            return Err(ClassifyError::InvalidParameter(format!(
                "a classification problem needs at least 2 classes, got {}",
                class_labels.len()
            )));
        }
        if n_features == 0 {
            return Err(ClassifyError::InvalidParameter(
                "a classification problem needs at least 1 feature".into(),
            ));
        }
        Ok(ProblemConfig {
            name: name.into(),
            class_labels,
            n_features,
        })
    }

    /// Fisher's Iris measurements: 3 species, 4 features.
    pub fn iris() -> Self {
        ProblemConfig {
            name: "iris".into(),
            class_labels: ["Setosa", "Versicolor", "Virginica"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            n_features: 4,
        }
    }

    /// Hillenbrand vowel formants: 12 vowels, 9 features
    /// (F0, F1–F3 at steady state, F1–F3 at 20% and 50% of duration).
    pub fn vowels() -> Self {
        ProblemConfig {
            name: "vowels".into(),
            class_labels: [
                "ae", "ah", "aw", "eh", "er", "ei", "ih", "iy", "oa", "oo", "uh", "uw",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            n_features: 9,
        }
    }

    /// Same classes with a different feature count, e.g. after a feature
    /// selection step removed columns.
    pub fn with_n_features(&self, n_features: usize) -> ClassifyResult<Self> {
        ProblemConfig::new(self.name.clone(), self.class_labels.clone(), n_features)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn n_classes(&self) -> usize {
        self.class_labels.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn class_labels(&self) -> &[String] {
        &self.class_labels
    }

    pub fn class_label(&self, class: usize) -> Option<&str> {
        self.class_labels.get(class).map(String::as_str)
    }

    pub fn class_index(&self, label: &str) -> Option<usize> {
        self.class_labels.iter().position(|l| l == label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let iris = ProblemConfig::iris();
        assert_eq!(iris.n_classes(), 3);
        assert_eq!(iris.n_features(), 4);
        assert_eq!(iris.class_label(2), Some("Virginica"));

        let vowels = ProblemConfig::vowels();
        assert_eq!(vowels.n_classes(), 12);
        assert_eq!(vowels.class_index("iy"), Some(7));
        assert_eq!(vowels.class_index("xx"), None);
    }

    #[test]
    fn test_feature_selection_keeps_classes() {
        let reduced = ProblemConfig::iris().with_n_features(2).unwrap();
        assert_eq!(reduced.n_features(), 2);
        assert_eq!(reduced.n_classes(), 3);
        assert!(ProblemConfig::iris().with_n_features(0).is_err());
    }

    #[test]
    fn test_rejects_single_class() {
        assert!(ProblemConfig::new("one", vec!["a".into()], 2).is_err());
    }
}

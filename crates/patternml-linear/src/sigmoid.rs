use patternml_core::Float;

/// Logistic function 1 / (1 + e^(-z)).
///
/// Evaluated as e^z / (1 + e^z) for negative z so `exp` never overflows.
#[inline]
pub fn sigmoid<T: Float>(z: T) -> T {
    if z >= T::ZERO {
        T::ONE / (T::ONE + (-z).exp())
    } else {
        let e = z.exp();
        e / (T::ONE + e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_sigmoid_values() {
        assert_eq!(sigmoid(0.0f64), 0.5);
        assert_abs_diff_eq!(sigmoid(2.0f64), 1.0 / (1.0 + (-2.0f64).exp()), epsilon = 1e-15);
        assert_abs_diff_eq!(sigmoid(-2.0f64), 1.0 - sigmoid(2.0f64), epsilon = 1e-15);
    }

    #[test]
    fn test_sigmoid_extremes_stay_finite() {
        assert_eq!(sigmoid(1000.0f64), 1.0);
        assert_eq!(sigmoid(-1000.0f64), 0.0);
        assert!(sigmoid(-745.0f64).is_finite());
        assert_eq!(sigmoid(200.0f32), 1.0);
        assert_eq!(sigmoid(-200.0f32), 0.0);
    }
}

//! Linear model representation.

/// Logistic-regression weights: `margin = bias + Σ wᵢ·xᵢ`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    weights: Box<[f64]>,
    bias: f64,
}

impl LinearModel {
    pub fn new(weights: Vec<f64>, bias: f64) -> Self {
        Self { weights: weights.into_boxed_slice(), bias }
    }

    #[inline]
    pub fn n_features(&self) -> usize {
        self.weights.len()
    }

    #[inline]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    #[inline]
    pub fn bias(&self) -> f64 {
        self.bias
    }

    /// Raw margin for one row.
    pub fn margin(&self, features: &[f32]) -> f64 {
        debug_assert_eq!(features.len(), self.weights.len());
        self.weights
            .iter()
            .zip(features)
            .fold(self.bias, |acc, (&w, &x)| acc + w * f64::from(x))
    }

    /// Whether every coefficient is finite.
    pub fn is_finite(&self) -> bool {
        self.bias.is_finite() && self.weights.iter().all(|w| w.is_finite())
    }
}

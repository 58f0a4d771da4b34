use serde::{Deserialize, Serialize};

/// Body weight used when the profile doesn't have one.
pub const DEFAULT_BODY_WEIGHT_KG: f64 = 75.0;

/// Read-only user data the engines need.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub body_weight_kg: Option<f64>,
}

impl Profile {
    pub fn with_weight(body_weight_kg: f64) -> Self {
        Self {
            body_weight_kg: Some(body_weight_kg),
        }
    }

    /// Weight in kg; unknown or non-positive values fall back to 75.
    pub fn weight_kg(&self) -> f64 {
        match self.body_weight_kg {
            Some(kg) if kg.is_finite() && kg > 0.0 => kg,
            _ => DEFAULT_BODY_WEIGHT_KG,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_weight_defaults() {
        assert_eq!(Profile::default().weight_kg(), 75.0);
        assert_eq!(Profile::with_weight(-3.0).weight_kg(), 75.0);
        assert_eq!(Profile::with_weight(82.5).weight_kg(), 82.5);
    }
}

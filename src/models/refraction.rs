use serde::{Deserialize, Serialize};

/// Refractive error measurement. A value only exists when the sphere was
/// recorded; cylinder and axis are independently optional.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RefractiveError {
    /// Diopters.
    pub sphere: f64,
    /// Diopters.
    pub cylinder: Option<f64>,
    /// Degrees.
    pub axis: Option<f64>,
}

impl RefractiveError {
    pub fn new(sphere: f64) -> Self {
        Self {
            sphere,
            cylinder: None,
            axis: None,
        }
    }

    pub fn with_cylinder(mut self, cylinder: Option<f64>) -> Self {
        self.cylinder = cylinder;
        self
    }

    pub fn with_axis(mut self, axis: Option<f64>) -> Self {
        self.axis = axis;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sphere_only() {
        let re = RefractiveError::new(-1.25);
        assert_eq!(re.sphere, -1.25);
        assert!(re.cylinder.is_none());
        assert!(re.axis.is_none());
    }

    #[test]
    fn full_measurement() {
        let re = RefractiveError::new(0.5)
            .with_cylinder(Some(-0.75))
            .with_axis(Some(90.0));
        assert_eq!(re.cylinder, Some(-0.75));
        assert_eq!(re.axis, Some(90.0));
    }
}

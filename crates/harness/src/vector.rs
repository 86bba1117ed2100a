//! Test vectors

use std::sync::Arc;

/// Expected value for a test input
#[derive(Clone)]
pub enum Reference {
    /// Computed from the input by a known function
    Function(Arc<dyn Fn(f32) -> f32 + Send + Sync>),
    /// Fixed golden value
    Golden(f32),
}

impl Reference {
    pub fn function(f: impl Fn(f32) -> f32 + Send + Sync + 'static) -> Self {
        Reference::Function(Arc::new(f))
    }

    pub fn evaluate(&self, input: f32) -> f32 {
        match self {
            Reference::Function(f) => f(input),
            Reference::Golden(value) => *value,
        }
    }
}

impl std::fmt::Debug for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Reference::Function(_) => f.write_str("Reference::Function(..)"),
            Reference::Golden(value) => f.debug_tuple("Reference::Golden").field(value).finish(),
        }
    }
}

/// One input with its reference
#[derive(Debug, Clone)]
pub struct TestVector {
    pub input: f32,
    pub reference: Reference,
    pub label: Option<String>,
}

impl TestVector {
    /// Vector whose reference is `f(input)`
    pub fn new(input: f32, f: impl Fn(f32) -> f32 + Send + Sync + 'static) -> Self {
        Self {
            input,
            reference: Reference::function(f),
            label: None,
        }
    }

    /// Vector with a fixed expected value
    pub fn golden(input: f32, expected: f32) -> Self {
        Self {
            input,
            reference: Reference::Golden(expected),
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Reference value for this vector's input
    pub fn expected(&self) -> f32 {
        self.reference.evaluate(self.input)
    }
}

/// The four sine acceptance vectors
pub fn sine_vectors() -> Vec<TestVector> {
    [0.77, 1.57, 2.3, 3.14]
        .into_iter()
        .map(|x| TestVector::new(x, f32::sin).with_label(format!("sin({})", x)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sine_vectors() {
        let vectors = sine_vectors();
        assert_eq!(vectors.len(), 4);
        assert_eq!(vectors[0].input, 0.77);
        assert!((vectors[0].expected() - 0.6961).abs() < 1e-4);
        assert!((vectors[1].expected() - 1.0).abs() < 1e-4);
        assert!((vectors[2].expected() - 0.7457).abs() < 1e-4);
        assert!((vectors[3].expected() - 0.0016).abs() < 1e-4);
        assert_eq!(vectors[3].label.as_deref(), Some("sin(3.14)"));
    }

    #[test]
    fn test_capturing_reference() {
        let (gain, offset) = (2.0f32, 0.25f32);
        let vector = TestVector::new(1.5, move |x| gain * x + offset).with_label("affine");
        assert_eq!(vector.expected(), 3.25);

        let copy = vector.clone();
        assert_eq!(copy.expected(), 3.25);
        assert_eq!(format!("{:?}", copy.reference), "Reference::Function(..)");
    }

    #[test]
    fn test_golden() {
        let vector = TestVector::golden(2.0, 0.5);
        assert_eq!(vector.expected(), 0.5);
        assert!(vector.label.is_none());
    }
}

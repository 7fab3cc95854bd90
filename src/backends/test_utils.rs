//! Mock backends for testing the restoration pipeline without a model file

use crate::config::ServiceConfig;
use crate::error::{PipelineError, Result};
use crate::inference::InferenceBackend;
use ndarray::{Array2, Array4};

/// What the mock does with its input tensor
#[derive(Debug, Clone, Copy)]
enum MockBehavior {
    /// Echo the input back unchanged
    Identity,
    /// Return a constant-valued array of the given (height, width)
    Constant { height: usize, width: usize, value: f32 },
    /// Fail every inference call
    Failing,
}

/// Mock restoration backend for tests
#[derive(Debug, Clone)]
pub struct MockRestorationBackend {
    behavior: MockBehavior,
    initialized: bool,
    fail_init: bool,
}

impl MockRestorationBackend {
    /// Backend that echoes its input
    #[must_use]
    pub fn identity() -> Self {
        Self {
            behavior: MockBehavior::Identity,
            initialized: false,
            fail_init: false,
        }
    }

    /// Backend that returns a constant array of an arbitrary shape
    #[must_use]
    pub fn constant(height: usize, width: usize, value: f32) -> Self {
        Self {
            behavior: MockBehavior::Constant { height, width, value },
            initialized: false,
            fail_init: false,
        }
    }

    /// Backend whose inference always fails
    #[must_use]
    pub fn failing() -> Self {
        Self {
            behavior: MockBehavior::Failing,
            initialized: false,
            fail_init: false,
        }
    }

    /// Backend whose initialization fails
    #[must_use]
    pub fn failing_init() -> Self {
        Self {
            behavior: MockBehavior::Identity,
            initialized: false,
            fail_init: true,
        }
    }
}

impl InferenceBackend for MockRestorationBackend {
    fn initialize(&mut self, _config: &ServiceConfig) -> Result<()> {
        if self.fail_init {
            return Err(PipelineError::inference("mock initialization failure"));
        }
        self.initialized = true;
        Ok(())
    }

    fn infer(&mut self, input: &Array4<f32>) -> Result<Array2<f32>> {
        if !self.initialized {
            return Err(PipelineError::inference("backend not initialized"));
        }
        match self.behavior {
            MockBehavior::Identity => {
                let (_, _, height, width) = input.dim();
                let mut output = Array2::<f32>::zeros((height, width));
                for ((y, x), value) in output.indexed_iter_mut() {
                    *value = input[[0, 0, y, x]];
                }
                Ok(output)
            },
            MockBehavior::Constant { height, width, value } => {
                Ok(Array2::from_elem((height, width), value))
            },
            MockBehavior::Failing => Err(PipelineError::inference("mock inference failure")),
        }
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_identity() {
        let mut backend = MockRestorationBackend::identity();
        backend.initialize(&ServiceConfig::default()).unwrap();

        let mut input = Array4::<f32>::zeros((1, 1, 4, 4));
        input[[0, 0, 2, 3]] = 0.75;
        let output = backend.infer(&input).unwrap();
        assert!((output[[2, 3]] - 0.75).abs() < f32::EPSILON);
    }

    #[test]
    fn test_mock_failing_init() {
        let mut backend = MockRestorationBackend::failing_init();
        assert!(backend.initialize(&ServiceConfig::default()).is_err());
        assert!(!backend.is_initialized());
    }
}

use std::error::Error as StdError;

type BoxedError = Box<dyn StdError + Send + Sync>;

/// Errors from an Euler integration.
///
/// Model and problem failures carry the step being computed when they
/// occurred; step 0 is the initial model call.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("model failed at step {step}: {source}")]
    Model { step: usize, source: BoxedError },

    #[error("problem failed at step {step}: {source}")]
    Problem { step: usize, source: BoxedError },

    #[error("step size must be finite and positive, got {0}")]
    InvalidStep(f64),
}

impl Error {
    /// Returns the step at which a model or problem failure occurred.
    #[must_use]
    pub fn step(&self) -> Option<usize> {
        match self {
            Self::Model { step, .. } | Self::Problem { step, .. } => Some(*step),
            Self::InvalidStep(_) => None,
        }
    }

    pub(crate) fn model<E>(step: usize) -> impl FnOnce(E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        move |err| Self::Model {
            step,
            source: Box::new(err),
        }
    }

    pub(crate) fn problem<E>(step: usize) -> impl FnOnce(E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        move |err| Self::Problem {
            step,
            source: Box::new(err),
        }
    }
}

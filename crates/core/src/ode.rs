use crate::{DerivativeOf, StepIntegrable};

/// Adapts a [`Model`](crate::Model) to an ODE that an integrator can step.
///
/// The model sees a full input (state plus whatever parameters it needs) and
/// produces an output containing the state rates. The problem pulls the
/// integrable state out of the input, pulls the rates out of the output, and
/// rebuilds an input once the state has been stepped.
pub trait OdeProblem {
    type Input;
    type Output;
    type Delta;
    type State: StepIntegrable<Self::Delta>;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Extracts the integrable state from a model input.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the input does not carry a valid state.
    fn state(&self, input: &Self::Input) -> Result<Self::State, Self::Error>;

    /// Extracts the state derivative from a model input/output pair.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the derivative cannot be formed.
    fn derivative(
        &self,
        input: &Self::Input,
        output: &Self::Output,
    ) -> Result<DerivativeOf<Self::State, Self::Delta>, Self::Error>;

    /// Builds the next model input from a stepped state.
    ///
    /// `base` is the input the step started from; `delta` is the step taken.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the input cannot be built.
    fn build_input(
        &self,
        base: &Self::Input,
        state: &Self::State,
        delta: &Self::Delta,
    ) -> Result<Self::Input, Self::Error>;

    /// Adjusts an input after a step has been accepted.
    ///
    /// This is the place for bound enforcement on the state, such as keeping a
    /// volume non-negative after an explicit step overshoots.
    /// Returns the input unchanged by default.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the adjustment fails.
    fn finalize_step(
        &self,
        next_input: Self::Input,
        _prev_input: &Self::Input,
        _prev_output: &Self::Output,
        _delta: &Self::Delta,
    ) -> Result<Self::Input, Self::Error> {
        Ok(next_input)
    }
}

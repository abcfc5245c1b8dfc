/// A state that can be advanced by its derivative.
///
/// Stepping computes `state + derivative * delta`. `Delta` is usually a time
/// increment in seconds, but any independent variable works.
pub trait StepIntegrable<Delta> {
    /// The derivative of the state with respect to `Delta`.
    type Derivative;

    /// Returns the state after one explicit step.
    #[must_use]
    fn step(&self, derivative: Self::Derivative, delta: Delta) -> Self;
}

/// Shorthand for the derivative type of a [`StepIntegrable`] state.
pub type DerivativeOf<T, Delta> = <T as StepIntegrable<Delta>>::Derivative;

/// A callable model that maps a typed input to a typed output.
///
/// Models are pure: the same input always yields the same output and no
/// state is carried between calls. An optimizer or integrator may therefore
/// call a model many times per iteration, in any order, and across any number
/// of independent nodes.
pub trait Model {
    type Input;
    type Output;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Calls the model with the given input.
    ///
    /// # Errors
    ///
    /// Each model defines its own `Error` type for domain-specific failures.
    fn call(&self, input: &Self::Input) -> Result<Self::Output, Self::Error>;
}

/// A model that can also report the analytic partial derivatives of its
/// outputs with respect to its inputs.
///
/// The `Partials` type is model specific, usually a struct with one field per
/// output/input pair. Gradient-based solvers consume it in place of a
/// numerically approximated Jacobian.
pub trait Differentiable: Model {
    type Partials;

    /// Evaluates the partial derivatives at the given input.
    ///
    /// # Errors
    ///
    /// Returns the model's error type when the input lies outside the domain
    /// where the partials are defined.
    fn partials(&self, input: &Self::Input) -> Result<Self::Partials, Self::Error>;
}

/// A captured input/output pair from a model call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot<I, O> {
    pub input: I,
    pub output: O,
}

impl<I, O> Snapshot<I, O> {
    /// Creates a new snapshot from input and output values.
    pub fn new(input: I, output: O) -> Self {
        Self { input, output }
    }
}

use ninterp::error::ValidateError;
use thiserror::Error;

/// Errors from property lookups and charge calculations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PropertyError {
    /// A saturation lookup fell outside the tabulated range.
    #[error("{quantity} = {value} is outside the tabulated range [{min}, {max}]")]
    OutOfRange {
        quantity: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// The charge needs more liquid volume than the bottle holds.
    ///
    /// Indicates an invalid initial condition rather than a numerical artifact.
    #[error(
        "liquid volume {liquid_volume} m³ exceeds bottle volume {bottle_volume} m³; \
         the charge is too large for the bottle at these densities"
    )]
    Infeasible {
        liquid_volume: f64,
        bottle_volume: f64,
    },

    /// The charge is small enough to be entirely vapor.
    #[error("liquid volume {liquid_volume} m³ is negative; the charge is all vapor")]
    NoLiquid { liquid_volume: f64 },

    /// The inputs are non-finite or physically inconsistent.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Errors from loading a saturation table.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("failed to read saturation data: {0}")]
    Csv(#[from] csv::Error),

    #[error("saturation table needs at least two samples, found {0}")]
    TooFewSamples(usize),

    #[error("sample {index} has a non-finite or non-positive value")]
    InvalidSample { index: usize },

    #[error("{column} is given for some samples but not sample {index}")]
    IncompleteColumn { column: &'static str, index: usize },

    #[error("{column} must be strictly ascending, violated at sample {index}")]
    NotAscending { column: &'static str, index: usize },

    #[error(transparent)]
    Interpolation(#[from] ValidateError),
}

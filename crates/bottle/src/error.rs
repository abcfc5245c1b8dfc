use thiserror::Error;

/// Errors from evaluating the bottle model.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// The liquid fills the whole bottle, leaving no ullage for the vapor.
    ///
    /// The pressure rate divides by `Vb − Vl` and is singular here.
    #[error("ullage volume must be positive, but Vb = {bottle_volume} m³ and Vl = {liquid_volume} m³")]
    NonPositiveUllage {
        bottle_volume: f64,
        liquid_volume: f64,
    },

    /// The bottle parameters are outside their valid domain.
    #[error(transparent)]
    Parameter(#[from] ParameterError),

    /// A batch column has a different length than the pressure column.
    #[error("batch column `{column}` has {found} nodes, expected {expected}")]
    ShapeMismatch {
        column: &'static str,
        expected: usize,
        found: usize,
    },
}

/// Errors from validating [`BottleParameters`](crate::BottleParameters).
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ParameterError {
    #[error("bottle volume must be finite and positive, got {0} m³")]
    BottleVolume(f64),

    #[error("heat capacity ratio must be finite and positive, got {0}")]
    HeatCapacityRatio(f64),

    #[error("liquid density must be finite and positive, got {0} kg/m³")]
    LiquidDensity(f64),

    #[error("outlet area must be finite and non-negative, got {0} m²")]
    OutletArea(f64),

    #[error("back pressure must be finite, got {0} Pa")]
    BackPressure(f64),

    #[error("pressure loss must be finite, got {0} Pa")]
    PressureLoss(f64),
}

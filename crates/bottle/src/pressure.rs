//! Bottle pressure decay as the ullage vapor expands.
//!
//! ```text
//! D     = Vb − Vl
//! p_dot = c(γ) · p / D · Vl_dot
//! ```
//!
//! The coefficient `c(γ)` depends on the assumed [`ExpansionLaw`].

use blowdown_core::{Differentiable, Model};
use serde::{Deserialize, Serialize};

use crate::{BottleParameters, BottleState, ModelError, outflow::finite_or_zero};

/// How the ullage vapor responds to the volume freed by outgoing liquid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpansionLaw {
    /// Polytropic expansion with exponent `γ`, so `p·D^γ` stays constant.
    ///
    /// `c(γ) = γ`.
    #[default]
    Polytropic,

    /// Damped expansion with `c(γ) = −2/(1 + 1/γ)`.
    ///
    /// The coefficient is negative, so with a draining bottle the pressure
    /// rate has the opposite sign of `Vl_dot`.
    Damped,
}

impl ExpansionLaw {
    /// Returns the coefficient `c(γ)`.
    #[must_use]
    pub fn coefficient(self, gamma: f64) -> f64 {
        match self {
            Self::Polytropic => gamma,
            Self::Damped => -2.0 / (1.0 + 1.0 / gamma),
        }
    }

    /// Returns `dc/dγ`.
    #[must_use]
    pub fn coefficient_derivative(self, gamma: f64) -> f64 {
        match self {
            Self::Polytropic => 1.0,
            Self::Damped => -2.0 / ((gamma + 1.0) * (gamma + 1.0)),
        }
    }
}

/// Evaluates `p_dot` for a given liquid volume rate.
///
/// # Errors
///
/// Returns [`ModelError::NonPositiveUllage`] unless `Vb − Vl > 0`.
pub fn pressure_rate(
    law: ExpansionLaw,
    state: &BottleState,
    parameters: &BottleParameters,
    liquid_volume_rate: f64,
) -> Result<f64, ModelError> {
    let ullage = ullage(state, parameters)?;
    let c = law.coefficient(parameters.heat_capacity_ratio);
    Ok(c * state.pressure / ullage * liquid_volume_rate)
}

/// Partials of `p_dot` holding `Vl_dot` fixed.
///
/// These are the partials of the loosely coupled relation, where `Vl_dot` is
/// an independent input. [`BottleModel`](crate::BottleModel) chains them with
/// the outflow partials for the fused model.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PressureRatePartials {
    pub pressure: f64,
    pub liquid_volume: f64,
    pub bottle_volume: f64,
    pub heat_capacity_ratio: f64,
    pub liquid_volume_rate: f64,
}

/// Evaluates the analytic partials of [`pressure_rate`].
///
/// # Errors
///
/// Returns [`ModelError::NonPositiveUllage`] unless `Vb − Vl > 0`.
pub fn partials(
    law: ExpansionLaw,
    state: &BottleState,
    parameters: &BottleParameters,
    liquid_volume_rate: f64,
) -> Result<PressureRatePartials, ModelError> {
    let d = ullage(state, parameters)?;
    let gamma = parameters.heat_capacity_ratio;
    let c = law.coefficient(gamma);
    let p = state.pressure;
    let vl_dot = liquid_volume_rate;

    // ∂/∂Vl and ∂/∂Vb differ only in sign since D = Vb − Vl.
    let volume = c * p * vl_dot / (d * d);

    Ok(PressureRatePartials {
        pressure: finite_or_zero(c * vl_dot / d),
        liquid_volume: finite_or_zero(volume),
        bottle_volume: finite_or_zero(-volume),
        heat_capacity_ratio: finite_or_zero(law.coefficient_derivative(gamma) * p * vl_dot / d),
        liquid_volume_rate: finite_or_zero(c * p / d),
    })
}

fn ullage(state: &BottleState, parameters: &BottleParameters) -> Result<f64, ModelError> {
    let ullage = state.ullage_volume(parameters.bottle_volume);
    if ullage > 0.0 {
        Ok(ullage)
    } else {
        Err(ModelError::NonPositiveUllage {
            bottle_volume: parameters.bottle_volume,
            liquid_volume: state.liquid_volume,
        })
    }
}

/// Input to [`PressureRateModel`]: the bottle plus an externally supplied
/// liquid volume rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PressureRateInput {
    pub state: BottleState,
    pub parameters: BottleParameters,
    pub liquid_volume_rate: f64,
}

/// The pressure rate relation as a standalone model.
#[derive(Debug, Clone, Copy, Default)]
pub struct PressureRateModel {
    pub law: ExpansionLaw,
}

impl Model for PressureRateModel {
    type Input = PressureRateInput;
    type Output = f64;
    type Error = ModelError;

    fn call(&self, input: &PressureRateInput) -> Result<f64, ModelError> {
        input.parameters.validate()?;
        pressure_rate(
            self.law,
            &input.state,
            &input.parameters,
            input.liquid_volume_rate,
        )
    }
}

impl Differentiable for PressureRateModel {
    type Partials = PressureRatePartials;

    fn partials(&self, input: &PressureRateInput) -> Result<PressureRatePartials, ModelError> {
        input.parameters.validate()?;
        partials(
            self.law,
            &input.state,
            &input.parameters,
            input.liquid_volume_rate,
        )
    }
}

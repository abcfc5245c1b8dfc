//! Liquid outflow through the bottle outlet.
//!
//! The outlet is treated as an incompressible orifice driven by the pressure
//! difference across it:
//!
//! ```text
//! d      = p − p_out − Δp
//! Vl_dot = −A_out · sqrt(2/ρl · max(d, 0))
//! ```
//!
//! The rate is negative because the liquid volume falls as it is expelled.
//! When the back pressure and line loss meet or exceed the bottle pressure the
//! difference is clamped to zero, so the outlet simply stops flowing.

use blowdown_core::{Differentiable, Model};

use crate::{BottleInput, BottleParameters, ModelError};

/// Evaluates the liquid volume rate `Vl_dot` at bottle pressure `pressure`.
///
/// Returns exactly zero whenever `p ≤ p_out + Δp`.
#[must_use]
pub fn liquid_outflow(pressure: f64, parameters: &BottleParameters) -> f64 {
    let d = clamped_difference(pressure, parameters);
    -parameters.outlet_area * (2.0 / parameters.liquid_density * d).sqrt()
}

/// Partial derivatives of `Vl_dot` with respect to its inputs.
///
/// Outflow does not depend on `Vb`, `Vl`, or `γ`, so those partials are zero
/// and have no field here.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OutflowPartials {
    pub pressure: f64,
    pub back_pressure: f64,
    pub pressure_loss: f64,
    pub liquid_density: f64,
    pub outlet_area: f64,
}

/// Evaluates the analytic partials of [`liquid_outflow`].
///
/// At `d = 0` the pressure partials are infinite; every partial that is not
/// finite there is reported as zero, which is also the slope of the clamped
/// branch for `d < 0`.
#[must_use]
pub fn partials(pressure: f64, parameters: &BottleParameters) -> OutflowPartials {
    let BottleParameters {
        liquid_density: rho,
        outlet_area: area,
        ..
    } = *parameters;

    let d = clamped_difference(pressure, parameters);
    let dp = -area / (2.0 * rho * d).sqrt();

    OutflowPartials {
        pressure: finite_or_zero(dp),
        back_pressure: finite_or_zero(-dp),
        pressure_loss: finite_or_zero(-dp),
        liquid_density: finite_or_zero(area * (d / 2.0).sqrt() / rho.powf(1.5)),
        outlet_area: finite_or_zero(-(2.0 * d / rho).sqrt()),
    }
}

/// Returns `p − p_out − Δp`, clamped at zero. A NaN pressure stays NaN.
fn clamped_difference(pressure: f64, parameters: &BottleParameters) -> f64 {
    let d = pressure - parameters.cutoff_pressure();
    if d < 0.0 { 0.0 } else { d }
}

pub(crate) fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// The outflow relation as a standalone model.
///
/// Pairs with [`PressureRateModel`](crate::pressure::PressureRateModel) when
/// the two relations are evaluated separately and coupled by an outer solver.
/// [`BottleModel`](crate::BottleModel) fuses both in one pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutflowModel;

impl Model for OutflowModel {
    type Input = BottleInput;
    type Output = f64;
    type Error = ModelError;

    fn call(&self, input: &BottleInput) -> Result<f64, ModelError> {
        input.parameters.validate()?;
        Ok(liquid_outflow(input.state.pressure, &input.parameters))
    }
}

impl Differentiable for OutflowModel {
    type Partials = OutflowPartials;

    fn partials(&self, input: &BottleInput) -> Result<OutflowPartials, ModelError> {
        input.parameters.validate()?;
        Ok(partials(input.state.pressure, &input.parameters))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::BottleState;

    fn params() -> BottleParameters {
        BottleParameters {
            bottle_volume: 0.015,
            heat_capacity_ratio: 1.303,
            liquid_density: 800.0,
            outlet_area: 1e-3,
            back_pressure: 1e5,
            pressure_loss: 5e4,
        }
    }

    #[test]
    fn orifice_flow_at_known_difference() {
        // d = 1.6e6 Pa, sqrt(2/800 · 1.6e6) = 63.245...
        let vl_dot = liquid_outflow(1.75e6, &params());
        assert_relative_eq!(vl_dot, -1e-3 * 4000.0_f64.sqrt(), max_relative = 1e-12);
    }

    #[test]
    fn no_flow_against_back_pressure() {
        for pressure in [1.5e5, 1.2e5, 0.0, -1e6] {
            let vl_dot = liquid_outflow(pressure, &params());
            assert_eq!(vl_dot, 0.0);
            assert!(!vl_dot.is_nan());
        }
    }

    #[test]
    fn closed_outlet_has_no_flow() {
        let closed = BottleParameters {
            outlet_area: 0.0,
            ..params()
        };
        assert_eq!(liquid_outflow(5e6, &closed), 0.0);
    }

    #[test]
    fn partials_away_from_cutoff() {
        let p = params();
        let d: f64 = 1.6e6;
        let rho: f64 = 800.0;
        let a = 1e-3;

        let got = partials(1.75e6, &p);

        let dp = -a / (2.0 * rho * d).sqrt();
        assert_relative_eq!(got.pressure, dp, max_relative = 1e-12);
        assert_relative_eq!(got.back_pressure, -dp, max_relative = 1e-12);
        assert_relative_eq!(got.pressure_loss, -dp, max_relative = 1e-12);
        assert_relative_eq!(
            got.liquid_density,
            a * (d / 2.0).sqrt() / rho.powf(1.5),
            max_relative = 1e-12
        );
        assert_relative_eq!(got.outlet_area, -(2.0 * d / rho).sqrt(), max_relative = 1e-12);
    }

    #[test]
    fn partials_vanish_at_and_below_cutoff() {
        for pressure in [1.5e5, 1e5] {
            let got = partials(pressure, &params());
            assert_eq!(got, OutflowPartials::default());
        }
    }

    #[test]
    fn zero_area_at_cutoff_is_not_nan() {
        let closed = BottleParameters {
            outlet_area: 0.0,
            ..params()
        };
        let got = partials(1.5e5, &closed);
        assert_eq!(got, OutflowPartials::default());
    }

    #[test]
    fn model_rejects_invalid_parameters() {
        let input = BottleInput::new(
            BottleState {
                pressure: 5e6,
                liquid_volume: 0.01,
            },
            BottleParameters {
                liquid_density: -1.0,
                ..params()
            },
        );
        assert!(matches!(
            OutflowModel.call(&input),
            Err(ModelError::Parameter(_))
        ));
        assert!(OutflowModel.partials(&input).is_err());
    }
}

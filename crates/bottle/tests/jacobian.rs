//! Analytic partials checked against central finite differences.

use blowdown_bottle::{
    BottleInput, BottleModel, BottleParameters, BottleState, ExpansionLaw, Rate, Variable,
};
use blowdown_core::{
    Differentiable, Model,
    finite_difference::{central_with_step, relative_error},
};

const EPS: f64 = 1e-6;
const TOLERANCE: f64 = 1e-4;

fn parameters() -> BottleParameters {
    BottleParameters {
        bottle_volume: 0.015,
        heat_capacity_ratio: 1.303,
        liquid_density: 786.6,
        outlet_area: 1e-3,
        back_pressure: 1e5,
        pressure_loss: 0.0,
    }
}

/// Nodes along a blowdown, all well clear of the `d → 0` cutoff.
fn nodes() -> Vec<BottleInput> {
    let base = parameters();
    vec![
        BottleInput::new(
            BottleState {
                pressure: 5.06e6,
                liquid_volume: 0.010_658_38,
            },
            base,
        ),
        BottleInput::new(
            BottleState {
                pressure: 2.4e6,
                liquid_volume: 0.006,
            },
            base,
        ),
        BottleInput::new(
            BottleState {
                pressure: 1.1e6,
                liquid_volume: 0.000_5,
            },
            BottleParameters {
                pressure_loss: 3e5,
                outlet_area: 4e-4,
                ..base
            },
        ),
    ]
}

/// Half-width of the difference for `variable` at `input`.
///
/// Pressure offsets only enter through `p − p_out − Δp`, so they are stepped
/// on the scale of the bottle pressure rather than their own, often zero,
/// value.
fn step(input: &BottleInput, variable: Variable) -> f64 {
    match variable {
        Variable::Pressure | Variable::BackPressure | Variable::PressureLoss => {
            EPS * input.state.pressure
        }
        _ => EPS * input.value(variable).abs().max(1.0),
    }
}

fn rate_of(model: &BottleModel, input: &BottleInput, rate: Rate) -> f64 {
    let rates = model.call(input).expect("node is inside the model domain");
    match rate {
        Rate::PressureRate => rates.pressure_rate,
        Rate::LiquidVolumeRate => rates.liquid_volume_rate,
    }
}

fn check(law: ExpansionLaw) {
    let model = BottleModel::new(law);

    for (n, input) in nodes().into_iter().enumerate() {
        let jacobian = model.partials(&input).expect("node is inside the model domain");

        for rate in Rate::ALL {
            for variable in Variable::ALL {
                let numeric = central_with_step(
                    |x| rate_of(&model, &input.with(variable, x), rate),
                    input.value(variable),
                    step(&input, variable),
                );
                let analytic = jacobian.get(rate, variable);
                let error = relative_error(numeric, analytic);

                assert!(
                    error < TOLERANCE,
                    "{law:?} node {n}: ∂{}/∂{} analytic {analytic:e}, numeric {numeric:e}",
                    rate.name(),
                    variable.name(),
                );
            }
        }
    }
}

#[test]
fn polytropic_jacobian_matches_finite_differences() {
    check(ExpansionLaw::Polytropic);
}

#[test]
fn damped_jacobian_matches_finite_differences() {
    check(ExpansionLaw::Damped);
}

#[test]
fn zero_pressure_loss_partial_matches_a_pressure_scaled_difference() {
    // Δp = 0 at this node; a step scaled to Δp itself is lost against p.
    let model = BottleModel::default();
    let input = nodes()[0];
    assert_eq!(input.value(Variable::PressureLoss), 0.0);

    let analytic = model
        .partials(&input)
        .unwrap()
        .get(Rate::PressureRate, Variable::PressureLoss);
    let numeric = central_with_step(
        |x| rate_of(&model, &input.with(Variable::PressureLoss, x), Rate::PressureRate),
        0.0,
        step(&input, Variable::PressureLoss),
    );

    assert!(relative_error(numeric, analytic) < 1e-8);
}

#[test]
fn denser_liquid_slows_the_outflow() {
    // Vl_dot < 0 and its magnitude falls with ρl, so the partial is positive.
    let jacobian = BottleModel::default().partials(&nodes()[0]).unwrap();
    assert!(jacobian.get(Rate::LiquidVolumeRate, Variable::LiquidDensity) > 0.0);
}

#[test]
fn volume_partials_have_opposite_signs() {
    // D = Vb − Vl, so ∂p_dot/∂Vl = −∂p_dot/∂Vb; with Vl_dot < 0 and c > 0 the
    // Vl partial is negative.
    let jacobian = BottleModel::default().partials(&nodes()[1]).unwrap();
    let d_vl = jacobian.get(Rate::PressureRate, Variable::LiquidVolume);
    let d_vb = jacobian.get(Rate::PressureRate, Variable::BottleVolume);

    assert!(d_vl < 0.0);
    assert_eq!(d_vl, -d_vb);
}

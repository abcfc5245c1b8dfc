//! Blowdown of a charged bottle from a configuration.

use std::convert::Infallible;

use blowdown_core::{Model, OdeProblem};
use blowdown_solvers::euler::{self, Action, Event};
use blowdown_thermo::{Charge, PropertyError, SaturationTable};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};
use uom::si::{
    area::{square_centimeter, square_meter},
    f64::{Area, Mass, Pressure, ThermodynamicTemperature, Time, Volume},
    mass::kilogram,
    mass_density::kilogram_per_cubic_meter,
    pressure::{kilopascal, pascal},
    thermodynamic_temperature::kelvin,
    time::{millisecond, second},
    volume::{cubic_meter, liter},
};

use crate::{
    BottleInput, BottleModel, BottleParameters, BottleRates, BottleState, ExpansionLaw,
    ModelError, ParameterError,
};

/// Pounds to kilograms, as used to specify the reference charge.
const KILOGRAMS_PER_POUND: f64 = 1.0 / 2.205;

/// Settings for an expulsion run.
///
/// Deserializes from TOML with every field optional. Quantities are given in
/// SI base units: m³, m², Pa, K, kg and s.
///
/// ```toml
/// bottle_volume = 0.015
/// outlet_area = 5e-4
/// expansion_law = "damped"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExpulsionConfig {
    pub bottle_volume: Volume,
    pub outlet_area: Area,
    pub back_pressure: Pressure,
    pub pressure_loss: Pressure,
    pub fill_temperature: ThermodynamicTemperature,
    pub nitrous_mass: Mass,
    pub heat_capacity_ratio: f64,
    pub expansion_law: ExpansionLaw,
    pub time_step: Time,
    pub duration: Time,
}

impl Default for ExpulsionConfig {
    /// A 15 L bottle holding 20 lb of nitrous oxide at 20 °C, venting to
    /// atmosphere through a 10 cm² outlet.
    fn default() -> Self {
        Self {
            bottle_volume: Volume::new::<liter>(15.0),
            outlet_area: Area::new::<square_centimeter>(10.0),
            back_pressure: Pressure::new::<kilopascal>(100.0),
            pressure_loss: Pressure::new::<pascal>(0.0),
            fill_temperature: ThermodynamicTemperature::new::<kelvin>(293.15),
            nitrous_mass: Mass::new::<kilogram>(20.0 * KILOGRAMS_PER_POUND),
            heat_capacity_ratio: blowdown_thermo::NitrousOxide::HEAT_CAPACITY_RATIO,
            expansion_law: ExpansionLaw::Polytropic,
            time_step: Time::new::<millisecond>(0.1),
            duration: Time::new::<second>(10.0),
        }
    }
}

impl ExpulsionConfig {
    /// Parses a config from TOML, filling omitted fields with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ExpulsionError::Config`] if the TOML is malformed or has
    /// unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ExpulsionError> {
        Ok(toml::from_str(s)?)
    }

    /// Returns the number of steps needed to cover the duration.
    ///
    /// # Errors
    ///
    /// Returns [`ExpulsionError::Timing`] unless the step is finite and
    /// positive and the duration is finite and non-negative.
    pub fn steps(&self) -> Result<usize, ExpulsionError> {
        let time_step = self.time_step.get::<second>();
        let duration = self.duration.get::<second>();

        if !(time_step.is_finite() && time_step > 0.0 && duration.is_finite() && duration >= 0.0) {
            return Err(ExpulsionError::Timing {
                time_step,
                duration,
            });
        }

        // Absorb rounding so that 10 s at 0.1 ms is exactly 100 000 steps.
        let ratio = duration / time_step;
        let nearest = ratio.round();
        let steps = if (ratio - nearest).abs() <= 1e-9 * nearest.max(1.0) {
            nearest
        } else {
            ratio.ceil()
        };

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let steps = steps as usize;
        Ok(steps)
    }
}

/// Errors from building or running an expulsion.
#[derive(Debug, Error)]
pub enum ExpulsionError {
    #[error("invalid expulsion config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("cannot charge the bottle: {0}")]
    Property(#[from] PropertyError),

    #[error(transparent)]
    Parameter(#[from] ParameterError),

    #[error("time step ({time_step} s) must be positive and duration ({duration} s) non-negative")]
    Timing { time_step: f64, duration: f64 },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("integration failed: {0}")]
    Solver(#[from] euler::Error),
}

/// Input to the expulsion model: elapsed time and bottle state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpulsionInput {
    /// Time since the outlet opened, s.
    pub time: f64,
    pub state: BottleState,
}

/// A charged bottle wired for time integration.
///
/// Built with [`ExpulsionProblem::new`], which initializes the state from the
/// saturation table and the charge mass balance.
#[derive(Debug, Clone)]
pub struct ExpulsionProblem {
    model: BottleModel,
    parameters: BottleParameters,
    charge: Charge,
    initial: ExpulsionInput,
    time_step: f64,
    steps: usize,
}

impl ExpulsionProblem {
    /// Charges a bottle per `config` and returns the problem ready to run.
    ///
    /// # Errors
    ///
    /// - [`ExpulsionError::Timing`] for a bad step or duration.
    /// - [`ExpulsionError::Property`] if the fill temperature is outside the
    ///   table or the charge does not fit in the bottle.
    /// - [`ExpulsionError::Parameter`] for a bad outlet area, pressure or `γ`.
    pub fn new(config: &ExpulsionConfig, table: &SaturationTable) -> Result<Self, ExpulsionError> {
        let steps = config.steps()?;

        let charge = Charge::at_temperature(
            table,
            config.fill_temperature,
            config.nitrous_mass,
            config.bottle_volume,
        )?;

        let parameters = BottleParameters {
            bottle_volume: config.bottle_volume.get::<cubic_meter>(),
            heat_capacity_ratio: config.heat_capacity_ratio,
            liquid_density: charge.liquid_density.get::<kilogram_per_cubic_meter>(),
            outlet_area: config.outlet_area.get::<square_meter>(),
            back_pressure: config.back_pressure.get::<pascal>(),
            pressure_loss: config.pressure_loss.get::<pascal>(),
        };
        parameters.validate()?;

        let initial = ExpulsionInput {
            time: 0.0,
            state: BottleState {
                pressure: charge.pressure.get::<pascal>(),
                liquid_volume: charge.liquid_volume.get::<cubic_meter>(),
            },
        };

        info!(
            pressure_pa = initial.state.pressure,
            liquid_volume_m3 = initial.state.liquid_volume,
            fill_fraction = charge.fill_fraction(),
            law = ?config.expansion_law,
            "charged bottle for expulsion"
        );

        Ok(Self {
            model: BottleModel::new(config.expansion_law),
            parameters,
            charge,
            initial,
            time_step: config.time_step.get::<second>(),
            steps,
        })
    }

    #[must_use]
    pub fn parameters(&self) -> &BottleParameters {
        &self.parameters
    }

    #[must_use]
    pub fn charge(&self) -> &Charge {
        &self.charge
    }

    #[must_use]
    pub fn initial(&self) -> ExpulsionInput {
        self.initial
    }

    #[must_use]
    pub fn model(&self) -> BottleModel {
        self.model
    }

    /// Evaluates the state rates at the moment the outlet opens.
    ///
    /// # Errors
    ///
    /// Returns [`ExpulsionError::Model`] if the model rejects the initial state.
    pub fn initial_rates(&self) -> Result<BottleRates, ExpulsionError> {
        Ok(self.call(&self.initial)?)
    }

    /// Integrates the blowdown with forward Euler.
    ///
    /// Stops as soon as the liquid is gone or the outlet stops flowing, or
    /// when the configured duration has elapsed.
    ///
    /// # Errors
    ///
    /// Returns [`ExpulsionError::Solver`] if a model evaluation fails.
    pub fn simulate(&self) -> Result<Blowdown, ExpulsionError> {
        let mut end = BlowdownEnd::DurationElapsed;

        let solution = euler::solve(
            self,
            self,
            self.initial,
            self.time_step,
            self.steps,
            |event: &Event<ExpulsionInput, BottleRates>| {
                let snapshot = &event.snapshot;
                let reason = if snapshot.input.state.liquid_volume <= 0.0 {
                    BlowdownEnd::LiquidDepleted
                } else if snapshot.output.liquid_volume_rate == 0.0 {
                    BlowdownEnd::OutflowStopped
                } else {
                    return None;
                };
                end = reason;
                Some(Action::StopEarly)
            },
        )?;

        let history: Vec<_> = solution
            .history
            .into_iter()
            .map(|snapshot| BlowdownPoint {
                time: snapshot.input.time,
                state: snapshot.input.state,
                rates: snapshot.output,
            })
            .collect();

        let blowdown = Blowdown { history, end };
        if let Some(last) = blowdown.last() {
            match end {
                BlowdownEnd::DurationElapsed => warn!(
                    time_s = last.time,
                    liquid_volume_m3 = last.state.liquid_volume,
                    "duration elapsed with liquid remaining"
                ),
                _ => info!(
                    ?end,
                    time_s = last.time,
                    pressure_pa = last.state.pressure,
                    "blowdown finished"
                ),
            }
        }

        Ok(blowdown)
    }
}

impl Model for ExpulsionProblem {
    type Input = ExpulsionInput;
    type Output = BottleRates;
    type Error = ModelError;

    fn call(&self, input: &ExpulsionInput) -> Result<BottleRates, ModelError> {
        self.model.rates(&BottleInput::new(input.state, self.parameters))
    }
}

impl OdeProblem for ExpulsionProblem {
    type Input = ExpulsionInput;
    type Output = BottleRates;
    type Delta = f64;
    type State = BottleState;
    type Error = Infallible;

    fn state(&self, input: &ExpulsionInput) -> Result<BottleState, Infallible> {
        Ok(input.state)
    }

    fn derivative(
        &self,
        _input: &ExpulsionInput,
        output: &BottleRates,
    ) -> Result<BottleRates, Infallible> {
        Ok(*output)
    }

    fn build_input(
        &self,
        base: &ExpulsionInput,
        state: &BottleState,
        dt: &f64,
    ) -> Result<ExpulsionInput, Infallible> {
        Ok(ExpulsionInput {
            time: base.time + dt,
            state: *state,
        })
    }

    /// Keeps the liquid volume non-negative and the pressure at or above the
    /// back pressure when a step overshoots.
    fn finalize_step(
        &self,
        mut next: ExpulsionInput,
        _prev_input: &ExpulsionInput,
        _prev_output: &BottleRates,
        _dt: &f64,
    ) -> Result<ExpulsionInput, Infallible> {
        let state = &mut next.state;
        if state.liquid_volume < 0.0 {
            debug!(time_s = next.time, "clamped overshoot of liquid volume");
            state.liquid_volume = 0.0;
        }
        state.pressure = state.pressure.max(self.parameters.back_pressure);
        Ok(next)
    }
}

/// Why a blowdown simulation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlowdownEnd {
    /// All liquid has left the bottle.
    LiquidDepleted,

    /// The bottle pressure fell to the outlet cutoff with liquid remaining.
    OutflowStopped,

    /// The configured duration elapsed first.
    DurationElapsed,
}

/// One sample of a blowdown history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlowdownPoint {
    pub time: f64,
    pub state: BottleState,
    pub rates: BottleRates,
}

/// The result of [`ExpulsionProblem::simulate`].
#[derive(Debug, Clone)]
pub struct Blowdown {
    pub history: Vec<BlowdownPoint>,
    pub end: BlowdownEnd,
}

impl Blowdown {
    #[must_use]
    pub fn last(&self) -> Option<&BlowdownPoint> {
        self.history.last()
    }
}

use blowdown_core::{Differentiable, Model};

use crate::{
    BottleParameters, BottleRates, BottleState, ExpansionLaw, ModelError, outflow, pressure,
};

/// One evaluation point for the bottle model: the state and its parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BottleInput {
    pub state: BottleState,
    pub parameters: BottleParameters,
}

impl BottleInput {
    #[must_use]
    pub fn new(state: BottleState, parameters: BottleParameters) -> Self {
        Self { state, parameters }
    }

    /// Returns the value of one model input.
    #[must_use]
    pub fn value(&self, variable: Variable) -> f64 {
        let p = &self.parameters;
        match variable {
            Variable::Pressure => self.state.pressure,
            Variable::LiquidVolume => self.state.liquid_volume,
            Variable::BottleVolume => p.bottle_volume,
            Variable::HeatCapacityRatio => p.heat_capacity_ratio,
            Variable::LiquidDensity => p.liquid_density,
            Variable::OutletArea => p.outlet_area,
            Variable::BackPressure => p.back_pressure,
            Variable::PressureLoss => p.pressure_loss,
        }
    }

    /// Returns a copy of this input with one variable replaced.
    #[must_use]
    pub fn with(mut self, variable: Variable, value: f64) -> Self {
        let p = &mut self.parameters;
        match variable {
            Variable::Pressure => self.state.pressure = value,
            Variable::LiquidVolume => self.state.liquid_volume = value,
            Variable::BottleVolume => p.bottle_volume = value,
            Variable::HeatCapacityRatio => p.heat_capacity_ratio = value,
            Variable::LiquidDensity => p.liquid_density = value,
            Variable::OutletArea => p.outlet_area = value,
            Variable::BackPressure => p.back_pressure = value,
            Variable::PressureLoss => p.pressure_loss = value,
        }
        self
    }
}

/// The inputs the bottle model can be differentiated with respect to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variable {
    Pressure,
    LiquidVolume,
    BottleVolume,
    HeatCapacityRatio,
    LiquidDensity,
    OutletArea,
    BackPressure,
    PressureLoss,
}

impl Variable {
    pub const ALL: [Self; 8] = [
        Self::Pressure,
        Self::LiquidVolume,
        Self::BottleVolume,
        Self::HeatCapacityRatio,
        Self::LiquidDensity,
        Self::OutletArea,
        Self::BackPressure,
        Self::PressureLoss,
    ];

    /// Position of this variable in [`Variable::ALL`].
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Pressure => "pressure",
            Self::LiquidVolume => "liquid_volume",
            Self::BottleVolume => "bottle_volume",
            Self::HeatCapacityRatio => "heat_capacity_ratio",
            Self::LiquidDensity => "liquid_density",
            Self::OutletArea => "outlet_area",
            Self::BackPressure => "back_pressure",
            Self::PressureLoss => "pressure_loss",
        }
    }
}

/// The outputs of the bottle model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rate {
    PressureRate,
    LiquidVolumeRate,
}

impl Rate {
    pub const ALL: [Self; 2] = [Self::PressureRate, Self::LiquidVolumeRate];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::PressureRate => "pressure_rate",
            Self::LiquidVolumeRate => "liquid_volume_rate",
        }
    }
}

/// Partials of one model output with respect to every [`Variable`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Gradient {
    pub pressure: f64,
    pub liquid_volume: f64,
    pub bottle_volume: f64,
    pub heat_capacity_ratio: f64,
    pub liquid_density: f64,
    pub outlet_area: f64,
    pub back_pressure: f64,
    pub pressure_loss: f64,
}

impl Gradient {
    #[must_use]
    pub fn get(&self, variable: Variable) -> f64 {
        match variable {
            Variable::Pressure => self.pressure,
            Variable::LiquidVolume => self.liquid_volume,
            Variable::BottleVolume => self.bottle_volume,
            Variable::HeatCapacityRatio => self.heat_capacity_ratio,
            Variable::LiquidDensity => self.liquid_density,
            Variable::OutletArea => self.outlet_area,
            Variable::BackPressure => self.back_pressure,
            Variable::PressureLoss => self.pressure_loss,
        }
    }
}

/// The 2 × 8 Jacobian of the fused bottle model at one node.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BottleJacobian {
    pub pressure_rate: Gradient,
    pub liquid_volume_rate: Gradient,
}

impl BottleJacobian {
    #[must_use]
    pub fn row(&self, rate: Rate) -> &Gradient {
        match rate {
            Rate::PressureRate => &self.pressure_rate,
            Rate::LiquidVolumeRate => &self.liquid_volume_rate,
        }
    }

    #[must_use]
    pub fn get(&self, rate: Rate, variable: Variable) -> f64 {
        self.row(rate).get(variable)
    }
}

/// The fused bottle model.
///
/// Evaluates the outflow and substitutes it straight into the pressure rate,
/// so a single call yields both state derivatives with no inner iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BottleModel {
    pub law: ExpansionLaw,
}

impl BottleModel {
    #[must_use]
    pub fn new(law: ExpansionLaw) -> Self {
        Self { law }
    }

    /// Computes `(p_dot, Vl_dot)` at one node.
    ///
    /// # Errors
    ///
    /// Returns a [`ModelError`] if the parameters are invalid or the bottle
    /// has no ullage.
    pub fn rates(&self, input: &BottleInput) -> Result<BottleRates, ModelError> {
        let BottleInput { state, parameters } = input;
        parameters.validate()?;

        let liquid_volume_rate = outflow::liquid_outflow(state.pressure, parameters);
        let pressure_rate =
            pressure::pressure_rate(self.law, state, parameters, liquid_volume_rate)?;

        Ok(BottleRates {
            pressure_rate,
            liquid_volume_rate,
        })
    }

    /// Computes the full Jacobian at one node.
    ///
    /// The pressure rate depends on the outflow, so its partials include the
    /// chain term `∂p_dot/∂Vl_dot · ∂Vl_dot/∂x` for every outflow input.
    ///
    /// # Errors
    ///
    /// Same as [`BottleModel::rates`].
    pub fn jacobian(&self, input: &BottleInput) -> Result<BottleJacobian, ModelError> {
        let BottleInput { state, parameters } = input;
        parameters.validate()?;

        let vl_dot = outflow::liquid_outflow(state.pressure, parameters);
        let q = outflow::partials(state.pressure, parameters);
        let r = pressure::partials(self.law, state, parameters, vl_dot)?;
        let k = r.liquid_volume_rate;

        let pressure_rate = Gradient {
            pressure: r.pressure + k * q.pressure,
            liquid_volume: r.liquid_volume,
            bottle_volume: r.bottle_volume,
            heat_capacity_ratio: r.heat_capacity_ratio,
            liquid_density: k * q.liquid_density,
            outlet_area: k * q.outlet_area,
            back_pressure: k * q.back_pressure,
            pressure_loss: k * q.pressure_loss,
        };

        let liquid_volume_rate = Gradient {
            pressure: q.pressure,
            liquid_density: q.liquid_density,
            outlet_area: q.outlet_area,
            back_pressure: q.back_pressure,
            pressure_loss: q.pressure_loss,
            ..Gradient::default()
        };

        Ok(BottleJacobian {
            pressure_rate,
            liquid_volume_rate,
        })
    }
}

impl Model for BottleModel {
    type Input = BottleInput;
    type Output = BottleRates;
    type Error = ModelError;

    fn call(&self, input: &BottleInput) -> Result<BottleRates, ModelError> {
        self.rates(input)
    }
}

impl Differentiable for BottleModel {
    type Partials = BottleJacobian;

    fn partials(&self, input: &BottleInput) -> Result<BottleJacobian, ModelError> {
        self.jacobian(input)
    }
}

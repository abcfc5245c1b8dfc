use crate::ParameterError;

/// Bottle properties held constant over an expulsion, in SI units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BottleParameters {
    /// Internal volume of the bottle, m³.
    pub bottle_volume: f64,

    /// Heat capacity ratio `γ` of the ullage vapor.
    pub heat_capacity_ratio: f64,

    /// Density of the liquid being expelled, kg/m³.
    pub liquid_density: f64,

    /// Effective flow area of the outlet, m².
    pub outlet_area: f64,

    /// Pressure downstream of the outlet, Pa.
    pub back_pressure: f64,

    /// Pressure lost in the feed line between bottle and outlet, Pa.
    pub pressure_loss: f64,
}

impl BottleParameters {
    /// Checks that every parameter is within its physical domain.
    ///
    /// # Errors
    ///
    /// Returns the first [`ParameterError`] found.
    pub fn validate(&self) -> Result<(), ParameterError> {
        let Self {
            bottle_volume,
            heat_capacity_ratio,
            liquid_density,
            outlet_area,
            back_pressure,
            pressure_loss,
        } = *self;

        if !(bottle_volume.is_finite() && bottle_volume > 0.0) {
            return Err(ParameterError::BottleVolume(bottle_volume));
        }
        if !(heat_capacity_ratio.is_finite() && heat_capacity_ratio > 0.0) {
            return Err(ParameterError::HeatCapacityRatio(heat_capacity_ratio));
        }
        if !(liquid_density.is_finite() && liquid_density > 0.0) {
            return Err(ParameterError::LiquidDensity(liquid_density));
        }
        if !(outlet_area.is_finite() && outlet_area >= 0.0) {
            return Err(ParameterError::OutletArea(outlet_area));
        }
        if !back_pressure.is_finite() {
            return Err(ParameterError::BackPressure(back_pressure));
        }
        if !pressure_loss.is_finite() {
            return Err(ParameterError::PressureLoss(pressure_loss));
        }

        Ok(())
    }

    /// Returns the bottle pressure below which no liquid flows, `p_out + Δp`.
    #[must_use]
    pub fn cutoff_pressure(&self) -> f64 {
        self.back_pressure + self.pressure_loss
    }
}

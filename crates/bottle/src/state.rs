use blowdown_core::StepIntegrable;

/// The integrated state of a bottle: pressure and liquid volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BottleState {
    /// Bottle pressure, Pa.
    pub pressure: f64,

    /// Volume of liquid remaining in the bottle, m³.
    pub liquid_volume: f64,
}

impl BottleState {
    /// Returns the vapor-filled volume above the liquid, `Vb − Vl`.
    #[must_use]
    pub fn ullage_volume(&self, bottle_volume: f64) -> f64 {
        bottle_volume - self.liquid_volume
    }
}

/// Time derivatives of a [`BottleState`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BottleRates {
    /// Rate of change of bottle pressure, Pa/s.
    pub pressure_rate: f64,

    /// Rate of change of liquid volume, m³/s. Negative while liquid flows out.
    pub liquid_volume_rate: f64,
}

impl StepIntegrable<f64> for BottleState {
    type Derivative = BottleRates;

    fn step(&self, rates: BottleRates, dt: f64) -> Self {
        Self {
            pressure: self.pressure + rates.pressure_rate * dt,
            liquid_volume: self.liquid_volume + rates.liquid_volume_rate * dt,
        }
    }
}

use uom::si::{
    f64::{MassDensity, Pressure, ThermodynamicTemperature},
    mass_density::kilogram_per_cubic_meter,
    pressure::pascal,
    thermodynamic_temperature::kelvin,
};

/// Universal gas constant, J/(mol·K).
const UNIVERSAL_GAS_CONSTANT: f64 = 8.314_462_618;

/// Marker type for nitrous oxide (N₂O).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NitrousOxide;

impl NitrousOxide {
    /// Heat capacity ratio `cp/cv` of the vapor.
    pub const HEAT_CAPACITY_RATIO: f64 = 1.303;

    /// Molar mass in kg/mol.
    pub const MOLAR_MASS: f64 = 0.044_013;

    /// Estimates vapor density with the ideal gas law, `ρ = p·M/(R·T)`.
    ///
    /// Near saturation at room temperature this underestimates the real vapor
    /// density by roughly 40%, so prefer the tabulated value from a
    /// [`SaturationTable`](crate::SaturationTable) whenever the state is on the
    /// saturation curve.
    #[must_use]
    pub fn ideal_gas_density(
        pressure: Pressure,
        temperature: ThermodynamicTemperature,
    ) -> MassDensity {
        let p = pressure.get::<pascal>();
        let t = temperature.get::<kelvin>();
        MassDensity::new::<kilogram_per_cubic_meter>(
            p * Self::MOLAR_MASS / (UNIVERSAL_GAS_CONSTANT * t),
        )
    }
}

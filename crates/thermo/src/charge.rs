use tracing::debug;
use uom::si::{
    f64::{Mass, MassDensity, Pressure, ThermodynamicTemperature, Volume},
    mass::kilogram,
    mass_density::kilogram_per_cubic_meter,
    thermodynamic_temperature::kelvin,
    volume::cubic_meter,
};

use crate::{PropertyError, SaturationTable};

/// Finds the liquid volume of a two-phase charge from a mass balance.
///
/// A bottle of volume `Vb` holding mass `m` at saturation splits into liquid
/// and vapor with
///
/// ```text
/// m = ρl·Vl + ρg·(Vb − Vl)   ⇒   Vl = (m − Vb·ρg) / (ρl − ρg)
/// ```
///
/// # Errors
///
/// - [`PropertyError::Infeasible`] if `Vl > Vb`: the bottle cannot hold the
///   charge at these densities.
/// - [`PropertyError::NoLiquid`] if `Vl < 0`: the charge is entirely vapor.
/// - [`PropertyError::InvalidInput`] for non-finite or non-positive inputs,
///   or if the liquid is not denser than the vapor.
pub fn liquid_volume(
    mass: Mass,
    bottle_volume: Volume,
    liquid_density: MassDensity,
    vapor_density: MassDensity,
) -> Result<Volume, PropertyError> {
    let m = mass.get::<kilogram>();
    let vb = bottle_volume.get::<cubic_meter>();
    let rho_l = liquid_density.get::<kilogram_per_cubic_meter>();
    let rho_g = vapor_density.get::<kilogram_per_cubic_meter>();

    if !(m.is_finite() && m >= 0.0) {
        return Err(PropertyError::InvalidInput(format!(
            "mass must be finite and non-negative, got {m} kg"
        )));
    }
    if !(vb.is_finite() && vb > 0.0) {
        return Err(PropertyError::InvalidInput(format!(
            "bottle volume must be finite and positive, got {vb} m³"
        )));
    }
    if !(rho_g.is_finite() && rho_g >= 0.0 && rho_l.is_finite() && rho_l > rho_g) {
        return Err(PropertyError::InvalidInput(format!(
            "liquid density ({rho_l} kg/m³) must exceed vapor density ({rho_g} kg/m³)"
        )));
    }

    let vl = (m - vb * rho_g) / (rho_l - rho_g);

    if vl > vb {
        return Err(PropertyError::Infeasible {
            liquid_volume: vl,
            bottle_volume: vb,
        });
    }
    if vl < 0.0 {
        return Err(PropertyError::NoLiquid { liquid_volume: vl });
    }

    Ok(Volume::new::<cubic_meter>(vl))
}

/// A saturated nitrous oxide charge in a bottle, ready for blowdown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Charge {
    pub temperature: ThermodynamicTemperature,
    pub pressure: Pressure,
    pub liquid_density: MassDensity,
    pub vapor_density: MassDensity,
    pub mass: Mass,
    pub bottle_volume: Volume,
    pub liquid_volume: Volume,
}

impl Charge {
    /// Computes the charge of `mass` in a bottle at a uniform temperature.
    ///
    /// Pressure and densities come from the saturation table, and the liquid
    /// volume from [`liquid_volume`].
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::OutOfRange`] if the temperature is not
    /// tabulated, or any error from [`liquid_volume`].
    pub fn at_temperature(
        table: &SaturationTable,
        temperature: ThermodynamicTemperature,
        mass: Mass,
        bottle_volume: Volume,
    ) -> Result<Self, PropertyError> {
        let point = table.try_lookup_by_temperature(temperature)?;
        let liquid_volume = liquid_volume(
            mass,
            bottle_volume,
            point.liquid_density,
            point.vapor_density,
        )?;

        debug!(
            temperature_k = temperature.get::<kelvin>(),
            liquid_volume_m3 = liquid_volume.get::<cubic_meter>(),
            "computed two-phase charge"
        );

        Ok(Self {
            temperature,
            pressure: point.pressure,
            liquid_density: point.liquid_density,
            vapor_density: point.vapor_density,
            mass,
            bottle_volume,
            liquid_volume,
        })
    }

    /// Returns the vapor-filled volume above the liquid.
    #[must_use]
    pub fn ullage_volume(&self) -> Volume {
        self.bottle_volume - self.liquid_volume
    }

    /// Returns the fraction of the bottle volume occupied by liquid.
    #[must_use]
    pub fn fill_fraction(&self) -> f64 {
        self.liquid_volume.get::<cubic_meter>() / self.bottle_volume.get::<cubic_meter>()
    }

    /// Returns the mass held in the liquid phase.
    #[must_use]
    pub fn liquid_mass(&self) -> Mass {
        Mass::new::<kilogram>(
            self.liquid_volume.get::<cubic_meter>()
                * self.liquid_density.get::<kilogram_per_cubic_meter>(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use uom::si::{mass::pound, pressure::pascal, volume::liter};

    fn density(value: f64) -> MassDensity {
        MassDensity::new::<kilogram_per_cubic_meter>(value)
    }

    #[test]
    fn splits_mass_between_phases() {
        let vl = liquid_volume(
            Mass::new::<kilogram>(4.0),
            Volume::new::<cubic_meter>(0.005),
            density(800.0),
            density(50.0),
        )
        .unwrap();

        // (4.0 − 0.25) / 750
        assert_relative_eq!(vl.get::<cubic_meter>(), 0.005);
    }

    #[test]
    fn overfilled_bottle_is_infeasible() {
        // m = 0.006·750 + 0.005·50 puts Vl at 0.006 m³ in a 0.005 m³ bottle.
        let err = liquid_volume(
            Mass::new::<kilogram>(4.75),
            Volume::new::<cubic_meter>(0.005),
            density(800.0),
            density(50.0),
        )
        .unwrap_err();

        assert!(err.to_string().contains("exceeds bottle volume"));
        match err {
            PropertyError::Infeasible {
                liquid_volume,
                bottle_volume,
            } => {
                assert_relative_eq!(liquid_volume, 0.006, max_relative = 1e-12);
                assert_relative_eq!(bottle_volume, 0.005);
            }
            other => panic!("expected an infeasible charge, got {other:?}"),
        }
    }

    #[test]
    fn light_charge_has_no_liquid() {
        let err = liquid_volume(
            Mass::new::<kilogram>(0.1),
            Volume::new::<cubic_meter>(0.005),
            density(800.0),
            density(50.0),
        )
        .unwrap_err();

        assert!(matches!(err, PropertyError::NoLiquid { .. }));
    }

    #[test]
    fn rejects_inverted_densities() {
        let result = liquid_volume(
            Mass::new::<kilogram>(1.0),
            Volume::new::<cubic_meter>(0.005),
            density(300.0),
            density(300.0),
        );
        assert!(matches!(result, Err(PropertyError::InvalidInput(_))));

        let result = liquid_volume(
            Mass::new::<kilogram>(1.0),
            Volume::new::<cubic_meter>(0.005),
            density(f64::NAN),
            density(50.0),
        );
        assert!(matches!(result, Err(PropertyError::InvalidInput(_))));
    }

    #[test]
    fn twenty_pound_charge_at_room_temperature() {
        let table = SaturationTable::nitrous_oxide().unwrap();

        let charge = Charge::at_temperature(
            &table,
            ThermodynamicTemperature::new::<kelvin>(293.15),
            Mass::new::<pound>(20.0),
            Volume::new::<liter>(15.0),
        )
        .unwrap();

        assert_relative_eq!(charge.pressure.get::<pascal>(), 5.06e6, max_relative = 1e-3);
        assert_relative_eq!(
            charge.liquid_volume.get::<cubic_meter>(),
            0.010_658,
            max_relative = 1e-3
        );
        assert_relative_eq!(
            charge.ullage_volume().get::<cubic_meter>(),
            0.015 - charge.liquid_volume.get::<cubic_meter>(),
            max_relative = 1e-12
        );
        assert!(charge.fill_fraction() > 0.7 && charge.fill_fraction() < 0.72);
        assert!(charge.liquid_mass() < charge.mass);
    }

    #[test]
    fn charge_outside_table_is_out_of_range() {
        let table = SaturationTable::nitrous_oxide().unwrap();

        let err = Charge::at_temperature(
            &table,
            ThermodynamicTemperature::new::<kelvin>(315.0),
            Mass::new::<kilogram>(5.0),
            Volume::new::<cubic_meter>(0.015),
        )
        .unwrap_err();

        assert!(matches!(err, PropertyError::OutOfRange { .. }));
    }
}

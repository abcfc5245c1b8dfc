use std::{fmt, io, path::Path};

use ndarray::Array1;
use ninterp::{
    error::ValidateError,
    interpolator::Extrapolate,
    prelude::{Interp1DOwned, Interpolator},
    strategy::Linear,
};
use serde::Deserialize;
use tracing::debug;
use uom::si::{
    available_energy::joule_per_kilogram,
    f64::{AvailableEnergy, MassDensity, Pressure, ThermodynamicTemperature},
    mass_density::kilogram_per_cubic_meter,
    pressure::pascal,
    thermodynamic_temperature::kelvin,
};

use crate::{PropertyError, TableError};

/// Nitrous oxide saturation curve, 183 K to 309 K in 1 K steps.
const NITROUS_OXIDE_CSV: &str = include_str!("../data/n2o_saturation.csv");

/// One row of a saturation property file, in SI units.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SaturationSample {
    /// Saturation temperature in K.
    #[serde(rename = "temperature_k")]
    pub temperature: f64,

    /// Saturation pressure in Pa.
    #[serde(rename = "pressure_pa")]
    pub pressure: f64,

    /// Saturated liquid density in kg/m³.
    #[serde(rename = "liquid_density_kg_m3")]
    pub liquid_density: f64,

    /// Saturated vapor density in kg/m³.
    #[serde(rename = "vapor_density_kg_m3")]
    pub vapor_density: f64,

    /// Enthalpy of vaporization in J/kg, if the file tabulates it.
    #[serde(rename = "vaporization_enthalpy_j_kg", default)]
    pub vaporization_enthalpy: Option<f64>,
}

/// Saturation properties at one point on the coexistence curve.
///
/// A lookup outside the tabulated range yields an undefined point: the
/// queried quantity is kept and every interpolated field is NaN.
/// Check [`SaturationPoint::is_defined`] before using the values, or use the
/// `try_` lookups on [`SaturationTable`] to get an error instead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SaturationPoint {
    pub temperature: ThermodynamicTemperature,
    pub pressure: Pressure,
    pub liquid_density: MassDensity,
    pub vapor_density: MassDensity,

    /// `None` when the table has no enthalpy column.
    pub vaporization_enthalpy: Option<AvailableEnergy>,
}

impl SaturationPoint {
    fn from_si(temperature: f64, pressure: f64, values: &CurveValues) -> Self {
        Self {
            temperature: ThermodynamicTemperature::new::<kelvin>(temperature),
            pressure: Pressure::new::<pascal>(pressure),
            liquid_density: MassDensity::new::<kilogram_per_cubic_meter>(values.liquid_density),
            vapor_density: MassDensity::new::<kilogram_per_cubic_meter>(values.vapor_density),
            vaporization_enthalpy: values
                .vaporization_enthalpy
                .map(AvailableEnergy::new::<joule_per_kilogram>),
        }
    }

    /// Returns `true` if every property is a finite number.
    ///
    /// An absent enthalpy column does not make the point undefined.
    #[must_use]
    pub fn is_defined(&self) -> bool {
        [
            self.temperature.value,
            self.pressure.value,
            self.liquid_density.value,
            self.vapor_density.value,
        ]
        .iter()
        .chain(self.vaporization_enthalpy.as_ref().map(|h| &h.value))
        .all(|v| v.is_finite())
    }
}

type Column = Interp1DOwned<f64, Linear>;

/// Property columns interpolated against a shared abscissa.
struct Curve {
    other: Column,
    liquid_density: Column,
    vapor_density: Column,
    vaporization_enthalpy: Option<Column>,
}

/// Interpolated values at one abscissa, NaN outside the grid.
struct CurveValues {
    other: f64,
    liquid_density: f64,
    vapor_density: f64,
    vaporization_enthalpy: Option<f64>,
}

impl Curve {
    fn new(
        x: &Array1<f64>,
        other: &Array1<f64>,
        liquid_density: &Array1<f64>,
        vapor_density: &Array1<f64>,
        vaporization_enthalpy: Option<&Array1<f64>>,
    ) -> Result<Self, ValidateError> {
        let column = |f_x: &Array1<f64>| {
            Column::new(
                x.clone(),
                f_x.clone(),
                Linear,
                Extrapolate::Fill(f64::NAN),
            )
        };

        Ok(Self {
            other: column(other)?,
            liquid_density: column(liquid_density)?,
            vapor_density: column(vapor_density)?,
            vaporization_enthalpy: vaporization_enthalpy.map(column).transpose()?,
        })
    }

    fn at(&self, x: f64) -> CurveValues {
        let eval = |column: &Column| column.interpolate(&[x]).unwrap_or(f64::NAN);
        CurveValues {
            other: eval(&self.other),
            liquid_density: eval(&self.liquid_density),
            vapor_density: eval(&self.vapor_density),
            vaporization_enthalpy: self.vaporization_enthalpy.as_ref().map(eval),
        }
    }
}

/// Saturation properties tabulated against temperature and pressure.
///
/// Both the temperature and pressure columns are strictly ascending, so the
/// curve can be inverted: properties are available by temperature or by
/// pressure with linear interpolation between samples. Queries outside the
/// sampled range are never extrapolated.
///
/// The table is immutable once built.
pub struct SaturationTable {
    samples: Vec<SaturationSample>,
    by_temperature: Curve,
    by_pressure: Curve,
}

impl SaturationTable {
    /// Loads the built-in nitrous oxide saturation curve.
    ///
    /// # Errors
    ///
    /// Returns a [`TableError`] only if the embedded data is corrupt.
    pub fn nitrous_oxide() -> Result<Self, TableError> {
        Self::from_reader(NITROUS_OXIDE_CSV.as_bytes())
    }

    /// Loads a table from a CSV file.
    ///
    /// The file needs a header row with the columns `temperature_k`,
    /// `pressure_pa`, `liquid_density_kg_m3` and `vapor_density_kg_m3`. A
    /// `vaporization_enthalpy_j_kg` column is optional.
    ///
    /// # Errors
    ///
    /// Returns a [`TableError`] if the file cannot be read or parsed, or if the
    /// samples fail validation.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TableError> {
        let samples = csv::Reader::from_path(path)?
            .deserialize()
            .collect::<Result<Vec<SaturationSample>, _>>()?;
        Self::from_samples(samples)
    }

    /// Loads a table from CSV data.
    ///
    /// # Errors
    ///
    /// See [`SaturationTable::from_path`].
    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self, TableError> {
        let samples = csv::Reader::from_reader(reader)
            .deserialize()
            .collect::<Result<Vec<SaturationSample>, _>>()?;
        Self::from_samples(samples)
    }

    /// Builds a table from samples ordered by temperature.
    ///
    /// # Errors
    ///
    /// Returns a [`TableError`] if there are fewer than two samples, if any
    /// value is non-finite or non-positive, if the enthalpy column is given for
    /// only some samples, or if temperature or pressure is not strictly
    /// ascending.
    pub fn from_samples(samples: Vec<SaturationSample>) -> Result<Self, TableError> {
        validate(&samples)?;

        let column =
            |f: fn(&SaturationSample) -> f64| samples.iter().map(f).collect::<Array1<_>>();
        let temperature = column(|s| s.temperature);
        let pressure = column(|s| s.pressure);
        let liquid_density = column(|s| s.liquid_density);
        let vapor_density = column(|s| s.vapor_density);
        let vaporization_enthalpy = samples
            .iter()
            .map(|s| s.vaporization_enthalpy)
            .collect::<Option<Array1<_>>>();
        let enthalpy = vaporization_enthalpy.as_ref();

        let by_temperature = Curve::new(
            &temperature,
            &pressure,
            &liquid_density,
            &vapor_density,
            enthalpy,
        )?;
        let by_pressure = Curve::new(
            &pressure,
            &temperature,
            &liquid_density,
            &vapor_density,
            enthalpy,
        )?;

        let table = Self {
            samples,
            by_temperature,
            by_pressure,
        };

        let (t_min, t_max) = table.temperature_bounds();
        debug!(
            samples = table.samples.len(),
            t_min,
            t_max,
            vaporization_enthalpy = table.by_temperature.vaporization_enthalpy.is_some(),
            "loaded saturation table"
        );

        Ok(table)
    }

    /// Returns the samples the table was built from.
    #[must_use]
    pub fn samples(&self) -> &[SaturationSample] {
        &self.samples
    }

    /// Returns the lowest and highest tabulated temperatures.
    #[must_use]
    pub fn temperature_range(&self) -> (ThermodynamicTemperature, ThermodynamicTemperature) {
        let (min, max) = self.temperature_bounds();
        (
            ThermodynamicTemperature::new::<kelvin>(min),
            ThermodynamicTemperature::new::<kelvin>(max),
        )
    }

    /// Returns the lowest and highest tabulated pressures.
    #[must_use]
    pub fn pressure_range(&self) -> (Pressure, Pressure) {
        let (min, max) = self.pressure_bounds();
        (Pressure::new::<pascal>(min), Pressure::new::<pascal>(max))
    }

    /// Interpolates saturation pressure, densities and, when tabulated, the
    /// enthalpy of vaporization at a temperature.
    ///
    /// Returns an undefined point if the temperature is outside the table.
    #[must_use]
    pub fn lookup_by_temperature(&self, temperature: ThermodynamicTemperature) -> SaturationPoint {
        let t = temperature.get::<kelvin>();
        let values = self.by_temperature.at(t);
        SaturationPoint::from_si(t, values.other, &values)
    }

    /// Interpolates saturation temperature and the other properties at a
    /// pressure.
    ///
    /// Returns an undefined point if the pressure is outside the table.
    #[must_use]
    pub fn lookup_by_pressure(&self, pressure: Pressure) -> SaturationPoint {
        let p = pressure.get::<pascal>();
        let values = self.by_pressure.at(p);
        SaturationPoint::from_si(values.other, p, &values)
    }

    /// Like [`lookup_by_temperature`](Self::lookup_by_temperature), but fails
    /// instead of returning an undefined point.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::OutOfRange`] if the temperature is not tabulated.
    pub fn try_lookup_by_temperature(
        &self,
        temperature: ThermodynamicTemperature,
    ) -> Result<SaturationPoint, PropertyError> {
        let point = self.lookup_by_temperature(temperature);
        if point.is_defined() {
            return Ok(point);
        }
        let (min, max) = self.temperature_bounds();
        Err(PropertyError::OutOfRange {
            quantity: "temperature",
            value: temperature.get::<kelvin>(),
            min,
            max,
        })
    }

    /// Like [`lookup_by_pressure`](Self::lookup_by_pressure), but fails
    /// instead of returning an undefined point.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::OutOfRange`] if the pressure is not tabulated.
    pub fn try_lookup_by_pressure(
        &self,
        pressure: Pressure,
    ) -> Result<SaturationPoint, PropertyError> {
        let point = self.lookup_by_pressure(pressure);
        if point.is_defined() {
            return Ok(point);
        }
        let (min, max) = self.pressure_bounds();
        Err(PropertyError::OutOfRange {
            quantity: "pressure",
            value: pressure.get::<pascal>(),
            min,
            max,
        })
    }

    fn temperature_bounds(&self) -> (f64, f64) {
        self.bounds(|s| s.temperature)
    }

    fn pressure_bounds(&self) -> (f64, f64) {
        self.bounds(|s| s.pressure)
    }

    // Validation guarantees at least two ascending samples.
    fn bounds(&self, f: fn(&SaturationSample) -> f64) -> (f64, f64) {
        let first = self.samples.first().map_or(f64::NAN, f);
        let last = self.samples.last().map_or(f64::NAN, f);
        (first, last)
    }
}

impl fmt::Debug for SaturationTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (t_min, t_max) = self.temperature_bounds();
        f.debug_struct("SaturationTable")
            .field("samples", &self.samples.len())
            .field("temperature_k", &(t_min..=t_max))
            .finish_non_exhaustive()
    }
}

fn validate(samples: &[SaturationSample]) -> Result<(), TableError> {
    if samples.len() < 2 {
        return Err(TableError::TooFewSamples(samples.len()));
    }

    for (index, s) in samples.iter().enumerate() {
        let values = [s.temperature, s.pressure, s.liquid_density, s.vapor_density];
        if values.iter().any(|v| !v.is_finite() || *v <= 0.0) {
            return Err(TableError::InvalidSample { index });
        }
        // Vanishes at the critical point.
        if s.vaporization_enthalpy.is_some_and(|h| !h.is_finite() || h < 0.0) {
            return Err(TableError::InvalidSample { index });
        }
    }

    let has_enthalpy = samples[0].vaporization_enthalpy.is_some();
    if let Some(index) = samples
        .iter()
        .position(|s| s.vaporization_enthalpy.is_some() != has_enthalpy)
    {
        return Err(TableError::IncompleteColumn {
            column: "vaporization_enthalpy",
            index,
        });
    }

    for (index, pair) in samples.windows(2).enumerate() {
        if pair[1].temperature <= pair[0].temperature {
            return Err(TableError::NotAscending {
                column: "temperature",
                index: index + 1,
            });
        }
        if pair[1].pressure <= pair[0].pressure {
            return Err(TableError::NotAscending {
                column: "pressure",
                index: index + 1,
            });
        }
    }

    Ok(())
}

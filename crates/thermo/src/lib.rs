//! Saturation properties and charge calculations for a nitrous oxide bottle.
//!
//! The [`SaturationTable`] interpolates pressure and phase densities along the
//! liquid–vapor coexistence curve. [`Charge`] combines a table lookup with a
//! two-phase mass balance to find how much of a bottle is filled with liquid.

mod charge;
mod error;
mod fluid;
mod table;

pub use charge::{Charge, liquid_volume};
pub use error::{PropertyError, TableError};
pub use fluid::NitrousOxide;
pub use table::{SaturationPoint, SaturationSample, SaturationTable};

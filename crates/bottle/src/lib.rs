//! Blowdown dynamics of a self-pressurized nitrous oxide bottle.
//!
//! Liquid leaves the bottle through an orifice, and the vapor in the ullage
//! above it expands to fill the space, so the bottle pressure falls:
//!
//! ```text
//! Vl_dot = −A_out · sqrt(2/ρl · max(p − p_out − Δp, 0))
//! p_dot  = c(γ) · p / (Vb − Vl) · Vl_dot
//! ```
//!
//! - [`outflow`] and [`pressure`] evaluate each relation and its analytic partials.
//! - [`BottleModel`] fuses both into one pass producing [`BottleRates`] and a
//!   [`BottleJacobian`].
//! - [`NodeBatch`] evaluates the model over every collocation node at once.
//! - [`ExpulsionProblem`] wires a charged bottle from an [`ExpulsionConfig`]
//!   and integrates its blowdown.
//!
//! All quantities in the model layer are `f64` in SI units.

pub mod outflow;
pub mod pressure;

mod batch;
mod error;
mod expulsion;
mod model;
mod parameters;
mod state;

pub use batch::{JacobianBatch, NodeBatch, RateBatch};
pub use error::{ModelError, ParameterError};
pub use expulsion::{
    Blowdown, BlowdownEnd, BlowdownPoint, ExpulsionConfig, ExpulsionError, ExpulsionInput,
    ExpulsionProblem,
};
pub use model::{BottleInput, BottleJacobian, BottleModel, Gradient, Rate, Variable};
pub use parameters::BottleParameters;
pub use pressure::ExpansionLaw;
pub use state::{BottleRates, BottleState};

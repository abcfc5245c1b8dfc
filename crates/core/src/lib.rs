//! Core traits and types shared by the blowdown crates.
//!
//! - [`Model`]: a deterministic map from a typed input to a typed output
//! - [`Differentiable`]: a model that also supplies analytic partials
//! - [`Snapshot`]: a captured input/output pair from a model call
//! - [`OdeProblem`]: adapts a model to a steppable state for time integration
//! - [`StepIntegrable`]: a state that advances by `derivative * delta`
//! - [`Observer`]: receives solver events and optionally returns an action
//!
//! The [`finite_difference`] module provides the central-difference helpers
//! used to check analytic partials.

pub mod finite_difference;

mod model;
mod observer;
mod ode;
mod step;

pub use model::{Differentiable, Model, Snapshot};
pub use observer::Observer;
pub use ode::OdeProblem;
pub use step::{DerivativeOf, StepIntegrable};

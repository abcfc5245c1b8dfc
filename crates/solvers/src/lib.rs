//! Explicit time integrators for [`OdeProblem`](blowdown_core::OdeProblem)s.

pub mod euler;

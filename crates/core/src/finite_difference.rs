//! Finite-difference approximations for checking analytic partials.
//!
//! ```
//! use blowdown_core::finite_difference::{central, relative_error};
//!
//! let slope = central(|x| x.powi(3), 2.0, 1e-6);
//! assert!(relative_error(slope, 12.0) < 1e-6);
//! ```

/// Approximates `f'(x)` with a central difference.
///
/// The perturbation is relative: `h = eps · max(|x|, 1)`, so the same `eps`
/// works for pressures in pascals and volumes in cubic meters.
pub fn central<F: Fn(f64) -> f64>(f: F, x: f64, eps: f64) -> f64 {
    central_with_step(f, x, eps * x.abs().max(1.0))
}

/// Approximates `f'(x)` with a central difference of half-width `h`.
///
/// Use this when `x` enters `f` alongside a much larger quantity, such as a
/// small pressure offset subtracted from the bottle pressure. A step scaled
/// to `x` alone is then lost to cancellation.
pub fn central_with_step<F: Fn(f64) -> f64>(f: F, x: f64, h: f64) -> f64 {
    (f(x + h) - f(x - h)) / (2.0 * h)
}

/// Relative error of `approx` against `exact`.
///
/// Falls back to the absolute error when `exact` is zero.
#[must_use]
pub fn relative_error(approx: f64, exact: f64) -> f64 {
    let diff = (approx - exact).abs();
    if exact == 0.0 {
        diff
    } else {
        diff / exact.abs()
    }
}

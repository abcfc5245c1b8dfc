//! Fixed-step forward Euler integration.
//!
//! ```text
//! state_{n+1} = state_n + derivative_n * dt
//! ```
//!
//! Forward Euler is first order and only conditionally stable, but a bottle
//! blowdown is smooth and non-stiff until the liquid runs out, so a small
//! fixed step is enough to trace the pressure and fill histories.

mod action;
mod error;
mod event;
mod solution;

pub use action::Action;
pub use error::Error;
pub use event::Event;
pub use solution::{Solution, Status};

use blowdown_core::{Model, Observer, OdeProblem, Snapshot, StepIntegrable};
use tracing::{debug, trace};

/// Integrates an ODE problem with forward Euler.
///
/// Each step extracts the state from the current input, computes the
/// derivative, steps the state by `dt`, rebuilds and finalizes the input, then
/// calls the model again. The observer sees every snapshot, including the
/// initial one at step 0, and may stop the integration early.
///
/// # Errors
///
/// Returns [`Error::InvalidStep`] if `dt` is not finite and positive, or an
/// error wrapping any failure from the model or the problem.
pub fn solve<M, P, Obs>(
    model: &M,
    problem: &P,
    initial: M::Input,
    dt: f64,
    steps: usize,
    mut observer: Obs,
) -> Result<Solution<M::Input, M::Output>, Error>
where
    M: Model,
    M::Input: Clone,
    M::Output: Clone,
    P: OdeProblem<Input = M::Input, Output = M::Output, Delta = f64>,
    Obs: Observer<Event<M::Input, M::Output>, Action>,
{
    if !dt.is_finite() || dt <= 0.0 {
        return Err(Error::InvalidStep(dt));
    }

    let initial_output = model.call(&initial).map_err(Error::model(0))?;
    let mut current = Snapshot::new(initial, initial_output);

    let mut history = Vec::with_capacity(steps.saturating_add(1).min(4096));
    history.push(current.clone());

    let event = Event {
        step: 0,
        elapsed: 0.0,
        snapshot: current.clone(),
    };
    if let Some(Action::StopEarly) = observer.observe(&event) {
        debug!("stopped by observer before the first step");
        return Ok(Solution {
            status: Status::StoppedByObserver,
            history,
            steps: 0,
        });
    }

    for step in 1..=steps {
        let state = problem.state(&current.input).map_err(Error::problem(step))?;
        let derivative = problem
            .derivative(&current.input, &current.output)
            .map_err(Error::problem(step))?;

        let next_state = state.step(derivative, dt);

        let next_input = problem
            .build_input(&current.input, &next_state, &dt)
            .map_err(Error::problem(step))?;
        let next_input = problem
            .finalize_step(next_input, &current.input, &current.output, &dt)
            .map_err(Error::problem(step))?;

        let next_output = model.call(&next_input).map_err(Error::model(step))?;
        current = Snapshot::new(next_input, next_output);
        history.push(current.clone());

        #[allow(clippy::cast_precision_loss)]
        let elapsed = step as f64 * dt;
        trace!(step, elapsed, "euler step accepted");

        let event = Event {
            step,
            elapsed,
            snapshot: current.clone(),
        };
        if let Some(Action::StopEarly) = observer.observe(&event) {
            debug!(step, elapsed, "stopped by observer");
            return Ok(Solution {
                status: Status::StoppedByObserver,
                history,
                steps: step,
            });
        }
    }

    Ok(Solution {
        status: Status::Complete,
        history,
        steps,
    })
}

/// Integrates an ODE problem with forward Euler and no observer.
///
/// # Errors
///
/// See [`solve`].
pub fn solve_unobserved<M, P>(
    model: &M,
    problem: &P,
    initial: M::Input,
    dt: f64,
    steps: usize,
) -> Result<Solution<M::Input, M::Output>, Error>
where
    M: Model,
    M::Input: Clone,
    M::Output: Clone,
    P: OdeProblem<Input = M::Input, Output = M::Output, Delta = f64>,
{
    solve(model, problem, initial, dt, steps, ())
}

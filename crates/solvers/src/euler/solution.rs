use blowdown_core::Snapshot;

/// How the solver terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// All requested steps were taken.
    Complete,

    /// An observer returned [`Action::StopEarly`](super::Action::StopEarly).
    StoppedByObserver,
}

/// The result of an Euler integration.
#[derive(Debug, Clone)]
pub struct Solution<I, O> {
    pub status: Status,

    /// Snapshots at every step, starting with the initial one.
    pub history: Vec<Snapshot<I, O>>,

    /// Number of integration steps taken.
    pub steps: usize,
}

impl<I, O> Solution<I, O> {
    /// Returns the last snapshot in the history.
    #[must_use]
    pub fn last(&self) -> Option<&Snapshot<I, O>> {
        self.history.last()
    }
}

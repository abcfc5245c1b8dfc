use blowdown_core::Snapshot;

/// Event emitted by the Euler solver after each accepted step.
///
/// Step 0 is the initial snapshot, before any integration.
#[derive(Debug, Clone)]
pub struct Event<I, O> {
    /// The step number.
    pub step: usize,

    /// Elapsed independent variable since the initial snapshot.
    pub elapsed: f64,

    /// Model input and output at this step.
    pub snapshot: Snapshot<I, O>,
}

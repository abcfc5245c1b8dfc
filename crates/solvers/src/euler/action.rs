/// Control actions an observer can return to the Euler solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Stop integrating and return the history so far.
    StopEarly,
}

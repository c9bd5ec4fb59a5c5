//! Funnel steps and the controller that drives them.

mod controller;
mod machine;
mod pending;

pub use controller::{FunnelApp, ProfileOverview};
pub use machine::{Action, FunnelMachine, Step, Transition, backward, forward};
pub use pending::PendingWrite;

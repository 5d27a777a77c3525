//! **stepviz-core**: foundations for step-animated algorithm machines.
//!
//! This crate provides the pieces every visualized algorithm shares:
//! geometry primitives, the error taxonomy, and the stepping protocol that
//! advances a [`Machine`] one observable unit of work at a time, handing
//! each snapshot to a renderer and pausing between steps.

pub mod error;
pub mod geom;
pub mod step;

pub use error::{ConfigError, StepError};
pub use geom::{Point, Range};
pub use step::{
    Clock, Context, Event, Machine, ManualClock, RunHandle, RunOutcome, RunReport, Session,
    Step, Stepper, SystemClock, Tick, spawn,
};

//! Execution engine of surge.
//!
//! [`Poller`] drives one submitted task to settlement, [`E2eWorkflow`] runs a full
//! submit-then-poll cycle, and [`FanoutRunner`] launches many of them at once and
//! folds the results into a [`surge_model::Report`].

pub mod error;
pub use error::{PollError, WorkflowError};

mod poll;
pub use poll::{PollConfig, Poller};

mod workflow;
pub use workflow::{E2eWorkflow, PayloadCatalog};

mod runner;
pub use runner::{Execution, FanoutRunner};

#[cfg(test)]
mod testkit;
